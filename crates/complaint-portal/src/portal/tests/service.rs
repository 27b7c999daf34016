use std::sync::Arc;

use super::common::*;
use crate::lifecycle::{ComplaintId, ComplaintStatus, TransitionError, WorkerStatus};
use crate::portal::{
    AssignRequest, AvailabilityRequest, ComplaintSubmission, Credentials, MarkSuccessRequest,
    PortalError, PortalService, StatusUpdateRequest, WorkerLookup,
};
use crate::store::PortalStore;

fn assign_request(id: ComplaintId, worker: &str) -> AssignRequest {
    AssignRequest {
        complaint_id: Some(id),
        worker_name: Some(worker.to_string()),
    }
}

fn status_update(id: ComplaintId, action: &str) -> StatusUpdateRequest {
    StatusUpdateRequest {
        complaint_id: Some(id),
        action: Some(action.to_string()),
        username: None,
    }
}

fn mark_success(id: ComplaintId) -> MarkSuccessRequest {
    MarkSuccessRequest {
        complaint_id: Some(id),
    }
}

#[tokio::test]
async fn registering_twice_conflicts() {
    let (service, _) = build_service().await;

    let user = service
        .register_user(Credentials::new("alice", "pw"))
        .await
        .expect("first registration succeeds");
    assert_eq!(user.username, "alice");

    match service.register_user(Credentials::new("alice", "other")).await {
        Err(PortalError::Conflict(message)) => assert_eq!(message, "Username already exists"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn registration_requires_both_fields() {
    let (service, _) = build_service().await;
    let creds = Credentials {
        username: Some("alice".to_string()),
        password: Some("   ".to_string()),
    };

    match service.register_user(creds).await {
        Err(PortalError::Validation(message)) => {
            assert_eq!(message, "Username and password required")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn user_login_checks_password() {
    let (service, _) = build_service().await;
    service
        .register_user(Credentials::new("alice", "pw"))
        .await
        .expect("registered");

    assert!(service
        .login_user(Credentials::new("alice", "pw"))
        .await
        .is_ok());
    assert!(matches!(
        service.login_user(Credentials::new("alice", "nope")).await,
        Err(PortalError::Unauthorized(_))
    ));
    assert!(matches!(
        service.login_user(Credentials::new("mallory", "pw")).await,
        Err(PortalError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn admin_login_uses_injected_credentials() {
    let store = seeded_store().await;
    let service = PortalService::new(store, crate::config::AdminCredentials::new("ops", "pw"));

    assert!(service.login_admin(Credentials::new("ops", "pw")).is_ok());
    assert!(matches!(
        service.login_admin(Credentials::new("admin", "admin1234")),
        Err(PortalError::Unauthorized(_))
    ));
    assert!(matches!(
        service.login_admin(Credentials::default()),
        Err(PortalError::Validation(_))
    ));
}

#[tokio::test]
async fn worker_login_requires_username_not_display_name() {
    let (service, _) = build_service().await;

    let worker = service
        .login_worker(Credentials::new("bob", "bob-pw"))
        .await
        .expect("bob logs in");
    assert_eq!(worker.name, "Bob");

    assert!(matches!(
        service.login_worker(Credentials::new("Bob", "bob-pw")).await,
        Err(PortalError::Unauthorized(_))
    ));
    assert!(matches!(
        service.login_worker(Credentials::new("bob", "wrong")).await,
        Err(PortalError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn submitted_complaints_start_pending() {
    let (service, _) = build_service().await;

    let complaint = service
        .submit_complaint(water_leak())
        .await
        .expect("complaint stored");

    assert_eq!(complaint.status, ComplaintStatus::Pending);
    assert!(complaint.assigned_worker.is_none());
    assert!(complaint.worker_status.is_none());
    assert!(!complaint.worker_completed);
    assert_eq!(complaint.landmark.as_deref(), Some("Near the gate"));
    assert!(complaint.description.is_none());
}

#[tokio::test]
async fn submission_requires_core_fields() {
    let (service, _) = build_service().await;
    let submission = ComplaintSubmission {
        urgency: None,
        ..water_leak()
    };

    match service.submit_complaint(submission).await {
        Err(PortalError::Validation(message)) => assert_eq!(message, "Required fields missing"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn complaints_are_listed_newest_first() {
    let (service, _) = build_service().await;
    let first = service.submit_complaint(water_leak()).await.expect("first");
    let second = service.submit_complaint(water_leak()).await.expect("second");

    let listed = service.complaints().await.expect("listed");
    let ids: Vec<_> = listed.iter().map(|complaint| complaint.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn assignment_removes_worker_from_available_list() {
    let (service, store) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");

    let assigned = service
        .assign(assign_request(complaint.id, "Bob"))
        .await
        .expect("assigned");

    assert_eq!(assigned.status, ComplaintStatus::Assigned);
    assert_eq!(assigned.worker_status, Some(WorkerStatus::Pending));
    assert_eq!(assigned.assigned_worker.as_deref(), Some("Bob"));

    let bob = store
        .find_worker("bob")
        .await
        .expect("lookup")
        .expect("bob exists");
    assert!(!bob.available);

    let available: Vec<_> = service
        .available_workers()
        .await
        .expect("listed")
        .into_iter()
        .map(|worker| worker.name)
        .collect();
    assert_eq!(available, vec!["Carol".to_string()]);
}

#[tokio::test]
async fn assignment_to_unavailable_worker_is_refused() {
    let (service, _) = build_service().await;
    let first = service.submit_complaint(water_leak()).await.expect("first");
    let second = service.submit_complaint(water_leak()).await.expect("second");
    service
        .assign(assign_request(first.id, "Bob"))
        .await
        .expect("assigned");

    match service.assign(assign_request(second.id, "Bob")).await {
        Err(PortalError::Transition(TransitionError::WorkerUnavailable(name))) => {
            assert_eq!(name, "Bob")
        }
        other => panic!("expected unavailable worker, got {other:?}"),
    }

    let untouched = service
        .complaints()
        .await
        .expect("listed")
        .into_iter()
        .find(|complaint| complaint.id == second.id)
        .expect("second present");
    assert_eq!(untouched.status, ComplaintStatus::Pending);
}

#[tokio::test]
async fn assignment_reports_unknown_records() {
    let (service, _) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");

    assert!(matches!(
        service.assign(assign_request(ComplaintId(999), "Bob")).await,
        Err(PortalError::NotFound(_))
    ));
    assert!(matches!(
        service.assign(assign_request(complaint.id, "Zed")).await,
        Err(PortalError::NotFound(_))
    ));
    assert!(matches!(
        service.assign(AssignRequest::default()).await,
        Err(PortalError::Validation(_))
    ));
}

#[tokio::test]
async fn full_lifecycle_reaches_successful() {
    let (service, _) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");
    service
        .assign(assign_request(complaint.id, "bob"))
        .await
        .expect("assigned");

    let accepted = service
        .update_status(status_update(complaint.id, "accept"))
        .await
        .expect("accepted");
    assert_eq!(accepted.worker_status, Some(WorkerStatus::Accepted));

    let done = service
        .update_status(status_update(complaint.id, "done"))
        .await
        .expect("done");
    assert_eq!(done.worker_status, Some(WorkerStatus::Completed));
    assert!(done.worker_completed);

    let closed = service
        .mark_success(mark_success(complaint.id))
        .await
        .expect("closed");
    assert_eq!(closed.status, ComplaintStatus::Successful);
}

#[tokio::test]
async fn unknown_action_is_rejected_before_any_write() {
    let (service, store) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");
    service
        .assign(assign_request(complaint.id, "Bob"))
        .await
        .expect("assigned");

    match service
        .update_status(status_update(complaint.id, "finish"))
        .await
    {
        Err(PortalError::Validation(message)) => assert!(message.contains("finish")),
        other => panic!("expected validation error, got {other:?}"),
    }

    let stored = store
        .find_complaint(complaint.id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.worker_status, Some(WorkerStatus::Pending));
}

#[tokio::test]
async fn actions_out_of_order_are_conflicts() {
    let (service, _) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");

    assert!(matches!(
        service
            .update_status(status_update(complaint.id, "accept"))
            .await,
        Err(PortalError::Transition(TransitionError::NotAssigned(_)))
    ));

    service
        .assign(assign_request(complaint.id, "Bob"))
        .await
        .expect("assigned");
    assert!(matches!(
        service
            .update_status(status_update(complaint.id, "done"))
            .await,
        Err(PortalError::Transition(
            TransitionError::InvalidWorkerAction { .. }
        ))
    ));
}

#[tokio::test]
async fn acting_worker_must_be_the_assignee() {
    let (service, _) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");
    service
        .assign(assign_request(complaint.id, "Bob"))
        .await
        .expect("assigned");

    let mut request = status_update(complaint.id, "accept");
    request.username = Some("carol".to_string());
    assert!(matches!(
        service.update_status(request).await,
        Err(PortalError::Forbidden(_))
    ));

    let mut request = status_update(complaint.id, "accept");
    request.username = Some("bob".to_string());
    let accepted = service.update_status(request).await.expect("bob accepts");
    assert_eq!(accepted.worker_status, Some(WorkerStatus::Accepted));
}

#[tokio::test]
async fn rejection_frees_worker_and_allows_reassignment() {
    let (service, store) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");
    service
        .assign(assign_request(complaint.id, "Bob"))
        .await
        .expect("assigned");

    let rejected = service
        .update_status(status_update(complaint.id, "reject"))
        .await
        .expect("rejected");
    assert_eq!(rejected.worker_status, Some(WorkerStatus::Rejected));

    let bob = store
        .find_worker("bob")
        .await
        .expect("lookup")
        .expect("present");
    assert!(bob.available);

    let reassigned = service
        .assign(assign_request(complaint.id, "Carol"))
        .await
        .expect("reassigned");
    assert_eq!(reassigned.assigned_worker.as_deref(), Some("Carol"));
    assert_eq!(reassigned.worker_status, Some(WorkerStatus::Pending));
}

#[tokio::test]
async fn rejection_keeps_worker_busy_with_other_work() {
    let (service, store) = build_service().await;
    let first = service.submit_complaint(water_leak()).await.expect("first");
    let second = service.submit_complaint(water_leak()).await.expect("second");
    service
        .assign(assign_request(first.id, "Bob"))
        .await
        .expect("assigned first");
    service
        .set_availability(AvailabilityRequest {
            username: Some("bob".to_string()),
            available: Some(true),
        })
        .await
        .expect("bob toggles back on");
    service
        .assign(assign_request(second.id, "Bob"))
        .await
        .expect("assigned second");

    service
        .update_status(status_update(first.id, "reject"))
        .await
        .expect("rejected first");

    let bob = store
        .find_worker("bob")
        .await
        .expect("lookup")
        .expect("present");
    assert!(!bob.available, "bob still holds the second complaint");
}

#[tokio::test]
async fn mark_success_requires_completed_work() {
    let (service, _) = build_service().await;
    let complaint = service.submit_complaint(water_leak()).await.expect("stored");
    service
        .assign(assign_request(complaint.id, "Bob"))
        .await
        .expect("assigned");

    match service.mark_success(mark_success(complaint.id)).await {
        Err(PortalError::Transition(TransitionError::NotCompleted(id))) => {
            assert_eq!(id, complaint.id)
        }
        other => panic!("expected not completed, got {other:?}"),
    }
}

#[tokio::test]
async fn worker_complaints_resolve_username_to_display_name() {
    let (service, _) = build_service().await;
    let first = service.submit_complaint(water_leak()).await.expect("first");
    let second = service.submit_complaint(water_leak()).await.expect("second");
    let third = service.submit_complaint(water_leak()).await.expect("third");
    service
        .assign(assign_request(first.id, "Bob"))
        .await
        .expect("assigned");
    service
        .assign(assign_request(second.id, "Carol"))
        .await
        .expect("assigned");
    service
        .set_availability(AvailabilityRequest {
            username: Some("Bob".to_string()),
            available: Some(true),
        })
        .await
        .expect("toggle by display name");
    service
        .assign(assign_request(third.id, "Bob"))
        .await
        .expect("assigned");

    let lookup = WorkerLookup {
        username: Some("bob".to_string()),
    };
    let ids: Vec<_> = service
        .worker_complaints(lookup)
        .await
        .expect("listed")
        .into_iter()
        .map(|complaint| complaint.id)
        .collect();
    assert_eq!(ids, vec![third.id, first.id]);

    let all_assigned = service.assigned_complaints().await.expect("listed");
    assert_eq!(all_assigned.len(), 3);

    assert!(matches!(
        service
            .worker_complaints(WorkerLookup {
                username: Some("nobody".to_string()),
            })
            .await,
        Err(PortalError::NotFound(_))
    ));
}

#[tokio::test]
async fn availability_requires_flag_and_auto_enable_sets_true() {
    let (service, _) = build_service().await;

    assert!(matches!(
        service
            .set_availability(AvailabilityRequest {
                username: Some("bob".to_string()),
                available: None,
            })
            .await,
        Err(PortalError::Validation(_))
    ));

    let off = service
        .set_availability(AvailabilityRequest {
            username: Some("bob".to_string()),
            available: Some(false),
        })
        .await
        .expect("toggled off");
    assert!(!off.available);

    let on = service
        .auto_enable_availability(WorkerLookup {
            username: Some("bob".to_string()),
        })
        .await
        .expect("auto enabled");
    assert!(on.available);

    assert!(matches!(
        service
            .auto_enable_availability(WorkerLookup { username: None })
            .await,
        Err(PortalError::Validation(_))
    ));
}

#[tokio::test]
async fn store_failures_collapse_to_internal_errors() {
    let service = PortalService::new(Arc::new(UnavailableStore), admin());

    let err = service
        .register_user(Credentials::new("alice", "pw"))
        .await
        .expect_err("store offline");
    assert!(matches!(err, PortalError::Store(_)));
    assert_eq!(err.to_string(), "internal server error");
    assert_eq!(
        err.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}
