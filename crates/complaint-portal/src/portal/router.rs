use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::error::PortalError;
use super::requests::{
    AssignRequest, AvailabilityRequest, ComplaintSubmission, Credentials, MarkSuccessRequest,
    StatusUpdateRequest, WorkerLookup,
};
use super::service::PortalService;
use crate::store::PortalStore;

type Service<S> = State<Arc<PortalService<S>>>;
type Body<T> = Result<Json<T>, JsonRejection>;

/// Router builder exposing the reporter, admin, and worker endpoints.
pub fn portal_router<S>(service: Arc<PortalService<S>>) -> Router
where
    S: PortalStore + 'static,
{
    Router::new()
        .route("/api/users/register", post(register_handler::<S>))
        .route("/api/users/login", post(user_login_handler::<S>))
        .route("/api/complaints", post(submit_complaint_handler::<S>))
        .route("/api/admin/login", post(admin_login_handler::<S>))
        .route("/api/admin/complaints", get(all_complaints_handler::<S>))
        .route("/api/admin/workers", get(workers_handler::<S>))
        .route(
            "/api/admin/workers/available",
            get(available_workers_handler::<S>),
        )
        .route("/api/admin/assign", post(assign_handler::<S>))
        .route("/api/admin/mark-success", post(mark_success_handler::<S>))
        .route("/api/workers/login", post(worker_login_handler::<S>))
        .route("/api/worker/complaints", get(assigned_complaints_handler::<S>))
        .route("/api/worker/my-complaints", post(my_complaints_handler::<S>))
        .route("/api/worker/update-status", post(update_status_handler::<S>))
        .route(
            "/api/worker/set-availability",
            post(set_availability_handler::<S>),
        )
        .route(
            "/api/worker/auto-enable-availability",
            post(auto_enable_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn register_handler<S>(
    State(service): Service<S>,
    body: Body<Credentials>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(creds) = body?;
    let user = service.register_user(creds).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered", "user": user })),
    ))
}

pub(crate) async fn user_login_handler<S>(
    State(service): Service<S>,
    body: Body<Credentials>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(creds) = body?;
    let user = service.login_user(creds).await?;
    Ok(Json(json!({ "message": "Login successful", "user": user })))
}

pub(crate) async fn submit_complaint_handler<S>(
    State(service): Service<S>,
    body: Body<ComplaintSubmission>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(submission) = body?;
    let complaint = service.submit_complaint(submission).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Complaint submitted successfully",
            "complaint": complaint,
        })),
    ))
}

pub(crate) async fn admin_login_handler<S>(
    State(service): Service<S>,
    body: Body<Credentials>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(creds) = body?;
    service.login_admin(creds)?;
    Ok(Json(json!({ "message": "Admin login successful" })))
}

pub(crate) async fn all_complaints_handler<S>(
    State(service): Service<S>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    Ok(Json(service.complaints().await?))
}

pub(crate) async fn workers_handler<S>(
    State(service): Service<S>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    Ok(Json(service.workers().await?))
}

pub(crate) async fn available_workers_handler<S>(
    State(service): Service<S>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    Ok(Json(service.available_workers().await?))
}

pub(crate) async fn assign_handler<S>(
    State(service): Service<S>,
    body: Body<AssignRequest>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(request) = body?;
    let complaint = service.assign(request).await?;
    Ok(Json(json!({
        "message": "Worker assigned successfully",
        "complaint": complaint,
    })))
}

pub(crate) async fn mark_success_handler<S>(
    State(service): Service<S>,
    body: Body<MarkSuccessRequest>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(request) = body?;
    let complaint = service.mark_success(request).await?;
    Ok(Json(json!({
        "message": "Complaint marked as successful",
        "complaint": complaint,
    })))
}

pub(crate) async fn worker_login_handler<S>(
    State(service): Service<S>,
    body: Body<Credentials>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(creds) = body?;
    let worker = service.login_worker(creds).await?;
    Ok(Json(json!({ "message": "Login successful", "worker": worker })))
}

pub(crate) async fn assigned_complaints_handler<S>(
    State(service): Service<S>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    Ok(Json(service.assigned_complaints().await?))
}

pub(crate) async fn my_complaints_handler<S>(
    State(service): Service<S>,
    body: Body<WorkerLookup>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(lookup) = body?;
    Ok(Json(service.worker_complaints(lookup).await?))
}

pub(crate) async fn update_status_handler<S>(
    State(service): Service<S>,
    body: Body<StatusUpdateRequest>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(request) = body?;
    let complaint = service.update_status(request).await?;
    Ok(Json(json!({
        "message": "Status updated",
        "complaint": complaint,
    })))
}

pub(crate) async fn set_availability_handler<S>(
    State(service): Service<S>,
    body: Body<AvailabilityRequest>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(request) = body?;
    let worker = service.set_availability(request).await?;
    Ok(Json(json!({
        "message": "Availability updated",
        "worker": worker,
    })))
}

pub(crate) async fn auto_enable_handler<S>(
    State(service): Service<S>,
    body: Body<WorkerLookup>,
) -> Result<impl IntoResponse, PortalError>
where
    S: PortalStore + 'static,
{
    let Json(lookup) = body?;
    let worker = service.auto_enable_availability(lookup).await?;
    Ok(Json(json!({
        "message": "Availability enabled",
        "worker": worker,
    })))
}
