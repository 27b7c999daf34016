use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::Value;

use crate::config::AdminCredentials;
use crate::lifecycle::{
    Complaint, ComplaintId, NewComplaint, NewWorker, User, Worker, WorkerAction,
};
use crate::portal::{portal_router, ComplaintSubmission, PortalService};
use crate::store::{InMemoryPortalStore, PortalStore, StoreError};

pub(super) fn admin() -> AdminCredentials {
    AdminCredentials::new("admin", "admin1234")
}

pub(super) fn new_worker(username: &str, name: &str) -> NewWorker {
    NewWorker {
        username: username.to_string(),
        password: format!("{username}-pw"),
        name: name.to_string(),
    }
}

pub(super) async fn seeded_store() -> Arc<InMemoryPortalStore> {
    let store = Arc::new(InMemoryPortalStore::new());
    store
        .create_worker(new_worker("bob", "Bob"))
        .await
        .expect("seed bob");
    store
        .create_worker(new_worker("carol", "Carol"))
        .await
        .expect("seed carol");
    store
}

pub(super) async fn build_service() -> (
    PortalService<InMemoryPortalStore>,
    Arc<InMemoryPortalStore>,
) {
    let store = seeded_store().await;
    (PortalService::new(store.clone(), admin()), store)
}

pub(super) async fn build_router() -> (axum::Router, Arc<InMemoryPortalStore>) {
    let (service, store) = build_service().await;
    (portal_router(Arc::new(service)), store)
}

pub(super) fn water_leak() -> ComplaintSubmission {
    ComplaintSubmission {
        username: Some("alice".to_string()),
        category: Some("Water".to_string()),
        location: Some("Block B".to_string()),
        landmark: Some("Near the gate".to_string()),
        urgency: Some("Urgent".to_string()),
        description: None,
    }
}

pub(super) fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("build request")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails, standing in for a lost database connection.
pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Unavailable("database offline".to_string())
}

#[async_trait]
impl PortalStore for UnavailableStore {
    async fn create_user(&self, _username: &str, _password: &str) -> Result<User, StoreError> {
        Err(offline())
    }

    async fn find_user(&self, _username: &str) -> Result<Option<User>, StoreError> {
        Err(offline())
    }

    async fn create_worker(&self, _worker: NewWorker) -> Result<Worker, StoreError> {
        Err(offline())
    }

    async fn find_worker(&self, _identity: &str) -> Result<Option<Worker>, StoreError> {
        Err(offline())
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, StoreError> {
        Err(offline())
    }

    async fn set_worker_availability(
        &self,
        _identity: &str,
        _available: bool,
    ) -> Result<Worker, StoreError> {
        Err(offline())
    }

    async fn create_complaint(&self, _complaint: NewComplaint) -> Result<Complaint, StoreError> {
        Err(offline())
    }

    async fn find_complaint(&self, _id: ComplaintId) -> Result<Option<Complaint>, StoreError> {
        Err(offline())
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        Err(offline())
    }

    async fn assigned_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        Err(offline())
    }

    async fn complaints_for_worker(
        &self,
        _worker_name: &str,
    ) -> Result<Vec<Complaint>, StoreError> {
        Err(offline())
    }

    async fn assign(&self, _id: ComplaintId, _worker: &str) -> Result<Complaint, StoreError> {
        Err(offline())
    }

    async fn record_action(
        &self,
        _id: ComplaintId,
        _action: WorkerAction,
        _actor: Option<&str>,
    ) -> Result<Complaint, StoreError> {
        Err(offline())
    }

    async fn mark_successful(&self, _id: ComplaintId) -> Result<Complaint, StoreError> {
        Err(offline())
    }
}
