//! Persistence for users, workers, and complaints.
//!
//! Lifecycle operations (`assign`, `record_action`, `mark_successful`) run the
//! [`crate::lifecycle`] rules against the stored rows and persist every row they touch as one
//! atomic unit.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::lifecycle::{
    Complaint, ComplaintId, NewComplaint, NewWorker, TransitionError, UnknownStatus, User, Worker,
    WorkerAction,
};

pub use memory::InMemoryPortalStore;
pub use postgres::PgPortalStore;

/// Storage abstraction so the portal service can run against memory or PostgreSQL.
#[async_trait]
pub trait PortalStore: Send + Sync {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, StoreError>;
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn create_worker(&self, worker: NewWorker) -> Result<Worker, StoreError>;
    /// Resolves a worker by login username, falling back to display name.
    async fn find_worker(&self, identity: &str) -> Result<Option<Worker>, StoreError>;
    /// All workers ordered by id.
    async fn list_workers(&self) -> Result<Vec<Worker>, StoreError>;
    async fn set_worker_availability(
        &self,
        identity: &str,
        available: bool,
    ) -> Result<Worker, StoreError>;

    async fn create_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError>;
    async fn find_complaint(&self, id: ComplaintId) -> Result<Option<Complaint>, StoreError>;
    /// All complaints, newest first.
    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError>;
    /// Complaints with any assigned worker, newest first.
    async fn assigned_complaints(&self) -> Result<Vec<Complaint>, StoreError>;
    /// Complaints assigned to the worker with this display name, newest first.
    async fn complaints_for_worker(&self, worker_name: &str)
        -> Result<Vec<Complaint>, StoreError>;

    /// Assigns the worker to the complaint and revokes the worker's availability.
    async fn assign(&self, id: ComplaintId, worker: &str) -> Result<Complaint, StoreError>;
    /// Applies a worker action. When `actor` is given it must be the assigned worker.
    async fn record_action(
        &self,
        id: ComplaintId,
        action: WorkerAction,
        actor: Option<&str>,
    ) -> Result<Complaint, StoreError>;
    async fn mark_successful(&self, id: ComplaintId) -> Result<Complaint, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),
    #[error("complaint {0} not found")]
    ComplaintNotFound(ComplaintId),
    #[error("worker '{0}' not found")]
    WorkerNotFound(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("stored record is invalid: {0}")]
    Corrupt(#[from] UnknownStatus),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
