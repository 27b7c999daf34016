use std::sync::Arc;

use tracing::info;

use super::error::PortalError;
use super::requests::{
    AssignRequest, AvailabilityRequest, ComplaintSubmission, Credentials, MarkSuccessRequest,
    StatusUpdateRequest, WorkerLookup,
};
use crate::config::AdminCredentials;
use crate::lifecycle::{Complaint, ComplaintId, NewComplaint, User, Worker, WorkerAction};
use crate::store::PortalStore;

const CREDENTIALS_REQUIRED: &str = "Username and password required";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Facade coordinating validation, credential checks, and lifecycle transitions.
pub struct PortalService<S> {
    store: Arc<S>,
    admin: AdminCredentials,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn required(value: Option<String>, message: &str) -> Result<String, PortalError> {
    present(value).ok_or_else(|| PortalError::Validation(message.to_string()))
}

fn credentials(creds: Credentials) -> Result<(String, String), PortalError> {
    match (present(creds.username), present(creds.password)) {
        (Some(username), Some(password)) => Ok((username.trim().to_string(), password)),
        _ => Err(PortalError::Validation(CREDENTIALS_REQUIRED.to_string())),
    }
}

fn complaint_id(value: Option<ComplaintId>) -> Result<ComplaintId, PortalError> {
    value.ok_or_else(|| PortalError::Validation("complaintId is required".to_string()))
}

impl<S> PortalService<S>
where
    S: PortalStore + 'static,
{
    pub fn new(store: Arc<S>, admin: AdminCredentials) -> Self {
        Self { store, admin }
    }

    /// Register a reporter. Duplicate usernames surface as a conflict.
    pub async fn register_user(&self, creds: Credentials) -> Result<User, PortalError> {
        let (username, password) = credentials(creds)?;
        let user = self.store.create_user(&username, &password).await?;
        info!(user = %user.username, "user registered");
        Ok(user)
    }

    pub async fn login_user(&self, creds: Credentials) -> Result<User, PortalError> {
        let (username, password) = credentials(creds)?;
        match self.store.find_user(&username).await? {
            Some(user) if user.password == password => Ok(user),
            _ => Err(PortalError::Unauthorized(INVALID_CREDENTIALS)),
        }
    }

    pub fn login_admin(&self, creds: Credentials) -> Result<(), PortalError> {
        let (username, password) = credentials(creds)?;
        if self.admin.matches(&username, &password) {
            Ok(())
        } else {
            Err(PortalError::Unauthorized("Invalid admin credentials"))
        }
    }

    pub async fn login_worker(&self, creds: Credentials) -> Result<Worker, PortalError> {
        let (username, password) = credentials(creds)?;
        match self.store.find_worker(&username).await? {
            Some(worker) if worker.username == username && worker.password == password => {
                Ok(worker)
            }
            _ => Err(PortalError::Unauthorized(INVALID_CREDENTIALS)),
        }
    }

    /// Record a new complaint. It starts pending with no assigned worker.
    pub async fn submit_complaint(
        &self,
        submission: ComplaintSubmission,
    ) -> Result<Complaint, PortalError> {
        let ComplaintSubmission {
            username,
            category,
            location,
            landmark,
            urgency,
            description,
        } = submission;

        let (username, category, location, urgency) =
            match (present(username), present(category), present(location), present(urgency)) {
                (Some(username), Some(category), Some(location), Some(urgency)) => {
                    (username, category, location, urgency)
                }
                _ => return Err(PortalError::Validation("Required fields missing".to_string())),
            };

        let complaint = self
            .store
            .create_complaint(NewComplaint {
                username,
                category,
                location,
                landmark: present(landmark),
                urgency,
                description: present(description),
            })
            .await?;
        info!(complaint = %complaint.id, user = %complaint.username, "complaint submitted");
        Ok(complaint)
    }

    pub async fn complaints(&self) -> Result<Vec<Complaint>, PortalError> {
        Ok(self.store.list_complaints().await?)
    }

    pub async fn workers(&self) -> Result<Vec<Worker>, PortalError> {
        Ok(self.store.list_workers().await?)
    }

    pub async fn available_workers(&self) -> Result<Vec<Worker>, PortalError> {
        let workers = self.store.list_workers().await?;
        Ok(workers.into_iter().filter(|worker| worker.available).collect())
    }

    pub async fn assign(&self, request: AssignRequest) -> Result<Complaint, PortalError> {
        let id = complaint_id(request.complaint_id)?;
        let worker = required(request.worker_name, "workerName is required")?;

        let complaint = self.store.assign(id, &worker).await?;
        info!(complaint = %id, worker = %worker, "worker assigned");
        Ok(complaint)
    }

    /// Close a complaint. Only completed work can be marked successful.
    pub async fn mark_success(
        &self,
        request: MarkSuccessRequest,
    ) -> Result<Complaint, PortalError> {
        let id = complaint_id(request.complaint_id)?;
        let complaint = self.store.mark_successful(id).await?;
        info!(complaint = %id, "complaint marked successful");
        Ok(complaint)
    }

    pub async fn assigned_complaints(&self) -> Result<Vec<Complaint>, PortalError> {
        Ok(self.store.assigned_complaints().await?)
    }

    pub async fn worker_complaints(
        &self,
        lookup: WorkerLookup,
    ) -> Result<Vec<Complaint>, PortalError> {
        let worker = self.resolve_worker(lookup.username).await?;
        Ok(self.store.complaints_for_worker(&worker.name).await?)
    }

    /// Apply a worker action token (`accept`, `reject`, `done`).
    pub async fn update_status(
        &self,
        request: StatusUpdateRequest,
    ) -> Result<Complaint, PortalError> {
        let action = required(request.action, "Invalid action")?
            .parse::<WorkerAction>()
            .map_err(|err| PortalError::Validation(err.to_string()))?;
        let id = complaint_id(request.complaint_id)?;
        let actor = present(request.username);

        let complaint = self
            .store
            .record_action(id, action, actor.as_deref())
            .await?;
        info!(
            complaint = %id,
            %action,
            worker_status = ?complaint.worker_status,
            "worker status updated"
        );
        Ok(complaint)
    }

    pub async fn set_availability(
        &self,
        request: AvailabilityRequest,
    ) -> Result<Worker, PortalError> {
        let username = required(request.username, "username and available are required")?;
        let available = request.available.ok_or_else(|| {
            PortalError::Validation("username and available are required".to_string())
        })?;

        let worker = self
            .store
            .set_worker_availability(username.trim(), available)
            .await?;
        info!(worker = %worker.name, available, "worker availability set");
        Ok(worker)
    }

    /// Marks the worker available; called whenever the worker dashboard loads.
    pub async fn auto_enable_availability(
        &self,
        lookup: WorkerLookup,
    ) -> Result<Worker, PortalError> {
        let username = required(lookup.username, "username is required")?;
        let worker = self
            .store
            .set_worker_availability(username.trim(), true)
            .await?;
        Ok(worker)
    }

    async fn resolve_worker(&self, identity: Option<String>) -> Result<Worker, PortalError> {
        let identity = required(identity, "username is required")?;
        let identity = identity.trim();
        self.store
            .find_worker(identity)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("worker '{identity}' not found")))
    }
}
