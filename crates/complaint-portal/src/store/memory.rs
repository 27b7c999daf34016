use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{PortalStore, StoreError};
use crate::lifecycle::{
    holds_active_assignment, Complaint, ComplaintId, NewComplaint, NewWorker, User, Worker,
    WorkerAction, WorkerStatus,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    workers: Vec<Worker>,
    complaints: BTreeMap<ComplaintId, Complaint>,
    next_user_id: i32,
    next_worker_id: i32,
    next_complaint_id: i32,
}

impl Tables {
    fn worker_index(&self, identity: &str) -> Option<usize> {
        self.workers
            .iter()
            .position(|worker| worker.username == identity)
            .or_else(|| self.workers.iter().position(|worker| worker.name == identity))
    }

    fn worker_mut(&mut self, identity: &str) -> Result<&mut Worker, StoreError> {
        let index = self
            .worker_index(identity)
            .ok_or_else(|| StoreError::WorkerNotFound(identity.to_string()))?;
        Ok(&mut self.workers[index])
    }

    fn release_if_idle(&mut self, worker_name: &str) {
        if holds_active_assignment(worker_name, self.complaints.values()) {
            return;
        }
        if let Some(worker) = self.workers.iter_mut().find(|w| w.name == worker_name) {
            worker.available = true;
        }
    }

    fn newest_first<F>(&self, filter: F) -> Vec<Complaint>
    where
        F: Fn(&Complaint) -> bool,
    {
        self.complaints
            .values()
            .rev()
            .filter(|complaint| filter(complaint))
            .cloned()
            .collect()
    }
}

/// Process-local store. A single lock covers all tables, so every operation is atomic.
#[derive(Default, Clone)]
pub struct InMemoryPortalStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryPortalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PortalStore for InMemoryPortalStore {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|user| user.username == username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password: password.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_worker(&self, worker: NewWorker) -> Result<Worker, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .workers
            .iter()
            .any(|existing| existing.username == worker.username || existing.name == worker.name)
        {
            return Err(StoreError::DuplicateUsername(worker.username));
        }
        tables.next_worker_id += 1;
        let worker = Worker {
            id: tables.next_worker_id,
            username: worker.username,
            password: worker.password,
            name: worker.name,
            available: true,
        };
        tables.workers.push(worker.clone());
        Ok(worker)
    }

    async fn find_worker(&self, identity: &str) -> Result<Option<Worker>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .worker_index(identity)
            .map(|index| tables.workers[index].clone()))
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.workers.clone())
    }

    async fn set_worker_availability(
        &self,
        identity: &str,
        available: bool,
    ) -> Result<Worker, StoreError> {
        let mut tables = self.lock()?;
        let worker = tables.worker_mut(identity)?;
        worker.available = available;
        Ok(worker.clone())
    }

    async fn create_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError> {
        let mut tables = self.lock()?;
        tables.next_complaint_id += 1;
        let id = ComplaintId(tables.next_complaint_id);
        let complaint = complaint.into_complaint(id, Utc::now());
        tables.complaints.insert(id, complaint.clone());
        Ok(complaint)
    }

    async fn find_complaint(&self, id: ComplaintId) -> Result<Option<Complaint>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.complaints.get(&id).cloned())
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.newest_first(|_| true))
    }

    async fn assigned_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.newest_first(|complaint| complaint.assigned_worker.is_some()))
    }

    async fn complaints_for_worker(
        &self,
        worker_name: &str,
    ) -> Result<Vec<Complaint>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.newest_first(|complaint| complaint.is_assigned_to(worker_name)))
    }

    async fn assign(&self, id: ComplaintId, worker: &str) -> Result<Complaint, StoreError> {
        let mut tables = self.lock()?;
        let mut complaint = tables
            .complaints
            .get(&id)
            .cloned()
            .ok_or(StoreError::ComplaintNotFound(id))?;
        let worker = tables.worker_mut(worker)?;

        let mut claimed = worker.clone();
        complaint.assign_to(&mut claimed)?;
        *worker = claimed;

        tables.complaints.insert(id, complaint.clone());
        Ok(complaint)
    }

    async fn record_action(
        &self,
        id: ComplaintId,
        action: WorkerAction,
        actor: Option<&str>,
    ) -> Result<Complaint, StoreError> {
        let mut tables = self.lock()?;
        let mut complaint = tables
            .complaints
            .get(&id)
            .cloned()
            .ok_or(StoreError::ComplaintNotFound(id))?;
        if let Some(actor) = actor {
            let worker = tables.worker_mut(actor)?;
            complaint.ensure_assignee(worker)?;
        }

        let next = complaint.apply(action)?;
        tables.complaints.insert(id, complaint.clone());

        if next == WorkerStatus::Rejected {
            if let Some(name) = complaint.assigned_worker.as_deref() {
                tables.release_if_idle(name);
            }
        }

        Ok(complaint)
    }

    async fn mark_successful(&self, id: ComplaintId) -> Result<Complaint, StoreError> {
        let mut tables = self.lock()?;
        let complaint = tables
            .complaints
            .get_mut(&id)
            .ok_or(StoreError::ComplaintNotFound(id))?;
        complaint.mark_successful()?;
        Ok(complaint.clone())
    }
}
