//! Transition rules for a complaint and the availability of the worker holding it.
//!
//! Every method validates its guard before touching any field, so a rejected transition leaves
//! both the complaint and the worker exactly as they were.

use super::domain::{Complaint, ComplaintId, ComplaintStatus, Worker, WorkerAction, WorkerStatus};

/// Guard violations raised by the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("complaint {complaint} is already assigned to {worker}")]
    AlreadyAssigned { complaint: ComplaintId, worker: String },
    #[error("complaint {0} is already resolved")]
    AlreadyResolved(ComplaintId),
    #[error("worker {0} is not available")]
    WorkerUnavailable(String),
    #[error("complaint {0} has no assigned worker")]
    NotAssigned(ComplaintId),
    #[error("complaint {complaint} is assigned to {assignee}, not {worker}")]
    NotAssignee {
        complaint: ComplaintId,
        assignee: String,
        worker: String,
    },
    #[error("cannot {action} complaint {complaint} while worker status is {current}")]
    InvalidWorkerAction {
        complaint: ComplaintId,
        action: WorkerAction,
        current: WorkerStatus,
    },
    #[error("complaint {0} has not been completed by its worker")]
    NotCompleted(ComplaintId),
}

impl Complaint {
    /// Whether the complaint still occupies its assigned worker.
    pub fn is_active(&self) -> bool {
        self.assigned_worker.is_some()
            && self.status != ComplaintStatus::Successful
            && self.worker_status != Some(WorkerStatus::Rejected)
    }

    pub fn is_assigned_to(&self, worker_name: &str) -> bool {
        self.assigned_worker.as_deref() == Some(worker_name)
    }

    /// Assigns `worker` and revokes their availability.
    ///
    /// Pending complaints and complaints whose previous worker rejected them are assignable.
    pub fn assign_to(&mut self, worker: &mut Worker) -> Result<(), TransitionError> {
        if self.status == ComplaintStatus::Successful {
            return Err(TransitionError::AlreadyResolved(self.id));
        }
        if let Some(current) = &self.assigned_worker {
            if self.worker_status != Some(WorkerStatus::Rejected) {
                return Err(TransitionError::AlreadyAssigned {
                    complaint: self.id,
                    worker: current.clone(),
                });
            }
        }
        if !worker.available {
            return Err(TransitionError::WorkerUnavailable(worker.name.clone()));
        }

        self.assigned_worker = Some(worker.name.clone());
        self.status = ComplaintStatus::Assigned;
        self.worker_status = Some(WorkerStatus::Pending);
        self.worker_completed = false;
        worker.available = false;
        Ok(())
    }

    pub fn ensure_assignee(&self, worker: &Worker) -> Result<(), TransitionError> {
        match &self.assigned_worker {
            None => Err(TransitionError::NotAssigned(self.id)),
            Some(assignee) if assignee == &worker.name => Ok(()),
            Some(assignee) => Err(TransitionError::NotAssignee {
                complaint: self.id,
                assignee: assignee.clone(),
                worker: worker.name.clone(),
            }),
        }
    }

    /// Applies a worker progress action, returning the new worker status.
    pub fn apply(&mut self, action: WorkerAction) -> Result<WorkerStatus, TransitionError> {
        if self.status == ComplaintStatus::Successful {
            return Err(TransitionError::AlreadyResolved(self.id));
        }
        let current = match (self.assigned_worker.as_ref(), self.worker_status) {
            (Some(_), Some(current)) => current,
            _ => return Err(TransitionError::NotAssigned(self.id)),
        };

        let next = match (current, action) {
            (WorkerStatus::Pending, WorkerAction::Accept) => WorkerStatus::Accepted,
            (WorkerStatus::Pending, WorkerAction::Reject) => WorkerStatus::Rejected,
            (WorkerStatus::Accepted, WorkerAction::Done) => WorkerStatus::Completed,
            _ => {
                return Err(TransitionError::InvalidWorkerAction {
                    complaint: self.id,
                    action,
                    current,
                })
            }
        };

        self.worker_status = Some(next);
        self.worker_completed = next == WorkerStatus::Completed;
        Ok(next)
    }

    /// Closes a complaint whose worker has finished the job.
    pub fn mark_successful(&mut self) -> Result<(), TransitionError> {
        if self.status == ComplaintStatus::Successful {
            return Err(TransitionError::AlreadyResolved(self.id));
        }
        if self.assigned_worker.is_none() {
            return Err(TransitionError::NotAssigned(self.id));
        }
        if !self.worker_completed {
            return Err(TransitionError::NotCompleted(self.id));
        }

        self.status = ComplaintStatus::Successful;
        Ok(())
    }
}

/// True when any complaint in `complaints` still occupies the named worker.
pub fn holds_active_assignment<'a, I>(worker_name: &str, complaints: I) -> bool
where
    I: IntoIterator<Item = &'a Complaint>,
{
    complaints
        .into_iter()
        .any(|complaint| complaint.is_assigned_to(worker_name) && complaint.is_active())
}
