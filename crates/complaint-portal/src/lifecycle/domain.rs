use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for complaint rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(pub i32);

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Top-level resolution state visible to the admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    Pending,
    Assigned,
    Successful,
}

impl ComplaintStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::Assigned => "Assigned",
            ComplaintStatus::Successful => "Successful",
        }
    }
}

/// Progress reported by the assigned worker. Only meaningful once a worker is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl WorkerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            WorkerStatus::Pending => "Pending",
            WorkerStatus::Accepted => "Accepted",
            WorkerStatus::Rejected => "Rejected",
            WorkerStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a persisted status column holds an unknown value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status value '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ComplaintStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Assigned" => Ok(Self::Assigned),
            "Successful" => Ok(Self::Successful),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for WorkerStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            "Completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Progress actions a worker may report against an assigned complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerAction {
    Accept,
    Reject,
    Done,
}

impl WorkerAction {
    pub const fn token(self) -> &'static str {
        match self {
            WorkerAction::Accept => "accept",
            WorkerAction::Reject => "reject",
            WorkerAction::Done => "done",
        }
    }
}

impl fmt::Display for WorkerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid action '{0}', expected accept, reject or done")]
pub struct UnknownAction(pub String);

impl FromStr for WorkerAction {
    type Err = UnknownAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "done" => Ok(Self::Done),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// A submitted issue report tracked through assignment and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub username: String,
    pub category: String,
    pub location: String,
    pub landmark: Option<String>,
    pub urgency: String,
    pub description: Option<String>,
    pub assigned_worker: Option<String>,
    pub status: ComplaintStatus,
    pub worker_status: Option<WorkerStatus>,
    pub worker_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields captured by the submission form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub username: String,
    pub category: String,
    pub location: String,
    pub landmark: Option<String>,
    pub urgency: String,
    pub description: Option<String>,
}

impl NewComplaint {
    /// Materializes the initial row: pending, unassigned, not completed.
    pub fn into_complaint(self, id: ComplaintId, created_at: DateTime<Utc>) -> Complaint {
        Complaint {
            id,
            username: self.username,
            category: self.category,
            location: self.location,
            landmark: self.landmark,
            urgency: self.urgency,
            description: self.description,
            assigned_worker: None,
            status: ComplaintStatus::Pending,
            worker_status: None,
            worker_completed: false,
            created_at,
        }
    }
}

/// Registered complaint submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Field worker who can be assigned complaints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Worker {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorker {
    pub username: String,
    pub password: String,
    pub name: String,
}
