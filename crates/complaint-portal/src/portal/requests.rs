//! JSON bodies accepted by the portal endpoints.
//!
//! Every field is optional at the serde layer so that missing values surface as validation
//! errors with a readable message instead of a body rejection.

use serde::{Deserialize, Serialize};

use crate::lifecycle::ComplaintId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintSubmission {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default)]
    pub complaint_id: Option<ComplaintId>,
    #[serde(default)]
    pub worker_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSuccessRequest {
    #[serde(default)]
    pub complaint_id: Option<ComplaintId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerLookup {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub complaint_id: Option<ComplaintId>,
    #[serde(default)]
    pub action: Option<String>,
    /// Acting worker; when present it must match the assignee.
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}
