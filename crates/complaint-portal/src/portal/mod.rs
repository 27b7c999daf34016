//! Reporter, admin, and worker operations plus the HTTP surface exposing them.

pub mod error;
pub mod requests;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use error::PortalError;
pub use requests::{
    AssignRequest, AvailabilityRequest, ComplaintSubmission, Credentials, MarkSuccessRequest,
    StatusUpdateRequest, WorkerLookup,
};
pub use router::portal_router;
pub use service::PortalService;
