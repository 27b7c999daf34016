//! Complaint lifecycle: domain records and the transitions between their states.

pub mod domain;
pub mod engine;

pub use domain::{
    Complaint, ComplaintId, ComplaintStatus, NewComplaint, NewWorker, UnknownAction,
    UnknownStatus, User, Worker, WorkerAction, WorkerStatus,
};
pub use engine::{holds_active_assignment, TransitionError};
