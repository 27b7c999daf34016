//! Complaint intake, worker assignment, and resolution tracking.
//!
//! The [`lifecycle`] module holds the transition rules, [`store`] persists users, workers and
//! complaints, and [`portal`] exposes the service facade plus the HTTP router built on top of it.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod portal;
pub mod store;
pub mod telemetry;
