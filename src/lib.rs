//! Aukera answers one question over a local HTTP interface: for each label,
//! when is the host's next (or current) maintenance window?
//!
//! Operators drop window definitions (a cron-style recurrence, a duration,
//! lifetime bounds, and labels) as JSON files into the platform
//! configuration directory. Every query re-reads that directory, derives
//! each window's concrete occurrence around the current instant, merges
//! overlapping occurrences per label, and reports the occurrence nearest to
//! now.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod services;

pub use error::{AppError, AppResult};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<services::SchedulerService>,
}
