//! Host active-hours lookup.
//!
//! Some platforms let the user or machine admin configure "active hours"
//! during which interactive use is expected. The probe is a capability so
//! the scheduling core never touches an operating-system API directly; hosts
//! without the setting report the lookup as unsupported and no synthetic
//! window is injected.

use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActiveHoursError {
    #[error("active hours lookup unsupported on this platform ({os})")]
    Unsupported { os: &'static str },
}

/// Capability yielding the host's configured active hours.
pub trait ActiveHoursProbe: Send + Sync {
    /// The `(start, end)` of the currently configured active hours.
    fn active_hours(&self) -> Result<(DateTime<Local>, DateTime<Local>), ActiveHoursError>;
}

/// Probe backed by the host operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsActiveHours;

impl ActiveHoursProbe for OsActiveHours {
    fn active_hours(&self) -> Result<(DateTime<Local>, DateTime<Local>), ActiveHoursError> {
        Err(ActiveHoursError::Unsupported {
            os: std::env::consts::OS,
        })
    }
}
