//! Recurrence expressions.
//!
//! A recurrence is a six-field, seconds-precision cron expression:
//! `second minute hour day-of-month month day-of-week`. Standard syntax is
//! accepted (`*`, ranges, lists, steps) along with `@hourly`-style
//! descriptors. The parsed form exposes a single primitive, the next
//! activation strictly after a given instant.

use std::str::FromStr;

use chrono::{DateTime, Local};
use cron::{Schedule, TimeUnitSpec};
use thiserror::Error;

/// The expression that activates on every second.
pub const EVERY_SECOND: &str = "* * * * * *";

const FIELD_COUNT: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("expected {FIELD_COUNT} fields in recurrence {expr:?}, found {found}")]
    FieldCount { expr: String, found: usize },

    #[error("invalid recurrence {expr:?}: {reason}")]
    Invalid { expr: String, reason: String },
}

/// A parsed recurrence expression.
#[derive(Debug, Clone)]
pub struct Recurrence {
    expr: String,
    schedule: Schedule,
}

impl Recurrence {
    /// Parses a six-field expression or an `@`-descriptor.
    pub fn parse(expr: &str) -> Result<Self, RecurrenceError> {
        let trimmed = expr.trim();
        if !trimmed.starts_with('@') {
            let found = trimmed.split_whitespace().count();
            if found != FIELD_COUNT {
                return Err(RecurrenceError::FieldCount {
                    expr: expr.to_string(),
                    found,
                });
            }
        }
        let schedule = Schedule::from_str(trimmed).map_err(|e| RecurrenceError::Invalid {
            expr: expr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            expr: trimmed.to_string(),
            schedule,
        })
    }

    /// The source expression.
    pub fn expression(&self) -> &str {
        &self.expr
    }

    /// The smallest activation instant strictly greater than `ts`, if any.
    pub fn next_after(&self, ts: DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(&ts).next()
    }

    /// Whether every field of the parsed expression matches everything, i.e.
    /// the recurrence activates on every second. `* * * * * *` and spellings
    /// that parse to the same thing (such as `*/1` in every field) all
    /// qualify.
    pub fn matches_every_second(&self) -> bool {
        self.schedule.seconds().is_all()
            && self.schedule.minutes().is_all()
            && self.schedule.hours().is_all()
            && self.schedule.days_of_month().is_all()
            && self.schedule.months().is_all()
            && self.schedule.days_of_week().is_all()
    }
}

/// Equality on the source expression only; parse artifacts such as the
/// attached zone are not compared.
impl PartialEq for Recurrence {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for Recurrence {}
