//! Concrete window occurrences.

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::duration::{format_duration, parse_duration};

/// Whether a schedule is currently open for maintenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Open,
    #[default]
    Closed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombineError {
    #[error("names do not match: {left:?} != {right:?}")]
    NameMismatch { left: String, right: String },

    #[error("schedules do not overlap")]
    NoOverlap,
}

/// A concrete, time-bounded occurrence derived from a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub name: String,
    pub state: State,
    pub opens: DateTime<Local>,
    pub closes: DateTime<Local>,
    pub duration: Duration,
}

/// Sentinel for a schedule whose activation search failed; far enough in the
/// past that it can never report open and always loses nearest-selection to
/// any real occurrence.
pub(crate) fn epoch() -> DateTime<Local> {
    DateTime::<Utc>::UNIX_EPOCH.with_timezone(&Local)
}

impl Schedule {
    /// Degenerate schedule used when no activation could be resolved.
    pub(crate) fn degenerate(name: &str, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: State::Closed,
            opens: epoch(),
            closes: epoch(),
            duration,
        }
    }

    /// A schedule is open iff `opens <= now < closes`.
    pub fn is_open(&self, now: DateTime<Local>) -> bool {
        self.opens <= now && now < self.closes
    }

    pub fn state_at(&self, now: DateTime<Local>) -> State {
        if self.is_open(now) {
            State::Open
        } else {
            State::Closed
        }
    }

    /// Whether `other` falls during `self`. Comparison is strict on both
    /// endpoints: intervals that only touch at a single instant do not
    /// overlap.
    pub fn overlaps(&self, other: &Schedule) -> bool {
        // other opens earlier than and closes within self
        if other.opens < self.opens && self.opens < other.closes {
            return true;
        }
        // other closes later than and opens within self
        if self.closes < other.closes && other.opens < self.closes {
            return true;
        }
        // other opens and closes within self
        if self.opens < other.opens && other.closes < self.closes {
            return true;
        }
        // self opens and closes within other
        if other.opens < self.opens && self.closes < other.closes {
            return true;
        }
        // exact match
        other.opens == self.opens && other.closes == self.closes
    }

    /// Expands this schedule to the hull of itself and `other`, recomputing
    /// duration and state. Fails when the names differ or the intervals are
    /// disjoint, leaving `self` untouched.
    pub fn combine(&mut self, other: &Schedule, now: DateTime<Local>) -> Result<(), CombineError> {
        if self.name != other.name {
            return Err(CombineError::NameMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        if !self.overlaps(other) {
            return Err(CombineError::NoOverlap);
        }
        if other.opens < self.opens {
            self.opens = other.opens;
        }
        if self.closes < other.closes {
            self.closes = other.closes;
        }
        self.duration = self.closes - self.opens;
        self.state = self.state_at(now);
        Ok(())
    }
}

/// Wire shape: PascalCase keys, RFC3339 instants, duration string.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScheduleDoc {
    name: String,
    state: State,
    opens: DateTime<Local>,
    closes: DateTime<Local>,
    duration: String,
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ScheduleDoc {
            name: self.name.clone(),
            state: self.state,
            opens: self.opens,
            closes: self.closes,
            duration: format_duration(self.duration),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = ScheduleDoc::deserialize(deserializer)?;
        let duration = parse_duration(&doc.duration).map_err(serde::de::Error::custom)?;
        Ok(Schedule {
            name: doc.name,
            state: doc.state,
            opens: doc.opens,
            closes: doc.closes,
            duration,
        })
    }
}
