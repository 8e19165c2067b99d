//! Maintenance-window definitions and their derived schedules.

use std::time::Instant;

use chrono::{DateTime, Duration, Local, Timelike};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{AppError, AppResult};
use crate::models::schedule::{epoch, Schedule, State};
use crate::recurrence::Recurrence;
use crate::duration::{format_duration, parse_duration};

/// Wall-clock budget for the activation boundary search.
const ACTIVATION_SEARCH_BUDGET: std::time::Duration = std::time::Duration::from_secs(5);

/// Cap on the backward activation walk. A recurrence whose previous
/// activation is more than a century back is treated as having none.
const MAX_LOOKBACK_MINUTES: i64 = 100 * 366 * 24 * 60;

/// Schedule format tag. The wire value is an integer; only cron (`1`) is
/// recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Cron,
}

impl Format {
    pub fn as_i16(self) -> i16 {
        match self {
            Format::Cron => 1,
        }
    }
}

impl TryFrom<i16> for Format {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, i16> {
        match value {
            1 => Ok(Format::Cron),
            other => Err(other),
        }
    }
}

/// Raw window document as written in configuration files and on the wire.
/// All fields are optional at the JSON level; [`Window::from_doc`] enforces
/// the decode contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WindowDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub format: i16,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Local>>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Configuration file shape: `{"Windows": [ ... ]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WindowsDoc {
    #[serde(default)]
    pub windows: Vec<WindowDoc>,
}

/// A validated maintenance window with its derived schedule.
#[derive(Debug, Clone)]
pub struct Window {
    pub name: String,
    pub format: Format,
    pub cron_string: String,
    /// Parsed recurrence; `None` only for the synthetic active-hours window.
    pub recurrence: Option<Recurrence>,
    pub duration: Duration,
    pub starts: Option<DateTime<Local>>,
    pub expires: Option<DateTime<Local>>,
    pub labels: Vec<String>,
    pub schedule: Schedule,
}

/// Equality on user-visible fields. The parsed recurrence is represented by
/// its source expression, so structurally identical windows compare equal
/// regardless of parse artifacts such as the attached zone.
impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.format == other.format
            && self.cron_string == other.cron_string
            && self.duration == other.duration
            && self.starts == other.starts
            && self.expires == other.expires
            && self.labels == other.labels
            && self.schedule == other.schedule
    }
}

fn unique_lowercase(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.to_lowercase();
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

impl Window {
    /// Decodes a raw document into a validated window, deriving its schedule
    /// against `now`.
    ///
    /// Validations, in order: name present, format recognized, recurrence
    /// parses under the format, at least one label (labels are lowercased and
    /// deduplicated), duration parses and is non-negative.
    pub fn from_doc(doc: WindowDoc, now: DateTime<Local>) -> AppResult<Window> {
        if doc.name.is_empty() {
            return Err(AppError::UnnamedWindow);
        }
        let format = Format::try_from(doc.format).map_err(|value| AppError::InvalidFormat {
            name: doc.name.clone(),
            format: value,
        })?;
        let recurrence = match format {
            Format::Cron => {
                Recurrence::parse(&doc.schedule).map_err(|e| AppError::InvalidSchedule {
                    name: doc.name.clone(),
                    expr: doc.schedule.clone(),
                    reason: e.to_string(),
                })?
            }
        };
        if doc.labels.is_empty() {
            return Err(AppError::NoLabels {
                name: doc.name.clone(),
            });
        }
        let labels = unique_lowercase(doc.labels);
        let duration =
            parse_duration(&doc.duration).map_err(|e| AppError::InvalidDuration {
                name: doc.name.clone(),
                value: doc.duration.clone(),
                reason: e.to_string(),
            })?;
        if duration < Duration::zero() {
            return Err(AppError::InvalidDuration {
                name: doc.name.clone(),
                value: doc.duration.clone(),
                reason: "duration must not be negative".to_string(),
            });
        }

        let mut window = Window {
            schedule: Schedule::degenerate(&doc.name, duration),
            name: doc.name,
            format,
            cron_string: recurrence.expression().to_string(),
            recurrence: Some(recurrence),
            duration,
            starts: doc.starts,
            expires: doc.expires,
            labels,
        };
        window.schedule = window.derive_schedule(now);
        Ok(window)
    }

    /// The synthetic window the active-hours probe injects: a single
    /// occurrence spanning the host's configured active hours.
    pub fn active_hours(
        start: DateTime<Local>,
        end: DateTime<Local>,
        now: DateTime<Local>,
    ) -> Window {
        let duration = end - start;
        let mut schedule = Schedule {
            name: "active_hours".to_string(),
            state: State::Closed,
            opens: start,
            closes: end,
            duration,
        };
        schedule.state = schedule.state_at(now);
        Window {
            name: "active_hours".to_string(),
            format: Format::Cron,
            cron_string: String::new(),
            recurrence: None,
            duration,
            starts: Some(start),
            expires: Some(end),
            labels: vec!["active_hours".to_string()],
            schedule,
        }
    }

    /// The raw document for this window, as it appears on the wire.
    pub fn doc(&self) -> WindowDoc {
        WindowDoc {
            name: self.name.clone(),
            format: self.format.as_i16(),
            schedule: self.cron_string.clone(),
            duration: format_duration(self.duration),
            starts: self.starts,
            expires: self.expires,
            labels: self.labels.clone(),
        }
    }

    /// A zero `starts` counts as started.
    pub fn started(&self, now: DateTime<Local>) -> bool {
        self.starts.map_or(true, |s| s < now)
    }

    pub fn expired(&self, now: DateTime<Local>) -> bool {
        self.expires.map_or(false, |e| e < now)
    }

    /// The activation that begins the next occurrence at or after `ts`.
    ///
    /// Seconds-granular recurrences can report effectively every second as a
    /// valid "next" value, so the search must converge on a stable boundary:
    /// probe forward once, then re-probe from two seconds before the answer
    /// until two consecutive probes agree. An open recurrence never reaches such a
    /// quorum and short-circuits to the minute floor of `ts`. Returns `None`
    /// when the recurrence has no further activation or the wall-clock budget
    /// runs out.
    pub fn next_activation(&self, ts: DateTime<Local>) -> Option<DateTime<Local>> {
        let recurrence = self.recurrence.as_ref()?;
        // Activations below minute granularity are not supported; floor the
        // timestamp to its minute.
        let ts = ts - Duration::seconds(i64::from(ts.second()));
        if recurrence.matches_every_second() {
            return Some(ts);
        }
        let started = Instant::now();
        let mut probe = recurrence.next_after(ts)?;
        while started.elapsed() < ACTIVATION_SEARCH_BUDGET {
            let earlier = recurrence.next_after(probe - Duration::seconds(2))?;
            if probe == earlier {
                return Some(earlier);
            }
            probe = earlier;
        }
        None
    }

    /// The most recent activation at or before `date`.
    ///
    /// The recurrence has no backward primitive, so the search walks `date`
    /// backward by Fibonacci-growing minute offsets until the forward answer
    /// from the offset instant lands strictly before the forward answer from
    /// `date` itself. The geometric ramp catches both high- and low-frequency
    /// recurrences in a handful of probes.
    pub fn last_activation(&self, date: DateTime<Local>) -> Option<DateTime<Local>> {
        let next = self.next_activation(date)?;
        let mut last = next;
        let (mut fib_current, mut fib_last) = (1i64, 1i64);
        while last == next {
            (fib_current, fib_last) = (fib_last, fib_current + fib_last);
            if fib_current > MAX_LOOKBACK_MINUTES {
                return None;
            }
            last = self.next_activation(date - Duration::minutes(fib_current))?;
        }
        Some(last)
    }

    /// Computes the current effective occurrence of this window at `now`.
    fn derive_schedule(&self, now: DateTime<Local>) -> Schedule {
        let (last_open, next_open) = if self.started(now) && !self.expired(now) {
            (self.last_activation(now), self.next_activation(now))
        } else if self.expired(now) {
            // Both bounds track the last valid occurrence once expired.
            let last = self
                .expires
                .and_then(|expires| self.last_activation(expires));
            let next = last.and_then(|open| self.last_activation(open));
            (last, next)
        } else {
            let next = self.starts.and_then(|starts| self.next_activation(starts));
            (next, next)
        };

        let last_open = last_open.unwrap_or_else(epoch);
        let next_open = next_open.unwrap_or_else(epoch);
        let last_close = last_open + self.duration;
        let next_close = next_open + self.duration;

        let (opens, closes) = if last_open < now && now < last_close {
            (last_open, last_close)
        } else {
            (next_open, next_close)
        };
        let mut schedule = Schedule {
            name: self.name.clone(),
            state: State::Closed,
            opens,
            closes,
            duration: self.duration,
        };
        schedule.state = schedule.state_at(now);
        schedule
    }
}

impl Serialize for Window {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.doc().serialize(serializer)
    }
}
