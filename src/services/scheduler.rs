//! Schedule queries: per-label aggregation and nearest-occurrence selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Local};
use metrics::counter;

use crate::config::METRIC_SCHEDULE_RETRIEVED;
use crate::error::AppResult;
use crate::models::{Schedule, Window};
use crate::services::active_hours::{ActiveHoursError, ActiveHoursProbe};
use crate::services::loader::{self, ConfigReader};

/// Answers schedule queries against the configuration directory. Stateless:
/// every query re-reads configuration and re-derives occurrences, so two
/// overlapping requests may observe different snapshots.
pub struct SchedulerService {
    conf_dir: PathBuf,
    reader: Arc<dyn ConfigReader>,
    active_hours: Arc<dyn ActiveHoursProbe>,
}

impl SchedulerService {
    pub fn new(
        conf_dir: PathBuf,
        reader: Arc<dyn ConfigReader>,
        active_hours: Arc<dyn ActiveHoursProbe>,
    ) -> Self {
        Self {
            conf_dir,
            reader,
            active_hours,
        }
    }

    pub fn conf_dir(&self) -> &Path {
        &self.conf_dir
    }

    /// Calculates one schedule per requested label at `now`. With no labels
    /// given, every configured label is reported. Labels that yield no
    /// schedule are logged and omitted.
    pub fn schedule(&self, labels: &[String], now: DateTime<Local>) -> AppResult<Vec<Schedule>> {
        let mut map = loader::windows(&self.conf_dir, self.reader.as_ref(), now)?;
        match self.active_hours.active_hours() {
            Ok((start, end)) => map.add([Window::active_hours(start, end, now)]),
            Err(err @ ActiveHoursError::Unsupported { .. }) => {
                tracing::debug!(%err, "no active hours window for this host");
            }
        }
        let names: Vec<String> = if labels.is_empty() {
            map.keys()
        } else {
            labels.to_vec()
        };
        tracing::info!(labels = %names.join(", "), "aggregating schedule");

        let mut out = Vec::with_capacity(names.len());
        for name in &names {
            let schedules = map.aggregate_schedules(name, now);
            let found = !schedules.is_empty();
            counter!(
                METRIC_SCHEDULE_RETRIEVED,
                "request" => name.clone(),
                "success" => if found { "1" } else { "0" }
            )
            .increment(1);
            if !found {
                tracing::error!(label = %name, "no schedule found for label");
                continue;
            }
            if let Some(nearest) = find_nearest(&schedules, now) {
                out.push(nearest);
            }
        }
        Ok(out)
    }

    /// The synthetic window for the host's active hours, when the platform
    /// exposes them.
    pub fn active_hours_window(&self, now: DateTime<Local>) -> Result<Window, ActiveHoursError> {
        let (start, end) = self.active_hours.active_hours()?;
        Ok(Window::active_hours(start, end, now))
    }
}

/// Selects the single schedule to present for a label: an open one if any,
/// otherwise the occurrence whose opening is nearest to `now`, preferring
/// the future over the past.
pub(crate) fn find_nearest(schedules: &[Schedule], now: DateTime<Local>) -> Option<Schedule> {
    let mut best: Option<&Schedule> = None;
    for candidate in schedules {
        if candidate.is_open(now) {
            return Some(candidate.clone());
        }
        let Some(current) = best else {
            best = Some(candidate);
            continue;
        };
        let zero = Duration::zero();
        let delta = candidate.opens - now;
        let best_delta = current.opens - now;
        // future beats past
        if delta > zero && best_delta < zero {
            best = Some(candidate);
        }
        // both in the future, candidate closer to now
        if delta >= zero && best_delta >= zero && delta < best_delta {
            best = Some(candidate);
        }
        // both in the past, candidate closer to now
        if delta < zero && best_delta < zero && delta > best_delta {
            best = Some(candidate);
        }
    }
    best.cloned()
}
