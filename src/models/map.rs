//! Label map: windows grouped by the labels they carry.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::models::schedule::Schedule;
use crate::models::window::{Window, WindowsDoc};

/// Correlates windows to their defined labels. A window appears under each
/// of its labels; keys are lowercase. Built per request from on-disk
/// configuration and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowMap {
    entries: HashMap<String, Vec<Window>>,
}

impl WindowMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// All configured label names. Iteration order is not stable.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds windows under each of their labels.
    pub fn add(&mut self, windows: impl IntoIterator<Item = Window>) {
        for window in windows {
            for label in &window.labels {
                self.entries
                    .entry(label.to_lowercase())
                    .or_default()
                    .push(window.clone());
            }
        }
    }

    /// The windows carrying `label`, matched case-insensitively.
    pub fn find(&self, label: &str) -> &[Window] {
        self.entries
            .get(&label.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A named window within a label's windows.
    pub fn find_window(&self, window: &str, label: &str) -> Option<&Window> {
        self.find(label).iter().find(|w| w.name == window)
    }

    /// All distinct windows stored in the map.
    pub fn unique_windows(&self) -> Vec<Window> {
        let mut unique: Vec<Window> = Vec::new();
        for windows in self.entries.values() {
            for window in windows {
                if !unique.contains(window) {
                    unique.push(window.clone());
                }
            }
        }
        unique
    }

    /// The concrete schedules a caller should consider for `label`: one copy
    /// of each carrying window's schedule renamed to the label, with
    /// overlapping intervals merged and exact duplicates removed.
    ///
    /// Merged output can still contain several schedules when occurrences do
    /// not overlap; nearest-selection happens downstream.
    pub fn aggregate_schedules(&self, request: &str, now: DateTime<Local>) -> Vec<Schedule> {
        let request = request.to_lowercase();
        let mut schedules: Vec<Schedule> = self
            .find(&request)
            .iter()
            .map(|w| {
                let mut schedule = w.schedule.clone();
                schedule.name = request.clone();
                schedule
            })
            .collect();
        schedules.sort_by_key(|s| s.opens);

        let mut out = Vec::new();
        while !schedules.is_empty() {
            let mut head = schedules.remove(0);
            let mut i = schedules.len();
            while i > 0 {
                i -= 1;
                if head.combine(&schedules[i], now).is_ok() {
                    schedules.remove(i);
                }
            }
            out.push(head);
        }
        dedup_schedules(out)
    }
}

fn dedup_schedules(schedules: Vec<Schedule>) -> Vec<Schedule> {
    let mut unique: Vec<Schedule> = Vec::with_capacity(schedules.len());
    for schedule in schedules {
        if !unique.contains(&schedule) {
            unique.push(schedule);
        }
    }
    unique
}

/// Serializes as a configuration document holding the map's distinct windows.
impl Serialize for WindowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let doc = WindowsDoc {
            windows: self.unique_windows().iter().map(Window::doc).collect(),
        };
        doc.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::schedule::State;
    use crate::models::window::WindowDoc;

    fn test_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2021, 6, 15, 12, 30, 0).unwrap()
    }

    fn window(name: &str, labels: &[&str], now: DateTime<Local>) -> Window {
        let doc = WindowDoc {
            name: name.to_string(),
            format: 1,
            schedule: "* 0 */1 * * *".to_string(),
            duration: "1h".to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            ..WindowDoc::default()
        };
        Window::from_doc(doc, now).unwrap()
    }

    fn interval_window(
        name: &str,
        label: &str,
        opens: DateTime<Local>,
        closes: DateTime<Local>,
    ) -> Window {
        let mut w = window(name, &[label], test_now());
        w.schedule = Schedule {
            name: name.to_string(),
            state: State::Closed,
            opens,
            closes,
            duration: closes - opens,
        };
        w
    }

    #[test]
    fn keys_and_find() {
        let now = test_now();
        let mut map = WindowMap::new();
        map.add([
            window("os patching", &["os", "default"], now),
            window("firmware", &["Firmware"], now),
        ]);
        let mut keys = map.keys();
        keys.sort();
        assert_eq!(keys, vec!["default", "firmware", "os"]);
        assert_eq!(map.find("os").len(), 1);
        assert_eq!(map.find("FIRMWARE").len(), 1, "lookup is case-insensitive");
        assert!(map.find("missing").is_empty());
        assert!(map.find_window("os patching", "default").is_some());
        assert!(map.find_window("nope", "default").is_none());
    }

    #[test]
    fn unique_windows_deduplicates_across_labels() {
        let now = test_now();
        let mut map = WindowMap::new();
        let shared = window("shared", &["os", "default"], now);
        map.add([shared.clone(), window("solo", &["os"], now)]);
        let unique = map.unique_windows();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique.iter().filter(|w| **w == shared).count(), 1);
    }

    #[test]
    fn map_serializes_distinct_windows() {
        let now = test_now();
        let mut map = WindowMap::new();
        map.add([window("shared", &["os", "default"], now)]);
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value["Windows"].as_array().unwrap().len(), 1);
        assert_eq!(value["Windows"][0]["Name"], "shared");
    }

    #[test]
    fn aggregate_merges_overlapping_schedules() {
        let now = test_now();
        let mut map = WindowMap::new();
        map.add([
            interval_window("a", "maint", now - Duration::minutes(5), now),
            interval_window(
                "b",
                "maint",
                now - Duration::minutes(2),
                now + Duration::minutes(2),
            ),
        ]);
        let out = map.aggregate_schedules("maint", now);
        assert_eq!(out.len(), 1);
        let merged = &out[0];
        assert_eq!(merged.name, "maint", "schedule renamed to the label");
        assert_eq!(merged.opens, now - Duration::minutes(5));
        assert_eq!(merged.closes, now + Duration::minutes(2));
        assert_eq!(merged.duration, Duration::minutes(7));
        assert_eq!(merged.state, State::Open);
    }

    #[test]
    fn aggregate_preserves_touching_schedules() {
        let now = test_now();
        let mut map = WindowMap::new();
        map.add([
            interval_window("a", "maint", now - Duration::minutes(5), now),
            interval_window("b", "maint", now, now + Duration::minutes(5)),
        ]);
        let out = map.aggregate_schedules("maint", now);
        assert_eq!(out.len(), 2, "intervals sharing one instant stay separate");
    }

    #[test]
    fn aggregate_deduplicates_identical_schedules() {
        let now = test_now();
        let opens = now + Duration::hours(2);
        let closes = now + Duration::hours(3);
        let mut map = WindowMap::new();
        map.add([
            interval_window("a", "maint", opens, closes),
            interval_window("b", "maint", opens, closes),
        ]);
        let out = map.aggregate_schedules("maint", now);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn aggregate_unknown_label_is_empty() {
        let map = WindowMap::new();
        assert!(map.aggregate_schedules("missing", test_now()).is_empty());
    }

    #[test]
    fn dedup_keeps_first_of_each_by_open_order() {
        let now = test_now();
        let a = Schedule {
            name: "maint".to_string(),
            state: State::Closed,
            opens: now - Duration::minutes(5),
            closes: now,
            duration: Duration::minutes(5),
        };
        let overlap = Schedule {
            name: "maint".to_string(),
            state: State::Closed,
            opens: now - Duration::minutes(2),
            closes: now + Duration::minutes(2),
            duration: Duration::minutes(4),
        };
        let b = Schedule {
            name: "maint".to_string(),
            state: State::Closed,
            opens: now,
            closes: now + Duration::minutes(5),
            duration: Duration::minutes(5),
        };
        let big = Schedule {
            name: "maint".to_string(),
            state: State::Closed,
            opens: now - Duration::minutes(5),
            closes: now + Duration::minutes(10),
            duration: Duration::minutes(15),
        };
        let input = vec![
            a.clone(),
            a.clone(),
            b.clone(),
            overlap.clone(),
            b.clone(),
            big.clone(),
        ];
        let mut unique = dedup_schedules(input);
        unique.sort_by_key(|s| s.opens);
        let mut want = vec![a, b, overlap, big];
        want.sort_by_key(|s| s.opens);
        assert_eq!(unique, want);
    }
}
