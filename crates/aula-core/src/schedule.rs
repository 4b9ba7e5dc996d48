//! Desired-state schedule model — the YAML file the daemon converges toward.
//!
//! File shape:
//!
//! ```yaml
//! lectures:
//!   - lecture: "Algebra und Diskrete Mathematik"
//!     rooms:
//!       - day: monday
//!         time: "09:00"
//!         room_id: HS-1
//!         duration: 5400
//! ```

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Recording length used when a slot omits `duration`.
pub const DEFAULT_DURATION_SECS: u64 = 3600;

/// The whole schedule file. An absent or unreadable file deserializes to the
/// empty schedule via [`ScheduleLoader::load`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesiredSchedule {
    #[serde(default)]
    pub lectures: Vec<LectureBlock>,
}

/// One lecture and the weekly room slots it is recorded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LectureBlock {
    /// Lecture name — becomes the artifact subdirectory. Not part of slot
    /// identity: renaming a lecture does not reschedule its slots.
    pub lecture: String,
    #[serde(default)]
    pub rooms: Vec<RoomSlot>,
}

/// One recurring weekly slot, as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSlot {
    /// Day of week, case-insensitive ("monday", "Tue", ...).
    pub day: String,
    /// Wall-clock start, "HH:MM", 24h, in the daemon's configured timezone.
    pub time: String,
    /// Lecture-hall stream identifier, e.g. "HS-1".
    pub room_id: String,
    /// Recording length in seconds; defaults to one hour.
    pub duration: Option<u64>,
}

impl RoomSlot {
    pub fn duration_secs(&self) -> u64 {
        self.duration.unwrap_or(DEFAULT_DURATION_SECS)
    }
}

/// Immutable snapshot of one firing's arguments, taken at dispatch time.
/// Later reconciliation passes cannot affect an in-flight capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub lecture: String,
    pub room_id: String,
    pub duration_secs: u64,
}

/// Reads the schedule file fresh on every reconciliation pass.
///
/// Contract: `load` returns the best-known desired state and never fails.
/// Any IO or parse error is logged and yields the empty schedule, which the
/// reconciler then applies — tearing down all live jobs until the file is
/// readable again (fail-safe-empty).
pub struct ScheduleLoader {
    path: String,
}

impl ScheduleLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn load(&self) -> DesiredSchedule {
        match self.read() {
            Ok(schedule) => schedule,
            Err(e) => {
                error!(path = %self.path, "failed to load schedule configuration: {e}");
                DesiredSchedule::default()
            }
        }
    }

    fn read(&self) -> Result<DesiredSchedule, figment::Error> {
        // file_exact: a missing file is an error here, not an empty merge —
        // the operator should see it in the log.
        Figment::new()
            .merge(Yaml::file_exact(&self.path))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_schedule(contents: &str) -> (tempfile::TempDir, ScheduleLoader) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        let loader = ScheduleLoader::new(path.to_str().unwrap());
        (dir, loader)
    }

    #[test]
    fn parses_full_schedule() {
        let (_dir, loader) = write_schedule(
            r#"
lectures:
  - lecture: "Analysis 1"
    rooms:
      - day: monday
        time: "09:00"
        room_id: HS-1
        duration: 5400
      - day: Thursday
        time: "13:15"
        room_id: HS-2
"#,
        );
        let schedule = loader.load();
        assert_eq!(schedule.lectures.len(), 1);
        let block = &schedule.lectures[0];
        assert_eq!(block.lecture, "Analysis 1");
        assert_eq!(block.rooms.len(), 2);
        assert_eq!(block.rooms[0].duration_secs(), 5400);
    }

    #[test]
    fn missing_duration_defaults_to_one_hour() {
        let (_dir, loader) = write_schedule(
            "lectures:\n  - lecture: L\n    rooms:\n      - {day: mon, time: \"08:00\", room_id: R1}\n",
        );
        let schedule = loader.load();
        assert_eq!(schedule.lectures[0].rooms[0].duration_secs(), DEFAULT_DURATION_SECS);
    }

    #[test]
    fn missing_file_yields_empty_schedule() {
        let loader = ScheduleLoader::new("/nonexistent/config.yml");
        assert!(loader.load().lectures.is_empty());
    }

    #[test]
    fn malformed_yaml_yields_empty_schedule() {
        let (_dir, loader) = write_schedule("lectures: [unterminated\n");
        assert!(loader.load().lectures.is_empty());
    }

    #[test]
    fn empty_file_yields_empty_schedule() {
        let (_dir, loader) = write_schedule("");
        assert!(loader.load().lectures.is_empty());
    }

    #[test]
    fn file_without_lectures_key_yields_empty_schedule() {
        let (_dir, loader) = write_schedule("something_else: 1\n");
        assert!(loader.load().lectures.is_empty());
    }
}
