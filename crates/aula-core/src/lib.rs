//! `aula-core` — configuration and desired-state model for the aula recorder.
//!
//! Holds everything the other crates share: the daemon configuration
//! (`aula.toml` + `AULA_*` env overrides), the YAML schedule file model and
//! its fail-safe loader, and the [`CaptureRequest`] payload handed to each
//! recording run.
//!
//! The schedule loader deliberately never returns an error: an unreadable or
//! malformed schedule file yields an empty [`schedule::DesiredSchedule`], so
//! the next reconciliation pass tears the live schedule down rather than
//! crashing the daemon. See `DESIGN.md` for the policy discussion.

pub mod config;
pub mod error;
pub mod schedule;

pub use config::AulaConfig;
pub use error::{AulaError, Result};
pub use schedule::{CaptureRequest, DesiredSchedule, LectureBlock, RoomSlot, ScheduleLoader};
