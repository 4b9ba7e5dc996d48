//! `aula-scheduler` — weekly timer registry and schedule reconciliation.
//!
//! # Overview
//!
//! The [`reconcile::Reconciler`] owns the live schedule: a map from
//! [`key::SlotKey`] (day, time, room, duration — NOT the lecture name) to the
//! opaque handle of a job registered with the [`registry::TimerRegistry`].
//! Each pass it is handed a freshly loaded desired state, computes the
//! minimal diff, and applies only the additions and removals needed to
//! converge. Unchanged slots are never touched, so an edited schedule file
//! cannot disturb recordings it does not mention.
//!
//! The registry itself never executes anything: its pump returns the due
//! [`aula_core::CaptureRequest`]s and the caller dispatches them, which keeps
//! a slow capture from ever stalling the tick loop.

pub mod error;
pub mod key;
pub mod reconcile;
pub mod registry;
pub mod trigger;

pub use error::{Result, SchedulerError};
pub use key::SlotKey;
pub use reconcile::Reconciler;
pub use registry::{JobHandle, JobTimer, TimerRegistry};
pub use trigger::WeeklyTrigger;
