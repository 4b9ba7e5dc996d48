//! Timer registry — register/cancel weekly triggers and pump the due ones.

use std::collections::HashMap;
use std::fmt;

use aula_core::CaptureRequest;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::trigger::WeeklyTrigger;

/// Opaque handle to a registered job. Owned by the reconciler's live map;
/// the registry is the only code that looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(Uuid);

impl JobHandle {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The seam between the reconciler and the timer subsystem.
///
/// The reconciler is written against this trait so its diff logic can be
/// exercised with a counting fake instead of a live registry.
pub trait JobTimer {
    /// Register a recurring weekly job. Returns the handle to cancel it with.
    fn register(&mut self, trigger: WeeklyTrigger, request: CaptureRequest) -> JobHandle;

    /// Cancel a job's future firings. Returns false for an unknown handle.
    /// A capture already dispatched is unaffected.
    fn cancel(&mut self, handle: &JobHandle) -> bool;
}

struct ScheduledJob {
    trigger: WeeklyTrigger,
    request: CaptureRequest,
    next_fire: Option<DateTime<Utc>>,
}

/// In-process timer registry.
///
/// Purely passive: [`TimerRegistry::run_pending`] hands the due requests back
/// to the caller instead of executing anything, so the pump tick can never be
/// stalled by a long recording.
#[derive(Default)]
pub struct TimerRegistry {
    jobs: HashMap<JobHandle, ScheduledJob>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Collect every job whose trigger time has arrived, advancing each to
    /// its next occurrence. Jobs fire at most once per due window regardless
    /// of how late the pump tick runs.
    pub fn run_pending(&mut self, now: DateTime<Utc>) -> Vec<CaptureRequest> {
        let mut due = Vec::new();
        for (handle, job) in self.jobs.iter_mut() {
            let Some(at) = job.next_fire else { continue };
            if at <= now {
                debug!(job = %handle, scheduled_for = %at, "trigger due, dispatching");
                due.push(job.request.clone());
                job.next_fire = job.trigger.next_fire(now);
            }
        }
        due
    }
}

impl JobTimer for TimerRegistry {
    fn register(&mut self, trigger: WeeklyTrigger, request: CaptureRequest) -> JobHandle {
        let handle = JobHandle::new();
        let next_fire = trigger.next_fire(Utc::now());
        debug!(
            job = %handle,
            room = %request.room_id,
            next = ?next_fire,
            "registered weekly trigger"
        );
        self.jobs.insert(
            handle.clone(),
            ScheduledJob {
                trigger,
                request,
                next_fire,
            },
        );
        handle
    }

    fn cancel(&mut self, handle: &JobHandle) -> bool {
        let removed = self.jobs.remove(handle).is_some();
        if removed {
            debug!(job = %handle, "cancelled trigger");
        }
        removed
    }
}
