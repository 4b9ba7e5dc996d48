//! Schedule reconciliation — converge the live timer state toward the
//! desired-state file with a minimal add/remove diff.

use std::collections::HashMap;

use aula_core::schedule::{CaptureRequest, DesiredSchedule};
use chrono_tz::Tz;
use tracing::{error, info};

use crate::key::SlotKey;
use crate::registry::{JobHandle, JobTimer};
use crate::trigger::WeeklyTrigger;

/// Owns the live schedule map. Sole writer; rebuilds the map atomically at
/// the end of every pass, so there is never a partially-updated view.
pub struct Reconciler {
    live: HashMap<SlotKey, JobHandle>,
    tz: Tz,
}

impl Reconciler {
    /// Start with an empty live schedule. `tz` is the fixed timezone every
    /// schedule entry's day+time is interpreted in.
    pub fn new(tz: Tz) -> Self {
        Self {
            live: HashMap::new(),
            tz,
        }
    }

    /// Number of currently registered jobs.
    pub fn live_jobs(&self) -> usize {
        self.live.len()
    }

    /// One reconciliation pass.
    ///
    /// - slots in `desired` but not live are registered with `timer`;
    /// - live slots absent from `desired` are cancelled;
    /// - slots present in both are left completely untouched.
    ///
    /// Entries with an unrecognized day or malformed time are skipped with an
    /// error log and never abort the pass. Duplicate entries collapsing to
    /// one key produce a single job; the last-seen entry's lecture name wins
    /// for a fresh registration. Running the same desired state twice in a
    /// row performs zero registry mutations.
    pub fn reconcile(&mut self, timer: &mut impl JobTimer, desired: &DesiredSchedule) {
        let wanted = self.flatten(desired);

        let mut next = HashMap::with_capacity(wanted.len());
        let mut added = 0usize;

        for (key, (trigger, request)) in wanted {
            if let Some(handle) = self.live.remove(&key) {
                // Already scheduled — reuse the handle without touching the
                // registry. Whatever is left in `self.live` afterwards is
                // stale.
                next.insert(key, handle);
            } else {
                let handle = timer.register(trigger, request);
                info!(key = %key, "added recording schedule");
                next.insert(key, handle);
                added += 1;
            }
        }

        let mut removed = 0usize;
        for (key, handle) in self.live.drain() {
            timer.cancel(&handle);
            info!(key = %key, "removed outdated recording schedule");
            removed += 1;
        }

        self.live = next;

        if added > 0 || removed > 0 {
            info!(added, removed, live = self.live.len(), "schedule updated");
        }
    }

    /// Flatten the desired state into key → (trigger, request), skipping
    /// entries that fail to parse. Insertion order makes the last duplicate
    /// win.
    fn flatten(
        &self,
        desired: &DesiredSchedule,
    ) -> HashMap<SlotKey, (WeeklyTrigger, CaptureRequest)> {
        let mut wanted = HashMap::new();

        for block in &desired.lectures {
            for slot in &block.rooms {
                let key = match SlotKey::for_slot(slot) {
                    Ok(key) => key,
                    Err(e) => {
                        error!(lecture = %block.lecture, room = %slot.room_id, "skipping schedule entry: {e}");
                        continue;
                    }
                };
                let trigger = match WeeklyTrigger::parse(&slot.day, &slot.time, self.tz) {
                    Ok(trigger) => trigger,
                    Err(e) => {
                        error!(lecture = %block.lecture, room = %slot.room_id, "skipping schedule entry: {e}");
                        continue;
                    }
                };
                let request = CaptureRequest {
                    lecture: block.lecture.clone(),
                    room_id: slot.room_id.clone(),
                    duration_secs: key.duration_secs,
                };
                wanted.insert(key, (trigger, request));
            }
        }

        wanted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_core::schedule::{LectureBlock, RoomSlot};
    use chrono_tz::Europe::Vienna;

    /// Counting fake for the registry seam: records every register/cancel so
    /// tests can assert the exact diff the reconciler applied.
    #[derive(Default)]
    struct FakeTimer {
        registered: Vec<(JobHandle, CaptureRequest)>,
        cancelled: Vec<JobHandle>,
    }

    impl JobTimer for FakeTimer {
        fn register(&mut self, _trigger: WeeklyTrigger, request: CaptureRequest) -> JobHandle {
            let handle = JobHandle::new();
            self.registered.push((handle.clone(), request));
            handle
        }

        fn cancel(&mut self, handle: &JobHandle) -> bool {
            self.cancelled.push(handle.clone());
            true
        }
    }

    fn slot(day: &str, time: &str, room: &str) -> RoomSlot {
        RoomSlot {
            day: day.to_string(),
            time: time.to_string(),
            room_id: room.to_string(),
            duration: None,
        }
    }

    fn schedule(blocks: Vec<(&str, Vec<RoomSlot>)>) -> DesiredSchedule {
        DesiredSchedule {
            lectures: blocks
                .into_iter()
                .map(|(lecture, rooms)| LectureBlock {
                    lecture: lecture.to_string(),
                    rooms,
                })
                .collect(),
        }
    }

    #[test]
    fn unchanged_desired_state_is_idempotent() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);
        let desired = schedule(vec![(
            "Analysis 1",
            vec![slot("mon", "09:00", "HS-1"), slot("thu", "13:15", "HS-2")],
        )]);

        rec.reconcile(&mut timer, &desired);
        assert_eq!(timer.registered.len(), 2);
        assert_eq!(timer.cancelled.len(), 0);

        // Second pass with the identical desired state: zero mutations.
        rec.reconcile(&mut timer, &desired);
        assert_eq!(timer.registered.len(), 2);
        assert_eq!(timer.cancelled.len(), 0);
        assert_eq!(rec.live_jobs(), 2);
    }

    #[test]
    fn identity_excludes_lecture_name() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);
        let desired = schedule(vec![
            ("Analysis 1", vec![slot("mon", "09:00", "HS-1")]),
            ("Analysis 1 (VO)", vec![slot("mon", "09:00", "HS-1")]),
        ]);

        rec.reconcile(&mut timer, &desired);
        assert_eq!(timer.registered.len(), 1);
        assert_eq!(rec.live_jobs(), 1);
        // Last-seen entry's lecture name wins for the registration.
        assert_eq!(timer.registered[0].1.lecture, "Analysis 1 (VO)");
    }

    #[test]
    fn lecture_rename_does_not_reschedule() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);

        rec.reconcile(
            &mut timer,
            &schedule(vec![("Old name", vec![slot("mon", "09:00", "HS-1")])]),
        );
        rec.reconcile(
            &mut timer,
            &schedule(vec![("New name", vec![slot("mon", "09:00", "HS-1")])]),
        );

        // Documented limitation: a name-only edit is invisible to the diff.
        assert_eq!(timer.registered.len(), 1);
        assert_eq!(timer.cancelled.len(), 0);
    }

    #[test]
    fn diff_applies_only_additions_and_removals() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);

        // Live: {A, B}
        rec.reconcile(
            &mut timer,
            &schedule(vec![(
                "L",
                vec![slot("mon", "09:00", "A"), slot("tue", "09:00", "B")],
            )]),
        );
        let handle_of = |timer: &FakeTimer, room: &str| {
            timer
                .registered
                .iter()
                .find(|(_, r)| r.room_id == room)
                .map(|(h, _)| h.clone())
                .unwrap()
        };
        let a_handle = handle_of(&timer, "A");
        let b_handle = handle_of(&timer, "B");

        // Desired: {B, C}
        rec.reconcile(
            &mut timer,
            &schedule(vec![(
                "L",
                vec![slot("tue", "09:00", "B"), slot("wed", "09:00", "C")],
            )]),
        );

        // Exactly one register (C), exactly one cancel (A), B untouched.
        assert_eq!(timer.registered.len(), 3);
        assert_eq!(timer.registered[2].1.room_id, "C");
        assert_eq!(timer.cancelled, vec![a_handle]);
        assert_ne!(timer.cancelled[0], b_handle);
        assert_eq!(rec.live_jobs(), 2);
    }

    #[test]
    fn invalid_day_is_skipped_not_fatal() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);
        let desired = schedule(vec![(
            "L",
            vec![slot("funday", "09:00", "HS-1"), slot("fri", "09:00", "HS-2")],
        )]);

        rec.reconcile(&mut timer, &desired);
        assert_eq!(timer.registered.len(), 1);
        assert_eq!(timer.registered[0].1.room_id, "HS-2");
    }

    #[test]
    fn invalid_time_is_skipped_not_fatal() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);
        let desired = schedule(vec![(
            "L",
            vec![slot("mon", "25:99", "HS-1"), slot("mon", "09:00", "HS-2")],
        )]);

        rec.reconcile(&mut timer, &desired);
        assert_eq!(timer.registered.len(), 1);
        assert_eq!(timer.registered[0].1.room_id, "HS-2");
    }

    #[test]
    fn empty_desired_state_tears_down_all_live_jobs() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);

        rec.reconcile(
            &mut timer,
            &schedule(vec![(
                "L",
                vec![slot("mon", "09:00", "A"), slot("tue", "09:00", "B")],
            )]),
        );
        assert_eq!(rec.live_jobs(), 2);

        // The loader substitutes the empty schedule on any read error; by
        // composition that removes every live job (fail-safe-empty policy).
        rec.reconcile(&mut timer, &DesiredSchedule::default());
        assert_eq!(timer.cancelled.len(), 2);
        assert_eq!(rec.live_jobs(), 0);
    }

    #[test]
    fn mixed_case_duplicates_collapse_to_one_job() {
        let mut timer = FakeTimer::default();
        let mut rec = Reconciler::new(Vienna);
        let desired = schedule(vec![(
            "L",
            vec![slot("Monday", "09:00", "HS-1"), slot("monday", "09:00", "HS-1")],
        )]);

        rec.reconcile(&mut timer, &desired);
        assert_eq!(timer.registered.len(), 1);
        assert_eq!(rec.live_jobs(), 1);
    }

    #[test]
    fn works_against_the_real_registry() {
        use crate::registry::TimerRegistry;

        let mut registry = TimerRegistry::new();
        let mut rec = Reconciler::new(Vienna);

        rec.reconcile(
            &mut registry,
            &schedule(vec![("L", vec![slot("mon", "09:00", "HS-1")])]),
        );
        assert_eq!(registry.len(), 1);

        rec.reconcile(&mut registry, &DesiredSchedule::default());
        assert!(registry.is_empty());
    }
}
