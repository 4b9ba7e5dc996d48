//! Slot identity — decides whether two schedule entries are the "same" job.

use std::fmt;

use aula_core::schedule::RoomSlot;
use chrono::Weekday;

use crate::error::{Result, SchedulerError};

/// Identity of one recurring weekly slot.
///
/// Two entries with equal keys denote the same scheduled job across
/// reconciliation passes, even when their lecture names differ — a
/// name-only edit is invisible to the diff and does not reschedule anything.
/// Equality is exact-value: the time string is compared verbatim, with no
/// fuzzy matching ("09:00" and "9:00" are different slots).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub day: Weekday,
    pub time: String,
    pub room_id: String,
    pub duration_secs: u64,
}

impl SlotKey {
    /// Build the key for a schedule entry, defaulting the duration to one
    /// hour. Fails only when the day name is unrecognized.
    pub fn for_slot(slot: &RoomSlot) -> Result<Self> {
        Ok(Self {
            day: parse_weekday(&slot.day)?,
            time: slot.time.clone(),
            room_id: slot.room_id.clone(),
            duration_secs: slot.duration_secs(),
        })
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}s",
            self.day, self.time, self.room_id, self.duration_secs
        )
    }
}

/// Map a day name to a weekday, case-insensitively.
///
/// Accepts full English names and their three-letter forms, matching what
/// operators actually write in the schedule file. Anything else is an
/// [`SchedulerError::InvalidDay`].
pub fn parse_weekday(day: &str) -> Result<Weekday> {
    match day.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(SchedulerError::InvalidDay(day.to_string())),
    }
}
