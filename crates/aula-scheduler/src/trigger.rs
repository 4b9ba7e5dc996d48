//! Weekly wall-clock trigger times in a fixed timezone.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{Result, SchedulerError};
use crate::key::parse_weekday;

/// A recurring trigger: every `day` at `hour:minute` local time in `tz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTrigger {
    pub day: Weekday,
    pub hour: u32,
    pub minute: u32,
    pub tz: Tz,
}

impl WeeklyTrigger {
    /// Parse a schedule entry's `day` and `"HH:MM"` time.
    pub fn parse(day: &str, time: &str, tz: Tz) -> Result<Self> {
        let day = parse_weekday(day)?;
        let (hour, minute) = parse_hhmm(time)?;
        Ok(Self {
            day,
            hour,
            minute,
            tz,
        })
    }

    /// Next occurrence strictly after `after`, as a UTC instant.
    ///
    /// The candidate is built on the local calendar so a recording scheduled
    /// for 09:00 Vienna time stays at 09:00 across DST changes. An ambiguous
    /// local time (clocks rolled back) resolves to the earlier instant; a
    /// nonexistent one (spring-forward gap) skips to the following week.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&self.tz);
        let today_dow = local.weekday().num_days_from_monday() as i64;
        let target_dow = self.day.num_days_from_monday() as i64;

        let mut date = local.date_naive() + Duration::days((target_dow - today_dow).rem_euclid(7));

        // Two probes are normally enough (this week, else next week); the
        // third covers a candidate lost to a DST gap whose replacement has
        // also already passed.
        for _ in 0..3 {
            if let Some(at) = self.at_local_date(date) {
                if at > after {
                    return Some(at);
                }
            }
            date = date + Duration::days(7);
        }
        None
    }

    fn at_local_date(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.tz
            .with_ymd_and_hms(
                date.year(),
                date.month(),
                date.day(),
                self.hour,
                self.minute,
                0,
            )
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn parse_hhmm(time: &str) -> Result<(u32, u32)> {
    let invalid = || SchedulerError::InvalidTime(time.to_string());

    let (h, m) = time.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}
