//! Discretized time axis
//!
//! The planning week is cut into 5-minute slots. Slot 0 is midnight at the
//! start of day 0; a default horizon covers seven days (2016 slots).
//!
//! Every offset used by the encoder (night rest, blocked days, preference
//! windows) goes through [`slot`] so that all components agree on where a day
//! or an hour begins.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of one slot in minutes
pub const SLOT_MINUTES: i64 = 5;

pub const SLOTS_PER_HOUR: i64 = 60 / SLOT_MINUTES;

pub const HOURS_PER_DAY: i64 = 24;

pub const SLOTS_PER_DAY: i64 = HOURS_PER_DAY * SLOTS_PER_HOUR;

pub const DAYS_PER_WEEK: i64 = 7;

/// One week of slots
pub const DEFAULT_HORIZON: i64 = DAYS_PER_WEEK * SLOTS_PER_DAY;

/// Largest accepted horizon: 52 weeks
pub const MAX_HORIZON: i64 = 52 * DEFAULT_HORIZON;

/// Night rest ends at 06:00
pub const NIGHT_END_HOUR: i64 = 6;

/// Night rest starts at 22:00
pub const NIGHT_START_HOUR: i64 = 22;

/// Offset of the end of morning rest within a day
pub const MORNING_END: i64 = slot(0, NIGHT_END_HOUR);

/// Offset of the start of evening rest within a day
pub const EVENING_START: i64 = slot(0, NIGHT_START_HOUR);

/// Absolute slot index of `hour` o'clock on `day`.
///
/// `slot(day, hour) = day * SLOTS_PER_DAY + hour * SLOTS_PER_HOUR`
pub const fn slot(day: i64, hour: i64) -> i64 {
    day * SLOTS_PER_DAY + hour * SLOTS_PER_HOUR
}

/// First slot of `day`
pub const fn day_start(day: i64) -> i64 {
    slot(day, 0)
}

/// The full-day range of `day`
pub const fn day_range(day: i64) -> SlotRange {
    SlotRange::new(day_start(day), day_start(day + 1))
}

// ============================================================================
// Slot ranges
// ============================================================================

/// Half-open range of slots `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: i64,
    pub end: i64,
}

impl SlotRange {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// `[start, start + len)`, with the end saturating at `i64::MAX`
    pub const fn with_len(start: i64, len: i64) -> Self {
        Self {
            start,
            end: start.saturating_add(len),
        }
    }

    pub const fn len(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub const fn contains(&self, slot: i64) -> bool {
        self.start <= slot && slot < self.end
    }

    /// Two ranges overlap when they share at least one slot.
    /// Empty ranges never overlap anything.
    pub const fn overlaps(&self, other: &SlotRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Iterate the slots of this range that are also `< limit`
    pub fn slots_below(&self, limit: i64) -> std::ops::Range<i64> {
        self.start.max(0)..self.end.min(limit)
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Human-readable slots
// ============================================================================

/// Position of a slot within the week
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotTime {
    /// Day index counted from the start of the horizon
    pub day: i64,
    /// Weekday, assuming day 0 is `first_weekday`
    pub weekday: Weekday,
    /// Wall-clock time at the start of the slot
    pub time: NaiveTime,
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.weekday, self.time.format("%H:%M"))
    }
}

/// Where `slot` falls, counting day 0 as `first_weekday`
pub fn describe(slot: i64, first_weekday: Weekday) -> SlotTime {
    let day = slot.div_euclid(SLOTS_PER_DAY);
    let minutes = slot.rem_euclid(SLOTS_PER_DAY) * SLOT_MINUTES;
    let weekday = (0..day.rem_euclid(DAYS_PER_WEEK)).fold(first_weekday, |w, _| w.succ());
    let time = NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN);
    SlotTime { day, weekday, time }
}

/// Calendar date and time of `slot` for a week starting at `week_start`
pub fn to_datetime(slot: i64, week_start: NaiveDate) -> Option<NaiveDateTime> {
    week_start
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::minutes(slot * SLOT_MINUTES))
}
