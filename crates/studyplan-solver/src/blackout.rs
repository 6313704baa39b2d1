//! Blackout interval synthesis
//!
//! Turns fixed commitments, blocked days and the nightly rest window into
//! occupied slot ranges. A blocked day yields a single full-day range instead
//! of its two rest ranges.

use std::fmt;
use studyplan_core::calendar::{self, SlotRange, DAYS_PER_WEEK};
use studyplan_core::ScheduleRequest;

/// Why a range is unavailable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlackoutKind {
    /// Caller-supplied commitment, by input index
    Fixed(usize),
    /// Whole day excluded
    BlockedDay(i64),
    /// Rest from midnight until the morning boundary
    MorningRest(i64),
    /// Rest from the evening boundary until midnight
    EveningRest(i64),
}

/// An occupied range that no task may overlap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blackout {
    pub kind: BlackoutKind,
    pub range: SlotRange,
}

impl Blackout {
    /// Solver-facing interval name
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Blackout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BlackoutKind::Fixed(_) => write!(f, "block_{}", self.range.start),
            BlackoutKind::BlockedDay(day) => write!(f, "blocked_day_{}", day),
            BlackoutKind::MorningRest(day) => write!(f, "night_a_d{}", day),
            BlackoutKind::EveningRest(day) => write!(f, "night_b_d{}", day),
        }
    }
}

/// All blackout ranges of a request: fixed blocks first, then one entry
/// (blocked) or two entries (rest) per day of the week.
pub fn synthesize_blackouts(request: &ScheduleRequest) -> Vec<Blackout> {
    let mut blackouts: Vec<Blackout> = request
        .fixed_blocks
        .iter()
        .enumerate()
        .map(|(index, block)| Blackout {
            kind: BlackoutKind::Fixed(index),
            range: block.range(),
        })
        .collect();

    for day in 0..DAYS_PER_WEEK {
        if request.is_blocked(day) {
            blackouts.push(Blackout {
                kind: BlackoutKind::BlockedDay(day),
                range: calendar::day_range(day),
            });
            continue;
        }

        let day_start = calendar::day_start(day);
        blackouts.push(Blackout {
            kind: BlackoutKind::MorningRest(day),
            range: SlotRange::new(day_start, day_start + calendar::MORNING_END),
        });
        blackouts.push(Blackout {
            kind: BlackoutKind::EveningRest(day),
            range: SlotRange::new(
                day_start + calendar::EVENING_START,
                day_start + calendar::SLOTS_PER_DAY,
            ),
        });
    }

    blackouts
}
