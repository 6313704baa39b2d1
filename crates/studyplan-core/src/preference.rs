//! Day-part preference catalog
//!
//! Callers express soft time-of-day preferences as a comma-separated string of
//! tags (`"morgens, abends"`). Each recognized tag makes every slot in its hour
//! window cheaper for every task. Unrecognized tokens produce no bonus and no
//! error: the string is free-form on the client side.

use crate::calendar::{self, SlotRange, DAYS_PER_WEEK};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Cost added to each slot inside a preferred window (lower is better)
pub const PREFERENCE_BONUS: i64 = -10;

/// A named day part with a fixed hour window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceTag {
    /// 06:00 - 09:00
    Morning,
    /// 09:00 - 12:00
    Forenoon,
    /// 12:00 - 15:00
    Noon,
    /// 15:00 - 18:00
    Afternoon,
    /// 18:00 - 22:00
    Evening,
}

impl PreferenceTag {
    pub const ALL: [PreferenceTag; 5] = [
        PreferenceTag::Morning,
        PreferenceTag::Forenoon,
        PreferenceTag::Noon,
        PreferenceTag::Afternoon,
        PreferenceTag::Evening,
    ];

    /// Canonical wire token
    pub const fn token(self) -> &'static str {
        match self {
            PreferenceTag::Morning => "morgens",
            PreferenceTag::Forenoon => "vormittags",
            PreferenceTag::Noon => "mittags",
            PreferenceTag::Afternoon => "nachmittags",
            PreferenceTag::Evening => "abends",
        }
    }

    /// Enum-style alias emitted by the planning backend
    pub const fn alias(self) -> &'static str {
        match self {
            PreferenceTag::Morning => "MORNING",
            PreferenceTag::Forenoon => "FORENOON",
            PreferenceTag::Noon => "NOON",
            PreferenceTag::Afternoon => "AFTERNOON",
            PreferenceTag::Evening => "EVENING",
        }
    }

    /// Hour window `[from, to)`
    pub const fn hours(self) -> (i64, i64) {
        match self {
            PreferenceTag::Morning => (6, 9),
            PreferenceTag::Forenoon => (9, 12),
            PreferenceTag::Noon => (12, 15),
            PreferenceTag::Afternoon => (15, 18),
            PreferenceTag::Evening => (18, 22),
        }
    }

    /// Slot window of this tag on `day`
    pub const fn window(self, day: i64) -> SlotRange {
        let (from, to) = self.hours();
        SlotRange::new(calendar::slot(day, from), calendar::slot(day, to))
    }

    /// All windows of this tag within one week
    pub fn weekly_windows(self) -> impl Iterator<Item = SlotRange> {
        (0..DAYS_PER_WEEK).map(move |day| self.window(day))
    }

    /// Recognize a single trimmed token.
    ///
    /// Canonical tokens match exactly, aliases case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| token == tag.token() || token.eq_ignore_ascii_case(tag.alias()))
    }
}

impl fmt::Display for PreferenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The set of recognized tags parsed from a preference string
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreferenceSet {
    tags: BTreeSet<PreferenceTag>,
}

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated preference string, dropping unknown tokens
    pub fn parse(input: &str) -> Self {
        input
            .split(',')
            .map(str::trim)
            .filter_map(PreferenceTag::from_token)
            .collect()
    }

    pub fn with(mut self, tag: PreferenceTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn contains(&self, tag: PreferenceTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PreferenceTag> + '_ {
        self.tags.iter().copied()
    }
}

impl FromIterator<PreferenceTag> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = PreferenceTag>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for PreferenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.iter().map(PreferenceTag::token).collect();
        f.write_str(&tokens.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_canonical_tokens() {
        let set = PreferenceSet::parse("morgens, abends");
        assert_eq!(set.len(), 2);
        assert!(set.contains(PreferenceTag::Morning));
        assert!(set.contains(PreferenceTag::Evening));
        assert!(!set.contains(PreferenceTag::Noon));
    }

    #[test]
    fn parse_ignores_unknown_and_empty() {
        assert!(PreferenceSet::parse("").is_empty());
        assert!(PreferenceSet::parse("neutral").is_empty());
        assert!(PreferenceSet::parse(" , ,nachts").is_empty());
        assert_eq!(
            PreferenceSet::parse("neutral,mittags"),
            PreferenceSet::new().with(PreferenceTag::Noon)
        );
    }

    #[test]
    fn canonical_tokens_are_case_sensitive() {
        assert!(PreferenceSet::parse("Morgens").is_empty());
    }

    #[test]
    fn aliases_are_case_insensitive() {
        let set = PreferenceSet::parse("MORNING,afternoon");
        assert!(set.contains(PreferenceTag::Morning));
        assert!(set.contains(PreferenceTag::Afternoon));
    }

    #[test]
    fn duplicates_count_once() {
        assert_eq!(PreferenceSet::parse("abends,abends,EVENING").len(), 1);
    }

    #[test]
    fn windows_do_not_overlap() {
        for (i, a) in PreferenceTag::ALL.iter().enumerate() {
            for b in &PreferenceTag::ALL[i + 1..] {
                assert!(!a.window(0).overlaps(&b.window(0)), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn window_slots() {
        assert_eq!(PreferenceTag::Forenoon.window(0), SlotRange::new(108, 144));
        assert_eq!(PreferenceTag::Evening.window(1), SlotRange::new(288 + 216, 288 + 264));
        assert_eq!(PreferenceTag::Morning.weekly_windows().count(), 7);
    }

    #[test]
    fn display_round_trips_tokens() {
        let set = PreferenceSet::parse("abends,morgens");
        assert_eq!(set.to_string(), "morgens,abends");
    }
}
