//! Per-task preference cost tables
//!
//! Each task gets a dense table of `horizon + 1` entries: the cost of starting
//! the task at that slot. Preferred day parts subtract [`PREFERENCE_BONUS`]
//! per tag; explicit cost overrides are then added on top.

use studyplan_core::preference::PREFERENCE_BONUS;
use studyplan_core::{PreferenceSet, Slot, StudyTask};

/// Cost variables range over `[-COST_BOUND, COST_BOUND]`
pub const COST_BOUND: i64 = 1_000_000;

/// Start-slot cost lookup for one task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostTable {
    costs: Vec<i64>,
}

impl CostTable {
    /// All-zero table for a horizon
    pub fn zeroed(horizon: Slot) -> Self {
        Self {
            costs: vec![0; horizon.max(0) as usize + 1],
        }
    }

    /// Cost of starting at `slot` (0 outside the table)
    pub fn cost_at(&self, slot: Slot) -> i64 {
        usize::try_from(slot)
            .ok()
            .and_then(|s| self.costs.get(s))
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.costs
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.costs
    }
}

/// Build the cost table for `task`.
///
/// Bonuses from overlapping tags would accumulate; the canonical windows do
/// not overlap. Override slots outside `[0, horizon)` are ignored and
/// overrides saturate instead of wrapping.
pub fn build_cost_table(horizon: Slot, preferences: &PreferenceSet, task: &StudyTask) -> CostTable {
    let mut table = CostTable::zeroed(horizon);

    for tag in preferences.iter() {
        for window in tag.weekly_windows() {
            for slot in window.slots_below(horizon) {
                table.costs[slot as usize] += PREFERENCE_BONUS;
            }
        }
    }

    for cost_override in &task.costs {
        if (0..horizon).contains(&cost_override.slot) {
            let cost = &mut table.costs[cost_override.slot as usize];
            *cost = cost.saturating_add(cost_override.delta);
        }
    }

    table
}
