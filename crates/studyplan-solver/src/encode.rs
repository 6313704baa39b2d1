//! Task encoding
//!
//! Each task becomes an interval `[start, start + duration)` with
//!
//! - `start` in `[earliest, horizon - duration]`
//! - `end` in `[earliest + duration, horizon]`
//! - `end <= deadline`
//!
//! where `earliest = max(current_slot, task.start, 0)`. Impossible tasks are
//! encoded anyway: their domains are empty and the solver reports the model
//! infeasible.

use studyplan_core::model::{CpModel, IntVar, IntervalVar};
use studyplan_core::{ScheduleRequest, Slot, StudyTask, TaskId};

/// Solver handles and derived bounds of one task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedTask {
    pub id: TaskId,
    pub duration: Slot,
    pub earliest_start: Slot,
    pub deadline: Slot,
    pub start: IntVar,
    pub end: IntVar,
    pub interval: IntervalVar,
}

impl EncodedTask {
    /// Latest start allowed by the horizon and the deadline
    pub fn latest_start(&self, horizon: Slot) -> Slot {
        horizon.min(self.deadline).saturating_sub(self.duration)
    }

    /// Whether the bounds alone already rule the task out
    pub fn is_trivially_infeasible(&self, horizon: Slot) -> bool {
        self.earliest_start > self.latest_start(horizon)
    }
}

/// Add the variables and interval of `task` to `model`
pub fn encode_task(model: &mut CpModel, request: &ScheduleRequest, task: &StudyTask) -> EncodedTask {
    let horizon = request.horizon;
    let earliest_start = request.effective_earliest_start(task);
    let deadline = request.deadline_of(task);
    let duration = task.duration;

    let start = model.new_int_var(
        earliest_start,
        horizon - duration,
        format!("start_{}", task.id),
    );
    let end = model.new_int_var(
        earliest_start.saturating_add(duration),
        horizon,
        format!("end_{}", task.id),
    );
    model.add_less_or_equal(end, deadline);
    let interval = model.new_interval(start, duration, end, format!("interval_{}", task.id));

    EncodedTask {
        id: task.id.clone(),
        duration,
        earliest_start,
        deadline,
        start,
        end,
        interval,
    }
}
