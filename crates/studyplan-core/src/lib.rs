//! # studyplan-core
//!
//! Core domain model and traits for the studyplan optimizer.
//!
//! This crate provides:
//! - Domain types: `ScheduleRequest`, `StudyTask`, `FixedBlock`, `PlanOutcome`
//! - The discretized calendar (`calendar`) and preference catalog (`preference`)
//! - The backend-neutral constraint model and solver contract (`model`)
//! - Core traits: `Planner`, `CpSolver`
//! - Error types for loading and validating requests
//!
//! ## Example
//!
//! ```rust
//! use studyplan_core::{FixedBlock, ScheduleRequest, StudyTask};
//!
//! let request = ScheduleRequest::new()
//!     .task(StudyTask::new("algebra", 24).deadline(600))
//!     .task(StudyTask::new("essay", 36))
//!     .fixed_block(FixedBlock::new(100, 18))
//!     .blocked_day(6)
//!     .preference_time("vormittags,abends");
//!
//! assert!(request.validate().is_ok());
//! assert_eq!(request.preferences().len(), 2);
//! ```

pub mod calendar;
pub mod config;
pub mod model;
pub mod preference;

pub use calendar::SlotRange;
pub use config::{Config, ConfigError, SolverBackend};
pub use model::{CpModel, CpSolution, CpSolver, IntVar, IntervalVar, SolveLimits, SolveStatus};
pub use preference::{PreferenceSet, PreferenceTag};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a study task
pub type TaskId = String;

/// Absolute slot index on the calendar axis
pub type Slot = i64;

// ============================================================================
// Request
// ============================================================================

fn default_horizon() -> Slot {
    calendar::DEFAULT_HORIZON
}

/// A weekly planning request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Number of slots in the planning window
    #[serde(default = "default_horizon")]
    pub horizon: Slot,
    /// Earliest slot any task may start at
    #[serde(default)]
    pub current_slot: Slot,
    /// Tasks to place, in response order
    #[serde(default)]
    pub tasks: Vec<StudyTask>,
    /// Already booked commitments
    #[serde(default)]
    pub fixed_blocks: Vec<FixedBlock>,
    /// Day indices (0-6) excluded from scheduling
    #[serde(default)]
    pub blocked_days: Vec<i64>,
    /// Comma-separated day-part tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference_time: Option<String>,
}

impl Default for ScheduleRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRequest {
    /// An empty one-week request starting at slot 0
    pub fn new() -> Self {
        Self {
            horizon: calendar::DEFAULT_HORIZON,
            current_slot: 0,
            tasks: Vec::new(),
            fixed_blocks: Vec::new(),
            blocked_days: Vec::new(),
            preference_time: None,
        }
    }

    pub fn horizon(mut self, horizon: Slot) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn current_slot(mut self, slot: Slot) -> Self {
        self.current_slot = slot;
        self
    }

    pub fn task(mut self, task: StudyTask) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn fixed_block(mut self, block: FixedBlock) -> Self {
        self.fixed_blocks.push(block);
        self
    }

    pub fn blocked_day(mut self, day: i64) -> Self {
        self.blocked_days.push(day);
        self
    }

    pub fn preference_time(mut self, tags: impl Into<String>) -> Self {
        self.preference_time = Some(tags.into());
        self
    }

    /// Recognized preference tags
    pub fn preferences(&self) -> PreferenceSet {
        self.preference_time
            .as_deref()
            .map(PreferenceSet::parse)
            .unwrap_or_default()
    }

    /// Whether `day` is fully blocked
    pub fn is_blocked(&self, day: i64) -> bool {
        self.blocked_days.contains(&day)
    }

    /// `max(current_slot, task.start, 0)`
    pub fn effective_earliest_start(&self, task: &StudyTask) -> Slot {
        self.current_slot.max(task.earliest_start.unwrap_or(0)).max(0)
    }

    /// Task deadline, defaulting to the horizon
    pub fn deadline_of(&self, task: &StudyTask) -> Slot {
        task.deadline.unwrap_or(self.horizon)
    }

    pub fn get_task(&self, id: &str) -> Option<&StudyTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Parse a request from JSON text
    pub fn from_json_str(input: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a request from a JSON file.
    ///
    /// A missing file and malformed content fail with different errors.
    pub fn load(path: &Path) -> Result<Self, RequestError> {
        if !path.exists() {
            return Err(RequestError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| RequestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Check structural invariants before any model is built.
    ///
    /// Requests that are well-formed but cannot be satisfied (a deadline
    /// before earliest start plus duration, overlapping commitments) pass
    /// validation and are reported as infeasible by the planner.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.horizon <= 0 {
            return Err(ValidationError::NonPositiveHorizon(self.horizon));
        }
        if self.horizon > calendar::MAX_HORIZON {
            return Err(ValidationError::HorizonTooLarge(self.horizon));
        }
        if self.current_slot < 0 || self.current_slot >= self.horizon {
            return Err(ValidationError::CurrentSlotOutOfRange {
                current_slot: self.current_slot,
                horizon: self.horizon,
            });
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if task.id.is_empty() {
                return Err(ValidationError::EmptyTaskId);
            }
            if !seen.insert(task.id.as_str()) {
                return Err(ValidationError::DuplicateTaskId(task.id.clone()));
            }
            if task.duration <= 0 {
                return Err(ValidationError::NonPositiveDuration {
                    task: task.id.clone(),
                    duration: task.duration,
                });
            }
            if let Some(start) = task.earliest_start.filter(|s| *s < 0) {
                return Err(ValidationError::NegativeSlot {
                    task: task.id.clone(),
                    field: "start",
                    value: start,
                });
            }
            if let Some(deadline) = task.deadline.filter(|d| *d < 0) {
                return Err(ValidationError::NegativeSlot {
                    task: task.id.clone(),
                    field: "deadline",
                    value: deadline,
                });
            }
        }

        for (index, block) in self.fixed_blocks.iter().enumerate() {
            if block.start < 0 || block.duration < 0 {
                return Err(ValidationError::InvalidFixedBlock {
                    index,
                    start: block.start,
                    duration: block.duration,
                });
            }
        }

        if let Some(&day) = self
            .blocked_days
            .iter()
            .find(|d| !(0..calendar::DAYS_PER_WEEK).contains(*d))
        {
            return Err(ValidationError::BlockedDayOutOfRange(day));
        }

        Ok(())
    }
}

// ============================================================================
// Task
// ============================================================================

/// A study task to place on the calendar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTask {
    /// Unique identifier
    pub id: TaskId,
    /// Length in slots
    pub duration: Slot,
    /// Slot by which the task must have ended (defaults to the horizon)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Slot>,
    /// Earliest slot the task may start at
    #[serde(rename = "start", default, skip_serializing_if = "Option::is_none")]
    pub earliest_start: Option<Slot>,
    /// Per-slot cost adjustments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub costs: Vec<CostOverride>,
}

impl StudyTask {
    pub fn new(id: impl Into<String>, duration: Slot) -> Self {
        Self {
            id: id.into(),
            duration,
            deadline: None,
            earliest_start: None,
            costs: Vec::new(),
        }
    }

    pub fn deadline(mut self, deadline: Slot) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn earliest_start(mut self, slot: Slot) -> Self {
        self.earliest_start = Some(slot);
        self
    }

    /// Add `delta` to the cost of starting at `slot`
    pub fn cost(mut self, slot: Slot, delta: i64) -> Self {
        self.costs.push(CostOverride { slot, delta });
        self
    }
}

/// Explicit per-slot cost delta for one task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostOverride {
    #[serde(rename = "t")]
    pub slot: Slot,
    #[serde(rename = "c")]
    pub delta: i64,
}

/// An externally booked interval (a lecture, a shift)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedBlock {
    pub start: Slot,
    pub duration: Slot,
}

impl FixedBlock {
    pub const fn new(start: Slot, duration: Slot) -> Self {
        Self { start, duration }
    }

    pub const fn range(&self) -> SlotRange {
        SlotRange::with_len(self.start, self.duration)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// One placed task in the response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub id: TaskId,
    pub start: Slot,
    pub end: Slot,
}

impl PlannedTask {
    pub fn range(&self) -> SlotRange {
        SlotRange::new(self.start, self.end)
    }
}

/// How a planning run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Plan found and proven optimal
    Optimal,
    /// Plan found, optimality not proven within the budget
    Feasible,
    /// No plan exists
    Infeasible,
    /// Budget exhausted before any plan was found
    TimeLimit,
}

impl PlanStatus {
    pub const fn is_success(self) -> bool {
        matches!(self, PlanStatus::Optimal | PlanStatus::Feasible)
    }

    /// Wire name, as serialized
    pub const fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Optimal => "optimal",
            PlanStatus::Feasible => "feasible",
            PlanStatus::Infeasible => "infeasible",
            PlanStatus::TimeLimit => "time_limit",
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a planning run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub status: PlanStatus,
    /// Total cost of the plan, when one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<i64>,
    /// Placed tasks in request order; empty unless a plan was found
    pub entries: Vec<PlannedTask>,
}

impl PlanOutcome {
    /// An outcome without a plan
    pub fn empty(status: PlanStatus) -> Self {
        Self {
            status,
            objective: None,
            entries: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The plain response list: entries on success, empty otherwise
    pub fn into_entries(self) -> Vec<PlannedTask> {
        if self.status.is_success() {
            self.entries
        } else {
            Vec::new()
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Turns a request into a plan
pub trait Planner: Send + Sync {
    /// Validate the request and compute a plan.
    ///
    /// Only input errors are returned as `Err`; infeasibility is an outcome.
    fn plan(&self, request: &ScheduleRequest) -> Result<PlanOutcome, ValidationError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Failure to obtain a request from a file or text
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON format: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A request that is well-formed JSON but structurally invalid
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Horizon must be positive, got {0}")]
    NonPositiveHorizon(Slot),

    #[error("Horizon {0} exceeds the maximum of {max} slots", max = calendar::MAX_HORIZON)]
    HorizonTooLarge(Slot),

    #[error("Current slot {current_slot} is outside the horizon [0, {horizon})")]
    CurrentSlotOutOfRange { current_slot: Slot, horizon: Slot },

    #[error("Task id must not be empty")]
    EmptyTaskId,

    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(TaskId),

    #[error("Task '{task}' has non-positive duration {duration}")]
    NonPositiveDuration { task: TaskId, duration: Slot },

    #[error("Task '{task}' has negative {field} {value}")]
    NegativeSlot {
        task: TaskId,
        field: &'static str,
        value: Slot,
    },

    #[error("Fixed block #{index} is invalid (start {start}, duration {duration})")]
    InvalidFixedBlock {
        index: usize,
        start: Slot,
        duration: Slot,
    },

    #[error("Blocked day {0} is outside 0-6")]
    BlockedDayOutOfRange(i64),
}

// ============================================================================
// Tests
// ============================================================================
