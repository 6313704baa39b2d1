//! # studyplan-solver
//!
//! Turns a [`ScheduleRequest`] into a constraint model and solves it.
//!
//! This crate provides:
//! - Blackout synthesis (night rest, blocked days, fixed commitments)
//! - Per-task cost tables from preferences and explicit overrides
//! - Model assembly over the backend-neutral [`CpModel`]
//! - A built-in branch-and-bound backend ([`SearchSolver`])
//! - An optional Pumpkin backend (feature `pumpkin`)
//!
//! ## Example
//!
//! ```rust
//! use studyplan_core::{Planner, ScheduleRequest, StudyTask};
//! use studyplan_solver::StudyPlanner;
//!
//! let request = ScheduleRequest::new()
//!     .task(StudyTask::new("test_task", 12).deadline(200))
//!     .preference_time("morgens");
//!
//! let outcome = StudyPlanner::new().plan(&request).unwrap();
//! assert!(outcome.is_success());
//! assert_eq!(outcome.entries[0].end - outcome.entries[0].start, 12);
//! ```

pub mod assemble;
pub mod blackout;
pub mod cost;
pub mod encode;
pub mod format;
#[cfg(feature = "pumpkin")]
pub mod optimal;
pub mod search;

pub use assemble::{assemble, plan_status, solve_model, PlanModel};
pub use blackout::{synthesize_blackouts, Blackout, BlackoutKind};
pub use cost::{build_cost_table, CostTable, COST_BOUND};
pub use encode::{encode_task, EncodedTask};
pub use format::format_solution;
#[cfg(feature = "pumpkin")]
pub use optimal::PumpkinSolver;
pub use search::SearchSolver;

use std::time::Duration;
use studyplan_core::config::SolverSection;
use studyplan_core::{
    ConfigError, CpModel, CpSolver, PlanOutcome, PlannedTask, Planner, ScheduleRequest,
    SolveLimits, SolverBackend, ValidationError,
};

// ============================================================================
// Planner
// ============================================================================

/// Request-level planner over a [`CpSolver`] backend
#[derive(Clone, Debug)]
pub struct StudyPlanner<S = SearchSolver> {
    solver: S,
    limits: SolveLimits,
}

impl StudyPlanner<SearchSolver> {
    /// Planner on the built-in search backend with the default time limit
    pub fn new() -> Self {
        Self::with_solver(SearchSolver::new())
    }
}

impl Default for StudyPlanner<SearchSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CpSolver> StudyPlanner<S> {
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            limits: SolveLimits::default(),
        }
    }

    pub fn time_limit(mut self, time_limit: Duration) -> Self {
        self.limits.time_limit = time_limit;
        self
    }

    pub fn limits(mut self, limits: SolveLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Compute a plan and return only the placed tasks.
    ///
    /// Infeasible requests and exhausted budgets both yield an empty list.
    pub fn optimize(&self, request: &ScheduleRequest) -> Result<Vec<PlannedTask>, ValidationError> {
        self.plan(request).map(PlanOutcome::into_entries)
    }
}

impl<S: CpSolver> Planner for StudyPlanner<S> {
    fn plan(&self, request: &ScheduleRequest) -> Result<PlanOutcome, ValidationError> {
        request.validate()?;
        tracing::debug!(
            tasks = request.tasks.len(),
            fixed_blocks = request.fixed_blocks.len(),
            blocked_days = ?request.blocked_days,
            "planning request"
        );
        let model = assemble(request);
        Ok(solve_model(&model, &self.solver, &self.limits))
    }
}

// ============================================================================
// Backend selection
// ============================================================================

/// Instantiate the solver backend named in the configuration
pub fn solver_for_backend(backend: SolverBackend) -> Result<Box<dyn CpSolver>, ConfigError> {
    match backend {
        SolverBackend::Search => Ok(Box::new(SearchSolver::new())),
        #[cfg(feature = "pumpkin")]
        SolverBackend::Pumpkin => Ok(Box::new(PumpkinSolver::new())),
        #[cfg(not(feature = "pumpkin"))]
        SolverBackend::Pumpkin => Err(ConfigError::BackendUnavailable(backend)),
    }
}

/// Build a planner from the `[solver]` configuration section
pub fn planner_from_config(
    section: &SolverSection,
) -> Result<StudyPlanner<Box<dyn CpSolver>>, ConfigError> {
    let solver = solver_for_backend(section.backend)?;
    tracing::debug!(backend = solver.name(), time_limit_ms = section.time_limit_ms, "solver configured");
    Ok(StudyPlanner::with_solver(solver).limits(section.limits()))
}

/// Assemble a request into its model without solving, for inspection
pub fn build_model(request: &ScheduleRequest) -> Result<CpModel, ValidationError> {
    request.validate()?;
    Ok(assemble(request).model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyplan_core::{PlanStatus, StudyTask};

    #[test]
    fn search_backend_is_always_available() {
        let solver = solver_for_backend(SolverBackend::Search).unwrap();
        assert_eq!(solver.name(), "search");
    }

    #[cfg(not(feature = "pumpkin"))]
    #[test]
    fn pumpkin_backend_requires_feature() {
        assert!(matches!(
            solver_for_backend(SolverBackend::Pumpkin),
            Err(ConfigError::BackendUnavailable(SolverBackend::Pumpkin))
        ));
    }

    #[test]
    fn planner_from_config_uses_section_limits() {
        let section = SolverSection {
            time_limit_ms: 250,
            backend: SolverBackend::Search,
        };
        let planner = planner_from_config(&section).unwrap();
        assert_eq!(planner.limits.time_limit, Duration::from_millis(250));
        assert_eq!(planner.solver().name(), "search");
    }

    #[test]
    fn validation_errors_are_returned() {
        let request = ScheduleRequest::new().task(StudyTask::new("a", 0));
        assert!(matches!(
            StudyPlanner::new().plan(&request),
            Err(ValidationError::NonPositiveDuration { .. })
        ));
        assert!(build_model(&request).is_err());
    }

    #[test]
    fn empty_request_is_trivially_optimal() {
        let outcome = StudyPlanner::new().plan(&ScheduleRequest::new()).unwrap();
        assert_eq!(outcome.status, PlanStatus::Optimal);
        assert!(outcome.entries.is_empty());
    }
}
