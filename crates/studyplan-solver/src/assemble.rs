//! Model assembly and solve invocation
//!
//! Wires blackouts and encoded tasks into one [`CpModel`]:
//!
//! - every blackout becomes a fixed interval
//! - every task contributes its interval and a cost variable bound to
//!   `cost_table[start]` through an element constraint
//! - a single no-overlap constraint spans all intervals
//! - the objective minimizes the sum of task costs
//!
//! The solver verdict is collapsed into a [`PlanOutcome`].

use crate::blackout::{synthesize_blackouts, Blackout};
use crate::cost::{build_cost_table, COST_BOUND};
use crate::encode::{encode_task, EncodedTask};
use crate::format::format_solution;
use std::time::Instant;
use studyplan_core::model::{CpModel, CpSolver, IntVar, SolveLimits, SolveStatus};
use studyplan_core::{PlanOutcome, PlanStatus, ScheduleRequest};

/// A fully assembled request model
#[derive(Clone, Debug)]
pub struct PlanModel {
    pub model: CpModel,
    pub tasks: Vec<EncodedTask>,
    pub costs: Vec<IntVar>,
    pub blackouts: Vec<Blackout>,
}

/// Build the constraint model for an already validated request
pub fn assemble(request: &ScheduleRequest) -> PlanModel {
    let mut model = CpModel::new();
    let mut intervals = Vec::new();

    let blackouts = synthesize_blackouts(request);
    for blackout in &blackouts {
        intervals.push(model.new_fixed_interval(
            blackout.range.start,
            blackout.range.len(),
            blackout.name(),
        ));
    }

    let preferences = request.preferences();
    let mut tasks = Vec::with_capacity(request.tasks.len());
    let mut costs = Vec::with_capacity(request.tasks.len());
    for task in &request.tasks {
        let encoded = encode_task(&mut model, request, task);
        if encoded.is_trivially_infeasible(request.horizon) {
            tracing::debug!(
                task = %task.id,
                earliest_start = encoded.earliest_start,
                latest_start = encoded.latest_start(request.horizon),
                "task bounds leave no start slot"
            );
        }
        intervals.push(encoded.interval);

        let table = build_cost_table(request.horizon, &preferences, task);
        let cost = model.new_int_var(-COST_BOUND, COST_BOUND, format!("cost_{}", task.id));
        model.add_element(encoded.start, table.into_vec(), cost);

        costs.push(cost);
        tasks.push(encoded);
    }

    model.add_no_overlap(intervals);
    model.minimize(costs.iter().copied());

    PlanModel {
        model,
        tasks,
        costs,
        blackouts,
    }
}

/// Map a solver verdict onto the planning status
pub fn plan_status(status: SolveStatus) -> PlanStatus {
    match status {
        SolveStatus::Optimal => PlanStatus::Optimal,
        SolveStatus::Feasible => PlanStatus::Feasible,
        SolveStatus::Unknown => PlanStatus::TimeLimit,
        SolveStatus::Infeasible | SolveStatus::ModelInvalid => PlanStatus::Infeasible,
    }
}

/// Solve an assembled model and extract the plan
pub fn solve_model<S: CpSolver + ?Sized>(
    plan: &PlanModel,
    solver: &S,
    limits: &SolveLimits,
) -> PlanOutcome {
    let started = Instant::now();
    tracing::debug!(
        backend = solver.name(),
        tasks = plan.tasks.len(),
        blackouts = plan.blackouts.len(),
        model = %plan.model.stats(),
        "solving study plan"
    );

    let solution = solver.solve(&plan.model, limits);
    let status = plan_status(solution.status);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match solution.status {
        SolveStatus::Optimal | SolveStatus::Feasible => {
            let entries = format_solution(&solution, &plan.tasks);
            tracing::info!(
                ?status,
                objective = ?solution.objective,
                entries = entries.len(),
                elapsed_ms,
                "plan found"
            );
            PlanOutcome {
                status,
                objective: solution.objective,
                entries,
            }
        }
        SolveStatus::Unknown => {
            tracing::warn!(elapsed_ms, "no plan found within the time budget");
            PlanOutcome::empty(status)
        }
        SolveStatus::ModelInvalid => {
            tracing::warn!(backend = solver.name(), "solver rejected the model");
            PlanOutcome::empty(status)
        }
        SolveStatus::Infeasible => {
            tracing::info!(elapsed_ms, "no plan possible");
            PlanOutcome::empty(status)
        }
    }
}
