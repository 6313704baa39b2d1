//! Pumpkin constraint-programming backend
//!
//! Translates a [`CpModel`] into the Pumpkin CP solver and minimises the
//! objective with linear SAT-UNSAT search.
//!
//! # Feature Flag
//!
//! This module requires the `pumpkin` feature:
//!
//! ```toml
//! studyplan-solver = { version = "0.3", features = ["pumpkin"] }
//! ```
//!
//! # Encoding
//!
//! - **Variables**: one bounded integer per model variable; fixed intervals
//!   get a start variable with a singleton domain
//! - **Interval link**: `end - start = duration`
//! - **No-overlap**: cumulative with unit demands and capacity 1
//! - **Element**: table entries become singleton variables
//! - **Objective**: an objective variable equal to the sum of the terms

use pumpkin_solver::constraints as cp;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::TransformableVariable;
use pumpkin_solver::Solver;
use studyplan_core::model::{Bound, Constraint, CpModel, CpSolution, CpSolver};
use studyplan_core::{SolveLimits, SolveStatus};

/// Why a model did not reach the search
enum Translation {
    Infeasible,
    Unsupported(&'static str),
}

fn narrow(value: i64) -> Result<i32, Translation> {
    i32::try_from(value).map_err(|_| Translation::Unsupported("value outside i32 range"))
}

/// [`CpSolver`] backed by the Pumpkin solver
#[derive(Clone, Copy, Debug, Default)]
pub struct PumpkinSolver;

impl PumpkinSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for PumpkinSolver {
    fn name(&self) -> &'static str {
        "pumpkin"
    }

    fn solve(&self, model: &CpModel, limits: &SolveLimits) -> CpSolution {
        match solve_with_pumpkin(model, limits) {
            Ok(solution) => solution,
            Err(Translation::Infeasible) => CpSolution::without_solution(SolveStatus::Infeasible),
            Err(Translation::Unsupported(reason)) => {
                tracing::warn!(reason, "model not supported by pumpkin backend");
                CpSolution::without_solution(SolveStatus::ModelInvalid)
            }
        }
    }
}

fn solve_with_pumpkin(model: &CpModel, limits: &SolveLimits) -> Result<CpSolution, Translation> {
    let mut solver = Solver::default();

    let mut vars = Vec::with_capacity(model.vars().len());
    for domain in model.vars() {
        if domain.is_empty() {
            return Err(Translation::Infeasible);
        }
        vars.push(solver.new_bounded_integer(narrow(domain.lb)?, narrow(domain.ub)?));
    }

    let constraint_tag = solver.new_constraint_tag();

    // Interval starts (fixed ones become singleton variables)
    let mut interval_starts = Vec::with_capacity(model.intervals().len());
    for interval in model.intervals() {
        let start = match (interval.start, interval.end) {
            (Bound::Fixed(start), Bound::Fixed(_)) => {
                let start = narrow(start)?;
                solver.new_bounded_integer(start, start)
            }
            (Bound::Var(start), Bound::Var(end)) => {
                // end - start = duration
                let terms = vec![
                    vars[end.index()].scaled(1),
                    vars[start.index()].scaled(-1),
                ];
                solver
                    .add_constraint(cp::equals(terms, narrow(interval.duration)?, constraint_tag))
                    .post()
                    .map_err(|_| Translation::Infeasible)?;
                vars[start.index()]
            }
            _ => return Err(Translation::Unsupported("interval with one fixed bound")),
        };
        interval_starts.push(start);
    }

    for constraint in model.constraints() {
        match constraint {
            Constraint::LessOrEqual { var, bound } => {
                solver
                    .add_constraint(cp::less_than_or_equals(
                        vec![vars[var.index()].scaled(1)],
                        narrow(*bound)?,
                        constraint_tag,
                    ))
                    .post()
                    .map_err(|_| Translation::Infeasible)?;
            }
            Constraint::NoOverlap(members) => {
                let members: Vec<_> = members
                    .iter()
                    .filter(|m| model.interval(**m).duration > 0)
                    .collect();
                if members.len() < 2 {
                    continue;
                }
                let starts: Vec<_> = members.iter().map(|m| interval_starts[m.index()]).collect();
                let durations = members
                    .iter()
                    .map(|m| narrow(model.interval(**m).duration))
                    .collect::<Result<Vec<i32>, _>>()?;
                let demands = vec![1; members.len()];
                solver
                    .add_constraint(cp::cumulative(starts, durations, demands, 1, constraint_tag))
                    .post()
                    .map_err(|_| Translation::Infeasible)?;
            }
            Constraint::Element {
                index,
                table,
                target,
            } => {
                // entries outside the target domain stay unselectable once clamped
                let domain = model.var(*target);
                let (low, high) = (domain.lb.saturating_sub(1), domain.ub.saturating_add(1));
                let mut array = Vec::with_capacity(table.len());
                for &entry in table.iter() {
                    let entry = narrow(entry.clamp(low, high))?;
                    array.push(solver.new_bounded_integer(entry, entry));
                }
                solver
                    .add_constraint(cp::element(
                        vars[index.index()],
                        array,
                        vars[target.index()],
                        constraint_tag,
                    ))
                    .post()
                    .map_err(|_| Translation::Infeasible)?;
            }
        }
    }

    // objective = sum(terms)
    let lower: i64 = model.objective().iter().map(|v| model.var(*v).lb).sum();
    let upper: i64 = model.objective().iter().map(|v| model.var(*v).ub).sum();
    let objective = solver.new_bounded_integer(narrow(lower)?, narrow(upper)?);
    if !model.objective().is_empty() {
        let mut terms = vec![objective.scaled(-1)];
        terms.extend(model.objective().iter().map(|v| vars[v.index()].scaled(1)));
        solver
            .add_constraint(cp::equals(terms, 0, constraint_tag))
            .post()
            .map_err(|_| Translation::Infeasible)?;
    }

    let mut brancher = solver.default_brancher();
    let mut termination = TimeBudget::starting_now(limits.time_limit);

    fn noop_callback<B>(_: &Solver, _: pumpkin_solver::results::SolutionReference, _: &B) {}
    let result = solver.optimise(
        &mut brancher,
        &mut termination,
        LinearSatUnsat::new(OptimisationDirection::Minimise, objective, noop_callback),
    );

    let (status, values): (SolveStatus, Vec<i64>) = match result {
        OptimisationResult::Optimal(optimal_solution) => (
            SolveStatus::Optimal,
            vars.iter()
                .map(|&var| optimal_solution.get_integer_value(var) as i64)
                .collect(),
        ),
        OptimisationResult::Satisfiable(satisfiable) => (
            SolveStatus::Feasible,
            vars.iter()
                .map(|&var| satisfiable.get_integer_value(var) as i64)
                .collect(),
        ),
        OptimisationResult::Unsatisfiable => {
            return Ok(CpSolution::without_solution(SolveStatus::Infeasible))
        }
        OptimisationResult::Unknown => return Ok(CpSolution::without_solution(SolveStatus::Unknown)),
    };

    let objective = model.objective().iter().map(|v| values[v.index()]).sum();
    Ok(CpSolution::solved(status, objective, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn picks_cheapest_start_around_fixed_interval() {
        let mut model = CpModel::new();
        let block = model.new_fixed_interval(0, 3, "block");
        let start = model.new_int_var(0, 8, "start");
        let end = model.new_int_var(2, 10, "end");
        let task = model.new_interval(start, 2, end, "task");
        let cost = model.new_int_var(-100, 100, "cost");
        model.add_element(start, vec![-9, -9, -9, 4, 1, 0, 3, 3, 3, 3, 3], cost);
        model.add_no_overlap([block, task]);
        model.minimize([cost]);

        let solution = PumpkinSolver::new().solve(&model, &SolveLimits::new(Duration::from_secs(5)));
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.value(start), Some(5));
        assert_eq!(solution.value(end), Some(7));
        assert_eq!(solution.objective, Some(0));
    }

    #[test]
    fn empty_domain_is_infeasible() {
        let mut model = CpModel::new();
        let start = model.new_int_var(10, 5, "start");
        let end = model.new_int_var(15, 10, "end");
        model.new_interval(start, 5, end, "task");

        let solution = PumpkinSolver::new().solve(&model, &SolveLimits::default());
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }
}
