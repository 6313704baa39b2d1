//! Built-in branch-and-bound backend
//!
//! Solves the models the planner builds: interval start variables are the
//! decisions, interval ends and element targets follow from them, and every
//! other variable sits at its lower bound.
//!
//! # Algorithm
//!
//! 1. Tighten domains with `<=` constraints and the `end = start + duration`
//!    link, then enumerate each interval's start candidates, dropping values
//!    that hit a fixed interval or an element entry outside its target bounds.
//! 2. Sort every candidate list by (cost, start) and branch on the interval
//!    with the fewest candidates first.
//! 3. Depth-first search with an admissible bound: the cost so far plus the
//!    cheapest candidate of every unplaced interval. An incumbent that meets
//!    the global bound is optimal and ends the search.
//! 4. The wall clock is checked every few hundred steps; when the budget runs
//!    out the incumbent (if any) is reported as feasible.

use std::collections::HashMap;
use std::time::Instant;
use studyplan_core::model::{Bound, Constraint, CpModel, CpSolution, CpSolver, IntVar};
use studyplan_core::{SlotRange, SolveLimits, SolveStatus};

/// Default number of search steps between clock checks
const CHECK_INTERVAL: u64 = 512;

/// Depth-first branch-and-bound over interval starts
#[derive(Clone, Debug)]
pub struct SearchSolver {
    check_interval: u64,
}

impl SearchSolver {
    pub fn new() -> Self {
        Self {
            check_interval: CHECK_INTERVAL,
        }
    }
}

impl Default for SearchSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CpSolver for SearchSolver {
    fn name(&self) -> &'static str {
        "search"
    }

    fn solve(&self, model: &CpModel, limits: &SolveLimits) -> CpSolution {
        let started = Instant::now();
        let problem = match Problem::build(model) {
            Ok(problem) => problem,
            Err(Rejected::Infeasible(reason)) => {
                tracing::debug!(reason, "model infeasible before search");
                return CpSolution::without_solution(SolveStatus::Infeasible);
            }
            Err(Rejected::Unsupported(reason)) => {
                tracing::warn!(reason, "model not supported by search backend");
                return CpSolution::without_solution(SolveStatus::ModelInvalid);
            }
        };

        let mut search = Search::new(&problem, started + limits.time_limit, self.check_interval);
        search.run();

        tracing::debug!(
            steps = search.steps,
            elapsed_ms = started.elapsed().as_millis() as u64,
            timed_out = search.timed_out,
            "search finished"
        );

        match (search.best.take(), search.timed_out) {
            (Some((_, starts)), timed_out) => {
                let status = if timed_out {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Optimal
                };
                let values = problem.values(&starts);
                let objective = model.objective().iter().map(|v| values[v.index()]).sum();
                CpSolution::solved(status, objective, values)
            }
            (None, true) => CpSolution::without_solution(SolveStatus::Unknown),
            (None, false) => CpSolution::without_solution(SolveStatus::Infeasible),
        }
    }
}

// ============================================================================
// Problem preparation
// ============================================================================

enum Rejected {
    Infeasible(&'static str),
    Unsupported(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Free,
    Start(usize),
    End(usize),
    Target(usize),
}

struct Element<'m> {
    index: usize,
    table: &'m [i64],
    target: IntVar,
}

/// An interval whose start is decided by the search
struct Item {
    start: IntVar,
    end: IntVar,
    duration: i64,
    /// (cost, start) sorted ascending
    candidates: Vec<(i64, i64)>,
}

struct Problem<'m> {
    items: Vec<Item>,
    elements: Vec<Element<'m>>,
    /// Whether two items share a no-overlap constraint
    shares: Vec<Vec<bool>>,
    /// Objective contribution of variables not driven by any item
    constant_cost: i64,
    lower: Vec<i64>,
}

impl<'m> Problem<'m> {
    fn build(model: &'m CpModel) -> Result<Self, Rejected> {
        let vars = model.vars();
        let mut lower: Vec<i64> = vars.iter().map(|v| v.lb).collect();
        let mut upper: Vec<i64> = vars.iter().map(|v| v.ub).collect();
        let mut roles = vec![Role::Free; vars.len()];

        for constraint in model.constraints() {
            if let Constraint::LessOrEqual { var, bound } = constraint {
                upper[var.index()] = upper[var.index()].min(*bound);
            }
        }

        // Interval roles
        let mut items = Vec::new();
        let mut item_of_interval = vec![None; model.intervals().len()];
        for (idx, interval) in model.intervals().iter().enumerate() {
            let (start, end) = match (interval.start, interval.end) {
                (Bound::Fixed(_), Bound::Fixed(_)) => continue,
                (Bound::Var(start), Bound::Var(end)) => (start, end),
                _ => return Err(Rejected::Unsupported("interval with one fixed bound")),
            };
            let item = items.len();
            for (var, role) in [(start, Role::Start(item)), (end, Role::End(item))] {
                if roles[var.index()] != Role::Free {
                    return Err(Rejected::Unsupported("variable shared between intervals"));
                }
                roles[var.index()] = role;
            }
            item_of_interval[idx] = Some(item);
            items.push(Item {
                start,
                end,
                duration: interval.duration,
                candidates: Vec::new(),
            });
        }

        // Element roles
        let mut elements = Vec::new();
        for constraint in model.constraints() {
            if let Constraint::Element {
                index,
                table,
                target,
            } = constraint
            {
                let Role::Start(item) = roles[index.index()] else {
                    return Err(Rejected::Unsupported("element index is not an interval start"));
                };
                if roles[target.index()] != Role::Free {
                    return Err(Rejected::Unsupported("element target already constrained"));
                }
                roles[target.index()] = Role::Target(elements.len());
                elements.push(Element {
                    index: item,
                    table: &**table,
                    target: *target,
                });
            }
        }

        // No-overlap groups
        let mut shares = vec![vec![false; items.len()]; items.len()];
        let mut fixed_for_item: Vec<Vec<SlotRange>> = vec![Vec::new(); items.len()];
        for constraint in model.constraints() {
            let Constraint::NoOverlap(members) = constraint else {
                continue;
            };
            let mut fixed = Vec::new();
            let mut decided = Vec::new();
            for member in members {
                let interval = model.interval(*member);
                match (item_of_interval[member.index()], interval.start) {
                    (Some(item), _) => decided.push(item),
                    (None, Bound::Fixed(start)) => {
                        fixed.push(SlotRange::with_len(start, interval.duration))
                    }
                    (None, Bound::Var(_)) => {
                        return Err(Rejected::Unsupported("unknown interval in no-overlap"))
                    }
                }
            }
            for (i, a) in fixed.iter().enumerate() {
                if fixed[i + 1..].iter().any(|b| a.overlaps(b)) {
                    return Err(Rejected::Infeasible("fixed intervals overlap"));
                }
            }
            for &a in &decided {
                fixed_for_item[a].extend(fixed.iter().copied());
                for &b in &decided {
                    if a != b {
                        shares[a][b] = true;
                    }
                }
            }
        }

        // Objective: weights on item-driven variables, constants elsewhere
        let mut weights: HashMap<usize, i64> = HashMap::new();
        let mut constant_cost = 0;
        for term in model.objective() {
            match roles[term.index()] {
                Role::Free => {
                    if lower[term.index()] > upper[term.index()] {
                        return Err(Rejected::Infeasible("empty objective term domain"));
                    }
                    constant_cost += lower[term.index()];
                }
                _ => *weights.entry(term.index()).or_insert(0) += 1,
            }
        }
        for (idx, role) in roles.iter().enumerate() {
            if *role == Role::Free && lower[idx] > upper[idx] {
                return Err(Rejected::Infeasible("empty variable domain"));
            }
        }

        // Candidate enumeration
        for (item_idx, item) in items.iter_mut().enumerate() {
            let start = item.start.index();
            let end = item.end.index();

            let lo = lower[start].max(lower[end].saturating_sub(item.duration));
            let hi = upper[start].min(upper[end].saturating_sub(item.duration));
            let own_elements: Vec<&Element> =
                elements.iter().filter(|e| e.index == item_idx).collect();

            'candidate: for value in lo..=hi {
                let range = SlotRange::with_len(value, item.duration);
                if fixed_for_item[item_idx].iter().any(|f| f.overlaps(&range)) {
                    continue;
                }
                let mut cost = weights.get(&start).copied().unwrap_or(0) * value
                    + weights.get(&end).copied().unwrap_or(0) * (value + item.duration);
                for element in &own_elements {
                    let Some(&entry) = usize::try_from(value)
                        .ok()
                        .and_then(|v| element.table.get(v))
                    else {
                        continue 'candidate;
                    };
                    let target = element.target.index();
                    if entry < lower[target] || entry > upper[target] {
                        continue 'candidate;
                    }
                    cost += weights.get(&target).copied().unwrap_or(0) * entry;
                }
                item.candidates.push((cost, value));
            }

            if item.candidates.is_empty() {
                return Err(Rejected::Infeasible("interval without a valid start"));
            }
            item.candidates.sort_unstable();
        }

        for (idx, role) in roles.iter().enumerate() {
            if let Role::End(_) | Role::Target(_) = role {
                lower[idx] = 0;
            }
        }

        Ok(Self {
            items,
            elements,
            shares,
            constant_cost,
            lower,
        })
    }

    /// Full variable assignment for the given item starts
    fn values(&self, starts: &[i64]) -> Vec<i64> {
        let mut values = self.lower.clone();
        for (item, start) in self.items.iter().zip(starts) {
            values[item.start.index()] = *start;
            values[item.end.index()] = *start + item.duration;
        }
        for element in &self.elements {
            let index = starts[element.index];
            values[element.target.index()] = element.table[index as usize];
        }
        values
    }
}

// ============================================================================
// Search
// ============================================================================

struct Search<'p, 'm> {
    problem: &'p Problem<'m>,
    order: Vec<usize>,
    /// Cheapest possible cost of items at order positions `k..`
    remaining_bound: Vec<i64>,
    global_bound: i64,
    assignment: Vec<i64>,
    best: Option<(i64, Vec<i64>)>,
    deadline: Instant,
    check_interval: u64,
    steps: u64,
    timed_out: bool,
    done: bool,
}

impl<'p, 'm> Search<'p, 'm> {
    fn new(problem: &'p Problem<'m>, deadline: Instant, check_interval: u64) -> Self {
        let mut order: Vec<usize> = (0..problem.items.len()).collect();
        order.sort_by_key(|&i| (problem.items[i].candidates.len(), i));

        let mut remaining_bound = vec![0; order.len() + 1];
        for k in (0..order.len()).rev() {
            remaining_bound[k] = remaining_bound[k + 1] + problem.items[order[k]].candidates[0].0;
        }

        Self {
            problem,
            global_bound: remaining_bound[0],
            remaining_bound,
            order,
            assignment: vec![0; problem.items.len()],
            best: None,
            deadline,
            check_interval: check_interval.max(1),
            steps: 0,
            timed_out: false,
            done: false,
        }
    }

    fn run(&mut self) {
        self.descend(0, 0);
    }

    fn out_of_time(&mut self) -> bool {
        self.steps += 1;
        if self.steps % self.check_interval == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
            self.done = true;
        }
        self.done
    }

    fn clashes(&self, depth: usize, item: usize, start: i64) -> bool {
        let items = &self.problem.items;
        let range = SlotRange::with_len(start, items[item].duration);
        self.order[..depth].iter().any(|&other| {
            self.problem.shares[item][other]
                && range.overlaps(&SlotRange::with_len(
                    self.assignment[other],
                    items[other].duration,
                ))
        })
    }

    fn descend(&mut self, depth: usize, cost: i64) {
        if depth == self.order.len() {
            if self.best.as_ref().map_or(true, |(best, _)| cost < *best) {
                self.best = Some((cost, self.assignment.clone()));
                if cost <= self.global_bound {
                    self.done = true;
                }
            }
            return;
        }

        let problem = self.problem;
        let item = self.order[depth];
        let candidates = &problem.items[item].candidates;
        for &(candidate_cost, start) in candidates {
            if self.out_of_time() {
                return;
            }
            let bound = cost + candidate_cost + self.remaining_bound[depth + 1];
            if matches!(&self.best, Some((best, _)) if bound >= *best) {
                break;
            }
            if self.clashes(depth, item, start) {
                continue;
            }
            self.assignment[item] = start;
            self.descend(depth + 1, cost + candidate_cost);
            if self.done {
                return;
            }
        }
    }
}

impl Problem<'_> {
    #[cfg(test)]
    fn candidate_count(&self, item: usize) -> usize {
        self.items[item].candidates.len()
    }
}
