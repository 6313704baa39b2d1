//! Backend-neutral constraint model
//!
//! The encoder describes a plan as a small discrete optimization problem:
//! bounded integer variables, fixed-length intervals, a no-overlap constraint
//! over intervals, element (table lookup) constraints and a linear
//! minimization objective. Any [`CpSolver`] that understands these building
//! blocks can solve it.
//!
//! The model is plain data. Building it never fails: a variable with an empty
//! domain is legal and simply makes the model infeasible.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Handle to an integer variable of a [`CpModel`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar(usize);

impl IntVar {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle to an interval of a [`CpModel`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalVar(usize);

impl IntervalVar {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Bounded integer variable `lb <= x <= ub`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarDomain {
    pub lb: i64,
    pub ub: i64,
    pub name: String,
}

impl VarDomain {
    pub fn is_empty(&self) -> bool {
        self.lb > self.ub
    }
}

/// Where an interval starts or ends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Fixed(i64),
    Var(IntVar),
}

/// Interval of constant length. `end = start + duration` is implied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: Bound,
    pub duration: i64,
    pub end: Bound,
    pub name: String,
}

impl Interval {
    pub fn is_fixed(&self) -> bool {
        matches!(self.start, Bound::Fixed(_))
    }
}

/// Constraints understood by every backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// `var <= bound`
    LessOrEqual { var: IntVar, bound: i64 },
    /// No two listed intervals share a slot
    NoOverlap(Vec<IntervalVar>),
    /// `target = table[index]`
    Element {
        index: IntVar,
        table: Arc<[i64]>,
        target: IntVar,
    },
}

/// A discrete constraint-optimization problem
#[derive(Clone, Debug, Default)]
pub struct CpModel {
    vars: Vec<VarDomain>,
    intervals: Vec<Interval>,
    constraints: Vec<Constraint>,
    objective: Vec<IntVar>,
}

impl CpModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bounded integer variable. `lb > ub` yields an empty domain.
    pub fn new_int_var(&mut self, lb: i64, ub: i64, name: impl Into<String>) -> IntVar {
        self.vars.push(VarDomain {
            lb,
            ub,
            name: name.into(),
        });
        IntVar(self.vars.len() - 1)
    }

    /// Create an interval `[start, end)` of constant length, linking `end = start + duration`
    pub fn new_interval(
        &mut self,
        start: IntVar,
        duration: i64,
        end: IntVar,
        name: impl Into<String>,
    ) -> IntervalVar {
        self.push_interval(Interval {
            start: Bound::Var(start),
            duration,
            end: Bound::Var(end),
            name: name.into(),
        })
    }

    /// Create an interval at a known position
    pub fn new_fixed_interval(
        &mut self,
        start: i64,
        duration: i64,
        name: impl Into<String>,
    ) -> IntervalVar {
        self.push_interval(Interval {
            start: Bound::Fixed(start),
            duration,
            end: Bound::Fixed(start.saturating_add(duration)),
            name: name.into(),
        })
    }

    fn push_interval(&mut self, interval: Interval) -> IntervalVar {
        self.intervals.push(interval);
        IntervalVar(self.intervals.len() - 1)
    }

    pub fn add_less_or_equal(&mut self, var: IntVar, bound: i64) {
        self.constraints.push(Constraint::LessOrEqual { var, bound });
    }

    pub fn add_no_overlap(&mut self, intervals: impl IntoIterator<Item = IntervalVar>) {
        self.constraints
            .push(Constraint::NoOverlap(intervals.into_iter().collect()));
    }

    pub fn add_element(&mut self, index: IntVar, table: impl Into<Arc<[i64]>>, target: IntVar) {
        self.constraints.push(Constraint::Element {
            index,
            table: table.into(),
            target,
        });
    }

    /// Minimize the sum of `terms`. Replaces any previous objective.
    pub fn minimize(&mut self, terms: impl IntoIterator<Item = IntVar>) {
        self.objective = terms.into_iter().collect();
    }

    pub fn vars(&self) -> &[VarDomain] {
        &self.vars
    }

    pub fn var(&self, var: IntVar) -> &VarDomain {
        &self.vars[var.0]
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn interval(&self, interval: IntervalVar) -> &Interval {
        &self.intervals[interval.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[IntVar] {
        &self.objective
    }

    /// Summary counts for logging
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            variables: self.vars.len(),
            intervals: self.intervals.len(),
            fixed_intervals: self.intervals.iter().filter(|i| i.is_fixed()).count(),
            constraints: self.constraints.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelStats {
    pub variables: usize,
    pub intervals: usize,
    pub fixed_intervals: usize,
    pub constraints: usize,
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vars, {} intervals ({} fixed), {} constraints",
            self.variables, self.intervals, self.fixed_intervals, self.constraints
        )
    }
}

// ============================================================================
// Solver contract
// ============================================================================

/// Limits applied to a single solve
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveLimits {
    /// Wall-clock budget. The backend stops itself when it runs out.
    pub time_limit: Duration,
}

impl SolveLimits {
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(4);

    pub const fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIME_LIMIT)
    }
}

/// Verdict of a solve
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// Best solution proven optimal
    Optimal,
    /// A solution was found, optimality not proven within the budget
    Feasible,
    /// Proven that no solution exists
    Infeasible,
    /// Budget exhausted before any solution was found
    Unknown,
    /// The backend cannot represent the model
    ModelInvalid,
}

impl SolveStatus {
    pub const fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Result of a solve: status, objective and one value per model variable
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpSolution {
    pub status: SolveStatus,
    pub objective: Option<i64>,
    values: Vec<i64>,
}

impl CpSolution {
    /// A solution with values for every variable, indexed like the model
    pub fn solved(status: SolveStatus, objective: i64, values: Vec<i64>) -> Self {
        Self {
            status,
            objective: Some(objective),
            values,
        }
    }

    /// A verdict without an assignment
    pub fn without_solution(status: SolveStatus) -> Self {
        Self {
            status,
            objective: None,
            values: Vec::new(),
        }
    }

    /// Value of `var`, if a solution was found
    pub fn value(&self, var: IntVar) -> Option<i64> {
        if self.status.has_solution() {
            self.values.get(var.0).copied()
        } else {
            None
        }
    }
}

/// A discrete constraint solver able to handle a [`CpModel`]
pub trait CpSolver: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Solve the model within the given limits
    fn solve(&self, model: &CpModel, limits: &SolveLimits) -> CpSolution;
}

impl<S: CpSolver + ?Sized> CpSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, model: &CpModel, limits: &SolveLimits) -> CpSolution {
        (**self).solve(model, limits)
    }
}
