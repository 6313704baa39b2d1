//! Solution extraction

use crate::encode::EncodedTask;
use studyplan_core::model::CpSolution;
use studyplan_core::PlannedTask;

/// Project solver values back onto tasks, in encoding (input) order.
///
/// Returns an empty list when the solution carries no assignment.
pub fn format_solution(solution: &CpSolution, tasks: &[EncodedTask]) -> Vec<PlannedTask> {
    tasks
        .iter()
        .map(|task| {
            solution.value(task.start).map(|start| PlannedTask {
                id: task.id.clone(),
                start,
                end: start + task.duration,
            })
        })
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_task;
    use pretty_assertions::assert_eq;
    use studyplan_core::model::{CpModel, SolveStatus};
    use studyplan_core::{ScheduleRequest, StudyTask};

    fn encoded(tasks: &[StudyTask]) -> (CpModel, Vec<EncodedTask>) {
        let request = ScheduleRequest::new();
        let mut model = CpModel::new();
        let encoded = tasks
            .iter()
            .map(|t| encode_task(&mut model, &request, t))
            .collect();
        (model, encoded)
    }

    #[test]
    fn end_is_start_plus_duration() {
        let (_, tasks) = encoded(&[StudyTask::new("test_task", 100)]);
        // start, end
        let solution = CpSolution::solved(SolveStatus::Optimal, 0, vec![100, 200]);
        assert_eq!(
            format_solution(&solution, &tasks),
            vec![PlannedTask {
                id: "test_task".into(),
                start: 100,
                end: 200,
            }]
        );
    }

    #[test]
    fn keeps_input_order() {
        let (_, tasks) = encoded(&[StudyTask::new("b", 5), StudyTask::new("a", 10)]);
        let solution = CpSolution::solved(SolveStatus::Feasible, 0, vec![300, 305, 80, 90]);
        let ids: Vec<_> = format_solution(&solution, &tasks)
            .into_iter()
            .map(|p| (p.id, p.start, p.end))
            .collect();
        assert_eq!(
            ids,
            vec![(String::from("b"), 300, 305), (String::from("a"), 80, 90)]
        );
    }

    #[test]
    fn no_assignment_yields_empty_list() {
        let (_, tasks) = encoded(&[StudyTask::new("a", 5)]);
        let solution = CpSolution::without_solution(SolveStatus::Infeasible);
        assert!(format_solution(&solution, &tasks).is_empty());
    }
}
