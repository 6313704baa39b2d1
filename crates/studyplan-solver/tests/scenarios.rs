//! End-to-end planning scenarios over the built-in search backend

use pretty_assertions::assert_eq;
use studyplan_core::calendar::{self, SlotRange};
use studyplan_core::{
    FixedBlock, PlanOutcome, PlanStatus, PlannedTask, Planner, ScheduleRequest, StudyTask,
    ValidationError,
};
use studyplan_solver::{synthesize_blackouts, StudyPlanner};

fn plan(request: &ScheduleRequest) -> PlanOutcome {
    StudyPlanner::new()
        .plan(request)
        .expect("request should be valid")
}

fn assert_pairwise_disjoint(ranges: &[SlotRange]) {
    for (i, a) in ranges.iter().enumerate() {
        for b in &ranges[i + 1..] {
            assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn happy_path() {
    let request = ScheduleRequest::new().task(StudyTask::new("H", 50).deadline(150));
    let entries = StudyPlanner::new().optimize(&request).unwrap();

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.id, "H");
    assert_eq!(entry.end, entry.start + 50);
    assert!((0..=100).contains(&entry.start));
    // night rest ends at 06:00
    assert!(entry.start >= calendar::MORNING_END);
}

#[test]
fn two_competing_tasks() {
    let request = ScheduleRequest::new()
        .horizon(2016)
        .task(StudyTask::new("A", 50).deadline(300))
        .task(StudyTask::new("B", 50).deadline(300));
    let entries = StudyPlanner::new().optimize(&request).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "A");
    assert_eq!(entries[1].id, "B");
    assert!(!entries[0].range().overlaps(&entries[1].range()));
    assert!(entries.iter().all(|e| e.end <= 300));
}

#[test]
fn impossible_deadline_yields_empty_list() {
    let request = ScheduleRequest::new().task(StudyTask::new("X", 50).deadline(10));
    let outcome = plan(&request);

    assert_eq!(outcome.status, PlanStatus::Infeasible);
    assert_eq!(outcome.into_entries(), Vec::<PlannedTask>::new());
}

#[test]
fn fixed_block_collision_at_week_start() {
    // [0, 50) lies inside the first night rest. The earliest start after the
    // rest is 72, and 72 + 50 misses the deadline of 100, so no plan exists.
    let request = ScheduleRequest::new()
        .fixed_block(FixedBlock::new(0, 50))
        .task(StudyTask::new("T", 50).deadline(100).earliest_start(0));
    let outcome = plan(&request);

    assert_eq!(outcome.status, PlanStatus::Infeasible);
    assert!(outcome.into_entries().is_empty());
}

#[test]
fn fixed_block_pushes_task_behind_it() {
    let request = ScheduleRequest::new()
        .fixed_block(FixedBlock::new(100, 50))
        .task(StudyTask::new("T", 50).deadline(200).earliest_start(100));
    let entries = StudyPlanner::new().optimize(&request).unwrap();

    assert_eq!(
        entries,
        vec![PlannedTask {
            id: "T".into(),
            start: 150,
            end: 200,
        }]
    );
}

#[test]
fn more_work_than_free_time_is_infeasible() {
    // each day offers 192 free slots
    let request = ScheduleRequest::new()
        .horizon(288)
        .task(StudyTask::new("a", 100))
        .task(StudyTask::new("b", 100));
    assert_eq!(plan(&request).status, PlanStatus::Infeasible);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn nothing_overlaps_tasks_blocks_or_rest() {
    let request = ScheduleRequest::new()
        .task(StudyTask::new("a", 40))
        .task(StudyTask::new("b", 60).deadline(700))
        .task(StudyTask::new("c", 30).earliest_start(300))
        .task(StudyTask::new("d", 90))
        .fixed_block(FixedBlock::new(80, 24))
        .fixed_block(FixedBlock::new(400, 36))
        .blocked_day(3);
    let outcome = plan(&request);
    assert!(outcome.is_success());
    assert_eq!(outcome.entries.len(), 4);

    let mut ranges: Vec<SlotRange> = outcome.entries.iter().map(PlannedTask::range).collect();
    assert_pairwise_disjoint(&ranges);

    let blackouts: Vec<SlotRange> = synthesize_blackouts(&request)
        .iter()
        .map(|b| b.range)
        .collect();
    for entry in &outcome.entries {
        for blackout in &blackouts {
            assert!(!entry.range().overlaps(blackout), "{} hits {blackout}", entry.id);
        }
    }

    ranges.extend(request.fixed_blocks.iter().map(FixedBlock::range));
    assert_pairwise_disjoint(&ranges);
}

#[test]
fn deadlines_and_earliest_starts_hold() {
    let request = ScheduleRequest::new()
        .current_slot(400)
        .task(StudyTask::new("soon", 20).deadline(500))
        .task(StudyTask::new("later", 20).earliest_start(1000))
        .task(StudyTask::new("open", 20));
    let outcome = plan(&request);
    assert!(outcome.is_success());

    for entry in &outcome.entries {
        let task = request.get_task(&entry.id).unwrap();
        assert_eq!(entry.end, entry.start + task.duration);
        assert!(entry.start >= request.effective_earliest_start(task));
        assert!(entry.end <= request.deadline_of(task));
        assert!(entry.end <= request.horizon);
    }
    let later = outcome.entries.iter().find(|e| e.id == "later").unwrap();
    assert!(later.start >= 1000);
}

#[test]
fn current_slot_past_deadline_is_infeasible() {
    let request = ScheduleRequest::new()
        .current_slot(600)
        .task(StudyTask::new("late", 10).deadline(500));
    assert!(StudyPlanner::new().optimize(&request).unwrap().is_empty());
}

#[test]
fn blocked_days_stay_empty() {
    let mut request = ScheduleRequest::new().task(StudyTask::new("only", 50));
    for day in 0..6 {
        request = request.blocked_day(day);
    }
    let outcome = plan(&request);
    assert!(outcome.is_success());

    let entry = &outcome.entries[0];
    for day in 0..6 {
        assert!(!entry.range().overlaps(&calendar::day_range(day)));
    }
    let sunday = calendar::day_start(6);
    assert!(entry.start >= sunday + calendar::MORNING_END);
    assert!(entry.end <= sunday + calendar::EVENING_START);
}

#[test]
fn preference_never_raises_the_objective() {
    let base = ScheduleRequest::new()
        .task(StudyTask::new("a", 12))
        .task(StudyTask::new("b", 24).deadline(900));
    let preferred = base.clone().preference_time("morgens,abends");

    let plain = plan(&base);
    let tagged = plan(&preferred);
    assert_eq!(plain.objective, Some(0));
    assert_eq!(tagged.objective, Some(-20));
    assert!(tagged.objective <= plain.objective);
}

#[test]
fn preferred_window_is_chosen() {
    let request = ScheduleRequest::new()
        .task(StudyTask::new("reading", 12))
        .preference_time("nachmittags");
    let outcome = plan(&request);
    assert_eq!(outcome.status, PlanStatus::Optimal);

    let start = outcome.entries[0].start;
    let day = start / calendar::SLOTS_PER_DAY;
    let window = calendar::day_start(day) + calendar::slot(0, 15)
        ..calendar::day_start(day) + calendar::slot(0, 18);
    assert!(window.contains(&start), "start {start} outside afternoon");
}

#[test]
fn unknown_preference_tokens_change_nothing() {
    let request = ScheduleRequest::new()
        .task(StudyTask::new("a", 12))
        .preference_time("nachts,irgendwann");
    assert_eq!(plan(&request).objective, Some(0));
}

#[test]
fn cost_override_pulls_task_to_slot() {
    let request = ScheduleRequest::new().task(StudyTask::new("t", 10).cost(500, -50));
    let outcome = plan(&request);
    assert_eq!(outcome.status, PlanStatus::Optimal);
    assert_eq!(outcome.objective, Some(-50));
    assert_eq!(outcome.entries[0].start, 500);
}

#[test]
fn cost_override_stacks_on_preference_bonus() {
    // 09:00 on day 0 is vormittags, 14:00 is mittags
    let vormittags = calendar::slot(0, 9);
    let request = ScheduleRequest::new()
        .task(StudyTask::new("t", 10).cost(vormittags, -5).cost(calendar::slot(0, 14), 100))
        .preference_time("vormittags");
    let outcome = plan(&request);
    assert_eq!(outcome.objective, Some(-15));
    assert_eq!(outcome.entries[0].start, vormittags);
}

// ============================================================================
// Input handling
// ============================================================================

#[test]
fn fixed_block_reaching_past_i64_range_blocks_everything() {
    let request = ScheduleRequest::from_json_str(&format!(
        r#"{{"tasks": [{{"id": "a", "duration": 10}}],
            "fixed_blocks": [{{"start": 10, "duration": {}}}]}}"#,
        i64::MAX
    ))
    .unwrap();
    assert!(request.validate().is_ok());

    let outcome = plan(&request);
    assert_eq!(outcome.status, PlanStatus::Infeasible);
    assert!(outcome.entries.is_empty());
}

#[test]
fn extreme_cost_override_makes_slot_unselectable() {
    let request = ScheduleRequest::from_json_str(&format!(
        r#"{{"tasks": [{{"id": "a", "duration": 10, "costs": [{{"t": 72, "c": {}}}]}}],
            "preference_time": "morgens"}}"#,
        i64::MIN
    ))
    .unwrap();

    let outcome = plan(&request);
    assert_eq!(outcome.status, PlanStatus::Optimal);
    assert_eq!(outcome.objective, Some(-10));
    assert!((73..108).contains(&outcome.entries[0].start));
}

#[test]
fn duration_at_i64_max_is_infeasible() {
    let request = ScheduleRequest::from_json_str(&format!(
        r#"{{"current_slot": 5, "tasks": [{{"id": "a", "duration": {}}}]}}"#,
        i64::MAX
    ))
    .unwrap();

    assert_eq!(plan(&request).status, PlanStatus::Infeasible);
}

#[test]
fn oversized_horizon_is_rejected() {
    let request = ScheduleRequest::new()
        .horizon(i64::MAX)
        .task(StudyTask::new("a", 10));
    assert_eq!(
        StudyPlanner::new().plan(&request),
        Err(ValidationError::HorizonTooLarge(i64::MAX))
    );
}

#[test]
fn validation_errors_surface_as_err() {
    let request = ScheduleRequest::new()
        .task(StudyTask::new("dup", 10))
        .task(StudyTask::new("dup", 10));
    assert_eq!(
        StudyPlanner::new().plan(&request),
        Err(ValidationError::DuplicateTaskId("dup".into()))
    );
}

#[test]
fn wire_request_to_wire_response() {
    let request = ScheduleRequest::from_json_str(
        r#"{
            "horizon": 2016,
            "current_slot": 0,
            "tasks": [{"id": "H", "duration": 50, "deadline": 150}],
            "fixed_blocks": [{"start": 72, "duration": 12}],
            "blocked_days": [],
            "preference_time": ""
        }"#,
    )
    .unwrap();
    let entries = StudyPlanner::new().optimize(&request).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].start >= 84);

    let json = serde_json::to_value(&entries).unwrap();
    assert_eq!(json[0]["id"], "H");
    assert_eq!(json[0]["end"].as_i64(), Some(entries[0].start + 50));
}
