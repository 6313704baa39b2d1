//! Output formatting for solve results
//!
//! - `json`: one JSON document per request file, either the plain entry list
//!   (the same shape the HTTP service returns) or the full outcome
//! - `text`: a status line followed by one row per placed task

use chrono::{NaiveDate, Weekday};
use clap::ValueEnum;
use studyplan_core::calendar;
use studyplan_core::{PlanOutcome, PlannedTask, Slot};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Entries as the HTTP service would return them
fn wire_entries(outcome: &PlanOutcome) -> &[PlannedTask] {
    if outcome.is_success() {
        &outcome.entries
    } else {
        &[]
    }
}

/// Compact JSON: the entry list, or the whole outcome when `detailed`
pub fn render_json(outcome: &PlanOutcome, detailed: bool) -> serde_json::Result<String> {
    if detailed {
        serde_json::to_string(outcome)
    } else {
        serde_json::to_string(wire_entries(outcome))
    }
}

/// Human-readable slot, as a weekday or as a date when the week start is known
fn when(slot: Slot, week_start: Option<NaiveDate>) -> String {
    match week_start {
        Some(date) => calendar::to_datetime(slot, date)
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| slot.to_string()),
        None => calendar::describe(slot, Weekday::Mon).to_string(),
    }
}

pub fn render_text(label: &str, outcome: &PlanOutcome, week_start: Option<NaiveDate>) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}: {}", label, outcome.status));
    if let Some(objective) = outcome.objective {
        output.push_str(&format!(" (objective {})", objective));
    }
    output.push('\n');

    let entries = wire_entries(outcome);
    let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
    for entry in entries {
        output.push_str(&format!(
            "  {:<width$}  {:>4}..{:<4}  {} - {}\n",
            entry.id,
            entry.start,
            entry.end,
            when(entry.start, week_start),
            when(entry.end, week_start),
            width = width
        ));
    }

    output
}
