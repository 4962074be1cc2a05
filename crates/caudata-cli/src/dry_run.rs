use crate::output::OutputWriter;
use console::style;
use serde::Serialize;

/// Something a command would do without `--dry-run`
#[derive(Debug, Clone, Serialize)]
pub struct PlannedAction {
    pub action_type: ActionType,
    pub description: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    FetchRecords,
    FetchTiles,
    CreateDirectory,
    WriteFile,
    ClearCache,
}

impl ActionType {
    fn is_remote(self) -> bool {
        matches!(self, ActionType::FetchRecords | ActionType::FetchTiles)
    }

    fn marker(self) -> &'static str {
        match self {
            ActionType::FetchRecords | ActionType::FetchTiles => "↓",
            ActionType::CreateDirectory | ActionType::WriteFile => "+",
            ActionType::ClearCache => "-",
        }
    }
}

impl PlannedAction {
    pub fn new(action_type: ActionType, description: impl Into<String>) -> Self {
        Self { action_type, description: description.into(), details: Vec::new() }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

/// Counts shown under the plan
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct PlanSummary {
    remote_requests: usize,
    files_written: usize,
}

fn summarize(actions: &[PlannedAction]) -> PlanSummary {
    actions.iter().fold(PlanSummary::default(), |mut summary, action| {
        if action.action_type.is_remote() {
            summary.remote_requests += 1;
        }
        if action.action_type == ActionType::WriteFile {
            summary.files_written += 1;
        }
        summary
    })
}

/// Print the plan of a `--dry-run` invocation
pub fn display_planned_actions(output: &OutputWriter, actions: &[PlannedAction]) {
    let summary = summarize(actions);

    if output.is_json() {
        output.json(&serde_json::json!({
            "status": "success",
            "data": {
                "dry_run": true,
                "planned_actions": actions,
                "summary": summary,
            }
        }));
        return;
    }

    output.section("Dry run");
    for action in actions {
        println!("  {} {}", style(action.action_type.marker()).cyan().bold(), action.description);
        for detail in &action.details {
            println!("      {}", style(detail).dim());
        }
    }
    output.info(format!(
        "{} remote source(s), {} file(s) would be written. Nothing was changed.",
        summary.remote_requests, summary.files_written
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_action_details() {
        let action = PlannedAction::new(ActionType::FetchRecords, "Fetch Taricha sierrae")
            .with_detail("Record limit: 5000")
            .with_detail("Cache: .caudata/cache");

        assert_eq!(action.description, "Fetch Taricha sierrae");
        assert_eq!(action.details.len(), 2);
    }

    #[test]
    fn test_action_type_serialization() {
        let action = PlannedAction::new(ActionType::FetchTiles, "Fetch tiles");
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"fetch_tiles\""));
    }

    #[test]
    fn test_summary_counts() {
        let actions = [
            PlannedAction::new(ActionType::FetchRecords, "records"),
            PlannedAction::new(ActionType::FetchTiles, "tiles"),
            PlannedAction::new(ActionType::CreateDirectory, "output"),
            PlannedAction::new(ActionType::WriteFile, "map.svg"),
            PlannedAction::new(ActionType::WriteFile, "report.md"),
        ];
        assert_eq!(summarize(&actions), PlanSummary { remote_requests: 2, files_written: 2 });
    }
}
