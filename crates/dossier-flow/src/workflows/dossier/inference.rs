use super::domain::{completed_tasks, ChecklistItem, WorkflowStatus};
use super::rules::STATUS_RULES;
use serde::Serialize;

/// Most advanced status whose requirements the checklist satisfies.
///
/// `CLOTURE` is never suggested and `NOUVEAU` is the fallback. Labels outside
/// the rule vocabulary count as incomplete.
pub fn suggested_status(checklist: &[ChecklistItem]) -> WorkflowStatus {
    let done = completed_tasks(checklist);
    let candidates = &STATUS_RULES[..STATUS_RULES.len() - 1];

    candidates
        .iter()
        .rev()
        .filter(|rule| !rule.is_unconditional())
        .find(|rule| rule.required.iter().all(|task| done.contains(task)))
        .map(|rule| rule.status)
        .unwrap_or(WorkflowStatus::New)
}

/// Suggestion handed back to the host after a checklist change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSuggestion {
    pub current: WorkflowStatus,
    pub suggested: WorkflowStatus,
    pub differs: bool,
}

impl StatusSuggestion {
    pub fn compute(current: WorkflowStatus, checklist: &[ChecklistItem]) -> Self {
        let suggested = suggested_status(checklist);
        Self {
            current,
            suggested,
            differs: suggested != current,
        }
    }
}
