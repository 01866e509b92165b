use super::domain::{ChecklistItem, WorkflowStatus};
use super::progress::missing_tasks_for_status;
use super::rules::rule_index;
use serde::Serialize;

pub const UNKNOWN_STATUS_REASON: &str = "Statut inconnu";

const LISTED_MISSING_TASKS: usize = 3;

/// Advisory outcome of a requested status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TransitionCheck {
    fn allowed() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Backward moves are always allowed. Anything else requires every task of
/// the target stage, so a stage with no requirements (`CLOTURE`) is reachable
/// from anywhere.
pub fn is_valid_transition(
    current: WorkflowStatus,
    target: WorkflowStatus,
    checklist: &[ChecklistItem],
) -> TransitionCheck {
    check_indices(rule_index(current), target, checklist)
}

/// Same check over raw tags. An unknown target is rejected; an unknown
/// current status ranks before every stage.
pub fn check_transition_tags(
    current: &str,
    target: &str,
    checklist: &[ChecklistItem],
) -> TransitionCheck {
    let Some(target) = WorkflowStatus::parse(target) else {
        return TransitionCheck::rejected(UNKNOWN_STATUS_REASON);
    };
    let current_index = WorkflowStatus::parse(current).and_then(rule_index);
    check_indices(current_index, target, checklist)
}

fn check_indices(
    current_index: Option<usize>,
    target: WorkflowStatus,
    checklist: &[ChecklistItem],
) -> TransitionCheck {
    let Some(target_index) = rule_index(target) else {
        return TransitionCheck::rejected(UNKNOWN_STATUS_REASON);
    };

    if current_index.is_some_and(|current| target_index < current) {
        return TransitionCheck::allowed();
    }

    let missing = missing_tasks_for_status(target, checklist);
    if missing.is_empty() {
        TransitionCheck::allowed()
    } else {
        TransitionCheck::rejected(missing_reason(&missing))
    }
}

fn missing_reason(missing: &[&'static str]) -> String {
    let listed = missing
        .iter()
        .take(LISTED_MISSING_TASKS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let remaining = missing.len().saturating_sub(LISTED_MISSING_TASKS);

    if remaining > 0 {
        format!("Tâches manquantes : {listed} (+{remaining} autre(s))")
    } else {
        format!("Tâches manquantes : {listed}")
    }
}
