use super::domain::{completed_tasks, ChecklistItem, WorkflowStatus};
use super::rules::{rule_for, rule_index, STATUS_RULES};
use serde::Serialize;

/// Share of `status`'s required tasks already completed, 0–100. Stages without
/// requirements are always 100.
pub fn status_completion_percentage(status: WorkflowStatus, checklist: &[ChecklistItem]) -> u8 {
    let Some(rule) = rule_for(status) else {
        return 0;
    };
    if rule.is_unconditional() {
        return 100;
    }

    let done = completed_tasks(checklist);
    let matched = rule
        .required
        .iter()
        .filter(|task| done.contains(task))
        .count();
    percentage(matched, rule.required.len())
}

/// Required labels of `status` still open, in rule order.
pub fn missing_tasks_for_status(
    status: WorkflowStatus,
    checklist: &[ChecklistItem],
) -> Vec<&'static str> {
    let Some(rule) = rule_for(status) else {
        return Vec::new();
    };

    let done = completed_tasks(checklist);
    rule.required
        .iter()
        .filter(|task| !done.contains(task))
        .map(|task| task.label())
        .collect()
}

/// Stage after `current`; `None` once closed.
pub fn next_status(current: WorkflowStatus) -> Option<WorkflowStatus> {
    let index = rule_index(current)?;
    STATUS_RULES.get(index + 1).map(|rule| rule.status)
}

pub(crate) fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = part.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

/// Completion of one stage, as shown on the dossier overview.
#[derive(Debug, Clone, Serialize)]
pub struct StageProgressEntry {
    pub status: WorkflowStatus,
    pub status_label: String,
    pub percentage: u8,
    pub missing: Vec<&'static str>,
}

pub fn stage_progress(checklist: &[ChecklistItem]) -> Vec<StageProgressEntry> {
    WorkflowStatus::ordered()
        .into_iter()
        .map(|status| StageProgressEntry {
            status,
            status_label: status.label().to_string(),
            percentage: status_completion_percentage(status, checklist),
            missing: missing_tasks_for_status(status, checklist),
        })
        .collect()
}
