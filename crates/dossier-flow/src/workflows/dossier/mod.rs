//! Company-formation dossiers: status rules, checklist inference and the
//! portal document checklist, plus the service and HTTP surface around them.

mod blueprint;
pub mod documents;
pub mod domain;
mod inference;
mod overview;
mod progress;
pub mod record;
pub mod repository;
pub mod router;
mod rules;
pub mod service;
mod transition;

#[cfg(test)]
mod tests;

pub use blueprint::{ChecklistBlueprint, ChecklistTemplate};
pub use domain::{
    completed_tasks, ChecklistItem, ChecklistTask, DossierId, ItemId, LegalForm, WorkflowStatus,
};
pub use inference::{suggested_status, StatusSuggestion};
pub use overview::{DossierOverview, TaskCounts};
pub use progress::{
    missing_tasks_for_status, next_status, stage_progress, status_completion_percentage,
    StageProgressEntry,
};
pub use record::{ChecklistDiff, Dossier, DossierPatch, NewDossier, TimelineEntry, TimelineEvent};
pub use repository::{DossierRepository, RepositoryError, TimelineAppender, TimelineError};
pub use router::dossier_router;
pub use rules::{rule_for, rule_index, rules, StatusRule, STATUS_RULES};
pub use service::{ChecklistUpdate, DossierService, DossierServiceError, StatusChange};
pub use transition::{
    check_transition_tags, is_valid_transition, TransitionCheck, UNKNOWN_STATUS_REASON,
};
