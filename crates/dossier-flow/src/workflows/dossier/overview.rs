use super::documents::{checklist_progress, missing_required_documents, ChecklistProgress};
use super::domain::{DossierId, LegalForm, WorkflowStatus};
use super::inference::suggested_status;
use super::progress::{next_status, percentage, stage_progress, StageProgressEntry};
use super::record::Dossier;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub required_total: usize,
    pub required_completed: usize,
    pub percentage: u8,
}

/// Read model combining status, stage completion and document progress.
#[derive(Debug, Clone, Serialize)]
pub struct DossierOverview {
    pub id: DossierId,
    pub reference: String,
    pub company_name: String,
    pub legal_form: LegalForm,
    pub status: WorkflowStatus,
    pub status_label: String,
    pub suggested_status: WorkflowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_status: Option<WorkflowStatus>,
    pub tasks: TaskCounts,
    pub stages: Vec<StageProgressEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<ChecklistProgress>,
    pub missing_documents: Vec<String>,
}

impl DossierOverview {
    pub fn from_dossier(dossier: &Dossier) -> Self {
        let checklist = &dossier.checklist;
        let completed = checklist.iter().filter(|item| item.completed).count();
        let required_total = checklist.iter().filter(|item| item.required).count();
        let required_completed = checklist
            .iter()
            .filter(|item| item.required && item.completed)
            .count();

        let documents = dossier.document_checklist.as_deref();

        Self {
            id: dossier.id.clone(),
            reference: dossier.reference.clone(),
            company_name: dossier.company_name.clone(),
            legal_form: dossier.legal_form,
            status: dossier.status,
            status_label: dossier.status.label().to_string(),
            suggested_status: suggested_status(checklist),
            next_status: next_status(dossier.status),
            tasks: TaskCounts {
                total: checklist.len(),
                completed,
                required_total,
                required_completed,
                percentage: percentage(completed, checklist.len()),
            },
            stages: stage_progress(checklist),
            documents: documents.map(checklist_progress),
            missing_documents: documents
                .map(|items| {
                    missing_required_documents(items)
                        .into_iter()
                        .map(|item| item.label)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
