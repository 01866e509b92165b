use super::documents::{DocumentChecklistItem, DocumentType};
use super::domain::{ChecklistItem, DossierId, LegalForm, WorkflowStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client's company-formation matter as kept by the case store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dossier {
    pub id: DossierId,
    pub reference: String,
    pub company_name: String,
    pub legal_form: LegalForm,
    pub status: WorkflowStatus,
    pub checklist: Vec<ChecklistItem>,
    /// Generated on first access, then persisted.
    #[serde(default)]
    pub document_checklist: Option<Vec<DocumentChecklistItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDossier {
    pub company_name: String,
    pub legal_form: LegalForm,
}

/// Partial update applied by the case store. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DossierPatch {
    pub status: Option<WorkflowStatus>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub document_checklist: Option<Vec<DocumentChecklistItem>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DossierPatch {
    pub fn apply(self, dossier: &mut Dossier) {
        if let Some(status) = self.status {
            dossier.status = status;
        }
        if let Some(checklist) = self.checklist {
            dossier.checklist = checklist;
        }
        if let Some(documents) = self.document_checklist {
            dossier.document_checklist = Some(documents);
        }
        if let Some(updated_at) = self.updated_at {
            dossier.updated_at = updated_at;
        }
    }
}

/// Labels that changed completion between two checklist snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistDiff {
    pub completed: Vec<String>,
    pub reopened: Vec<String>,
}

impl ChecklistDiff {
    /// Items are matched by id; items present on one side only are ignored.
    pub fn between(before: &[ChecklistItem], after: &[ChecklistItem]) -> Self {
        let mut diff = Self::default();
        for item in after {
            let Some(previous) = before.iter().find(|candidate| candidate.id == item.id) else {
                continue;
            };
            match (previous.completed, item.completed) {
                (false, true) => diff.completed.push(item.label.clone()),
                (true, false) => diff.reopened.push(item.label.clone()),
                _ => {}
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.reopened.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    Created,
    StatusChanged {
        from: WorkflowStatus,
        to: WorkflowStatus,
    },
    TaskToggled {
        diff: ChecklistDiff,
    },
    DocumentUpdated {
        document_type: DocumentType,
    },
}

/// Immutable history line appended by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub description: String,
    pub event: TimelineEvent,
}

impl TimelineEntry {
    pub fn created(dossier: &Dossier) -> Self {
        Self {
            at: dossier.created_at,
            description: format!(
                "Dossier {} ouvert pour {} ({})",
                dossier.reference, dossier.company_name, dossier.legal_form
            ),
            event: TimelineEvent::Created,
        }
    }

    pub fn status_changed(from: WorkflowStatus, to: WorkflowStatus, at: DateTime<Utc>) -> Self {
        Self {
            at,
            description: format!("Statut modifié : {} → {}", from.label(), to.label()),
            event: TimelineEvent::StatusChanged { from, to },
        }
    }

    pub fn tasks_toggled(diff: ChecklistDiff, at: DateTime<Utc>) -> Self {
        let mut parts = Vec::new();
        if !diff.completed.is_empty() {
            parts.push(format!("terminé : {}", diff.completed.join(", ")));
        }
        if !diff.reopened.is_empty() {
            parts.push(format!("rouvert : {}", diff.reopened.join(", ")));
        }
        Self {
            at,
            description: format!("Checklist mise à jour ({})", parts.join(" ; ")),
            event: TimelineEvent::TaskToggled { diff },
        }
    }

    pub fn document_updated(document_type: DocumentType, label: &str, at: DateTime<Utc>) -> Self {
        Self {
            at,
            description: format!("Pièce mise à jour : {label}"),
            event: TimelineEvent::DocumentUpdated { document_type },
        }
    }
}
