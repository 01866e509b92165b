use super::catalog::{requirements_for, DocumentType};
use crate::workflows::dossier::domain::{ItemId, LegalForm};
use crate::workflows::dossier::progress::percentage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the portal document checklist of a dossier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChecklistItem {
    pub id: ItemId,
    pub document_type: DocumentType,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub required: bool,
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub linked_document_id: Option<String>,
    #[serde(default)]
    pub legal_forms: Option<Vec<LegalForm>>,
}

/// Fields a caller may change on a document item. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChecklistPatch {
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub linked_document_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequiredProgress {
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
    pub required: RequiredProgress,
}

/// Fresh document checklist for `form`. Ids differ on every call, so callers
/// generate once per dossier and persist the result.
pub fn generate_document_checklist(form: LegalForm) -> Vec<DocumentChecklistItem> {
    requirements_for(form)
        .into_iter()
        .map(|entry| DocumentChecklistItem {
            id: ItemId::generate(),
            document_type: entry.document_type,
            label: entry.label.to_string(),
            description: entry.description.to_string(),
            icon: entry.icon.to_string(),
            required: entry.required,
            completed: false,
            completed_at: None,
            completed_by: None,
            notes: None,
            linked_document_id: None,
            legal_forms: entry.legal_forms.map(<[LegalForm]>::to_vec),
        })
        .collect()
}

pub fn checklist_progress(items: &[DocumentChecklistItem]) -> ChecklistProgress {
    let total = items.len();
    let completed = items.iter().filter(|item| item.completed).count();
    let required_total = items.iter().filter(|item| item.required).count();
    let required_completed = items
        .iter()
        .filter(|item| item.required && item.completed)
        .count();

    ChecklistProgress {
        total,
        completed,
        percentage: percentage(completed, total),
        required: RequiredProgress {
            total: required_total,
            completed: required_completed,
            percentage: percentage(required_completed, required_total),
        },
    }
}

pub fn missing_required_documents(items: &[DocumentChecklistItem]) -> Vec<DocumentChecklistItem> {
    items
        .iter()
        .filter(|item| item.required && !item.completed)
        .cloned()
        .collect()
}

pub fn update_checklist_item(
    items: &[DocumentChecklistItem],
    id: &ItemId,
    patch: &DocumentChecklistPatch,
) -> Vec<DocumentChecklistItem> {
    update_checklist_item_at(items, id, patch, Utc::now())
}

/// Merge `patch` into the item with `id`. Completing stamps `completed_at`;
/// un-completing keeps whatever stamp was there.
pub fn update_checklist_item_at(
    items: &[DocumentChecklistItem],
    id: &ItemId,
    patch: &DocumentChecklistPatch,
    now: DateTime<Utc>,
) -> Vec<DocumentChecklistItem> {
    items
        .iter()
        .map(|item| {
            if &item.id != id {
                return item.clone();
            }

            let mut updated = item.clone();
            if let Some(completed) = patch.completed {
                if completed && !item.completed {
                    updated.completed_at = Some(now);
                }
                updated.completed = completed;
            }
            if let Some(completed_by) = &patch.completed_by {
                updated.completed_by = Some(completed_by.clone());
            }
            if let Some(notes) = &patch.notes {
                updated.notes = Some(notes.clone());
            }
            if let Some(document_id) = &patch.linked_document_id {
                updated.linked_document_id = Some(document_id.clone());
            }
            updated
        })
        .collect()
}

pub fn link_document_to_item(
    items: &[DocumentChecklistItem],
    document_type: DocumentType,
    document_id: &str,
) -> Vec<DocumentChecklistItem> {
    link_document_to_item_at(items, document_type, document_id, Utc::now())
}

pub fn link_document_to_item_at(
    items: &[DocumentChecklistItem],
    document_type: DocumentType,
    document_id: &str,
    now: DateTime<Utc>,
) -> Vec<DocumentChecklistItem> {
    items
        .iter()
        .map(|item| {
            if item.document_type != document_type {
                return item.clone();
            }
            DocumentChecklistItem {
                linked_document_id: Some(document_id.to_string()),
                completed: true,
                completed_at: Some(now),
                ..item.clone()
            }
        })
        .collect()
}
