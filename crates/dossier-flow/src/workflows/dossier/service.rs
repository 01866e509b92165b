use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::blueprint::ChecklistBlueprint;
use super::documents::{
    generate_document_checklist, link_document_to_item, update_checklist_item,
    DocumentChecklistItem, DocumentChecklistPatch, DocumentType,
};
use super::domain::{DossierId, ItemId, WorkflowStatus};
use super::inference::StatusSuggestion;
use super::overview::DossierOverview;
use super::record::{ChecklistDiff, Dossier, DossierPatch, NewDossier, TimelineEntry};
use super::repository::{DossierRepository, RepositoryError, TimelineAppender, TimelineError};
use super::transition::{check_transition_tags, is_valid_transition, TransitionCheck};
use crate::config::DossierConfig;

/// Result of a checklist toggle, including the recomputed status suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistUpdate {
    pub dossier: Dossier,
    pub diff: ChecklistDiff,
    pub suggestion: StatusSuggestion,
}

/// Committed status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub dossier: Dossier,
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
}

/// Service composing the case store, the timeline and the workflow rules.
pub struct DossierService<R, T> {
    repository: Arc<R>,
    timeline: Arc<T>,
    blueprint: ChecklistBlueprint,
    config: DossierConfig,
    sequence: AtomicU64,
    sequence_seeded: AtomicBool,
}

impl<R, T> DossierService<R, T>
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    pub fn new(repository: Arc<R>, timeline: Arc<T>, config: DossierConfig) -> Self {
        Self {
            repository,
            timeline,
            blueprint: ChecklistBlueprint::company_formation(),
            config,
            sequence: AtomicU64::new(1),
            sequence_seeded: AtomicBool::new(false),
        }
    }

    /// References continue after the highest one already stored, so a
    /// persistent repository never sees a sequence restart at 1.
    fn next_reference(&self) -> Result<String, DossierServiceError> {
        if !self.sequence_seeded.load(Ordering::Acquire) {
            let highest = self
                .repository
                .list()?
                .iter()
                .filter_map(|dossier| self.reference_sequence(&dossier.reference))
                .max()
                .unwrap_or(0);
            self.sequence.fetch_max(highest + 1, Ordering::AcqRel);
            self.sequence_seeded.store(true, Ordering::Release);
        }

        let id = self.sequence.fetch_add(1, Ordering::AcqRel);
        Ok(format!("{}-{id:06}", self.config.reference_prefix))
    }

    fn reference_sequence(&self, reference: &str) -> Option<u64> {
        reference
            .strip_prefix(self.config.reference_prefix.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }

    /// Append `entry`, undoing the already-stored change with `rollback` when
    /// the timeline refuses it.
    fn record(
        &self,
        id: &DossierId,
        entry: TimelineEntry,
        rollback: DossierPatch,
    ) -> Result<(), DossierServiceError> {
        let Err(error) = self.timeline.append(id, entry) else {
            return Ok(());
        };
        if let Err(rollback_error) = self.repository.patch(id, rollback) {
            warn!(dossier = %id, error = %rollback_error, "rollback after timeline failure failed");
        }
        Err(error.into())
    }

    /// Open a dossier with a fresh checklist for its legal form.
    pub fn create(&self, new: NewDossier) -> Result<Dossier, DossierServiceError> {
        let company_name = new.company_name.trim();
        if company_name.is_empty() {
            return Err(DossierServiceError::EmptyCompanyName);
        }

        let now = Utc::now();
        let dossier = Dossier {
            id: DossierId::generate(),
            reference: self.next_reference()?,
            company_name: company_name.to_string(),
            legal_form: new.legal_form,
            status: WorkflowStatus::New,
            checklist: self.blueprint.instantiate(new.legal_form),
            document_checklist: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(dossier)?;
        if let Err(error) = self
            .timeline
            .append(&stored.id, TimelineEntry::created(&stored))
        {
            if let Err(rollback_error) = self.repository.remove(&stored.id) {
                warn!(dossier = %stored.id, error = %rollback_error, "rollback after timeline failure failed");
            }
            return Err(error.into());
        }

        info!(
            dossier = %stored.id,
            reference = %stored.reference,
            legal_form = %stored.legal_form,
            "dossier created"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &DossierId) -> Result<Dossier, DossierServiceError> {
        let dossier = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(dossier)
    }

    pub fn list(&self) -> Result<Vec<Dossier>, DossierServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn delete(&self, id: &DossierId) -> Result<(), DossierServiceError> {
        self.repository.remove(id)?;
        info!(dossier = %id, "dossier deleted");
        Ok(())
    }

    pub fn timeline(&self, id: &DossierId) -> Result<Vec<TimelineEntry>, DossierServiceError> {
        self.get(id)?;
        Ok(self.timeline.entries(id)?)
    }

    /// Set one checklist item's completion and recompute the suggestion.
    pub fn toggle_task(
        &self,
        id: &DossierId,
        item_id: &ItemId,
        completed: bool,
    ) -> Result<ChecklistUpdate, DossierServiceError> {
        let dossier = self.get(id)?;
        let now = Utc::now();

        let mut checklist = dossier.checklist.clone();
        let item = checklist
            .iter_mut()
            .find(|item| &item.id == item_id)
            .ok_or_else(|| DossierServiceError::ItemNotFound(item_id.clone()))?;
        item.set_completed(completed, now);

        let diff = ChecklistDiff::between(&dossier.checklist, &checklist);
        let dossier = if diff.is_empty() {
            dossier
        } else {
            let stored = self.repository.patch(
                id,
                DossierPatch {
                    checklist: Some(checklist),
                    updated_at: Some(now),
                    ..Default::default()
                },
            )?;
            self.record(
                id,
                TimelineEntry::tasks_toggled(diff.clone(), now),
                DossierPatch {
                    checklist: Some(dossier.checklist.clone()),
                    updated_at: Some(dossier.updated_at),
                    ..Default::default()
                },
            )?;
            stored
        };

        let suggestion = StatusSuggestion::compute(dossier.status, &dossier.checklist);
        debug!(
            dossier = %id,
            current = %suggestion.current,
            suggested = %suggestion.suggested,
            "checklist updated"
        );

        Ok(ChecklistUpdate {
            dossier,
            diff,
            suggestion,
        })
    }

    pub fn suggestion(&self, id: &DossierId) -> Result<StatusSuggestion, DossierServiceError> {
        let dossier = self.get(id)?;
        Ok(StatusSuggestion::compute(dossier.status, &dossier.checklist))
    }

    /// Dry-run of a status change over a raw tag.
    pub fn check_transition(
        &self,
        id: &DossierId,
        target: &str,
    ) -> Result<TransitionCheck, DossierServiceError> {
        let dossier = self.get(id)?;
        Ok(check_transition_tags(
            dossier.status.tag(),
            target,
            &dossier.checklist,
        ))
    }

    pub fn change_status_tag(
        &self,
        id: &DossierId,
        target: &str,
    ) -> Result<StatusChange, DossierServiceError> {
        let target = WorkflowStatus::parse(target)
            .ok_or_else(|| DossierServiceError::UnknownStatus(target.to_string()))?;
        self.change_status(id, target)
    }

    /// Validate and commit a status change, recording it on the timeline.
    /// Asking for the current status changes nothing.
    pub fn change_status(
        &self,
        id: &DossierId,
        target: WorkflowStatus,
    ) -> Result<StatusChange, DossierServiceError> {
        let dossier = self.get(id)?;
        let from = dossier.status;

        if from == target {
            return Ok(StatusChange {
                dossier,
                from,
                to: target,
            });
        }

        let check = is_valid_transition(from, target, &dossier.checklist);
        if !check.valid {
            let reason = check.reason.unwrap_or_default();
            warn!(dossier = %id, %from, to = %target, %reason, "status change rejected");
            return Err(DossierServiceError::TransitionRejected {
                from,
                to: target,
                reason,
            });
        }

        let now = Utc::now();
        let stored = self.repository.patch(
            id,
            DossierPatch {
                status: Some(target),
                updated_at: Some(now),
                ..Default::default()
            },
        )?;
        self.record(
            id,
            TimelineEntry::status_changed(from, target, now),
            DossierPatch {
                status: Some(from),
                updated_at: Some(dossier.updated_at),
                ..Default::default()
            },
        )?;

        info!(dossier = %id, %from, to = %target, "status changed");
        Ok(StatusChange {
            dossier: stored,
            from,
            to: target,
        })
    }

    /// Document checklist of the dossier, generated and stored on first use.
    pub fn document_checklist(
        &self,
        id: &DossierId,
    ) -> Result<Vec<DocumentChecklistItem>, DossierServiceError> {
        let dossier = self.get(id)?;
        self.ensure_documents(dossier)
    }

    fn ensure_documents(
        &self,
        dossier: Dossier,
    ) -> Result<Vec<DocumentChecklistItem>, DossierServiceError> {
        if let Some(documents) = dossier.document_checklist {
            return Ok(documents);
        }

        let documents = generate_document_checklist(dossier.legal_form);
        self.repository.patch(
            &dossier.id,
            DossierPatch {
                document_checklist: Some(documents.clone()),
                updated_at: Some(Utc::now()),
                ..Default::default()
            },
        )?;
        debug!(
            dossier = %dossier.id,
            items = documents.len(),
            "document checklist generated"
        );
        Ok(documents)
    }

    pub fn update_document(
        &self,
        id: &DossierId,
        item_id: &ItemId,
        patch: DocumentChecklistPatch,
    ) -> Result<Vec<DocumentChecklistItem>, DossierServiceError> {
        let documents = self.document_checklist(id)?;
        let item = documents
            .iter()
            .find(|item| &item.id == item_id)
            .ok_or_else(|| DossierServiceError::ItemNotFound(item_id.clone()))?;
        let entry = TimelineEntry::document_updated(item.document_type, &item.label, Utc::now());

        let updated = update_checklist_item(&documents, item_id, &patch);
        self.store_documents(id, documents, updated, entry)
    }

    pub fn link_document(
        &self,
        id: &DossierId,
        document_type: DocumentType,
        document_id: &str,
    ) -> Result<Vec<DocumentChecklistItem>, DossierServiceError> {
        let documents = self.document_checklist(id)?;
        let item = documents
            .iter()
            .find(|item| item.document_type == document_type)
            .ok_or(DossierServiceError::DocumentNotApplicable(document_type))?;
        let entry = TimelineEntry::document_updated(document_type, &item.label, Utc::now());

        let updated = link_document_to_item(&documents, document_type, document_id);
        self.store_documents(id, documents, updated, entry)
    }

    fn store_documents(
        &self,
        id: &DossierId,
        previous: Vec<DocumentChecklistItem>,
        documents: Vec<DocumentChecklistItem>,
        entry: TimelineEntry,
    ) -> Result<Vec<DocumentChecklistItem>, DossierServiceError> {
        let previous_updated_at = self.get(id)?.updated_at;
        let at = entry.at;
        self.repository.patch(
            id,
            DossierPatch {
                document_checklist: Some(documents.clone()),
                updated_at: Some(at),
                ..Default::default()
            },
        )?;
        self.record(
            id,
            entry,
            DossierPatch {
                document_checklist: Some(previous),
                updated_at: Some(previous_updated_at),
                ..Default::default()
            },
        )?;
        Ok(documents)
    }

    pub fn overview(&self, id: &DossierId) -> Result<DossierOverview, DossierServiceError> {
        let dossier = self.get(id)?;
        Ok(DossierOverview::from_dossier(&dossier))
    }
}

/// Error raised by the dossier service.
#[derive(Debug, thiserror::Error)]
pub enum DossierServiceError {
    #[error("company name must not be empty")]
    EmptyCompanyName,
    #[error("checklist item {0} not found")]
    ItemNotFound(ItemId),
    #[error("document type {0:?} does not apply to this dossier")]
    DocumentNotApplicable(DocumentType),
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    #[error("transition {from} -> {to} rejected: {reason}")]
    TransitionRejected {
        from: WorkflowStatus,
        to: WorkflowStatus,
        reason: String,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}
