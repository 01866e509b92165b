use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::DossierConfig;
use crate::workflows::dossier::domain::{ChecklistTask, DossierId, ItemId, LegalForm};
use crate::workflows::dossier::record::{Dossier, DossierPatch, NewDossier, TimelineEntry};
use crate::workflows::dossier::repository::{
    DossierRepository, RepositoryError, TimelineAppender, TimelineError,
};
use crate::workflows::dossier::{dossier_router, DossierService};

pub(super) fn new_dossier(form: LegalForm) -> NewDossier {
    NewDossier {
        company_name: "Atelier Lumière".to_string(),
        legal_form: form,
    }
}

pub(super) fn config() -> DossierConfig {
    DossierConfig {
        reference_prefix: "TEST".to_string(),
    }
}

pub(super) fn build_service() -> (
    DossierService<MemoryRepository, MemoryTimeline>,
    Arc<MemoryRepository>,
    Arc<MemoryTimeline>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let timeline = Arc::new(MemoryTimeline::default());
    let service = DossierService::new(repository.clone(), timeline.clone(), config());
    (service, repository, timeline)
}

pub(super) fn item_id(dossier: &Dossier, task: ChecklistTask) -> ItemId {
    dossier
        .checklist
        .iter()
        .find(|item| item.task() == Some(task))
        .map(|item| item.id.clone())
        .expect("task present in checklist")
}

/// Completes `tasks` one by one through the service and returns the stored dossier.
pub(super) fn complete_tasks(
    service: &DossierService<MemoryRepository, MemoryTimeline>,
    dossier: &Dossier,
    tasks: &[ChecklistTask],
) -> Dossier {
    let mut current = dossier.clone();
    for task in tasks {
        current = service
            .toggle_task(&dossier.id, &item_id(dossier, *task), true)
            .expect("toggle succeeds")
            .dossier;
    }
    current
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<DossierId, Dossier>>>,
}

impl DossierRepository for MemoryRepository {
    fn insert(&self, dossier: Dossier) -> Result<Dossier, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&dossier.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(dossier.id.clone(), dossier.clone());
        Ok(dossier)
    }

    fn fetch(&self, id: &DossierId) -> Result<Option<Dossier>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Dossier>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut dossiers: Vec<_> = guard.values().cloned().collect();
        dossiers.sort_by(|a, b| a.reference.cmp(&b.reference));
        Ok(dossiers)
    }

    fn patch(&self, id: &DossierId, patch: DossierPatch) -> Result<Dossier, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let dossier = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        patch.apply(dossier);
        Ok(dossier.clone())
    }

    fn remove(&self, id: &DossierId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryTimeline {
    entries: Arc<Mutex<HashMap<DossierId, Vec<TimelineEntry>>>>,
}

impl MemoryTimeline {
    pub(super) fn count(&self, id: &DossierId) -> usize {
        self.entries
            .lock()
            .expect("timeline mutex poisoned")
            .get(id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl TimelineAppender for MemoryTimeline {
    fn append(&self, dossier_id: &DossierId, entry: TimelineEntry) -> Result<(), TimelineError> {
        self.entries
            .lock()
            .expect("timeline mutex poisoned")
            .entry(dossier_id.clone())
            .or_default()
            .push(entry);
        Ok(())
    }

    fn entries(&self, dossier_id: &DossierId) -> Result<Vec<TimelineEntry>, TimelineError> {
        let guard = self.entries.lock().expect("timeline mutex poisoned");
        Ok(guard.get(dossier_id).cloned().unwrap_or_default())
    }
}

/// Timeline that refuses appends once `go_offline` has been called.
#[derive(Default, Clone)]
pub(super) struct FlakyTimeline {
    pub(super) inner: MemoryTimeline,
    offline: Arc<AtomicBool>,
}

impl FlakyTimeline {
    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

impl TimelineAppender for FlakyTimeline {
    fn append(&self, dossier_id: &DossierId, entry: TimelineEntry) -> Result<(), TimelineError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TimelineError::Unavailable("journal offline".to_string()));
        }
        self.inner.append(dossier_id, entry)
    }

    fn entries(&self, dossier_id: &DossierId) -> Result<Vec<TimelineEntry>, TimelineError> {
        self.inner.entries(dossier_id)
    }
}

pub(super) fn build_flaky_service() -> (
    DossierService<MemoryRepository, FlakyTimeline>,
    Arc<MemoryRepository>,
    Arc<FlakyTimeline>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let timeline = Arc::new(FlakyTimeline::default());
    let service = DossierService::new(repository.clone(), timeline.clone(), config());
    (service, repository, timeline)
}

pub(super) struct UnavailableRepository;

impl DossierRepository for UnavailableRepository {
    fn insert(&self, _dossier: Dossier) -> Result<Dossier, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &DossierId) -> Result<Option<Dossier>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Dossier>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn patch(&self, _id: &DossierId, _patch: DossierPatch) -> Result<Dossier, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &DossierId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: DossierService<MemoryRepository, MemoryTimeline>,
) -> axum::Router {
    dossier_router(Arc::new(service))
}
