use dossier_flow::workflows::dossier::{
    Dossier, DossierId, DossierPatch, DossierRepository, LegalForm, RepositoryError,
    TimelineAppender, TimelineEntry, TimelineError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDossierRepository {
    records: Arc<Mutex<HashMap<DossierId, Dossier>>>,
}

impl DossierRepository for InMemoryDossierRepository {
    fn insert(&self, dossier: Dossier) -> Result<Dossier, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&dossier.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(dossier.id.clone(), dossier.clone());
        Ok(dossier)
    }

    fn fetch(&self, id: &DossierId) -> Result<Option<Dossier>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Dossier>, RepositoryError> {
        let mut dossiers: Vec<_> = self.lock()?.values().cloned().collect();
        dossiers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(dossiers)
    }

    fn patch(&self, id: &DossierId, patch: DossierPatch) -> Result<Dossier, RepositoryError> {
        let mut guard = self.lock()?;
        let dossier = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        patch.apply(dossier);
        Ok(dossier.clone())
    }

    fn remove(&self, id: &DossierId) -> Result<(), RepositoryError> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl InMemoryDossierRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<DossierId, Dossier>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTimeline {
    entries: Arc<Mutex<HashMap<DossierId, Vec<TimelineEntry>>>>,
}

impl TimelineAppender for InMemoryTimeline {
    fn append(&self, dossier_id: &DossierId, entry: TimelineEntry) -> Result<(), TimelineError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| TimelineError::Unavailable("timeline mutex poisoned".to_string()))?;
        guard.entry(dossier_id.clone()).or_default().push(entry);
        Ok(())
    }

    fn entries(&self, dossier_id: &DossierId) -> Result<Vec<TimelineEntry>, TimelineError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| TimelineError::Unavailable("timeline mutex poisoned".to_string()))?;
        Ok(guard.get(dossier_id).cloned().unwrap_or_default())
    }
}

pub(crate) fn parse_legal_form(raw: &str) -> Result<LegalForm, String> {
    match LegalForm::from_tag(raw) {
        LegalForm::Other if !raw.trim().eq_ignore_ascii_case("AUTRE") => Err(format!(
            "unknown legal form '{raw}' (expected SASU, SAS, EURL, SARL, SCI or AUTRE)"
        )),
        form => Ok(form),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_legal_form_accepts_known_tags_only() {
        assert_eq!(parse_legal_form("sasu"), Ok(LegalForm::Sasu));
        assert_eq!(parse_legal_form("AUTRE"), Ok(LegalForm::Other));
        assert!(parse_legal_form("GIE").is_err());
    }
}
