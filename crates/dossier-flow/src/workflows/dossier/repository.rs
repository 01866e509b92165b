use super::domain::DossierId;
use super::record::{Dossier, DossierPatch, TimelineEntry};

/// Case store abstraction so the service module can be exercised in isolation.
pub trait DossierRepository: Send + Sync {
    fn insert(&self, dossier: Dossier) -> Result<Dossier, RepositoryError>;
    fn fetch(&self, id: &DossierId) -> Result<Option<Dossier>, RepositoryError>;
    fn list(&self) -> Result<Vec<Dossier>, RepositoryError>;
    /// Apply `patch` and return the stored result.
    fn patch(&self, id: &DossierId, patch: DossierPatch) -> Result<Dossier, RepositoryError>;
    fn remove(&self, id: &DossierId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// History sink. Entries are append-only.
pub trait TimelineAppender: Send + Sync {
    fn append(&self, dossier_id: &DossierId, entry: TimelineEntry) -> Result<(), TimelineError>;
    fn entries(&self, dossier_id: &DossierId) -> Result<Vec<TimelineEntry>, TimelineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("timeline unavailable: {0}")]
    Unavailable(String),
}
