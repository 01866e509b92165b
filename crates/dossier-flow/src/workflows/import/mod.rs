//! Apply checklist progress exported from a practice-management tool.

mod mapping;
mod normalizer;
mod parser;

use crate::workflows::dossier::{ChecklistItem, ChecklistTask};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ChecklistImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ChecklistImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecklistImportError::Io(err) => write!(f, "failed to read checklist export: {}", err),
            ChecklistImportError::Csv(err) => write!(f, "invalid checklist CSV data: {}", err),
        }
    }
}

impl std::error::Error for ChecklistImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChecklistImportError::Io(err) => Some(err),
            ChecklistImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ChecklistImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ChecklistImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Checklist after the export has been applied.
#[derive(Debug, Clone)]
pub struct ChecklistImport {
    pub checklist: Vec<ChecklistItem>,
    pub applied: Vec<ChecklistTask>,
    pub unmatched: Vec<String>,
}

pub struct ChecklistCsvImporter;

impl ChecklistCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        checklist: &[ChecklistItem],
    ) -> Result<ChecklistImport, ChecklistImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, checklist)
    }

    /// Rows with a completion date mark the matching task complete. The first
    /// row for a task wins; unknown rows are reported, not applied.
    pub fn from_reader<R: Read>(
        reader: R,
        checklist: &[ChecklistItem],
    ) -> Result<ChecklistImport, ChecklistImportError> {
        let mut checklist = checklist.to_vec();
        let mut seen: HashSet<ChecklistTask> = HashSet::new();
        let mut applied = Vec::new();
        let mut unmatched = Vec::new();

        for record in parser::parse_records(reader)? {
            let Some(task) = mapping::task_for_normalized(&record.normalized_label) else {
                unmatched.push(record.raw_label);
                continue;
            };
            // The first dated row for a task wins.
            if seen.contains(&task) {
                continue;
            }

            let completed_at = record.completed_at;
            let item = checklist
                .iter_mut()
                .find(|item| item.task() == Some(task));
            match (item, completed_at) {
                (Some(item), Some(at)) => {
                    item.set_completed(true, at);
                    seen.insert(task);
                    applied.push(task);
                }
                (Some(_), None) => {}
                (None, _) => unmatched.push(record.raw_label),
            }
        }

        Ok(ChecklistImport {
            checklist,
            applied,
            unmatched,
        })
    }
}
