mod catalog;
mod checklist;

pub use catalog::{requirements_for, DocumentRequirement, DocumentType, DOCUMENT_CATALOG};
pub use checklist::{
    checklist_progress, generate_document_checklist, link_document_to_item,
    link_document_to_item_at, missing_required_documents, update_checklist_item,
    update_checklist_item_at, ChecklistProgress, DocumentChecklistItem, DocumentChecklistPatch,
    RequiredProgress,
};
