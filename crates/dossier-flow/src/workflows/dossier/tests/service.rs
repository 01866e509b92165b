use super::common::*;
use crate::workflows::dossier::documents::{DocumentChecklistPatch, DocumentType};
use crate::workflows::dossier::domain::{ChecklistTask, DossierId, ItemId, LegalForm, WorkflowStatus};
use crate::workflows::dossier::record::TimelineEvent;
use crate::workflows::dossier::repository::{DossierRepository, RepositoryError, TimelineError};
use crate::workflows::dossier::{DossierService, DossierServiceError, UNKNOWN_STATUS_REASON};
use std::sync::Arc;

#[test]
fn create_rejects_blank_company_names() {
    let (service, _, _) = build_service();
    let mut request = new_dossier(LegalForm::Sasu);
    request.company_name = "   ".to_string();

    match service.create(request) {
        Err(DossierServiceError::EmptyCompanyName) => {}
        other => panic!("expected empty company name error, got {other:?}"),
    }
}

#[test]
fn create_opens_a_new_dossier_with_checklist_and_timeline() {
    let (service, repository, timeline) = build_service();

    let first = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");
    let second = service
        .create(new_dossier(LegalForm::Sarl))
        .expect("create succeeds");

    assert_eq!(first.reference, "TEST-000001");
    assert_eq!(second.reference, "TEST-000002");
    assert_eq!(first.status, WorkflowStatus::New);
    assert!(first.document_checklist.is_none());
    for task in ChecklistTask::ordered() {
        assert!(
            first.checklist.iter().any(|item| item.task() == Some(task)),
            "missing {task:?}"
        );
    }
    assert!(first.checklist.iter().all(|item| !item.completed));
    assert_eq!(timeline.count(&first.id), 1);
    assert!(repository
        .fetch(&first.id)
        .expect("fetch succeeds")
        .is_some());
}

#[test]
fn toggling_tasks_recomputes_the_suggestion() {
    let (service, _, timeline) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sas))
        .expect("create succeeds");

    let update = service
        .toggle_task(
            &dossier.id,
            &item_id(&dossier, ChecklistTask::CompanyInformationCollected),
            true,
        )
        .expect("toggle succeeds");
    assert_eq!(update.suggestion.suggested, WorkflowStatus::New);
    assert_eq!(
        update.diff.completed,
        vec![ChecklistTask::CompanyInformationCollected.label().to_string()]
    );

    let update = service
        .toggle_task(
            &dossier.id,
            &item_id(&dossier, ChecklistTask::ManagerInformationCollected),
            true,
        )
        .expect("toggle succeeds");
    assert_eq!(update.suggestion.current, WorkflowStatus::New);
    assert_eq!(update.suggestion.suggested, WorkflowStatus::QuoteSent);
    assert!(update.suggestion.differs);
    assert_eq!(update.dossier.status, WorkflowStatus::New);
    assert_eq!(timeline.count(&dossier.id), 3);
}

#[test]
fn toggling_to_the_same_value_records_nothing() {
    let (service, _, timeline) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Eurl))
        .expect("create succeeds");
    let item = item_id(&dossier, ChecklistTask::SignedQuoteReceived);

    let update = service
        .toggle_task(&dossier.id, &item, false)
        .expect("toggle succeeds");

    assert!(update.diff.is_empty());
    assert_eq!(timeline.count(&dossier.id), 1);
}

#[test]
fn reopening_a_task_clears_its_completion_stamp() {
    let (service, _, _) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Eurl))
        .expect("create succeeds");
    let item = item_id(&dossier, ChecklistTask::SignedQuoteReceived);

    service
        .toggle_task(&dossier.id, &item, true)
        .expect("toggle succeeds");
    let update = service
        .toggle_task(&dossier.id, &item, false)
        .expect("toggle succeeds");

    let stored = update
        .dossier
        .checklist
        .iter()
        .find(|candidate| candidate.id == item)
        .expect("item present");
    assert!(!stored.completed);
    assert!(stored.completed_at.is_none());
    assert_eq!(
        update.diff.reopened,
        vec![ChecklistTask::SignedQuoteReceived.label().to_string()]
    );
}

#[test]
fn toggling_unknown_items_is_not_found() {
    let (service, _, _) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sci))
        .expect("create succeeds");

    match service.toggle_task(&dossier.id, &ItemId("missing".to_string()), true) {
        Err(DossierServiceError::ItemNotFound(id)) => assert_eq!(id.0, "missing"),
        other => panic!("expected item not found, got {other:?}"),
    }
}

#[test]
fn change_status_rejects_forward_moves_with_missing_tasks() {
    let (service, repository, timeline) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");

    match service.change_status(&dossier.id, WorkflowStatus::DraftStatutes) {
        Err(DossierServiceError::TransitionRejected { from, to, reason }) => {
            assert_eq!(from, WorkflowStatus::New);
            assert_eq!(to, WorkflowStatus::DraftStatutes);
            assert_eq!(
                reason,
                "Tâches manquantes : Informations société collectées, \
Informations gérant/président collectées, Devis signé reçu"
            );
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    match service.change_status(&dossier.id, WorkflowStatus::AwaitingDeposit) {
        Err(DossierServiceError::TransitionRejected { reason, .. }) => {
            assert!(reason.ends_with("(+2 autre(s))"), "{reason}");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    let stored = repository
        .fetch(&dossier.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, WorkflowStatus::New);
    assert_eq!(timeline.count(&dossier.id), 1);
}

#[test]
fn change_status_commits_once_requirements_are_met() {
    let (service, _, _) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");
    complete_tasks(
        &service,
        &dossier,
        &[
            ChecklistTask::CompanyInformationCollected,
            ChecklistTask::ManagerInformationCollected,
            ChecklistTask::SignedQuoteReceived,
        ],
    );

    let change = service
        .change_status(&dossier.id, WorkflowStatus::DraftStatutes)
        .expect("transition accepted");
    assert_eq!(change.from, WorkflowStatus::New);
    assert_eq!(change.to, WorkflowStatus::DraftStatutes);
    assert_eq!(change.dossier.status, WorkflowStatus::DraftStatutes);

    let entries = service.timeline(&dossier.id).expect("timeline");
    let last = entries.last().expect("timeline entry");
    assert_eq!(
        last.event,
        TimelineEvent::StatusChanged {
            from: WorkflowStatus::New,
            to: WorkflowStatus::DraftStatutes,
        }
    );
}

#[test]
fn closing_is_allowed_from_any_stage_and_moving_back_is_free() {
    let (service, _, timeline) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Other))
        .expect("create succeeds");

    let closed = service
        .change_status(&dossier.id, WorkflowStatus::Closed)
        .expect("closing accepted");
    assert_eq!(closed.dossier.status, WorkflowStatus::Closed);

    let reopened = service
        .change_status(&dossier.id, WorkflowStatus::QuoteSent)
        .expect("backward move accepted");
    assert_eq!(reopened.dossier.status, WorkflowStatus::QuoteSent);
    assert_eq!(timeline.count(&dossier.id), 3);
}

#[test]
fn staying_on_the_current_status_changes_nothing() {
    let (service, _, timeline) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sas))
        .expect("create succeeds");

    let change = service
        .change_status(&dossier.id, WorkflowStatus::New)
        .expect("same status accepted");

    assert_eq!(change.from, change.to);
    assert_eq!(timeline.count(&dossier.id), 1);
}

#[test]
fn staying_on_the_current_status_ignores_reopened_tasks() {
    let (service, _, timeline) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");
    complete_tasks(
        &service,
        &dossier,
        &[
            ChecklistTask::CompanyInformationCollected,
            ChecklistTask::ManagerInformationCollected,
        ],
    );
    service
        .change_status(&dossier.id, WorkflowStatus::QuoteSent)
        .expect("transition accepted");
    service
        .toggle_task(
            &dossier.id,
            &item_id(&dossier, ChecklistTask::ManagerInformationCollected),
            false,
        )
        .expect("toggle succeeds");
    let recorded = timeline.count(&dossier.id);

    let change = service
        .change_status(&dossier.id, WorkflowStatus::QuoteSent)
        .expect("same status accepted");

    assert_eq!(change.from, WorkflowStatus::QuoteSent);
    assert_eq!(change.to, WorkflowStatus::QuoteSent);
    assert_eq!(change.dossier.status, WorkflowStatus::QuoteSent);
    assert_eq!(timeline.count(&dossier.id), recorded);
}

#[test]
fn unknown_status_tags_are_reported() {
    let (service, _, _) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sas))
        .expect("create succeeds");

    match service.change_status_tag(&dossier.id, "ARCHIVE") {
        Err(DossierServiceError::UnknownStatus(tag)) => assert_eq!(tag, "ARCHIVE"),
        other => panic!("expected unknown status, got {other:?}"),
    }

    let check = service
        .check_transition(&dossier.id, "ARCHIVE")
        .expect("check runs");
    assert!(!check.valid);
    assert_eq!(check.reason.as_deref(), Some(UNKNOWN_STATUS_REASON));

    let check = service
        .check_transition(&dossier.id, "CLOTURE")
        .expect("check runs");
    assert!(check.valid);
}

#[test]
fn document_checklist_is_generated_once_and_persisted() {
    let (service, repository, _) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");

    let first = service
        .document_checklist(&dossier.id)
        .expect("documents generated");
    let second = service
        .document_checklist(&dossier.id)
        .expect("documents loaded");

    assert_eq!(first, second);
    assert!(first
        .iter()
        .any(|item| item.document_type == DocumentType::ListeSouscripteurs));
    assert!(first
        .iter()
        .all(|item| item.document_type != DocumentType::ActeNominationGerant));
    let stored = repository
        .fetch(&dossier.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.document_checklist, Some(first));
}

#[test]
fn uncompleting_a_document_keeps_its_completion_stamp() {
    let (service, _, _) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sarl))
        .expect("create succeeds");
    let documents = service
        .document_checklist(&dossier.id)
        .expect("documents generated");
    let target = documents[0].id.clone();

    let completed = service
        .update_document(
            &dossier.id,
            &target,
            DocumentChecklistPatch {
                completed: Some(true),
                completed_by: Some("clerc".to_string()),
                ..Default::default()
            },
        )
        .expect("update succeeds");
    let stamp = completed[0].completed_at.expect("stamped on completion");

    let reopened = service
        .update_document(
            &dossier.id,
            &target,
            DocumentChecklistPatch {
                completed: Some(false),
                notes: Some("copie illisible".to_string()),
                ..Default::default()
            },
        )
        .expect("update succeeds");

    assert!(!reopened[0].completed);
    assert_eq!(reopened[0].completed_at, Some(stamp));
    assert_eq!(reopened[0].completed_by.as_deref(), Some("clerc"));
    assert_eq!(reopened[0].notes.as_deref(), Some("copie illisible"));
}

#[test]
fn linking_requires_an_applicable_document() {
    let (service, _, timeline) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");

    match service.link_document(&dossier.id, DocumentType::ActeNominationGerant, "doc-1") {
        Err(DossierServiceError::DocumentNotApplicable(kind)) => {
            assert_eq!(kind, DocumentType::ActeNominationGerant)
        }
        other => panic!("expected not applicable, got {other:?}"),
    }

    let documents = service
        .link_document(&dossier.id, DocumentType::StatutsSignes, "doc-42")
        .expect("link succeeds");
    let linked = documents
        .iter()
        .find(|item| item.document_type == DocumentType::StatutsSignes)
        .expect("item present");
    assert!(linked.completed);
    assert!(linked.completed_at.is_some());
    assert_eq!(linked.linked_document_id.as_deref(), Some("doc-42"));
    assert_eq!(timeline.count(&dossier.id), 2);
}

#[test]
fn overview_reflects_progress() {
    let (service, _, _) = build_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sas))
        .expect("create succeeds");
    complete_tasks(
        &service,
        &dossier,
        &[
            ChecklistTask::CompanyInformationCollected,
            ChecklistTask::ManagerInformationCollected,
        ],
    );

    let overview = service.overview(&dossier.id).expect("overview");
    assert_eq!(overview.suggested_status, WorkflowStatus::QuoteSent);
    assert_eq!(overview.tasks.completed, 2);
    let quote = overview
        .stages
        .iter()
        .find(|stage| stage.status == WorkflowStatus::QuoteSent)
        .expect("stage present");
    assert_eq!(quote.percentage, 100);
}

#[test]
fn get_and_delete_propagate_not_found() {
    let (service, _, _) = build_service();
    let missing = DossierId("missing".to_string());

    assert!(matches!(
        service.get(&missing),
        Err(DossierServiceError::Repository(RepositoryError::NotFound))
    ));
    assert!(matches!(
        service.delete(&missing),
        Err(DossierServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn repository_outages_surface_as_repository_errors() {
    let service = DossierService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryTimeline::default()),
        config(),
    );

    match service.create(new_dossier(LegalForm::Sasu)) {
        Err(DossierServiceError::Repository(RepositoryError::Unavailable(message))) => {
            assert_eq!(message, "database offline")
        }
        other => panic!("expected unavailable repository, got {other:?}"),
    }
}

#[test]
fn references_continue_after_the_stored_sequence() {
    let (service, repository, _) = build_service();
    service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");
    service
        .create(new_dossier(LegalForm::Sarl))
        .expect("create succeeds");

    let restarted = DossierService::new(
        repository.clone(),
        Arc::new(MemoryTimeline::default()),
        config(),
    );
    let next = restarted
        .create(new_dossier(LegalForm::Sas))
        .expect("create succeeds");

    assert_eq!(next.reference, "TEST-000003");
}

fn assert_timeline_offline<V: std::fmt::Debug>(result: Result<V, DossierServiceError>) {
    match result {
        Err(DossierServiceError::Timeline(TimelineError::Unavailable(message))) => {
            assert_eq!(message, "journal offline")
        }
        other => panic!("expected timeline failure, got {other:?}"),
    }
}

#[test]
fn status_change_is_undone_when_the_timeline_fails() {
    let (service, repository, timeline) = build_flaky_service();
    let dossier = service
        .create(new_dossier(LegalForm::Other))
        .expect("create succeeds");
    timeline.go_offline();

    assert_timeline_offline(service.change_status(&dossier.id, WorkflowStatus::Closed));
    assert_timeline_offline(service.change_status(&dossier.id, WorkflowStatus::Closed));

    let stored = repository
        .fetch(&dossier.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, WorkflowStatus::New);
    assert_eq!(stored.updated_at, dossier.updated_at);
    assert_eq!(timeline.inner.count(&dossier.id), 1);
}

#[test]
fn checklist_toggle_is_undone_when_the_timeline_fails() {
    let (service, repository, timeline) = build_flaky_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");
    timeline.go_offline();

    let task = item_id(&dossier, ChecklistTask::CompanyInformationCollected);
    assert_timeline_offline(service.toggle_task(&dossier.id, &task, true));

    let stored = repository
        .fetch(&dossier.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.checklist, dossier.checklist);
    assert_eq!(timeline.inner.count(&dossier.id), 1);
}

#[test]
fn document_update_is_undone_when_the_timeline_fails() {
    let (service, repository, timeline) = build_flaky_service();
    let dossier = service
        .create(new_dossier(LegalForm::Sasu))
        .expect("create succeeds");
    let documents = service
        .document_checklist(&dossier.id)
        .expect("documents generated");
    timeline.go_offline();

    assert_timeline_offline(service.link_document(
        &dossier.id,
        DocumentType::ListeSouscripteurs,
        "doc-42",
    ));

    let stored = repository
        .fetch(&dossier.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.document_checklist, Some(documents));
}

#[test]
fn create_leaves_nothing_behind_when_the_timeline_fails() {
    let (service, repository, timeline) = build_flaky_service();
    timeline.go_offline();

    assert_timeline_offline(service.create(new_dossier(LegalForm::Sasu)));
    assert!(repository.list().expect("list succeeds").is_empty());
}
