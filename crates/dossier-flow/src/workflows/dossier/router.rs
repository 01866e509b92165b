use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::documents::{DocumentChecklistPatch, DocumentType};
use super::domain::{DossierId, ItemId};
use super::record::NewDossier;
use super::repository::{DossierRepository, RepositoryError, TimelineAppender};
use super::rules::rules;
use super::service::{DossierService, DossierServiceError};

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRequest {
    pub(crate) completed: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub(crate) status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkRequest {
    pub(crate) document_type: DocumentType,
    pub(crate) document_id: String,
}

type Shared<R, T> = State<Arc<DossierService<R, T>>>;

/// Router builder exposing the dossier workflow endpoints.
pub fn dossier_router<R, T>(service: Arc<DossierService<R, T>>) -> Router
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    Router::new()
        .route("/api/v1/workflow/rules", get(rules_handler))
        .route(
            "/api/v1/dossiers",
            get(list_handler::<R, T>).post(create_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id",
            get(get_handler::<R, T>).delete(delete_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/overview",
            get(overview_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/timeline",
            get(timeline_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/checklist/:item_id",
            post(toggle_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/status",
            get(suggestion_handler::<R, T>).post(change_status_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/status/check",
            post(check_status_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/documents",
            get(documents_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/documents/link",
            post(link_handler::<R, T>),
        )
        .route(
            "/api/v1/dossiers/:dossier_id/documents/:item_id",
            patch(update_document_handler::<R, T>),
        )
        .with_state(service)
}

pub(crate) async fn rules_handler() -> Response {
    let payload: Vec<_> = rules()
        .iter()
        .map(|rule| {
            json!({
                "status": rule.status,
                "label": rule.status.label(),
                "description": rule.description,
                "required": rule.required_labels().collect::<Vec<_>>(),
            })
        })
        .collect();
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn create_handler<R, T>(
    State(service): Shared<R, T>,
    Json(request): Json<NewDossier>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.create(request) {
        Ok(dossier) => (StatusCode::CREATED, Json(dossier)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, T>(State(service): Shared<R, T>) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.list() {
        Ok(dossiers) => (StatusCode::OK, Json(dossiers)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.get(&DossierId(dossier_id)) {
        Ok(dossier) => (StatusCode::OK, Json(dossier)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.delete(&DossierId(dossier_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn overview_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.overview(&DossierId(dossier_id)) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn timeline_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.timeline(&DossierId(dossier_id)) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_handler<R, T>(
    State(service): Shared<R, T>,
    Path((dossier_id, item_id)): Path<(String, String)>,
    Json(request): Json<ToggleRequest>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.toggle_task(&DossierId(dossier_id), &ItemId(item_id), request.completed) {
        Ok(update) => (StatusCode::OK, Json(update)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn suggestion_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.suggestion(&DossierId(dossier_id)) {
        Ok(suggestion) => (StatusCode::OK, Json(suggestion)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn check_status_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.check_transition(&DossierId(dossier_id), &request.status) {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn change_status_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.change_status_tag(&DossierId(dossier_id), &request.status) {
        Ok(change) => (StatusCode::OK, Json(change)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn documents_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.document_checklist(&DossierId(dossier_id)) {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_document_handler<R, T>(
    State(service): Shared<R, T>,
    Path((dossier_id, item_id)): Path<(String, String)>,
    Json(patch): Json<DocumentChecklistPatch>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.update_document(&DossierId(dossier_id), &ItemId(item_id), patch) {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn link_handler<R, T>(
    State(service): Shared<R, T>,
    Path(dossier_id): Path<String>,
    Json(request): Json<LinkRequest>,
) -> Response
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    match service.link_document(
        &DossierId(dossier_id),
        request.document_type,
        &request.document_id,
    ) {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: DossierServiceError) -> Response {
    let status = match &error {
        DossierServiceError::Repository(RepositoryError::NotFound)
        | DossierServiceError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        DossierServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DossierServiceError::EmptyCompanyName
        | DossierServiceError::UnknownStatus(_)
        | DossierServiceError::DocumentNotApplicable(_)
        | DossierServiceError::TransitionRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DossierServiceError::Repository(RepositoryError::Unavailable(_))
        | DossierServiceError::Timeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = match &error {
        DossierServiceError::TransitionRejected { from, to, reason } => json!({
            "error": error.to_string(),
            "from": from,
            "to": to,
            "reason": reason,
        }),
        _ => json!({ "error": error.to_string() }),
    };

    (status, Json(payload)).into_response()
}
