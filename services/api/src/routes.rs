use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use dossier_flow::error::AppError;
use dossier_flow::workflows::dossier::{
    dossier_router, is_valid_transition, next_status, stage_progress, ChecklistBlueprint,
    DossierRepository, DossierService, LegalForm, StageProgressEntry, StatusSuggestion,
    TimelineAppender, TransitionCheck, WorkflowStatus,
};
use dossier_flow::workflows::import::ChecklistCsvImporter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Read;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowReportRequest {
    pub(crate) legal_form: LegalForm,
    #[serde(default)]
    pub(crate) status: Option<WorkflowStatus>,
    #[serde(default)]
    pub(crate) checklist_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WorkflowReport {
    pub(crate) legal_form: LegalForm,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) data_source: ReportDataSource,
    pub(crate) suggestion: StatusSuggestion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) next_status: Option<WorkflowStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) next_transition: Option<TransitionCheck>,
    pub(crate) stages: Vec<StageProgressEntry>,
    pub(crate) applied: Vec<String>,
    pub(crate) unmatched: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReportDataSource {
    Import,
    Blank,
}

pub(crate) fn with_dossier_routes<R, T>(service: Arc<DossierService<R, T>>) -> axum::Router
where
    R: DossierRepository + 'static,
    T: TimelineAppender + 'static,
{
    dossier_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/workflow/report",
            axum::routing::post(workflow_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn workflow_report_endpoint(
    Json(payload): Json<WorkflowReportRequest>,
) -> Result<Json<WorkflowReport>, AppError> {
    let WorkflowReportRequest {
        legal_form,
        status,
        checklist_csv,
    } = payload;

    let export = checklist_csv.map(|csv| std::io::Cursor::new(csv.into_bytes()));
    let report = build_workflow_report(legal_form, status.unwrap_or(WorkflowStatus::New), export)?;
    Ok(Json(report))
}

/// Stage report for a blank checklist, or one hydrated from a CSV export.
pub(crate) fn build_workflow_report<E: Read>(
    legal_form: LegalForm,
    status: WorkflowStatus,
    export: Option<E>,
) -> Result<WorkflowReport, AppError> {
    let blank = ChecklistBlueprint::company_formation().instantiate(legal_form);

    let (checklist, data_source, applied, unmatched) = match export {
        Some(reader) => {
            let import = ChecklistCsvImporter::from_reader(reader, &blank)?;
            let applied = import
                .applied
                .iter()
                .map(|task| task.label().to_string())
                .collect();
            (import.checklist, ReportDataSource::Import, applied, import.unmatched)
        }
        None => (blank, ReportDataSource::Blank, Vec::new(), Vec::new()),
    };

    let next = next_status(status);
    Ok(WorkflowReport {
        legal_form,
        generated_at: Utc::now(),
        data_source,
        suggestion: StatusSuggestion::compute(status, &checklist),
        next_status: next,
        next_transition: next.map(|target| is_valid_transition(status, target, &checklist)),
        stages: stage_progress(&checklist),
        applied,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn workflow_report_endpoint_returns_blank_progress() {
        let request = WorkflowReportRequest {
            legal_form: LegalForm::Sasu,
            status: None,
            checklist_csv: None,
        };

        let Json(body) = workflow_report_endpoint(Json(request))
            .await
            .expect("report builds");

        assert_eq!(body.data_source, ReportDataSource::Blank);
        assert_eq!(body.suggestion.suggested, WorkflowStatus::New);
        assert_eq!(body.next_status, Some(WorkflowStatus::QuoteSent));
        assert_eq!(body.stages.len(), 10);
        let next = body.next_transition.expect("next transition checked");
        assert!(!next.valid);
    }

    #[tokio::test]
    async fn workflow_report_endpoint_applies_csv_exports() {
        let request = WorkflowReportRequest {
            legal_form: LegalForm::Sarl,
            status: Some(WorkflowStatus::New),
            checklist_csv: Some(
                "Tâche,Terminée le\nInformations société collectées,2025-09-24\nInfos dirigeant,24/09/2025\nVisite du local,2025-09-25\n"
                    .to_string(),
            ),
        };

        let Json(body) = workflow_report_endpoint(Json(request))
            .await
            .expect("report builds");

        assert_eq!(body.data_source, ReportDataSource::Import);
        assert_eq!(body.suggestion.suggested, WorkflowStatus::QuoteSent);
        assert!(body.suggestion.differs);
        assert_eq!(body.applied.len(), 2);
        assert_eq!(body.unmatched, vec!["Visite du local".to_string()]);
        assert_eq!(body.next_transition.map(|check| check.valid), Some(true));
    }

    #[tokio::test]
    async fn readiness_endpoint_reports_initializing_until_bound() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(handle),
        };

        let response = readiness_endpoint(Extension(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
