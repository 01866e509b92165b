use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDossierRepository, InMemoryTimeline};
use crate::routes::with_dossier_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dossier_flow::config::AppConfig;
use dossier_flow::error::AppError;
use dossier_flow::telemetry;
use dossier_flow::workflows::dossier::DossierService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryDossierRepository::default());
    let timeline = Arc::new(InMemoryTimeline::default());
    let dossier_service = Arc::new(DossierService::new(
        repository,
        timeline,
        config.dossiers.clone(),
    ));

    let app = with_dossier_routes(dossier_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        reference_prefix = %config.dossiers.reference_prefix,
        "dossier workflow service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
