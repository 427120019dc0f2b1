use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRosterRepository};
use crate::routes::with_crew_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use crew_roster::config::AppConfig;
use crew_roster::error::AppError;
use crew_roster::telemetry;
use crew_roster::workflows::crew::{CrewAssignmentService, EngineOptions};
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryRosterRepository::default());
    let crew_service = Arc::new(CrewAssignmentService::new(
        repository,
        EngineOptions::from(&config.roster),
    ));

    let app = with_crew_routes(crew_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        window_weeks = config.roster.rotation_window_weeks,
        "crew roster service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
