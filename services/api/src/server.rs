use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredStore};
use crate::routes::with_hr_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use campus_hr::config::AppConfig;
use campus_hr::error::AppError;
use campus_hr::telemetry;
use campus_hr::workflows::approvals::HrRequestService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// CLI flags take precedence over the environment.
fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.data_path {
        config.storage.data_path = Some(path);
    }
}

/// Hydrate the request service from the configured store and mount every route.
/// Readiness stays false until the caller flips it.
fn build_app(config: &AppConfig, state: AppState) -> Result<Router, AppError> {
    let store = ConfiguredStore::from_path(config.storage.data_path.clone());
    info!(store = %store.describe(), "opening hr records");
    let service = HrRequestService::new(Arc::new(store), config.leave.policy())?;

    Ok(with_hr_routes(Arc::new(service)).layer(Extension(state)))
}

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args);
    telemetry::init(&config.telemetry)?;

    let (metrics_layer, metrics_handle) = PrometheusMetricLayer::pair();
    let ready = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: Arc::clone(&ready),
        metrics: Arc::new(metrics_handle),
    };
    let app = build_app(&config, state)?.layer(metrics_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ready.store(true, Ordering::Release);
    info!(
        environment = ?config.environment,
        %addr,
        enforce_maternity_rules = config.leave.enforce_maternity_rules,
        probation_months = config.leave.probation_months,
        "campus hr service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
