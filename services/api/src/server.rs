use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::reimbursement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use reimbursement::config::AppConfig;
use reimbursement::error::AppError;
use reimbursement::{telemetry, ReimbursementEngine};
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
    if let Some(policy) = args.policy.take() {
        config.estimation.policy_path = Some(policy);
    }

    telemetry::init(&config.telemetry)?;

    let policy = config.estimation.policy()?;
    info!(
        source = config
            .estimation
            .policy_path
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "standard".to_string()),
        "loaded reimbursement policy"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(ReimbursementEngine::new(policy)),
    };

    let app = reimbursement_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "reimbursement service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
