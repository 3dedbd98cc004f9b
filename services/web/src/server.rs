use crate::cli::ServeArgs;
use crate::infra::{AppState, FormState};
use crate::routes::form_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use topsis_form::config::AppConfig;
use topsis_form::error::AppError;
use topsis_form::submission::TopsisApiClient;
use topsis_form::telemetry::{self, LogTarget};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogTarget::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backend = Arc::new(TopsisApiClient::new(&config.backend)?);
    let scoring_endpoint = backend.endpoint().clone();
    let form_state = FormState::new(backend, config.footer.clone());

    let app = form_router(form_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = %scoring_endpoint,
        email_api = config.email.is_some(),
        "topsis form service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
