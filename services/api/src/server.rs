use crate::cli::ServeArgs;
use crate::infra::{load_registry, AppState};
use crate::routes::with_quote_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use shiprate::config::AppConfig;
use shiprate::error::AppError;
use shiprate::rates::QuoteState;
use shiprate::telemetry;
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
    if let Some(methods) = args.methods.take() {
        config.shipping.methods_path = Some(methods);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = load_registry(config.shipping.methods_path.as_deref())?;
    let quote_state = QuoteState {
        registry: Arc::new(registry),
        weight_unit: config.shipping.weight_unit,
    };

    let app = with_quote_routes(quote_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        weight_unit = %config.shipping.weight_unit,
        "shipping rate service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
