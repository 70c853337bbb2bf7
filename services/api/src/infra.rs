use metrics_exporter_prometheus::PrometheusHandle;
use shiprate::error::AppError;
use shiprate::rates::{MethodRegistry, WeightUnit};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the configured methods, or an empty registry when no file is set.
pub(crate) fn load_registry(path: Option<&Path>) -> Result<MethodRegistry, AppError> {
    match path {
        Some(path) => Ok(MethodRegistry::from_path(path)?),
        None => {
            warn!("no shipping methods file configured; every quote will report an unknown method");
            Ok(MethodRegistry::default())
        }
    }
}

pub(crate) fn parse_weight_unit(raw: &str) -> Result<WeightUnit, String> {
    raw.parse::<WeightUnit>().map_err(|err| err.to_string())
}
