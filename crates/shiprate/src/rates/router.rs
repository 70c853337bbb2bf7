use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::context::CartContext;
use super::engine::{Evaluation, RateEngine, Rate};
use super::method::MethodSettings;
use super::package::{Package, WeightUnit};
use super::registry::MethodRegistry;

/// Shared handler state: configured methods plus the store weight unit.
#[derive(Debug, Clone)]
pub struct QuoteState {
    pub registry: Arc<MethodRegistry>,
    pub weight_unit: WeightUnit,
}

#[derive(Debug, Deserialize)]
pub struct AdHocQuoteRequest {
    pub method: MethodSettings,
    #[serde(default)]
    pub package: Package,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub instance_id: u32,
    pub rate: Option<Rate>,
    pub evaluation: Evaluation,
    pub context: CartContext,
    pub quoted_at: DateTime<Utc>,
}

impl QuoteResponse {
    fn build(engine: &RateEngine, context: CartContext) -> Self {
        let evaluation = engine.evaluate(&context);
        Self {
            instance_id: engine.config().instance_id,
            rate: evaluation.rate().cloned(),
            evaluation,
            context,
            quoted_at: Utc::now(),
        }
    }
}

/// Router builder exposing method listing and quoting endpoints.
pub fn quote_router(state: QuoteState) -> Router {
    Router::new()
        .route("/api/v1/shipping/methods", get(methods_handler))
        .route(
            "/api/v1/shipping/methods/:instance_id/quote",
            post(instance_quote_handler),
        )
        .route("/api/v1/shipping/quote", post(ad_hoc_quote_handler))
        .with_state(state)
}

pub(crate) async fn methods_handler(State(state): State<QuoteState>) -> Response {
    let methods = state.registry.summaries();
    (StatusCode::OK, Json(json!({ "methods": methods }))).into_response()
}

pub(crate) async fn instance_quote_handler(
    State(state): State<QuoteState>,
    Path(instance_id): Path<u32>,
    Json(package): Json<Package>,
) -> Response {
    let Some(engine) = state.registry.get(instance_id) else {
        let payload = json!({
            "error": "unknown shipping method instance",
            "instance_id": instance_id,
        });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    let context = CartContext::from_package(&package, state.weight_unit);
    let response = QuoteResponse::build(&engine, context);
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn ad_hoc_quote_handler(
    State(state): State<QuoteState>,
    Json(request): Json<AdHocQuoteRequest>,
) -> Response {
    let engine = RateEngine::from_settings(&request.method);
    let context = CartContext::from_package(&request.package, state.weight_unit);
    let response = QuoteResponse::build(&engine, context);
    (StatusCode::OK, Json(response)).into_response()
}
