use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::engine::{EngineConfig, ReimbursementEngine, TripFeatures, TripInput, TripModel};

pub(super) const GENERAL_STUB: f64 = 111.11;
pub(super) const OUTLIER_STUB: f64 = 999.99;

pub(super) fn constant_model(value: f64) -> Arc<dyn TripModel> {
    Arc::new(move |_: &TripFeatures| value)
}

pub(super) fn engine_with(config: &EngineConfig) -> ReimbursementEngine {
    ReimbursementEngine::new(
        config,
        constant_model(GENERAL_STUB),
        constant_model(OUTLIER_STUB),
    )
    .expect("engine builds")
}

pub(super) fn reference_engine() -> ReimbursementEngine {
    engine_with(&EngineConfig::reference())
}

pub(super) fn trip(duration_days: i64, miles: f64, receipts: f64) -> TripInput {
    TripInput::new(duration_days, miles, receipts).expect("valid trip")
}

pub(super) fn assert_status(response: &Response, status: StatusCode) {
    assert_eq!(response.status(), status);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
