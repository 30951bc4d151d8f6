use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ReimbursementEngine;

/// Legacy case field names, so recorded cases can be replayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    pub trip_duration_days: i64,
    pub miles_traveled: f64,
    pub total_receipts_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementResponse {
    pub reimbursement: f64,
}

/// Router builder exposing the calculation endpoint.
pub fn reimbursement_router(engine: Arc<ReimbursementEngine>) -> Router {
    Router::new()
        .route("/api/v1/reimbursements", post(calculate_handler))
        .with_state(engine)
}

pub(crate) async fn calculate_handler(
    State(engine): State<Arc<ReimbursementEngine>>,
    axum::Json(request): axum::Json<ReimbursementRequest>,
) -> Response {
    match engine.calculate(
        request.trip_duration_days,
        request.miles_traveled,
        request.total_receipts_amount,
    ) {
        Ok(reimbursement) => (
            StatusCode::OK,
            axum::Json(ReimbursementResponse { reimbursement }),
        )
            .into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
