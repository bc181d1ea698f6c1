use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, warn};

use stockroom_core::StockError;

/// How an insufficient-stock failure is reported for a given endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortageStatus {
    Conflict,
    BadRequest,
}

impl ShortageStatus {
    fn status(self) -> StatusCode {
        match self {
            ShortageStatus::Conflict => StatusCode::CONFLICT,
            ShortageStatus::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

pub fn stock_error_to_response(err: StockError, shortage: ShortageStatus) -> axum::response::Response {
    let code = err.code();
    match err {
        StockError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, code, msg),
        StockError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, code, msg),
        StockError::InsufficientStock {
            product_id,
            available,
            requested,
        } => {
            warn!(%product_id, available, requested, "insufficient stock");
            (
                shortage.status(),
                axum::Json(json!({
                    "error": code,
                    "message": format!(
                        "insufficient stock for product {product_id}: available {available}, requested {requested}"
                    ),
                    "productId": product_id,
                    "available": available,
                    "requested": requested,
                })),
            )
                .into_response()
        }
        StockError::Internal(msg) => {
            error!(error = %msg, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, code, "internal error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn validation_error(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}
