use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::errors::{self, ShortageStatus};
use crate::app::services::AppServices;
use crate::app::dto;

pub fn router() -> Router {
    Router::new().route("/", get(list_orders).post(create_order))
}

pub async fn list_orders(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stock.orders.list_orders().await {
        Ok(orders) => {
            let body: Vec<_> = orders.iter().map(dto::order_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::BadRequest),
    }
}

/// Shortages on this endpoint are reported as 400.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateOrderBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::validation_error(rejection.body_text()),
    };

    let request = match body.into_request() {
        Ok(r) => r,
        Err(e) => return errors::stock_error_to_response(e, ShortageStatus::BadRequest),
    };

    match services.stock.orders.create_order(request).await {
        Ok(placed) => (StatusCode::CREATED, Json(dto::placed_order_json(&placed))).into_response(),
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::BadRequest),
    }
}
