use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::app::errors::{self, ShortageStatus};
use crate::app::services::AppServices;
use crate::app::dto;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_warehouse))
        .route("/trasferisci", post(transfer))
        .route("/riconcilia-arrivi", post(reconcile_arrivals))
}

pub async fn list_warehouse(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stock.warehouse_levels().await {
        Ok(rows) => {
            let body: Vec<_> = rows.iter().map(dto::warehouse_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::Conflict),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::TransferBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::validation_error(rejection.body_text()),
    };

    let request = match body.into_request() {
        Ok(r) => r,
        Err(e) => return errors::stock_error_to_response(e, ShortageStatus::Conflict),
    };

    match services.stock.transfer.move_stock(request).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::transfer_json(&outcome))).into_response(),
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::Conflict),
    }
}

pub async fn reconcile_arrivals(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stock.reconciliation.reconcile_arrivals().await {
        Ok(touched) => (StatusCode::OK, Json(json!({ "ok": true, "touched": touched }))).into_response(),
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::Conflict),
    }
}
