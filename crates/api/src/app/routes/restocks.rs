use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;

use stockroom_core::RestockId;

use crate::app::errors::{self, ShortageStatus};
use crate::app::services::AppServices;
use crate::app::dto;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_restocks).post(create_restock))
        .route("/:id/arrivo", patch(confirm_arrival))
}

/// Overdue restocks are swept to `ARRIVED` before listing.
pub async fn list_restocks(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stock.restocks.list_restocks().await {
        Ok(views) => {
            let body: Vec<_> = views.iter().map(dto::restock_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::Conflict),
    }
}

pub async fn create_restock(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateRestockBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::validation_error(rejection.body_text()),
    };

    let request = match body.into_request() {
        Ok(r) => r,
        Err(e) => return errors::stock_error_to_response(e, ShortageStatus::Conflict),
    };

    match services.stock.restocks.create_restock(request).await {
        Ok(view) => (StatusCode::CREATED, Json(dto::restock_json(&view))).into_response(),
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::Conflict),
    }
}

/// Body is optional; an empty body means "arrived now".
pub async fn confirm_arrival(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let restock_id = match id.parse::<RestockId>() {
        Ok(id) => id,
        Err(e) => return errors::stock_error_to_response(e, ShortageStatus::Conflict),
    };

    let arrival: dto::ArrivalBody = if body.iter().all(u8::is_ascii_whitespace) {
        dto::ArrivalBody::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(e) => return errors::validation_error(format!("invalid arrival body: {e}")),
        }
    };

    match services.stock.restocks.mark_arrival(restock_id, arrival.arrived_at).await {
        Ok(Some(_)) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("restock {restock_id} not found or already arrived"),
        ),
        Err(e) => errors::stock_error_to_response(e, ShortageStatus::Conflict),
    }
}
