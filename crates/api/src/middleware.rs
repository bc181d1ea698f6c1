use axum::{
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Assign (or honour) a request id, run the request inside a span carrying it,
/// and echo it back on the response.
pub async fn request_id_middleware(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = incoming_request_id(&req).unwrap_or_else(|| Uuid::now_v7().to_string());

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = async move {
        let response = next.run(req).await;
        info!(status = response.status().as_u16(), "request completed");
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn incoming_request_id(req: &Request<axum::body::Body>) -> Option<String> {
    let value = req.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > 128 {
        return None;
    }
    Some(value.to_string())
}
