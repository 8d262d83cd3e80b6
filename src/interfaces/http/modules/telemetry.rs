//! Request correlation, per-route metrics and the Prometheus endpoint
//!
//! [`trace_request`] wraps the whole app: it gives every request an
//! `x-request-id` (reused when the caller sends one) and a `request` span.
//! [`record_route`] runs as a route layer, where the matched route template
//! is known, and fills in the span's `route` and `dispenser_id` fields.

use std::time::Instant;

use axum::extract::{FromRequestParts, MatchedPath, RawPathParams, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{field, Instrument, Span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID of the current request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// `GET /metrics` (no auth)
pub async fn render_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}

fn request_id_from(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn trace_request(mut request: Request, next: Next) -> Response {
    let request_id = request_id_from(request.headers());
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        route = field::Empty,
        dispenser_id = field::Empty,
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Label for the response status in request metrics.
fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Records `http_requests_total{method,route,status}` and
/// `http_request_duration_seconds{method,route}`.
///
/// The route label is the template (`/dispenser/{id}/status`), never the
/// concrete id.
pub async fn record_route(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let route = parts
        .extensions
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let dispenser_id = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .ok()
        .and_then(|params| {
            params
                .iter()
                .find(|(name, _)| *name == "id")
                .map(|(_, value)| value.to_string())
        });
    let method = parts.method.to_string();

    let span = Span::current();
    span.record("route", route.as_str());
    if let Some(id) = &dispenser_id {
        span.record("dispenser_id", id.as_str());
    }

    let start = Instant::now();
    let response = next.run(Request::from_parts(parts, body)).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = status_class(response.status());
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "route" => route)
        .record(elapsed);

    response
}
