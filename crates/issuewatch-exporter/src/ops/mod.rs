//! HTTP handlers.
//!
//! - `/`                 : static landing page
//! - `/metrics/`         : latest snapshot (204 until the first refresh succeeds)
//! - `/metrics/exporter` : exporter self-metrics
//! - `/healthz`          : liveness
//! - `/readyz`           : readiness (503 until a snapshot exists)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, error};

use crate::app_state::AppState;

pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const INDEX_HTML: &str = "<html><head><title>issuewatch</title></head><body>\
<h1>Sentry Issues &amp; Events Exporter</h1>\
<h3>Go to <a href=\"/metrics/\">/metrics</a></h3>\
</body></html>";

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.store().read().await {
        Ok(Some(snapshot)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
            snapshot.into_bytes(),
        )
            .into_response(),
        Ok(None) => {
            debug!("no snapshot yet; returning empty response");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(
                store = state.store().describe(),
                kind = e.kind().as_str(),
                error = %e,
                "reading snapshot failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

pub async fn exporter_metrics(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        state.metrics().render(),
    )
        .into_response()
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.store().read().await {
        Ok(Some(_)) => (StatusCode::OK, "ready"),
        Ok(None) => (StatusCode::SERVICE_UNAVAILABLE, "warming up"),
        Err(e) => {
            error!(kind = e.kind().as_str(), error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}
