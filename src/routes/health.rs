use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Liveness probe
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: the root directory must be readable
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let root = state.resolver.root().to_path_buf();
    match tokio::time::timeout(std::time::Duration::from_secs(5), tokio::fs::read_dir(root)).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready".to_string()).into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout".to_string()).into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP dateiwald_listings_served Directory listings served\n# TYPE dateiwald_listings_served counter\ndateiwald_listings_served {}\n\
# HELP dateiwald_downloads_served Files served\n# TYPE dateiwald_downloads_served counter\ndateiwald_downloads_served {}\n\
# HELP dateiwald_uploads_completed Uploads stored\n# TYPE dateiwald_uploads_completed counter\ndateiwald_uploads_completed {}\n\
# HELP dateiwald_uploads_rejected Uploads rejected\n# TYPE dateiwald_uploads_rejected counter\ndateiwald_uploads_rejected {}\n\
# HELP dateiwald_bytes_uploaded Bytes uploaded\n# TYPE dateiwald_bytes_uploaded counter\ndateiwald_bytes_uploaded {}\n\
# HELP dateiwald_directories_created Directories created\n# TYPE dateiwald_directories_created counter\ndateiwald_directories_created {}\n\
# HELP dateiwald_requests_blocked Requests from banned clients\n# TYPE dateiwald_requests_blocked counter\ndateiwald_requests_blocked {}\n\
# HELP dateiwald_active_sessions Sessions currently stored\n# TYPE dateiwald_active_sessions gauge\ndateiwald_active_sessions {}\n\
# HELP dateiwald_uptime_seconds Uptime seconds\n# TYPE dateiwald_uptime_seconds gauge\ndateiwald_uptime_seconds {}\n",
        m.listings_served,
        m.downloads_served,
        m.uploads_completed,
        m.uploads_rejected,
        m.bytes_uploaded,
        m.directories_created,
        m.requests_blocked,
        state.sessions.len().await,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
