//! HTTP route handlers and the routing table.
//!
//! - `files`: directory listings and downloads
//! - `upload`: file upload and directory creation
//! - `theme`: theme cookie and session handling
//! - `bans`: the banned page and the loopback-only ban admin API
//! - `health`: health, readiness, version and metrics endpoints

pub mod bans;
pub mod files;
pub mod health;
pub mod theme;
pub mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::REFERER, HeaderMap, Uri},
    response::Redirect,
    routing::{any, get, put},
    Router,
};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    compose, compose_router, BanInterceptor, Interceptor, LoggingInterceptor, MethodGuard, SecurityHeaders,
};
use crate::state::AppState;

/// Builds the complete application router.
///
/// Logging and security headers wrap every route. Browsing and the mutating
/// endpoints additionally sit behind the ban check, and the mutating endpoints
/// behind a POST-only guard.
pub fn router(state: AppState) -> Router {
    router_with_logging(state, LoggingInterceptor::new())
}

/// Like [`router`], with a caller-supplied logging interceptor (e.g. one with an observer).
pub fn router_with_logging(state: AppState, logging: LoggingInterceptor) -> Router {
    let cfg = state.config.clone();
    let ban: Arc<dyn Interceptor> = Arc::new(BanInterceptor::new(
        state.bans.clone(),
        state.metrics.clone(),
        cfg.security.trust_forwarded_headers,
    ));
    let post_only: Arc<dyn Interceptor> = Arc::new(MethodGuard::post());
    let upload_limit = usize::try_from(cfg.upload.max_bytes + upload::MULTIPART_OVERHEAD).unwrap_or(usize::MAX);

    let app = Router::new()
        .route("/", get(files::index))
        .route("/files", compose(get(files::browse_root), vec![ban.clone()]))
        .route("/files/", compose(get(files::browse_root), vec![ban.clone()]))
        .route("/files/{*path}", compose(get(files::browse), vec![ban.clone()]))
        .route("/mkdir", compose(any(upload::mkdir), vec![ban.clone(), post_only.clone()]))
        .route(
            "/upload",
            compose(any(upload::upload).layer(DefaultBodyLimit::max(upload_limit)), vec![ban.clone(), post_only.clone()]),
        )
        .route("/theme", compose(any(theme::set_theme), vec![ban, post_only]))
        .route("/banned", get(bans::banned_page))
        .route("/admin/bans", get(bans::list_bans))
        .route("/admin/bans/{address}", put(bans::ban_address).delete(bans::unban_address))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .nest_service("/static", ServeDir::new(&cfg.storage.static_dir))
        .with_state(state);

    let app = compose_router(
        app,
        vec![Arc::new(logging), Arc::new(SecurityHeaders::from_config(&cfg.security))],
    );
    app.layer(CompressionLayer::new()).layer(TraceLayer::new_for_http())
}

/// Listing URL for a logical directory, each segment percent-encoded.
pub fn listing_url(logical: &str) -> String {
    let encoded: Vec<_> = logical.split('/').filter(|s| !s.is_empty()).map(urlencoding::encode).collect();
    if encoded.is_empty() {
        "/files/".to_string()
    } else {
        format!("/files/{}", encoded.join("/"))
    }
}

/// Redirects to the page in `Referer`, or to `fallback` if there is none.
///
/// Only the path and query of the referer are used, so the redirect never
/// leaves this site.
pub fn redirect_back(headers: &HeaderMap, fallback: &str) -> Redirect {
    let target = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|pq| pq.starts_with('/') && !pq.starts_with("//"));
    Redirect::to(target.as_deref().unwrap_or(fallback))
}
