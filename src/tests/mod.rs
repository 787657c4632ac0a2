//! Integration and unit tests for the Dateiwald service.
//!
//! - **api_tests**: end-to-end tests of the routing table (browse, upload, mkdir, bans, theme)
//! - **health_api_tests**: health, readiness, version and metrics endpoints
//! - **config_tests**: configuration defaults, layering and validation
//! - **error_tests**: `AppError` status mapping and response bodies
//! - **types_tests**: listing view helpers (sizes, icons, breadcrumbs, themes)

pub mod config_tests;
pub mod health_api_tests;

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;

use crate::config::AppConfig;
use crate::routes;
use crate::state::AppState;

/// Test app serving a fresh temporary root. Keep the `TempDir` alive for the test.
pub(crate) fn setup_test_app() -> (Router, AppState, TempDir) {
    setup_test_app_with(|_| {})
}

pub(crate) fn setup_test_app_with(tweak: impl FnOnce(&mut AppConfig)) -> (Router, AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let mut config = AppConfig::with_root(root);
    tweak(&mut config);
    let state = AppState::new(config).unwrap();
    (routes::router(state.clone()), state, dir)
}

/// A request as if it arrived over a connection from `remote`.
pub(crate) fn request_from(remote: &str, method: &str, uri: &str, body: Body) -> Request<Body> {
    let mut req = Request::builder().method(method).uri(uri).body(body).unwrap();
    req.extensions_mut().insert(ConnectInfo(remote.parse::<SocketAddr>().unwrap()));
    req
}

pub(crate) fn local_request(method: &str, uri: &str, body: Body) -> Request<Body> {
    request_from("127.0.0.1:50000", method, uri, body)
}

pub(crate) async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    res.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub(crate) async fn body_json(res: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}
