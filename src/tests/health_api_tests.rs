#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::routes;
    use crate::state::AppState;
    use crate::tests::{body_bytes, body_json, local_request, setup_test_app};

    #[tokio::test]
    async fn test_healthz_endpoint() {
        let (app, _state, _dir) = setup_test_app();
        let response = app.oneshot(local_request("GET", "/healthz", Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"ok");
    }

    #[tokio::test]
    async fn test_version_endpoint() {
        let (app, _state, _dir) = setup_test_app();
        let response = app.oneshot(local_request("GET", "/version", Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "dateiwald");
        assert!(json["version"].is_string());
        assert!(json["build"]["os"].is_string());
    }

    #[tokio::test]
    async fn test_readyz_endpoint_ok() {
        let (app, _state, _dir) = setup_test_app();
        let response = app.oneshot(local_request("GET", "/readyz", Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readyz_endpoint_missing_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(AppConfig::with_root(dir.path().join("gone"))).unwrap();
        let app = routes::router(state);

        let response = app.oneshot(local_request("GET", "/readyz", Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("not ready"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, state, _dir) = setup_test_app();
        state.metrics.record_upload(42);
        let response = app.oneshot(local_request("GET", "/metrics", Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["uploads_completed"], 1);
        assert_eq!(json["bytes_uploaded"], 42);
        assert!(json.get("uptime_seconds").is_some());
    }

    #[tokio::test]
    async fn test_metrics_prometheus_endpoint() {
        let (app, state, _dir) = setup_test_app();
        state.sessions.create().await;
        let response = app.oneshot(local_request("GET", "/metrics/prometheus", Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "text/plain; version=0.0.4");
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.contains("# TYPE dateiwald_listings_served counter"));
        assert!(text.contains("dateiwald_active_sessions 1"));
    }
}
