use async_trait::async_trait;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::{ip::resolve_client_address, Interceptor};
use crate::metrics::Metrics;
use crate::store::AccessControlStore;

/// Where banned clients are sent.
pub const BANNED_PAGE: &str = "/banned";

/// Sends banned clients to [`BANNED_PAGE`] without running the wrapped handler.
#[derive(Clone)]
pub struct BanInterceptor {
    bans: AccessControlStore,
    metrics: Metrics,
    trust_forwarded: bool,
}

impl BanInterceptor {
    pub fn new(bans: AccessControlStore, metrics: Metrics, trust_forwarded: bool) -> Self {
        Self { bans, metrics, trust_forwarded }
    }
}

#[async_trait]
impl Interceptor for BanInterceptor {
    async fn intercept(&self, req: Request, next: Next) -> Response {
        let address = resolve_client_address(req.headers(), req.extensions(), self.trust_forwarded);
        if self.bans.is_banned(&address).await {
            self.metrics.inc_requests_blocked();
            tracing::warn!("Blocked {} {} from banned address {}", req.method(), req.uri().path(), address);
            return Redirect::to(BANNED_PAGE).into_response();
        }
        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::compose;
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{header, Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use std::net::SocketAddr;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::ServiceExt;

    fn app(bans: AccessControlStore, metrics: Metrics, hits: Arc<AtomicUsize>) -> Router {
        let route = get(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                "listing"
            }
        });
        Router::new().route("/files", compose(route, vec![Arc::new(BanInterceptor::new(bans, metrics, false))]))
    }

    fn request_from(remote: &str) -> HttpRequest<Body> {
        let mut req = HttpRequest::builder().uri("/files").body(Body::empty()).unwrap();
        req.extensions_mut().insert(ConnectInfo(remote.parse::<SocketAddr>().unwrap()));
        req
    }

    #[tokio::test]
    async fn test_banned_client_never_reaches_handler() {
        let bans = AccessControlStore::with_banned(["10.0.0.66"]);
        let metrics = Metrics::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let res = app(bans, metrics.clone(), hits.clone()).oneshot(request_from("10.0.0.66:41000")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), BANNED_PAGE);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.get_snapshot().requests_blocked, 1);
    }

    #[tokio::test]
    async fn test_other_clients_pass_through() {
        let bans = AccessControlStore::with_banned(["10.0.0.66"]);
        let hits = Arc::new(AtomicUsize::new(0));

        let res = app(bans, Metrics::new(), hits.clone()).oneshot(request_from("10.0.0.67:41000")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unban_takes_effect_immediately() {
        let bans = AccessControlStore::with_banned(["10.0.0.66"]);
        let hits = Arc::new(AtomicUsize::new(0));
        let router = app(bans.clone(), Metrics::new(), hits.clone());

        bans.unban("10.0.0.66").await;
        let res = router.oneshot(request_from("10.0.0.66:41000")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
