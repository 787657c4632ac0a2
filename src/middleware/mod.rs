//! Request interceptors and the helpers that chain them around handlers.
//!
//! An [`Interceptor`] sees the request before the wrapped handler and the response
//! after it, and may answer on its own without calling the handler at all.
//! [`compose`] wraps a single route, [`compose_router`] a whole router. In both,
//! the first interceptor of the list is the outermost one.

pub mod ban;
pub mod ip;
pub mod logging;
pub mod method;
pub mod security_headers;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    response::Response,
    routing::MethodRouter,
    Router,
};

pub use ban::BanInterceptor;
pub use ip::{client_address, ClientAddress};
pub use logging::{ExchangeRecord, LoggingInterceptor};
pub use method::MethodGuard;
pub use security_headers::SecurityHeaders;

#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Handles `req`, calling `next.run(req)` to continue down the chain.
    async fn intercept(&self, req: Request, next: Next) -> Response;
}

/// Wraps `terminal` in `interceptors`, first one outermost.
pub fn compose<S>(terminal: MethodRouter<S>, interceptors: Vec<Arc<dyn Interceptor>>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Layers added last run first, so walk the list backwards.
    interceptors.into_iter().rev().fold(terminal, |route, interceptor| {
        route.layer(from_fn(move |req: Request, next: Next| {
            let interceptor = interceptor.clone();
            async move { interceptor.intercept(req, next).await }
        }))
    })
}

/// Same as [`compose`] for every route of `router`.
pub fn compose_router<S>(router: Router<S>, interceptors: Vec<Arc<dyn Interceptor>>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    interceptors.into_iter().rev().fold(router, |router, interceptor| {
        router.layer(from_fn(move |req: Request, next: Next| {
            let interceptor = interceptor.clone();
            async move { interceptor.intercept(req, next).await }
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request as HttpRequest, StatusCode}, routing::get};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Appends its name to a shared trace on the way in and on the way out.
    struct Tracer {
        name: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Interceptor for Tracer {
        async fn intercept(&self, req: Request, next: Next) -> Response {
            self.trace.lock().unwrap().push(format!("{}:in", self.name));
            let res = next.run(req).await;
            self.trace.lock().unwrap().push(format!("{}:out", self.name));
            res
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Interceptor for ShortCircuit {
        async fn intercept(&self, _req: Request, _next: Next) -> Response {
            Response::builder().status(StatusCode::IM_A_TEAPOT).body(Body::empty()).unwrap()
        }
    }

    fn tracer(name: &'static str, trace: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Interceptor> {
        Arc::new(Tracer { name, trace: trace.clone() })
    }

    #[tokio::test]
    async fn test_first_interceptor_is_outermost() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let handler_trace = trace.clone();
        let route = get(move || {
            let trace = handler_trace.clone();
            async move {
                trace.lock().unwrap().push("handler".to_string());
                "ok"
            }
        });
        let app: Router = Router::new().route("/", compose(route, vec![tracer("a", &trace), tracer("b", &trace)]));

        let res = app.oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), vec!["a:in", "b:in", "handler", "b:out", "a:out"]);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_chain() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let handler_trace = trace.clone();
        let route = get(move || {
            let trace = handler_trace.clone();
            async move {
                trace.lock().unwrap().push("handler".to_string());
                "ok"
            }
        });
        let chain: Vec<Arc<dyn Interceptor>> = vec![tracer("outer", &trace), Arc::new(ShortCircuit), tracer("inner", &trace)];
        let app: Router = Router::new().route("/", compose(route, chain));

        let res = app.oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(*trace.lock().unwrap(), vec!["outer:in", "outer:out"]);
    }

    #[tokio::test]
    async fn test_compose_router_wraps_every_route() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let router: Router = Router::new().route("/a", get(|| async { "a" })).route("/b", get(|| async { "b" }));
        let app = compose_router(router, vec![tracer("all", &trace)]);

        for uri in ["/a", "/b"] {
            let res = app.clone().oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }
        assert_eq!(trace.lock().unwrap().len(), 4);
    }
}
