use async_trait::async_trait;
use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::Interceptor;
use crate::error::AppError;

/// Lets exactly one HTTP method through; everything else gets a 405.
#[derive(Clone, Debug)]
pub struct MethodGuard {
    allowed: Method,
}

impl MethodGuard {
    pub fn new(allowed: Method) -> Self {
        Self { allowed }
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }
}

#[async_trait]
impl Interceptor for MethodGuard {
    async fn intercept(&self, req: Request, next: Next) -> Response {
        if req.method() != self.allowed {
            tracing::debug!("Rejected {} {} (only {} allowed)", req.method(), req.uri().path(), self.allowed);
            return AppError::MethodNotAllowed { allowed: self.allowed.clone() }.into_response();
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
        http::{header, Request as HttpRequest, StatusCode},
        routing::any,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route("/mkdir", compose(any(|| async { "created" }), vec![Arc::new(MethodGuard::post())]))
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_with_allow() {
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let req = HttpRequest::builder().method(method).uri("/mkdir").body(Body::empty()).unwrap();
            let res = app().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(res.headers().get(header::ALLOW).unwrap(), "POST");
        }
    }

    #[tokio::test]
    async fn test_allowed_method_passes() {
        let req = HttpRequest::builder().method(Method::POST).uri("/mkdir").body(Body::empty()).unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
