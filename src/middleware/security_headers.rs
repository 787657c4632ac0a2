//! Security headers added to every response.
//!
//! `Referrer-Policy` is `same-origin` rather than `no-referrer`: `/mkdir` and
//! `/theme` redirect back to the page in `Referer`.

use async_trait::async_trait;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use super::Interceptor;
use crate::config::SecurityConfig;

#[derive(Clone, Debug, Default)]
pub struct SecurityHeaders {
    hsts: Option<HeaderValue>,
    csp: Option<HeaderValue>,
}

impl SecurityHeaders {
    pub fn from_config(sec: &SecurityConfig) -> Self {
        let hsts = if sec.enable_hsts.unwrap_or(false) {
            let max_age = sec.hsts_max_age.unwrap_or(31536000); // 1 year
            let include_sub = if sec.hsts_include_subdomains.unwrap_or(false) { "; includeSubDomains" } else { "" };
            HeaderValue::from_str(&format!("max-age={}{}", max_age, include_sub)).ok()
        } else {
            None
        };
        let csp = sec
            .csp
            .as_deref()
            .filter(|csp| !csp.trim().is_empty())
            .and_then(|csp| match HeaderValue::from_str(csp) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Ignoring invalid security.csp value: {}", e);
                    None
                }
            });
        Self { hsts, csp }
    }
}

#[async_trait]
impl Interceptor for SecurityHeaders {
    async fn intercept(&self, req: Request, next: Next) -> Response {
        let mut res = next.run(req).await;
        let headers = res.headers_mut();

        headers.insert(HeaderName::from_static("x-content-type-options"), HeaderValue::from_static("nosniff"));
        headers.insert(HeaderName::from_static("x-frame-options"), HeaderValue::from_static("SAMEORIGIN"));
        headers.insert(HeaderName::from_static("referrer-policy"), HeaderValue::from_static("same-origin"));
        headers.insert(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        );
        headers.insert(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        );

        if let Some(hsts) = &self.hsts {
            headers.insert(HeaderName::from_static("strict-transport-security"), hsts.clone());
        }
        if let Some(csp) = &self.csp {
            headers.insert(HeaderName::from_static("content-security-policy"), csp.clone());
        }

        // Listings and error bodies are JSON and must never be served stale.
        let is_json = headers
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);
        if is_json {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        res
    }
}
