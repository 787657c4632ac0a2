use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;

use super::{ip::remote_socket, Interceptor};

/// One finished request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRecord {
    pub remote: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    /// As announced by the client's `Content-Length`.
    pub request_bytes: Option<u64>,
    /// Body bytes actually handed to the connection.
    pub response_bytes: u64,
    pub duration: Duration,
}

/// Logs every exchange once its response body has been sent (or dropped).
#[derive(Clone, Default)]
pub struct LoggingInterceptor {
    observer: Option<UnboundedSender<ExchangeRecord>>,
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also sends each record to `observer`.
    pub fn with_observer(observer: UnboundedSender<ExchangeRecord>) -> Self {
        Self { observer: Some(observer) }
    }
}

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn intercept(&self, req: Request, next: Next) -> Response {
        let mut pending = PendingExchange {
            remote: remote_socket(req.extensions()).map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            status: StatusCode::OK,
            request_bytes: content_length(req.headers()),
            response_bytes: 0,
            started: Instant::now(),
            observer: self.observer.clone(),
        };

        let res = next.run(req).await;
        let (parts, body) = res.into_parts();
        pending.status = parts.status;

        // The stream owns the whole exchange, so the record is emitted only
        // once the body has been sent or dropped.
        let counted = body.into_data_stream().map(move |chunk| {
            let exchange = &mut pending;
            if let Ok(bytes) = &chunk {
                exchange.response_bytes += bytes.len() as u64;
            }
            chunk
        });
        Response::from_parts(parts, Body::from_stream(counted))
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH).and_then(|v| v.to_str().ok()).and_then(|v| v.parse().ok())
}

struct PendingExchange {
    remote: String,
    method: String,
    path: String,
    status: StatusCode,
    request_bytes: Option<u64>,
    response_bytes: u64,
    started: Instant,
    observer: Option<UnboundedSender<ExchangeRecord>>,
}

impl Drop for PendingExchange {
    fn drop(&mut self) {
        let record = ExchangeRecord {
            remote: std::mem::take(&mut self.remote),
            method: std::mem::take(&mut self.method),
            path: std::mem::take(&mut self.path),
            status: self.status.as_u16(),
            request_bytes: self.request_bytes,
            response_bytes: self.response_bytes,
            duration: self.started.elapsed(),
        };
        tracing::info!(
            remote = %record.remote,
            status = record.status,
            request_bytes = record.request_bytes.unwrap_or(0),
            response_bytes = record.response_bytes,
            duration_ms = record.duration.as_millis() as u64,
            "{} {}",
            record.method,
            record.path,
        );
        if let Some(observer) = &self.observer {
            let _ = observer.send(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::compose;
    use axum::{
        extract::ConnectInfo,
        http::{Request as HttpRequest, StatusCode},
        routing::{get, post},
        Router,
    };
    use axum::body::Bytes;
    use http_body_util::BodyExt;
    use std::{net::SocketAddr, sync::Arc};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    /// A streaming body made of `n` chunks of `size` bytes.
    fn chunked_body(n: usize, size: usize) -> Body {
        let chunks = (0..n).map(move |_| Ok::<_, std::io::Error>(Bytes::from(vec![b'x'; size])));
        Body::from_stream(futures::stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_counts_bytes_across_chunks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let route = get(|| async { chunked_body(5, 1000) });
        let app: Router =
            Router::new().route("/big", compose(route, vec![Arc::new(LoggingInterceptor::with_observer(tx))]));

        let mut req = HttpRequest::builder().uri("/big").body(Body::empty()).unwrap();
        req.extensions_mut().insert(ConnectInfo("127.0.0.1:5000".parse::<SocketAddr>().unwrap()));
        let res = app.oneshot(req).await.unwrap();
        assert!(rx.try_recv().is_err(), "record emitted before the body was sent");
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.len(), 5000);

        let record = rx.recv().await.unwrap();
        assert_eq!(record.response_bytes, 5000);
        assert_eq!(record.remote, "127.0.0.1:5000");
        assert_eq!(record.method, "GET");
        assert_eq!(record.path, "/big");
        assert_eq!(record.status, 200);
    }

    #[tokio::test]
    async fn test_records_request_length_and_status() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let route = post(|| async { (StatusCode::CONFLICT, "exists") });
        let app: Router =
            Router::new().route("/upload", compose(route, vec![Arc::new(LoggingInterceptor::with_observer(tx))]));

        let req = HttpRequest::builder()
            .method("POST")
            .uri("/upload")
            .header(CONTENT_LENGTH, "3")
            .body(Body::from("abc"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        drop(res);

        let record = rx.recv().await.unwrap();
        assert_eq!(record.status, 409);
        assert_eq!(record.request_bytes, Some(3));
        assert_eq!(record.remote, "-");
    }
}
