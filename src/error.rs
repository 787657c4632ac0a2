use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

use crate::fs::FsError;

/// The HTTP-facing error type.
///
/// Handlers return [`AppResult`]; filesystem errors convert via `From<FsError>`
/// so `?` picks the right status code.
#[derive(Debug)]
pub enum AppError {
    /// For internal server errors that are not expected to be handled by the client.
    Internal(anyhow::Error),
    /// Malformed form, multipart body or query.
    BadRequest(String),
    /// A logical path that would leave the root.
    InvalidPath(String),
    /// A file or directory name with reserved characters.
    InvalidFilename(String),
    NotFound(String),
    /// Upload or mkdir target already exists.
    Conflict(String),
    Forbidden(String),
    MethodNotAllowed {
        allowed: Method,
    },
    PayloadTooLarge {
        limit: u64,
    },
    /// A directory could not be listed.
    Scanner(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::InvalidPath(msg) => write!(f, "Invalid path: {}", msg),
            AppError::InvalidFilename(msg) => write!(f, "Invalid filename: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::MethodNotAllowed { allowed } => write!(f, "Method not allowed, use {}", allowed),
            AppError::PayloadTooLarge { limit } => write!(f, "Payload exceeds limit of {} bytes", limit),
            AppError::Scanner(msg) => write!(f, "Scanner error: {}", msg),
            AppError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Internal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Scanner(_) | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_)
            | AppError::InvalidPath(_)
            | AppError::InvalidFilename(_)
            | AppError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut allow: Option<HeaderValue> = None;
        let (error_code, error_message, details) = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Error ID: {}", error_id);
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg, None),
            AppError::InvalidPath(msg) => {
                tracing::warn!("Rejected path: {}", msg);
                ("INVALID_PATH", "Invalid path".to_string(), None)
            }
            AppError::InvalidFilename(msg) => (
                "INVALID_FILENAME",
                format!("Invalid filename: {}", msg),
                Some(json!({ "forbidden_characters": crate::fs::upload::INVALID_NAME_CHARS })),
            ),
            AppError::NotFound(msg) => ("NOT_FOUND", msg, None),
            AppError::Conflict(msg) => ("CONFLICT", format!("{} already exists", msg), None),
            AppError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                ("FORBIDDEN", msg, None)
            }
            AppError::MethodNotAllowed { allowed } => {
                allow = HeaderValue::from_str(allowed.as_str()).ok();
                ("METHOD_NOT_ALLOWED", format!("Only {} is allowed", allowed), None)
            }
            AppError::PayloadTooLarge { limit } => (
                "PAYLOAD_TOO_LARGE",
                format!("Upload exceeds the limit of {} bytes", limit),
                Some(json!({ "limit": limit })),
            ),
            AppError::Scanner(msg) => {
                tracing::warn!("Scanner error: {}", msg);
                ("SCANNER_ERROR", "Directory could not be read".to_string(), None)
            }
            AppError::IoError(msg) => {
                tracing::error!("I/O error: {}", msg);
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Error ID: {}", error_id);
                (
                    "IO_ERROR",
                    "An I/O error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        let mut res = (status, Json(body)).into_response();
        if let Some(allow) = allow {
            res.headers_mut().insert(header::ALLOW, allow);
        }
        res
    }
}

impl From<FsError> for AppError {
    fn from(err: FsError) -> Self {
        match err {
            FsError::InvalidPath(p) => AppError::InvalidPath(p),
            FsError::InvalidFilename(n) => AppError::InvalidFilename(n),
            FsError::PayloadTooLarge { limit } => AppError::PayloadTooLarge { limit },
            FsError::Stream(msg) => AppError::BadRequest(msg),
            FsError::NotFound(p) => AppError::NotFound(format!("{} not found", p)),
            FsError::AlreadyExists(p) => AppError::Conflict(p),
            FsError::PermissionDenied(p) => AppError::Forbidden(format!("permission denied: {}", p)),
            err @ FsError::Scan { .. } => AppError::Scanner(err.to_string()),
            FsError::Io(e) => AppError::IoError(format!("{}: {}", e.kind(), e)),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::from(FsError::from_io(err, "file"))
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;
