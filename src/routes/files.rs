use axum::{
    body::Body,
    extract::{Path, Request, State},
    response::{Redirect, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::theme::resolve_theme;
use crate::error::{AppError, AppResult};
use crate::fs::FsError;
use crate::state::AppState;
use crate::types::ListingView;

pub async fn index() -> Redirect {
    Redirect::to("/files/")
}

pub async fn browse_root(State(state): State<AppState>, req: Request) -> AppResult<Response> {
    serve_logical(state, "/", req).await
}

pub async fn browse(State(state): State<AppState>, Path(path): Path<String>, req: Request) -> AppResult<Response> {
    serve_logical(state, &path, req).await
}

/// Serves a file as-is or renders the listing of a directory.
async fn serve_logical(state: AppState, logical: &str, req: Request) -> AppResult<Response> {
    let abs = state.resolver.resolve(logical)?;
    let md = tokio::fs::metadata(&abs).await.map_err(|e| FsError::from_io(e, logical))?;

    if !md.is_dir() {
        state.metrics.inc_downloads_served();
        tracing::debug!("Serving file {}", abs.display());
        // ServeFile handles content type, ranges and conditional requests.
        let res = ServeFile::new(&abs).oneshot(req).await.unwrap_or_else(|e| match e {});
        return Ok(res.map(Body::new));
    }

    let theme = resolve_theme(&state, req.headers()).await;
    let current = state.resolver.to_logical(&abs);
    let is_root = state.resolver.is_root(&abs);

    let scanner = state.scanner.clone();
    let base = current.clone();
    let entries = tokio::task::spawn_blocking(move || scanner.scan(&abs, &base, is_root))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("listing task failed: {}", e)))??;

    state.metrics.inc_listings_served();
    state.renderer.render(ListingView::new(current, theme, entries))
}
