//! Turning a [`ListingView`] into a response.
//!
//! HTML templating lives outside this crate; the shipped renderer emits JSON
//! that a front end can render.

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::error::AppResult;
use crate::types::ListingView;

pub trait ListingRenderer: Send + Sync {
    fn render(&self, view: ListingView) -> AppResult<Response>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonListingRenderer;

impl ListingRenderer for JsonListingRenderer {
    fn render(&self, view: ListingView) -> AppResult<Response> {
        Ok(Json(view).into_response())
    }
}
