use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::ClientAddress;
use crate::state::AppState;
use crate::types::{BanListResponse, BannedPage};

/// `GET /banned`: tells a banned client so; everyone else gets a 403.
pub async fn banned_page(State(state): State<AppState>, client: ClientAddress) -> AppResult<Json<BannedPage>> {
    if !state.bans.is_banned(&client.address).await {
        return Err(AppError::Forbidden("this page is only for banned clients".to_string()));
    }
    Ok(Json(BannedPage { banned: true, address: client.address }))
}

fn require_admin(state: &AppState, client: &ClientAddress) -> AppResult<()> {
    if state.config.security.admin_loopback_only && !client.is_loopback_peer() {
        return Err(AppError::Forbidden(format!("ban administration from {} is not allowed", client.address)));
    }
    Ok(())
}

pub async fn list_bans(State(state): State<AppState>, client: ClientAddress) -> AppResult<Json<BanListResponse>> {
    require_admin(&state, &client)?;
    Ok(Json(BanListResponse { items: state.bans.banned().await }))
}

pub async fn ban_address(
    State(state): State<AppState>,
    client: ClientAddress,
    Path(address): Path<String>,
) -> AppResult<StatusCode> {
    require_admin(&state, &client)?;
    let address = address.trim();
    if address.is_empty() {
        return Err(AppError::BadRequest("address must not be empty".to_string()));
    }
    state.bans.ban(address).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unban_address(
    State(state): State<AppState>,
    client: ClientAddress,
    Path(address): Path<String>,
) -> AppResult<StatusCode> {
    require_admin(&state, &client)?;
    state.bans.unban(address.trim()).await;
    Ok(StatusCode::NO_CONTENT)
}
