use axum::{
    extract::{rejection::FormRejection, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap,
    },
    response::{AppendHeaders, IntoResponse, Response},
    Form,
};
use serde_json::json;

use super::redirect_back;
use crate::state::AppState;
use crate::types::{Theme, ThemeForm};

pub const THEME_COOKIE: &str = "theme";
pub const SESSION_COOKIE: &str = "sid";
/// 30 days, in seconds.
pub const THEME_COOKIE_MAX_AGE: i64 = 30 * 24 * 60 * 60;
const SESSION_THEME_KEY: &str = "theme";

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"').to_string())
}

/// Theme for this client: session first, then the `theme` cookie, then light.
pub async fn resolve_theme(state: &AppState, headers: &HeaderMap) -> Theme {
    if let Some(sid) = cookie_value(headers, SESSION_COOKIE) {
        if let Some(session) = state.sessions.get_valid(&sid).await {
            if let Some(theme) = session.data.get(SESSION_THEME_KEY).and_then(|v| v.as_str()).and_then(Theme::parse) {
                return theme;
            }
        }
    }
    cookie_value(headers, THEME_COOKIE).as_deref().and_then(Theme::parse).unwrap_or_default()
}

/// `POST /theme`: remembers the chosen theme and sends the client back.
///
/// Unknown or missing values fall back to light. The choice is kept in a
/// cookie and in the client's session, which is created on first use.
pub async fn set_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<ThemeForm>, FormRejection>,
) -> Response {
    let requested = form.ok().and_then(|Form(f)| f.theme);
    let theme = requested.as_deref().and_then(Theme::parse).unwrap_or_default();

    let existing = match cookie_value(&headers, SESSION_COOKIE) {
        Some(sid) => state.sessions.get_valid(&sid).await.map(|s| s.id),
        None => None,
    };
    let sid = match existing {
        Some(sid) => sid,
        None => state.sessions.create().await,
    };
    if !state.sessions.set(&sid, SESSION_THEME_KEY, json!(theme.as_str())).await {
        tracing::warn!("Session expired while storing theme");
    }

    let theme_cookie = format!("{}={}; Path=/; Max-Age={}; SameSite=Lax", THEME_COOKIE, theme.as_str(), THEME_COOKIE_MAX_AGE);
    let session_cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        sid,
        state.sessions.ttl().num_seconds()
    );

    (AppendHeaders([(SET_COOKIE, theme_cookie), (SET_COOKIE, session_cookie)]), redirect_back(&headers, "/files/"))
        .into_response()
}
