use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::auth::{self, session, IdentityClaims};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, JsonBody, JsonPayload};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/user", get(current_user))
        .route("/logout", post(logout))
}

/// Sign-in that trusts the posted claims. Only mounted when `auth.dev_login` is set.
pub fn dev_router() -> Router<AppState> {
    Router::new().route("/auth/dev-login", post(dev_login))
}

impl JsonPayload for IdentityClaims {
    const INVALID_MESSAGE: &'static str = "Invalid identity claims";
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

// -- Handlers --

async fn current_user(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let found = state
        .store
        .user_with_counts(&user.id)?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Json(found).into_response())
}

async fn dev_login(
    State(state): State<AppState>,
    JsonBody(claims): JsonBody<IdentityClaims>,
) -> AppResult<Response> {
    if claims.sub.trim().is_empty() {
        return Err(AppError::BadRequest("Identity subject is required".into()));
    }

    let auth_config = &state.config.auth;
    let (user, token) = auth::sign_in(&state.store, &claims, auth_config.session_hours)?;
    let cookie = session_cookie(&auth_config.cookie_name, &token, auth_config.session_hours);

    Ok(([(header::SET_COOKIE, cookie)], Json(user)).into_response())
}

async fn logout(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    session::delete_session(state.store.pool(), &user.token)?;
    let cookie = clear_session_cookie(&state.config.auth.cookie_name);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_max_age() {
        let cookie = session_cookie("chirp_session", "abc", 2);
        assert!(cookie.starts_with("chirp_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("Max-Age=7200"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = clear_session_cookie("chirp_session");
        assert!(cookie.starts_with("chirp_session=;"));
        assert!(cookie.ends_with("Max-Age=0"));
    }
}
