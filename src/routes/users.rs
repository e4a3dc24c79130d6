use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::models::{PostWithAuthor, ProfileUpdate, User, UserWithCounts};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, JsonBody, PathParam, QueryParams};
use crate::routes::PageQuery;
use crate::state::AppState;
use crate::validation::validate_profile;

#[derive(Debug, Serialize)]
pub struct FollowState {
    pub following: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/profile", put(update_profile))
        .route("/users/by-username/{username}", get(get_user_by_username))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/posts", get(user_posts))
        .route("/users/{id}/follow", post(toggle_follow))
        .route("/users/{id}/following-status", get(following_status))
        .route("/users/{id}/followers", get(followers))
        .route("/users/{id}/following", get(following))
}

async fn get_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> AppResult<Json<UserWithCounts>> {
    state
        .store
        .user_with_counts(&id)?
        .map(Json)
        .ok_or(AppError::NotFound("user"))
}

async fn get_user_by_username(
    State(state): State<AppState>,
    PathParam(username): PathParam<String>,
) -> AppResult<Json<UserWithCounts>> {
    state
        .store
        .user_with_counts_by_username(&username)?
        .map(Json)
        .ok_or(AppError::NotFound("user"))
}

async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> AppResult<Json<User>> {
    validate_profile(&update)?;
    let updated = state.store.update_profile(&user.id, &update)?;
    Ok(Json(updated))
}

async fn user_posts(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> AppResult<Json<Vec<PostWithAuthor>>> {
    let posts = state.store.user_posts(&id, query.page(&state))?;
    Ok(Json(posts))
}

async fn toggle_follow(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<String>,
) -> AppResult<Json<FollowState>> {
    let following = state.store.toggle_follow(&user.id, &id)?;
    Ok(Json(FollowState { following }))
}

async fn following_status(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<String>,
) -> AppResult<Json<FollowState>> {
    let following = state.store.is_following(&user.id, &id)?;
    Ok(Json(FollowState { following }))
}

async fn followers(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.store.followers(&id)?))
}

async fn following(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.store.following(&id)?))
}
