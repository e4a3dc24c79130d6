use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::models::{Comment, CommentWithUser, NewPost, PostWithAuthor};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, JsonBody, JsonPayload, PathParam, QueryParams};
use crate::routes::PageQuery;
use crate::state::AppState;
use crate::validation::{validate_comment, validate_new_post, INVALID_COMMENT};

// --- Request / response bodies ---

#[derive(Debug, Deserialize)]
pub struct CreateCommentBody {
    pub content: String,
}

impl JsonPayload for CreateCommentBody {
    const INVALID_MESSAGE: &'static str = INVALID_COMMENT;
}

#[derive(Debug, Serialize)]
pub struct LikeState {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct RepostState {
    pub reposted: bool,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/feed", get(home_feed))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/posts/{id}/like", post(toggle_like))
        .route("/posts/{id}/liked", get(liked))
        .route("/posts/{id}/repost", post(toggle_repost))
        .route("/posts/{id}/reposted", get(reposted))
        .route(
            "/posts/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/comments/{id}", delete(delete_comment))
}

// --- Handlers ---

async fn home_feed(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> AppResult<Json<Vec<PostWithAuthor>>> {
    let posts = state.store.home_feed(&user.id, query.page(&state))?;
    Ok(Json(posts))
}

async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(mut body): JsonBody<NewPost>,
) -> AppResult<Json<PostWithAuthor>> {
    validate_new_post(&mut body)?;

    let created = state.store.create_post(&user.id, &body)?;
    state
        .store
        .get_post(created.id)?
        .map(Json)
        .ok_or(AppError::NotFound("post"))
}

async fn get_post(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<PostWithAuthor>> {
    state
        .store
        .get_post(id)?
        .map(Json)
        .ok_or(AppError::NotFound("post"))
}

async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Value>> {
    // Missing and not-yours look the same to the caller
    if !state.store.delete_post(id, &user.id)? {
        return Err(AppError::NotFound("post"));
    }
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<LikeState>> {
    let liked = state.store.toggle_like(&user.id, id)?;
    Ok(Json(LikeState { liked }))
}

async fn liked(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<LikeState>> {
    let liked = state.store.is_liked(&user.id, id)?;
    Ok(Json(LikeState { liked }))
}

async fn toggle_repost(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<RepostState>> {
    let reposted = state.store.toggle_repost(&user.id, id)?;
    Ok(Json(RepostState { reposted }))
}

async fn reposted(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<RepostState>> {
    let reposted = state.store.is_reposted(&user.id, id)?;
    Ok(Json(RepostState { reposted }))
}

async fn list_comments(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Vec<CommentWithUser>>> {
    Ok(Json(state.store.post_comments(id)?))
}

async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<CreateCommentBody>,
) -> AppResult<Json<Comment>> {
    let content = validate_comment(&body.content)?;
    let comment = state.store.create_comment(&user.id, id, &content)?;
    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Value>> {
    if !state.store.delete_comment(id, &user.id)? {
        return Err(AppError::NotFound("comment"));
    }
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
