use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::{Hashtag, PostWithAuthor, User};
use crate::error::AppResult;
use crate::extractors::QueryParams;
use crate::routes::clamp_limit;
use crate::state::AppState;
use crate::store::Page;
use crate::validation::require_query;

const DEFAULT_TRENDING_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search/posts", get(search_posts))
        .route("/search/users", get(search_users))
        .route("/trending/hashtags", get(trending_hashtags))
}

async fn search_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> AppResult<Json<Vec<PostWithAuthor>>> {
    let q = require_query(query.q.as_deref())?;
    let limit = clamp_limit(query.limit, Page::DEFAULT_LIMIT, &state);
    Ok(Json(state.store.search_posts(q, limit)?))
}

async fn search_users(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> AppResult<Json<Vec<User>>> {
    let q = require_query(query.q.as_deref())?;
    let limit = clamp_limit(query.limit, Page::DEFAULT_LIMIT, &state);
    Ok(Json(state.store.search_users(q, limit)?))
}

async fn trending_hashtags(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TrendingQuery>,
) -> AppResult<Json<Vec<Hashtag>>> {
    let limit = clamp_limit(query.limit, DEFAULT_TRENDING_LIMIT, &state);
    Ok(Json(state.store.trending_hashtags(limit)?))
}
