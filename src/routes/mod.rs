pub mod auth;
pub mod posts;
pub mod search;
pub mod users;

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::store::Page;

/// The full `/api` surface with request tracing.
pub fn router(state: AppState) -> Router {
    let mut api = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(posts::router())
        .merge(search::router());

    if state.config.auth.dev_login {
        tracing::warn!("Development sign-in route is enabled");
        api = api.merge(auth::dev_router());
    }

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageQuery {
    /// Apply defaults and clamp the limit to the configured maximum.
    pub fn page(&self, state: &AppState) -> Page {
        Page::new(
            clamp_limit(self.limit, Page::DEFAULT_LIMIT, state),
            self.offset.unwrap_or(0),
        )
    }
}

pub fn clamp_limit(limit: Option<u32>, default: u32, state: &AppState) -> u32 {
    limit
        .unwrap_or(default)
        .min(state.config.pagination.max_limit)
}
