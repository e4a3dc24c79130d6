//! Boundary with the external identity provider.
//!
//! The provider authenticates the person and hands back claims; this side
//! upserts the matching user row and opens a session for it.

use serde::Deserialize;

use crate::auth::session;
use crate::db::models::{UpsertUser, User};
use crate::store::{Store, StoreResult};

/// Claims asserted by the identity provider for a signed-in person.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Stable subject identifier; becomes the user id.
    pub sub: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

impl From<&IdentityClaims> for UpsertUser {
    fn from(claims: &IdentityClaims) -> Self {
        UpsertUser {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
            profile_image_url: claims.profile_image_url.clone(),
        }
    }
}

/// Upsert the user behind `claims` and start a session. Returns the user and session token.
pub fn sign_in(
    store: &Store,
    claims: &IdentityClaims,
    session_hours: u64,
) -> StoreResult<(User, String)> {
    let user = store.upsert_user(&UpsertUser::from(claims))?;
    let token = session::create_session(store.pool(), &user.id, session_hours)?;
    tracing::info!(user_id = %user.id, "User signed in");
    Ok((user, token))
}
