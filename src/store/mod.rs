//! Storage layer for users, posts and the social graph.
//!
//! Every operation checks a connection out of the pool, runs one statement
//! (or one short transaction) and hands the connection back. Nothing is
//! cached between calls.

pub mod comments;
pub mod counters;
pub mod feed;
pub mod graph;
pub mod hashtags;
pub mod posts;
pub mod search;
pub mod users;

use thiserror::Error;

use crate::state::DbPool;

pub use graph::Edge;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(rusqlite::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Cannot follow yourself")]
    SelfFollow,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => {
                StoreError::Constraint(err.to_string())
            }
            _ => StoreError::Sql(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use rusqlite::params;
    use tempfile::TempDir;

    use super::Store;
    use crate::db;
    use crate::db::models::{NewPost, UpsertUser};

    /// A migrated store backed by a throwaway database file.
    pub fn test_store() -> (TempDir, Store) {
        let tmp = tempfile::tempdir().unwrap();
        let pool = db::create_pool(&tmp.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        (tmp, Store::new(pool))
    }

    pub fn seed_user(store: &Store, id: &str, username: &str) {
        store
            .upsert_user(&UpsertUser {
                id: id.to_string(),
                email: Some(format!("{}@example.com", username)),
                ..Default::default()
            })
            .unwrap();
        let conn = store.pool().get().unwrap();
        conn.execute(
            "UPDATE users SET username = ?2 WHERE id = ?1",
            params![id, username],
        )
        .unwrap();
    }

    pub fn seed_post(store: &Store, author: &str, content: &str) -> i64 {
        store
            .create_post(
                author,
                &NewPost {
                    content: content.to_string(),
                    ..Default::default()
                },
            )
            .unwrap()
            .id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_failures_are_classified() {
        let (_tmp, store) = testing::test_store();
        let conn = store.pool().get().unwrap();
        let err: StoreError = conn
            .execute(
                "INSERT INTO posts (author_id, content) VALUES ('ghost', 'boo')",
                [],
            )
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[test]
    fn other_sql_failures_stay_sql() {
        let (_tmp, store) = testing::test_store();
        let conn = store.pool().get().unwrap();
        let err: StoreError = conn
            .execute("SELECT * FROM no_such_table", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Sql(_)));
    }

    #[test]
    fn default_page_is_first_twenty() {
        assert_eq!(Page::default(), Page::new(20, 0));
    }
}
