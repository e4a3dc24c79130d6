//! Toggle edges: likes, reposts and follows.
//!
//! A toggle deletes the edge and, if there was nothing to delete, inserts it
//! with `ON CONFLICT DO NOTHING`. Both steps share one IMMEDIATE transaction,
//! and the table's unique constraint is what keeps a pair from appearing twice.

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, TransactionBehavior};

use super::users::USER_COLUMNS;
use super::{Store, StoreError, StoreResult};
use crate::db::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Like,
    Repost,
    Follow,
}

impl Edge {
    fn table(self) -> &'static str {
        match self {
            Edge::Like => "likes",
            Edge::Repost => "reposts",
            Edge::Follow => "follows",
        }
    }

    fn columns(self) -> (&'static str, &'static str) {
        match self {
            Edge::Like | Edge::Repost => ("user_id", "post_id"),
            Edge::Follow => ("follower_id", "following_id"),
        }
    }

    /// Query that checks the edge's target row exists.
    fn target_exists_sql(self) -> &'static str {
        match self {
            Edge::Like | Edge::Repost => "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
            Edge::Follow => "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
        }
    }

    fn target_name(self) -> &'static str {
        match self {
            Edge::Like | Edge::Repost => "post",
            Edge::Follow => "user",
        }
    }
}

fn edge_exists(conn: &Connection, edge: Edge, from: &str, to: &dyn ToSql) -> rusqlite::Result<bool> {
    let (from_col, to_col) = edge.columns();
    conn.query_row(
        &format!(
            "SELECT COUNT(*) > 0 FROM {} WHERE {} = ?1 AND {} = ?2",
            edge.table(),
            from_col,
            to_col
        ),
        params![from, to],
        |row| row.get(0),
    )
}

impl Store {
    /// Flip the edge from `from` to `to`. Returns whether the edge now exists.
    pub fn toggle(&self, edge: Edge, from: &str, to: &dyn ToSql) -> StoreResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let target_exists: bool =
            tx.query_row(edge.target_exists_sql(), params![to], |row| row.get(0))?;
        if !target_exists {
            return Err(StoreError::NotFound(edge.target_name()));
        }

        let (from_col, to_col) = edge.columns();
        let removed = tx.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
                edge.table(),
                from_col,
                to_col
            ),
            params![from, to],
        )?;

        let present = if removed > 0 {
            false
        } else {
            tx.execute(
                &format!(
                    "INSERT INTO {table} ({from_col}, {to_col}) VALUES (?1, ?2)
                     ON CONFLICT({from_col}, {to_col}) DO NOTHING",
                    table = edge.table(),
                    from_col = from_col,
                    to_col = to_col
                ),
                params![from, to],
            )?;
            true
        };
        tx.commit()?;

        tracing::debug!(?edge, from, present, "Toggled edge");
        Ok(present)
    }

    pub fn toggle_like(&self, user_id: &str, post_id: i64) -> StoreResult<bool> {
        self.toggle(Edge::Like, user_id, &post_id)
    }

    pub fn toggle_repost(&self, user_id: &str, post_id: i64) -> StoreResult<bool> {
        self.toggle(Edge::Repost, user_id, &post_id)
    }

    /// Follow or unfollow `target_id`. Self-follows are refused before any query runs.
    pub fn toggle_follow(&self, follower_id: &str, target_id: &str) -> StoreResult<bool> {
        if follower_id == target_id {
            return Err(StoreError::SelfFollow);
        }
        self.toggle(Edge::Follow, follower_id, &target_id)
    }

    pub fn is_liked(&self, user_id: &str, post_id: i64) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        Ok(edge_exists(&conn, Edge::Like, user_id, &post_id)?)
    }

    pub fn is_reposted(&self, user_id: &str, post_id: i64) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        Ok(edge_exists(&conn, Edge::Repost, user_id, &post_id)?)
    }

    pub fn is_following(&self, follower_id: &str, target_id: &str) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        Ok(edge_exists(&conn, Edge::Follow, follower_id, &target_id)?)
    }

    /// Users who follow `user_id`, most recent follow first.
    pub fn followers(&self, user_id: &str) -> StoreResult<Vec<User>> {
        self.follow_list("f.follower_id", "f.following_id", user_id)
    }

    /// Users `user_id` follows, most recent follow first.
    pub fn following(&self, user_id: &str) -> StoreResult<Vec<User>> {
        self.follow_list("f.following_id", "f.follower_id", user_id)
    }

    fn follow_list(&self, join_col: &str, match_col: &str, user_id: &str) -> StoreResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}
             FROM follows f
             JOIN users u ON u.id = {}
             WHERE {} = ?1
             ORDER BY f.created_at DESC, f.id DESC",
            USER_COLUMNS, join_col, match_col
        ))?;
        let users = stmt
            .query_map(params![user_id], |row| User::from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{seed_post, seed_user, test_store};

    #[test]
    fn like_twice_toggles_back_off() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        let post = seed_post(&store, "u1", "chai time");

        assert!(store.toggle_like("u1", post).unwrap());
        assert!(store.is_liked("u1", post).unwrap());
        assert!(!store.toggle_like("u1", post).unwrap());
        assert!(!store.is_liked("u1", post).unwrap());
    }

    #[test]
    fn repost_toggles_independently_of_like() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        seed_user(&store, "u2", "ravi");
        let post = seed_post(&store, "u1", "share this");

        assert!(store.toggle_repost("u2", post).unwrap());
        assert!(store.is_reposted("u2", post).unwrap());
        assert!(!store.is_liked("u2", post).unwrap());
        assert!(!store.toggle_repost("u2", post).unwrap());
    }

    #[test]
    fn like_missing_post_is_not_found() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        let err = store.toggle_like("u1", 12345).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("post")));
    }

    #[test]
    fn self_follow_is_rejected_without_writing() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");

        let err = store.toggle_follow("u1", "u1").unwrap_err();
        assert!(matches!(err, StoreError::SelfFollow));
        assert!(!store.is_following("u1", "u1").unwrap());
        assert_eq!(store.user_counts("u1").unwrap().following, 0);
    }

    #[test]
    fn follow_missing_user_is_not_found() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        let err = store.toggle_follow("u1", "ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound("user")));
    }

    #[test]
    fn follow_lists_reflect_edges() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        seed_user(&store, "u2", "ravi");
        seed_user(&store, "u3", "meera");

        assert!(store.toggle_follow("u2", "u1").unwrap());
        assert!(store.toggle_follow("u3", "u1").unwrap());

        let followers: Vec<String> = store
            .followers("u1")
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(followers, vec!["u3".to_string(), "u2".to_string()]);

        let following = store.following("u2").unwrap();
        assert_eq!(following.len(), 1);
        assert_eq!(following[0].id, "u1");

        assert!(!store.toggle_follow("u2", "u1").unwrap());
        assert!(store.following("u2").unwrap().is_empty());
    }

    #[test]
    fn concurrent_likes_never_duplicate() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        let post = seed_post(&store, "u1", "race");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.toggle_like("u1", post).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Four toggles from the same user always land back on "absent"
        assert_eq!(store.post_counts(post).unwrap().likes, 0);
    }
}
