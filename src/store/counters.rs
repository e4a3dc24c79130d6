//! Counts derived from child rows at read time. Nothing here is stored.

use rusqlite::{params, Row};

use super::{Store, StoreResult};
use crate::db::models::{PostCounts, UserCounts};

/// Counter subqueries for a `posts` table aliased `p`, in `PostCounts` field order.
pub(crate) const POST_COUNT_COLUMNS: &str =
    "(SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id), \
     (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id), \
     (SELECT COUNT(*) FROM reposts r WHERE r.post_id = p.id)";

impl PostCounts {
    pub(crate) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(PostCounts {
            likes: row.get(offset)?,
            comments: row.get(offset + 1)?,
            reposts: row.get(offset + 2)?,
        })
    }
}

impl Store {
    pub fn post_counts(&self, post_id: i64) -> StoreResult<PostCounts> {
        let conn = self.pool.get()?;
        let counts = conn.query_row(
            "SELECT
               (SELECT COUNT(*) FROM likes WHERE post_id = ?1),
               (SELECT COUNT(*) FROM comments WHERE post_id = ?1),
               (SELECT COUNT(*) FROM reposts WHERE post_id = ?1)",
            params![post_id],
            |row| PostCounts::from_row(row, 0),
        )?;
        Ok(counts)
    }

    pub fn user_counts(&self, user_id: &str) -> StoreResult<UserCounts> {
        let conn = self.pool.get()?;
        let counts = conn.query_row(
            "SELECT
               (SELECT COUNT(*) FROM follows WHERE following_id = ?1),
               (SELECT COUNT(*) FROM follows WHERE follower_id = ?1),
               (SELECT COUNT(*) FROM posts WHERE author_id = ?1)",
            params![user_id],
            |row| {
                Ok(UserCounts {
                    followers: row.get(0)?,
                    following: row.get(1)?,
                    posts: row.get(2)?,
                })
            },
        )?;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use crate::store::testing::{seed_post, seed_user, test_store};

    #[test]
    fn post_counts_follow_child_rows() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        seed_user(&store, "u2", "ravi");
        let post = seed_post(&store, "u1", "morning chai");

        store.toggle_like("u1", post).unwrap();
        store.toggle_like("u2", post).unwrap();
        store.toggle_repost("u2", post).unwrap();
        store.create_comment("u2", post, "same here").unwrap();

        let counts = store.post_counts(post).unwrap();
        assert_eq!(counts.likes, 2);
        assert_eq!(counts.comments, 1);
        assert_eq!(counts.reposts, 1);

        store.toggle_like("u2", post).unwrap();
        assert_eq!(store.post_counts(post).unwrap().likes, 1);
    }

    #[test]
    fn post_counts_for_missing_post_are_zero() {
        let (_tmp, store) = test_store();
        let counts = store.post_counts(999).unwrap();
        assert_eq!(counts.likes + counts.comments + counts.reposts, 0);
    }

    #[test]
    fn user_counts_follow_graph_and_posts() {
        let (_tmp, store) = test_store();
        seed_user(&store, "u1", "asha");
        seed_user(&store, "u2", "ravi");
        seed_user(&store, "u3", "meera");
        seed_post(&store, "u1", "one");
        seed_post(&store, "u1", "two");

        store.toggle_follow("u2", "u1").unwrap();
        store.toggle_follow("u3", "u1").unwrap();
        store.toggle_follow("u1", "u3").unwrap();

        let counts = store.user_counts("u1").unwrap();
        assert_eq!(counts.followers, 2);
        assert_eq!(counts.following, 1);
        assert_eq!(counts.posts, 2);
    }
}
