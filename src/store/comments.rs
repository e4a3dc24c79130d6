use rusqlite::{params, Row, TransactionBehavior};

use super::users::USER_COLUMNS;
use super::{Store, StoreError, StoreResult};
use crate::db::models::{Comment, CommentWithUser, User};

const COMMENT_COLUMNS: &str = "c.id, c.user_id, c.post_id, c.content, c.created_at, c.updated_at";

const COMMENT_COLUMN_COUNT: usize = 6;

impl Comment {
    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Comment {
            id: row.get(offset)?,
            user_id: row.get(offset + 1)?,
            post_id: row.get(offset + 2)?,
            content: row.get(offset + 3)?,
            created_at: row.get(offset + 4)?,
            updated_at: row.get(offset + 5)?,
        })
    }
}

impl Store {
    pub fn create_comment(&self, user_id: &str, post_id: i64, content: &str) -> StoreResult<Comment> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let post_exists: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        if !post_exists {
            return Err(StoreError::NotFound("post"));
        }

        let comment = tx.query_row(
            &format!(
                "INSERT INTO comments (user_id, post_id, content) VALUES (?1, ?2, ?3)
                 RETURNING {}",
                COMMENT_COLUMNS.replace("c.", "")
            ),
            params![user_id, post_id, content],
            |row| Comment::from_row(row, 0),
        )?;
        tx.commit()?;

        Ok(comment)
    }

    /// Comments on a post, newest first, each with its author.
    pub fn post_comments(&self, post_id: i64) -> StoreResult<Vec<CommentWithUser>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, {}
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.post_id = ?1
             ORDER BY c.created_at DESC, c.id DESC",
            COMMENT_COLUMNS, USER_COLUMNS
        ))?;

        let comments = stmt
            .query_map(params![post_id], |row| {
                Ok(CommentWithUser {
                    comment: Comment::from_row(row, 0)?,
                    user: User::from_row(row, COMMENT_COLUMN_COUNT)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    /// Delete a comment written by `user_id`. False when missing or not theirs.
    pub fn delete_comment(&self, id: i64, user_id: &str) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "DELETE FROM comments WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}
