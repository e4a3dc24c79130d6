use rusqlite::types::ToSql;
use rusqlite::{named_params, params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::counters::POST_COUNT_COLUMNS;
use super::hashtags::{link_post_hashtags, unlink_post_hashtags};
use super::users::{USER_COLUMNS, USER_COLUMN_COUNT};
use super::{Page, Store, StoreResult};
use crate::db::models::{NewPost, Post, PostCounts, PostWithAuthor, User};

/// Column list for `Post::from_row`, selected from a `posts` table aliased `p`.
pub(crate) const POST_COLUMNS: &str = "p.id, p.author_id, p.content, p.image_url, \
     p.video_url, p.audio_url, p.type, p.created_at, p.updated_at";

const POST_COLUMN_COUNT: usize = 9;

impl Post {
    pub(crate) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Post {
            id: row.get(offset)?,
            author_id: row.get(offset + 1)?,
            content: row.get(offset + 2)?,
            image_url: row.get(offset + 3)?,
            video_url: row.get(offset + 4)?,
            audio_url: row.get(offset + 5)?,
            post_type: row.get(offset + 6)?,
            created_at: row.get(offset + 7)?,
            updated_at: row.get(offset + 8)?,
        })
    }
}

impl PostWithAuthor {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PostWithAuthor {
            post: Post::from_row(row, 0)?,
            author: User::from_row(row, POST_COLUMN_COUNT)?,
            counts: PostCounts::from_row(row, POST_COLUMN_COUNT + USER_COLUMN_COUNT)?,
        })
    }
}

fn post_with_author_sql(filter: &str) -> String {
    format!(
        "SELECT {}, {}, {}
         FROM posts p
         JOIN users u ON u.id = p.author_id
         WHERE {}",
        POST_COLUMNS, USER_COLUMNS, POST_COUNT_COLUMNS, filter
    )
}

/// Newest-first page of posts matching `filter`, each with its author and counters.
///
/// `filter` is a SQL predicate over `p` (posts) and `u` (author) using named
/// parameters; `:limit` and `:offset` are bound here. Posts whose author row
/// is missing fall out of the inner join.
pub(crate) fn list_posts(
    conn: &Connection,
    filter: &str,
    filter_params: &[(&str, &dyn ToSql)],
    page: Page,
) -> rusqlite::Result<Vec<PostWithAuthor>> {
    let sql = format!(
        "{}
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT :limit OFFSET :offset",
        post_with_author_sql(filter)
    );

    let mut bound: Vec<(&str, &dyn ToSql)> = filter_params.to_vec();
    bound.push((":limit", &page.limit));
    bound.push((":offset", &page.offset));

    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map(bound.as_slice(), PostWithAuthor::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

impl Store {
    /// Insert a post and index its hashtags in one transaction.
    pub fn create_post(&self, author_id: &str, post: &NewPost) -> StoreResult<Post> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let created = tx.query_row(
            &format!(
                "INSERT INTO posts (author_id, content, image_url, video_url, audio_url, type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {}",
                POST_COLUMNS.replace("p.", "")
            ),
            params![
                author_id,
                post.content,
                post.image_url,
                post.video_url,
                post.audio_url,
                post.post_type
            ],
            |row| Post::from_row(row, 0),
        )?;

        link_post_hashtags(&tx, created.id, &created.content)?;
        tx.commit()?;

        tracing::debug!(post_id = created.id, author_id, "Created post");
        Ok(created)
    }

    pub fn get_post(&self, id: i64) -> StoreResult<Option<PostWithAuthor>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                &post_with_author_sql("p.id = :id"),
                named_params! { ":id": id },
                PostWithAuthor::from_row,
            )
            .optional()?;
        Ok(post)
    }

    pub fn user_posts(&self, user_id: &str, page: Page) -> StoreResult<Vec<PostWithAuthor>> {
        let conn = self.pool.get()?;
        let posts = list_posts(
            &conn,
            "p.author_id = :user",
            named_params! { ":user": user_id },
            page,
        )?;
        Ok(posts)
    }

    /// Delete a post owned by `user_id`. Returns false when the post is
    /// missing or belongs to someone else.
    pub fn delete_post(&self, id: i64, user_id: &str) -> StoreResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owned: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1 AND author_id = ?2",
            params![id, user_id],
            |row| row.get(0),
        )?;
        if !owned {
            return Ok(false);
        }

        unlink_post_hashtags(&tx, id)?;
        tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!(post_id = id, user_id, "Deleted post");
        Ok(true)
    }
}
