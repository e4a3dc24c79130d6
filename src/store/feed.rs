use rusqlite::named_params;

use super::posts::list_posts;
use super::{Page, Store, StoreResult};
use crate::db::models::PostWithAuthor;

impl Store {
    /// The viewer's own posts plus posts by everyone they follow, newest first.
    pub fn home_feed(&self, user_id: &str, page: Page) -> StoreResult<Vec<PostWithAuthor>> {
        let conn = self.pool.get()?;
        let posts = list_posts(
            &conn,
            "p.author_id = :viewer
             OR p.author_id IN (SELECT following_id FROM follows WHERE follower_id = :viewer)",
            named_params! { ":viewer": user_id },
            page,
        )?;
        Ok(posts)
    }
}
