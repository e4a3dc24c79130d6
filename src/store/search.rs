use rusqlite::{named_params, params};

use super::hashtags::HASHTAG_COLUMNS;
use super::posts::list_posts;
use super::users::USER_COLUMNS;
use super::{Page, Store, StoreResult};
use crate::db::models::{Hashtag, PostWithAuthor, User};

impl Store {
    /// Posts whose content contains `query` ignoring case, newest first.
    ///
    /// `query` is matched as-is; surrounding whitespace is part of it.
    pub fn search_posts(&self, query: &str, limit: u32) -> StoreResult<Vec<PostWithAuthor>> {
        let conn = self.pool.get()?;
        let posts = list_posts(
            &conn,
            "instr(casefold(p.content), casefold(:query)) > 0",
            named_params! { ":query": query },
            Page::new(limit, 0),
        )?;
        Ok(posts)
    }

    /// Users whose username, first name or last name contains `query`.
    pub fn search_users(&self, query: &str, limit: u32) -> StoreResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}
             FROM users u
             WHERE instr(casefold(u.username), casefold(?1)) > 0
                OR instr(casefold(u.first_name), casefold(?1)) > 0
                OR instr(casefold(u.last_name), casefold(?1)) > 0
             ORDER BY u.created_at DESC, u.id
             LIMIT ?2",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map(params![query, limit], |row| {
                User::from_row(row, 0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Hashtags by usage count, highest first. Equal counts sort by name.
    pub fn trending_hashtags(&self, limit: u32) -> StoreResult<Vec<Hashtag>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM hashtags h ORDER BY h.count DESC, h.name ASC LIMIT ?1",
            HASHTAG_COLUMNS
        ))?;
        let hashtags = stmt
            .query_map(params![limit], Hashtag::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hashtags)
    }
}
