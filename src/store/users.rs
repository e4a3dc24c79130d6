use rusqlite::{params, OptionalExtension, Row};

use super::{Store, StoreError, StoreResult};
use crate::db::models::{ProfileUpdate, UpsertUser, User, UserWithCounts};

/// Column list for `User::from_row`, selected from a `users` table aliased `u`.
pub(crate) const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, \
     u.profile_image_url, u.username, u.bio, u.location, u.website, u.verified, \
     u.created_at, u.updated_at";

pub(crate) const USER_COLUMN_COUNT: usize = 12;

impl User {
    /// Read a user whose columns start at `offset` in `USER_COLUMNS` order.
    pub(crate) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(offset)?,
            email: row.get(offset + 1)?,
            first_name: row.get(offset + 2)?,
            last_name: row.get(offset + 3)?,
            profile_image_url: row.get(offset + 4)?,
            username: row.get(offset + 5)?,
            bio: row.get(offset + 6)?,
            location: row.get(offset + 7)?,
            website: row.get(offset + 8)?,
            verified: row.get(offset + 9)?,
            created_at: row.get(offset + 10)?,
            updated_at: row.get(offset + 11)?,
        })
    }
}

impl Store {
    pub fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users u WHERE u.id = ?1", USER_COLUMNS),
                params![id],
                |row| User::from_row(row, 0),
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users u WHERE u.username = ?1", USER_COLUMNS),
                params![username],
                |row| User::from_row(row, 0),
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a user, or merge the supplied fields into the existing row.
    pub fn upsert_user(&self, user: &UpsertUser) -> StoreResult<User> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, email, first_name, last_name, profile_image_url)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
               email = COALESCE(excluded.email, users.email),
               first_name = COALESCE(excluded.first_name, users.first_name),
               last_name = COALESCE(excluded.last_name, users.last_name),
               profile_image_url = COALESCE(excluded.profile_image_url, users.profile_image_url),
               updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')",
            params![
                user.id,
                user.email,
                user.first_name,
                user.last_name,
                user.profile_image_url
            ],
        )?;

        conn.query_row(
            &format!("SELECT {} FROM users u WHERE u.id = ?1", USER_COLUMNS),
            params![user.id],
            |row| User::from_row(row, 0),
        )
        .map_err(Into::into)
    }

    pub fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<User> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE users SET
               username = COALESCE(?2, username),
               first_name = COALESCE(?3, first_name),
               last_name = COALESCE(?4, last_name),
               bio = COALESCE(?5, bio),
               location = COALESCE(?6, location),
               website = COALESCE(?7, website),
               profile_image_url = COALESCE(?8, profile_image_url),
               updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
             WHERE id = ?1",
            params![
                id,
                update.username,
                update.first_name,
                update.last_name,
                update.bio,
                update.location,
                update.website,
                update.profile_image_url
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("user"));
        }

        conn.query_row(
            &format!("SELECT {} FROM users u WHERE u.id = ?1", USER_COLUMNS),
            params![id],
            |row| User::from_row(row, 0),
        )
        .map_err(Into::into)
    }

    pub fn user_with_counts(&self, id: &str) -> StoreResult<Option<UserWithCounts>> {
        let Some(user) = self.get_user(id)? else {
            return Ok(None);
        };
        let counts = self.user_counts(id)?;
        Ok(Some(UserWithCounts { user, counts }))
    }

    pub fn user_with_counts_by_username(
        &self,
        username: &str,
    ) -> StoreResult<Option<UserWithCounts>> {
        let Some(user) = self.get_user_by_username(username)? else {
            return Ok(None);
        };
        let counts = self.user_counts(&user.id)?;
        Ok(Some(UserWithCounts { user, counts }))
    }
}
