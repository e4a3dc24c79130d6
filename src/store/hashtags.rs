use regex::Regex;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::db::models::Hashtag;

// A tag starts the text or follows any character that can't be part of a word.
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\p{L}\p{M}\p{N}_])#([\p{L}][\p{L}\p{M}\p{N}_]*)")
        .expect("hashtag pattern is valid")
});

pub(crate) const HASHTAG_COLUMNS: &str = "h.id, h.name, h.count, h.created_at";

impl Hashtag {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Hashtag {
            id: row.get(0)?,
            name: row.get(1)?,
            count: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

/// Distinct lowercase tag names in `text`, without the leading `#`.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Record the tags of a freshly inserted post. Runs inside the caller's transaction.
pub(crate) fn link_post_hashtags(
    conn: &Connection,
    post_id: i64,
    content: &str,
) -> rusqlite::Result<()> {
    for name in extract_hashtags(content) {
        let hashtag_id: i64 = conn.query_row(
            "INSERT INTO hashtags (name, count) VALUES (?1, 1)
             ON CONFLICT(name) DO UPDATE SET count = hashtags.count + 1
             RETURNING id",
            params![name],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO post_hashtags (post_id, hashtag_id) VALUES (?1, ?2)
             ON CONFLICT(post_id, hashtag_id) DO NOTHING",
            params![post_id, hashtag_id],
        )?;
    }
    Ok(())
}

/// Release the tags of a post that is about to be deleted.
pub(crate) fn unlink_post_hashtags(conn: &Connection, post_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE hashtags SET count = MAX(count - 1, 0)
         WHERE id IN (SELECT hashtag_id FROM post_hashtags WHERE post_id = ?1)",
        params![post_id],
    )?;
    conn.execute(
        "DELETE FROM post_hashtags WHERE post_id = ?1",
        params![post_id],
    )?;
    Ok(())
}
