use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the identity provider on sign-in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Partial profile edit. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
    pub followers: i64,
    pub following: i64,
    pub posts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithCounts {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "_count")]
    pub counts: UserCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Text,
    Image,
    Video,
    Audio,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Image => "image",
            PostType::Video => "video",
            PostType::Audio => "audio",
        }
    }
}

impl ToSql for PostType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PostType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "text" => Ok(PostType::Text),
            "image" => Ok(PostType::Image),
            "video" => Ok(PostType::Video),
            "audio" => Ok(PostType::Audio),
            other => Err(FromSqlError::Other(
                format!("unknown post type: {}", other).into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub content: String,
    #[serde(rename = "type", default)]
    pub post_type: PostType,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCounts {
    pub likes: i64,
    pub comments: i64,
    pub reposts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: User,
    #[serde(rename = "_count")]
    pub counts: PostCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub user_id: String,
    pub post_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentWithUser {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hashtag {
    pub id: i64,
    pub name: String,
    pub count: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_type_defaults_to_text() {
        let post: NewPost = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(post.post_type, PostType::Text);
    }

    #[test]
    fn post_type_uses_lowercase_names() {
        let post: NewPost =
            serde_json::from_str(r#"{"content":"hi","type":"video","videoUrl":"v.mp4"}"#)
                .unwrap();
        assert_eq!(post.post_type, PostType::Video);
        assert_eq!(post.video_url.as_deref(), Some("v.mp4"));
        assert_eq!(
            serde_json::to_value(PostType::Audio).unwrap(),
            serde_json::json!("audio")
        );
    }

    #[test]
    fn counts_serialize_under_underscore_count() {
        let now = Utc::now();
        let user = User {
            id: "u1".into(),
            email: None,
            first_name: Some("Asha".into()),
            last_name: None,
            profile_image_url: None,
            username: Some("asha".into()),
            bio: None,
            location: None,
            website: None,
            verified: false,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(UserWithCounts {
            user,
            counts: UserCounts {
                followers: 2,
                following: 1,
                posts: 5,
            },
        })
        .unwrap();

        assert_eq!(value["id"], "u1");
        assert_eq!(value["firstName"], "Asha");
        assert_eq!(value["_count"]["followers"], 2);
        assert_eq!(value["_count"]["posts"], 5);
    }
}
