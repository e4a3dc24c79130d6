//! Input checks applied at the HTTP edge before anything reaches the store.

use crate::db::models::{NewPost, PostType, ProfileUpdate};
use crate::error::{AppError, AppResult, FieldError};
use crate::extractors::JsonPayload;

pub const MAX_POST_CHARS: usize = 280;
pub const MAX_COMMENT_CHARS: usize = 500;
pub const MAX_USERNAME_CHARS: usize = 30;
pub const MAX_BIO_CHARS: usize = 160;
pub const MAX_PROFILE_FIELD_CHARS: usize = 100;

pub const INVALID_POST: &str = "Invalid post data";
pub const INVALID_COMMENT: &str = "Invalid comment data";
pub const INVALID_PROFILE: &str = "Invalid profile data";

impl JsonPayload for NewPost {
    const INVALID_MESSAGE: &'static str = INVALID_POST;
}

impl JsonPayload for ProfileUpdate {
    const INVALID_MESSAGE: &'static str = INVALID_PROFILE;
}

fn fail(message: &'static str, errors: Vec<FieldError>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation { message, errors })
    }
}

fn check_text(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    max_chars: usize,
) {
    if value.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if value.chars().count() > max_chars {
        errors.push(FieldError::new(
            field,
            format!("must be {} characters or less", max_chars),
        ));
    }
}

/// Trim the post content in place and check it, plus its media fields.
pub fn validate_new_post(post: &mut NewPost) -> AppResult<()> {
    post.content = post.content.trim().to_string();

    let mut errors = Vec::new();
    check_text(&mut errors, "content", &post.content, MAX_POST_CHARS);

    let (field, url) = match post.post_type {
        PostType::Text => ("", None),
        PostType::Image => ("imageUrl", post.image_url.as_deref()),
        PostType::Video => ("videoUrl", post.video_url.as_deref()),
        PostType::Audio => ("audioUrl", post.audio_url.as_deref()),
    };
    if post.post_type != PostType::Text && url.map_or(true, |u| u.trim().is_empty()) {
        errors.push(FieldError::new(
            field,
            format!("is required for {} posts", post.post_type.as_str()),
        ));
    }

    fail(INVALID_POST, errors)
}

/// Trim a comment and check its length. Returns the trimmed text.
pub fn validate_comment(content: &str) -> AppResult<String> {
    let content = content.trim().to_string();
    let mut errors = Vec::new();
    check_text(&mut errors, "content", &content, MAX_COMMENT_CHARS);
    fail(INVALID_COMMENT, errors)?;
    Ok(content)
}

pub fn validate_profile(update: &ProfileUpdate) -> AppResult<()> {
    let mut errors = Vec::new();

    if let Some(username) = &update.username {
        check_text(&mut errors, "username", username, MAX_USERNAME_CHARS);
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push(FieldError::new(
                "username",
                "may only contain letters, digits and underscores",
            ));
        }
    }

    if let Some(bio) = &update.bio {
        if bio.chars().count() > MAX_BIO_CHARS {
            errors.push(FieldError::new(
                "bio",
                format!("must be {} characters or less", MAX_BIO_CHARS),
            ));
        }
    }

    for (field, value) in [
        ("firstName", &update.first_name),
        ("lastName", &update.last_name),
        ("location", &update.location),
        ("website", &update.website),
        ("profileImageUrl", &update.profile_image_url),
    ] {
        if let Some(value) = value {
            if value.chars().count() > MAX_PROFILE_FIELD_CHARS {
                errors.push(FieldError::new(
                    field,
                    format!("must be {} characters or less", MAX_PROFILE_FIELD_CHARS),
                ));
            }
        }
    }

    fail(INVALID_PROFILE, errors)
}

/// A search query must be present and not blank. Returned untrimmed.
pub fn require_query(q: Option<&str>) -> AppResult<&str> {
    match q {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(AppError::BadRequest("Query parameter required".into())),
    }
}
