use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::auth::session;
use crate::error::{AppError, FieldError};
use crate::state::AppState;

/// The signed-in user behind the request's session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    /// Raw session token, kept so logout can revoke it.
    pub token: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no live session is found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(parts, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        let user_id = session::session_user(state.store.pool(), token)?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            id: user_id,
            token: token.to_string(),
        })
    }
}

/// A JSON request body and the message reported when it cannot be parsed.
pub trait JsonPayload: DeserializeOwned {
    const INVALID_MESSAGE: &'static str;
}

/// JSON body whose parse failures become 400 validation errors.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: JsonPayload,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::Validation {
                message: T::INVALID_MESSAGE,
                errors: vec![FieldError::new("body", rejection.body_text())],
            }),
        }
    }
}

/// Query string extractor that reports bad parameters as JSON 400s.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Query(value)| QueryParams(value))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}

/// Path extractor that reports unparseable segments as JSON 400s.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(value)| PathParam(value))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}

pub fn extract_session_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == cookie_name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    use crate::db::models::NewPost;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(header::COOKIE, cookie)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn finds_named_cookie_among_others() {
        let parts = parts_with_cookie("theme=dark; chirp_session=abc123; lang=hi");
        assert_eq!(
            extract_session_token(&parts, "chirp_session"),
            Some("abc123")
        );
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let parts = parts_with_cookie("theme=dark; chirp_session=");
        assert_eq!(extract_session_token(&parts, "chirp_session"), None);
        assert_eq!(extract_session_token(&parts, "other"), None);
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn json_body_missing_field_is_validation_error() {
        let err = JsonBody::<NewPost>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        match err {
            AppError::Validation { message, errors } => {
                assert_eq!(message, "Invalid post data");
                assert_eq!(errors[0].field, "body");
                assert!(errors[0].message.contains("content"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn json_body_unknown_post_type_is_validation_error() {
        let err = JsonBody::<NewPost>::from_request(
            json_request(r#"{"content":"hi","type":"gif"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn bad_query_string_is_bad_request() {
        #[derive(Debug, serde::Deserialize)]
        struct Limit {
            #[allow(dead_code)]
            limit: Option<u32>,
        }

        let (mut parts, _) = Request::builder()
            .uri("/feed?limit=-1")
            .body(())
            .unwrap()
            .into_parts();
        let err = QueryParams::<Limit>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
