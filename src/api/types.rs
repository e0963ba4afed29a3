//! Wire types for the page endpoints.
//!
//! Every response field except `ok` is optional, and a field whose value
//! has the wrong shape is read as absent rather than failing the whole
//! response. Absent means "leave that part of the page alone".

use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// The `data-post-id` of a post. Opaque: never parsed as a number.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `POST /like` response.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LikeResponse {
    #[serde(default, deserialize_with = "flag")]
    pub ok: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub likes: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub liked: Option<bool>,
}

/// A comment as the server rendered it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CommentView {
    pub user: String,
    pub text: String,
    pub time: String,
    #[serde(default, deserialize_with = "lenient")]
    pub avatar: Option<String>,
}

/// `POST /comment` response.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CommentResponse {
    #[serde(default, deserialize_with = "flag")]
    pub ok: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub comment: Option<CommentView>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
}

/// `POST /share` and `POST /post/{id}/delete` response.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AckResponse {
    #[serde(default, deserialize_with = "flag")]
    pub ok: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
}

/// Reads any JSON value, keeping it only if it has the shape of `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// `ok` counts only when it is literally `true`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(serde_json::Value::Bool(true))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_response_full() {
        let r: LikeResponse = serde_json::from_str(r#"{"ok":true,"likes":17,"liked":true}"#).unwrap();
        assert_eq!(
            r,
            LikeResponse {
                ok: true,
                likes: Some(17),
                liked: Some(true)
            }
        );
    }

    #[test]
    fn test_like_response_missing_fields_are_none() {
        let r: LikeResponse = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(r.ok);
        assert_eq!(r.likes, None);
        assert_eq!(r.liked, None);
    }

    #[test]
    fn test_malformed_optional_field_reads_as_absent() {
        let r: LikeResponse = serde_json::from_str(r#"{"ok":true,"likes":"many","liked":null}"#).unwrap();
        assert!(r.ok);
        assert_eq!(r.likes, None);
        assert_eq!(r.liked, None);
    }

    #[test]
    fn test_ok_must_be_true() {
        let r: AckResponse = serde_json::from_str(r#"{"ok":1}"#).unwrap();
        assert!(!r.ok);
        let r: AckResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(!r.ok);
    }

    #[test]
    fn test_comment_without_avatar() {
        let r: CommentResponse = serde_json::from_str(
            r#"{"ok":true,"comment":{"user":"alice","text":"hello","time":"2024-01-01 10:00"}}"#,
        )
        .unwrap();
        let c = r.comment.unwrap();
        assert_eq!(c.user, "alice");
        assert_eq!(c.avatar, None);
    }

    #[test]
    fn test_incomplete_comment_reads_as_absent() {
        let r: CommentResponse =
            serde_json::from_str(r#"{"ok":true,"comment":{"user":"alice"}}"#).unwrap();
        assert!(r.ok);
        assert!(r.comment.is_none());
    }

    #[test]
    fn test_error_message_kept() {
        let r: CommentResponse = serde_json::from_str(r#"{"ok":false,"error":"留言不能為空"}"#).unwrap();
        assert!(!r.ok);
        assert_eq!(r.error.as_deref(), Some("留言不能為空"));
    }

    #[test]
    fn test_post_id_is_transparent() {
        let id: PostId = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(id, PostId::new("42"));
        assert_eq!(id.to_string(), "42");
    }
}
