//! The Todo entity and its value types.
//!
//! A [`Todo`] is pure data: identity, a validated [`Title`], a completion flag and
//! two timestamps. Construction and mutation go through [`Todo::new`] and
//! [`Todo::apply`] so the lifecycle rules hold for every backend:
//!
//! - `id` and `created_at` are set once and never change
//! - `done` starts as `false`
//! - `updated_at` equals `created_at` at creation and is refreshed by every update

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Maximum title length, counted in characters after trimming.
pub const MAX_TITLE_CHARS: usize = 200;

/// Client input that violates a Todo invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title was absent, not a string, or blank after trimming.
    #[error("Title is required and must be a non-empty string")]
    TitleRequired,

    /// Title exceeds [`MAX_TITLE_CHARS`] after trimming.
    #[error("Title must not exceed {MAX_TITLE_CHARS} characters")]
    TitleTooLong {
        /// Length of the rejected title.
        length: usize,
    },

    /// `done` was present but not a boolean.
    #[error("Done must be a boolean")]
    DoneNotBoolean,
}

/// Opaque unique identifier of a Todo.
///
/// Generated ids are UUID v4 strings, but lookups accept any string so that
/// unknown or malformed ids simply resolve to "not found".
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated Todo title: trimmed, non-empty, at most [`MAX_TITLE_CHARS`] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Parses raw client input into a title.
    ///
    /// Surrounding whitespace is removed before the checks run, so the stored
    /// title is always the trimmed form.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::TitleRequired`] if nothing is left after trimming
    /// - [`ValidationError::TitleTooLong`] if the trimmed title is too long
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::TitleRequired);
        }

        let length = trimmed.chars().count();
        if length > MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong { length });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Title {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Title> for String {
    fn from(value: Title) -> Self {
        value.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier, assigned by the store
    pub id: TodoId,
    /// What needs doing
    pub title: Title,
    /// Whether the task is completed
    pub done: bool,
    /// When the record was created
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new, not-yet-done Todo stamped with `now`.
    ///
    /// `now` is truncated to millisecond precision, the precision timestamps
    /// are stored and rendered with.
    #[must_use]
    pub fn new(id: TodoId, title: Title, now: DateTime<Utc>) -> Self {
        let now = timestamp::truncate(now);
        Self {
            id,
            title,
            done: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the provided fields of `update` and refreshes `updated_at`.
    pub fn apply(&mut self, update: TodoUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(done) = update.done {
            self.done = done;
        }
        self.updated_at = timestamp::truncate(now);
    }
}

/// Partial update of a Todo.
///
/// `None` fields are left untouched by every backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    /// Replacement title
    pub title: Option<Title>,
    /// Replacement completion flag
    pub done: Option<bool>,
}

impl TodoUpdate {
    /// An update that only changes the title.
    #[must_use]
    pub const fn title(title: Title) -> Self {
        Self {
            title: Some(title),
            done: None,
        }
    }

    /// An update that only changes the completion flag.
    #[must_use]
    pub const fn done(done: bool) -> Self {
        Self {
            title: None,
            done: Some(done),
        }
    }

    /// Returns `true` if no field would change (only `updated_at` is refreshed).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.done.is_none()
    }
}

/// ISO-8601 UTC timestamps with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Drops precision below one millisecond.
    #[must_use]
    pub fn truncate(value: DateTime<Utc>) -> DateTime<Utc> {
        value.trunc_subsecs(3)
    }

    /// Formats a timestamp in the wire format.
    #[must_use]
    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parses a timestamp from the wire format (any RFC 3339 offset is accepted).
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error if `value` is not RFC 3339.
    pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
    }

    /// Serde serializer.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    /// Serde deserializer.
    ///
    /// # Errors
    ///
    /// Fails if the value is not an RFC 3339 string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn title_is_trimmed() {
        let title = Title::parse("  buy milk \n").unwrap();
        assert_eq!(title.as_str(), "buy milk");
    }

    #[test]
    fn title_rejects_empty_and_blank() {
        assert_eq!(Title::parse(""), Err(ValidationError::TitleRequired));
        assert_eq!(Title::parse("   \t"), Err(ValidationError::TitleRequired));
    }

    #[test]
    fn title_length_boundary() {
        assert!(Title::parse(&"a".repeat(200)).is_ok());
        assert_eq!(
            Title::parse(&"a".repeat(201)),
            Err(ValidationError::TitleTooLong { length: 201 })
        );
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        assert!(Title::parse(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn too_long_message_mentions_limit() {
        let err = Title::parse(&"a".repeat(300)).unwrap_err();
        assert!(err.to_string().contains("200 characters"));
    }

    #[test]
    fn new_todo_is_open_with_equal_timestamps() {
        let todo = Todo::new(TodoId::generate(), Title::parse("x").unwrap(), at(10));
        assert!(!todo.done);
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(!todo.id.as_str().is_empty());
    }

    #[test]
    fn apply_leaves_omitted_fields() {
        let mut todo = Todo::new(TodoId::from("t1"), Title::parse("first").unwrap(), at(10));

        todo.apply(TodoUpdate::done(true), at(20));
        assert_eq!(todo.title.as_str(), "first");
        assert!(todo.done);
        assert_eq!(todo.created_at, at(10));
        assert_eq!(todo.updated_at, at(20));

        todo.apply(TodoUpdate::title(Title::parse("second").unwrap()), at(30));
        assert_eq!(todo.title.as_str(), "second");
        assert!(todo.done);
        assert_eq!(todo.updated_at, at(30));
    }

    #[test]
    fn empty_update_only_touches_timestamp() {
        let mut todo = Todo::new(TodoId::from("t1"), Title::parse("first").unwrap(), at(10));
        let before = todo.clone();
        todo.apply(TodoUpdate::default(), at(11));
        assert_eq!(todo.title, before.title);
        assert_eq!(todo.done, before.done);
        assert_eq!(todo.updated_at, at(11));
    }

    #[test]
    fn timestamps_keep_millisecond_precision() {
        let now = Utc.timestamp_opt(5, 123_456_789).unwrap();
        let mut todo = Todo::new(TodoId::from("t1"), Title::parse("x").unwrap(), now);
        assert_eq!(todo.created_at, Utc.timestamp_opt(5, 123_000_000).unwrap());

        todo.apply(TodoUpdate::done(true), Utc.timestamp_opt(6, 999_999).unwrap());
        assert_eq!(todo.updated_at, Utc.timestamp_opt(6, 0).unwrap());
    }

    #[test]
    fn json_shape_uses_camel_case_and_millis() {
        let todo = Todo::new(TodoId::from("abc"), Title::parse("write docs").unwrap(), at(0));
        let json = serde_json::to_value(&todo).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["title"], "write docs");
        assert_eq!(json["done"], false);
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00.000Z");
        assert_eq!(json["updatedAt"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn deserializing_rejects_invalid_title() {
        let raw = r#"{"id":"a","title":"  ","done":false,
            "createdAt":"1970-01-01T00:00:00.000Z","updatedAt":"1970-01-01T00:00:00.000Z"}"#;
        assert!(serde_json::from_str::<Todo>(raw).is_err());
    }
}
