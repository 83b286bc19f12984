//! Property tests for title validation and Todo construction.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use todo_api_core::{MAX_TITLE_CHARS, Title, Todo, TodoId, ValidationError};

fn whitespace() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec![' ', '\t', '\n', '\r']), 0..8)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn valid_titles_round_trip_trimmed(
        core in "[a-zA-Z0-9][a-zA-Z0-9 ,.!?-]{0,198}[a-zA-Z0-9]|[a-zA-Z0-9]",
        lead in whitespace(),
        trail in whitespace(),
    ) {
        let raw = format!("{lead}{core}{trail}");
        let title = Title::parse(&raw).unwrap();
        prop_assert_eq!(title.as_str(), core.as_str());
    }

    #[test]
    fn whitespace_only_is_required_error(raw in whitespace()) {
        prop_assert_eq!(Title::parse(&raw), Err(ValidationError::TitleRequired));
    }

    #[test]
    fn overlong_titles_are_rejected(extra in 1usize..100) {
        let raw = "x".repeat(MAX_TITLE_CHARS + extra);
        let is_too_long = matches!(
            Title::parse(&raw),
            Err(ValidationError::TitleTooLong { .. })
        );
        prop_assert!(is_too_long);
    }

    #[test]
    fn new_todos_start_open_with_equal_timestamps(secs in 0i64..4_000_000_000) {
        let now = Utc.timestamp_opt(secs, 0).unwrap();
        let todo = Todo::new(TodoId::generate(), Title::parse("task").unwrap(), now);
        prop_assert!(!todo.done);
        prop_assert!(!todo.id.as_str().is_empty());
        prop_assert_eq!(todo.created_at, todo.updated_at);
    }
}

#[test]
fn generated_ids_are_unique() {
    let ids: std::collections::HashSet<TodoId> = (0..1000).map(|_| TodoId::generate()).collect();
    assert_eq!(ids.len(), 1000);
}
