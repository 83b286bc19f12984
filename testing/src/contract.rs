//! Behavioural checks every [`TodoStore`] backend must pass.
//!
//! Each check is self-contained and only inspects the records it creates, so
//! the suite also runs against a shared, non-empty remote table. Checks panic
//! on the first violated expectation, like ordinary assertions.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(clippy::missing_panics_doc)]

use todo_api_core::{Title, Todo, TodoId, TodoStore, TodoUpdate};

fn title(raw: &str) -> Title {
    Title::parse(raw).expect("contract titles are valid")
}

fn occurrences(todos: &[Todo], id: &TodoId) -> usize {
    todos.iter().filter(|todo| &todo.id == id).count()
}

/// A fresh id that no store has ever issued.
#[must_use]
pub fn unknown_id() -> TodoId {
    TodoId::from(format!("unknown-{}", TodoId::generate()))
}

/// Created records start open, with an id and equal timestamps.
pub async fn create_sets_defaults(store: &dyn TodoStore) {
    let todo = store.create_todo(title("  contract: defaults  ")).await.unwrap();

    assert_eq!(todo.title.as_str(), "contract: defaults");
    assert!(!todo.done);
    assert!(!todo.id.as_str().is_empty());
    assert_eq!(todo.created_at, todo.updated_at);
}

/// Lookups, updates and deletes on an unknown id report absence, not errors.
pub async fn unknown_id_is_absent(store: &dyn TodoStore) {
    let id = unknown_id();

    assert_eq!(store.get_todo_by_id(&id).await.unwrap(), None);
    assert_eq!(store.update_todo(&id, TodoUpdate::done(true)).await.unwrap(), None);
    assert!(!store.delete_todo(&id).await.unwrap());
    assert_eq!(store.get_todo_by_id(&id).await.unwrap(), None);
}

/// A created record reads back equal, and is listed exactly once.
pub async fn create_then_read_round_trips(store: &dyn TodoStore) {
    let created = store.create_todo(title("contract: round trip")).await.unwrap();

    let fetched = store.get_todo_by_id(&created.id).await.unwrap();
    assert_eq!(fetched.as_ref(), Some(&created));

    let all = store.get_todos().await.unwrap();
    assert_eq!(occurrences(&all, &created.id), 1);
}

/// Deleting twice: first call true, second false, record gone afterwards.
pub async fn delete_twice(store: &dyn TodoStore) {
    let created = store.create_todo(title("contract: delete")).await.unwrap();

    assert!(store.delete_todo(&created.id).await.unwrap());
    assert!(!store.delete_todo(&created.id).await.unwrap());
    assert_eq!(store.get_todo_by_id(&created.id).await.unwrap(), None);

    let all = store.get_todos().await.unwrap();
    assert_eq!(occurrences(&all, &created.id), 0);
}

/// Updates touch only the provided fields and never move `created_at` or `id`.
pub async fn partial_update_keeps_omitted_fields(store: &dyn TodoStore) {
    let created = store.create_todo(title("contract: partial")).await.unwrap();

    let done = store
        .update_todo(&created.id, TodoUpdate::done(true))
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(done.id, created.id);
    assert_eq!(done.title, created.title);
    assert!(done.done);
    assert_eq!(done.created_at, created.created_at);
    assert!(done.updated_at >= created.updated_at);

    let renamed = store
        .update_todo(&created.id, TodoUpdate::title(title("contract: renamed")))
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(renamed.title.as_str(), "contract: renamed");
    assert!(renamed.done, "omitted `done` must be left unchanged");
    assert_eq!(renamed.created_at, created.created_at);

    let stored = store.get_todo_by_id(&created.id).await.unwrap();
    assert_eq!(stored, Some(renamed));
}

/// `count` moves with creates and deletes.
///
/// Compares deltas so other records in the store do not matter, which
/// assumes nobody else writes to the store while the check runs.
pub async fn count_tracks_mutations(store: &dyn TodoStore) {
    let before = store.count().await.unwrap();

    let first = store.create_todo(title("contract: count 1")).await.unwrap();
    let second = store.create_todo(title("contract: count 2")).await.unwrap();
    assert_eq!(store.count().await.unwrap(), before + 2);

    assert!(store.delete_todo(&first.id).await.unwrap());
    assert_eq!(store.count().await.unwrap(), before + 1);

    assert!(store.delete_todo(&second.id).await.unwrap());
    assert_eq!(store.count().await.unwrap(), before);
}

/// Runs every check in sequence.
pub async fn run_all(store: &dyn TodoStore) {
    create_sets_defaults(store).await;
    unknown_id_is_absent(store).await;
    create_then_read_round_trips(store).await;
    delete_twice(store).await;
    partial_update_keeps_omitted_fields(store).await;
    count_tracks_mutations(store).await;
}
