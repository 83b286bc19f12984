//! Volatile, in-process Todo storage.
//!
//! Backed by a `HashMap` behind a `RwLock`. Every operation completes while
//! holding the lock and never suspends, so each one is an indivisible step
//! even when requests interleave. Data is lost when the process exits.

use crate::environment::{Clock, SystemClock};
use crate::store::{StoreFuture, TodoStore};
use crate::todo::{Title, Todo, TodoId, TodoUpdate};
use std::collections::HashMap;
use std::future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory [`TodoStore`].
///
/// Cloning is cheap and clones share the same map.
///
/// # Example
///
/// ```
/// use todo_api_core::memory::MemoryTodoStore;
/// use todo_api_core::store::TodoStore;
/// use todo_api_core::todo::Title;
///
/// # tokio_test::block_on(async {
/// let store = MemoryTodoStore::new();
/// let todo = store.create_todo(Title::parse("buy milk")?).await?;
///
/// assert_eq!(store.get_todo_by_id(&todo.id).await?, Some(todo));
/// assert_eq!(store.count().await?, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct MemoryTodoStore {
    todos: Arc<RwLock<HashMap<TodoId, Todo>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryTodoStore {
    /// Creates an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store using the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            todos: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Removes every Todo.
    pub fn clear(&self) {
        self.write().clear();
        tracing::info!("Memory store cleared");
    }

    /// Number of stored Todos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no Todos are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-written:
    // every mutation is a single insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TodoId, Todo>> {
        self.todos.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TodoId, Todo>> {
        self.todos.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTodoStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TodoStore for MemoryTodoStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn create_todo(&self, title: Title) -> StoreFuture<'_, Todo> {
        let todo = Todo::new(TodoId::generate(), title, self.clock.now());
        self.write().insert(todo.id.clone(), todo.clone());
        tracing::info!(todo_id = %todo.id, "Todo created in memory");

        Box::pin(future::ready(Ok(todo)))
    }

    fn get_todos(&self) -> StoreFuture<'_, Vec<Todo>> {
        let todos: Vec<Todo> = self.read().values().cloned().collect();
        tracing::info!(count = todos.len(), "Fetched todos from memory");

        Box::pin(future::ready(Ok(todos)))
    }

    fn get_todo_by_id<'a>(&'a self, id: &'a TodoId) -> StoreFuture<'a, Option<Todo>> {
        let todo = self.read().get(id).cloned();
        if todo.is_none() {
            tracing::warn!(todo_id = %id, "Todo not found in memory");
        }

        Box::pin(future::ready(Ok(todo)))
    }

    fn update_todo<'a>(
        &'a self,
        id: &'a TodoId,
        update: TodoUpdate,
    ) -> StoreFuture<'a, Option<Todo>> {
        let now = self.clock.now();
        let updated = {
            let mut todos = self.write();
            todos.get_mut(id).map(|todo| {
                todo.apply(update, now);
                todo.clone()
            })
        };

        if updated.is_some() {
            tracing::info!(todo_id = %id, "Todo updated in memory");
        } else {
            tracing::warn!(todo_id = %id, "Todo not found for update");
        }

        Box::pin(future::ready(Ok(updated)))
    }

    fn delete_todo<'a>(&'a self, id: &'a TodoId) -> StoreFuture<'a, bool> {
        let deleted = self.write().remove(id).is_some();
        if deleted {
            tracing::info!(todo_id = %id, "Todo deleted from memory");
        } else {
            tracing::warn!(todo_id = %id, "Todo not found for deletion");
        }

        Box::pin(future::ready(Ok(deleted)))
    }

    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(future::ready(Ok(self.len())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    /// Clock that advances one second per reading.
    struct SteppingClock(Mutex<DateTime<Utc>>);

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut current = self.0.lock().unwrap();
            let now = *current;
            *current = now + Duration::seconds(1);
            now
        }
    }

    fn stepping_store() -> MemoryTodoStore {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        MemoryTodoStore::with_clock(Arc::new(SteppingClock(Mutex::new(start))))
    }

    fn title(s: &str) -> Title {
        Title::parse(s).unwrap()
    }

    #[tokio::test]
    async fn create_reads_clock_once() {
        let store = stepping_store();
        let todo = store.create_todo(title("a")).await.unwrap();
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(!todo.done);
    }

    #[tokio::test]
    async fn update_refreshes_only_updated_at() {
        let store = stepping_store();
        let todo = store.create_todo(title("a")).await.unwrap();

        let updated = store
            .update_todo(&todo.id, TodoUpdate::done(true))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at > todo.updated_at);
        assert_eq!(updated.title, todo.title);
        assert!(updated.done);
        assert_eq!(store.get_todo_by_id(&todo.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let store = stepping_store();
        let result = store
            .update_todo(&TodoId::from("missing"), TodoUpdate::done(true))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn clones_share_data_and_clear_empties() {
        let store = MemoryTodoStore::new();
        let other = store.clone();

        store.create_todo(title("a")).await.unwrap();
        assert_eq!(other.len(), 1);

        other.clear();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn separate_instances_are_isolated() {
        let first = MemoryTodoStore::new();
        let second = MemoryTodoStore::new();

        first.create_todo(title("a")).await.unwrap();
        assert_eq!(second.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_kept() {
        let store = MemoryTodoStore::new();
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_todo(title(&format!("todo {i}"))).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.count().await.unwrap(), 50);
    }
}
