//! Storage contract shared by every Todo backend.
//!
//! The service holds exactly one backend for its whole lifetime, chosen at
//! startup and shared by all requests as `Arc<dyn TodoStore>`. Two
//! implementations exist:
//!
//! - [`MemoryTodoStore`](crate::memory::MemoryTodoStore): in-process map, lost on restart
//! - `DynamoDbTodoStore` (in `todo-api-dynamodb`): remote table keyed by `id`
//!
//! # Not-found is not an error
//!
//! Lookups and updates on a missing id resolve to `Ok(None)`, deletes to
//! `Ok(false)`. Only a failure of the backing medium produces a [`StoreError`].
//!
//! # Dyn Compatibility
//!
//! Methods return [`StoreFuture`] (a pinned, boxed future) rather than using
//! `async fn`, so the trait can be used as a trait object.

use crate::todo::{Title, Todo, TodoId, TodoUpdate};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing medium could not complete the operation.
    ///
    /// Covers network and service failures as well as an expired wait.
    /// Never retried by the store itself.
    #[error("Storage unavailable during {operation}: {reason}")]
    Unavailable {
        /// Contract operation that failed (e.g. `create_todo`).
        operation: &'static str,
        /// Underlying cause, for operator-facing diagnostics.
        reason: String,
    },

    /// A persisted record could not be decoded into a [`Todo`].
    #[error("Invalid record {id}: {reason}")]
    InvalidRecord {
        /// Identifier of the offending record, if it could be read.
        id: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    #[must_use]
    pub fn unavailable(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            operation,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StoreError::InvalidRecord`].
    #[must_use]
    pub fn invalid_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future returned by [`TodoStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Uniform create/read/update/delete/count contract over Todo storage.
///
/// # Thread Safety
///
/// Implementations are shared across concurrent requests and must be
/// `Send + Sync`. Concurrent operations on the same id are not coordinated;
/// the last write wins.
pub trait TodoStore: Send + Sync {
    /// Short backend name used in logs (e.g. `"memory"`).
    fn backend(&self) -> &'static str;

    /// Creates a Todo with a fresh id, `done = false` and both timestamps set to now.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the medium cannot be written.
    fn create_todo(&self, title: Title) -> StoreFuture<'_, Todo>;

    /// Returns every stored Todo, in no particular order.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the medium cannot be read or a record is malformed.
    fn get_todos(&self) -> StoreFuture<'_, Vec<Todo>>;

    /// Looks up a single Todo; `Ok(None)` when no item has that id.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the medium cannot be read or the record is malformed.
    fn get_todo_by_id<'a>(&'a self, id: &'a TodoId) -> StoreFuture<'a, Option<Todo>>;

    /// Merges the provided fields into an existing Todo and refreshes `updated_at`.
    ///
    /// Omitted fields are left unchanged. Returns `Ok(None)` if the id does not exist.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the medium cannot complete the update.
    fn update_todo<'a>(
        &'a self,
        id: &'a TodoId,
        update: TodoUpdate,
    ) -> StoreFuture<'a, Option<Todo>>;

    /// Removes a Todo; `Ok(true)` if it existed, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the medium cannot complete the delete.
    fn delete_todo<'a>(&'a self, id: &'a TodoId) -> StoreFuture<'a, bool>;

    /// Total number of stored Todos.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the medium cannot be read.
    fn count(&self) -> StoreFuture<'_, usize>;
}
