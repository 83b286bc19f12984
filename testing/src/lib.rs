//! # Todo API Testing
//!
//! Testing utilities and helpers for the Todo API.
//!
//! This crate provides:
//! - Mock implementations of environment traits ([`FixedClock`])
//! - A store that always fails ([`FailingTodoStore`]) for error-path tests
//! - [`contract`] checks every [`TodoStore`](todo_api_core::TodoStore) backend must pass
//!
//! ## Example
//!
//! ```ignore
//! use todo_api_core::MemoryTodoStore;
//! use todo_api_testing::contract;
//!
//! #[tokio::test]
//! async fn memory_store_honours_contract() {
//!     contract::run_all(&MemoryTodoStore::new()).await;
//! }
//! ```

pub mod contract;

use chrono::{DateTime, Utc};
use todo_api_core::environment::Clock;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};
    use todo_api_core::{StoreError, StoreFuture, Title, Todo, TodoId, TodoStore, TodoUpdate};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until explicitly moved with [`FixedClock::advance`]
    /// or [`FixedClock::set`]. Clones share the same time.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_api_testing::mocks::FixedClock;
    /// use todo_api_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now()); // Always the same!
    ///
    /// clock.advance(Duration::seconds(5));
    /// assert_eq!(clock.now() - time1, Duration::seconds(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock to `time`.
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = time;
        }

        /// Move the clock forward by `delta`.
        pub fn advance(&self, delta: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += delta;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// A [`TodoStore`] whose every operation fails with [`StoreError::Unavailable`].
    ///
    /// Stands in for an unreachable durable store.
    #[derive(Debug, Clone)]
    pub struct FailingTodoStore {
        reason: String,
    }

    impl FailingTodoStore {
        /// Create a failing store reporting `reason` as the cause.
        #[must_use]
        pub fn new(reason: impl Into<String>) -> Self {
            Self {
                reason: reason.into(),
            }
        }

        fn fail<'a, T: Send + 'a>(&self, operation: &'static str) -> StoreFuture<'a, T> {
            let err = StoreError::unavailable(operation, self.reason.clone());
            Box::pin(std::future::ready(Err(err)))
        }
    }

    impl Default for FailingTodoStore {
        fn default() -> Self {
            Self::new("connection refused")
        }
    }

    impl TodoStore for FailingTodoStore {
        fn backend(&self) -> &'static str {
            "failing"
        }

        fn create_todo(&self, _title: Title) -> StoreFuture<'_, Todo> {
            self.fail("create_todo")
        }

        fn get_todos(&self) -> StoreFuture<'_, Vec<Todo>> {
            self.fail("get_todos")
        }

        fn get_todo_by_id<'a>(&'a self, _id: &'a TodoId) -> StoreFuture<'a, Option<Todo>> {
            self.fail("get_todo_by_id")
        }

        fn update_todo<'a>(
            &'a self,
            _id: &'a TodoId,
            _update: TodoUpdate,
        ) -> StoreFuture<'a, Option<Todo>> {
            self.fail("update_todo")
        }

        fn delete_todo<'a>(&'a self, _id: &'a TodoId) -> StoreFuture<'a, bool> {
            self.fail("delete_todo")
        }

        fn count(&self) -> StoreFuture<'_, usize> {
            self.fail("count")
        }
    }
}

/// Install a compact tracing subscriber for test output.
///
/// Safe to call from many tests; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FailingTodoStore, FixedClock, test_clock};
