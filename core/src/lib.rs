//! # Todo API Core
//!
//! Domain types and the storage contract for the Todo API.
//!
//! ## Overview
//!
//! ```text
//! HTTP handler ──validates──▶ Title / TodoUpdate
//!      │
//!      ▼
//! Arc<dyn TodoStore> ──▶ MemoryTodoStore   (volatile, in-process)
//!                   └─▶ DynamoDbTodoStore  (durable, remote; separate crate)
//! ```
//!
//! - [`todo`]: the [`Todo`](todo::Todo) entity and its validated value types
//! - [`store`]: the [`TodoStore`](store::TodoStore) trait and [`StoreError`](store::StoreError)
//! - [`memory`]: the volatile backend
//! - [`environment`]: injectable dependencies such as the [`Clock`](environment::Clock)
//!
//! Backends are constructed once at startup and passed explicitly to the web
//! layer; there is no global store instance.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod memory;
pub mod store;
pub mod todo;

pub use memory::MemoryTodoStore;
pub use store::{StoreError, StoreFuture, StoreResult, TodoStore};
pub use todo::{MAX_TITLE_CHARS, Title, Todo, TodoId, TodoUpdate, ValidationError};

/// Environment module - injectable dependencies
///
/// External dependencies that make tests non-deterministic are abstracted
/// behind traits so tests can substitute fixed implementations.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
