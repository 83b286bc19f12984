//! # Todo API DynamoDB
//!
//! Durable [`TodoStore`](todo_api_core::TodoStore) backed by a DynamoDB table.
//!
//! ## Example
//!
//! ```no_run
//! use todo_api_dynamodb::{DynamoDbConfig, DynamoDbTodoStore};
//! use todo_api_core::TodoStore;
//!
//! # async fn example() -> Result<(), todo_api_core::StoreError> {
//! let config = DynamoDbConfig::new("todos").with_endpoint("http://localhost:8000");
//! let store = DynamoDbTodoStore::connect(config).await;
//! store.ensure_table().await?;
//!
//! let todos = store.get_todos().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Credentials come from the standard AWS provider chain (environment,
//! profile, instance metadata). The table needs a single string partition key
//! named `id`; see [`item`] for the attribute layout.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod item;
pub mod store;

pub use config::DynamoDbConfig;
pub use store::DynamoDbTodoStore;
