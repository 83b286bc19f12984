//! [`TodoStore`] over a DynamoDB table.

use crate::config::DynamoDbConfig;
use crate::item::{self, Item, UpdateExpression};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::get_item::builders::GetItemFluentBuilder;
use aws_sdk_dynamodb::operation::scan::builders::ScanFluentBuilder;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ReturnValue,
    ScalarAttributeType, Select,
};
use std::future::Future;
use std::sync::Arc;
use todo_api_core::environment::{Clock, SystemClock};
use todo_api_core::{
    StoreError, StoreFuture, StoreResult, Title, Todo, TodoId, TodoStore, TodoUpdate,
};

/// Durable Todo storage in a DynamoDB table keyed by `id`.
///
/// Each contract operation issues the remote calls described below; list and
/// count are full table scans whose cost grows with the table.
///
/// | Operation | Call |
/// |---|---|
/// | `create_todo` | `PutItem` |
/// | `get_todos` | `Scan`, following pagination |
/// | `get_todo_by_id` | `GetItem` |
/// | `update_todo` | conditional `UpdateItem`, `ALL_NEW` |
/// | `delete_todo` | `DeleteItem`, `ALL_OLD` |
/// | `count` | `Scan` with `Select::Count` |
///
/// Reads are strongly consistent, so a write is visible to the next read.
/// Failures are reported as [`StoreError::Unavailable`] and never retried here.
#[derive(Clone)]
pub struct DynamoDbTodoStore {
    client: Client,
    config: DynamoDbConfig,
    clock: Arc<dyn Clock>,
}

impl DynamoDbTodoStore {
    /// Create a store, loading AWS credentials from the default provider chain.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use todo_api_dynamodb::{DynamoDbConfig, DynamoDbTodoStore};
    /// # async fn example() {
    /// let config = DynamoDbConfig::new("todos").with_region("eu-west-1");
    /// let store = DynamoDbTodoStore::connect(config).await;
    /// # }
    /// ```
    pub async fn connect(config: DynamoDbConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_dynamodb::config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        tracing::info!(
            table_name = %config.table_name,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            "DynamoDB client configured"
        );

        Self::with_client(Client::new(&sdk_config), config)
    }

    /// Create a store around an existing client.
    #[must_use]
    pub fn with_client(client: Client, config: DynamoDbConfig) -> Self {
        Self {
            client,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The table this store reads and writes.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    /// Create the table (on-demand billing, `id` hash key) unless it already exists.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the table cannot be created.
    pub async fn ensure_table(&self) -> StoreResult<()> {
        const OPERATION: &str = "ensure_table";

        let key = KeySchemaElement::builder()
            .attribute_name(item::ID)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| StoreError::unavailable(OPERATION, e.to_string()))?;
        let attribute = AttributeDefinition::builder()
            .attribute_name(item::ID)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| StoreError::unavailable(OPERATION, e.to_string()))?;

        let result = self
            .bounded(
                OPERATION,
                self.client
                    .create_table()
                    .table_name(&self.config.table_name)
                    .key_schema(key)
                    .attribute_definitions(attribute)
                    .billing_mode(BillingMode::PayPerRequest)
                    .send(),
            )
            .await?;

        match result {
            Ok(_) => {
                tracing::info!(table_name = %self.config.table_name, "DynamoDB table created");
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|service| service.is_resource_in_use_exception()) =>
            {
                tracing::debug!(
                    table_name = %self.config.table_name,
                    "DynamoDB table already exists"
                );
                Ok(())
            }
            Err(e) => Err(self.failure(OPERATION, &e)),
        }
    }

    /// Await `call`, bounded by the configured request timeout.
    async fn bounded<F: Future>(
        &self,
        operation: &'static str,
        call: F,
    ) -> StoreResult<F::Output> {
        let Some(limit) = self.config.request_timeout else {
            return Ok(call.await);
        };

        tokio::time::timeout(limit, call).await.map_err(|_| {
            tracing::error!(
                operation,
                table_name = %self.config.table_name,
                timeout_ms = limit.as_millis(),
                "DynamoDB call timed out"
            );
            StoreError::unavailable(operation, format!("timed out after {}ms", limit.as_millis()))
        })
    }

    fn failure<E: std::error::Error>(&self, operation: &'static str, error: &E) -> StoreError {
        let reason = DisplayErrorContext(error).to_string();
        tracing::error!(
            operation,
            table_name = %self.config.table_name,
            error = %reason,
            "DynamoDB call failed"
        );
        StoreError::unavailable(operation, reason)
    }

    fn get_request(&self, id: &TodoId) -> GetItemFluentBuilder {
        self.client
            .get_item()
            .table_name(&self.config.table_name)
            .key(item::ID, key(id))
            .consistent_read(true)
    }

    fn scan_request(&self, start: Option<Item>) -> ScanFluentBuilder {
        self.client
            .scan()
            .table_name(&self.config.table_name)
            .consistent_read(true)
            .set_exclusive_start_key(start)
    }

    async fn scan_page(&self, start: Option<Item>) -> StoreResult<(Vec<Item>, Option<Item>)> {
        let output = self
            .bounded("get_todos", self.scan_request(start).send())
            .await?
            .map_err(|e| self.failure("get_todos", &e))?;

        Ok((output.items.unwrap_or_default(), output.last_evaluated_key))
    }
}

impl std::fmt::Debug for DynamoDbTodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbTodoStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn key(id: &TodoId) -> AttributeValue {
    AttributeValue::S(id.to_string())
}

impl TodoStore for DynamoDbTodoStore {
    fn backend(&self) -> &'static str {
        "dynamodb"
    }

    fn create_todo(&self, title: Title) -> StoreFuture<'_, Todo> {
        Box::pin(async move {
            let todo = Todo::new(TodoId::generate(), title, self.clock.now());

            // Unconditional put: ids are fresh UUIDs
            self.bounded(
                "create_todo",
                self.client
                    .put_item()
                    .table_name(&self.config.table_name)
                    .set_item(Some(item::to_item(&todo)))
                    .send(),
            )
            .await?
            .map_err(|e| self.failure("create_todo", &e))?;

            tracing::info!(
                todo_id = %todo.id,
                table_name = %self.config.table_name,
                "Todo created in DynamoDB"
            );
            Ok(todo)
        })
    }

    fn get_todos(&self) -> StoreFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            let mut todos = Vec::new();
            let mut start = None;

            loop {
                let (items, next) = self.scan_page(start).await?;
                for raw in &items {
                    todos.push(item::from_item(raw)?);
                }
                match next {
                    Some(key) if !key.is_empty() => start = Some(key),
                    _ => break,
                }
            }

            tracing::info!(
                count = todos.len(),
                table_name = %self.config.table_name,
                "Fetched todos from DynamoDB"
            );
            Ok(todos)
        })
    }

    fn get_todo_by_id<'a>(&'a self, id: &'a TodoId) -> StoreFuture<'a, Option<Todo>> {
        Box::pin(async move {
            let output = self
                .bounded("get_todo_by_id", self.get_request(id).send())
                .await?
                .map_err(|e| self.failure("get_todo_by_id", &e))?;

            match output.item {
                Some(raw) if !raw.is_empty() => item::from_item(&raw).map(Some),
                _ => {
                    tracing::warn!(
                        todo_id = %id,
                        table_name = %self.config.table_name,
                        "Todo not found in DynamoDB"
                    );
                    Ok(None)
                }
            }
        })
    }

    fn update_todo<'a>(
        &'a self,
        id: &'a TodoId,
        update: TodoUpdate,
    ) -> StoreFuture<'a, Option<Todo>> {
        Box::pin(async move {
            let expression = UpdateExpression::build(&update, self.clock.now());

            let result = self
                .bounded(
                    "update_todo",
                    self.client
                        .update_item()
                        .table_name(&self.config.table_name)
                        .key(item::ID, key(id))
                        .update_expression(expression.update)
                        .condition_expression(expression.condition)
                        .set_expression_attribute_names(Some(expression.names))
                        .set_expression_attribute_values(Some(expression.values))
                        .return_values(ReturnValue::AllNew)
                        .send(),
                )
                .await?;

            match result {
                Ok(output) => {
                    let attributes = output.attributes.unwrap_or_default();
                    let todo = item::from_item(&attributes)?;
                    tracing::info!(
                        todo_id = %id,
                        table_name = %self.config.table_name,
                        "Todo updated in DynamoDB"
                    );
                    Ok(Some(todo))
                }
                Err(e)
                    if e.as_service_error()
                        .is_some_and(|service| service.is_conditional_check_failed_exception()) =>
                {
                    tracing::warn!(
                        todo_id = %id,
                        table_name = %self.config.table_name,
                        "Todo not found for update"
                    );
                    Ok(None)
                }
                Err(e) => Err(self.failure("update_todo", &e)),
            }
        })
    }

    fn delete_todo<'a>(&'a self, id: &'a TodoId) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let output = self
                .bounded(
                    "delete_todo",
                    self.client
                        .delete_item()
                        .table_name(&self.config.table_name)
                        .key(item::ID, key(id))
                        .return_values(ReturnValue::AllOld)
                        .send(),
                )
                .await?
                .map_err(|e| self.failure("delete_todo", &e))?;

            let existed = output.attributes.is_some_and(|old| !old.is_empty());
            if existed {
                tracing::info!(
                    todo_id = %id,
                    table_name = %self.config.table_name,
                    "Todo deleted from DynamoDB"
                );
            } else {
                tracing::warn!(
                    todo_id = %id,
                    table_name = %self.config.table_name,
                    "Todo not found for deletion"
                );
            }
            Ok(existed)
        })
    }

    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move {
            let mut total = 0usize;
            let mut start = None;

            loop {
                let output = self
                    .bounded("count", self.scan_request(start).select(Select::Count).send())
                    .await?
                    .map_err(|e| self.failure("count", &e))?;

                total += usize::try_from(output.count).unwrap_or_default();
                match output.last_evaluated_key {
                    Some(key) if !key.is_empty() => start = Some(key),
                    _ => break,
                }
            }

            Ok(total)
        })
    }
}
