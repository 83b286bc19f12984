//! Connection settings for the DynamoDB store.

use std::time::Duration;

/// Configuration for [`DynamoDbTodoStore`](crate::DynamoDbTodoStore).
///
/// # Examples
///
/// ```
/// use todo_api_dynamodb::DynamoDbConfig;
/// use std::time::Duration;
///
/// // Defaults: region us-east-1, no endpoint override, no timeout
/// let config = DynamoDbConfig::new("todos");
///
/// // DynamoDB Local with a bounded wait per call
/// let config = DynamoDbConfig::new("todos")
///     .with_endpoint("http://localhost:8000")
///     .with_request_timeout(Duration::from_secs(2));
/// assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8000"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbConfig {
    /// Table name
    pub table_name: String,
    /// AWS region (default: "us-east-1")
    pub region: String,
    /// Endpoint override, e.g. DynamoDB Local
    pub endpoint: Option<String>,
    /// Upper bound on each remote call; `None` leaves it to the SDK defaults
    pub request_timeout: Option<Duration>,
}

impl DynamoDbConfig {
    /// Create a configuration for `table_name` with default settings.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            region: "us-east-1".to_string(),
            endpoint: None,
            request_timeout: None,
        }
    }

    /// Set the AWS region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Point the client at a custom endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Bound every remote call; expiry is reported as storage unavailable.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = DynamoDbConfig::new("todos-test")
            .with_region("eu-west-1")
            .with_endpoint("http://localhost:8000")
            .with_request_timeout(Duration::from_millis(1500));

        assert_eq!(config.table_name, "todos-test");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.request_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn defaults() {
        let config = DynamoDbConfig::new("todos");
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
        assert!(config.request_timeout.is_none());
    }
}
