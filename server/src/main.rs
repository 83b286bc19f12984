//! Todo API server binary.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store
//! USE_MEMORY_STORE=true cargo run --bin todo-api
//!
//! # DynamoDB Local
//! docker run -p 8000:8000 amazon/dynamodb-local
//! DYNAMODB_ENDPOINT=http://localhost:8000 cargo run --bin todo-api
//! ```

use todo_api_server::{Config, run, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    telemetry::init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        memory_store = config.storage.use_memory_store,
        "Configuration loaded"
    );

    run(config).await
}
