//! Todo collection and item endpoints.
//!
//! Handlers validate input, call the store once, translate the outcome to an
//! HTTP response, and keep the Todo metrics current. They never branch on
//! which backend is in use.

use crate::WebResult;
use crate::error::AppError;
use crate::extractors::ApiJson;
use crate::metrics;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use todo_api_core::{Title, Todo, TodoId, TodoStore, TodoUpdate, ValidationError};

/// Body of `POST /api/v1/todos`.
///
/// Fields are kept as raw JSON so a missing or non-string title is reported
/// as a validation failure rather than a malformed body.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    /// Title to validate
    #[serde(default)]
    pub title: Option<Value>,
}

/// Body of `PATCH /api/v1/todos/:id`. Omitted (or null) fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    /// New title, if changing
    #[serde(default)]
    pub title: Option<Value>,
    /// New completion flag, if changing
    #[serde(default)]
    pub done: Option<Value>,
}

impl UpdateTodoRequest {
    fn into_update(self) -> Result<TodoUpdate, ValidationError> {
        let title = self.title.as_ref().map(parse_title).transpose()?;
        let done = match self.done {
            None => None,
            Some(Value::Bool(done)) => Some(done),
            Some(_) => return Err(ValidationError::DoneNotBoolean),
        };
        Ok(TodoUpdate { title, done })
    }
}

fn parse_title(value: &Value) -> Result<Title, ValidationError> {
    match value {
        Value::String(raw) => Title::parse(raw),
        _ => Err(ValidationError::TitleRequired),
    }
}

/// `{success:true, count, data:[...]}`
#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    /// Always true
    pub success: bool,
    /// Number of Todos in `data`
    pub count: usize,
    /// The Todos
    pub data: Vec<Todo>,
}

/// `{success:true, data}`
#[derive(Debug, Serialize)]
pub struct TodoResponse {
    /// Always true
    pub success: bool,
    /// The Todo
    pub data: Todo,
}

impl From<Todo> for TodoResponse {
    fn from(data: Todo) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{success:true, id}`
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    /// Always true
    pub success: bool,
    /// Id of the deleted Todo
    pub id: TodoId,
}

/// Refresh the `todos_total` gauge from a fresh count after create or delete.
///
/// A failed count leaves the gauge stale; the request that triggered it
/// already succeeded, so it is not failed after the fact.
async fn refresh_total(store: &dyn TodoStore) {
    match store.count().await {
        Ok(total) => metrics::set_todos_total(total),
        Err(error) => tracing::warn!(%error, "Could not refresh todo gauge"),
    }
}

/// `GET /api/v1/todos`
///
/// # Errors
///
/// 500 "Failed to fetch todos" if the store fails.
pub async fn list_todos(State(state): State<AppState>) -> WebResult<Json<TodoListResponse>> {
    let todos = state
        .store
        .get_todos()
        .await
        .map_err(|e| AppError::storage("Failed to fetch todos", e))?;

    metrics::set_todos_total(todos.len());

    Ok(Json(TodoListResponse {
        success: true,
        count: todos.len(),
        data: todos,
    }))
}

/// `POST /api/v1/todos`
///
/// # Errors
///
/// 400 on an invalid title, 500 "Failed to create todo" if the store fails.
pub async fn create_todo(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTodoRequest>,
) -> WebResult<(StatusCode, Json<TodoResponse>)> {
    let title = body
        .title
        .as_ref()
        .map_or(Err(ValidationError::TitleRequired), parse_title)?;

    let todo = state
        .store
        .create_todo(title)
        .await
        .map_err(|e| AppError::storage("Failed to create todo", e))?;

    metrics::record_todo_created();
    refresh_total(state.store.as_ref()).await;

    Ok((StatusCode::CREATED, Json(todo.into())))
}

/// `GET /api/v1/todos/:id`
///
/// # Errors
///
/// 404 if absent, 500 "Failed to fetch todo" if the store fails.
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<TodoResponse>> {
    let id = TodoId::from(id);
    let todo = state
        .store
        .get_todo_by_id(&id)
        .await
        .map_err(|e| AppError::storage("Failed to fetch todo", e))?
        .ok_or_else(|| AppError::todo_not_found(&id))?;

    Ok(Json(todo.into()))
}

/// `PATCH /api/v1/todos/:id`
///
/// # Errors
///
/// 400 on invalid fields, 404 if absent, 500 "Failed to update todo" if the
/// store fails.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateTodoRequest>,
) -> WebResult<Json<TodoResponse>> {
    let id = TodoId::from(id);
    let update = body.into_update()?;

    let todo = state
        .store
        .update_todo(&id, update)
        .await
        .map_err(|e| AppError::storage("Failed to update todo", e))?
        .ok_or_else(|| AppError::todo_not_found(&id))?;

    Ok(Json(todo.into()))
}

/// `DELETE /api/v1/todos/:id`
///
/// # Errors
///
/// 404 if absent, 500 "Failed to delete todo" if the store fails.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<DeletedResponse>> {
    let id = TodoId::from(id);
    let existed = state
        .store
        .delete_todo(&id)
        .await
        .map_err(|e| AppError::storage("Failed to delete todo", e))?;

    if !existed {
        return Err(AppError::todo_not_found(&id));
    }

    refresh_total(state.store.as_ref()).await;

    Ok(Json(DeletedResponse { success: true, id }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update_from(body: Value) -> Result<TodoUpdate, ValidationError> {
        serde_json::from_value::<UpdateTodoRequest>(body)
            .unwrap()
            .into_update()
    }

    #[test]
    fn test_non_string_title_is_required_error() {
        assert_eq!(parse_title(&json!(42)), Err(ValidationError::TitleRequired));
        assert_eq!(parse_title(&json!("   ")), Err(ValidationError::TitleRequired));
        assert_eq!(parse_title(&json!("ok")).unwrap().as_str(), "ok");
    }

    #[test]
    fn test_update_keeps_omitted_fields_unset() {
        let update = update_from(json!({ "done": true })).unwrap();
        assert_eq!(update, TodoUpdate::done(true));

        let update = update_from(json!({ "title": null })).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_rejects_non_boolean_done() {
        assert_eq!(
            update_from(json!({ "done": "yes" })),
            Err(ValidationError::DoneNotBoolean)
        );
    }

    #[test]
    fn test_update_rejects_blank_title() {
        assert_eq!(
            update_from(json!({ "title": "", "done": true })),
            Err(ValidationError::TitleRequired)
        );
    }
}
