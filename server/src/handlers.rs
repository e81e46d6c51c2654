// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use axum::{
    extract::{FromRequest, Json, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{Category, CategoryPatch, NewCategory, NewTask, Task, TaskPatch};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::derive::{self, CategoryCount, TaskStats};
use crate::error::StoreError;
use crate::store::Stores;
use crate::view::{CategoryRef, TaskFilter};

/// Query string accepted by the task listing endpoints.
#[derive(Deserialize, Debug, Default)]
pub struct TaskQuery {
    /// `all` (default), `today`, `pending` or `completed`.
    pub view: Option<String>,
    /// Category label; overrides `view`.
    pub category: Option<String>,
    /// Search term matched against title, description and category.
    pub q: Option<String>,
}

impl TaskQuery {
    async fn fetch(self, stores: &Stores) -> Result<Vec<Task>, AppError> {
        let filter = TaskFilter::from_key(self.view.as_deref(), self.category)?;
        let tasks = filter.query(stores).await?.tasks;
        Ok(match self.q {
            Some(term) => derive::search_filter(&tasks, &term),
            None => tasks,
        })
    }
}

/// JSON request bodies. Malformed bodies are rejected as an [`AppError`] so
/// clients always get the `{"error": ...}` shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub stats: TaskStats,
    pub top_category: CategoryCount,
}

/// Handler for listing the tasks of one lens.
pub async fn list_tasks(
    State(stores): State<Stores>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    debug!("Listing tasks: {:?}", query);
    let tasks = query.fetch(&stores).await?;
    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(tasks))
}

/// Handler for the statistics of one lens.
pub async fn task_stats(
    State(stores): State<Stores>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let tasks = query.fetch(&stores).await?;
    Ok(Json(StatsResponse {
        stats: derive::compute_stats(&tasks),
        top_category: derive::top_category(&tasks),
    }))
}

pub async fn get_task(
    State(stores): State<Stores>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(stores.tasks.get_by_id(task_id).await?))
}

/// Handler for creating a new task.
pub async fn create_task(
    State(stores): State<Stores>,
    AppJson(payload): AppJson<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    debug!("Received request to create task: {:?}", payload.title);
    let task = stores.tasks.create(payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(stores): State<Stores>,
    Path(task_id): Path<i64>,
    AppJson(patch): AppJson<TaskPatch>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(stores.tasks.update(task_id, patch).await?))
}

/// Handler for deleting a task by ID.
pub async fn delete_task(
    State(stores): State<Stores>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Attempting to delete task with ID: {}", task_id);
    stores.tasks.delete(task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for flipping a task between pending and completed.
pub async fn toggle_task(
    State(stores): State<Stores>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(stores.tasks.toggle_complete(task_id).await?))
}

/// Handler for listing categories, with task counts derived from the
/// current tasks.
pub async fn list_categories(
    State(stores): State<Stores>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = stores.categories.list().await?;
    let tasks = stores.tasks.list().await?;
    Ok(Json(derive::with_task_counts(&categories, &tasks)))
}

pub async fn get_category(
    State(stores): State<Stores>,
    Path(category_id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(stores.categories.get_by_id(category_id).await?))
}

pub async fn create_category(
    State(stores): State<Stores>,
    AppJson(payload): AppJson<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = stores.categories.create(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(stores): State<Stores>,
    Path(category_id): Path<i64>,
    AppJson(patch): AppJson<CategoryPatch>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(stores.categories.update(category_id, patch).await?))
}

/// Handler for deleting a category. Its tasks are left alone.
pub async fn delete_category(
    State(stores): State<Stores>,
    Path(category_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    stores.categories.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for the tasks filed under one category.
pub async fn category_tasks(
    State(stores): State<Stores>,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<Task>>, AppError> {
    let filter = TaskFilter::Category(CategoryRef::Id(category_id));
    Ok(Json(filter.query(&stores).await?.tasks))
}

// --- Custom Error Handling ---

/// Our custom error type for the application.
#[derive(Debug)]
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

/// Maps store errors onto HTTP statuses. Load failures are not
/// differentiated by cause.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, &err.to_string()),
            StoreError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, &message),
            StoreError::Load(cause) => {
                tracing::error!("Store unavailable: {}", cause);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The task store is temporarily unavailable. Please try again.",
                )
            }
        }
    }
}

/// Body rejections (bad JSON, wrong field types) are client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &rejection.body_text())
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
