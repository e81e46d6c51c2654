// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use crate::store::Stores;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates and configures the application router.
pub fn create_router(stores: Stores) -> Router {
    Router::new()
        // Lenses: `?view=all|today|pending|completed`, `?category=`, `?q=`
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/api/tasks/stats", get(handlers::task_stats))
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/api/tasks/{id}/toggle", post(handlers::toggle_task))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/api/categories/{id}/tasks", get(handlers::category_tasks))
        .layer(TraceLayer::new_for_http())
        // Adds the store handles to the application state
        .with_state(stores)
}
