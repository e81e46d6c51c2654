// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
pub mod categories;
pub mod fault;
pub mod tasks;

use std::sync::Arc;

pub use categories::CategoryStore;
pub use fault::FaultInjector;
pub use tasks::TaskStore;

/// Handles to the two stores, built once at startup and passed to every
/// consumer (HTTP handlers, view accessors).
#[derive(Clone)]
pub struct Stores {
    pub tasks: Arc<TaskStore>,
    pub categories: Arc<CategoryStore>,
}

impl Stores {
    pub fn new(tasks: TaskStore, categories: CategoryStore) -> Self {
        Self {
            tasks: Arc::new(tasks),
            categories: Arc::new(categories),
        }
    }
}
