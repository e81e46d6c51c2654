// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use thiserror::Error;

/// Errors raised by the task and category stores.
///
/// Every variant is local to one call and can be retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The call referenced an id (or category) the store does not hold.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A create or update payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// The query could not be served (simulated fault or transport failure).
    #[error("load failed: {0}")]
    Load(String),
}

impl StoreError {
    pub fn task_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Task",
            key: id.to_string(),
        }
    }

    pub fn category_not_found(key: impl ToString) -> Self {
        Self::NotFound {
            entity: "Category",
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
