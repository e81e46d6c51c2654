// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::NaiveDate;
use common::Task;

use crate::error::{StoreError, StoreResult};
use crate::store::{CategoryStore, Stores};

/// How a category lens names its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(i64),
    Name(String),
}

impl CategoryRef {
    /// The category label tasks are filed under.
    pub async fn resolve(&self, categories: &CategoryStore) -> StoreResult<String> {
        match self {
            CategoryRef::Id(id) => Ok(categories.get_by_id(*id).await?.name),
            CategoryRef::Name(name) => Ok(name.clone()),
        }
    }
}

/// The key selecting which lens a task view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Today,
    Completed,
    Pending,
    Category(CategoryRef),
}

/// The tasks a filter selected, with the resolved category label for
/// category lenses.
#[derive(Debug, Clone)]
pub struct Selection {
    pub tasks: Vec<Task>,
    pub category: Option<String>,
}

impl TaskFilter {
    /// Parses a lens key (`all`, `today`, `completed`, `pending`). A category
    /// name, when given, takes precedence over the key.
    pub fn from_key(key: Option<&str>, category: Option<String>) -> StoreResult<Self> {
        if let Some(name) = category {
            return Ok(TaskFilter::Category(CategoryRef::Name(name)));
        }
        match key.unwrap_or("all") {
            "all" => Ok(TaskFilter::All),
            "today" => Ok(TaskFilter::Today),
            "completed" => Ok(TaskFilter::Completed),
            "pending" => Ok(TaskFilter::Pending),
            other => Err(StoreError::validation(format!("Unknown view: {other}"))),
        }
    }

    /// Runs the store query backing this lens.
    pub async fn query(&self, stores: &Stores) -> StoreResult<Selection> {
        let (tasks, category) = match self {
            TaskFilter::All => (stores.tasks.list().await?, None),
            TaskFilter::Today => (stores.tasks.list_due_today().await?, None),
            TaskFilter::Completed => (stores.tasks.list_completed().await?, None),
            TaskFilter::Pending => (stores.tasks.list_pending().await?, None),
            TaskFilter::Category(reference) => {
                let name = reference.resolve(&stores.categories).await?;
                let tasks = stores.tasks.list_by_category(&name).await?;
                (tasks, Some(name))
            }
        };
        Ok(Selection { tasks, category })
    }

    /// Whether `task` belongs in this lens. Category lenses need the label
    /// resolved by the last successful load.
    pub fn admits(&self, task: &Task, today: NaiveDate, category: Option<&str>) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Today => task.due_date == Some(today),
            TaskFilter::Completed => task.completed,
            TaskFilter::Pending => !task.completed,
            TaskFilter::Category(_) => category == Some(task.category.as_str()),
        }
    }
}
