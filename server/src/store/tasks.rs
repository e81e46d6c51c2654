// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{DEFAULT_CATEGORY, NewTask, Task, TaskPatch};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::fault::FaultInjector;
use crate::clock::Clock;
use crate::error::{StoreError, StoreResult};

struct TaskTable {
    // Storage order: most recently created first.
    tasks: Vec<Task>,
    // Highest id ever held or handed out.
    last_id: i64,
}

impl TaskTable {
    fn issue_id(&mut self) -> StoreResult<i64> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::validation("No task ids left to assign."))?;
        self.last_id = id;
        Ok(id)
    }

    fn position(&self, id: i64) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::task_not_found(id))
    }
}

/// The authoritative, in-memory collection of tasks.
///
/// Every call waits out the configured latency first and then runs to
/// completion under a single lock acquisition, so mutations never
/// interleave. Returned tasks are always clones.
pub struct TaskStore {
    table: RwLock<TaskTable>,
    clock: Arc<dyn Clock>,
    latency: RwLock<Duration>,
    faults: FaultInjector,
}

impl TaskStore {
    pub fn new(seed: Vec<Task>, clock: Arc<dyn Clock>) -> Self {
        let tasks: Vec<Task> = seed.into_iter().map(repair_completion).collect();
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            table: RwLock::new(TaskTable { tasks, last_id }),
            clock,
            latency: RwLock::new(Duration::ZERO),
            faults: FaultInjector::default(),
        }
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write() = latency;
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Raw storage order, without latency or fault checks.
    pub fn snapshot(&self) -> Vec<Task> {
        self.table.read().tasks.clone()
    }

    async fn pause(&self) {
        let latency = *self.latency.read();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    async fn query<F>(&self, what: &str, select: F) -> StoreResult<Vec<Task>>
    where
        F: FnOnce(&[Task]) -> Vec<Task>,
    {
        self.pause().await;
        self.faults.check_read(what)?;
        let tasks = select(&self.table.read().tasks);
        debug!("{} returned {} tasks", what, tasks.len());
        Ok(tasks)
    }

    /// All tasks: pending before completed, then by priority.
    pub async fn list(&self) -> StoreResult<Vec<Task>> {
        self.query("list tasks", |tasks| sorted(tasks.to_vec(), board_order))
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> StoreResult<Task> {
        self.pause().await;
        self.faults.check_read("get task")?;
        let table = self.table.read();
        let index = table.position(id)?;
        Ok(table.tasks[index].clone())
    }

    /// Tasks due on the current local calendar day, in board order.
    pub async fn list_due_today(&self) -> StoreResult<Vec<Task>> {
        let today = self.clock.today();
        self.query("list tasks due today", |tasks| {
            let due: Vec<Task> = tasks
                .iter()
                .filter(|t| t.due_date == Some(today))
                .cloned()
                .collect();
            sorted(due, board_order)
        })
        .await
    }

    /// Completed tasks, most recently completed first.
    pub async fn list_completed(&self) -> StoreResult<Vec<Task>> {
        self.query("list completed tasks", |tasks| {
            let done: Vec<Task> = tasks.iter().filter(|t| t.completed).cloned().collect();
            sorted(done, |a, b| b.completed_at.cmp(&a.completed_at))
        })
        .await
    }

    /// Pending tasks by priority.
    pub async fn list_pending(&self) -> StoreResult<Vec<Task>> {
        self.query("list pending tasks", |tasks| {
            let open: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
            sorted(open, |a, b| a.priority.cmp(&b.priority))
        })
        .await
    }

    /// Tasks filed under the category label `name`, in board order.
    pub async fn list_by_category(&self, name: &str) -> StoreResult<Vec<Task>> {
        self.query("list tasks by category", |tasks| {
            let filed: Vec<Task> = tasks
                .iter()
                .filter(|t| t.category == name)
                .cloned()
                .collect();
            sorted(filed, board_order)
        })
        .await
    }

    pub async fn create(&self, payload: NewTask) -> StoreResult<Task> {
        debug!(
            "Create task: title={:?}, priority={:?}, category={:?}, due_date={:?}",
            payload.title, payload.priority, payload.category, payload.due_date
        );
        let title = required_text(&payload.title, "Task title")?;
        let category = match payload.category.as_deref() {
            Some(label) => required_text(label, "Task category")?,
            None => DEFAULT_CATEGORY.to_string(),
        };

        self.pause().await;
        self.faults.check_write("create task")?;

        let created_at = self.clock.now();
        let mut table = self.table.write();
        let task = Task {
            id: table.issue_id()?,
            title,
            description: payload.description.unwrap_or_default(),
            priority: payload.priority.unwrap_or_default(),
            category,
            due_date: payload.due_date,
            completed: false,
            completed_at: None,
            created_at,
        };
        table.tasks.insert(0, task.clone());

        info!("Task created with ID: {}", task.id);
        Ok(task)
    }

    pub async fn update(&self, id: i64, patch: TaskPatch) -> StoreResult<Task> {
        debug!("Update task {}: {:?}", id, patch);
        let title = patch
            .title
            .as_deref()
            .map(|t| required_text(t, "Task title"))
            .transpose()?;
        let category = patch
            .category
            .as_deref()
            .map(|c| required_text(c, "Task category"))
            .transpose()?;

        self.pause().await;
        self.faults.check_write("update task")?;

        let now = self.clock.now();
        let mut table = self.table.write();
        let index = table.position(id)?;
        let task = &mut table.tasks[index];

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(category) = category {
            task.category = category;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = patch.completed {
            task.set_completed(completed, now);
        }

        info!("Task with ID {} updated.", id);
        Ok(task.clone())
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        self.pause().await;
        self.faults.check_write("delete task")?;

        let mut table = self.table.write();
        let index = table.position(id)?;
        table.tasks.remove(index);

        info!("Task with ID {} deleted.", id);
        Ok(())
    }

    /// Flips the completion state of a task.
    pub async fn toggle_complete(&self, id: i64) -> StoreResult<Task> {
        self.pause().await;
        self.faults.check_write("toggle task")?;

        let now = self.clock.now();
        let mut table = self.table.write();
        let index = table.position(id)?;
        let task = &mut table.tasks[index];
        let completed = !task.completed;
        task.set_completed(completed, now);

        info!("Task with ID {} marked completed={}.", id, completed);
        Ok(task.clone())
    }
}

/// Pending before completed; within the same state, more urgent first.
pub fn board_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.priority.cmp(&b.priority))
}

// `sort_by` is stable, so equal tasks keep storage order.
fn sorted(mut tasks: Vec<Task>, order: impl FnMut(&Task, &Task) -> Ordering) -> Vec<Task> {
    tasks.sort_by(order);
    tasks
}

pub(crate) fn required_text(value: &str, field: &str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(format!("{field} cannot be empty.")));
    }
    Ok(trimmed.to_string())
}

// Seed data is not trusted to honor the completion invariant.
fn repair_completion(mut task: Task) -> Task {
    if task.completion_is_consistent() {
        return task;
    }
    warn!(
        "Task {} has inconsistent completion state (completed={}, completed_at={:?}); repairing.",
        task.id, task.completed, task.completed_at
    );
    task.completed_at = if task.completed {
        Some(task.completed_at.unwrap_or(task.created_at).max(task.created_at))
    } else {
        None
    };
    task
}
