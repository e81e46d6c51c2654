// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::sync::Arc;

use common::{NewTask, Task, TaskPatch};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error};

use super::{LOAD_TASKS_FAILED, TaskFilter, ViewCache, ViewSnapshot};
use crate::error::StoreResult;
use crate::notify::{Notice, Notifier};
use crate::store::Stores;

/// A cached lens over the task store.
///
/// Mutations go to the store first; the cache is only patched with what the
/// store confirmed. When two mutations on the same task are in flight, the
/// one that resolves last wins, in the store and in the cache alike.
pub struct TaskView {
    stores: Stores,
    filter: Mutex<TaskFilter>,
    // Lens of the cached items: the filter and resolved category label of
    // the last applied load.
    shown: Mutex<Option<(TaskFilter, Option<String>)>>,
    cache: ViewCache<Task>,
    notifier: Arc<dyn Notifier>,
}

impl TaskView {
    /// Creates the view without loading it. The snapshot starts out
    /// `loading` with no items.
    pub fn new(stores: Stores, filter: TaskFilter, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            stores,
            filter: Mutex::new(filter),
            shown: Mutex::new(None),
            cache: ViewCache::new(),
            notifier,
        }
    }

    /// Creates the view and performs the initial load.
    pub async fn mount(stores: Stores, filter: TaskFilter, notifier: Arc<dyn Notifier>) -> Self {
        let view = Self::new(stores, filter, notifier);
        view.refetch().await;
        view
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter.lock().clone()
    }

    pub fn snapshot(&self) -> ViewSnapshot<Task> {
        self.cache.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot<Task>> {
        self.cache.subscribe()
    }

    /// Switches the lens, reloading when the key actually changed.
    pub async fn set_filter(&self, filter: TaskFilter) {
        {
            let mut current = self.filter.lock();
            if *current == filter {
                return;
            }
            *current = filter;
        }
        self.refetch().await;
    }

    /// Reloads the current lens from the store.
    pub async fn refetch(&self) {
        let filter = self.filter();
        let generation = self.cache.begin_load();
        debug!("Loading {:?} (generation {})", filter, generation);

        match filter.query(&self.stores).await {
            Ok(selection) => {
                let mut shown = self.shown.lock();
                if self.cache.finish_load(generation, Ok(selection.tasks)) {
                    *shown = Some((filter.clone(), selection.category));
                } else {
                    debug!("Discarded stale load of {:?} (generation {})", filter, generation);
                }
            }
            Err(err) => {
                error!("Error loading tasks for {:?}: {}", filter, err);
                self.cache.finish_load(generation, Err(LOAD_TASKS_FAILED));
            }
        }
    }

    pub async fn create(&self, payload: NewTask) -> StoreResult<Task> {
        let task = self
            .report(self.stores.tasks.create(payload).await, "Failed to create task")?;
        {
            let shown = self.shown.lock();
            if let Some((filter, category)) = shown.as_ref() {
                let today = self.stores.tasks.clock().today();
                if filter.admits(&task, today, category.as_deref()) {
                    self.cache.insert_front_settled(task.clone());
                }
            }
        }
        self.notifier.notify(Notice::success("Task created successfully!"));
        Ok(task)
    }

    pub async fn update(&self, id: i64, patch: TaskPatch) -> StoreResult<Task> {
        let task = self.report(
            self.stores.tasks.update(id, patch).await,
            "Failed to update task",
        )?;
        self.cache.replace(task.clone());
        self.notifier.notify(Notice::success("Task updated successfully!"));
        Ok(task)
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        self.report(self.stores.tasks.delete(id).await, "Failed to delete task")?;
        self.cache.remove(id);
        self.notifier.notify(Notice::success("Task deleted successfully!"));
        Ok(())
    }

    pub async fn toggle_complete(&self, id: i64) -> StoreResult<Task> {
        let task = self.report(
            self.stores.tasks.toggle_complete(id).await,
            "Failed to update task",
        )?;
        self.cache.replace(task.clone());
        self.notifier.notify(if task.completed {
            Notice::success("Task completed! 🎉")
        } else {
            Notice::info("Task marked as incomplete")
        });
        Ok(task)
    }

    fn report<T>(&self, result: StoreResult<T>, failure: &str) -> StoreResult<T> {
        if let Err(err) = &result {
            error!("{}: {}", failure, err);
            self.notifier.notify(Notice::error(failure));
        }
        result
    }
}
