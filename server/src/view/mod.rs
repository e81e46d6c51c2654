// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Cached, per-lens views over the stores.
//!
//! A view owns a copy of one filtered collection plus `loading`/`error`
//! status. Loads replace the copy wholesale; confirmed mutations patch it by
//! id. Every load takes a generation number and only the newest generation
//! is allowed to write its result, so a slow response to an old filter can
//! never overwrite a newer one.

mod categories;
mod filter;
mod tasks;

use std::sync::atomic::{AtomicU64, Ordering};

use common::{Category, Task};
use serde::Serialize;
use tokio::sync::watch;

pub use categories::CategoryView;
pub use filter::{CategoryRef, Selection, TaskFilter};
pub use tasks::TaskView;

pub const LOAD_TASKS_FAILED: &str = "Failed to load tasks. Please try again.";
pub const LOAD_CATEGORIES_FAILED: &str = "Failed to load categories. Please try again.";

/// What a consumer renders: the cached items and the load status.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
    /// Empty when the last load succeeded.
    pub error: String,
}

impl<T> ViewSnapshot<T> {
    fn initial() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error: String::new(),
        }
    }
}

/// Records with a stable store-assigned id.
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for Task {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Category {
    fn key(&self) -> i64 {
        self.id
    }
}

/// The state shared by every view: a watch channel holding the snapshot and
/// the load generation counter.
///
/// The generation is only bumped and compared while the channel's value is
/// locked, so starting a load and applying a result never race.
struct ViewCache<T> {
    state: watch::Sender<ViewSnapshot<T>>,
    generation: AtomicU64,
}

impl<T: Clone + Keyed> ViewCache<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(ViewSnapshot::initial());
        Self {
            state,
            generation: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> ViewSnapshot<T> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ViewSnapshot<T>> {
        self.state.subscribe()
    }

    /// Marks a load as started and returns its generation.
    fn begin_load(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            s.loading = true;
            s.error.clear();
        });
        generation
    }

    /// Applies a load result if `generation` is still the newest.
    ///
    /// On failure the cached items are kept. Returns whether the result was
    /// applied.
    fn finish_load(&self, generation: u64, result: Result<Vec<T>, &str>) -> bool {
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match result {
                Ok(items) => s.items = items,
                Err(message) => s.error = message.to_string(),
            }
            s.loading = false;
            true
        })
    }

    /// Inserts at the front unless a load is pending. The pending load
    /// replaces the items anyway.
    fn insert_front_settled(&self, item: T) -> bool {
        self.state.send_if_modified(|s| {
            if s.loading {
                return false;
            }
            s.items.insert(0, item);
            true
        })
    }

    fn push(&self, item: T) {
        self.state.send_modify(|s| s.items.push(item));
    }

    /// Swaps in a confirmed record. Records the view never held are ignored.
    fn replace(&self, item: T) {
        self.state.send_if_modified(|s| {
            match s.items.iter_mut().find(|existing| existing.key() == item.key()) {
                Some(existing) => {
                    *existing = item;
                    true
                }
                None => false,
            }
        });
    }

    fn remove(&self, key: i64) {
        self.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|existing| existing.key() != key);
            s.items.len() != before
        });
    }
}
