// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::sync::Arc;

use common::{Category, CategoryPatch, NewCategory};
use tokio::sync::watch;
use tracing::{debug, error};

use super::{LOAD_CATEGORIES_FAILED, ViewCache, ViewSnapshot};
use crate::error::StoreResult;
use crate::notify::{Notice, Notifier};
use crate::store::CategoryStore;

/// A cached, alphabetical list of categories.
pub struct CategoryView {
    store: Arc<CategoryStore>,
    cache: ViewCache<Category>,
    notifier: Arc<dyn Notifier>,
}

impl CategoryView {
    pub fn new(store: Arc<CategoryStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            cache: ViewCache::new(),
            notifier,
        }
    }

    pub async fn mount(store: Arc<CategoryStore>, notifier: Arc<dyn Notifier>) -> Self {
        let view = Self::new(store, notifier);
        view.refetch().await;
        view
    }

    pub fn snapshot(&self) -> ViewSnapshot<Category> {
        self.cache.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot<Category>> {
        self.cache.subscribe()
    }

    pub async fn refetch(&self) {
        let generation = self.cache.begin_load();
        match self.store.list().await {
            Ok(categories) => {
                if !self.cache.finish_load(generation, Ok(categories)) {
                    debug!("Discarded stale category load (generation {})", generation);
                }
            }
            Err(err) => {
                error!("Error loading categories: {}", err);
                self.cache.finish_load(generation, Err(LOAD_CATEGORIES_FAILED));
            }
        }
    }

    /// Creates a category; it is appended to the cached list.
    pub async fn create(&self, payload: NewCategory) -> StoreResult<Category> {
        let category = self.report(
            self.store.create(payload).await,
            "Failed to create category",
        )?;
        self.cache.push(category.clone());
        self.notifier
            .notify(Notice::success("Category created successfully!"));
        Ok(category)
    }

    pub async fn update(&self, id: i64, patch: CategoryPatch) -> StoreResult<Category> {
        let category = self.report(
            self.store.update(id, patch).await,
            "Failed to update category",
        )?;
        self.cache.replace(category.clone());
        self.notifier
            .notify(Notice::success("Category updated successfully!"));
        Ok(category)
    }

    /// Deletes a category. Tasks filed under it keep their label.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        self.report(self.store.delete(id).await, "Failed to delete category")?;
        self.cache.remove(id);
        self.notifier
            .notify(Notice::success("Category deleted successfully!"));
        Ok(())
    }

    fn report<T>(&self, result: StoreResult<T>, failure: &str) -> StoreResult<T> {
        if let Err(err) = &result {
            error!("{}: {}", failure, err);
            self.notifier.notify(Notice::error(failure));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive;
    use crate::notify::{ChannelNotifier, NoticeLevel};
    use common::Task;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            color: "#5B4FE5".to_string(),
            task_count: 0,
        }
    }

    #[tokio::test]
    async fn test_mount_lists_alphabetically() {
        let store = Arc::new(CategoryStore::new(vec![category(1, "Work"), category(2, "Home")]));
        let view = CategoryView::mount(store, Arc::new(ChannelNotifier::new())).await;
        let names: Vec<String> = view.snapshot().items.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Home", "Work"]);
    }

    #[tokio::test]
    async fn test_crud_patches_cache() {
        let store = Arc::new(CategoryStore::new(vec![category(1, "Work")]));
        let notifier = Arc::new(ChannelNotifier::new());
        let mut rx = notifier.subscribe();
        let view = CategoryView::mount(store.clone(), notifier).await;

        let created = view
            .create(NewCategory {
                name: "Errands".to_string(),
                color: None,
            })
            .await
            .unwrap();
        assert_eq!(view.snapshot().items.last(), Some(&created));

        view.update(
            1,
            CategoryPatch {
                color: Some("#ff0000".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(view.snapshot().items[0].color, "#FF0000");

        view.delete(created.id).await.unwrap();
        assert_eq!(view.snapshot().items.len(), 1);

        assert_eq!(
            rx.recv().await.unwrap().message,
            "Category created successfully!"
        );
        assert_eq!(
            rx.recv().await.unwrap().message,
            "Category updated successfully!"
        );
        assert_eq!(
            rx.recv().await.unwrap().message,
            "Category deleted successfully!"
        );
    }

    #[tokio::test]
    async fn test_failures_keep_cache() {
        let store = Arc::new(CategoryStore::new(vec![category(1, "Work")]));
        let notifier = Arc::new(ChannelNotifier::new());
        let mut rx = notifier.subscribe();
        let view = CategoryView::mount(store.clone(), notifier).await;

        assert!(view.delete(7).await.is_err());
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Failed to delete category");

        store.faults().fail_reads(true);
        view.refetch().await;
        let snapshot = view.snapshot();
        assert_eq!(snapshot.error, LOAD_CATEGORIES_FAILED);
        assert_eq!(snapshot.items.len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_category_leaves_task_labels() {
        let store = Arc::new(CategoryStore::new(vec![category(1, "Work")]));
        let view = CategoryView::mount(store, Arc::new(ChannelNotifier::new())).await;
        let task: Task = serde_json::from_str(
            r#"{ "id": 1, "title": "t", "category": "Work", "createdAt": "2025-01-01T00:00:00Z" }"#,
        )
        .unwrap();

        view.delete(1).await.unwrap();
        let stats = derive::compute_stats(std::slice::from_ref(&task));
        assert_eq!(stats.total, 1);
        assert_eq!(derive::top_category(&[task]).category, "Work");
        assert!(derive::with_task_counts(&view.snapshot().items, &[]).is_empty());
    }
}
