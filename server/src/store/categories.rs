// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::time::Duration;

use common::{Category, CategoryPatch, NewCategory};
use parking_lot::RwLock;
use tracing::{debug, info};

use super::fault::FaultInjector;
use super::tasks::required_text;
use crate::colors;
use crate::error::{StoreError, StoreResult};

struct CategoryTable {
    categories: Vec<Category>,
    // Highest id ever held or handed out.
    last_id: i64,
}

impl CategoryTable {
    fn issue_id(&mut self) -> StoreResult<i64> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::validation("No category ids left to assign."))?;
        self.last_id = id;
        Ok(id)
    }

    fn position(&self, id: i64) -> StoreResult<usize> {
        self.categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::category_not_found(id))
    }
}

/// The authoritative, in-memory collection of categories.
///
/// Deleting a category never touches tasks filed under it.
pub struct CategoryStore {
    table: RwLock<CategoryTable>,
    latency: RwLock<Duration>,
    faults: FaultInjector,
}

impl CategoryStore {
    pub fn new(seed: Vec<Category>) -> Self {
        let last_id = seed.iter().map(|c| c.id).max().unwrap_or(0);
        Self {
            table: RwLock::new(CategoryTable {
                categories: seed,
                last_id,
            }),
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

    pub fn snapshot(&self) -> Vec<Category> {
        self.table.read().categories.clone()
    }

    async fn pause(&self) {
        let latency = *self.latency.read();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    /// All categories, alphabetical by name.
    pub async fn list(&self) -> StoreResult<Vec<Category>> {
        self.pause().await;
        self.faults.check_read("list categories")?;
        let mut categories = self.table.read().categories.clone();
        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        debug!("list categories returned {} categories", categories.len());
        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i64) -> StoreResult<Category> {
        self.pause().await;
        self.faults.check_read("get category")?;
        let table = self.table.read();
        let index = table.position(id)?;
        Ok(table.categories[index].clone())
    }

    /// Looks a category up by its exact name.
    pub async fn find_by_name(&self, name: &str) -> StoreResult<Category> {
        self.pause().await;
        self.faults.check_read("find category")?;
        self.table
            .read()
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| StoreError::category_not_found(name))
    }

    pub async fn create(&self, payload: NewCategory) -> StoreResult<Category> {
        debug!(
            "Create category: name={:?}, color={:?}",
            payload.name, payload.color
        );
        let name = required_text(&payload.name, "Category name")?;
        let color = colors::resolve_color(payload.color.as_deref())?;

        self.pause().await;
        self.faults.check_write("create category")?;

        let mut table = self.table.write();
        let category = Category {
            id: table.issue_id()?,
            name,
            color,
            task_count: 0,
        };
        table.categories.push(category.clone());

        info!("Category created with ID: {}", category.id);
        Ok(category)
    }

    pub async fn update(&self, id: i64, patch: CategoryPatch) -> StoreResult<Category> {
        debug!("Update category {}: {:?}", id, patch);
        let name = patch
            .name
            .as_deref()
            .map(|n| required_text(n, "Category name"))
            .transpose()?;
        let color = patch
            .color
            .as_deref()
            .map(colors::normalize_hex)
            .transpose()?;

        self.pause().await;
        self.faults.check_write("update category")?;

        let mut table = self.table.write();
        let index = table.position(id)?;
        let category = &mut table.categories[index];
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(color) = color {
            category.color = color;
        }
        if let Some(task_count) = patch.task_count {
            category.task_count = task_count;
        }

        info!("Category with ID {} updated.", id);
        Ok(category.clone())
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        self.pause().await;
        self.faults.check_write("delete category")?;

        let mut table = self.table.write();
        let index = table.position(id)?;
        table.categories.remove(index);

        info!("Category with ID {} deleted.", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::DEFAULT_CATEGORY_COLOR;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            color: "#3B82F6".to_string(),
            task_count: 3,
        }
    }

    #[tokio::test]
    async fn test_list_is_alphabetical() {
        let store = CategoryStore::new(vec![
            category(1, "Work"),
            category(2, "errands"),
            category(3, "Health"),
        ]);
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["errands", "Health", "Work"]);
    }

    #[tokio::test]
    async fn test_create_defaults_color_and_count() {
        let store = CategoryStore::new(vec![category(4, "Work")]);
        let created = store
            .create(NewCategory {
                name: "Reading".to_string(),
                color: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id, 5);
        assert_eq!(created.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(created.task_count, 0);
        assert_eq!(store.get_by_id(5).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_empty_store_starts_ids_at_one() {
        let store = CategoryStore::new(vec![]);
        let created = store
            .create(NewCategory {
                name: "First".to_string(),
                color: Some("#10b981".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.color, "#10B981");
    }

    #[tokio::test]
    async fn test_create_validates_name_and_color() {
        let store = CategoryStore::new(vec![]);
        let blank = store.create(NewCategory::default()).await.unwrap_err();
        assert_eq!(blank, StoreError::validation("Category name cannot be empty."));

        let bad_color = store
            .create(NewCategory {
                name: "Art".to_string(),
                color: Some("purple".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(bad_color, StoreError::Validation(_)));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let store = CategoryStore::new(vec![category(2, "Work")]);
        let updated = store
            .update(
                2,
                CategoryPatch {
                    name: Some("Office".to_string()),
                    ..CategoryPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.name, "Office");
        assert_eq!(updated.color, "#3B82F6");
    }

    #[tokio::test]
    async fn test_delete_and_missing_ids() {
        let store = CategoryStore::new(vec![category(1, "Work")]);
        store.delete(1).await.unwrap();
        assert_eq!(
            store.get_by_id(1).await.unwrap_err(),
            StoreError::category_not_found(1)
        );
        assert!(matches!(
            store.update(1, CategoryPatch::default()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(store.delete(1).await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_trims_color() {
        let store = CategoryStore::new(vec![category(1, "Work")]);
        let updated = store
            .update(
                1,
                CategoryPatch {
                    color: Some(" #abc ".to_string()),
                    ..CategoryPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.color, "#ABC");
    }

    #[tokio::test]
    async fn test_exhausted_ids_are_a_validation_error() {
        let store = CategoryStore::new(vec![category(i64::MAX, "Last")]);
        let err = store
            .create(NewCategory {
                name: "One more".to_string(),
                color: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let store = CategoryStore::new(vec![category(1, "Work"), category(2, "Home")]);
        assert_eq!(store.find_by_name("Home").await.unwrap().id, 2);
        assert!(matches!(
            store.find_by_name("home").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
