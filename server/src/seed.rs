// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use common::{Category, Task};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::config::Config;
use crate::store::{CategoryStore, Stores, TaskStore};

const DEFAULT_SEED: &str = include_str!("../seed/default.json");

/// The initial dataset the stores are built from.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Seed {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Seed {
    /// The dataset bundled with the binary.
    pub fn bundled() -> Result<Self> {
        parse(DEFAULT_SEED, "bundled seed")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        parse(&data, &path.display().to_string())
    }

    /// Uses `path` when given, the bundled dataset otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Builds both stores, applying the latencies from `config`.
    pub fn into_stores(self, clock: Arc<dyn Clock>, config: &Config) -> Stores {
        info!(
            "Seeding stores with {} tasks and {} categories.",
            self.tasks.len(),
            self.categories.len()
        );
        Stores::new(
            TaskStore::new(self.tasks, clock).with_latency(config.task_latency()),
            CategoryStore::new(self.categories).with_latency(config.category_latency()),
        )
    }
}

fn parse(data: &str, origin: &str) -> Result<Seed> {
    let seed: Seed =
        serde_json::from_str(data).with_context(|| format!("Failed to parse {origin}"))?;

    check_ids(seed.tasks.iter().map(|t| t.id), "task", origin)?;
    check_ids(seed.categories.iter().map(|c| c.id), "category", origin)?;
    Ok(seed)
}

fn check_ids(ids: impl Iterator<Item = i64>, entity: &str, origin: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id <= 0 {
            bail!("{origin}: {entity} id {id} is not a positive integer");
        }
        if !seen.insert(id) {
            bail!("{origin}: duplicate {entity} id {id}");
        }
    }
    Ok(())
}
