use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{SimvisError, SimvisResult};
use crate::sprite::cache::SpriteCache;
use crate::vector::model::VectorDescription;

/// Named sprite caches, one per icon.
#[derive(Debug, Default)]
pub struct IconSet {
    caches: BTreeMap<String, Arc<SpriteCache>>,
}

impl IconSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `desc` under `name`, replacing (and dropping the bitmaps of) any previous icon.
    pub fn insert(&mut self, name: impl Into<String>, desc: VectorDescription) -> Arc<SpriteCache> {
        let cache = Arc::new(SpriteCache::new(Arc::new(desc)));
        self.caches.insert(name.into(), Arc::clone(&cache));
        cache
    }

    /// Cache registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Arc<SpriteCache>> {
        self.caches.get(name)
    }

    /// Like [`Self::get`], but an unknown name is a configuration error.
    pub fn require(&self, name: &str) -> SimvisResult<&Arc<SpriteCache>> {
        self.get(name)
            .ok_or_else(|| SimvisError::config(format!("unknown icon '{name}'")))
    }

    /// Icon names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.caches.keys().map(String::as_str)
    }

    /// Number of icons.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Return `true` when no icon is registered.
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Load every `*.json` file in `dir` as a vector description keyed by its file stem.
    pub fn load_dir(dir: impl AsRef<Path>) -> SimvisResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read icon directory '{}'", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("list icon directory '{}'", dir.display()))?
                .path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut set = Self::new();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let desc = VectorDescription::from_path(&path).map_err(|e| match e {
                SimvisError::Config(msg) => {
                    SimvisError::config(format!("{}: {msg}", path.display()))
                }
                other => other,
            })?;
            let cache = set.insert(stem, desc);
            tracing::debug!(
                icon = stem,
                items = cache.description().draw_order().len(),
                "loaded icon"
            );
        }
        Ok(set)
    }
}
