//! In-memory page store.
//!
//! Thread-safe map of every registered page, keyed by path. Writes bump a
//! version counter so a watcher can mirror the store to disk.

use super::types::{PageRequest, PageSink};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::{collections::BTreeMap, fs, path::Path};
use tokio::sync::watch;

#[derive(Debug)]
pub struct PageStore {
    pages: RwLock<BTreeMap<String, PageRequest>>,
    version: watch::Sender<u64>,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore {
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(BTreeMap::new()),
            version: watch::channel(0).0,
        }
    }

    /// Receiver that changes whenever a page is created or deleted.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<PageRequest> {
        self.pages.read().get(path).cloned()
    }

    #[cfg(test)]
    pub fn contains(&self, path: &str) -> bool {
        self.pages.read().contains_key(path)
    }

    /// All pages, sorted by path.
    pub fn snapshot(&self) -> Vec<PageRequest> {
        self.pages.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pages.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pages.read().is_empty()
    }

    /// Write every page as pretty JSON, creating parent directories.
    pub fn write_manifest(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

impl PageSink for PageStore {
    fn create_page(&self, page: PageRequest) {
        let changed = {
            let mut pages = self.pages.write();
            let changed = pages.get(&page.path) != Some(&page);
            pages.insert(page.path.clone(), page);
            changed
        };
        if changed {
            self.bump();
        }
    }

    fn delete_page(&self, path: &str, component: &Path) {
        let removed = {
            let mut pages = self.pages.write();
            match pages.get(path) {
                Some(page) if page.component == component => pages.remove(path).is_some(),
                _ => false,
            }
        };
        if removed {
            self.bump();
        }
    }
}
