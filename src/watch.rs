//! Change notification for collection builders.
//!
//! Each builder owns one [`Subscription`] and tells the notifier which files
//! should wake it: its own component file plus whatever its current query
//! depends on. The set is replaced every time the builder re-arms.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  event   ┌──────────────────────────────┐  generation++  ┌──────────────┐
//! │  notify    │────────▶│ Registry                      │──────────────▶│ Subscription │
//! │ (parent    │          │  id → { paths, watch::Sender }│                │ (builder)    │
//! │  dirs)     │          └──────────────────────────────┘                └──────────────┘
//! └────────────┘
//! ```
//!
//! Subscriptions are level-triggered: a generation counter in a
//! `tokio::sync::watch` channel. Any number of fires before the builder looks
//! collapse into a single wake-up, so there is never a backlog of re-runs.

use crate::{
    log,
    utils::path::{is_temp_file, normalize_path},
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::watch;

// =============================================================================
// Subscription
// =============================================================================

/// Wake-up handle of one builder.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: watch::Receiver<u64>,
}

impl Subscription {
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Wait until something fired since the last [`settle`](Self::settle).
    ///
    /// Returns `false` once the notifier is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Mark every fire so far as seen.
    pub fn settle(&mut self) {
        self.rx.borrow_and_update();
    }
}

/// Source of change notifications.
pub trait ChangeNotifier: Send + Sync + 'static {
    fn subscribe(&self) -> Subscription;

    /// Replace the set of files that fire `subscription`.
    fn watch(&self, subscription: &Subscription, paths: &[PathBuf]) -> Result<()>;
}

// =============================================================================
// Registry
// =============================================================================

struct Entry {
    paths: FxHashSet<PathBuf>,
    tx: watch::Sender<u64>,
}

/// Subscriptions and the paths they watch.
#[derive(Default)]
pub struct Registry {
    next_id: AtomicU64,
    entries: Mutex<FxHashMap<u64, Entry>>,
}

impl Registry {
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(0);
        self.entries.lock().insert(
            id,
            Entry {
                paths: FxHashSet::default(),
                tx,
            },
        );
        Subscription { id, rx }
    }

    pub fn set_paths(&self, id: u64, paths: FxHashSet<PathBuf>) {
        if let Some(entry) = self.entries.lock().get_mut(&id) {
            entry.paths = paths;
        }
    }

    /// Fire every subscription watching `path`. Returns how many fired.
    pub fn fire(&self, path: &Path) -> usize {
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.tx.is_closed());

        let mut fired = 0;
        for entry in entries.values().filter(|e| e.paths.contains(path)) {
            entry.tx.send_modify(|n| *n = n.wrapping_add(1));
            fired += 1;
        }
        fired
    }

    /// Drop every subscription; their `changed()` returns `false` from now on.
    #[cfg(test)]
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// A bare registry is a notifier nobody fires; one-shot builds use it.
impl ChangeNotifier for Registry {
    fn subscribe(&self) -> Subscription {
        Registry::subscribe(self)
    }

    fn watch(&self, subscription: &Subscription, paths: &[PathBuf]) -> Result<()> {
        self.set_paths(subscription.id(), paths.iter().cloned().collect());
        Ok(())
    }
}

/// Key a watched path by its canonical parent plus file name, so the key
/// stays stable even after the file itself is removed.
fn watch_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => normalize_path(parent).join(name),
        _ => normalize_path(path),
    }
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Filesystem notifier
// =============================================================================

/// [`ChangeNotifier`] backed by `notify`.
///
/// Parent directories are watched non-recursively so that editors replacing
/// a file on save are still seen.
pub struct FsNotifier {
    registry: Arc<Registry>,
    watcher: Mutex<RecommendedWatcher>,
    watched_dirs: Mutex<FxHashSet<PathBuf>>,
}

impl FsNotifier {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::default());
        let handler = Arc::clone(&registry);

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_relevant(&event) => {
                for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
                    handler.fire(&watch_key(path));
                }
            }
            Ok(_) => {}
            Err(e) => log!("watch"; "error: {e}"),
        })
        .context("Failed to create file watcher")?;

        Ok(Self {
            registry,
            watcher: Mutex::new(watcher),
            watched_dirs: Mutex::new(FxHashSet::default()),
        })
    }

    fn watch_dir(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() || self.watched_dirs.lock().contains(dir) {
            return Ok(());
        }

        self.watcher
            .lock()
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        self.watched_dirs.lock().insert(dir.to_path_buf());
        Ok(())
    }
}

impl ChangeNotifier for FsNotifier {
    fn subscribe(&self) -> Subscription {
        self.registry.subscribe()
    }

    fn watch(&self, subscription: &Subscription, paths: &[PathBuf]) -> Result<()> {
        let keys: FxHashSet<PathBuf> = paths.iter().map(|p| watch_key(p)).collect();

        for key in &keys {
            if let Some(dir) = key.parent() {
                self.watch_dir(dir)?;
            }
        }

        self.registry.set_paths(subscription.id(), keys);
        Ok(())
    }
}

// =============================================================================
// Test double
// =============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;

    /// In-memory notifier: tests fire paths by hand.
    #[derive(Default)]
    pub struct ManualNotifier {
        registry: Registry,
        watched: Mutex<FxHashMap<u64, Vec<PathBuf>>>,
    }

    impl ManualNotifier {
        pub fn fire(&self, path: &Path) -> usize {
            self.registry.fire(path)
        }

        pub fn watched(&self, subscription: &Subscription) -> Vec<PathBuf> {
            self.watched
                .lock()
                .get(&subscription.id())
                .cloned()
                .unwrap_or_default()
        }

        pub fn close(&self) {
            self.registry.clear();
        }
    }

    impl ChangeNotifier for ManualNotifier {
        fn subscribe(&self) -> Subscription {
            self.registry.subscribe()
        }

        fn watch(&self, subscription: &Subscription, paths: &[PathBuf]) -> Result<()> {
            self.watched
                .lock()
                .insert(subscription.id(), paths.to_vec());
            ChangeNotifier::watch(&self.registry, subscription, paths)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fire_wakes_matching_subscription() {
        let registry = Registry::default();
        let mut sub = registry.subscribe();
        registry.set_paths(sub.id(), [PathBuf::from("/a.js")].into_iter().collect());

        assert_eq!(registry.fire(Path::new("/b.js")), 0);
        assert_eq!(registry.fire(Path::new("/a.js")), 1);
        assert!(sub.changed().await);
    }

    #[tokio::test]
    async fn test_fires_collapse_into_one_wake_up() {
        let registry = Registry::default();
        let mut sub = registry.subscribe();
        registry.set_paths(sub.id(), [PathBuf::from("/a.js")].into_iter().collect());

        for _ in 0..5 {
            registry.fire(Path::new("/a.js"));
        }
        assert!(sub.changed().await);
        sub.settle();

        let again = tokio::time::timeout(Duration::from_millis(20), sub.changed()).await;
        assert!(again.is_err(), "no second wake-up expected");
    }

    #[tokio::test]
    async fn test_clear_ends_subscription() {
        let registry = Registry::default();
        let mut sub = registry.subscribe();

        registry.clear();
        assert!(!sub.changed().await);
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let registry = Registry::default();
        let sub = registry.subscribe();
        registry.set_paths(sub.id(), [PathBuf::from("/a.js")].into_iter().collect());
        drop(sub);

        assert_eq!(registry.fire(Path::new("/a.js")), 0);
        assert!(registry.entries.lock().is_empty());
    }

    #[test]
    fn test_set_paths_replaces_previous_set() {
        let registry = Registry::default();
        let sub = registry.subscribe();
        registry.set_paths(sub.id(), [PathBuf::from("/old.json")].into_iter().collect());
        registry.set_paths(sub.id(), [PathBuf::from("/new.json")].into_iter().collect());

        assert_eq!(registry.fire(Path::new("/old.json")), 0);
        assert_eq!(registry.fire(Path::new("/new.json")), 1);
    }

    #[test]
    fn test_watch_key_survives_removal() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("{unstable_id}.js");
        std::fs::write(&file, "").unwrap();
        let before = watch_key(&file);
        std::fs::remove_file(&file).unwrap();

        assert_eq!(watch_key(&file), before);
    }

    #[test]
    fn test_fs_notifier_watches_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("page.js");
        std::fs::write(&file, "").unwrap();
        let notifier = FsNotifier::new().unwrap();
        let sub = notifier.subscribe();

        notifier
            .watch(&sub, &[file.clone(), dir.path().join("missing/data.json")])
            .unwrap();

        let dirs = notifier.watched_dirs.lock();
        assert!(dirs.contains(&normalize_path(dir.path())));
        assert_eq!(dirs.len(), 1);
    }
}
