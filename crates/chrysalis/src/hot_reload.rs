//! Shared catalog with hot-reload support
//!
//! Readers take an `Arc` snapshot of the current [`CatalogIndex`]; a reload
//! builds the replacement index without holding the lock and then swaps the
//! `Arc`, so a reader never sees a half-built catalog.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use chrysalis_catalog::{CatalogData, CatalogIndex, CatalogLoadError};
use web_time::Instant;

/// The process-wide catalog
#[derive(Debug, Default)]
pub struct SharedCatalog {
    current: RwLock<Arc<CatalogIndex>>,
}

impl SharedCatalog {
    pub fn new(index: CatalogIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// Load and index a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let data = CatalogData::load(path)?;
        Ok(Self::new(CatalogIndex::build(&data)))
    }

    /// Current catalog; stays valid across later reloads
    pub fn snapshot(&self) -> Arc<CatalogIndex> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new catalog, returning the previous one
    pub fn replace(&self, index: CatalogIndex) -> Arc<CatalogIndex> {
        let index = Arc::new(index);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, index)
    }

    /// Rebuild from `path`. On failure the current catalog stays in place.
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<(), CatalogLoadError> {
        let path = path.as_ref();
        let data = CatalogData::load(path)?;
        let index = CatalogIndex::build(&data);
        log::info!(
            "Reloaded catalog {} ({} sprites, {} skipped)",
            path.display(),
            index.sprite_count(),
            index.skipped_entries()
        );
        self.replace(index);
        Ok(())
    }
}

/// Polls a catalog file's modification time and reloads it on change.
///
/// Checks are rate-limited by `check_interval`.
#[derive(Debug)]
pub struct CatalogReloader {
    path: PathBuf,
    /// Last time we checked for changes
    last_check: Instant,
    check_interval: Duration,
    /// Modification time of the catalog currently loaded
    modified: Option<SystemTime>,
}

impl CatalogReloader {
    /// Start watching `path`; its current state counts as already loaded
    pub fn new(path: impl Into<PathBuf>, check_interval: Duration) -> Self {
        let path = path.into();
        let modified = modified_time(&path);
        Self {
            path,
            last_check: Instant::now(),
            check_interval,
            modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_check_interval(&mut self, interval: Duration) {
        self.check_interval = interval;
    }

    /// True if the file changed since the last detected change.
    ///
    /// Returns false without touching the filesystem while rate-limited.
    pub fn check_for_changes(&mut self) -> bool {
        if self.last_check.elapsed() < self.check_interval {
            return false;
        }
        self.last_check = Instant::now();

        let Some(modified) = modified_time(&self.path) else {
            return false;
        };
        if self.modified.is_some_and(|previous| modified <= previous) {
            return false;
        }

        log::info!("Detected {} modification", self.path.display());
        self.modified = Some(modified);
        true
    }

    /// Force a check on the next call (resets the rate limit timer)
    pub fn force_check(&mut self) {
        self.last_check = Instant::now()
            .checked_sub(self.check_interval + Duration::from_secs(1))
            .unwrap_or(self.last_check);
    }

    /// Reload `catalog` if the file changed. Returns whether a reload happened.
    pub fn poll(&mut self, catalog: &SharedCatalog) -> Result<bool, CatalogLoadError> {
        if !self.check_for_changes() {
            return Ok(false);
        }
        catalog.reload_from(&self.path)?;
        Ok(true)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ONE_MOTH: &str = r#"(sprites: [(level: 0, family: "moth", sprite_id: Some("m1"), asset_path: "m1.png", display_name: "M1")])"#;
    const TWO_MOTHS: &str = r#"(sprites: [
        (level: 0, family: "moth", sprite_id: Some("m1"), asset_path: "m1.png", display_name: "M1"),
        (level: 0, family: "moth", sprite_id: Some("m2"), asset_path: "m2.png", display_name: "M2"),
    ])"#;

    fn write_catalog(path: &Path, contents: &str, bump_secs: u64) {
        fs::write(path, contents).unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(bump_secs))
            .unwrap();
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedCatalog::default();
        let before = shared.snapshot();
        assert!(before.is_empty());

        let data = CatalogData::from_ron_str(ONE_MOTH).unwrap();
        shared.replace(CatalogIndex::build(&data));

        assert!(before.is_empty());
        assert_eq!(shared.snapshot().sprite_count(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_current_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        fs::write(&path, ONE_MOTH).unwrap();
        let shared = SharedCatalog::load(&path).unwrap();

        fs::write(&path, "(sprites: [").unwrap();
        assert!(shared.reload_from(&path).is_err());
        assert_eq!(shared.snapshot().sprite_count(), 1);
    }

    #[test]
    fn test_reloader_rate_limiting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        write_catalog(&path, ONE_MOTH, 0);

        let mut reloader = CatalogReloader::new(&path, Duration::from_secs(60));
        write_catalog(&path, TWO_MOTHS, 10);
        assert!(!reloader.check_for_changes());

        reloader.force_check();
        assert!(reloader.check_for_changes());
    }

    #[test]
    fn test_unchanged_file_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        write_catalog(&path, ONE_MOTH, 0);

        let mut reloader = CatalogReloader::new(&path, Duration::ZERO);
        assert!(!reloader.check_for_changes());
    }

    #[test]
    fn test_poll_swaps_in_new_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        write_catalog(&path, ONE_MOTH, 0);

        let shared = SharedCatalog::load(&path).unwrap();
        let mut reloader = CatalogReloader::new(&path, Duration::ZERO);
        assert!(!reloader.poll(&shared).unwrap());

        write_catalog(&path, TWO_MOTHS, 10);
        assert!(reloader.poll(&shared).unwrap());
        assert_eq!(shared.snapshot().sprite_count(), 2);

        // Same modification time again: nothing to do
        assert!(!reloader.poll(&shared).unwrap());
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut reloader = CatalogReloader::new(dir.path().join("absent.ron"), Duration::ZERO);
        assert!(!reloader.check_for_changes());
    }
}
