//! TTL-cached snapshot manager.
//!
//! Wraps a [`SheetSource`] with a time-to-live cache. Callers use
//! [`DataManager::get_data`] to obtain a fresh-or-cached [`SheetSnapshot`];
//! a failed fetch is recorded and the previous snapshot is served instead.

use std::time::{Duration, Instant};

use newsletter_core::models::SheetSnapshot;
use newsletter_data::reader::SheetSource;

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around a snapshot source.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use newsletter_data::reader::FileSheetSource;
/// use newsletter_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new(
///     Box::new(FileSheetSource::new("sheets.json")),
///     Duration::from_secs(30),
/// );
/// if let Some(snapshot) = mgr.get_data(false) {
///     println!("sheets: {}", snapshot.sheet_names().len());
/// }
/// ```
pub struct DataManager {
    source: Box<dyn SheetSource + Send>,
    cache_ttl: Duration,
    cache: Option<SheetSnapshot>,
    cache_timestamp: Option<Instant>,
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(source: Box<dyn SheetSource + Send>, cache_ttl: Duration) -> Self {
        Self {
            source,
            cache_ttl,
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the snapshot, using the cache while it is within its TTL.
    ///
    /// `force_refresh` bypasses the cache. A failed fetch is attempted once,
    /// recorded in [`DataManager::last_error`], and answered with the previous
    /// snapshot (if any) even when stale.
    pub fn get_data(&mut self, force_refresh: bool) -> Option<&SheetSnapshot> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached snapshot");
            return self.cache.as_ref();
        }

        match self.source.fetch() {
            Ok(snapshot) => {
                tracing::debug!(
                    source = %self.source.describe(),
                    sheets = snapshot.data.len(),
                    "snapshot cache updated"
                );
                self.cache = Some(snapshot);
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                self.cache.as_ref()
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "fetch failed; falling back to cached snapshot"
                );
                self.last_error = Some(e.to_string());
                self.cache.as_ref()
            }
        }
    }

    /// Discard the current cache, forcing the next [`DataManager::get_data`]
    /// call to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if nothing has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Description of the last fetch error; cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use newsletter_core::error::{DashboardError, Result};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts fetches and fails on demand.
    #[derive(Clone, Default)]
    struct FakeSource {
        fetches: Arc<AtomicUsize>,
        failing: Arc<AtomicBool>,
    }

    impl SheetSource for FakeSource {
        fn fetch(&self) -> Result<SheetSnapshot> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.load(Ordering::SeqCst) {
                return Err(DashboardError::SnapshotRejected("sheet unavailable".into()));
            }
            Ok(SheetSnapshot {
                success: true,
                last_updated: Some(format!("fetch-{n}")),
                ..SheetSnapshot::default()
            })
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    fn make_manager(ttl: Duration) -> (DataManager, FakeSource) {
        let source = FakeSource::default();
        (DataManager::new(Box::new(source.clone()), ttl), source)
    }

    fn stamp(mgr: &mut DataManager, force: bool) -> Option<String> {
        mgr.get_data(force).and_then(|s| s.last_updated.clone())
    }

    // ── cache behaviour ───────────────────────────────────────────────────

    #[test]
    fn test_cache_miss_on_first_call() {
        let (mgr, source) = make_manager(Duration::from_secs(30));
        assert!(!mgr.is_cache_valid());
        assert!(mgr.cache_age().is_none());
        assert!(mgr.last_error().is_none());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cache_valid_within_ttl() {
        let (mut mgr, source) = make_manager(Duration::from_secs(30));

        assert_eq!(stamp(&mut mgr, false).as_deref(), Some("fetch-1"));
        assert_eq!(stamp(&mut mgr, false).as_deref(), Some("fetch-1"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        let age = mgr.cache_age().expect("cache age is Some after population");
        assert!(age < Duration::from_secs(5));
    }

    #[test]
    fn test_cache_expired() {
        let (mut mgr, source) = make_manager(Duration::ZERO);

        mgr.get_data(false);
        assert!(!mgr.is_cache_valid());
        assert_eq!(stamp(&mut mgr, false).as_deref(), Some("fetch-2"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_force_refresh_bypasses_cache() {
        let (mut mgr, source) = make_manager(Duration::from_secs(60));

        mgr.get_data(false);
        assert_eq!(stamp(&mut mgr, true).as_deref(), Some("fetch-2"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_cache() {
        let (mut mgr, _source) = make_manager(Duration::from_secs(30));

        mgr.get_data(false);
        assert!(mgr.cache.is_some());

        mgr.invalidate_cache();
        assert!(mgr.cache.is_none());
        assert!(mgr.cache_age().is_none());
    }

    // ── failure handling ──────────────────────────────────────────────────

    #[test]
    fn test_failure_without_cache_returns_none() {
        let (mut mgr, source) = make_manager(Duration::from_secs(30));
        source.failing.store(true, Ordering::SeqCst);

        assert!(mgr.get_data(false).is_none());
        assert!(mgr.last_error().unwrap().contains("sheet unavailable"));
    }

    #[test]
    fn test_failure_falls_back_to_stale_cache_without_retry() {
        let (mut mgr, source) = make_manager(Duration::ZERO);
        mgr.get_data(false);

        source.failing.store(true, Ordering::SeqCst);
        assert_eq!(stamp(&mut mgr, false).as_deref(), Some("fetch-1"));
        assert!(mgr.last_error().is_some());
        // One initial fetch plus exactly one failed attempt.
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_success_clears_last_error() {
        let (mut mgr, source) = make_manager(Duration::ZERO);
        source.failing.store(true, Ordering::SeqCst);
        mgr.get_data(false);
        assert!(mgr.last_error().is_some());

        source.failing.store(false, Ordering::SeqCst);
        mgr.get_data(false);
        assert!(mgr.last_error().is_none());
    }
}
