//! Icon bitmap caching.
//!
//! This module provides [`IconCache`], which memoizes decoded icon bitmaps by
//! name. The first request for a name resolves and decodes it; later requests
//! return the same shared [`Bitmap`] handle until the cache is refreshed or
//! cleared.
//!
//! Failures never reach the caller: a name that cannot be resolved or decoded
//! simply yields `None` and is retried on the next request.
//!
//! # Example
//!
//! ```no_run
//! use rt_icons::{IconCache, IconCacheConfig};
//!
//! let mut cache = IconCache::with_search_paths(
//!     ["/usr/share/myapp/images"],
//!     IconCacheConfig::default(),
//! );
//!
//! if let Some(bitmap) = cache.get("zoom-in") {
//!     println!("zoom-in is {}x{}", bitmap.width(), bitmap.height());
//! }
//!
//! // After switching icon sets, re-decode everything that is cached.
//! cache.resolver_mut().clear_search_paths();
//! cache.resolver_mut().add_search_path("/usr/share/myapp/images/dark");
//! let summary = cache.refresh_all();
//! println!("{} icons dropped", summary.removed.len());
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::bitmap::{Bitmap, Surface};
use crate::config::IconCacheConfig;
use crate::decoder::{BitmapDecoder, ImageDecoder};
use crate::diagnostics::{report_failure, LoadKind};
use crate::error::{IconError, IconResult};
use crate::resolver::{IconPathResolver, SearchPathResolver};

/// A name-keyed cache of decoded icon bitmaps.
///
/// # Thread Safety
///
/// This cache is NOT thread-safe; mutation needs `&mut self`. Use
/// [`SharedIconCache`] to share one cache between threads.
pub struct IconCache<R = SearchPathResolver, D = ImageDecoder> {
    /// Configuration.
    config: IconCacheConfig,
    /// Name to path resolution.
    resolver: R,
    /// Path to bitmap decoding.
    decoder: D,
    /// Cached bitmaps by icon name.
    entries: BTreeMap<String, Bitmap>,
    /// Statistics: number of cache hits.
    hits: u64,
    /// Statistics: number of cache misses.
    misses: u64,
}

impl IconCache {
    /// Create a cache over the default resolver and decoder.
    pub fn with_search_paths(
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
        config: IconCacheConfig,
    ) -> Self {
        Self::new(SearchPathResolver::new(paths), ImageDecoder::new(), config)
    }
}

impl<R: IconPathResolver, D: BitmapDecoder> IconCache<R, D> {
    /// Create an empty cache.
    pub fn new(resolver: R, decoder: D, config: IconCacheConfig) -> Self {
        Self {
            config,
            resolver,
            decoder,
            entries: BTreeMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Get the bitmap for `name`, loading and caching it on first use.
    ///
    /// Returns `None` if the name does not resolve or the file cannot be
    /// decoded. Nothing is cached in that case, so the next call retries.
    pub fn get(&mut self, name: &str) -> Option<Bitmap> {
        if let Some(bitmap) = self.entries.get(name) {
            self.hits += 1;
            return Some(bitmap.clone());
        }

        self.misses += 1;
        match load_bitmap(&self.resolver, &self.decoder, name) {
            Ok(bitmap) => {
                debug!(
                    icon = name,
                    width = bitmap.width(),
                    height = bitmap.height(),
                    "cached icon"
                );
                self.entries.insert(name.to_string(), bitmap.clone());
                Some(bitmap)
            }
            Err(err) => {
                debug!(icon = name, error = %err, "icon unavailable");
                None
            }
        }
    }

    /// Re-resolve and re-decode every cached icon.
    ///
    /// Entries that still load get a fresh bitmap; handles callers already
    /// hold keep showing the old pixels until they fetch again. Entries that
    /// no longer load are removed once every entry has been visited.
    pub fn refresh_all(&mut self) -> RefreshSummary {
        let report = self.config.reports_refresh_failures();
        let mut summary = RefreshSummary::default();
        let mut invalid = Vec::new();

        for (name, bitmap) in self.entries.iter_mut() {
            match load_bitmap(&self.resolver, &self.decoder, name) {
                Ok(fresh) => {
                    *bitmap = fresh;
                    summary.refreshed += 1;
                }
                Err(err) => {
                    report_failure(report, LoadKind::Refresh, name, &err);
                    invalid.push(name.clone());
                }
            }
        }

        for name in &invalid {
            self.entries.remove(name);
        }

        debug!(
            refreshed = summary.refreshed,
            removed = invalid.len(),
            "refreshed icon cache"
        );
        summary.removed = invalid;
        summary
    }

    /// Drop every cached bitmap.
    ///
    /// Pixels stay alive for as long as some caller still holds a handle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove a single entry, returning its bitmap if it was cached.
    pub fn remove(&mut self, name: &str) -> Option<Bitmap> {
        self.entries.remove(name)
    }

    /// Load a bitmap for `name` without consulting or filling the cache.
    pub fn load_standalone(&self, name: &str) -> Option<Bitmap> {
        let result = resolve_optional(&self.resolver, name).and_then(|path| match path {
            Some(path) => self.decoder.decode(&path).map(Some),
            None => Ok(None),
        });
        self.standalone_result(LoadKind::Image, name, result)
    }

    /// Load `name` as a PNG pixel surface without touching the cache.
    pub fn load_standalone_png(&self, name: &str) -> Option<Surface> {
        let result = resolve_optional(&self.resolver, name).and_then(|path| match path {
            Some(path) => self.decoder.decode_png(&path).map(Some),
            None => Ok(None),
        });
        self.standalone_result(LoadKind::Png, name, result)
    }

    fn standalone_result<T>(
        &self,
        kind: LoadKind,
        name: &str,
        result: IconResult<Option<T>>,
    ) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(err) => {
                report_failure(self.config.verbose, kind, name, &err);
                None
            }
        }
    }

    /// Check if `name` is cached.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get the number of cached icons.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached icon names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> IconCacheStats {
        IconCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Reset cache statistics.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Get the configuration.
    pub fn config(&self) -> &IconCacheConfig {
        &self.config
    }

    /// Toggle verbose diagnostics.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    /// Get the resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Get mutable access to the resolver.
    ///
    /// Changing how names resolve does not touch cached entries; call
    /// [`refresh_all`](Self::refresh_all) afterwards.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Get the decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}

impl<R, D> std::fmt::Debug for IconCache<R, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconCache")
            .field("entries", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .field("verbose", &self.config.verbose)
            .finish()
    }
}

/// Resolve `name`, treating an empty path as no icon.
fn resolve_optional<R: IconPathResolver>(resolver: &R, name: &str) -> IconResult<Option<PathBuf>> {
    Ok(resolver
        .resolve(name)?
        .filter(|path| !path.as_os_str().is_empty()))
}

/// Resolve and decode `name`; a missing path is a failure here.
fn load_bitmap<R: IconPathResolver, D: BitmapDecoder>(
    resolver: &R,
    decoder: &D,
    name: &str,
) -> IconResult<Bitmap> {
    let path = resolve_optional(resolver, name)?.ok_or_else(|| IconError::not_found(name))?;
    decoder.decode(&path)
}

/// Outcome of [`IconCache::refresh_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Entries that were re-decoded and kept.
    pub refreshed: usize,
    /// Names dropped because they no longer load, in sorted order.
    pub removed: Vec<String>,
}

/// Statistics about the icon cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconCacheStats {
    /// Number of entries in the cache.
    pub entries: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
}

impl IconCacheStats {
    /// Get the cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// An [`IconCache`] behind a mutex, cloneable across threads.
///
/// Every operation holds the lock for its whole duration, including the
/// file I/O of a miss.
pub struct SharedIconCache<R = SearchPathResolver, D = ImageDecoder> {
    inner: Arc<Mutex<IconCache<R, D>>>,
}

impl<R: IconPathResolver, D: BitmapDecoder> SharedIconCache<R, D> {
    /// Wrap an existing cache.
    pub fn new(cache: IconCache<R, D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Lock the cache for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, IconCache<R, D>> {
        self.inner.lock()
    }

    /// See [`IconCache::get`].
    pub fn get(&self, name: &str) -> Option<Bitmap> {
        self.inner.lock().get(name)
    }

    /// See [`IconCache::refresh_all`].
    pub fn refresh_all(&self) -> RefreshSummary {
        self.inner.lock().refresh_all()
    }

    /// See [`IconCache::clear`].
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// See [`IconCache::load_standalone`].
    pub fn load_standalone(&self, name: &str) -> Option<Bitmap> {
        self.inner.lock().load_standalone(name)
    }

    /// See [`IconCache::load_standalone_png`].
    pub fn load_standalone_png(&self, name: &str) -> Option<Surface> {
        self.inner.lock().load_standalone_png(name)
    }

    /// See [`IconCache::contains`].
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().contains(name)
    }

    /// See [`IconCache::len`].
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// See [`IconCache::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// See [`IconCache::stats`].
    pub fn stats(&self) -> IconCacheStats {
        self.inner.lock().stats()
    }
}

impl<R, D> Clone for SharedIconCache<R, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, D> std::fmt::Debug for SharedIconCache<R, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedIconCache")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, HashSet};
    use std::path::Path;
    use std::rc::Rc;

    use image::{Rgba, RgbaImage};

    use super::*;

    /// In-memory stand-in for the icon directory.
    #[derive(Default)]
    struct FakeIcons {
        /// Icon name to pixel value; names not listed fail to resolve
        known: RefCell<HashMap<String, u8>>,
        /// Names that resolve to an empty path
        blank: RefCell<HashSet<String>>,
        /// Names whose file fails to decode
        corrupt: RefCell<HashSet<String>>,
        resolves: Cell<usize>,
        decodes: Cell<usize>,
    }

    impl FakeIcons {
        fn add(&self, name: &str, value: u8) {
            self.known.borrow_mut().insert(name.to_string(), value);
            self.corrupt.borrow_mut().remove(name);
        }

        fn forget(&self, name: &str) {
            self.known.borrow_mut().remove(name);
        }

        fn corrupt(&self, name: &str) {
            self.corrupt.borrow_mut().insert(name.to_string());
        }

        fn name_of(path: &Path) -> String {
            path.file_stem().unwrap().to_string_lossy().into_owned()
        }
    }

    struct FakeResolver(Rc<FakeIcons>);

    impl IconPathResolver for FakeResolver {
        fn resolve(&self, name: &str) -> IconResult<Option<PathBuf>> {
            let icons = &self.0;
            icons.resolves.set(icons.resolves.get() + 1);
            if icons.blank.borrow().contains(name) {
                return Ok(Some(PathBuf::new()));
            }
            if icons.known.borrow().contains_key(name) {
                Ok(Some(PathBuf::from(format!("/icons/{name}.png"))))
            } else {
                Err(IconError::not_found(name))
            }
        }
    }

    struct FakeDecoder(Rc<FakeIcons>);

    impl FakeDecoder {
        fn pixel(&self, path: &Path) -> IconResult<u8> {
            let icons = &self.0;
            icons.decodes.set(icons.decodes.get() + 1);
            let name = FakeIcons::name_of(path);
            if icons.corrupt.borrow().contains(&name) {
                return Err(IconError::decode(path, "corrupt"));
            }
            icons
                .known
                .borrow()
                .get(&name)
                .copied()
                .ok_or_else(|| IconError::io(path, std::io::ErrorKind::NotFound.into()))
        }
    }

    impl BitmapDecoder for FakeDecoder {
        fn decode(&self, path: &Path) -> IconResult<Bitmap> {
            let value = self.pixel(path)?;
            Ok(Bitmap::from_color(2, 2, Rgba([value, value, value, 255])))
        }

        fn decode_png(&self, path: &Path) -> IconResult<Surface> {
            let value = self.pixel(path)?;
            Ok(Surface::from_rgba(&RgbaImage::from_pixel(2, 2, Rgba([value, 0, 0, 255]))))
        }
    }

    fn make_cache(
        config: IconCacheConfig,
    ) -> (IconCache<FakeResolver, FakeDecoder>, Rc<FakeIcons>) {
        let icons = Rc::new(FakeIcons::default());
        let cache = IconCache::new(FakeResolver(icons.clone()), FakeDecoder(icons.clone()), config);
        (cache, icons)
    }

    #[test]
    fn test_get_caches_and_reuses_handle() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.add("ok-icon", 10);

        let first = cache.get("ok-icon").unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!((icons.resolves.get(), icons.decodes.get()), (1, 1));

        let second = cache.get("ok-icon").unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!((icons.resolves.get(), icons.decodes.get()), (1, 1));
    }

    #[test]
    fn test_clear_forces_reload() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.add("ok-icon", 10);

        let b1 = cache.get("ok-icon").unwrap();
        assert!(cache.contains("ok-icon"));

        cache.clear();
        assert!(cache.is_empty());
        // The caller's handle outlives the cache entry.
        assert_eq!(b1.handle_count(), 1);

        let b2 = cache.get("ok-icon").unwrap();
        assert!(!b1.ptr_eq(&b2));
        assert_eq!(b1.to_rgba8_bytes(), b2.to_rgba8_bytes());
        assert_eq!((icons.resolves.get(), icons.decodes.get()), (2, 2));
    }

    #[test]
    fn test_unknown_name_is_not_cached() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default().with_verbose(true));

        assert!(cache.get("nonexistent-icon").is_none());
        assert!(!cache.contains("nonexistent-icon"));
        assert!(cache.is_empty());

        // Failures are retried on the next request.
        assert!(cache.get("nonexistent-icon").is_none());
        assert_eq!(icons.resolves.get(), 2);
        assert_eq!(icons.decodes.get(), 0);
    }

    #[test]
    fn test_decode_failure_is_not_cached() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.add("broken", 1);
        icons.corrupt("broken");

        assert!(cache.get("broken").is_none());
        assert!(!cache.contains("broken"));
        assert_eq!(icons.decodes.get(), 1);
    }

    #[test]
    fn test_empty_path_is_not_cached() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.blank.borrow_mut().insert("blank".to_string());

        assert!(cache.get("blank").is_none());
        assert!(cache.is_empty());
        assert_eq!(icons.decodes.get(), 0);
    }

    #[test]
    fn test_refresh_replaces_and_removes() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.add("keep", 1);
        icons.add("gone", 2);
        icons.add("broken", 3);

        let old_keep = cache.get("keep").unwrap();
        cache.get("gone").unwrap();
        cache.get("broken").unwrap();

        icons.add("keep", 100);
        icons.forget("gone");
        icons.corrupt("broken");

        let summary = cache.refresh_all();
        assert_eq!(summary.refreshed, 1);
        assert_eq!(summary.removed, vec!["broken".to_string(), "gone".to_string()]);
        assert_eq!(cache.names().collect::<Vec<_>>(), vec!["keep"]);

        // Old handle keeps the old pixels; new fetches see the refreshed ones.
        assert_eq!(old_keep.to_rgba8_bytes()[0], 1);
        let new_keep = cache.get("keep").unwrap();
        assert!(!new_keep.ptr_eq(&old_keep));
        assert_eq!(new_keep.to_rgba8_bytes()[0], 100);
    }

    #[test]
    fn test_refresh_leaves_uncached_names_alone() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default().with_verbose(true));
        icons.add("a", 1);
        icons.add("b", 2);
        cache.get("a").unwrap();

        let summary = cache.refresh_all();
        assert_eq!(summary, RefreshSummary { refreshed: 1, removed: vec![] });
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_refresh_on_empty_cache() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        assert_eq!(cache.refresh_all(), RefreshSummary::default());
        assert_eq!(icons.resolves.get(), 0);
    }

    #[test]
    fn test_standalone_does_not_touch_cache() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.add("splash", 7);
        icons.add("cached", 8);
        cache.get("cached").unwrap();

        let bitmap = cache.load_standalone("splash").unwrap();
        assert_eq!(bitmap.dimensions(), (2, 2));
        let surface = cache.load_standalone_png("splash").unwrap();
        assert_eq!(surface.pixel(0, 0), Some(0xFF07_0000));

        assert_eq!(cache.len(), 1);
        assert!(!cache.contains("splash"));

        // Standalone loads never reuse cached handles either.
        let standalone = cache.load_standalone("cached").unwrap();
        assert!(!standalone.ptr_eq(&cache.get("cached").unwrap()));
    }

    #[test]
    fn test_standalone_failures_return_none() {
        let (cache, icons) = make_cache(IconCacheConfig::default().with_verbose(true));
        icons.blank.borrow_mut().insert("blank".to_string());
        icons.add("broken", 1);
        icons.corrupt("broken");

        assert!(cache.load_standalone("missing").is_none());
        assert!(cache.load_standalone("blank").is_none());
        assert!(cache.load_standalone("broken").is_none());
        assert!(cache.load_standalone_png("missing").is_none());
        assert!(cache.load_standalone_png("blank").is_none());
        assert!(cache.load_standalone_png("broken").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_single_entry() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.add("a", 1);
        cache.get("a").unwrap();

        assert!(cache.remove("a").is_some());
        assert!(cache.remove("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats() {
        let (mut cache, icons) = make_cache(IconCacheConfig::default());
        icons.add("a", 1);

        cache.get("a");
        cache.get("a");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert!((stats.hit_rate() - 0.333).abs() < 0.01);

        cache.reset_stats();
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }

    #[test]
    fn test_set_verbose() {
        let (mut cache, _icons) = make_cache(IconCacheConfig::default());
        assert!(!cache.config().verbose);
        cache.set_verbose(true);
        assert!(cache.config().verbose);
    }

    #[test]
    fn test_shared_cache_across_threads() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let resolver = move |name: &str| -> IconResult<Option<PathBuf>> {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Some(PathBuf::from(format!("/icons/{name}.png"))))
        };

        struct SolidDecoder;
        impl BitmapDecoder for SolidDecoder {
            fn decode(&self, _path: &Path) -> IconResult<Bitmap> {
                Ok(Bitmap::from_color(1, 1, Rgba([0, 0, 0, 255])))
            }
            fn decode_png(&self, _path: &Path) -> IconResult<Surface> {
                Ok(Surface::from_rgba(&RgbaImage::new(1, 1)))
            }
        }

        let shared = SharedIconCache::new(IconCache::new(
            resolver,
            SolidDecoder,
            IconCacheConfig::default(),
        ));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.get("brush").unwrap())
            })
            .collect();
        let bitmaps: Vec<Bitmap> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(bitmaps.windows(2).all(|w| w[0].ptr_eq(&w[1])));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared.stats().hits, 3);

        shared.clear();
        assert!(shared.is_empty());
        assert!(shared.load_standalone("x").is_some());
        assert!(shared.load_standalone_png("x").is_some());
        assert!(!shared.contains("x"));
        assert_eq!(shared.refresh_all(), RefreshSummary::default());
        assert!(shared.lock().is_empty());
    }
}
