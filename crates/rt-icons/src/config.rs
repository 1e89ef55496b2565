//! Icon cache configuration.

/// Configuration for an [`IconCache`](crate::IconCache).
///
/// # Example
///
/// ```
/// use rt_icons::IconCacheConfig;
///
/// let config = IconCacheConfig::default()
///     .with_verbose(true)
///     .with_refresh_reporting(false);
/// assert!(config.verbose);
/// ```
#[derive(Debug, Clone)]
pub struct IconCacheConfig {
    /// Report standalone load failures as warnings.
    /// Default: false.
    pub verbose: bool,
    /// Also report entries dropped by a refresh when `verbose` is set.
    /// Default: true.
    pub report_refresh_failures: bool,
}

impl Default for IconCacheConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            report_refresh_failures: true,
        }
    }
}

impl IconCacheConfig {
    /// Enable or disable verbose failure diagnostics.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable diagnostics for entries dropped during refresh.
    #[must_use]
    pub fn with_refresh_reporting(mut self, enable: bool) -> Self {
        self.report_refresh_failures = enable;
        self
    }

    /// Whether refresh failures should produce a diagnostic.
    #[inline]
    pub fn reports_refresh_failures(&self) -> bool {
        self.verbose && self.report_refresh_failures
    }
}
