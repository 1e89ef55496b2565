//! Verbose load-failure diagnostics.

use std::fmt;

use crate::error::IconError;

/// Which loader a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// Standalone bitmap load.
    Image,
    /// Standalone PNG surface load.
    Png,
    /// Re-decode of a cached entry during refresh.
    Refresh,
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadKind::Image => f.write_str("Failed to load image"),
            LoadKind::Png => f.write_str("Failed to load PNG"),
            LoadKind::Refresh => f.write_str("Failed to refresh image"),
        }
    }
}

/// Format the diagnostic line for a failed load.
pub fn failure_message(kind: LoadKind, name: &str, err: &IconError) -> String {
    format!("{kind} \"{name}\": {err}")
}

/// Emit the diagnostic line when `enabled`.
pub(crate) fn report_failure(enabled: bool, kind: LoadKind, name: &str, err: &IconError) {
    if enabled {
        tracing::warn!(target: "rt_icons", "{}", failure_message(kind, name, err));
    }
}
