//! Icon loading and caching for raster editor widgets.
//!
//! This crate maps symbolic icon names to decoded bitmaps. Names are resolved
//! to files by an [`IconPathResolver`], decoded by a [`BitmapDecoder`], and
//! memoized in an [`IconCache`] so every widget showing the same icon shares
//! one decoded image.
//!
//! # Getting Started
//!
//! ```no_run
//! use rt_icons::{IconCache, IconCacheConfig, IconImage, TextDirection};
//!
//! let mut cache = IconCache::with_search_paths(
//!     ["/usr/share/myapp/images"],
//!     IconCacheConfig::default().with_verbose(true),
//! );
//!
//! // Widgets pull their bitmaps through the cache.
//! let undo = IconImage::new(&mut cache, "undo", Some("undo-rtl"), TextDirection::Ltr);
//! assert_eq!(undo.name(), Some("undo"));
//!
//! // One-off images bypass it.
//! let splash = cache.load_standalone_png("splash");
//! # let _ = splash;
//! ```
//!
//! # Failure Handling
//!
//! Missing or undecodable icons never produce an error for the caller. The
//! cache returns `None` and the widget shows nothing. With
//! [`IconCacheConfig::verbose`] set, the standalone loaders log a warning
//! through `tracing`.
//!
//! # Custom Collaborators
//!
//! Any `Fn(&str) -> IconResult<Option<PathBuf>>` is a resolver, which makes
//! it easy to plug in an existing theme lookup:
//!
//! ```
//! use std::path::PathBuf;
//! use rt_icons::{IconCache, IconCacheConfig, IconResult, ImageDecoder};
//!
//! let resolver = |name: &str| -> IconResult<Option<PathBuf>> {
//!     Ok(Some(PathBuf::from(format!("/opt/icons/{name}.png"))))
//! };
//! let cache = IconCache::new(resolver, ImageDecoder::new(), IconCacheConfig::default());
//! assert!(cache.is_empty());
//! ```

mod bitmap;
mod cache;
mod config;
mod decoder;
mod diagnostics;
mod error;
mod icon_image;
mod resolver;

pub use bitmap::{Bitmap, Surface};
pub use cache::{IconCache, IconCacheStats, RefreshSummary, SharedIconCache};
pub use config::IconCacheConfig;
pub use decoder::{BitmapDecoder, ImageDecoder};
pub use diagnostics::{failure_message, LoadKind};
pub use error::{IconError, IconResult};
pub use icon_image::{IconImage, TextDirection};
pub use resolver::{IconPathResolver, SearchPathResolver};

// Re-export image types that custom decoders commonly need
pub use image;
