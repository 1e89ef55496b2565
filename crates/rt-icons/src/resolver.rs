//! Icon name to file path resolution.
//!
//! An [`IconPathResolver`] maps a logical icon name such as `"zoom-fit"` to the
//! file that currently represents it. The default [`SearchPathResolver`] probes
//! an ordered list of directories, so switching icon sets is a matter of
//! changing its search paths and refreshing the cache.

use std::path::{Component, Path, PathBuf};

use crate::error::{IconError, IconResult};

/// Resolves icon names to absolute file paths.
///
/// `Ok(None)` means "no icon for this name" and is not treated as an error by
/// the standalone loaders. An empty path is treated the same as `Ok(None)`.
pub trait IconPathResolver {
    /// Resolve `name` to the file that should be decoded for it.
    fn resolve(&self, name: &str) -> IconResult<Option<PathBuf>>;
}

impl<F> IconPathResolver for F
where
    F: Fn(&str) -> IconResult<Option<PathBuf>>,
{
    fn resolve(&self, name: &str) -> IconResult<Option<PathBuf>> {
        self(name)
    }
}

/// Resolver that searches an ordered list of directories.
#[derive(Debug, Clone)]
pub struct SearchPathResolver {
    /// Directories probed in order
    search_paths: Vec<PathBuf>,
    /// Extensions appended to names that have none
    extensions: Vec<String>,
}

impl SearchPathResolver {
    /// Create a resolver over the given directories, probing `.png` files.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut resolver = Self {
            search_paths: Vec::new(),
            extensions: vec!["png".to_string()],
        };
        for path in paths {
            resolver.add_search_path(path);
        }
        resolver
    }

    /// Replace the extensions tried for names without one.
    #[must_use]
    pub fn with_extensions(
        mut self,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext: String = ext.into();
                ext.trim_start_matches('.').to_string()
            })
            .collect();
        self
    }

    /// Append `<user data dir>/<app_name>/icons` to the search paths.
    ///
    /// Does nothing on platforms without a data directory.
    #[must_use]
    pub fn with_user_data_dir(mut self, app_name: &str) -> Self {
        if let Some(data_dir) = dirs::data_dir() {
            self.add_search_path(data_dir.join(app_name).join("icons"));
        }
        self
    }

    /// Add a search path. Duplicates are ignored.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    /// Get current search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Remove every search path.
    pub fn clear_search_paths(&mut self) {
        self.search_paths.clear();
    }

    /// Extensions tried for names without one.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// File names to probe in each directory, in order.
    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let relative = Path::new(name);
        if relative.extension().is_some() {
            return vec![relative.to_path_buf()];
        }
        self.extensions
            .iter()
            .map(|ext| PathBuf::from(format!("{name}.{ext}")))
            .collect()
    }
}

impl Default for SearchPathResolver {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

impl IconPathResolver for SearchPathResolver {
    fn resolve(&self, name: &str) -> IconResult<Option<PathBuf>> {
        validate_name(name)?;

        let candidates = self.candidates(name);
        for dir in &self.search_paths {
            for candidate in &candidates {
                let path = dir.join(candidate);
                if path.is_file() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }
}

fn validate_name(name: &str) -> IconResult<()> {
    if name.is_empty() {
        return Err(IconError::invalid_name(name, "name is empty"));
    }

    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(IconError::invalid_name(name, "parent directory reference"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(IconError::invalid_name(name, "absolute path"));
            }
        }
    }

    Ok(())
}
