//! Path resolution for paths written in a config file.
//!
//! Supports absolute paths, paths relative to the config file, and `~`
//! home directory expansion.

use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::error::{InvError, Result};

/// Resolve a path from a config file.
///
/// 1. `~` or `~/...`: expanded to the home directory
/// 2. Absolute paths: used as-is
/// 3. Relative paths: joined onto the config file's directory
pub fn resolve_path(path: &Path, config_dir: &Path) -> Result<PathBuf> {
    trace!(
        path = %path.display(),
        config_dir = %config_dir.display(),
        "Resolving path"
    );

    let text = path.to_string_lossy();
    if text == "~" || text.starts_with("~/") {
        let home = home_dir()?;
        let resolved = match text.strip_prefix("~/") {
            Some(rest) if !rest.is_empty() => home.join(rest),
            _ => home,
        };
        debug!(resolved = %resolved.display(), "Expanded home directory path");
        return Ok(resolved);
    }

    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let resolved = config_dir.join(path);
    debug!(resolved = %resolved.display(), "Resolved relative path");
    Ok(resolved)
}

/// The user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| InvError::ConfigInvalid("Could not determine home directory".to_string()))
}

/// Resolves paths relative to one config file.
#[derive(Debug, Clone)]
pub struct PathResolver {
    config_dir: PathBuf,
}

impl PathResolver {
    /// Resolver for the config file at `config_path`.
    pub fn new(config_path: &Path) -> Result<Self> {
        let config_dir = config_path.parent().ok_or_else(|| {
            InvError::ConfigInvalid(format!(
                "Config path has no parent directory: {}",
                config_path.display()
            ))
        })?;

        let config_dir = if config_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            config_dir
        };

        let canonical = config_dir.canonicalize().unwrap_or_else(|_| {
            warn!(config_dir = %config_dir.display(), "Failed to canonicalize config directory");
            config_dir.to_path_buf()
        });

        Ok(Self {
            config_dir: canonical,
        })
    }

    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        resolve_path(path, &self.config_dir)
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
