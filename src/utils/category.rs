//! File category classification for watch mode.
//!
//! | Category | Rebuild strategy            | Example files          |
//! |----------|-----------------------------|------------------------|
//! | Content  | Full rebuild (sidebar, feeds) | `content/nestjs/*.md` |
//! | Asset    | Copy the single file        | `assets/logo.svg`      |
//! | Config   | Full rebuild                | `guidepress.toml`      |
//! | Unknown  | Ignored                     | Files outside watched dirs |

use crate::config::SiteConfig;
use std::{
    env,
    path::{Path, PathBuf},
};

/// Category of a changed file, used to determine rebuild strategy in watch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Content,
    Asset,
    Config,
    Unknown,
}

impl FileCategory {
    /// Whether a change in this category invalidates every generated page.
    ///
    /// Each guide page embeds the full sidebar, so any content edit touches them all.
    pub const fn needs_full_rebuild(self) -> bool {
        matches!(self, Self::Content | Self::Config)
    }
}

/// Categorize a file path to determine how changes should be handled.
pub fn categorize_path(path: &Path, config: &SiteConfig) -> FileCategory {
    let path = normalize_path(path);

    if path == normalize_path(&config.config_path) {
        FileCategory::Config
    } else if path.starts_with(normalize_path(&config.build.content)) {
        FileCategory::Content
    } else if path.starts_with(normalize_path(&config.build.assets)) {
        FileCategory::Asset
    } else {
        FileCategory::Unknown
    }
}

/// Normalize a path to absolute form for reliable comparison.
///
/// Falls back to joining with the current directory when the path
/// no longer exists (e.g. a deleted file reported by the watcher).
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(path) = path.canonicalize() {
        return path;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && let Ok(parent) = parent.canonicalize()
    {
        return parent.join(name);
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    }
}
