//! Guide content: source discovery, front matter, markdown rendering and lookup.
//!
//! ```text
//! content/
//! ├── nestjs/
//! │   ├── intro.md        -> /guides/nestjs/intro
//! │   └── modules.mdx     -> /guides/nestjs/modules
//! └── drizzle/
//!     └── setup.md        -> /guides/drizzle/setup
//! ```

pub mod front_matter;
pub mod guide;
pub mod index;
pub mod markdown;

pub use guide::{Guide, GuideEntry, GuideMeta};
pub use index::{CategoryIndex, GuideIndex};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning one source file into a guide.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("front matter opened with `---` but never closed")]
    Unterminated,

    #[error("front matter is not valid YAML")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("front matter is missing `{0}`")]
    MissingField(&'static str),

    #[error("invalid date `{0}`, expected YYYY-MM-DD or RFC 3339")]
    InvalidDate(String),

    #[error("`{0}` cannot be used as a URL segment")]
    InvalidPath(String),

    #[error("guide `{category}/{slug}` is defined by both `{}` and `{}`", .first.display(), .second.display())]
    Duplicate {
        category: String,
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Source file extensions recognised as guides.
pub const GUIDE_EXTENSIONS: &[&str] = &["md", "mdx"];
