//! Guide records: metadata read from front matter and the rendered guide.

use super::{
    ContentError,
    front_matter::{self, FrontMatter},
    markdown::{self, TocEntry},
};
use crate::{config::SlugMode, utils::date::GuideDate, utils::slug::is_url_segment};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Metadata of one guide. `(category, slug)` is unique across the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideMeta {
    pub title: String,
    pub description: String,
    pub date: GuideDate,
    pub category: String,
    pub slug: String,
}

impl GuideMeta {
    /// Validate front matter against the route derived from the file location.
    ///
    /// `category` from front matter takes precedence over the directory name.
    pub fn from_front_matter(
        front_matter: FrontMatter,
        dir_category: Option<&str>,
        slug: &str,
    ) -> Result<Self, ContentError> {
        let title = front_matter
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(ContentError::MissingField("title"))?;
        let raw_date = front_matter.date.ok_or(ContentError::MissingField("date"))?;
        let date = GuideDate::parse(&raw_date).ok_or(ContentError::InvalidDate(raw_date))?;
        let category = front_matter
            .category
            .or_else(|| dir_category.map(str::to_owned))
            .ok_or(ContentError::MissingField("category"))?;

        for segment in [category.as_str(), slug] {
            if !is_url_segment(segment) {
                return Err(ContentError::InvalidPath(segment.to_owned()));
            }
        }

        Ok(Self {
            title: title.trim().to_owned(),
            description: front_matter.description.unwrap_or_default().trim().to_owned(),
            date,
            category,
            slug: slug.to_owned(),
        })
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.category, &self.slug)
    }
}

/// An indexed guide: metadata plus where to find its source.
#[derive(Debug, Clone)]
pub struct GuideEntry {
    pub meta: GuideMeta,
    pub source: PathBuf,
}

impl GuideEntry {
    /// Read the front matter of `path`. Drafts yield `Ok(None)`.
    pub fn load(path: &Path, content_dir: &Path) -> Result<Option<Self>, ContentError> {
        let text = read_source(path)?;
        let doc = front_matter::parse(&text)?;
        if doc.front_matter.draft {
            return Ok(None);
        }

        let (dir_category, slug) = route_segments(path, content_dir)?;
        let meta = GuideMeta::from_front_matter(doc.front_matter, dir_category.as_deref(), &slug)?;
        Ok(Some(Self { meta, source: path.to_path_buf() }))
    }

    /// Re-read the source and render its body.
    pub fn render(&self, mode: SlugMode) -> Result<Guide, ContentError> {
        let text = read_source(&self.source)?;
        let doc = front_matter::parse(&text)?;
        let body = if is_mdx(&self.source) {
            markdown::strip_mdx_statements(doc.body)
        } else {
            doc.body.into()
        };

        let rendered = markdown::render(&body, mode);
        Ok(Guide { meta: self.meta.clone(), html: rendered.html, toc: rendered.toc })
    }
}

/// A guide ready for page rendering. Lives only for the duration of a build.
#[derive(Debug, Clone)]
pub struct Guide {
    pub meta: GuideMeta,
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn read_source(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|err| ContentError::Io(path.to_path_buf(), err))
}

fn is_mdx(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("mdx"))
}

/// Category directory (first path component below the content dir, if any) and slug (file stem).
fn route_segments(path: &Path, content_dir: &Path) -> Result<(Option<String>, String), ContentError> {
    let invalid = || ContentError::InvalidPath(path.display().to_string());
    let relative = path.strip_prefix(content_dir).map_err(|_| invalid())?;

    let slug = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?
        .to_owned();

    let mut components = relative.components();
    components.next_back();
    let dir_category = match components.next() {
        Some(Component::Normal(dir)) => Some(dir.to_str().ok_or_else(invalid)?.to_owned()),
        Some(_) => return Err(invalid()),
        None => None,
    };

    Ok((dir_category, slug))
}
