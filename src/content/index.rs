//! Guide index: built once per build, then shared read-only by every renderer.

use super::{ContentError, GUIDE_EXTENSIONS, Guide, GuideEntry, GuideMeta};
use crate::{
    config::{InvalidPolicy, SiteConfig, SlugMode},
    log,
};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every published guide, in sorted discovery order.
#[derive(Debug)]
pub struct GuideIndex {
    entries: Vec<GuideEntry>,
    /// category -> slug -> position in `entries`
    positions: FxHashMap<String, FxHashMap<String, usize>>,
    fragment_mode: SlugMode,
}

impl GuideIndex {
    /// Scan the content directory and read every guide's front matter.
    ///
    /// Files are parsed in parallel but the index keeps walk order, so the
    /// result is identical across runs.
    pub fn build(config: &SiteConfig) -> Result<Self> {
        let content_dir = &config.build.content;
        let sources = collect_sources(content_dir)?;

        let loaded: Vec<_> = sources
            .par_iter()
            .map(|path| (path, GuideEntry::load(path, content_dir)))
            .collect();

        let mut entries = Vec::with_capacity(loaded.len());
        for (path, result) in loaded {
            let relative = path.strip_prefix(content_dir).unwrap_or(path).display();
            match result {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => log!("guides"; "draft `{relative}` skipped"),
                Err(err) if config.build.on_invalid == InvalidPolicy::Skip => {
                    log!("warn"; "skipping `{relative}`: {err}");
                }
                Err(err) => return Err(err).with_context(|| format!("failed to load guide `{relative}`")),
            }
        }

        Ok(Self::from_entries(entries, config.build.slug.fragment)?)
    }

    /// Index already-loaded entries. Fails on the first duplicate `(category, slug)`.
    pub fn from_entries(entries: Vec<GuideEntry>, fragment_mode: SlugMode) -> Result<Self, ContentError> {
        let mut positions: FxHashMap<String, FxHashMap<String, usize>> = FxHashMap::default();

        for (i, entry) in entries.iter().enumerate() {
            let (category, slug) = entry.meta.key();
            let slugs = positions.entry(category.to_owned()).or_default();
            if let Some(&first) = slugs.get(slug) {
                return Err(ContentError::Duplicate {
                    category: category.to_owned(),
                    slug: slug.to_owned(),
                    first: entries[first].source.clone(),
                    second: entry.source.clone(),
                });
            }
            slugs.insert(slug.to_owned(), i);
        }

        Ok(Self { entries, positions, fragment_mode })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metadata of all guides, in index order.
    pub fn guides(&self) -> impl Iterator<Item = &GuideMeta> {
        self.entries.iter().map(|entry| &entry.meta)
    }

    /// Every `(category, slug)` pair a page must be generated for.
    pub fn static_params(&self) -> Vec<(&str, &str)> {
        self.guides().map(GuideMeta::key).collect()
    }

    pub fn get(&self, category: &str, slug: &str) -> Option<&GuideEntry> {
        let position = *self.positions.get(category)?.get(slug)?;
        self.entries.get(position)
    }

    /// Render the guide at `(category, slug)`.
    ///
    /// An unknown pair is `Ok(None)`. Errors only come from reading or
    /// parsing a source file that is in the index.
    pub fn lookup(&self, category: &str, slug: &str) -> Result<Option<Guide>, ContentError> {
        match self.get(category, slug) {
            Some(entry) => entry.render(self.fragment_mode).map(Some),
            None => Ok(None),
        }
    }

    pub fn by_category(&self) -> CategoryIndex<'_> {
        CategoryIndex::from_guides(self.guides())
    }
}

/// Guides grouped by category. Categories and the guides inside them keep
/// the order they were first seen in.
#[derive(Debug, Default)]
pub struct CategoryIndex<'a> {
    groups: IndexMap<&'a str, Vec<&'a GuideMeta>>,
}

impl<'a> CategoryIndex<'a> {
    pub fn from_guides(guides: impl IntoIterator<Item = &'a GuideMeta>) -> Self {
        let mut groups: IndexMap<&'a str, Vec<&'a GuideMeta>> = IndexMap::new();
        for guide in guides {
            groups.entry(guide.category.as_str()).or_default().push(guide);
        }
        Self { groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a GuideMeta])> + '_ {
        self.groups.iter().map(|(category, guides)| (*category, guides.as_slice()))
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn guide_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// All guide sources below `dir`, sorted by path. Hidden entries are skipped.
fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to scan `{}`", dir.display()))?;
        let is_guide = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| GUIDE_EXTENSIONS.iter().any(|g| ext.eq_ignore_ascii_case(g)));
        if is_guide {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_guide(root: &Path, rel: &str, title: &str, date: &str, extra: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("---\ntitle: {title}\ndate: {date}\n{extra}---\n\n## 개요\n\n본문\n")).unwrap();
    }

    fn config_for(content: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.content = content.to_path_buf();
        config
    }

    fn sample_site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_guide(root, "nestjs/intro.md", "NestJS 소개", "2025-01-15", "");
        write_guide(root, "nestjs/modules.mdx", "모듈", "2025-01-20", "");
        write_guide(root, "drizzle/setup.md", "Drizzle 설정", "2025-02-01", "");
        write_guide(root, "drizzle/.draft-notes.md", "hidden", "2025-02-01", "");
        fs::write(root.join("nestjs/notes.txt"), "not a guide").unwrap();
        dir
    }

    #[test]
    fn test_build_discovers_guides_in_sorted_order() {
        let dir = sample_site();
        let index = GuideIndex::build(&config_for(dir.path())).unwrap();

        assert_eq!(
            index.static_params(),
            vec![("drizzle", "setup"), ("nestjs", "intro"), ("nestjs", "modules")]
        );
    }

    #[test]
    fn test_every_guide_resolves_to_itself() {
        let dir = sample_site();
        let index = GuideIndex::build(&config_for(dir.path())).unwrap();

        for (category, slug) in index.static_params() {
            let guide = index.lookup(category, slug).unwrap().unwrap();
            assert_eq!(guide.meta.key(), (category, slug));
            assert!(guide.html.contains("본문"));
        }
    }

    #[test]
    fn test_lookup_example_guide() {
        let dir = sample_site();
        let config = config_for(dir.path());
        let index = GuideIndex::build(&config).unwrap();

        let guide = index.lookup("nestjs", "intro").unwrap().unwrap();
        assert_eq!(guide.meta.title, "NestJS 소개");
        assert_eq!(config.guide_path(&guide.meta.category, &guide.meta.slug), "/guides/nestjs/intro");
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let dir = sample_site();
        let index = GuideIndex::build(&config_for(dir.path())).unwrap();

        assert!(index.lookup("nestjs", "missing").unwrap().is_none());
        assert!(index.lookup("missing", "intro").unwrap().is_none());
        assert!(index.lookup("", "").unwrap().is_none());
    }

    #[test]
    fn test_category_index_partitions_guides() {
        let dir = sample_site();
        let index = GuideIndex::build(&config_for(dir.path())).unwrap();
        let categories = index.by_category();

        let names: Vec<_> = categories.iter().map(|(c, _)| c).collect();
        assert_eq!(names, ["drizzle", "nestjs"]);
        assert_eq!(categories.guide_count(), index.len());
        let (_, nestjs) = categories.iter().find(|(c, _)| *c == "nestjs").unwrap();
        assert_eq!(nestjs.len(), 2);

        for meta in index.guides() {
            let hits = categories
                .iter()
                .filter(|(_, guides)| guides.iter().any(|g| g.key() == meta.key()))
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_duplicate_guides_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_guide(dir.path(), "nestjs/intro.md", "A", "2025-01-15", "");
        write_guide(dir.path(), "misc/intro.md", "B", "2025-01-15", "category: nestjs\n");

        let err = GuideIndex::build(&config_for(dir.path())).unwrap_err();
        let err = err.downcast_ref::<ContentError>().unwrap();
        assert!(matches!(err, ContentError::Duplicate { category, slug, .. } if category == "nestjs" && slug == "intro"));
    }

    #[test]
    fn test_invalid_front_matter_fails_by_default() {
        let dir = sample_site();
        fs::write(dir.path().join("nestjs/broken.md"), "---\ntitle: Broken\n---\n").unwrap();

        let err = GuideIndex::build(&config_for(dir.path())).unwrap_err();
        assert!(format!("{err:#}").contains("broken.md"));
        assert!(format!("{err:#}").contains("date"));
    }

    #[test]
    fn test_invalid_front_matter_skipped_with_policy() {
        let dir = sample_site();
        fs::write(dir.path().join("nestjs/broken.md"), "---\ntitle: [oops\n---\n").unwrap();
        let mut config = config_for(dir.path());
        config.build.on_invalid = InvalidPolicy::Skip;

        let index = GuideIndex::build(&config).unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.get("nestjs", "broken").is_none());
    }

    #[test]
    fn test_drafts_are_excluded() {
        let dir = sample_site();
        write_guide(dir.path(), "nestjs/wip.md", "WIP", "2025-03-01", "draft: true\n");

        let index = GuideIndex::build(&config_for(dir.path())).unwrap();
        assert!(index.get("nestjs", "wip").is_none());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_empty_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        let index = GuideIndex::build(&config_for(dir.path())).unwrap();
        assert!(index.is_empty());
        assert!(index.by_category().is_empty());
    }
}
