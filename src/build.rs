//! Site building orchestration.
//!
//! ```text
//! build_site()
//!     │
//!     ├── GuideIndex::build() ──► scan content, validate front matter
//!     │
//!     ├── render_guides() ─┐
//!     │                    ├── rayon::join
//!     ├── process_asset() ─┘
//!     │
//!     ├── home, overview, 404, stylesheet, script
//!     │
//!     └── build_rss() + build_sitemap()
//! ```

use crate::{
    config::SiteConfig,
    content::{CategoryIndex, GuideIndex},
    generator::{
        layout::{SCRIPT, SCRIPT_PATH, STYLESHEET, STYLESHEET_PATH},
        listing::{render_guides_overview, render_home, render_not_found},
        page::render_guide_page,
        rss::build_rss,
        sitemap::build_sitemap,
    },
    log,
    utils::{
        category::normalize_path,
        log::ProgressBars,
        minify::{MinifyType, minify},
    },
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Progress bar rows
const PAGES_BAR: usize = 0;
const ASSETS_BAR: usize = 1;

/// Build the entire site: every guide page, the overview pages, the RSS
/// feed and the sitemap.
///
/// Returns the guide index so callers can report on it.
/// If `config.build.clean` is true, clears the output directory first.
pub fn build_site(config: &SiteConfig) -> Result<GuideIndex> {
    let output = &config.build.output;
    prepare_output(output, config.build.clean)?;

    log!("index"; "scanning {}", config.build.content.display());
    let index = GuideIndex::build(config)?;
    log!("index"; "found {} guides", index.len());
    let categories = index.by_category();

    let asset_files = collect_all_files(&config.build.assets);
    let params = index.static_params();
    let progress = ProgressBars::new(&[("pages", params.len()), ("assets", asset_files.len())]);
    let has_error = AtomicBool::new(false);

    let (pages_result, assets_result) = rayon::join(
        || render_guides(config, &index, &categories, &params, &progress, &has_error),
        || {
            asset_files.par_iter().try_for_each(|path| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                if let Err(e) = process_asset(path, config, false) {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}: {:#}", path.display(), e);
                    }
                    return Err(anyhow!("Build failed"));
                }
                progress.inc(ASSETS_BAR);
                Ok(())
            })
        },
    );
    progress.finish();
    pages_result?;
    assets_result?;

    write_html(&output.join("index.html"), &render_home(config, &categories), config)?;
    write_html(&config.guides_index_output_path(), &render_guides_overview(config, &categories), config)?;
    write_html(&output.join("404.html"), &render_not_found(config), config)?;
    write_file(&output.join(STYLESHEET_PATH), STYLESHEET.as_bytes())?;
    write_file(&output.join(SCRIPT_PATH), SCRIPT.as_bytes())?;

    let (rss_result, sitemap_result) =
        rayon::join(|| build_rss(config, &index), || build_sitemap(config, &index));
    rss_result?;
    sitemap_result?;

    log!("build"; "done, {} guides in {} categories", index.len(), categories.len());
    Ok(index)
}

/// Render one page per `(category, slug)` pair the index enumerates.
///
/// A pair that stops resolving between enumeration and lookup is skipped
/// with a warning; it will be picked up by the next build.
fn render_guides(
    config: &SiteConfig,
    index: &GuideIndex,
    categories: &CategoryIndex<'_>,
    params: &[(&str, &str)],
    progress: &ProgressBars,
    has_error: &AtomicBool,
) -> Result<()> {
    params.par_iter().try_for_each(|&(category, slug)| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        let result = index
            .lookup(category, slug)
            .with_context(|| format!("failed to render guide `{category}/{slug}`"))
            .and_then(|guide| match guide {
                Some(guide) => write_html(
                    &config.guide_output_path(category, slug),
                    &render_guide_page(config, &guide, categories),
                    config,
                ),
                None => {
                    log!("warn"; "guide `{category}/{slug}` disappeared, skipping");
                    Ok(())
                }
            });

        if let Err(e) = result {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "{:#}", e);
            }
            return Err(anyhow!("Build failed"));
        }
        progress.inc(PAGES_BAR);
        Ok(())
    })
}

/// Create the output directory, removing it first when `clean` is set.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Collect all files from a directory recursively
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.into_path())
        .collect()
}

/// Check if destination is up-to-date compared to source
fn is_up_to_date(src: &Path, dst: &Path) -> bool {
    let modified = |p: &Path| p.metadata().and_then(|m| m.modified()).ok();
    match (modified(src), modified(dst)) {
        (Some(src_time), Some(dst_time)) => src_time <= dst_time,
        _ => false,
    }
}

/// Copy a file from the assets directory to the same relative path under output.
pub fn process_asset(asset_path: &Path, config: &SiteConfig, log_file: bool) -> Result<()> {
    // the watcher reports absolute paths while `assets` may still be relative
    let relative = asset_path
        .strip_prefix(&config.build.assets)
        .map(Path::to_path_buf)
        .or_else(|_| {
            normalize_path(asset_path)
                .strip_prefix(normalize_path(&config.build.assets))
                .map(Path::to_path_buf)
        })
        .with_context(|| format!("`{}` is not inside the assets directory", asset_path.display()))?;
    let dest = config.build.output.join(&relative);

    if !config.build.clean && is_up_to_date(asset_path, &dest) {
        return Ok(());
    }

    if log_file {
        log!("assets"; "{}", relative.display());
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(asset_path, &dest)
        .with_context(|| format!("Failed to copy asset `{}`", asset_path.display()))?;
    Ok(())
}

/// Minify (if enabled) and write an HTML page, creating parent directories.
pub fn write_html(path: &Path, html: &str, config: &SiteConfig) -> Result<()> {
    let bytes = minify(MinifyType::Html(html.as_bytes()), config);
    write_file(path, &bytes)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write `{}`", path.display()))
}
