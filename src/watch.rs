//! File system watcher for live rebuild.
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌─────────────────────────────┐
//! │ notify   │───▶│ Debouncer│───▶│      handle_changes()       │
//! │ events   │    │ (300ms)  │    │                             │
//! └──────────┘    └──────────┘    │  config  ─▶ reload + build  │
//!                                 │  content ─▶ full build      │
//!                                 │  assets  ─▶ copy changed    │
//!                                 └─────────────────────────────┘
//! ```
//!
//! Every guide page embeds the whole sidebar, so any content change
//! rebuilds the full site.

use crate::{
    build::{build_site, process_asset},
    config::SiteConfig,
    log,
    utils::category::{FileCategory, categorize_path},
};
use anyhow::{Context, Result, anyhow};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;
const REBUILD_COOLDOWN_MS: u64 = 800;

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// `/site/content/nestjs/intro.md` → `content/nestjs/intro.md`
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Batches rapid file events with debouncing and rebuild cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_rebuild: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self { pending: FxHashSet::default(), last_event: None, last_rebuild: None }
    }

    fn in_cooldown(&self) -> bool {
        self.last_rebuild
            .is_some_and(|t| t.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        self.pending.extend(event.paths.into_iter().filter(|p| !is_temp_file(p)));
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn mark_rebuild(&mut self) {
        self.last_rebuild = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

/// What a batch of changed paths requires.
#[derive(Debug, Default, PartialEq, Eq)]
struct ChangeSet {
    config_changed: bool,
    /// First content path that changed, for the log line
    content_trigger: Option<PathBuf>,
    assets: Vec<PathBuf>,
}

impl ChangeSet {
    fn from_paths(paths: Vec<PathBuf>, config: &SiteConfig) -> Self {
        let mut changes = Self::default();
        for path in paths {
            match categorize_path(&path, config) {
                FileCategory::Config => changes.config_changed = true,
                FileCategory::Asset => changes.assets.push(path),
                category if category.needs_full_rebuild() => {
                    changes.content_trigger.get_or_insert(path);
                }
                _ => {}
            }
        }
        changes
    }

    fn needs_full_rebuild(&self) -> bool {
        self.config_changed || self.content_trigger.is_some()
    }
}

/// Re-read the config file and re-apply the original CLI overrides.
///
/// The server keeps serving the directory it was bound to, so the output
/// path is pinned for the session. Each reload leaks one `SiteConfig`.
fn reload_config(config: &SiteConfig) -> Result<&'static SiteConfig> {
    let cli = config.cli.ok_or_else(|| anyhow!("config was not loaded from the command line"))?;
    let mut fresh = SiteConfig::from_path(&config.config_path)?;
    fresh.update_with_cli(cli);
    fresh.validate()?;
    pin_output(&mut fresh, config);
    Ok(Box::leak(Box::new(fresh)))
}

fn pin_output(fresh: &mut SiteConfig, current: &SiteConfig) {
    if fresh.build.output != current.build.output {
        log!(
            "watch";
            "output changed to {}, restart to apply; still writing to {}",
            fresh.build.output.display(),
            current.build.output.display()
        );
        fresh.build.output = current.build.output.clone();
    }
}

fn try_full_rebuild(config: &SiteConfig, reason: &str) -> bool {
    log!("watch"; "{reason}");
    match build_site(config) {
        Ok(_) => true,
        Err(e) => {
            log!("error"; "build failed: {e:#}");
            false
        }
    }
}

/// Apply one debounced batch. Returns true if a full rebuild succeeded.
///
/// A changed config file replaces `config` for the rest of the session.
fn handle_changes(paths: Vec<PathBuf>, config: &mut &'static SiteConfig) -> bool {
    let root = config.get_root().to_path_buf();
    let changes = ChangeSet::from_paths(paths, config);

    if changes.config_changed {
        match reload_config(config) {
            Ok(fresh) => *config = fresh,
            Err(e) => {
                log!("error"; "config reload failed: {e:#}");
                return false;
            }
        }
        return try_full_rebuild(config, "config changed, rebuilding...");
    }

    if changes.needs_full_rebuild() {
        let trigger = changes.content_trigger.as_deref().map(|p| rel_path(p, &root)).unwrap_or_default();
        return try_full_rebuild(config, &format!("{trigger} changed, rebuilding..."));
    }

    for asset in changes.assets.iter().filter(|p| p.is_file()) {
        if let Err(e) = process_asset(asset, config, true) {
            log!("error"; "{}: {e:#}", rel_path(asset, &root));
        }
    }
    false
}

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let targets = [
        (&config.build.content, RecursiveMode::Recursive),
        (&config.build.assets, RecursiveMode::Recursive),
        (&config.config_path, RecursiveMode::NonRecursive),
    ];

    let mut watched = Vec::new();
    for (path, mode) in targets {
        if !path.exists() {
            continue;
        }
        watcher
            .watch(path, mode)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
        watched.push(rel_path(path, root));
    }

    log!("watch"; "watching {}", watched.join(", "));
    Ok(())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_))
}

/// Start blocking file watcher with debouncing and live rebuild.
pub fn watch_for_changes_blocking(config: &'static SiteConfig) -> Result<()> {
    if !config.serve.watch {
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, config)?;

    let mut config = config;
    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) && !debouncer.in_cooldown() => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                if handle_changes(debouncer.take(), &mut config) {
                    debouncer.mark_rebuild();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }

    Ok(())
}
