//! Core [`SourceLoader`] struct: filesystem-backed document and patch loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::read::{read_document, read_patch, ReadOptions};
use crate::schema::Patch;
use crate::store::{AggregationStore, DocumentKey};

use super::error::{LoadResult, LoadStatus, SourceKind};
use super::watcher::{handle_fs_event, WatchedDirs};

/// Filesystem-backed loader feeding an [`AggregationStore`].
///
/// Scans both directories recursively for `*.yml` / `*.yaml` files.
/// Dotfiles and other extensions are skipped; parse errors are reported
/// per file and never abort the scan.
pub struct SourceLoader {
    documents_dir: PathBuf,
    patches_dir: Option<PathBuf>,
    options: ReadOptions,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl SourceLoader {
    pub fn new(documents_dir: impl Into<PathBuf>, patches_dir: Option<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            patches_dir,
            options: ReadOptions::default(),
            _watcher: None,
        }
    }

    /// Read options stored alongside every loaded document.
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    pub fn patches_dir(&self) -> Option<&Path> {
        self.patches_dir.as_deref()
    }

    /// Load the patch set, then every document, into `store`.
    ///
    /// The store's patch set is replaced by the patches that parsed.
    pub fn load_all(&self, store: &AggregationStore) -> Vec<LoadResult> {
        let (patches, mut results) = self.load_patches();
        store.replace_patches(patches);
        results.extend(self.load_documents(store));
        results
    }

    /// Upsert every valid document under the documents directory.
    pub fn load_documents(&self, store: &AggregationStore) -> Vec<LoadResult> {
        let mut results = Vec::new();
        for path in scan(&self.documents_dir, SourceKind::Document, &mut results) {
            let status = match load_document_file(&path, &self.options) {
                Ok(raw) => {
                    let key = DocumentKey::for_path(&path);
                    info!(key = %key, path = %path.display(), "loaded indicator document");
                    store.upsert_with(key.clone(), raw, self.options.clone());
                    LoadStatus::Loaded { id: key.to_string() }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load indicator document");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult {
                path,
                kind: SourceKind::Document,
                status,
            });
        }
        results
    }

    /// Parse every patch file in sorted path order. Files that fail to
    /// parse are reported and left out of the returned set.
    pub fn load_patches(&self) -> (Vec<Patch>, Vec<LoadResult>) {
        match &self.patches_dir {
            Some(dir) => scan_patches(dir),
            None => (Vec::new(), Vec::new()),
        }
    }

    /// Start a recursive watcher that keeps `store` in sync with both
    /// directories. Parse errors are logged and the previous version kept.
    pub fn watch(&mut self, store: Arc<AggregationStore>) -> Result<()> {
        let dirs = WatchedDirs {
            documents: fs::canonicalize(&self.documents_dir)?,
            patches: self
                .patches_dir
                .as_ref()
                .map(fs::canonicalize)
                .transpose()?,
            options: self.options.clone(),
        };

        let mut watcher = notify::recommended_watcher({
            let dirs = dirs.clone();
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &store, &dirs),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            }
        })?;

        watcher.watch(&dirs.documents, RecursiveMode::Recursive)?;
        if let Some(patches) = &dirs.patches {
            if !patches.starts_with(&dirs.documents) {
                watcher.watch(patches, RecursiveMode::Recursive)?;
            }
        }

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(
            documents = %dirs.documents.display(),
            patches = ?dirs.patches,
            "watching indicator sources for changes"
        );
        self._watcher = Some(watcher);
        Ok(())
    }
}

/// Read and validate a document file, returning its raw bytes.
pub(super) fn load_document_file(path: &Path, options: &ReadOptions) -> Result<Vec<u8>> {
    let raw = fs::read(path)?;
    read_document(&raw, options)?;
    Ok(raw)
}

pub(super) fn scan_patches(dir: &Path) -> (Vec<Patch>, Vec<LoadResult>) {
    let mut results = Vec::new();
    let mut patches = Vec::new();
    for path in scan(dir, SourceKind::Patch, &mut results) {
        let status = match fs::read(&path)
            .map_err(Into::into)
            .and_then(|raw| read_patch(&raw))
        {
            Ok(patch) => {
                info!(path = %path.display(), matcher = %patch.matcher, "loaded patch");
                patches.push(patch);
                LoadStatus::Loaded {
                    id: format!("patch[{}]", patches.len() - 1),
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load patch");
                LoadStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        results.push(LoadResult {
            path,
            kind: SourceKind::Patch,
            status,
        });
    }
    (patches, results)
}

/// Collect YAML files under `dir` in sorted order, recording skipped files.
fn scan(dir: &Path, kind: SourceKind, results: &mut Vec<LoadResult>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        warn!(path = %dir.display(), %kind, "source directory does not exist");
        return files;
    }

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && is_hidden(e.path())));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "walkdir error, skipping entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if is_hidden(&path) {
            results.push(LoadResult::skipped(path, kind, "dotfile"));
        } else if !is_yaml(&path) {
            results.push(LoadResult::skipped(path, kind, "not a YAML file"));
        } else {
            files.push(path);
        }
    }
    files
}

pub(super) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

pub(super) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yml" || e == "yaml")
}
