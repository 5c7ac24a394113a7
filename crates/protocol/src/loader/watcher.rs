//! Filesystem event handler for the notify watcher (hot-reload).

use std::path::{Path, PathBuf};

use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::read::ReadOptions;
use crate::store::{AggregationStore, DocumentKey};

use super::core::{is_hidden, is_yaml, load_document_file, scan_patches};

/// Canonical source directories captured when the watcher starts.
#[derive(Debug, Clone)]
pub(super) struct WatchedDirs {
    pub documents: PathBuf,
    pub patches: Option<PathBuf>,
    pub options: ReadOptions,
}

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(event: &Event, store: &AggregationStore, dirs: &WatchedDirs) {
    let mut reload_patches = false;

    for path in &event.paths {
        if !is_yaml(path) || is_hidden(path) {
            continue;
        }

        let is_patch = dirs
            .patches
            .as_ref()
            .is_some_and(|patches| path.starts_with(patches));
        if is_patch {
            reload_patches |= matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            );
            continue;
        }
        if !path.starts_with(&dirs.documents) {
            continue;
        }

        match &event.kind {
            EventKind::Create(_) | EventKind::Modify(_) if path.is_file() => {
                reload_document(path, store, &dirs.options)
            }
            // Renamed away or removed.
            EventKind::Modify(_) | EventKind::Remove(_) => {
                let key = DocumentKey::for_path(path);
                if store.delete(&key) {
                    info!(key = %key, path = %path.display(), "removed document after file deletion");
                }
            }
            _ => {}
        }
    }

    if reload_patches {
        if let Some(dir) = &dirs.patches {
            reload_patch_set(dir, store);
        }
    }
}

fn reload_document(path: &Path, store: &AggregationStore, options: &ReadOptions) {
    match load_document_file(path, options) {
        Ok(raw) => {
            let key = DocumentKey::for_path(path);
            let outcome = store.upsert_with(key.clone(), raw, options.clone());
            info!(key = %key, ?outcome, path = %path.display(), "hot-reloaded document");
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to load document during hot-reload, keeping previous version"
            );
        }
    }
}

/// Rescan the whole patch directory. Any failing file keeps the previous
/// patch set in place, since order across files is significant.
fn reload_patch_set(dir: &Path, store: &AggregationStore) {
    let (patches, results) = scan_patches(dir);
    if let Some(failed) = results.iter().find(|r| r.is_failed()) {
        warn!(
            path = %failed.path.display(),
            "failed to load patch during hot-reload, keeping previous patch set"
        );
        return;
    }
    info!(count = patches.len(), "hot-reloaded patch set");
    store.replace_patches(patches);
}
