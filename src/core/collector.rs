//! Path collection over a directory tree.
//!
//! Each level is classified with a predicate, then subdirectories are walked
//! either one at a time or all at once. There is no depth or width limit: a
//! concurrent walk of a directory with N subdirectories issues N listings at
//! once, recursively.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use globset::GlobSet;
use tracing::debug;

use crate::core::config::{ConcurrencyMode, GetPathsOptions};
use crate::core::reader::{read_directory, DirectoryEntry, DirectorySource};

/// Predicate over `(entry, full_path, directory_path)`.
pub type EntryPredicate = dyn Fn(&DirectoryEntry, &Path, &Path) -> bool + Send + Sync;

/// Caller-supplied entry filter.
pub type EntryFilter = Arc<EntryPredicate>;

/// Collect the paths under `dir` accepted by `classify`.
///
/// Results are flattened: the current level first (in listing order), then the
/// results of each subdirectory. Sequential mode walks subdirectories in
/// listing order; concurrent mode starts every subdirectory walk at once and
/// joins them.
pub fn collect_paths<'a>(
    source: &'a dyn DirectorySource,
    dir: &'a Path,
    options: &'a GetPathsOptions,
    classify: &'a EntryPredicate,
) -> BoxFuture<'a, Vec<PathBuf>> {
    Box::pin(async move {
        let entries = read_directory(source, dir).await;

        let mut paths: Vec<PathBuf> = entries
            .iter()
            .filter_map(|entry| {
                let full_path = dir.join(entry.name_os());
                classify(entry, &full_path, dir).then_some(full_path)
            })
            .collect();

        if !options.recursive {
            return paths;
        }

        let subdirs: Vec<PathBuf> = entries
            .iter()
            .filter(|entry| entry.is_directory())
            .map(|entry| dir.join(entry.name_os()))
            .collect();

        if subdirs.is_empty() {
            return paths;
        }

        debug!(
            "Descending into {} subdirectories of {} ({:?})",
            subdirs.len(),
            dir.display(),
            options.concurrency
        );

        match options.concurrency {
            ConcurrencyMode::Concurrent => {
                let nested = future::join_all(
                    subdirs
                        .iter()
                        .map(|subdir| collect_paths(source, subdir, options, classify)),
                )
                .await;
                paths.extend(nested.into_iter().flatten());
            }
            ConcurrencyMode::Sequential => {
                for subdir in &subdirs {
                    paths.extend(collect_paths(source, subdir, options, classify).await);
                }
            }
        }

        paths
    })
}

/// Classifier accepting files whose name matches `matcher`, or `filter` when given.
pub fn module_classifier(matcher: GlobSet, filter: Option<EntryFilter>) -> Box<EntryPredicate> {
    Box::new(move |entry: &DirectoryEntry, full_path: &Path, dir: &Path| {
        if !entry.is_file() {
            return false;
        }
        match &filter {
            Some(filter) => filter(entry, full_path, dir),
            None => matcher.is_match(entry.name_os()),
        }
    })
}

/// Classifier accepting directories, narrowed by `filter` when given.
pub fn folder_classifier(filter: Option<EntryFilter>) -> Box<EntryPredicate> {
    Box::new(move |entry: &DirectoryEntry, full_path: &Path, dir: &Path| {
        entry.is_directory() && filter.as_ref().map_or(true, |f| f(entry, full_path, dir))
    })
}
