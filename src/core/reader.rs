//! Directory listing with entry classification.
//!
//! [`read_directory`] never fails: when a listing cannot be produced (missing
//! directory, permission error, a subdirectory removed mid-walk) the failure is
//! logged and an empty listing is returned, so one bad subtree does not abort a
//! whole traversal.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::diagnostics::describe_failure;
use crate::core::errors::ModwalkError;

/// Kind of a directory entry. Symbolic links are not followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symlink, socket, fifo or device
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// File name of the entry (not the full path), exactly as listed
    pub name: OsString,
    /// Entry classification
    pub kind: EntryKind,
}

impl DirectoryEntry {
    /// Create an entry
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The name as text; bytes that are not valid UTF-8 are replaced.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    /// The name as listed, for joining onto the parent path.
    pub fn name_os(&self) -> &OsStr {
        &self.name
    }

    /// Returns `true` for regular files.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Returns `true` for directories.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Source of directory listings.
///
/// The default implementation is the local filesystem; alternative sources
/// (virtual trees, fault injection in tests) plug in here.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// List the entries of `path` in listing order.
    async fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>>;
}

/// [`DirectorySource`] backed by `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDirectorySource;

impl FsDirectorySource {
    /// Returns a shared reference to the filesystem source.
    pub fn shared() -> Arc<dyn DirectorySource> {
        Arc::new(Self)
    }
}

#[async_trait]
impl DirectorySource for FsDirectorySource {
    async fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        let mut reader = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();
        loop {
            let entry = match reader.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    // Keep what was read before the listing broke off.
                    warn!(
                        "Directory listing of {} ended early after {} entries: {}",
                        path.display(),
                        entries.len(),
                        err
                    );
                    break;
                }
            };
            let kind = entry.file_type().await.map(classify_file_type);
            entries.extend(accept_entry(path, entry.file_name(), kind));
        }
        Ok(entries)
    }
}

fn classify_file_type(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    }
}

/// An entry whose type could not be read (usually removed mid-listing) is
/// logged and dropped without affecting its siblings.
fn accept_entry(dir: &Path, name: OsString, kind: io::Result<EntryKind>) -> Option<DirectoryEntry> {
    match kind {
        Ok(kind) => Some(DirectoryEntry::new(name, kind)),
        Err(err) => {
            warn!("Skipping entry {}: {}", dir.join(&name).display(), err);
            None
        }
    }
}

/// List `path`, logging and degrading to an empty listing on failure.
pub async fn read_directory(source: &dyn DirectorySource, path: &Path) -> Vec<DirectoryEntry> {
    match source.list(path).await {
        Ok(entries) => {
            debug!("Listed {} entries in {}", entries.len(), path.display());
            entries
        }
        Err(err) => {
            let err = ModwalkError::io("Directory listing failed", err);
            warn!(
                "{}",
                describe_failure(
                    &format!("Failed to read directory. Directory path: {}", path.display()),
                    &err,
                )
            );
            Vec::new()
        }
    }
}
