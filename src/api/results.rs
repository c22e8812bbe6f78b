//! Values handed to user callbacks, and the folder list input type.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::module::ModuleExport;
use crate::core::reader::DirectoryEntry;

/// A folder delivered by `load_folder_paths`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderItem {
    /// Folder path as given
    pub path: PathBuf,
    /// Last path component
    pub name: String,
}

/// One export delivered by `load_module_paths`.
#[derive(Debug, Clone)]
pub struct LoadedExport {
    /// The export, or `None` when importing is disabled
    pub export: Option<ModuleExport>,
    /// `file:` URL of the module
    pub url: Url,
    /// File name of the module
    pub file_name: String,
}

/// One export delivered by `load_folder_modules`.
#[derive(Debug, Clone)]
pub struct FolderModule {
    /// The export, or `None` when importing is disabled
    pub export: Option<ModuleExport>,
    /// `file:` URL of the module
    pub url: Url,
    /// File name of the module
    pub file_name: String,
    /// Folder the module was found in
    pub folder_path: PathBuf,
    /// Listing entry of the module
    pub entry: DirectoryEntry,
}

/// One folder entry delivered by `process_folder_paths`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderFile {
    /// Listing entry
    pub entry: DirectoryEntry,
    /// Folder being processed
    pub folder_path: PathBuf,
}

/// One folder or a list of folders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPaths(Vec<PathBuf>);

impl FolderPaths {
    /// Number of folders
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no folders
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the folders in order
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.0.iter()
    }

    /// Take the folder list
    pub fn into_inner(self) -> Vec<PathBuf> {
        self.0
    }
}

impl From<PathBuf> for FolderPaths {
    fn from(path: PathBuf) -> Self {
        Self(vec![path])
    }
}

impl From<&Path> for FolderPaths {
    fn from(path: &Path) -> Self {
        Self(vec![path.to_path_buf()])
    }
}

impl From<&str> for FolderPaths {
    fn from(path: &str) -> Self {
        Self(vec![PathBuf::from(path)])
    }
}

impl From<String> for FolderPaths {
    fn from(path: String) -> Self {
        Self(vec![PathBuf::from(path)])
    }
}

impl From<Vec<PathBuf>> for FolderPaths {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }
}

impl From<&[PathBuf]> for FolderPaths {
    fn from(paths: &[PathBuf]) -> Self {
        Self(paths.to_vec())
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for FolderPaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
