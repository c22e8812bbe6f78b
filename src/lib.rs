//! # Modwalk-RS: Directory Discovery and Module Loading
//!
//! Finds folders and module files under a root directory and loads modules,
//! handing their exports to caller callbacks. Every traversal and every batch
//! can run sequentially (deterministic order) or concurrently (all at once,
//! joined on the caller's task).
//!
//! - **Discovery**: folders or module files, one level or the whole tree
//! - **Loading**: default export, one named export, all named exports, or all
//! - **Folder processing**: every entry of a set of folders, with separate
//!   folder-level and file-level concurrency
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 API Layer (ModuleWalker)                  │
//! ├──────────────────────────────────────────────────────────┤
//! │ Reader     │ Collector   │ Exports        │ Batch        │
//! │ • listings │ • recursion │ • policies     │ • sequential │
//! │ • degrade  │ • filters   │ • truthiness   │ • concurrent │
//! ├──────────────────────────────────────────────────────────┤
//! │ Module loaders · Callbacks · Config · Errors              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modwalk_rs::{Callback, GetPathsOptions, LoadModuleOptions, LoadedExport, ModuleWalker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let walker = ModuleWalker::data_modules()?;
//!     let options = GetPathsOptions::default().with_recursive(true);
//!     let modules = walker.get_module_paths("./plugins", &options, None).await?;
//!
//!     let callback = Callback::from_async(|loaded: LoadedExport| async move {
//!         println!("{} -> {:?}", loaded.file_name, loaded.export);
//!         Ok(())
//!     });
//!     walker
//!         .load_module_paths(modules, &callback, &LoadModuleOptions::default())
//!         .await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Traversal and loading building blocks
pub mod core {
    //! Directory reading, path collection, module loading and batching.

    pub mod batch;
    pub mod callback;
    pub mod collector;
    pub mod config;
    pub mod diagnostics;
    pub mod errors;
    pub mod exports;
    pub mod module;
    pub mod reader;
}

// Public API
pub mod api {
    //! High-level walker interface.

    pub mod engine;
    pub mod results;
}

// Re-export primary types for convenience
pub use crate::api::engine::ModuleWalker;
pub use crate::api::results::{FolderFile, FolderItem, FolderModule, FolderPaths, LoadedExport};
pub use crate::core::callback::Callback;
pub use crate::core::collector::EntryFilter;
pub use crate::core::config::{
    ConcurrencyMode, DiscoveryConfig, ExportPolicy, FolderModuleOptions, GetPathsOptions,
    LoadFolderOptions, LoadModuleOptions, ModwalkConfig, ProcessFolderOptions,
};
pub use crate::core::errors::{ModwalkError, Result, ResultExt};
pub use crate::core::module::{DataModuleLoader, ModuleExport, ModuleLoader, ModuleNamespace, ModuleRegistry};
pub use crate::core::reader::{DirectoryEntry, DirectorySource, EntryKind, FsDirectorySource};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
