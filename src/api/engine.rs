//! The module walker: discovery and loading entry points.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobSet;
use tracing::debug;
use url::Url;

use crate::api::results::{FolderFile, FolderItem, FolderModule, FolderPaths, LoadedExport};
use crate::core::batch::process_items;
use crate::core::callback::Callback;
use crate::core::collector::{collect_paths, folder_classifier, module_classifier, EntryFilter};
use crate::core::config::validation::validate_path_argument;
use crate::core::config::{
    ConcurrencyMode, DiscoveryConfig, ExportPolicy, FolderModuleOptions, GetPathsOptions,
    LoadFolderOptions, LoadModuleOptions, ModwalkConfig, ProcessFolderOptions,
};
use crate::core::errors::{Result, ResultExt};
use crate::core::exports::resolve_exports;
use crate::core::module::{file_url, DataModuleLoader, ModuleExport, ModuleLoader};
use crate::core::reader::{DirectoryEntry, DirectorySource, FsDirectorySource};

/// Which exports a load delivers, shared by the module and folder loaders.
struct ExportSelection<'a> {
    import_enabled: bool,
    policy: ExportPolicy,
    preferred_name: &'a str,
}

/// Discovers folders and modules and feeds loaded exports to callbacks.
pub struct ModuleWalker {
    /// Directory listings
    source: Arc<dyn DirectorySource>,

    /// Turns module files into namespaces
    loader: Arc<dyn ModuleLoader>,

    /// Module discovery patterns
    discovery: DiscoveryConfig,

    /// Compiled form of `discovery.module_patterns`
    module_matcher: GlobSet,
}

impl ModuleWalker {
    /// Create a walker over the local filesystem with the default discovery patterns.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Result<Self> {
        Self::with_discovery(loader, DiscoveryConfig::default())
    }

    /// Create a walker that loads JSON and YAML data modules.
    pub fn data_modules() -> Result<Self> {
        Self::new(DataModuleLoader::shared())
    }

    /// Create a walker with custom discovery patterns.
    pub fn with_discovery(loader: Arc<dyn ModuleLoader>, discovery: DiscoveryConfig) -> Result<Self> {
        discovery.validate()?;
        let module_matcher = discovery.build_matcher()?;
        debug!(
            "Module walker ready with {} discovery patterns",
            discovery.module_patterns.len()
        );
        Ok(Self {
            source: FsDirectorySource::shared(),
            loader,
            discovery,
            module_matcher,
        })
    }

    /// Create a walker from a full configuration document.
    pub fn from_config(config: &ModwalkConfig, loader: Arc<dyn ModuleLoader>) -> Result<Self> {
        config.validate()?;
        Self::with_discovery(loader, config.discovery.clone())
    }

    /// Replace the directory source.
    pub fn with_source(mut self, source: Arc<dyn DirectorySource>) -> Self {
        self.source = source;
        self
    }

    /// Discovery configuration in use
    pub fn discovery(&self) -> &DiscoveryConfig {
        &self.discovery
    }

    /// Module loader in use
    pub fn loader(&self) -> &Arc<dyn ModuleLoader> {
        &self.loader
    }

    /// List the directories under `dir`, optionally recursively.
    ///
    /// Directories that cannot be read contribute nothing; the failure is
    /// logged and the walk continues. `filter`, when given, must also accept
    /// a directory for it to be returned.
    pub async fn get_folder_paths(
        &self,
        dir: impl AsRef<Path>,
        options: &GetPathsOptions,
        filter: Option<EntryFilter>,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        validate_path_argument(dir, "dir_path")?;

        let classify = folder_classifier(filter);
        let paths = collect_paths(self.source.as_ref(), dir, options, &*classify).await;
        debug!("Found {} folders under {}", paths.len(), dir.display());
        Ok(paths)
    }

    /// List the module files under `dir`, optionally recursively.
    ///
    /// A file is a module when its name matches a discovery pattern, or when
    /// `filter` accepts it if one is given.
    pub async fn get_module_paths(
        &self,
        dir: impl AsRef<Path>,
        options: &GetPathsOptions,
        filter: Option<EntryFilter>,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        validate_path_argument(dir, "dir_path")?;

        let classify = module_classifier(self.module_matcher.clone(), filter);
        let paths = collect_paths(self.source.as_ref(), dir, options, &*classify).await;
        debug!("Found {} modules under {}", paths.len(), dir.display());
        Ok(paths)
    }

    /// Invoke `callback` once per folder path with the folder's name.
    pub async fn load_folder_paths<I, P>(
        &self,
        paths: I,
        callback: &Callback<FolderItem>,
        options: &LoadFolderOptions,
    ) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        callback.ensure_schedulable(options.concurrency, "concurrency")?;
        let paths = path_arguments(paths, "folder_path")?;

        process_items(paths, options.concurrency, |path| async move {
            let name = entry_name(&path);
            callback.invoke(FolderItem { path, name }).await
        })
        .await
    }

    /// Load each module path and invoke `callback` once per selected export.
    ///
    /// With importing disabled every path yields exactly one callback with no
    /// export. Otherwise files the loader cannot import are skipped silently,
    /// and a module missing its required export fails the whole call.
    pub async fn load_module_paths<I, P>(
        &self,
        paths: I,
        callback: &Callback<LoadedExport>,
        options: &LoadModuleOptions,
    ) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        options.validate()?;
        callback.ensure_schedulable(options.concurrency, "concurrency")?;
        let paths = path_arguments(paths, "module_path")?;
        let selection = ExportSelection {
            import_enabled: options.import_enabled,
            policy: options.export_policy,
            preferred_name: &options.preferred_export_name,
        };
        let selection = &selection;

        process_items(paths, options.concurrency, |path| {
            self.deliver_module(path, callback, selection)
        })
        .await
    }

    /// Load every module file directly inside each folder.
    ///
    /// Subdirectories are not descended into. With importing enabled only
    /// file entries are loaded; with importing disabled every entry yields
    /// one callback with no export. The callback receives the folder and
    /// listing entry with each export.
    pub async fn load_folder_modules(
        &self,
        folders: impl Into<FolderPaths>,
        callback: &Callback<FolderModule>,
        options: &FolderModuleOptions,
    ) -> Result<()> {
        options.validate()?;
        callback.ensure_schedulable(options.file_concurrency, "file_concurrency")?;
        let folders = folder_arguments(folders.into())?;
        let selection = ExportSelection {
            import_enabled: options.import_enabled,
            policy: options.export_policy,
            preferred_name: &options.preferred_export_name,
        };
        let selection = &selection;

        self.visit_folders(folders, &options.process_options(), |entry, folder_path| {
            self.deliver_folder_module(entry, folder_path, callback, selection)
        })
        .await
    }

    /// Invoke `callback` for every entry directly inside each folder.
    ///
    /// A folder that cannot be listed fails the call with an I/O error.
    pub async fn process_folder_paths(
        &self,
        folders: impl Into<FolderPaths>,
        callback: &Callback<FolderFile>,
        options: &ProcessFolderOptions,
    ) -> Result<()> {
        callback.ensure_schedulable(options.file_concurrency, "file_concurrency")?;
        let folders = folder_arguments(folders.into())?;

        self.visit_folders(folders, options, |entry, folder_path| {
            callback.invoke(FolderFile { entry, folder_path })
        })
        .await
    }

    async fn visit_folders<F, Fut>(
        &self,
        folders: Vec<PathBuf>,
        options: &ProcessFolderOptions,
        visit: F,
    ) -> Result<()>
    where
        F: Fn(DirectoryEntry, PathBuf) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let visit = &visit;
        process_items(folders, options.folder_concurrency, |folder| {
            self.visit_folder(folder, options.file_concurrency, visit)
        })
        .await
    }

    async fn visit_folder<F, Fut>(
        &self,
        folder: PathBuf,
        file_concurrency: ConcurrencyMode,
        visit: &F,
    ) -> Result<()>
    where
        F: Fn(DirectoryEntry, PathBuf) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let entries = self
            .source
            .list(&folder)
            .await
            .with_context(|| format!("Failed to read folder: {}", folder.display()))?;
        debug!("Processing {} entries in {}", entries.len(), folder.display());

        process_items(entries, file_concurrency, |entry| visit(entry, folder.clone())).await
    }

    async fn deliver_module(
        &self,
        path: PathBuf,
        callback: &Callback<LoadedExport>,
        selection: &ExportSelection<'_>,
    ) -> Result<()> {
        let url = file_url(&path)?;
        let file_name = entry_name(&path);
        for export in self.select_exports(&url, &file_name, selection).await? {
            callback
                .invoke(LoadedExport {
                    export,
                    url: url.clone(),
                    file_name: file_name.clone(),
                })
                .await?;
        }
        Ok(())
    }

    async fn deliver_folder_module(
        &self,
        entry: DirectoryEntry,
        folder_path: PathBuf,
        callback: &Callback<FolderModule>,
        selection: &ExportSelection<'_>,
    ) -> Result<()> {
        if selection.import_enabled && !entry.is_file() {
            return Ok(());
        }
        let url = file_url(&folder_path.join(entry.name_os()))?;
        let file_name = entry.name_lossy().into_owned();
        for export in self.select_exports(&url, &file_name, selection).await? {
            callback
                .invoke(FolderModule {
                    export,
                    url: url.clone(),
                    file_name: file_name.clone(),
                    folder_path: folder_path.clone(),
                    entry: entry.clone(),
                })
                .await?;
        }
        Ok(())
    }

    /// The exports to deliver for one module file, in delivery order.
    async fn select_exports(
        &self,
        url: &Url,
        file_name: &str,
        selection: &ExportSelection<'_>,
    ) -> Result<Vec<Option<ModuleExport>>> {
        if !selection.import_enabled {
            return Ok(vec![None]);
        }
        if !self.loader.can_import(file_name) {
            debug!("Skipping non-importable module {}", url);
            return Ok(Vec::new());
        }

        let namespace = self.loader.load(url).await?;
        let exports = resolve_exports(
            &namespace,
            selection.policy,
            selection.preferred_name,
            url.as_str(),
        )?;
        debug!("Loaded {} exports from {}", exports.len(), url);
        Ok(exports.into_iter().map(Some).collect())
    }
}

impl std::fmt::Debug for ModuleWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleWalker")
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn path_arguments<I, P>(paths: I, field: &str) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .map(|path| {
            let path = path.into();
            validate_path_argument(&path, field)?;
            Ok(path)
        })
        .collect()
}

fn folder_arguments(folders: FolderPaths) -> Result<Vec<PathBuf>> {
    path_arguments(folders.into_inner(), "folder_path")
}
