//! Configuration types and management for modwalk-rs.
//!
//! Every operation takes a typed options record. Records derive `Deserialize`
//! with `#[serde(default)]`, so a partial YAML/JSON document is merged over the
//! documented defaults, and unknown keys are rejected. Option values are
//! checked by `validate()` before any filesystem work starts.

pub mod validation;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use globset::GlobSet;
use serde::{Deserialize, Serialize};

use crate::core::errors::{ModwalkError, Result, ResultExt};

pub use validation::{compile_name_patterns, validate_non_empty, validate_path_argument};

/// Reserved export name of a module's default export.
pub const DEFAULT_EXPORT_NAME: &str = "default";

/// Preferred export name meaning "every named export".
pub const WILDCARD_EXPORT_NAME: &str = "*";

/// Whether a batch of independent operations runs one at a time or all at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// Await each operation before starting the next.
    Sequential,
    /// Start every operation, then wait for all of them.
    #[default]
    Concurrent,
}

impl ConcurrencyMode {
    /// Build a mode from a boolean "is concurrent" flag.
    pub const fn from_flag(concurrent: bool) -> Self {
        if concurrent {
            Self::Concurrent
        } else {
            Self::Sequential
        }
    }

    /// Returns `true` for [`ConcurrencyMode::Concurrent`].
    pub const fn is_concurrent(self) -> bool {
        matches!(self, Self::Concurrent)
    }
}

/// Which export(s) of a loaded module are delivered to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPolicy {
    /// The export bound to `"default"`.
    #[default]
    Default,
    /// The preferred named export, or every non-default export for `"*"`.
    Named,
    /// Every export, default included.
    All,
}

impl ExportPolicy {
    /// Every accepted policy name, in documentation order.
    pub const NAMES: [&'static str; 3] = ["default", "named", "all"];

    /// Policy name as used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Named => "named",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ExportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportPolicy {
    type Err = ModwalkError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "default" => Ok(Self::Default),
            "named" => Ok(Self::Named),
            "all" => Ok(Self::All),
            other => Err(ModwalkError::config_field(
                format!(
                    "Invalid export_policy: '{other}'. Must be one of: {}",
                    Self::NAMES.join(", ")
                ),
                "export_policy",
            )),
        }
    }
}

/// Options for folder and module path discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GetPathsOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// How sibling subdirectories are traversed
    pub concurrency: ConcurrencyMode,
}

/// Default implementation for [`GetPathsOptions`].
impl Default for GetPathsOptions {
    /// Non-recursive, concurrent.
    fn default() -> Self {
        Self {
            recursive: false,
            concurrency: ConcurrencyMode::Concurrent,
        }
    }
}

impl GetPathsOptions {
    /// Enable or disable recursion.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the traversal concurrency mode.
    pub fn with_concurrency(mut self, concurrency: ConcurrencyMode) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Options for invoking a callback per folder path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadFolderOptions {
    /// How the callback is scheduled across folders
    pub concurrency: ConcurrencyMode,
}

impl LoadFolderOptions {
    /// Set the callback concurrency mode.
    pub fn with_concurrency(mut self, concurrency: ConcurrencyMode) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Options for loading modules from a list of file paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadModuleOptions {
    /// How modules are loaded across paths
    pub concurrency: ConcurrencyMode,
    /// Which exports are delivered
    pub export_policy: ExportPolicy,
    /// Export name used by the `named` policy (`"*"` for all named exports)
    pub preferred_export_name: String,
    /// When disabled, the callback receives `None` instead of an export
    pub import_enabled: bool,
}

/// Default implementation for [`LoadModuleOptions`].
impl Default for LoadModuleOptions {
    /// Concurrent, default export, import enabled.
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyMode::Concurrent,
            export_policy: ExportPolicy::Default,
            preferred_export_name: DEFAULT_EXPORT_NAME.to_string(),
            import_enabled: true,
        }
    }
}

impl LoadModuleOptions {
    /// Set the load concurrency mode.
    pub fn with_concurrency(mut self, concurrency: ConcurrencyMode) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Select the export policy and preferred export name together.
    pub fn with_exports(mut self, policy: ExportPolicy, preferred: impl Into<String>) -> Self {
        self.export_policy = policy;
        self.preferred_export_name = preferred.into();
        self
    }

    /// Enable or disable importing.
    pub fn with_import_enabled(mut self, enabled: bool) -> Self {
        self.import_enabled = enabled;
        self
    }

    /// Validate the option values
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.preferred_export_name, "preferred_export_name")
    }
}

/// Options for loading every module found directly inside folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolderModuleOptions {
    /// How files inside one folder are loaded
    pub file_concurrency: ConcurrencyMode,
    /// How folders are processed relative to each other
    pub folder_concurrency: ConcurrencyMode,
    /// Which exports are delivered
    pub export_policy: ExportPolicy,
    /// Export name used by the `named` policy (`"*"` for all named exports)
    pub preferred_export_name: String,
    /// When disabled, the callback receives `None` instead of an export
    pub import_enabled: bool,
}

/// Default implementation for [`FolderModuleOptions`].
impl Default for FolderModuleOptions {
    /// Concurrent at both levels, default export, import enabled.
    fn default() -> Self {
        Self {
            file_concurrency: ConcurrencyMode::Concurrent,
            folder_concurrency: ConcurrencyMode::Concurrent,
            export_policy: ExportPolicy::Default,
            preferred_export_name: DEFAULT_EXPORT_NAME.to_string(),
            import_enabled: true,
        }
    }
}

impl FolderModuleOptions {
    /// Set file-level and folder-level concurrency.
    pub fn with_concurrency(mut self, files: ConcurrencyMode, folders: ConcurrencyMode) -> Self {
        self.file_concurrency = files;
        self.folder_concurrency = folders;
        self
    }

    /// Select the export policy and preferred export name together.
    pub fn with_exports(mut self, policy: ExportPolicy, preferred: impl Into<String>) -> Self {
        self.export_policy = policy;
        self.preferred_export_name = preferred.into();
        self
    }

    /// Enable or disable importing.
    pub fn with_import_enabled(mut self, enabled: bool) -> Self {
        self.import_enabled = enabled;
        self
    }

    /// Validate the option values
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.preferred_export_name, "preferred_export_name")
    }

    pub(crate) fn process_options(&self) -> ProcessFolderOptions {
        ProcessFolderOptions {
            file_concurrency: self.file_concurrency,
            folder_concurrency: self.folder_concurrency,
        }
    }
}

/// Options for visiting every entry of a set of folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessFolderOptions {
    /// How entries inside one folder are visited
    pub file_concurrency: ConcurrencyMode,
    /// How folders are processed relative to each other
    pub folder_concurrency: ConcurrencyMode,
}

/// Default implementation for [`ProcessFolderOptions`].
impl Default for ProcessFolderOptions {
    /// Sequential at both levels.
    fn default() -> Self {
        Self {
            file_concurrency: ConcurrencyMode::Sequential,
            folder_concurrency: ConcurrencyMode::Sequential,
        }
    }
}

/// Which file names count as modules during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Glob patterns matched against the entry's file name
    pub module_patterns: Vec<String>,
}

/// Default implementation for [`DiscoveryConfig`].
impl Default for DiscoveryConfig {
    /// Script sources plus JSON/YAML data modules.
    fn default() -> Self {
        Self {
            module_patterns: Self::default_module_patterns(),
        }
    }
}

impl DiscoveryConfig {
    fn default_module_patterns() -> Vec<String> {
        ["*.{mjs,js,cjs,mts,cts,ts,jsx,tsx}", "*.json", "*.{yaml,yml}"]
            .iter()
            .map(|pattern| (*pattern).to_string())
            .collect()
    }

    /// Compile the module patterns
    pub fn build_matcher(&self) -> Result<GlobSet> {
        compile_name_patterns(&self.module_patterns, "discovery.module_patterns")
    }

    /// Validate the discovery configuration
    pub fn validate(&self) -> Result<()> {
        self.build_matcher().map(|_| ())
    }
}

/// Main configuration document, as read by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModwalkConfig {
    /// Module file discovery
    pub discovery: DiscoveryConfig,
    /// Path discovery options
    pub paths: GetPathsOptions,
    /// Module loading options
    pub load: LoadModuleOptions,
    /// Folder-level module loading options
    pub folders: FolderModuleOptions,
}

/// Configuration I/O and validation for [`ModwalkConfig`].
impl ModwalkConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.discovery.validate()?;
        self.load.validate()?;
        self.folders.validate()?;
        Ok(())
    }
}
