//! Module namespaces and the loaders that produce them.
//!
//! A loaded module is an ordered map of export names to export values. How a
//! file becomes a namespace is up to the [`ModuleLoader`]; a loader also decides
//! which file names it can import at all, which is narrower than the set of
//! names discovery treats as modules.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::core::config::DEFAULT_EXPORT_NAME;
use crate::core::errors::{ModwalkError, Result, ResultExt};

/// One exported value of a module.
#[derive(Clone)]
pub enum ModuleExport {
    /// Plain data export
    Value(Value),
    /// Host object exported by an in-process module
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl ModuleExport {
    /// Wrap a host object.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Arc::new(value))
    }

    /// Falsy exports are treated exactly like missing ones: `null`, `false`,
    /// numeric zero and the empty string. Host objects are never falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Value(Value::Null) => true,
            Self::Value(Value::Bool(flag)) => !flag,
            Self::Value(Value::Number(n)) => n.as_f64().map_or(false, |v| v == 0.0),
            Self::Value(Value::String(s)) => s.is_empty(),
            Self::Value(_) | Self::Opaque(_) => false,
        }
    }

    /// The data value, if this is a data export.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Opaque(_) => None,
        }
    }

    /// Downcast a host object export.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(object) => object.downcast_ref::<T>(),
            Self::Value(_) => None,
        }
    }
}

impl From<Value> for ModuleExport {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for ModuleExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

/// Export name to export value, in the order the module declares them.
pub type ModuleNamespace = IndexMap<String, ModuleExport>;

/// Build a namespace from `(name, export)` pairs.
pub fn namespace<I, K, V>(exports: I) -> ModuleNamespace
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ModuleExport>,
{
    exports
        .into_iter()
        .map(|(name, export)| (name.into(), export.into()))
        .collect()
}

/// Turns a module file into its namespace.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Whether files with this name can be imported at all.
    fn can_import(&self, file_name: &str) -> bool;

    /// Import the module at `url` (always a `file:` URL).
    async fn load(&self, url: &Url) -> Result<ModuleNamespace>;
}

/// Build the `file:` URL of a path, resolving relative paths against the
/// current directory.
pub fn file_url(path: &Path) -> Result<Url> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to resolve current directory")?
            .join(path)
    };
    Url::from_file_path(&absolute).map_err(|()| {
        ModwalkError::config_field(
            format!("Invalid module path: '{}'. Cannot build a file URL.", path.display()),
            "module_path",
        )
    })
}

fn url_to_path(url: &Url) -> Result<PathBuf> {
    url.to_file_path()
        .map_err(|()| ModwalkError::load("Not a file URL", url.as_str()))
}

fn has_extension(file_name: &str, extensions: &[String]) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            extensions.iter().any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Loads JSON and YAML documents as modules.
///
/// A top-level mapping becomes the namespace, keys in document order. Any other
/// top-level value becomes the default export. Files are read on every load.
#[derive(Debug, Clone)]
pub struct DataModuleLoader {
    extensions: Vec<String>,
}

/// Default implementation for [`DataModuleLoader`].
impl Default for DataModuleLoader {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string(), "yaml".to_string(), "yml".to_string()],
        }
    }
}

impl DataModuleLoader {
    /// Returns a shared reference to a default data loader.
    pub fn shared() -> Arc<dyn ModuleLoader> {
        Arc::new(Self::default())
    }

    fn parse(path: &Path, content: &str, url: &Url) -> Result<Value> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(content)
                .map_err(|e| ModwalkError::load_with_source("Invalid JSON module", url.as_str(), e))
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| ModwalkError::load_with_source("Invalid YAML module", url.as_str(), e))
        }
    }
}

#[async_trait]
impl ModuleLoader for DataModuleLoader {
    fn can_import(&self, file_name: &str) -> bool {
        has_extension(file_name, &self.extensions)
    }

    async fn load(&self, url: &Url) -> Result<ModuleNamespace> {
        let path = url_to_path(url)?;
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ModwalkError::load_with_source("Failed to read module file", url.as_str(), e)
        })?;
        debug!("Loading data module {}", url);

        Ok(match Self::parse(&path, &content, url)? {
            Value::Object(map) => map.into_iter().map(|(name, v)| (name, v.into())).collect(),
            other => namespace([(DEFAULT_EXPORT_NAME, other)]),
        })
    }
}

/// In-process module registry.
///
/// An embedding program registers namespaces under file paths; discovery finds
/// the files on disk and loading hands back the registered namespace. Only
/// registered paths can be loaded.
pub struct ModuleRegistry {
    modules: RwLock<HashMap<PathBuf, ModuleNamespace>>,
    extensions: Vec<String>,
}

/// Default implementation for [`ModuleRegistry`].
impl Default for ModuleRegistry {
    /// Importable extensions `mjs js cjs mts cts`.
    fn default() -> Self {
        Self::with_extensions(["mjs", "js", "cjs", "mts", "cts"])
    }
}

impl ModuleRegistry {
    /// Create an empty registry importing the given extensions.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: RwLock::new(HashMap::new()),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Register (or replace) the namespace served for `path`.
    pub fn register(&self, path: impl Into<PathBuf>, exports: ModuleNamespace) -> Result<()> {
        let mut modules = self
            .modules
            .write()
            .map_err(|_| ModwalkError::internal("Module registry lock poisoned"))?;
        modules.insert(path.into(), exports);
        Ok(())
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.read().map_or(0, |modules| modules.len())
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.len())
            .field("extensions", &self.extensions)
            .finish()
    }
}

#[async_trait]
impl ModuleLoader for ModuleRegistry {
    fn can_import(&self, file_name: &str) -> bool {
        has_extension(file_name, &self.extensions)
    }

    async fn load(&self, url: &Url) -> Result<ModuleNamespace> {
        let path = url_to_path(url)?;
        let modules = self
            .modules
            .read()
            .map_err(|_| ModwalkError::internal("Module registry lock poisoned"))?;
        modules
            .get(&path)
            .cloned()
            .ok_or_else(|| ModwalkError::load("Module is not registered", url.as_str()))
    }
}
