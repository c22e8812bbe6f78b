//! Error types for the modwalk-rs library.
//!
//! Configuration mistakes are reported before any filesystem access, export
//! resolution failures are reported per module, and directory read failures
//! never surface here at all (they degrade to an empty listing, see
//! [`crate::core::reader`]).

use std::io;

use thiserror::Error;

/// Main result type for modwalk operations.
pub type Result<T> = std::result::Result<T, ModwalkError>;

/// Error type for all modwalk operations.
#[derive(Error, Debug)]
pub enum ModwalkError {
    /// I/O related errors (folder listings that are not allowed to degrade)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Invalid argument or option supplied by the caller
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Option or argument that caused the error
        field: Option<String>,
    },

    /// Validation errors for configuration documents
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field that failed validation
        field: Option<String>,
        /// Expected value or format
        expected: Option<String>,
        /// Actual value received
        actual: Option<String>,
    },

    /// Requested export is absent or falsy
    #[error("Invalid module export. {message}. Module: {module}")]
    InvalidExport {
        /// Error description
        message: String,
        /// File URL of the module
        module: String,
    },

    /// The module loader failed to produce a namespace
    #[error("Failed to load module {module}: {message}")]
    Load {
        /// Error description
        message: String,
        /// File URL of the module
        module: String,
        /// Underlying loader error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being handled
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A user callback reported failure
    #[error("Callback failed: {message}")]
    Callback {
        /// Error description
        message: String,
        /// Error returned by the callback, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl ModwalkError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            expected: None,
            actual: None,
        }
    }

    /// Create a new validation error with the offending field and values
    pub fn validation_field(
        message: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        }
    }

    /// Create a new export resolution error
    pub fn invalid_export(message: impl Into<String>, module: impl Into<String>) -> Self {
        Self::InvalidExport {
            message: message.into(),
            module: module.into(),
        }
    }

    /// Create a new module load error
    pub fn load(message: impl Into<String>, module: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            module: module.into(),
            source: None,
        }
    }

    /// Create a new module load error wrapping the loader's error
    pub fn load_with_source(
        message: impl Into<String>,
        module: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Load {
            message: message.into(),
            module: module.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new callback error
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Whether this error was raised by argument or option checks.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Validation { .. })
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Internal { context: ctx, .. } => {
                *ctx = Some(context.into());
            }
            Self::Io { message, .. } | Self::Callback { message, .. } => {
                *message = format!("{}: {message}", context.into());
            }
            _ => {} // Other variants carry their own location
        }
        self
    }
}

impl From<io::Error> for ModwalkError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for ModwalkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for ModwalkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<anyhow::Error> for ModwalkError {
    fn from(err: anyhow::Error) -> Self {
        Self::Callback {
            message: format!("{err:#}"),
            source: Some(err.into()),
        }
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ModwalkError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}
