//! Validation helper functions for configuration types.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::core::errors::{ModwalkError, Result};

/// Validate that a string value is not empty or whitespace-only.
pub fn validate_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ModwalkError::config_field(
            format!("Invalid {field}: '{value}'. Must be a non-empty string."),
            field,
        ));
    }
    Ok(())
}

/// Validate that a path argument is not empty or whitespace-only.
pub fn validate_path_argument(path: &Path, field: &str) -> Result<()> {
    let display = path.to_string_lossy();
    if display.trim().is_empty() {
        return Err(ModwalkError::config_field(
            format!("Invalid {field}: '{display}'. Must be a non-empty path."),
            field,
        ));
    }
    Ok(())
}

/// Validate and compile a list of glob patterns matched against file names.
pub fn compile_name_patterns(patterns: &[String], field: &str) -> Result<GlobSet> {
    if patterns.is_empty() {
        return Err(ModwalkError::validation(format!(
            "{field} must contain at least one pattern"
        )));
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| {
            ModwalkError::validation_field(
                format!("Invalid glob pattern in {field}: {err}"),
                field,
                "glob pattern",
                pattern.clone(),
            )
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|err| {
        ModwalkError::validation(format!("Failed to compile {field}: {err}"))
    })
}
