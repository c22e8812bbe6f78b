//! Output formatting for discovered paths and loaded exports.

use crate::cli::args::OutputFormat;
use modwalk_rs::{LoadedExport, ModuleExport};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Print discovered paths to stdout.
pub fn print_paths(paths: &[PathBuf], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for path in paths {
                println!("{}", path.display());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(paths)?);
        }
    }
    Ok(())
}

/// One JSON line describing a delivered export.
pub fn export_line(loaded: &LoadedExport) -> serde_json::Result<String> {
    let export = match &loaded.export {
        Some(ModuleExport::Value(value)) => value.clone(),
        Some(ModuleExport::Opaque(_)) => Value::String("[opaque]".to_string()),
        None => Value::Null,
    };
    serde_json::to_string(&json!({
        "url": loaded.url.as_str(),
        "file_name": loaded.file_name,
        "export": export,
    }))
}
