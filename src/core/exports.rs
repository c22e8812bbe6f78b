//! Export resolution for loaded modules.
//!
//! A single requested export (the default export, or one preferred name) must
//! be present and truthy or the module fails with
//! [`ModwalkError::InvalidExport`]. Bulk requests (`all`, or `named` with the
//! `"*"` wildcard) skip falsy entries with a warning instead.

use tracing::warn;

use crate::core::config::{ExportPolicy, DEFAULT_EXPORT_NAME, WILDCARD_EXPORT_NAME};
use crate::core::errors::{ModwalkError, Result};
use crate::core::module::{ModuleExport, ModuleNamespace};

/// Resolve the exports of `namespace` requested by `policy`.
///
/// `module` identifies the module in diagnostics (its file URL). Bulk results
/// keep the namespace's own order.
pub fn resolve_exports(
    namespace: &ModuleNamespace,
    policy: ExportPolicy,
    preferred_name: &str,
    module: &str,
) -> Result<Vec<ModuleExport>> {
    match policy {
        ExportPolicy::All => Ok(collect_truthy(namespace, module, |_| true, "a default or named")),
        ExportPolicy::Named if preferred_name == WILDCARD_EXPORT_NAME => Ok(collect_truthy(
            namespace,
            module,
            |name| name != DEFAULT_EXPORT_NAME,
            "a named",
        )),
        ExportPolicy::Named => single_export(namespace, preferred_name, module).map(|e| vec![e]),
        ExportPolicy::Default => {
            single_export(namespace, DEFAULT_EXPORT_NAME, module).map(|e| vec![e])
        }
    }
}

fn collect_truthy(
    namespace: &ModuleNamespace,
    module: &str,
    include: impl Fn(&str) -> bool,
    kind: &str,
) -> Vec<ModuleExport> {
    let mut exports = Vec::with_capacity(namespace.len());
    for (name, export) in namespace {
        if !include(name) {
            continue;
        }
        if export.is_falsy() {
            warn!(
                "Invalid module export. Must be {kind} export. Unable to verify export '{name}'. Module: {module}"
            );
            continue;
        }
        exports.push(export.clone());
    }
    exports
}

fn single_export(namespace: &ModuleNamespace, name: &str, module: &str) -> Result<ModuleExport> {
    match namespace.get(name) {
        Some(export) if !export.is_falsy() => Ok(export.clone()),
        _ if name == DEFAULT_EXPORT_NAME => Err(ModwalkError::invalid_export(
            format!("Must be a default export. Unable to verify default export '{name}'"),
            module,
        )),
        _ => Err(ModwalkError::invalid_export(
            format!(
                "Must be a named export called '{name}'. Unable to verify preferred export name '{name}'"
            ),
            module,
        )),
    }
}
