//! Command Execution Logic
//!
//! Each command loads the layered configuration, builds a walker over the
//! local filesystem and prints results to stdout. Progress goes to the log.

use crate::cli::args::*;
use crate::cli::output::*;
use modwalk_rs::{
    Callback, DataModuleLoader, LoadedExport, ModuleWalker, ModwalkConfig,
};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

/// Load configuration from `path`, or the defaults when none is given.
pub fn load_configuration(path: Option<&Path>) -> anyhow::Result<ModwalkConfig> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ModwalkConfig::from_yaml_file(path)?
        }
        None => ModwalkConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn walker_for(config: &ModwalkConfig) -> anyhow::Result<ModuleWalker> {
    Ok(ModuleWalker::from_config(config, DataModuleLoader::shared())?)
}

/// List folders under a directory
pub async fn folders_command(args: WalkArgs, config: ModwalkConfig) -> anyhow::Result<()> {
    let walker = walker_for(&config)?;
    let options = args.traversal.path_options(&config.paths);
    let paths = walker
        .get_folder_paths(&args.traversal.dir, &options, None)
        .await?;

    info!("Found {} folders", paths.len());
    print_paths(&paths, args.format)
}

/// List module files under a directory
pub async fn modules_command(args: WalkArgs, config: ModwalkConfig) -> anyhow::Result<()> {
    let walker = walker_for(&config)?;
    let options = args.traversal.path_options(&config.paths);
    let paths = walker
        .get_module_paths(&args.traversal.dir, &options, None)
        .await?;

    info!("Found {} modules", paths.len());
    print_paths(&paths, args.format)
}

/// Discover and load modules, printing one JSON line per delivered export
pub async fn load_command(args: LoadArgs, config: ModwalkConfig) -> anyhow::Result<()> {
    let walker = walker_for(&config)?;
    let path_options = args.traversal.path_options(&config.paths);
    let modules = walker
        .get_module_paths(&args.traversal.dir, &path_options, None)
        .await?;

    let mut load_options = config.load.clone();
    if let Some(policy) = args.export_policy {
        load_options.export_policy = policy;
    }
    if let Some(name) = args.export_name {
        load_options.preferred_export_name = name;
    }
    if args.no_import {
        load_options.import_enabled = false;
    }
    load_options.concurrency = args.traversal.concurrency(load_options.concurrency);

    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&delivered);
    let callback = Callback::from_async(move |loaded: LoadedExport| {
        let counter = Arc::clone(&counter);
        async move {
            println!("{}", export_line(&loaded)?);
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    });

    let module_count = modules.len();
    walker
        .load_module_paths(modules, &callback, &load_options)
        .await?;

    info!(
        "Delivered {} exports from {} modules",
        delivered.load(Ordering::Relaxed),
        module_count
    );
    Ok(())
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    eprintln!("{}", "# Default modwalk configuration".dimmed());
    eprintln!("{}", "# Usage: modwalk --config your-config.yml load ./plugins".dimmed());

    let yaml_output = serde_yaml::to_string(&ModwalkConfig::default())?;
    print!("{}", yaml_output);
    Ok(())
}

/// Validate a configuration file and summarize it
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!("Validating configuration: {}", args.config.display().cyan());

    let config = match load_configuration(Some(&args.config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Configuration validation failed:".red(), e);
            eprintln!("   Check YAML syntax and option names");
            eprintln!(
                "{}",
                "Tip: Use 'modwalk print-default-config' to see valid format".dimmed()
            );
            return Err(e);
        }
    };

    println!("{}", "Configuration file is valid!".bright_green().bold());
    println!();
    display_config_summary(&config);
    Ok(())
}

fn display_config_summary(config: &ModwalkConfig) {
    #[derive(Tabled)]
    struct SettingRow {
        setting: &'static str,
        value: String,
    }

    let rows = vec![
        SettingRow {
            setting: "Module patterns",
            value: config.discovery.module_patterns.join(" "),
        },
        SettingRow {
            setting: "Recursive",
            value: config.paths.recursive.to_string(),
        },
        SettingRow {
            setting: "Traversal",
            value: format!("{:?}", config.paths.concurrency),
        },
        SettingRow {
            setting: "Load concurrency",
            value: format!("{:?}", config.load.concurrency),
        },
        SettingRow {
            setting: "Export policy",
            value: config.load.export_policy.to_string(),
        },
        SettingRow {
            setting: "Preferred export",
            value: config.load.preferred_export_name.clone(),
        },
        SettingRow {
            setting: "Import enabled",
            value: config.load.import_enabled.to_string(),
        },
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}
