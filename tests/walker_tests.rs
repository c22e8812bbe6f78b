//! Integration tests for the module walker
//!
//! These tests drive the public API against real directory trees created with
//! `tempfile`, plus an in-process module registry for export resolution.

use modwalk_rs::{
    Callback, ConcurrencyMode, DirectoryEntry, DirectorySource, EntryFilter, EntryKind,
    ExportPolicy, FolderFile, FolderItem, FolderModule, FolderModuleOptions, GetPathsOptions,
    LoadFolderOptions, LoadModuleOptions, LoadedExport, ModuleRegistry, ModuleWalker,
    ModwalkError, ProcessFolderOptions,
};
use modwalk_rs::core::module::namespace;
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Creates:
///
/// ```text
/// root/
///   alpha/        a.json
///   alpha/inner/  deep.yaml
///   beta/
///   top.js  notes.txt  types.ts
/// ```
fn sample_tree() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("alpha/inner")).unwrap();
    fs::create_dir_all(root.join("beta")).unwrap();
    fs::write(root.join("alpha/a.json"), r#"{"default": {"name": "a"}}"#).unwrap();
    fs::write(root.join("alpha/inner/deep.yaml"), "default: deep\n").unwrap();
    fs::write(root.join("top.js"), "export default 1;").unwrap();
    fs::write(root.join("notes.txt"), "not a module").unwrap();
    fs::write(root.join("types.ts"), "export type T = string;").unwrap();
    dir
}

fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort();
    paths
}

/// Records every callback payload it receives.
fn recorder<T: Send + 'static>() -> (Callback<T>, Arc<Mutex<Vec<T>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback = Callback::from_async(move |item: T| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push(item);
            Ok(())
        }
    });
    (callback, seen)
}

fn export_values(seen: &[LoadedExport]) -> Vec<Value> {
    seen.iter()
        .filter_map(|loaded| loaded.export.as_ref().and_then(|e| e.as_value().cloned()))
        .collect()
}

#[tokio::test]
async fn non_recursive_folders_are_the_immediate_children() {
    let dir = sample_tree();
    let walker = ModuleWalker::data_modules().unwrap();

    let folders = walker
        .get_folder_paths(dir.path(), &GetPathsOptions::default(), None)
        .await
        .unwrap();

    assert_eq!(
        sorted(folders),
        vec![dir.path().join("alpha"), dir.path().join("beta")]
    );
}

#[tokio::test]
async fn recursive_folders_contain_every_directory_once() {
    let dir = sample_tree();
    let walker = ModuleWalker::data_modules().unwrap();

    for mode in [ConcurrencyMode::Sequential, ConcurrencyMode::Concurrent] {
        let options = GetPathsOptions::default()
            .with_recursive(true)
            .with_concurrency(mode);
        let folders = walker.get_folder_paths(dir.path(), &options, None).await.unwrap();
        assert_eq!(
            sorted(folders),
            vec![
                dir.path().join("alpha"),
                dir.path().join("alpha/inner"),
                dir.path().join("beta"),
            ],
            "mode {mode:?}"
        );
    }
}

#[cfg(unix)]
#[tokio::test]
async fn non_utf8_folder_names_resolve_to_real_paths() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let odd = dir.path().join(OsStr::from_bytes(b"bad\xff"));
    fs::create_dir_all(odd.join("child")).unwrap();
    let walker = ModuleWalker::data_modules().unwrap();

    for mode in [ConcurrencyMode::Sequential, ConcurrencyMode::Concurrent] {
        let options = GetPathsOptions::default()
            .with_recursive(true)
            .with_concurrency(mode);
        let folders = walker.get_folder_paths(dir.path(), &options, None).await.unwrap();
        assert_eq!(sorted(folders.clone()), vec![odd.clone(), odd.join("child")], "mode {mode:?}");
        assert!(folders.iter().all(|folder| folder.is_dir()));
    }
}

#[tokio::test]
async fn default_module_filter_matches_extensions() {
    let dir = tempdir().unwrap();
    for name in ["a.js", "b.ts", "c.txt"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    let walker = ModuleWalker::data_modules().unwrap();

    let modules = walker
        .get_module_paths(dir.path(), &GetPathsOptions::default(), None)
        .await
        .unwrap();

    assert_eq!(
        sorted(modules),
        vec![dir.path().join("a.js"), dir.path().join("b.ts")]
    );
}

#[tokio::test]
async fn recursive_modules_respect_a_custom_filter() {
    let dir = sample_tree();
    let walker = ModuleWalker::data_modules().unwrap();
    let only_yaml: EntryFilter = Arc::new(|entry: &DirectoryEntry, _: &Path, _: &Path| {
        entry.name_lossy().ends_with(".yaml")
    });

    let options = GetPathsOptions::default().with_recursive(true);
    let modules = walker
        .get_module_paths(dir.path(), &options, Some(only_yaml))
        .await
        .unwrap();

    assert_eq!(modules, vec![dir.path().join("alpha/inner/deep.yaml")]);
}

/// Fails to list one directory, otherwise defers to the real filesystem.
struct Unreadable {
    denied: PathBuf,
}

#[async_trait::async_trait]
impl DirectorySource for Unreadable {
    async fn list(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        if path == self.denied {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        modwalk_rs::FsDirectorySource.list(path).await
    }
}

#[tokio::test]
async fn unreadable_subtree_is_silently_omitted() {
    let dir = sample_tree();
    let walker = ModuleWalker::data_modules()
        .unwrap()
        .with_source(Arc::new(Unreadable {
            denied: dir.path().join("alpha"),
        }));

    let options = GetPathsOptions::default().with_recursive(true);
    let folders = walker.get_folder_paths(dir.path(), &options, None).await.unwrap();

    // alpha is still listed by the root; alpha/inner is lost with it.
    assert_eq!(
        sorted(folders),
        vec![dir.path().join("alpha"), dir.path().join("beta")]
    );
}

#[tokio::test]
async fn missing_default_export_is_an_export_error() {
    let registry = ModuleRegistry::default();
    registry
        .register("/plugins/foo.js", namespace([("foo", json!("bar"))]))
        .unwrap();
    let walker = ModuleWalker::new(Arc::new(registry)).unwrap();
    let (callback, seen) = recorder::<LoadedExport>();

    let err = walker
        .load_module_paths(["/plugins/foo.js"], &callback, &LoadModuleOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ModwalkError::InvalidExport { .. }));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn wildcard_delivers_named_exports_only() {
    let registry = ModuleRegistry::default();
    registry
        .register(
            "/plugins/multi.js",
            namespace([("default", json!(1)), ("a", json!(2)), ("b", json!(3))]),
        )
        .unwrap();
    let walker = ModuleWalker::new(Arc::new(registry)).unwrap();
    let (callback, seen) = recorder::<LoadedExport>();
    let options = LoadModuleOptions::default().with_exports(ExportPolicy::Named, "*");

    walker
        .load_module_paths(["/plugins/multi.js"], &callback, &options)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(export_values(&seen), vec![json!(2), json!(3)]);
    assert!(seen.iter().all(|loaded| loaded.file_name == "multi.js"));
    assert_eq!(seen[0].url.as_str(), "file:///plugins/multi.js");
}

#[tokio::test]
async fn blocking_callback_with_concurrent_load_fails_before_io() {
    struct Untouchable(AtomicUsize);

    #[async_trait::async_trait]
    impl DirectorySource for Untouchable {
        async fn list(&self, _: &Path) -> io::Result<Vec<DirectoryEntry>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    let source = Arc::new(Untouchable(AtomicUsize::new(0)));
    let walker = ModuleWalker::data_modules().unwrap().with_source(source.clone());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let callback = Callback::blocking(move |_: LoadedExport| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let err = walker
        .load_module_paths(["/does/not/exist.json"], &callback, &LoadModuleOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_config());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(source.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn data_modules_load_from_disk() {
    let dir = sample_tree();
    let walker = ModuleWalker::data_modules().unwrap();
    let options = GetPathsOptions::default().with_recursive(true);
    let modules = walker.get_module_paths(dir.path(), &options, None).await.unwrap();
    let (callback, seen) = recorder::<LoadedExport>();

    // top.js and types.ts are discovered but the data loader cannot import them
    walker
        .load_module_paths(modules, &callback, &LoadModuleOptions::default())
        .await
        .unwrap();

    let mut values = export_values(&seen.lock().unwrap());
    values.sort_by_key(|v| v.to_string());
    assert_eq!(values, vec![json!("deep"), json!({"name": "a"})]);
}

#[tokio::test]
async fn disabled_import_reports_every_path_once() {
    let dir = sample_tree();
    let walker = ModuleWalker::data_modules().unwrap();
    let modules = walker
        .get_module_paths(dir.path(), &GetPathsOptions::default(), None)
        .await
        .unwrap();
    let (callback, seen) = recorder::<LoadedExport>();
    let options = LoadModuleOptions::default().with_import_enabled(false);

    walker
        .load_module_paths(modules.clone(), &callback, &options)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), modules.len());
    assert!(seen.iter().all(|loaded| loaded.export.is_none()));
    let mut names: Vec<&str> = seen.iter().map(|l| l.file_name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["top.js", "types.ts"]);
}

#[tokio::test]
async fn load_folder_paths_passes_names_in_order() {
    let (callback, seen) = recorder::<FolderItem>();
    let walker = ModuleWalker::data_modules().unwrap();
    let options = LoadFolderOptions::default().with_concurrency(ConcurrencyMode::Sequential);

    walker
        .load_folder_paths(["/srv/plugins/auth", "/srv/plugins/cache"], &callback, &options)
        .await
        .unwrap();

    let names: Vec<String> = seen.lock().unwrap().iter().map(|f| f.name.clone()).collect();
    assert_eq!(names, vec!["auth", "cache"]);
}

#[tokio::test]
async fn blank_path_argument_is_rejected() {
    let (callback, seen) = recorder::<FolderItem>();
    let walker = ModuleWalker::data_modules().unwrap();

    let err = walker
        .load_folder_paths(["ok", ""], &callback, &LoadFolderOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_config());
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn callback_errors_reach_the_caller() {
    let walker = ModuleWalker::data_modules().unwrap();
    let callback = Callback::from_async(|item: FolderItem| async move {
        if item.name == "bad" {
            Err(ModwalkError::callback("refused"))
        } else {
            Ok(())
        }
    });

    let err = walker
        .load_folder_paths(["good", "bad"], &callback, &LoadFolderOptions::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("refused"));
}

#[tokio::test]
async fn process_folder_paths_visits_every_entry() {
    let dir = sample_tree();
    let walker = ModuleWalker::data_modules().unwrap();
    let (callback, seen) = recorder::<FolderFile>();
    let folders = vec![dir.path().join("alpha"), dir.path().join("beta")];

    walker
        .process_folder_paths(folders, &callback, &ProcessFolderOptions::default())
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let mut entries: Vec<(String, EntryKind)> = seen
        .iter()
        .map(|file| (file.entry.name_lossy().into_owned(), file.entry.kind))
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("a.json".to_string(), EntryKind::File),
            ("inner".to_string(), EntryKind::Directory),
        ]
    );
    assert!(seen.iter().all(|file| file.folder_path == dir.path().join("alpha")));
}

#[tokio::test]
async fn process_folder_paths_reports_missing_folder() {
    let dir = tempdir().unwrap();
    let walker = ModuleWalker::data_modules().unwrap();
    let (callback, _) = recorder::<FolderFile>();

    let err = walker
        .process_folder_paths(
            dir.path().join("gone"),
            &callback,
            &ProcessFolderOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ModwalkError::Io { .. }));
}

#[tokio::test]
async fn folder_modules_load_each_folder() {
    let dir = sample_tree();
    fs::write(dir.path().join("beta/b.json"), r#"{"default": "b", "extra": 1}"#).unwrap();
    let walker = ModuleWalker::data_modules().unwrap();
    let (callback, seen) = recorder::<FolderModule>();
    let options = FolderModuleOptions::default().with_exports(ExportPolicy::All, "default");

    walker
        .load_folder_modules(
            vec![dir.path().join("alpha"), dir.path().join("beta")],
            &callback,
            &options,
        )
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let mut delivered: Vec<(String, Value)> = seen
        .iter()
        .map(|m| {
            (
                m.file_name.clone(),
                m.export.as_ref().and_then(|e| e.as_value().cloned()).unwrap_or(Value::Null),
            )
        })
        .collect();
    delivered.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.to_string().cmp(&b.1.to_string())));
    assert_eq!(
        delivered,
        vec![
            ("a.json".to_string(), json!({"name": "a"})),
            ("b.json".to_string(), json!("b")),
            ("b.json".to_string(), json!(1)),
        ]
    );
    let b = seen.iter().find(|m| m.file_name == "b.json").unwrap();
    assert_eq!(b.folder_path, dir.path().join("beta"));
}

#[tokio::test]
async fn repeated_loads_read_the_file_again() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("live.json");
    fs::write(&path, r#"{"default": "v1"}"#).unwrap();
    let walker = ModuleWalker::data_modules().unwrap();
    let (callback, seen) = recorder::<LoadedExport>();

    walker
        .load_module_paths([&path], &callback, &LoadModuleOptions::default())
        .await
        .unwrap();
    fs::write(&path, r#"{"default": "v2"}"#).unwrap();
    walker
        .load_module_paths([&path], &callback, &LoadModuleOptions::default())
        .await
        .unwrap();

    assert_eq!(export_values(&seen.lock().unwrap()), vec![json!("v1"), json!("v2")]);
}
