//! End-to-end runs: scan, extract, build, reconcile
//!
//! Extraction fans out across rayon's pool with no shared mutable state.
//! Results are collected in scan order and the tree is assembled by one
//! sequential `TreeBuilder` pass, so worker scheduling never shows up in
//! the output.

use crate::config::SurfaceConfig;
use crate::error::{Diagnostic, Result};
use crate::extractors::{ExtractOptions, ExtractorManager, ModuleDeclarations};
use crate::scanner::{SourceFile, SourceScanner};
use crate::selection::{
    merge, ChangeReport, MergePolicy, SelectionStore, StoreLock, StoreRecovery,
};
use crate::tree::{ComponentTree, TreeBuilder};
use rayon::prelude::*;
use std::fs;
use tracing::{info, warn};

/// A built tree plus every per-file problem met on the way
#[derive(Debug, Clone)]
pub struct Extraction {
    pub tree: ComponentTree,
    /// Scan diagnostics first, then extraction diagnostics in path order
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
}

/// Scan `config.root` and build its component tree
///
/// Only configuration problems and identity collisions fail the call.
/// Unreadable or unparsable files are skipped and reported.
pub fn extract_repository(config: &SurfaceConfig) -> Result<Extraction> {
    let scanner = SourceScanner::new(&config.root, config.include_tests, &config.exclude_patterns)?;
    let scan = scanner.scan()?;

    let manager = ExtractorManager::new();
    let options = ExtractOptions {
        include_private: config.include_private,
    };

    let results: Vec<std::result::Result<ModuleDeclarations, Diagnostic>> = scan
        .files
        .par_iter()
        .map(|file| extract_file(&manager, file, options))
        .collect();

    let mut diagnostics = scan.diagnostics;
    let mut modules = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(module) => modules.push(module),
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    let tree = TreeBuilder::new()
        .with_source_paths(scan.files.iter().map(|file| file.relative_path.clone()))
        .build(modules)?;

    for diagnostic in &diagnostics {
        warn!("{}", diagnostic);
    }
    info!(
        "Extracted {} components from {} files ({} diagnostics)",
        tree.len(),
        scan.files.len(),
        diagnostics.len()
    );

    Ok(Extraction {
        tree,
        diagnostics,
        files_scanned: scan.files.len(),
    })
}

fn extract_file(
    manager: &ExtractorManager,
    file: &SourceFile,
    options: ExtractOptions,
) -> std::result::Result<ModuleDeclarations, Diagnostic> {
    let bytes = fs::read(&file.path).map_err(|e| {
        Diagnostic::new(&file.relative_path, format!("Failed to read file: {}", e))
    })?;
    let content = String::from_utf8(bytes).map_err(|e| {
        Diagnostic::new(&file.relative_path, format!("File is not valid UTF-8: {}", e))
    })?;

    manager
        .extract_declarations(&file.relative_path, &content, options)
        .map_err(|e| Diagnostic::from(&e))
}

/// Reconcile an in-memory store against a tree
pub fn reconcile(
    tree: &ComponentTree,
    store: SelectionStore,
    policy: &MergePolicy,
) -> (SelectionStore, ChangeReport) {
    merge(tree, store, policy)
}

/// Lock, load, merge, and save the store named by `config`
///
/// `recovery` decides what happens when the prior store is unreadable.
pub fn sync_selections(
    config: &SurfaceConfig,
    tree: &ComponentTree,
    recovery: StoreRecovery,
) -> Result<(SelectionStore, ChangeReport)> {
    let path = config.selections_path();
    let _lock = StoreLock::acquire(&path)?;

    let prior = SelectionStore::load_with_recovery(&path, recovery)?;
    let prior_generation = prior.generation();
    let (store, report) = reconcile(tree, prior, &config.merge_policy());

    if store.generation() != prior_generation || !path.exists() {
        store.save(&path)?;
    }
    Ok((store, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use crate::test_support::init_test_tracing;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_repo() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(
            root,
            "pkg/mod.py",
            "\"\"\"Core module.\"\"\"\n\nclass Foo:\n    def bar(self):\n        \"\"\"Do bar.\"\"\"\n\n    def _hidden(self):\n        pass\n",
        );
        write(root, "pkg/util.py", "def helper(x: int) -> int:\n    return x\n");
        write(root, "pkg/broken.py", "def oops(:\n    pass\n");
        write(root, "pkg/_private.py", "def internal():\n    pass\n");
        write(root, "tests/test_mod.py", "def test_bar():\n    pass\n");
        temp_dir
    }

    #[test]
    fn test_extract_repository_end_to_end() {
        init_test_tracing();
        let repo = sample_repo();
        let extraction = extract_repository(&SurfaceConfig::for_root(repo.path())).unwrap();

        let tree = &extraction.tree;
        assert!(tree.contains("pkg.mod#module"));
        assert!(tree.contains("pkg.mod.Foo.bar#method"));
        assert!(!tree.contains("pkg.mod.Foo._hidden#method"));
        assert!(tree.contains("pkg.util.helper#function"));
        assert!(!tree.contains("tests.test_mod.test_bar#function"));
        assert_eq!(
            tree.find("pkg.mod.Foo.bar#method").unwrap().doc_text,
            "Do bar."
        );

        assert_eq!(extraction.diagnostics.len(), 1);
        assert_eq!(extraction.diagnostics[0].file_path, "pkg/broken.py");
    }

    #[test]
    fn test_include_private_keeps_underscored_names() {
        let repo = sample_repo();
        let mut config = SurfaceConfig::for_root(repo.path());
        config.include_private = true;

        let tree = extract_repository(&config).unwrap().tree;
        assert!(tree.contains("pkg.mod.Foo._hidden#method"));
        assert!(tree.contains("pkg._private.internal#function"));
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let repo = sample_repo();
        let config = SurfaceConfig::for_root(repo.path());
        let first = extract_repository(&config).unwrap();
        let second = extract_repository(&config).unwrap();
        assert_eq!(first.tree, second.tree);
        assert_eq!(first.tree.fingerprint(), second.tree.fingerprint());
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn test_non_utf8_file_is_diagnostic() {
        let repo = sample_repo();
        fs::write(repo.path().join("pkg/latin1.py"), [0x63, 0x61, 0x66, 0xe9, 0x0a]).unwrap();

        let extraction = extract_repository(&SurfaceConfig::for_root(repo.path())).unwrap();
        assert!(extraction
            .diagnostics
            .iter()
            .any(|d| d.file_path == "pkg/latin1.py" && d.message.contains("UTF-8")));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_diagnostic() {
        use std::os::unix::fs::PermissionsExt;

        let repo = sample_repo();
        let locked = repo.path().join("pkg/locked.py");
        fs::write(&locked, "def secret():\n    pass\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user
        if fs::read(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
            return;
        }

        let extraction = extract_repository(&SurfaceConfig::for_root(repo.path())).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(extraction
            .diagnostics
            .iter()
            .any(|d| d.file_path == "pkg/locked.py" && d.message.contains("Failed to read")));
        assert!(!extraction.tree.contains("pkg.locked#module"));
        assert!(extraction.tree.contains("pkg.mod.Foo.bar#method"));
        assert!(extraction.tree.contains("pkg.util.helper#function"));
    }

    #[test]
    fn test_missing_root_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let config = SurfaceConfig::for_root(temp_dir.path().join("nope"));
        assert!(matches!(
            extract_repository(&config),
            Err(SurfaceError::Config(_))
        ));
    }

    #[test]
    fn test_sync_selections_persists_and_preserves() {
        init_test_tracing();
        let repo = sample_repo();
        let config = SurfaceConfig::for_root(repo.path());
        let tree = extract_repository(&config).unwrap().tree;

        let (mut store, report) = sync_selections(&config, &tree, StoreRecovery::Abort).unwrap();
        assert_eq!(report.added.len(), tree.len());
        assert!(config.selections_path().exists());

        store.set_included("pkg.mod.Foo.bar#method", false);
        store.save(&config.selections_path()).unwrap();

        // Unrelated file added between runs
        write(repo.path(), "pkg/extra.py", "def more():\n    pass\n");
        let tree = extract_repository(&config).unwrap().tree;
        let (store, report) = sync_selections(&config, &tree, StoreRecovery::Abort).unwrap();

        assert_eq!(store.is_included("pkg.mod.Foo.bar#method"), Some(false));
        assert_eq!(
            report.added,
            vec!["pkg.extra#module".to_string(), "pkg.extra.more#function".to_string()]
        );
        assert!(!Path::new(&format!("{}.lock", config.selections_path().display())).exists());
    }

    #[test]
    fn test_sync_selections_corrupt_store() {
        let repo = sample_repo();
        let config = SurfaceConfig::for_root(repo.path());
        let tree = extract_repository(&config).unwrap().tree;
        write(repo.path(), ".apisurface/selections.yaml", "{{{ not yaml");

        let err = sync_selections(&config, &tree, StoreRecovery::Abort).unwrap_err();
        assert!(matches!(err, SurfaceError::StoreCorruption { .. }));

        let (store, _) = sync_selections(&config, &tree, StoreRecovery::TreatAsEmpty).unwrap();
        assert_eq!(store.len(), tree.len());
    }

    #[test]
    fn test_sync_selections_respects_held_lock() {
        let repo = sample_repo();
        let config = SurfaceConfig::for_root(repo.path());
        let tree = extract_repository(&config).unwrap().tree;

        let _held = StoreLock::acquire(&config.selections_path()).unwrap();
        let err = sync_selections(&config, &tree, StoreRecovery::Abort).unwrap_err();
        assert!(matches!(err, SurfaceError::StoreLocked(_)));
    }
}
