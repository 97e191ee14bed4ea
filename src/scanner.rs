//! Source discovery
//!
//! Walks a repository root and returns the files eligible for extraction,
//! sorted by relative path so identical trees always scan identically.

use crate::error::{Diagnostic, Result, SurfaceError};
use crate::language;
use crate::utils::ignore::{load_surfaceignore, ExclusionRules};
use crate::utils::paths::to_relative_unix_style;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One file selected for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute native path, used for reading
    pub path: PathBuf,
    /// Relative Unix-style path, used for module paths and diagnostics
    pub relative_path: String,
}

/// Output of a scan
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub root: PathBuf,
    pub files: Vec<SourceFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Directory walker configured with exclusion rules
#[derive(Debug, Clone)]
pub struct SourceScanner {
    root: PathBuf,
    rules: ExclusionRules,
}

impl SourceScanner {
    /// Validate the root and load `.surfaceignore`
    ///
    /// A missing root, a non-directory, or an unreadable ignore file is a
    /// `Config` error: nothing has been extracted yet, so the run aborts.
    pub fn new(root: &Path, include_tests: bool, exclude_patterns: &[String]) -> Result<Self> {
        let root = root.canonicalize().map_err(|e| {
            SurfaceError::Config(format!("Cannot open root {}: {}", root.display(), e))
        })?;
        if !root.is_dir() {
            return Err(SurfaceError::Config(format!(
                "Root {} is not a directory",
                root.display()
            )));
        }

        let ignore_file =
            load_surfaceignore(&root).map_err(|e| SurfaceError::Config(e.to_string()))?;
        let rules = ExclusionRules::new(include_tests, exclude_patterns, ignore_file);
        Ok(Self { root, rules })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root and collect eligible source files
    pub fn scan(&self) -> Result<ScanResult> {
        // The root itself must be listable; everything below it is best effort
        std::fs::read_dir(&self.root).map_err(|e| {
            SurfaceError::Config(format!("Cannot read root {}: {}", self.root.display(), e))
        })?;

        let mut files = Vec::new();
        let mut diagnostics = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded_entry(entry.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let location = e
                        .path()
                        .map(|p| self.display_path(p))
                        .unwrap_or_else(|| "<unknown>".to_string());
                    warn!("Skipping unreadable entry {}: {}", location, e);
                    diagnostics.push(Diagnostic::new(location, format!("Unreadable entry: {}", e)));
                    continue;
                }
            };

            if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
                continue;
            }

            match to_relative_unix_style(entry.path(), &self.root) {
                Ok(relative_path) => files.push(SourceFile {
                    path: entry.path().to_path_buf(),
                    relative_path,
                }),
                Err(e) => diagnostics.push(Diagnostic::new(
                    entry.path().display().to_string(),
                    e.to_string(),
                )),
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!(
            "Scanned {}: {} source files, {} diagnostics",
            self.root.display(),
            files.len(),
            diagnostics.len()
        );

        Ok(ScanResult {
            root: self.root.clone(),
            files,
            diagnostics,
        })
    }

    fn is_excluded_entry(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(relative) => {
                let relative_unix = relative.to_string_lossy().replace('\\', "/");
                self.rules.is_excluded(&relative_unix)
            }
            Err(_) => false,
        }
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| language::source_extensions().contains(&ext))
        .unwrap_or(false)
}

/// Scan `root` with the given exclusion settings
pub fn scan_sources(
    root: &Path,
    include_tests: bool,
    exclude_patterns: &[String],
) -> Result<ScanResult> {
    SourceScanner::new(root, include_tests, exclude_patterns)?.scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }

    fn relative_paths(result: &ScanResult) -> Vec<&str> {
        result
            .files
            .iter()
            .map(|f| f.relative_path.as_str())
            .collect()
    }

    #[test]
    fn test_scan_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "pkg/zeta.py");
        touch(root, "pkg/alpha.py");
        touch(root, "pkg/__init__.py");
        touch(root, "pkg/notes.txt");
        touch(root, "build/lib/pkg/alpha.py");
        touch(root, ".venv/lib/site.py");
        touch(root, "pkg/__pycache__/alpha.py");
        touch(root, "tests/test_alpha.py");
        touch(root, "top.py");

        let result = scan_sources(root, false, &[]).unwrap();
        assert_eq!(
            relative_paths(&result),
            vec!["pkg/__init__.py", "pkg/alpha.py", "pkg/zeta.py", "top.py"]
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for name in ["b.py", "a.py", "c/d.py", "c/a.py"] {
            touch(root, name);
        }

        let first = scan_sources(root, false, &[]).unwrap();
        let second = scan_sources(root, false, &[]).unwrap();
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn test_include_tests_and_configured_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "tests/test_alpha.py");
        touch(root, "legacy/old.py");
        touch(root, "pkg/core.py");

        let result = scan_sources(root, true, &["legacy".to_string()]).unwrap();
        assert_eq!(
            relative_paths(&result),
            vec!["pkg/core.py", "tests/test_alpha.py"]
        );
    }

    #[test]
    fn test_surfaceignore_applied() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "pkg/generated/models.py");
        touch(root, "pkg/api_pb2.py");
        touch(root, "pkg/core.py");
        fs::write(root.join(".surfaceignore"), "generated/\n*_pb2.py\n").unwrap();

        let result = scan_sources(root, false, &[]).unwrap();
        assert_eq!(relative_paths(&result), vec!["pkg/core.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_diagnostic() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "pkg/core.py");
        touch(root, "sealed/hidden.py");
        let sealed = root.join("sealed");
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user
        if fs::read_dir(&sealed).is_ok() {
            fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = scan_sources(root, false, &[]);
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
        let result = result.unwrap();

        assert_eq!(relative_paths(&result), vec!["pkg/core.py"]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].file_path, "sealed");
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");
        let err = scan_sources(&missing, false, &[]).unwrap_err();
        assert!(matches!(err, SurfaceError::Config(_)));
    }

    #[test]
    fn test_file_root_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("lonely.py");
        fs::write(&file, "x = 1\n").unwrap();
        let err = scan_sources(&file, false, &[]).unwrap_err();
        assert!(matches!(err, SurfaceError::Config(_)));
    }
}
