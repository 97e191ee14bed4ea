//! Exclusion rules for source scanning
//!
//! Two pattern families are combined:
//! - glob patterns matched against each path component and the full relative
//!   path (the built-in build/cache/test exclusions plus configured patterns)
//! - `.surfaceignore` patterns at the repository root, with directory,
//!   extension, and substring forms
//!
use anyhow::Result;
use glob::Pattern;
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the per-repository ignore file
pub const IGNORE_FILE_NAME: &str = ".surfaceignore";

/// Build artifacts, caches, and virtual environments
const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "__pycache__",
    "*.pyc",
    ".git",
    ".venv",
    "venv",
    "env",
    ".env",
    "node_modules",
    "dist",
    "build",
    "*.egg-info",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "setup.py",
];

/// Test sources, dropped unless tests are explicitly included
const TEST_EXCLUDE_PATTERNS: &[&str] = &["tests", "test_*", "*_test.py", "conftest.py"];

static DEFAULT_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| compile(DEFAULT_EXCLUDE_PATTERNS));
static TEST_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| compile(TEST_EXCLUDE_PATTERNS));

fn compile(patterns: &[&str]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|pattern| Pattern::new(pattern).ok())
        .collect()
}

/// Combined exclusion rules for one scan
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    include_tests: bool,
    configured: Vec<Pattern>,
    ignore_file: Vec<String>,
}

impl ExclusionRules {
    /// Build rules from configuration; invalid glob patterns are logged and skipped
    pub fn new(include_tests: bool, configured: &[String], ignore_file: Vec<String>) -> Self {
        let configured = configured
            .iter()
            .filter_map(|pattern| match Pattern::new(pattern) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    warn!("Ignoring invalid exclude pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();

        Self {
            include_tests,
            configured,
            ignore_file,
        }
    }

    /// Whether a relative Unix-style path is excluded
    ///
    /// Hidden components (leading `.`) are always excluded.
    pub fn is_excluded(&self, relative_unix: &str) -> bool {
        if relative_unix.is_empty() {
            return false;
        }

        let components: Vec<&str> = relative_unix.split('/').collect();
        if components
            .iter()
            .any(|part| part.starts_with('.') && *part != "." && *part != "..")
        {
            return true;
        }

        let mut families: Vec<&[Pattern]> =
            vec![DEFAULT_PATTERNS.as_slice(), self.configured.as_slice()];
        if !self.include_tests {
            families.push(TEST_PATTERNS.as_slice());
        }

        let glob_hit = families.iter().flat_map(|family| family.iter()).any(|pattern| {
            pattern.matches(relative_unix) || components.iter().any(|part| pattern.matches(part))
        });

        glob_hit || is_ignored_by_pattern(Path::new(relative_unix), &self.ignore_file)
    }
}

/// Load custom ignore patterns from the `.surfaceignore` file in the repository root
///
/// Returns a vector of patterns to ignore. Empty lines and comments (lines starting with #) are skipped.
///
/// # Examples
///
/// ```text
/// # .surfaceignore file content
/// generated/
/// *_pb2.py
/// vendored
/// ```
pub fn load_surfaceignore(root: &Path) -> Result<Vec<String>> {
    let ignore_file = root.join(IGNORE_FILE_NAME);

    if !ignore_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&ignore_file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", IGNORE_FILE_NAME, e))?;

    let patterns: Vec<String> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect();

    if !patterns.is_empty() {
        debug!(
            "Loaded {} custom ignore patterns from {}",
            patterns.len(),
            IGNORE_FILE_NAME
        );
    }

    Ok(patterns)
}

/// Check if a path matches any of the custom ignore patterns
///
/// Supports three pattern types with proper word boundary handling:
/// - Directory patterns (ending with /): matches directory name as whole word, plus all contents
/// - Wildcard suffix patterns (starting with *): matches the end of the path, e.g. `*.min.py`
/// - Substring patterns: matches anywhere in path
///
/// Word boundary: "generated/" matches "generated" and "pkg/generated" but NOT
/// "pregenerated".
pub fn is_ignored_by_pattern(path: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    // Normalize path to Unix-style for consistent pattern matching
    let path_str = path.to_str().unwrap_or("").replace('\\', "/");

    for pattern in patterns {
        if let Some(dir_name) = pattern.strip_suffix('/') {
            // Files within the directory, at the start of the path
            if path_str.starts_with(pattern.as_str()) {
                return true;
            }

            // Directory at end of path, preceded by '/' or at start of string
            if path_str.ends_with(dir_name) {
                let before_dir_name_pos = path_str.len() - dir_name.len();
                if before_dir_name_pos == 0 || path_str.as_bytes()[before_dir_name_pos - 1] == b'/'
                {
                    return true;
                }
            }

            // Directory as inner path component
            if path_str.contains(&format!("/{}/", dir_name)) {
                return true;
            }
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            if path_str.ends_with(suffix) {
                return true;
            }
        } else if path_str.contains(pattern.as_str()) {
            return true;
        }
    }

    false
}
