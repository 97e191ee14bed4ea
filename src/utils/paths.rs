// Path Conversion Utilities
//
// Handles conversion between absolute native paths, relative Unix-style paths,
// and the dotted module paths that prefix every stable id.

use anyhow::{Context, Result};
use std::path::{Path, MAIN_SEPARATOR};

/// Convert an absolute path to a relative Unix-style path (with `/` separators)
///
/// Strips the repository root prefix and converts all path separators to
/// `/`, regardless of the platform. Both paths are canonicalized first when
/// possible so symlinked roots (e.g. `/var` vs `/private/var`) still match.
///
/// # Examples
/// ```
/// use apisurface::utils::paths::to_relative_unix_style;
/// use std::path::Path;
///
/// let relative = to_relative_unix_style(
///     Path::new("/home/dev/project/pkg/mod.py"),
///     Path::new("/home/dev/project"),
/// )
/// .unwrap();
/// assert_eq!(relative, "pkg/mod.py");
/// ```
pub fn to_relative_unix_style(absolute: &Path, root: &Path) -> Result<String> {
    let (path_to_use, root_to_use) = match (absolute.canonicalize(), root.canonicalize()) {
        (Ok(canonical_abs), Ok(canonical_root)) => (canonical_abs, canonical_root),
        // One or both failed - use original paths for consistency
        _ => (absolute.to_path_buf(), root.to_path_buf()),
    };

    let relative = path_to_use.strip_prefix(&root_to_use).with_context(|| {
        format!(
            "File path '{}' is not within repository root '{}'",
            path_to_use.display(),
            root_to_use.display()
        )
    })?;

    let path_str = relative.to_str().context("Path contains invalid UTF-8")?;

    // On Unix, MAIN_SEPARATOR is already '/', so this is a no-op
    let unix_style = if MAIN_SEPARATOR == '\\' {
        path_str.replace('\\', "/")
    } else {
        path_str.to_string()
    };

    Ok(unix_style)
}

/// Dotted module path for a relative source path
///
/// Separators become `.` and the final extension is stripped, so
/// `pkg/sub/mod.py` maps to `pkg.sub.mod`. Package initializers keep their
/// file stem (`pkg/__init__.py` maps to `pkg.__init__`) so they can never
/// collide with a sibling `pkg.py`.
///
/// Characters with a meaning in stable ids (`.`, `~`, `#`, and the escape
/// character `%` itself) are percent-escaped inside each path component, so
/// two different relative paths never share a module path.
///
/// ```
/// use apisurface::utils::paths::module_path;
///
/// assert_eq!(module_path("pkg/sub/mod.py"), "pkg.sub.mod");
/// assert_eq!(module_path("pkg.v2/mod.py"), "pkg%2Ev2.mod");
/// ```
pub fn module_path(relative_unix: &str) -> String {
    strip_extension(relative_unix)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(escape_component)
        .collect::<Vec<_>>()
        .join(".")
}

/// Normalized relative path without its final extension
///
/// `pkg/mod.py` gives `pkg/mod`, which is also the path of a package
/// directory that would shadow the module.
pub fn strip_extension(relative_unix: &str) -> String {
    let normalized = relative_unix.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./").trim_matches('/');
    let without_extension = match trimmed.rfind('.') {
        Some(dot) if dot > trimmed.rfind('/').map_or(0, |slash| slash + 1) => &trimmed[..dot],
        _ => trimmed,
    };
    without_extension.to_string()
}

/// Every ancestor directory of a relative path, shallowest first
///
/// `a/b/c.py` gives `a` and `a/b`.
pub fn ancestor_directories(relative_unix: &str) -> Vec<String> {
    let normalized = strip_extension(relative_unix);
    normalized
        .match_indices('/')
        .map(|(index, _)| normalized[..index].to_string())
        .collect()
}

fn escape_component(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '.' => escaped.push_str("%2E"),
            '#' => escaped.push_str("%23"),
            '~' => escaped.push_str("%7E"),
            _ => escaped.push(c),
        }
    }
    escaped
}
