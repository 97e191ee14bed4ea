// Stable identity assignment
//
// Ids are `<module path>[.<segment>]*#<kind>`. A segment is the declared
// name, suffixed with `~n` when it is the n-th (n >= 1) sibling sharing
// both kind and name. Nothing positional beyond that suffix feeds the id.
//
// Module paths come from `utils::paths::module_path`, whose components are
// escaped so they never contain `.`, `~` or `#` of their own. A module file
// that shares its dotted path with a package directory ends in `~file`.

use crate::extractors::base::ComponentKind;
use std::collections::HashMap;

/// Separator between the structural path and the kind tag
pub const KIND_SEPARATOR: char = '#';
/// Separator between a name and its occurrence index
pub const OCCURRENCE_SEPARATOR: char = '~';
/// Suffix for `a/b.py` when a package directory `a/b/` also exists
pub const SHADOWED_MODULE_MARKER: &str = "~file";

/// Occurrence bookkeeping for one sibling list
///
/// Occurrence indices start at 0 and index 0 is implicit: the first sibling
/// with a given kind and name gets no suffix, the second gets `~1`.
#[derive(Debug, Default)]
pub struct OccurrenceCounter {
    seen: HashMap<(ComponentKind, String), usize>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path segment for the next sibling with this kind and name
    ///
    /// The first occurrence is the bare name, so adding a duplicate later in
    /// the file never renames the original.
    pub fn next_segment(&mut self, kind: ComponentKind, name: &str) -> String {
        let count = self.seen.entry((kind, name.to_string())).or_insert(0);
        let occurrence = *count;
        *count += 1;

        if occurrence == 0 {
            name.to_string()
        } else {
            format!("{}{}{}", name, OCCURRENCE_SEPARATOR, occurrence)
        }
    }
}

/// Join a parent path and a child segment
pub fn child_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Attach the kind tag to a structural path
pub fn stable_id(path: &str, kind: ComponentKind) -> String {
    format!("{}{}{}", path, KIND_SEPARATOR, kind.tag())
}

/// Split an id into its structural path and kind
///
/// Returns `None` for strings that could not have been produced by
/// [`stable_id`].
pub fn split_stable_id(id: &str) -> Option<(&str, ComponentKind)> {
    let (path, tag) = id.rsplit_once(KIND_SEPARATOR)?;
    if path.is_empty() || path.starts_with('.') || path.ends_with('.') {
        return None;
    }
    Some((path, ComponentKind::from_tag(tag)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_has_no_suffix() {
        let mut counter = OccurrenceCounter::new();
        assert_eq!(counter.next_segment(ComponentKind::Function, "load"), "load");
        assert_eq!(counter.next_segment(ComponentKind::Function, "load"), "load~1");
        assert_eq!(counter.next_segment(ComponentKind::Function, "load"), "load~2");
    }

    #[test]
    fn test_kinds_counted_separately() {
        let mut counter = OccurrenceCounter::new();
        assert_eq!(counter.next_segment(ComponentKind::Property, "value"), "value");
        assert_eq!(counter.next_segment(ComponentKind::Method, "value"), "value");
    }

    #[test]
    fn test_stable_id_format() {
        let path = child_path(&child_path("pkg.mod", "Foo"), "bar");
        assert_eq!(stable_id(&path, ComponentKind::Method), "pkg.mod.Foo.bar#method");
        assert_eq!(stable_id("pkg.mod", ComponentKind::Module), "pkg.mod#module");
    }

    #[test]
    fn test_split_stable_id() {
        assert_eq!(
            split_stable_id("pkg.mod.Foo.bar~1#method"),
            Some(("pkg.mod.Foo.bar~1", ComponentKind::Method))
        );
        assert_eq!(split_stable_id("pkg.mod.Foo"), None);
        assert_eq!(split_stable_id("pkg.mod#widget"), None);
        assert_eq!(split_stable_id("#class"), None);
    }
}
