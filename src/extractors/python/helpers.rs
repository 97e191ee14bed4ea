/// Helper utilities for Python declaration extraction
/// Includes docstring lookup, string literal handling, and argument lists
use super::PythonExtractor;
use tree_sitter::Node;

/// Extract argument list from a superclasses node
///
/// Keyword arguments other than `metaclass=` are dropped; they do not name a base.
pub fn extract_argument_list(extractor: &PythonExtractor, node: &Node) -> Vec<String> {
    let mut args = Vec::new();
    let base = extractor.base();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" | "attribute" | "subscript" => {
                args.push(base.get_node_text(&child));
            }
            "keyword_argument" => {
                if base.get_field_text(&child, "name").as_deref() == Some("metaclass") {
                    args.push(base.get_node_text(&child));
                }
            }
            _ => {}
        }
    }

    args
}

/// Docstring of a class or function: the first statement of its body, if a string
pub fn body_docstring(extractor: &PythonExtractor, node: &Node) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    leading_string(extractor, &body)
}

/// First non-comment statement of a block or module, when it is a bare string
pub fn leading_string(extractor: &PythonExtractor, block: &Node) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    bare_string(extractor, &first)
}

/// The string of an `expression_statement` consisting of one string literal
pub fn bare_string(extractor: &PythonExtractor, statement: &Node) -> Option<String> {
    if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
        return None;
    }
    let expr = statement.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    let literal = extractor.base().get_node_text(&expr);
    Some(clean_docstring(&strip_string_delimiters(&literal)))
}

/// Helper to strip string prefixes and delimiters from Python strings
/// Handles prefixes (r, u, b, f in any case), triple quotes, and single quotes
pub fn strip_string_delimiters(s: &str) -> String {
    let s = s.trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F'));

    // Try delimiters in order: triple quotes first (3 chars), then single quotes (1 char)
    let delimiters = [("\"\"\"", 3), ("'''", 3), ("\"", 1), ("'", 1)];

    for (delimiter, strip_count) in &delimiters {
        if s.starts_with(delimiter) && s.ends_with(delimiter) && s.len() >= strip_count * 2 {
            return s[*strip_count..s.len() - strip_count].to_string();
        }
    }

    // No matching delimiter found, return as-is
    s.to_string()
}

/// Normalize docstring indentation the way Python's own tooling does
///
/// Leading/trailing blank lines are dropped, the first line is stripped,
/// and the common indentation of the remaining lines is removed.
pub fn clean_docstring(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let indent = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim().to_string());
    for line in &lines[1..] {
        let trimmed_end = line.trim_end();
        if trimmed_end.len() >= indent && trimmed_end.is_char_boundary(indent) {
            cleaned.push(trimmed_end[indent..].to_string());
        } else {
            cleaned.push(trimmed_end.trim_start().to_string());
        }
    }

    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_string_delimiters_with_prefix() {
        assert_eq!(strip_string_delimiters(r#"r"""raw""""#), "raw");
        assert_eq!(strip_string_delimiters("'single'"), "single");
        assert_eq!(strip_string_delimiters("\"\"\"triple\"\"\""), "triple");
    }

    #[test]
    fn test_clean_docstring_dedents_body() {
        let raw = "Summary line.\n\n        Details here.\n          indented more.\n        ";
        assert_eq!(
            clean_docstring(raw),
            "Summary line.\n\nDetails here.\n  indented more."
        );
    }

    #[test]
    fn test_clean_docstring_empty() {
        assert_eq!(clean_docstring(""), "");
        assert_eq!(clean_docstring("\n   \n"), "");
    }
}
