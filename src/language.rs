//! Grammar Support - Shared tree-sitter language configuration
//!
//! ALL grammar-specific tree-sitter configuration should go here to avoid duplication.
//! Adding a grammar means a new arm in each function below plus a
//! `DeclarationParser` implementation under `extractors/`.

use anyhow::Result;

/// Get tree-sitter language parser for a given grammar name
///
/// This is the single source of truth for grammar support. Used by the
/// ExtractorManager when it builds a parser for a file.
pub fn get_tree_sitter_language(grammar: &str) -> Result<tree_sitter::Language> {
    match grammar {
        "python" => Ok(tree_sitter_python::LANGUAGE.into()),
        _ => Err(anyhow::anyhow!(
            "Unsupported grammar: '{}'. Supported grammars: {}",
            grammar,
            supported_grammars().join(", ")
        )),
    }
}

/// Detect grammar from file extension
///
/// Returns the grammar name that can be passed to `get_tree_sitter_language()`.
pub fn detect_grammar_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "py" => Some("python"),
        _ => None,
    }
}

/// File extensions the scanner should pick up
pub fn source_extensions() -> &'static [&'static str] {
    &["py"]
}

/// All grammars with a registered declaration parser
pub fn supported_grammars() -> Vec<&'static str> {
    vec!["python"]
}

/// Convention-reserved marker for private names in a grammar
pub fn private_marker(grammar: &str) -> &'static str {
    match grammar {
        "python" => "_",
        _ => "_", // Generic fallback
    }
}
