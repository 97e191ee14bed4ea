// BaseExtractor implementation
//
// Holds the file under extraction and the text utilities every grammar
// needs: node text, comment blocks, and signature normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use tree_sitter::Node;

use super::types::{ExtractOptions, Span};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Base implementation for grammar extractors
pub struct BaseExtractor {
    pub grammar: String,
    /// Relative Unix-style path; used for spans and diagnostics
    pub file_path: String,
    pub content: String,
    pub options: ExtractOptions,
}

impl BaseExtractor {
    /// Create a new base extractor
    ///
    /// `file_path` must already be relative to the repository root and use `/`
    /// separators; the scanner guarantees this.
    pub fn new(grammar: String, file_path: String, content: String, options: ExtractOptions) -> Self {
        debug!("BaseExtractor for {} file '{}'", grammar, file_path);

        Self {
            grammar,
            file_path,
            content,
            options,
        }
    }

    /// Get text from a tree-sitter node
    pub fn get_node_text(&self, node: &Node) -> String {
        let start_byte = node.start_byte();
        let end_byte = node.end_byte();

        // Use byte slice but handle UTF-8 boundaries properly
        let content_bytes = self.content.as_bytes();
        if start_byte < content_bytes.len() && end_byte <= content_bytes.len() {
            String::from_utf8_lossy(&content_bytes[start_byte..end_byte]).to_string()
        } else {
            String::new()
        }
    }

    /// Span covering a node, 1-based inclusive lines
    pub fn span_of(&self, node: &Node) -> Span {
        Span {
            file_path: self.file_path.clone(),
            start_line: (node.start_position().row + 1) as u32,
            end_line: (node.end_position().row + 1) as u32,
        }
    }

    /// Collect the contiguous comment block immediately preceding a node
    ///
    /// Comments separated from the node (or from each other) by a blank line
    /// are not part of the block. Comment markers are stripped.
    pub fn preceding_comment_block(&self, node: &Node, marker: &str) -> Option<String> {
        let mut comments = Vec::new();
        let mut expected_row = node.start_position().row;

        let mut current = node.prev_sibling();
        while let Some(sibling) = current {
            if sibling.kind() != "comment" || sibling.end_position().row + 1 != expected_row {
                break;
            }
            let text = self.get_node_text(&sibling);
            let stripped = text.trim_start().trim_start_matches(marker);
            comments.push(stripped.strip_prefix(' ').unwrap_or(stripped).to_string());
            expected_row = sibling.start_position().row;
            current = sibling.prev_sibling();
        }

        if comments.is_empty() {
            None
        } else {
            // Reverse to get original order (top to bottom)
            comments.reverse();
            Some(comments.join("\n"))
        }
    }

    /// Collapse whitespace runs so multi-line signatures display on one line
    pub fn normalize_signature(text: &str) -> String {
        let collapsed = WHITESPACE_RUN.replace_all(text.trim(), " ");
        collapsed
            .replace("( ", "(")
            .replace(" )", ")")
            .replace("[ ", "[")
            .replace(" ]", "]")
            .replace(", )", ")")
            .replace(",)", ")")
    }

    /// Last line of the content (1-based)
    pub fn end_line(&self) -> u32 {
        self.content.lines().count().max(1) as u32
    }
}
