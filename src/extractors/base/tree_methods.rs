// Tree navigation methods for BaseExtractor

use super::extractor::BaseExtractor;
use super::types::ParseFailure;
use tree_sitter::Node;

impl BaseExtractor {
    /// Check if node has error
    pub fn has_error(&self, node: &Node) -> bool {
        node.has_error() || node.kind() == "ERROR"
    }

    /// Locate the first ERROR or MISSING node in document order
    pub fn first_syntax_error(&self, root: &Node) -> Option<ParseFailure> {
        if !self.has_error(root) {
            return None;
        }
        let node = Self::find_error_node(root)?;
        let position = node.start_position();
        let message = if node.is_missing() {
            format!("missing '{}'", node.kind())
        } else {
            let snippet = self.get_node_text(&node);
            let snippet = snippet.lines().next().unwrap_or("").trim();
            format!("syntax error near '{}'", Self::truncate_string(snippet, 40))
        };
        Some(ParseFailure {
            line: (position.row + 1) as u32,
            column: position.column as u32,
            message,
        })
    }

    fn find_error_node<'a>(node: &Node<'a>) -> Option<Node<'a>> {
        if node.is_error() || node.is_missing() {
            return Some(*node);
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.has_error() || child.is_missing() {
                    if let Some(found) = Self::find_error_node(&child) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Get field text safely
    pub fn get_field_text(&self, node: &Node, field_name: &str) -> Option<String> {
        node.child_by_field_name(field_name)
            .map(|field_node| self.get_node_text(&field_node))
    }

    /// Safely truncate a string to a maximum number of characters (not bytes)
    pub fn truncate_string(text: &str, max_chars: usize) -> String {
        let char_count = text.chars().count();
        if char_count <= max_chars {
            text.to_string()
        } else {
            text.chars().take(max_chars).collect::<String>() + "..."
        }
    }
}
