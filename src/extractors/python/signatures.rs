/// Function signatures and parameter extraction
/// Handles parameter lists, return annotations, and visibility inference
use super::PythonExtractor;
use crate::extractors::base::Visibility;
use tree_sitter::Node;

/// Extract function parameters from a parameters node
///
/// Every named parameter form is kept verbatim (defaults, annotations,
/// `*args`, `**kwargs`, and the bare `*` / `/` separators). With
/// `skip_receiver`, a leading `self` or `cls` is dropped.
pub fn extract_parameters(
    extractor: &PythonExtractor,
    parameters_node: &Node,
    skip_receiver: bool,
) -> Vec<String> {
    let mut params = Vec::new();
    let base = extractor.base();

    let mut cursor = parameters_node.walk();
    let mut first = true;
    for child in parameters_node.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        let text = base.get_node_text(&child);
        let is_receiver = first
            && skip_receiver
            && matches!(child.kind(), "identifier" | "typed_parameter")
            && matches!(text.split(':').next().map(str::trim), Some("self") | Some("cls"));
        first = false;
        if !is_receiver {
            params.push(text);
        }
    }

    params
}

/// Return annotation text (`-> T`) or an empty string
pub fn return_annotation(extractor: &PythonExtractor, node: &Node) -> String {
    match node.child_by_field_name("return_type") {
        Some(return_type) => format!(" -> {}", extractor.base().get_node_text(&return_type)),
        None => String::new(),
    }
}

/// Bare return type text, if annotated
pub fn return_type(extractor: &PythonExtractor, node: &Node) -> Option<String> {
    node.child_by_field_name("return_type")
        .map(|return_type| extractor.base().get_node_text(&return_type))
}

/// Infer visibility from a name
/// Python uses naming conventions: _private, __dunder__, public
pub fn infer_visibility(name: &str) -> Visibility {
    let marker = crate::language::private_marker("python");
    if is_dunder(name) {
        // Dunder methods are public
        Visibility::Public
    } else if name.starts_with(marker) {
        // Single underscore indicates private/protected
        Visibility::Private
    } else {
        Visibility::Public
    }
}

/// `__name__` style special names
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Check if a function has an async keyword
pub(super) fn has_async_keyword(node: &Node) -> bool {
    // Check if any of the node's children is an "async" keyword
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "async" {
            return true;
        }
    }
    false
}
