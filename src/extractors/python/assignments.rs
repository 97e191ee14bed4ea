/// Variable and constant assignment extraction
/// Handles plain and annotated assignments, tuple unpacking, and `__all__`
use super::super::base::{
    BaseExtractor, ComponentKind, Declaration, DeclarationMetadata, DeclarationOptions,
};
use super::{helpers, signatures};
use super::{PythonExtractor, Scope};
use tree_sitter::Node;

/// Longest value text kept in a property signature
const MAX_VALUE_CHARS: usize = 80;

/// Extract the properties declared by an expression statement
///
/// Returns an empty vector for statements that are not assignments, for
/// attribute targets (`self.x = ...`), and for `__all__` itself.
pub(super) fn extract_assignments(
    extractor: &PythonExtractor,
    statement: Node,
    scope: Scope,
) -> Vec<Declaration> {
    let assignment = match statement.named_child(0) {
        Some(child) if child.kind() == "assignment" => child,
        _ => return vec![],
    };
    let base = extractor.base();

    // A = B = 1 nests the second assignment in `right`
    let mut names = Vec::new();
    let mut link = assignment;
    let value_node = loop {
        if let Some(left) = link.child_by_field_name("left") {
            names.extend(target_names(extractor, &left));
        }
        match link.child_by_field_name("right") {
            Some(right) if right.kind() == "assignment" => link = right,
            right => break right,
        }
    };
    if names.is_empty() {
        return vec![];
    }

    let type_annotation = assignment
        .child_by_field_name("type")
        .map(|type_node| base.get_node_text(&type_node));
    let value = value_node
        .map(|right| BaseExtractor::truncate_string(&base.get_node_text(&right), MAX_VALUE_CHARS));

    let doc_text = attribute_docstring(extractor, &statement)
        .or_else(|| base.preceding_comment_block(&statement, "#"));

    names
        .into_iter()
        .filter(|name| name != "__all__" && extractor.should_include(name, scope))
        .map(|name| {
            let mut signature = name.clone();
            if let Some(type_annotation) = &type_annotation {
                signature.push_str(&format!(": {}", type_annotation));
            }
            if let Some(value) = &value {
                signature.push_str(&format!(" = {}", value));
            }
            let visibility = signatures::infer_visibility(&name);

            base.create_declaration(
                &statement,
                name,
                ComponentKind::Property,
                visibility,
                DeclarationOptions {
                    signature,
                    doc_text: doc_text.clone(),
                    metadata: DeclarationMetadata::default(),
                    children: Vec::new(),
                },
            )
        })
        .collect()
}

/// Names bound by one assignment target; attribute and subscript targets bind none
fn target_names(extractor: &PythonExtractor, left: &Node) -> Vec<String> {
    let base = extractor.base();
    match left.kind() {
        "identifier" => vec![base.get_node_text(left)],
        "pattern_list" | "tuple_pattern" => {
            // a, b = 1, 2 declares both 'a' and 'b'
            let mut cursor = left.walk();
            left.named_children(&mut cursor)
                .filter(|child| child.kind() == "identifier")
                .map(|child| base.get_node_text(&child))
                .collect()
        }
        _ => vec![],
    }
}

/// A bare string statement directly after an assignment documents it
fn attribute_docstring(extractor: &PythonExtractor, statement: &Node) -> Option<String> {
    let next = statement.next_named_sibling()?;
    if next.start_position().row > statement.end_position().row + 1 {
        return None;
    }
    helpers::bare_string(extractor, &next)
}

/// Extract the `__all__` export list when it is a literal list or tuple
pub(super) fn extract_all_exports(extractor: &PythonExtractor, root: &Node) -> Option<Vec<String>> {
    let base = extractor.base();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "expression_statement" {
            continue;
        }
        let Some(assignment) = statement.named_child(0) else {
            continue;
        };
        if assignment.kind() != "assignment"
            || base.get_field_text(&assignment, "left").as_deref() != Some("__all__")
        {
            continue;
        }
        let right = assignment.child_by_field_name("right")?;
        if right.kind() != "list" && right.kind() != "tuple" {
            return None;
        }
        let mut items_cursor = right.walk();
        let exports = right
            .named_children(&mut items_cursor)
            .filter(|item| item.kind() == "string")
            .map(|item| helpers::strip_string_delimiters(&base.get_node_text(&item)))
            .collect();
        return Some(exports);
    }
    None
}
