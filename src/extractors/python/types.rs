/// Class extraction for Python
/// Handles class definitions, base classes, and nested class bodies
use super::super::base::{ComponentKind, Declaration, DeclarationMetadata, DeclarationOptions};
use super::{decorators, helpers, signatures};
use super::{PythonExtractor, Scope};
use tree_sitter::Node;

/// Extract a class definition from a class_definition node
///
/// Returns `None` when the class is filtered out by the visibility rules;
/// its members are then dropped with it.
pub(super) fn extract_class(
    extractor: &PythonExtractor,
    node: Node,
    scope: Scope,
) -> Option<Declaration> {
    let base = extractor.base();
    let name = base.get_field_text(&node, "name")?;
    if !extractor.should_include(&name, scope) {
        return None;
    }

    // Extract base classes and metaclass arguments
    let bases = match node.child_by_field_name("superclasses") {
        Some(superclasses) => helpers::extract_argument_list(extractor, &superclasses),
        None => Vec::new(),
    };

    let signature = if bases.is_empty() {
        format!("class {}", name)
    } else {
        format!("class {}({})", name, bases.join(", "))
    };

    let children = match node.child_by_field_name("body") {
        Some(body) => extractor.extract_block(&body, Scope::Class),
        None => Vec::new(),
    };

    let visibility = signatures::infer_visibility(&name);

    Some(base.create_declaration(
        &node,
        name,
        ComponentKind::Class,
        visibility,
        DeclarationOptions {
            signature,
            doc_text: helpers::body_docstring(extractor, &node),
            metadata: DeclarationMetadata {
                decorators: decorators::extract_decorators(extractor, &node),
                is_async: false,
                bases,
            },
            children,
        },
    ))
}
