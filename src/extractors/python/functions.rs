/// Function and method extraction
/// Handles regular functions, async functions, methods, and property getters
use super::super::base::{ComponentKind, Declaration, DeclarationMetadata, DeclarationOptions};
use super::{decorators, helpers, signatures};
use super::{PythonExtractor, Scope};
use tree_sitter::Node;

/// Extract a function definition
///
/// At module scope this is a function. Inside a class body it is a method,
/// or a property when decorated as a getter.
pub(super) fn extract_function(
    extractor: &PythonExtractor,
    node: Node,
    scope: Scope,
) -> Option<Declaration> {
    let base = extractor.base();
    let name = base.get_field_text(&node, "name")?;
    if !extractor.should_include(&name, scope) {
        return None;
    }

    let decorators_list = decorators::extract_decorators(extractor, &node);
    let is_async = signatures::has_async_keyword(&node);

    let kind = match scope {
        Scope::Module => ComponentKind::Function,
        Scope::Class if decorators::is_property(&decorators_list) => ComponentKind::Property,
        Scope::Class => ComponentKind::Method,
    };

    let signature = if kind == ComponentKind::Property {
        match signatures::return_type(extractor, &node) {
            Some(return_type) => format!("{}: {}", name, return_type),
            None => name.clone(),
        }
    } else {
        let skip_receiver =
            scope == Scope::Class && !decorators_list.iter().any(|d| d == "staticmethod");
        let params = match node.child_by_field_name("parameters") {
            Some(parameters_node) => {
                signatures::extract_parameters(extractor, &parameters_node, skip_receiver)
            }
            None => Vec::new(),
        };
        let async_prefix = if is_async { "async " } else { "" };
        format!(
            "{}def {}({}){}",
            async_prefix,
            name,
            params.join(", "),
            signatures::return_annotation(extractor, &node)
        )
    };

    let visibility = signatures::infer_visibility(&name);

    Some(base.create_declaration(
        &node,
        name,
        kind,
        visibility,
        DeclarationOptions {
            signature,
            doc_text: helpers::body_docstring(extractor, &node),
            metadata: DeclarationMetadata {
                decorators: decorators_list,
                is_async,
                bases: Vec::new(),
            },
            children: Vec::new(),
        },
    ))
}
