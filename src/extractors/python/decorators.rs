/// Decorator extraction and handling
/// Supports @property, @staticmethod, @classmethod, and custom decorators
use super::PythonExtractor;
use tree_sitter::Node;

/// Decorators that turn a method into a property
const PROPERTY_DECORATORS: &[&str] = &[
    "property",
    "cached_property",
    "functools.cached_property",
    "abc.abstractproperty",
    "abstractproperty",
];

/// Extract decorators from a function or class definition
///
/// Names are returned without the leading `@` and without call arguments,
/// e.g. `@lru_cache(maxsize=128)` becomes `lru_cache`.
pub fn extract_decorators(extractor: &PythonExtractor, node: &Node) -> Vec<String> {
    let mut decorators = Vec::new();
    let base = extractor.base();

    // Decorators live on the wrapping decorated_definition, which is the direct parent
    let decorated_node = if node.kind() == "decorated_definition" {
        Some(*node)
    } else {
        node.parent()
            .filter(|parent| parent.kind() == "decorated_definition")
    };

    if let Some(decorated_node) = decorated_node {
        let mut cursor = decorated_node.walk();
        for child in decorated_node.children(&mut cursor) {
            if child.kind() == "decorator" {
                let mut decorator_text = base.get_node_text(&child);

                // Remove @ prefix (@ is ASCII, so this is safe)
                if decorator_text.starts_with('@') {
                    decorator_text = decorator_text[1..].trim().to_string();
                }

                if let Some(paren_index) = decorator_text.find('(') {
                    decorator_text = decorator_text[..paren_index].trim_end().to_string();
                }

                decorators.push(decorator_text);
            }
        }
    }

    decorators
}

/// Whether a decorator list marks a property getter
pub fn is_property(decorators: &[String]) -> bool {
    decorators
        .iter()
        .any(|decorator| PROPERTY_DECORATORS.contains(&decorator.as_str()))
}
