// Declaration creation methods

use tree_sitter::Node;

use super::extractor::BaseExtractor;
use super::types::{ComponentKind, Declaration, DeclarationOptions, Visibility};

impl BaseExtractor {
    /// Create a declaration for a node
    ///
    /// The signature is whitespace-normalized here so every grammar reports
    /// display text in the same shape. A missing docstring becomes "".
    pub fn create_declaration(
        &self,
        node: &Node,
        name: String,
        kind: ComponentKind,
        visibility: Visibility,
        options: DeclarationOptions,
    ) -> Declaration {
        Declaration {
            kind,
            name,
            visibility,
            signature: Self::normalize_signature(&options.signature),
            doc_text: options.doc_text.unwrap_or_default(),
            span: self.span_of(node),
            metadata: options.metadata,
            children: options.children,
        }
    }
}
