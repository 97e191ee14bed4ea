/// Python declaration parser
///
/// This module is organized into focused sub-modules:
/// - helpers: Docstrings and string literal handling
/// - types: Class extraction
/// - functions: Function, method, and property getter extraction
/// - signatures: Parameter and return annotation extraction, visibility
/// - decorators: Decorator extraction and handling
/// - assignments: Module and class level assignment extraction, `__all__`
pub(crate) mod assignments;
pub(crate) mod decorators;
pub(crate) mod functions;
pub(crate) mod helpers;
pub(crate) mod signatures;
pub(crate) mod types;

use crate::extractors::base::{
    BaseExtractor, Declaration, DeclarationParser, ExtractOptions, ModuleDeclarations,
    ParseFailure, Visibility,
};
use tree_sitter::{Node, Parser, Tree};

/// Dunder members kept in class bodies even when private names are filtered
const DOCUMENTED_SPECIAL_MEMBERS: &[&str] =
    &["__init__", "__new__", "__call__", "__enter__", "__exit__"];

/// Where a statement sits; decides kinds and filtering rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Module,
    Class,
}

/// Python extractor for one file
pub struct PythonExtractor {
    base: BaseExtractor,
    /// Literal `__all__` of the module, when present
    exports: Option<Vec<String>>,
}

impl PythonExtractor {
    pub fn new(file_path: String, content: String, options: ExtractOptions) -> Self {
        Self {
            base: BaseExtractor::new("python".to_string(), file_path, content, options),
            exports: None,
        }
    }

    /// Extract the module docstring and all top-level declarations
    pub fn extract_module(&mut self, tree: &Tree) -> ModuleDeclarations {
        let root = tree.root_node();
        self.exports = assignments::extract_all_exports(self, &root);

        let doc_text = helpers::leading_string(self, &root).unwrap_or_default();
        let declarations = self.extract_block(&root, Scope::Module);

        ModuleDeclarations {
            file_path: self.base.file_path.clone(),
            doc_text,
            end_line: self.base.end_line(),
            declarations,
        }
    }

    /// Extract declarations from a module root or a class body, in source order
    pub(crate) fn extract_block(&self, block: &Node, scope: Scope) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        let mut cursor = block.walk();
        for statement in block.named_children(&mut cursor) {
            self.extract_statement(statement, scope, &mut declarations);
        }
        declarations
    }

    fn extract_statement(&self, node: Node, scope: Scope, declarations: &mut Vec<Declaration>) {
        match node.kind() {
            "class_definition" => {
                declarations.extend(types::extract_class(self, node, scope));
            }
            "function_definition" => {
                declarations.extend(functions::extract_function(self, node, scope));
            }
            "decorated_definition" => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.extract_statement(definition, scope, declarations);
                }
            }
            "expression_statement" => {
                declarations.extend(assignments::extract_assignments(self, node, scope));
            }
            _ => {}
        }
    }

    /// Visibility filter
    ///
    /// With private names requested everything is kept. Otherwise module
    /// scope honours a literal `__all__` first. Class scope keeps the
    /// commonly documented dunders and drops every other underscore name.
    pub(crate) fn should_include(&self, name: &str, scope: Scope) -> bool {
        let include_private = self.base.options.include_private;
        match scope {
            Scope::Module if include_private => true,
            Scope::Module => match &self.exports {
                Some(exports) => exports.iter().any(|export| export == name),
                None => signatures::infer_visibility(name) == Visibility::Public,
            },
            Scope::Class => {
                include_private
                    || DOCUMENTED_SPECIAL_MEMBERS.contains(&name)
                    || !name.starts_with('_')
            }
        }
    }

    // ========================================================================
    // Accessors for sub-modules
    // ========================================================================

    pub(crate) fn base(&self) -> &BaseExtractor {
        &self.base
    }
}

/// `DeclarationParser` for the Python grammar
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonParser;

impl DeclarationParser for PythonParser {
    fn grammar(&self) -> &'static str {
        "python"
    }

    fn parse_declarations(
        &self,
        file_path: &str,
        content: &str,
        options: ExtractOptions,
    ) -> Result<ModuleDeclarations, ParseFailure> {
        let setup_failure = |message: String| ParseFailure {
            line: 0,
            column: 0,
            message,
        };

        let language = crate::language::get_tree_sitter_language(self.grammar())
            .map_err(|e| setup_failure(e.to_string()))?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| setup_failure(format!("Failed to set parser language: {}", e)))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| setup_failure("Parser returned no tree".to_string()))?;

        let mut extractor =
            PythonExtractor::new(file_path.to_string(), content.to_string(), options);
        if let Some(failure) = extractor.base().first_syntax_error(&tree.root_node()) {
            return Err(failure);
        }

        Ok(extractor.extract_module(&tree))
    }
}
