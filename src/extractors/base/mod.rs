// Base Extractor Types and Traits
//
// - types.rs: declaration descriptors, kinds, spans
// - extractor.rs: BaseExtractor implementation (core methods)
// - tree_methods.rs: Tree navigation and syntax error location
// - creation_methods.rs: Declaration construction

pub mod creation_methods;
pub mod extractor;
pub mod tree_methods;
pub mod types;

// Re-export key types for external use
pub use extractor::BaseExtractor;
pub use types::{
    ComponentKind, Declaration, DeclarationMetadata, DeclarationOptions, ExtractOptions,
    ModuleDeclarations, ParseFailure, Span, Visibility,
};

/// Parse one file's source text into declaration descriptors
///
/// Implemented once per supported grammar. The tree builder and the
/// selection merger only ever see the `ModuleDeclarations` this returns, so
/// a new grammar never touches them.
pub trait DeclarationParser: Send + Sync {
    /// Grammar name as used by `crate::language`
    fn grammar(&self) -> &'static str;

    /// Parse `content` for the file at relative Unix-style `file_path`
    fn parse_declarations(
        &self,
        file_path: &str,
        content: &str,
        options: ExtractOptions,
    ) -> Result<ModuleDeclarations, ParseFailure>;
}
