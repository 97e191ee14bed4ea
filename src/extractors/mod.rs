//! Grammar extractors
//!
//! Tree-sitter based parsers that turn one source file into declaration
//! descriptors.
//!
//! # Architecture
//!
//! - `base` - Shared types, `BaseExtractor`, and the `DeclarationParser` trait
//! - `manager` - `ExtractorManager` public API (grammar routing)
//! - Grammar modules (python)

pub mod base;
pub mod manager;

pub mod python;

// Re-export the public API
pub use base::{
    ComponentKind, Declaration, DeclarationMetadata, DeclarationParser, ExtractOptions,
    ModuleDeclarations, ParseFailure, Span, Visibility,
};
pub use manager::ExtractorManager;
