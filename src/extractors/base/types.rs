// Base Extractor Types
//
// Data structures shared by every grammar: component kinds, visibility,
// spans, and the declaration descriptors a DeclarationParser produces.

use serde::{Deserialize, Serialize};

/// Component kinds emitted by extraction
///
/// The serialized form doubles as the kind tag inside stable ids, so the
/// strings below must never change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Module,
    Class,
    Function,
    Method,
    Property,
}

impl ComponentKind {
    /// Tag appended to stable ids
    pub fn tag(&self) -> &'static str {
        match self {
            ComponentKind::Module => "module",
            ComponentKind::Class => "class",
            ComponentKind::Function => "function",
            ComponentKind::Method => "method",
            ComponentKind::Property => "property",
        }
    }

    /// Convert from string representation (for store and id parsing)
    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "module" => Some(ComponentKind::Module),
            "class" => Some(ComponentKind::Class),
            "function" => Some(ComponentKind::Function),
            "method" => Some(ComponentKind::Method),
            "property" => Some(ComponentKind::Property),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Visibility derived from the naming convention only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Source location of a declaration. Informational only, never part of identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Relative Unix-style path of the file
    pub file_path: String,
    /// Start line number (1-based)
    pub start_line: u32,
    /// End line number (1-based, inclusive)
    pub end_line: u32,
}

/// Grammar-specific extras carried for display
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeclarationMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
}

/// One declaration as reported by a grammar, before identity assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: ComponentKind,
    pub name: String,
    pub visibility: Visibility,
    pub signature: String,
    /// Raw documentation text; empty when absent
    pub doc_text: String,
    pub span: Span,
    pub metadata: DeclarationMetadata,
    /// Nested declarations in source order
    pub children: Vec<Declaration>,
}

/// Everything a grammar reports for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDeclarations {
    /// Relative Unix-style path of the file
    pub file_path: String,
    /// Module-level documentation; empty when absent
    pub doc_text: String,
    /// Last line of the file (1-based)
    pub end_line: u32,
    /// Top-level declarations in source order
    pub declarations: Vec<Declaration>,
}

/// Options for creating declarations - mirrors the fields a grammar computes
#[derive(Debug, Clone, Default)]
pub struct DeclarationOptions {
    pub signature: String,
    pub doc_text: Option<String>,
    pub metadata: DeclarationMetadata,
    pub children: Vec<Declaration>,
}

/// Per-file extraction switches handed to every grammar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Keep private names in the output
    pub include_private: bool,
}

/// A file the grammar could not turn into declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// 1-based line of the first problem
    pub line: u32,
    /// 0-based column of the first problem
    pub column: u32,
    pub message: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.message)
    }
}
