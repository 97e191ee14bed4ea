// apisurface - public API surface extraction with durable selections
//
// Pipeline: scanner -> extractors (tree-sitter, one DeclarationParser per
// grammar) -> tree (stable ids) -> selection (merge against the persisted
// store). `pipeline` wires the stages together for a whole repository.

pub mod config;
pub mod error;
pub mod extractors;
pub mod language;
pub mod pipeline;
pub mod scanner;
pub mod selection;
pub mod tree;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::SurfaceConfig;
pub use error::{Diagnostic, Result, SurfaceError};
pub use extractors::{ComponentKind, Visibility};
pub use pipeline::{extract_repository, reconcile, sync_selections, Extraction};
pub use scanner::{scan_sources, ScanResult, SourceFile, SourceScanner};
pub use selection::{
    ChangeReport, MergePolicy, SelectionMerger, SelectionRecord, SelectionStore, StoreLock,
    StoreRecovery,
};
pub use tree::{ComponentNode, ComponentTree, DescriptionRequest, DescriptionSource, TreeBuilder};
