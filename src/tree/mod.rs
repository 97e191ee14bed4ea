//! Component tree
//!
//! - builder.rs: TreeBuilder (hierarchy + identity assignment)
//! - identity.rs: stable id grammar and occurrence suffixes
//! - description.rs: the per-component request handed to a description service
//!
//! A tree is built fresh for every extraction and never mutated afterwards.

pub mod builder;
pub mod description;
pub mod identity;

pub use builder::TreeBuilder;
pub use description::{collect_descriptions, DescriptionRequest, DescriptionSource};
pub use identity::split_stable_id;

use crate::extractors::base::{ComponentKind, DeclarationMetadata, Span, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One extracted unit with its assigned identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub kind: ComponentKind,
    /// Declared name. Modules carry their dotted module path.
    pub name: String,
    pub visibility: Visibility,
    /// Display only, never part of identity
    pub signature: String,
    /// Raw documentation text; empty when absent
    pub doc_text: String,
    pub span: Span,
    #[serde(default)]
    pub metadata: DeclarationMetadata,
    /// Nested components in source declaration order
    pub children: Vec<ComponentNode>,
    pub stable_id: String,
}

impl ComponentNode {
    /// Payload for an external description service
    pub fn description_request(&self) -> DescriptionRequest {
        DescriptionRequest {
            stable_id: self.stable_id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            signature: self.signature.clone(),
            doc_text: self.doc_text.clone(),
        }
    }

    pub fn has_doc(&self) -> bool {
        !self.doc_text.trim().is_empty()
    }
}

/// Counts reported after a build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStatistics {
    pub by_kind: BTreeMap<ComponentKind, usize>,
    pub documented: usize,
    pub undocumented: usize,
}

impl TreeStatistics {
    pub fn total(&self) -> usize {
        self.documented + self.undocumented
    }

    pub fn count(&self, kind: ComponentKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// All module nodes of one repository snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentTree {
    modules: Vec<ComponentNode>,
    ids: BTreeSet<String>,
}

impl ComponentTree {
    pub(crate) fn from_parts(modules: Vec<ComponentNode>, ids: BTreeSet<String>) -> Self {
        Self { modules, ids }
    }

    /// Module nodes in relative-path order
    pub fn modules(&self) -> &[ComponentNode] {
        &self.modules
    }

    /// Every stable id in the tree
    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn contains(&self, stable_id: &str) -> bool {
        self.ids.contains(stable_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Depth-first, pre-order walk over every node
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.modules.iter().rev().collect(),
        }
    }

    pub fn find(&self, stable_id: &str) -> Option<&ComponentNode> {
        if !self.contains(stable_id) {
            return None;
        }
        self.iter().find(|node| node.stable_id == stable_id)
    }

    pub fn statistics(&self) -> TreeStatistics {
        let mut stats = TreeStatistics::default();
        for node in self.iter() {
            *stats.by_kind.entry(node.kind).or_insert(0) += 1;
            if node.has_doc() {
                stats.documented += 1;
            } else {
                stats.undocumented += 1;
            }
        }
        stats
    }

    /// blake3 hex digest of the tree's canonical JSON
    ///
    /// Equal fingerprints mean byte-identical trees, spans included.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        if let Err(e) = serde_json::to_writer(&mut hasher, &self.modules) {
            tracing::warn!("Fingerprint serialization failed: {}", e);
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl<'a> IntoIterator for &'a ComponentTree {
    type Item = &'a ComponentNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator returned by [`ComponentTree::iter`]
pub struct Iter<'a> {
    stack: Vec<&'a ComponentNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ComponentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
