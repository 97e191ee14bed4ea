//! Hand-off to an external description service
//!
//! The service is an explicit collaborator passed in by the caller. Nothing
//! here retries or caches; a source that wants caching keys it by
//! `stable_id` itself and lives only as long as the caller keeps it.

use super::ComponentTree;
use crate::error::Diagnostic;
use crate::extractors::base::ComponentKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a description service receives for one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRequest {
    pub stable_id: String,
    pub kind: ComponentKind,
    pub name: String,
    pub signature: String,
    pub doc_text: String,
}

/// Produces free-text descriptions for components
pub trait DescriptionSource {
    fn describe(&mut self, request: &DescriptionRequest) -> anyhow::Result<String>;
}

/// Ask `source` to describe every node accepted by `wanted`
///
/// Each failure becomes a diagnostic keyed by the component's file; the
/// remaining components are still described.
pub fn collect_descriptions<F>(
    tree: &ComponentTree,
    source: &mut dyn DescriptionSource,
    wanted: F,
) -> (BTreeMap<String, String>, Vec<Diagnostic>)
where
    F: Fn(&str) -> bool,
{
    let mut descriptions = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for node in tree.iter().filter(|node| wanted(&node.stable_id)) {
        match source.describe(&node.description_request()) {
            Ok(text) => {
                descriptions.insert(node.stable_id.clone(), text);
            }
            Err(e) => {
                tracing::warn!("No description for {}: {}", node.stable_id, e);
                diagnostics.push(Diagnostic::new(
                    node.span.file_path.clone(),
                    format!("Description failed for {}: {}", node.stable_id, e),
                ));
            }
        }
    }

    (descriptions, diagnostics)
}
