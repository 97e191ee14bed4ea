// Persisted selection entries

use serde::{Deserialize, Serialize};

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Include/exclude decision for one stable id
///
/// `first_seen_at` and `last_seen_at` are store generations, not wall-clock
/// times. They only feed change reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub included: bool,
    pub first_seen_at: u64,
    pub last_seen_at: u64,
    /// Consecutive merges in which the id was missing from the tree
    #[serde(default, skip_serializing_if = "is_zero")]
    pub staleness: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_description: Option<String>,
}

impl SelectionRecord {
    pub fn new(included: bool, generation: u64) -> Self {
        Self {
            included,
            first_seen_at: generation,
            last_seen_at: generation,
            staleness: 0,
            custom_title: None,
            custom_description: None,
        }
    }
}

/// An imported decision whose id was not in the tree at import time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOverride {
    pub included: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub staleness: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_description: Option<String>,
}
