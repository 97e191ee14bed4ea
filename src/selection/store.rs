//! SelectionStore - durable stable id -> decision mapping
//!
//! Persisted as a YAML document:
//!
//! ```yaml
//! version: 1
//! generation: 4
//! selections:
//!   pkg.mod.Foo.bar#method:
//!     included: false
//!     first_seen_at: 1
//!     last_seen_at: 4
//! pending: {}
//! ```
//!
//! Maps are `BTreeMap`s so saved files diff cleanly between runs.

use super::record::{PendingOverride, SelectionRecord};
use crate::error::{Result, SurfaceError};
use crate::tree::{split_stable_id, ComponentTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Current on-disk format version
pub const STORE_VERSION: u32 = 1;

fn default_version() -> u32 {
    STORE_VERSION
}

/// What to do when a prior store cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRecovery {
    /// Surface the error to the caller
    Abort,
    /// Continue with an empty store. Only on explicit user confirmation.
    TreatAsEmpty,
}

/// Outcome of [`SelectionStore::import`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Ids present in the tree whose decision was replaced
    pub applied: Vec<String>,
    /// Ids absent from the tree, kept as pending overrides
    pub pending: Vec<String>,
    /// Strings that are not well-formed stable ids
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionStore {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    pub(crate) generation: u64,
    #[serde(default)]
    pub(crate) selections: BTreeMap<String, SelectionRecord>,
    #[serde(default)]
    pub(crate) pending: BTreeMap<String, PendingOverride>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            generation: 0,
            selections: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }

    /// Read a store from disk
    ///
    /// A missing file is an empty store. Anything unreadable or malformed is
    /// an error; use [`SelectionStore::load_with_recovery`] to decide what
    /// happens next.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No selection store at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(corruption(path, "file is not valid UTF-8"));
            }
            Err(source) => {
                return Err(SurfaceError::StoreIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let store = parse_document(path, &content)?;
        debug!(
            "Loaded {} selections ({} pending) from {}",
            store.selections.len(),
            store.pending.len(),
            path.display()
        );
        Ok(store)
    }

    /// [`SelectionStore::load`] with an explicit decision for unreadable stores
    pub fn load_with_recovery(path: &Path, recovery: StoreRecovery) -> Result<Self> {
        match Self::load(path) {
            Err(err @ (SurfaceError::StoreCorruption { .. } | SurfaceError::StoreIo { .. }))
                if recovery == StoreRecovery::TreatAsEmpty =>
            {
                warn!("{}; continuing with an empty selection store", err);
                Ok(Self::new())
            }
            other => other,
        }
    }

    /// Write the store as YAML, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(|e| store_io(path, io::Error::other(e)))?;
        write_atomically(path, &yaml)?;
        debug!("Saved {} selections to {}", self.selections.len(), path.display());
        Ok(())
    }

    /// Serialize the store verbatim; YAML for `.yaml`/`.yml`, pretty JSON otherwise
    pub fn export(&self, path: &Path) -> Result<()> {
        let content = if is_yaml_path(path) {
            serde_yaml::to_string(self).map_err(|e| store_io(path, io::Error::other(e)))?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| store_io(path, io::Error::other(e)))?
        };
        write_atomically(path, &content)?;
        info!("Exported {} selections to {}", self.selections.len(), path.display());
        Ok(())
    }

    /// Apply decisions from an exported store
    ///
    /// Ids that exist in `tree` take the imported `included` value (and any
    /// custom title or description). Ids the tree does not contain are never
    /// turned into records; they wait in `pending` for the next merge.
    pub fn import(&mut self, path: &Path, tree: &ComponentTree) -> Result<ImportReport> {
        let content = fs::read_to_string(path).map_err(|e| store_io(path, e))?;
        let imported = parse_document(path, &content)?;

        let overrides = imported
            .selections
            .into_iter()
            .map(|(id, record)| {
                (
                    id,
                    PendingOverride {
                        included: record.included,
                        staleness: 0,
                        custom_title: record.custom_title,
                        custom_description: record.custom_description,
                    },
                )
            })
            .chain(imported.pending);

        let mut report = ImportReport::default();
        for (id, decision) in overrides {
            if split_stable_id(&id).is_none() {
                warn!("Ignoring malformed stable id in import: {}", id);
                report.rejected.push(id);
                continue;
            }

            if tree.contains(&id) {
                self.apply_override(&id, decision);
                report.applied.push(id);
            } else {
                self.pending.insert(
                    id.clone(),
                    PendingOverride {
                        staleness: 0,
                        ..decision
                    },
                );
                report.pending.push(id);
            }
        }

        info!(
            "Imported {} decisions from {} ({} pending, {} rejected)",
            report.applied.len(),
            path.display(),
            report.pending.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    pub(crate) fn apply_override(&mut self, id: &str, decision: PendingOverride) {
        let generation = self.generation;
        let record = self
            .selections
            .entry(id.to_string())
            .or_insert_with(|| SelectionRecord::new(decision.included, generation));
        record.included = decision.included;
        if decision.custom_title.is_some() {
            record.custom_title = decision.custom_title;
        }
        if decision.custom_description.is_some() {
            record.custom_description = decision.custom_description;
        }
        self.pending.remove(id);
    }

    /// Change one decision. Returns false when the id has no record.
    pub fn set_included(&mut self, stable_id: &str, included: bool) -> bool {
        match self.selections.get_mut(stable_id) {
            Some(record) => {
                record.included = included;
                true
            }
            None => false,
        }
    }

    pub fn set_custom_title(&mut self, stable_id: &str, title: Option<String>) -> bool {
        match self.selections.get_mut(stable_id) {
            Some(record) => {
                record.custom_title = title;
                true
            }
            None => false,
        }
    }

    pub fn set_custom_description(&mut self, stable_id: &str, description: Option<String>) -> bool {
        match self.selections.get_mut(stable_id) {
            Some(record) => {
                record.custom_description = description;
                true
            }
            None => false,
        }
    }

    /// Decision for an id, if it has a record
    pub fn is_included(&self, stable_id: &str) -> Option<bool> {
        self.selections.get(stable_id).map(|record| record.included)
    }

    pub fn included_ids(&self) -> Vec<&str> {
        self.ids_where(true)
    }

    pub fn excluded_ids(&self) -> Vec<&str> {
        self.ids_where(false)
    }

    fn ids_where(&self, included: bool) -> Vec<&str> {
        self.selections
            .iter()
            .filter(|(_, record)| record.included == included)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn get(&self, stable_id: &str) -> Option<&SelectionRecord> {
        self.selections.get(stable_id)
    }

    pub fn records(&self) -> impl Iterator<Item = (&str, &SelectionRecord)> {
        self.selections.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn pending(&self) -> &BTreeMap<String, PendingOverride> {
        &self.pending
    }

    /// Logical clock; advances only when a merge changes the store
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

fn parse_document(path: &Path, content: &str) -> Result<SelectionStore> {
    if content.trim().is_empty() {
        return Err(corruption(path, "file is empty"));
    }

    let store: SelectionStore = if is_yaml_path(path) {
        serde_yaml::from_str(content).map_err(|e| corruption(path, &e.to_string()))?
    } else {
        serde_json::from_str(content).map_err(|e| corruption(path, &e.to_string()))?
    };

    if store.version != STORE_VERSION {
        return Err(corruption(
            path,
            &format!("unsupported store version {}", store.version),
        ));
    }
    Ok(store)
}

// Stores and exports without an extension are YAML; `.json` and the rest are JSON
fn is_yaml_path(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"),
        None => true,
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| store_io(path, e))?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, content).map_err(|e| store_io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| store_io(path, e))
}

fn corruption(path: &Path, detail: &str) -> SurfaceError {
    SurfaceError::StoreCorruption {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

fn store_io(path: &Path, source: io::Error) -> SurfaceError {
    SurfaceError::StoreIo {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{ExtractOptions, ExtractorManager};
    use crate::tree::TreeBuilder;
    use tempfile::TempDir;

    fn tree_with(source: &str) -> ComponentTree {
        let declarations = ExtractorManager::new()
            .extract_declarations("pkg/mod.py", source, ExtractOptions::default())
            .unwrap();
        TreeBuilder::new().build(vec![declarations]).unwrap()
    }

    fn store_with(entries: &[(&str, bool)]) -> SelectionStore {
        let mut store = SelectionStore::new();
        for (id, included) in entries {
            store
                .selections
                .insert(id.to_string(), SelectionRecord::new(*included, 0));
        }
        store
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = SelectionStore::load(&temp_dir.path().join("selections.yaml")).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_save_and_load_preserve_everything() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".apisurface/selections.yaml");

        let mut store = store_with(&[("pkg.mod.Foo.bar#method", false), ("pkg.mod#module", true)]);
        store.generation = 3;
        assert!(store.set_custom_title("pkg.mod#module", Some("Core".to_string())));
        store.save(&path).unwrap();

        let loaded = SelectionStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.excluded_ids(), vec!["pkg.mod.Foo.bar#method"]);
        assert_eq!(loaded.get("pkg.mod#module").unwrap().custom_title.as_deref(), Some("Core"));
    }

    #[test]
    fn test_corrupt_store_requires_decision() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("selections.yaml");
        fs::write(&path, "selections: [this is: not a map\n").unwrap();

        let err = SelectionStore::load(&path).unwrap_err();
        assert!(matches!(err, SurfaceError::StoreCorruption { .. }));

        let err = SelectionStore::load_with_recovery(&path, StoreRecovery::Abort).unwrap_err();
        assert!(matches!(err, SurfaceError::StoreCorruption { .. }));

        let store = SelectionStore::load_with_recovery(&path, StoreRecovery::TreatAsEmpty).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_and_future_version_are_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("selections.yaml");

        fs::write(&path, "").unwrap();
        assert!(matches!(
            SelectionStore::load(&path),
            Err(SurfaceError::StoreCorruption { .. })
        ));

        fs::write(&path, "version: 7\nselections: {}\n").unwrap();
        assert!(matches!(
            SelectionStore::load(&path),
            Err(SurfaceError::StoreCorruption { .. })
        ));
    }

    #[test]
    fn test_import_applies_known_ids_and_defers_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let tree = tree_with("class Foo:\n    def bar(self):\n        pass\n");

        let exported = store_with(&[
            ("pkg.mod.Foo.bar#method", false),
            ("pkg.mod.Gone#class", false),
            ("not-an-id", true),
        ]);
        let export_path = temp_dir.path().join("export.json");
        exported.export(&export_path).unwrap();

        let mut store = store_with(&[("pkg.mod.Foo.bar#method", true)]);
        let report = store.import(&export_path, &tree).unwrap();

        assert_eq!(report.applied, vec!["pkg.mod.Foo.bar#method"]);
        assert_eq!(report.pending, vec!["pkg.mod.Gone#class"]);
        assert_eq!(report.rejected, vec!["not-an-id"]);
        assert_eq!(store.is_included("pkg.mod.Foo.bar#method"), Some(false));
        assert_eq!(store.get("pkg.mod.Gone#class"), None, "Absent ids never become records");
        assert!(store.pending().contains_key("pkg.mod.Gone#class"));
    }

    #[test]
    fn test_export_format_follows_extension() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(&[("pkg.mod#module", true)]);

        let yaml_path = temp_dir.path().join("out.yml");
        let json_path = temp_dir.path().join("out.json");
        store.export(&yaml_path).unwrap();
        store.export(&json_path).unwrap();

        let yaml = fs::read_to_string(&yaml_path).unwrap();
        let json = fs::read_to_string(&json_path).unwrap();
        assert!(yaml.starts_with("version: 1"));
        assert!(json.trim_start().starts_with('{'));
        assert_eq!(SelectionStore::load(&json_path).unwrap(), store);
    }

    #[test]
    fn test_set_included_requires_record() {
        let mut store = store_with(&[("pkg.mod.f#function", true)]);
        assert!(store.set_included("pkg.mod.f#function", false));
        assert!(!store.set_included("pkg.mod.g#function", false));
        assert_eq!(store.included_ids(), Vec::<&str>::new());
        assert_eq!(store.excluded_ids(), vec!["pkg.mod.f#function"]);
    }
}
