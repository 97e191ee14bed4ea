//! Selection persistence and reconciliation
//!
//! - store.rs: SelectionStore load/save/export/import
//! - merge.rs: SelectionMerger and the change report
//! - lock.rs: single-writer lock file
//! - record.rs: persisted record types

pub mod lock;
pub mod merge;
pub mod record;
pub mod store;

pub use lock::StoreLock;
pub use merge::{merge, ChangeReport, MergePolicy, SelectionMerger};
pub use record::{PendingOverride, SelectionRecord};
pub use store::{ImportReport, SelectionStore, StoreRecovery, STORE_VERSION};
