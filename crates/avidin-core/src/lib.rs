//! avidin-core
//!
//! Domain types for the binding-affinity pipeline: cleaned ligand/target
//! records, the row-level filter policy, feature fusion, and the fused
//! dataset with its deterministic train/held-out split.
pub mod dataset;
pub mod fusion;
pub mod record;

pub use dataset::{train_test_split, FeatureDataset};
pub use fusion::fuse;
pub use record::{BindingRecord, RecordFilter};
