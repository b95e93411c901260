//! Cleaned binding measurements and the row filter policy applied to them.
use serde::{Deserialize, Serialize};

/// One cleaned (ligand, target, affinity) measurement.
///
/// The record source guarantees all three fields are present and that the
/// affinity passed its filter. Records are immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRecord {
    /// Small-molecule structure in SMILES notation.
    pub ligand_smiles: String,
    /// Amino-acid sequence of the binding target.
    pub target_sequence: String,
    /// Inhibition constant Ki in nanomolar. Lower binds tighter.
    pub affinity_nm: f64,
}

/// Row filters applied by the record source.
///
/// Out-of-range affinities are dropped rather than rejected: the pipeline
/// shapes its input and keeps running. This is deliberate policy, not a
/// recovery path (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Keep rows with `affinity_nm` strictly below this bound (nM).
    pub max_affinity_nm: f64,
    /// Optional cap on the number of rows kept after filtering.
    pub limit: Option<usize>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            max_affinity_nm: 10_000.0,
            limit: None,
        }
    }
}

impl RecordFilter {
    /// True when an affinity passes the threshold. NaN never passes.
    pub fn keeps(&self, affinity_nm: f64) -> bool {
        affinity_nm < self.max_affinity_nm
    }
}
