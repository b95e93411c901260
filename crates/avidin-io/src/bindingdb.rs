//! BindingDB-style CSV loading.
//!
//! BindingDB exports are wide and messy: the three columns we need sit
//! among dozens of others, affinities arrive as text with censored values
//! like `>10000`, and rows routinely miss a field. Unusable rows are
//! dropped here, silently, so downstream stages only ever see complete
//! records.
use anyhow::{Context, Result};
use avidin_core::{BindingRecord, RecordFilter};
use itertools::izip;
use polars::prelude::*;
use std::path::Path;

/// Column names to pull from the table.
///
/// Defaults match a BindingDB export. Override for tables that use
/// different headers for the same three fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub ligand_smiles: String,
    pub target_sequence: String,
    pub affinity_nm: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            ligand_smiles: "Ligand SMILES".to_string(),
            target_sequence: "BindingDB Target Chain Sequence".to_string(),
            affinity_nm: "Ki (nM)".to_string(),
        }
    }
}

/// Read a CSV file and return the filtered records in file order.
pub fn read_binding_records(
    path: impl AsRef<Path>,
    columns: &ColumnMap,
    filter: &RecordFilter,
) -> Result<Vec<BindingRecord>> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("failed to parse {}", path.display()))?;
    records_from_frame(&df, columns, filter)
}

/// Extract filtered records from an already-loaded frame.
///
/// A row survives when all three fields are present, the affinity parses
/// as a number, and `filter` keeps it. Rows come out in frame order; the
/// scan stops once `filter.limit` rows have been kept.
pub fn records_from_frame(
    df: &DataFrame,
    columns: &ColumnMap,
    filter: &RecordFilter,
) -> Result<Vec<BindingRecord>> {
    let smiles = df
        .column(&columns.ligand_smiles)
        .with_context(|| format!("missing column '{}'", columns.ligand_smiles))?
        .str()?;
    let sequences = df
        .column(&columns.target_sequence)
        .with_context(|| format!("missing column '{}'", columns.target_sequence))?
        .str()?;
    // Censored entries such as ">10000" become null in this cast and are
    // dropped along with the genuinely missing values.
    let affinities = df
        .column(&columns.affinity_nm)
        .with_context(|| format!("missing column '{}'", columns.affinity_nm))?
        .cast(&DataType::Float64)?;
    let affinities = affinities.f64()?;

    let mut records = Vec::new();
    for (smi, seq, ki) in izip!(smiles, sequences, affinities) {
        if let Some(limit) = filter.limit {
            if records.len() == limit {
                break;
            }
        }
        let (smi, seq, ki) = match (smi, seq, ki) {
            (Some(smi), Some(seq), Some(ki)) => (smi, seq, ki),
            _ => continue,
        };
        if smi.is_empty() || seq.is_empty() || !filter.keeps(ki) {
            continue;
        }
        records.push(BindingRecord {
            ligand_smiles: smi.to_string(),
            target_sequence: seq.to_string(),
            affinity_nm: ki,
        });
    }
    Ok(records)
}
