//! avidin-pipeline
//!
//! End-to-end orchestration: cleaned binding records run through the two
//! sequence embedders, fused rows are split once by seed, a random forest
//! is fit on the training side and scored on the held-out side.
//!
//! The embedders come in as trait objects so the same path serves the
//! pretrained ONNX models and the offline hashed featurizer.

use anyhow::{anyhow, Context, Result};
use avidin_core::{fuse, train_test_split, BindingRecord, FeatureDataset};
use avidin_embed::{EmbeddingStream, SequenceEmbedder};
use avidin_forest::{evaluate, EvalReport, RandomForestConfig, RandomForestRegressor};
use serde::{Deserialize, Serialize};

/// Everything that parameterizes one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of records held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/held-out split.
    pub seed: u64,
    pub forest: RandomForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            forest: RandomForestConfig::default(),
        }
    }
}

/// What a finished run reports back.
#[derive(Debug, Clone, Copy)]
pub struct TrainingOutcome {
    pub trained_on: usize,
    pub held_out: usize,
    pub report: EvalReport,
}

/// Run the full pipeline over `records`.
///
/// Records are embedded lazily in input order and each fused row keeps
/// the ligand vector first. Any embedding failure aborts the run with the
/// offending row number.
pub fn run_with_embedders(
    config: &TrainingConfig,
    records: &[BindingRecord],
    ligand_embedder: &dyn SequenceEmbedder,
    protein_embedder: &dyn SequenceEmbedder,
) -> Result<TrainingOutcome> {
    if records.is_empty() {
        return Err(anyhow!("no records to train on"));
    }

    let ligands = EmbeddingStream::new(
        ligand_embedder,
        records.iter().map(|r| r.ligand_smiles.as_str()),
    );
    let proteins = EmbeddingStream::new(
        protein_embedder,
        records.iter().map(|r| r.target_sequence.as_str()),
    );

    let mut dataset = FeatureDataset::new();
    for (row, ((record, ligand), protein)) in
        records.iter().zip(ligands).zip(proteins).enumerate()
    {
        let ligand = ligand.with_context(|| format!("failed to embed ligand in row {row}"))?;
        let protein = protein.with_context(|| format!("failed to embed target in row {row}"))?;
        dataset.push(fuse(&ligand, &protein), record.affinity_nm)?;
    }

    let (train, held_out) = train_test_split(&dataset, config.test_fraction, config.seed)?;
    let x_train = train.feature_matrix()?;
    let model = RandomForestRegressor::fit(&config.forest, x_train.view(), train.labels())?;

    let x_held_out = held_out.feature_matrix()?;
    let predictions = model.predict_batch(x_held_out.view())?;
    let report = evaluate(&predictions, held_out.labels())?;

    Ok(TrainingOutcome {
        trained_on: train.len(),
        held_out: held_out.len(),
        report,
    })
}
