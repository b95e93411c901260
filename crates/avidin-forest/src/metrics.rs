//! Regression metrics for held-out evaluation.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

fn check_pairs(predictions: &[f64], targets: &[f64]) -> Result<()> {
    if predictions.len() != targets.len() {
        return Err(anyhow!(
            "predictions ({}) and targets ({}) differ in count",
            predictions.len(),
            targets.len()
        ));
    }
    if predictions.is_empty() {
        return Err(anyhow!("cannot score an empty prediction set"));
    }
    Ok(())
}

pub fn mean_squared_error(predictions: &[f64], targets: &[f64]) -> Result<f64> {
    check_pairs(predictions, targets)?;
    let sum: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    Ok(sum / predictions.len() as f64)
}

pub fn mean_absolute_error(predictions: &[f64], targets: &[f64]) -> Result<f64> {
    check_pairs(predictions, targets)?;
    let sum: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).abs())
        .sum();
    Ok(sum / predictions.len() as f64)
}

/// Coefficient of determination.
///
/// Errors when the targets all share one value: the score divides by the
/// target variance, and reporting a number for a degenerate evaluation
/// set would hide a broken split or a broken label column.
pub fn r2_score(predictions: &[f64], targets: &[f64]) -> Result<f64> {
    check_pairs(predictions, targets)?;
    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let ss_tot: f64 = targets.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(anyhow!(
            "R^2 is undefined: targets have zero variance (every label is {mean})"
        ));
    }
    let ss_res: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (t - p).powi(2))
        .sum();
    Ok(1.0 - ss_res / ss_tot)
}

/// The three scores reported for a held-out set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub mse: f64,
    pub mae: f64,
    pub r2: f64,
}

pub fn evaluate(predictions: &[f64], targets: &[f64]) -> Result<EvalReport> {
    Ok(EvalReport {
        mse: mean_squared_error(predictions, targets)?,
        mae: mean_absolute_error(predictions, targets)?,
        r2: r2_score(predictions, targets)?,
    })
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MSE: {:.4}", self.mse)?;
        writeln!(f, "MAE: {:.4}", self.mae)?;
        write!(f, "R2:  {:.4}", self.r2)
    }
}
