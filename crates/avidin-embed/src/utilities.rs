//! Shared plumbing for the ONNX-backed embedders: hub downloads, session
//! construction, and the ndarray to candle bridge used for pooling.
use anyhow::{anyhow, Context, Result};
use candle_core::{Device, Tensor};
use hf_hub::api::sync::Api;
use ndarray_safetensors::TensorViewWithDataBuffer;
use ort::{
    execution_providers::CUDAExecutionProvider,
    session::{builder::GraphOptimizationLevel, Session, SessionOutputs},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Download (or reuse from the local cache) one file of a hub model repo.
pub fn fetch_hub_file(repo_id: &str, filename: &str) -> Result<PathBuf> {
    let api = Api::new()?;
    Ok(api.model(repo_id.to_string()).get(filename)?)
}

#[derive(Debug, Deserialize)]
struct HubModelConfig {
    hidden_size: usize,
}

/// Read `hidden_size` out of a transformers-style `config.json`, for
/// checkpoints whose width is not known ahead of time.
pub fn hidden_size_from_config(path: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: HubModelConfig = serde_json::from_str(&raw)
        .with_context(|| format!("no usable hidden_size in {}", path.display()))?;
    Ok(config.hidden_size)
}

/// Build a ready-to-run session for an ONNX file on disk.
pub(crate) fn build_session(name: &str, model_path: &Path) -> Result<Session> {
    ort::init()
        .with_name(name)
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .commit()?;

    Ok(Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level1)?
        .with_intra_threads(1)?
        .commit_from_file(model_path)?)
}

pub fn ndarray_to_tensor_f32(arr: ndarray::ArrayD<f32>) -> Result<Tensor> {
    let data = vec![("arr", TensorViewWithDataBuffer::new(&arr))];
    let serialized = safetensors::serialize(data, &None)?;
    let tensors = candle_core::safetensors::load_buffer(&serialized, &Device::Cpu)?;
    Ok(tensors
        .get("arr")
        .ok_or_else(|| anyhow!("array not found"))?
        .clone())
}

/// Mean over the token axis of a single-sequence `[1, tokens, width]`
/// hidden-state tensor.
pub(crate) fn mean_pool(hidden: &Tensor) -> Result<Vec<f32>> {
    let (batch, _tokens, _width) = hidden.dims3()?;
    if batch != 1 {
        return Err(anyhow!("expected a single-sequence batch, got {batch}"));
    }
    Ok(hidden.mean(1)?.squeeze(0)?.to_vec1::<f32>()?)
}

/// Find the hidden-state output among a model's outputs and pool it.
///
/// Exports differ in what they emit: feature-extraction exports expose
/// `last_hidden_state`, masked-LM exports expose vocabulary logits, some
/// expose both. The hidden states are recognized by their
/// `[1, tokens, width]` shape.
pub(crate) fn pooled_hidden_state(
    outputs: &SessionOutputs<'_, '_>,
    hidden_size: usize,
) -> Result<Vec<f32>> {
    let mut seen = Vec::new();
    for (name, value) in outputs.iter() {
        let Ok(view) = value.try_extract_tensor::<f32>() else {
            continue;
        };
        let shape = view.shape().to_vec();
        if shape.len() == 3 && shape[0] == 1 && shape[2] == hidden_size {
            let hidden = ndarray_to_tensor_f32(view.to_owned())?;
            return mean_pool(&hidden);
        }
        seen.push(format!("{name} {shape:?}"));
    }
    Err(anyhow!(
        "model has no [1, tokens, {hidden_size}] hidden-state output (found: {}); \
         use a feature-extraction export of the checkpoint",
        seen.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    #[test]
    fn bridge_preserves_shape_and_values() {
        let arr = ArrayD::from_shape_vec(vec![2, 2], vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
        let tensor = ndarray_to_tensor_f32(arr).unwrap();
        assert_eq!(tensor.dims(), &[2, 2]);
        assert_eq!(
            tensor.to_vec2::<f32>().unwrap(),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
    }

    #[test]
    fn mean_pool_averages_over_tokens() {
        let arr =
            ArrayD::from_shape_vec(vec![1, 2, 3], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let hidden = ndarray_to_tensor_f32(arr).unwrap();
        assert_eq!(mean_pool(&hidden).unwrap(), vec![2.5, 3.5, 4.5]);
    }

    #[test]
    fn mean_pool_rejects_multi_sequence_batches() {
        let arr = ArrayD::from_shape_vec(vec![2, 1, 2], vec![0.0f32; 4]).unwrap();
        let hidden = ndarray_to_tensor_f32(arr).unwrap();
        assert!(mean_pool(&hidden).is_err());
    }

    #[test]
    fn hidden_size_read_from_config_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"model_type": "esm", "hidden_size": 320, "num_hidden_layers": 6}"#,
        )
        .unwrap();
        assert_eq!(hidden_size_from_config(file.path()).unwrap(), 320);
    }

    #[test]
    fn config_without_hidden_size_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"model_type": "esm"}"#).unwrap();
        let err = hidden_size_from_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("hidden_size"));
    }
}
