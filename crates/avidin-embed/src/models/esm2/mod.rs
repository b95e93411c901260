//! ESM2 protein embedder. Models converted to ONNX format from
//! [ESM2](https://github.com/facebookresearch/esm) and uploaded to the
//! HuggingFace hub. The tokenizer is included in this crate and loaded
//! from memory using `tokenizer.json`; its vocabulary matches the
//! published ESM2 checkpoints, so token ids line up with the exported
//! weights.
//!
//! # Models:
//! * `t6-8m` - small 6-layer protein language model
//! * `t12-35m` - medium 12-layer protein language model
//! * `t30-150m` - large 30-layer protein language model
//!
use crate::embedder::SequenceEmbedder;
use crate::utilities::{
    build_session, fetch_hub_file, hidden_size_from_config, pooled_hidden_state,
};
use anyhow::{anyhow, Result};
use ndarray::Array2;
use ort::session::Session;
use std::path::Path;
use strum::{Display, EnumString};
use tokenizers::Tokenizer;

/// Published ESM2 checkpoints with ONNX exports on the hub.
#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString)]
pub enum Esm2Models {
    #[strum(serialize = "t6-8m")]
    T6_8M,
    #[strum(serialize = "t12-35m")]
    T12_35M,
    #[strum(serialize = "t30-150m")]
    T30_150M,
}

impl Esm2Models {
    pub fn repo_id(&self) -> &'static str {
        match self {
            Esm2Models::T6_8M => "zcpbx/esm2-t6-8m-UR50D-onnx",
            Esm2Models::T12_35M => "zcpbx/esm2-t12-35M-UR50D-onnx",
            Esm2Models::T30_150M => "zcpbx/esm2-t30-150M-UR50D-onnx",
        }
    }

    /// Width of the per-residue hidden states.
    pub fn hidden_size(&self) -> usize {
        match self {
            Esm2Models::T6_8M => 320,
            Esm2Models::T12_35M => 480,
            Esm2Models::T30_150M => 640,
        }
    }
}

/// Holds the committed session and tokenizer for reuse across sequences.
pub struct Esm2Embedder {
    session: Session,
    tokenizer: Tokenizer,
    hidden_size: usize,
}

impl Esm2Embedder {
    /// Download a published checkpoint and hold it open.
    pub fn from_hub(model: Esm2Models) -> Result<Self> {
        let model_path = fetch_hub_file(model.repo_id(), "model.onnx")?;
        Self::from_files(&model_path, None, model.hidden_size())
    }

    /// Download an arbitrary ESM2 ONNX export by repo id, reading the
    /// hidden width from its `config.json`. The repo must use the
    /// standard ESM2 vocabulary since the bundled tokenizer is applied.
    pub fn from_hub_repo(repo_id: &str) -> Result<Self> {
        let model_path = fetch_hub_file(repo_id, "model.onnx")?;
        let config_path = fetch_hub_file(repo_id, "config.json")?;
        let hidden_size = hidden_size_from_config(&config_path)?;
        Self::from_files(&model_path, None, hidden_size)
    }

    /// Load an ONNX export from disk. `tokenizer` falls back to the
    /// bundled ESM2 tokenizer when `None`.
    pub fn from_files(model: &Path, tokenizer: Option<&Path>, hidden_size: usize) -> Result<Self> {
        if hidden_size == 0 {
            return Err(anyhow!("hidden size must be nonzero"));
        }
        let session = build_session("ESM2", model)?;
        let tokenizer = match tokenizer {
            Some(path) => Tokenizer::from_file(path)
                .map_err(|e| anyhow!("failed to load tokenizer: {e}"))?,
            None => Self::load_tokenizer()?,
        };
        Ok(Self {
            session,
            tokenizer,
            hidden_size,
        })
    }

    pub fn load_tokenizer() -> Result<Tokenizer> {
        let tokenizer_bytes = include_bytes!("tokenizer.json");
        Tokenizer::from_bytes(tokenizer_bytes)
            .map_err(|e| anyhow!("failed to load tokenizer: {e}"))
    }

    fn forward(&self, sequence: &str) -> Result<Vec<f32>> {
        let tokens = self
            .tokenizer
            .encode(sequence, false)
            .map_err(|e| anyhow!("tokenization failed: {e}"))?;
        let token_ids = tokens.get_ids();
        if token_ids.is_empty() {
            return Err(anyhow!("cannot embed an empty sequence"));
        }

        let shape = (1, token_ids.len());
        let ids: Array2<i64> = Array2::from_shape_vec(
            shape,
            token_ids.iter().map(|&t| t as i64).collect::<Vec<_>>(),
        )?;
        let mask: Array2<i64> = Array2::ones(shape);

        let outputs = self
            .session
            .run(ort::inputs!["input_ids" => ids, "attention_mask" => mask]?)?;
        pooled_hidden_state(&outputs, self.hidden_size)
    }
}

impl SequenceEmbedder for Esm2Embedder {
    fn embed(&self, sequence: &str) -> Result<Vec<f32>> {
        self.forward(sequence)
    }

    fn dimension(&self) -> usize {
        self.hidden_size
    }
}
