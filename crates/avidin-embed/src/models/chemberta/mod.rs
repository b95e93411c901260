//! ChemBERTa ligand embedder. SMILES strings run through an ONNX export
//! of the [ChemBERTa-2](https://arxiv.org/abs/2209.01712) chemical
//! language models published by DeepChem; the tokenizer ships in the same
//! hub repo and is fetched alongside the weights.
//!
//! # Models:
//! * `77m-mlm` - 77M-molecule checkpoint, masked-LM pretraining
//! * `77m-mtr` - 77M-molecule checkpoint, multi-task-regression pretraining
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

/// Longest SMILES string fed to the model. Anything past this many
/// characters is cut off silently before tokenization.
pub const MAX_SMILES_CHARS: usize = 512;

/// Published ChemBERTa checkpoints with ONNX exports on the hub.
#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString)]
pub enum ChembertaModels {
    #[strum(serialize = "77m-mlm")]
    Chemberta77mMlm,
    #[strum(serialize = "77m-mtr")]
    Chemberta77mMtr,
}

impl ChembertaModels {
    pub fn repo_id(&self) -> &'static str {
        match self {
            ChembertaModels::Chemberta77mMlm => "DeepChem/ChemBERTa-77M-MLM",
            ChembertaModels::Chemberta77mMtr => "DeepChem/ChemBERTa-77M-MTR",
        }
    }

    /// Width of the per-token hidden states.
    pub fn hidden_size(&self) -> usize {
        match self {
            ChembertaModels::Chemberta77mMlm | ChembertaModels::Chemberta77mMtr => 384,
        }
    }
}

/// Cut a SMILES string to the model's input window. Multi-byte characters
/// are kept whole.
pub fn truncate_smiles(smiles: &str) -> &str {
    match smiles.char_indices().nth(MAX_SMILES_CHARS) {
        Some((idx, _)) => &smiles[..idx],
        None => smiles,
    }
}

/// Holds the committed session and tokenizer for reuse across ligands.
pub struct ChembertaEmbedder {
    session: Session,
    tokenizer: Tokenizer,
    hidden_size: usize,
}

impl ChembertaEmbedder {
    /// Download a published checkpoint together with its tokenizer.
    pub fn from_hub(model: ChembertaModels) -> Result<Self> {
        let model_path = fetch_hub_file(model.repo_id(), "onnx/model.onnx")?;
        let tokenizer_path = fetch_hub_file(model.repo_id(), "tokenizer.json")?;
        Self::from_files(&model_path, &tokenizer_path, model.hidden_size())
    }

    /// Download an arbitrary ChemBERTa-style ONNX export by repo id. The
    /// repo must carry `onnx/model.onnx`, `tokenizer.json` and a
    /// `config.json` declaring its hidden width.
    pub fn from_hub_repo(repo_id: &str) -> Result<Self> {
        let model_path = fetch_hub_file(repo_id, "onnx/model.onnx")?;
        let tokenizer_path = fetch_hub_file(repo_id, "tokenizer.json")?;
        let config_path = fetch_hub_file(repo_id, "config.json")?;
        let hidden_size = hidden_size_from_config(&config_path)?;
        Self::from_files(&model_path, &tokenizer_path, hidden_size)
    }

    /// Load an ONNX export and its tokenizer from disk.
    pub fn from_files(model: &Path, tokenizer: &Path, hidden_size: usize) -> Result<Self> {
        if hidden_size == 0 {
            return Err(anyhow!("hidden size must be nonzero"));
        }
        let session = build_session("ChemBERTa", model)?;
        let tokenizer = Tokenizer::from_file(tokenizer)
            .map_err(|e| anyhow!("failed to load tokenizer: {e}"))?;
        Ok(Self {
            session,
            tokenizer,
            hidden_size,
        })
    }

    fn forward(&self, smiles: &str) -> Result<Vec<f32>> {
        let smiles = truncate_smiles(smiles);
        let tokens = self
            .tokenizer
            .encode(smiles, false)
            .map_err(|e| anyhow!("tokenization failed: {e}"))?;
        let token_ids = tokens.get_ids();
        if token_ids.is_empty() {
            return Err(anyhow!("cannot embed an empty SMILES string"));
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

impl SequenceEmbedder for ChembertaEmbedder {
    fn embed(&self, smiles: &str) -> Result<Vec<f32>> {
        self.forward(smiles)
    }

    fn dimension(&self) -> usize {
        self.hidden_size
    }
}
