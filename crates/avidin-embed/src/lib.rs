//! avidin-embed
//!
//! Sequence embedders for the affinity pipeline. ONNX exports of
//! pretrained protein and chemical language models are downloaded from
//! the HuggingFace hub and run with ONNX Runtime; mean-pooled hidden
//! states become fixed-width feature vectors. A hashed n-gram embedder
//! provides an offline stand-in behind the same trait.
pub mod embedder;
pub mod hashing;
pub mod models;
pub mod utilities;

pub use embedder::{EmbeddingStream, SequenceEmbedder};
pub use hashing::NgramHashEmbedder;
pub use models::chemberta::{truncate_smiles, ChembertaEmbedder, ChembertaModels, MAX_SMILES_CHARS};
pub use models::esm2::{Esm2Embedder, Esm2Models};
pub use utilities::{fetch_hub_file, hidden_size_from_config, ndarray_to_tensor_f32};
