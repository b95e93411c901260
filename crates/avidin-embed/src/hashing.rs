//! Hashed n-gram embedder: a no-download stand-in for the pretrained
//! models. Character n-grams are hashed into a fixed number of signed
//! buckets and the bucket counts L2-normalized, so any two runs over the
//! same build produce identical vectors.
use crate::embedder::SequenceEmbedder;
use anyhow::{anyhow, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub struct NgramHashEmbedder {
    dimension: usize,
    ngram: usize,
}

impl NgramHashEmbedder {
    pub fn new(dimension: usize, ngram: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(anyhow!("embedding dimension must be nonzero"));
        }
        if ngram == 0 {
            return Err(anyhow!("n-gram length must be nonzero"));
        }
        Ok(Self { dimension, ngram })
    }

    fn bucket(&self, piece: &[u8]) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        piece.hash(&mut hasher);
        let h = hasher.finish();
        let slot = (h % self.dimension as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        (slot, sign)
    }
}

impl SequenceEmbedder for NgramHashEmbedder {
    fn embed(&self, sequence: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let bytes = sequence.as_bytes();
        if bytes.is_empty() {
            return Ok(vector);
        }
        if bytes.len() < self.ngram {
            // Too short for a single n-gram; hash the whole string.
            let (slot, sign) = self.bucket(bytes);
            vector[slot] += sign;
        } else {
            for piece in bytes.windows(self.ngram) {
                let (slot, sign) = self.bucket(piece);
                vector[slot] += sign;
            }
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_are_deterministic() {
        let embedder = NgramHashEmbedder::new(64, 3).unwrap();
        let a = embedder.embed("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        let b = embedder.embed("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let embedder = NgramHashEmbedder::new(64, 3).unwrap();
        let ethanol = embedder.embed("CCO").unwrap();
        let benzene = embedder.embed("c1ccccc1").unwrap();
        assert_ne!(ethanol, benzene);
    }

    #[test]
    fn vectors_have_the_declared_width_and_unit_norm() {
        let embedder = NgramHashEmbedder::new(32, 2).unwrap();
        let v = embedder.embed("MKTAYIAKQRQISFVK").unwrap();
        assert_eq!(v.len(), 32);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn short_and_empty_inputs_are_handled() {
        let embedder = NgramHashEmbedder::new(16, 4).unwrap();
        // Shorter than one n-gram: whole-string bucket, still unit norm.
        let short = embedder.embed("CO").unwrap();
        assert_eq!(short.iter().filter(|x| **x != 0.0).count(), 1);
        // Empty input embeds to the zero vector.
        let empty = embedder.embed("").unwrap();
        assert!(empty.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn rejects_zero_parameters() {
        assert!(NgramHashEmbedder::new(0, 3).is_err());
        assert!(NgramHashEmbedder::new(8, 0).is_err());
    }
}
