//! The embedder seam every feature source implements.
use anyhow::Result;

/// Produces a fixed-width float vector from one sequence string.
///
/// Implementations load any weights once at construction and reuse them
/// across calls. The same input must always produce the same vector, and
/// every vector must have [`SequenceEmbedder::dimension`] entries.
pub trait SequenceEmbedder: Send + Sync {
    fn embed(&self, sequence: &str) -> Result<Vec<f32>>;

    /// Width of the vectors returned by [`SequenceEmbedder::embed`].
    fn dimension(&self) -> usize;
}

/// Lazily embeds a stream of sequences, one forward pass per `next` call.
///
/// Nothing is embedded until the stream is pulled, so a caller can
/// interleave the two embedders row by row instead of materializing one
/// side's vectors first.
pub struct EmbeddingStream<'e, E: ?Sized, I> {
    embedder: &'e E,
    inputs: I,
}

impl<'e, E: ?Sized, I> EmbeddingStream<'e, E, I> {
    pub fn new(embedder: &'e E, inputs: I) -> Self {
        Self { embedder, inputs }
    }
}

impl<'e, E, I, S> Iterator for EmbeddingStream<'e, E, I>
where
    E: SequenceEmbedder + ?Sized,
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<Vec<f32>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inputs.next().map(|s| self.embedder.embed(s.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inputs.size_hint()
    }
}
