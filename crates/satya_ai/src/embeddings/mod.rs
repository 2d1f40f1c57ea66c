use satya_core::error::AppError;

/// Deterministic text encoder producing fixed-length vectors.
pub trait Embedder: Send + Sync {
    /// Model identifier; recorded in the index manifest so queries use the same encoder.
    fn model(&self) -> &str;

    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;
