use std::fs;
use std::path::Path;

use satya_core::error::AppError;

use super::chunking::{chunk_corpus, MAX_PASSAGE_CHARS};
use super::model::Article;
use super::SemanticIndex;
use crate::embeddings::Embedder;

/// Read an article list (JSON array) produced by whatever collected the corpus.
pub fn load_articles(path: &Path) -> Result<Vec<Article>, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::new("INDEX_SOURCE_INVALID", "Failed to read articles file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::new("INDEX_SOURCE_INVALID", "Failed to decode articles file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

/// Chunk and embed a corpus into an in-memory index. Every vector must share one dimension.
pub fn build_index(
    articles: &[Article],
    embedder: &dyn Embedder,
) -> Result<SemanticIndex, AppError> {
    let passages = chunk_corpus(articles, MAX_PASSAGE_CHARS);
    if passages.is_empty() {
        return Err(AppError::new(
            "INDEX_EMPTY_CORPUS",
            "No passages to index",
        ));
    }
    tracing::info!(
        articles = articles.len(),
        passages = passages.len(),
        model = embedder.model(),
        "Embedding corpus"
    );

    let mut dims: Option<usize> = None;
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(passages.len());
    for (position, passage) in passages.iter().enumerate() {
        let v = embedder.embed(passage).map_err(|e| {
            AppError::new("AI_EMBEDDINGS_FAILED", "Failed to compute embeddings")
                .with_details(format!("position={position}; err={e}"))
                .with_retryable(e.retryable)
        })?;
        match dims {
            Some(d) if d != v.len() => {
                return Err(AppError::new(
                    "INDEX_BUILD_FAILED",
                    "Embedding dimension mismatch across passages",
                )
                .with_details(format!("expected={d}; got={}; position={position}", v.len())));
            }
            Some(_) => {}
            None => dims = Some(v.len()),
        }
        vectors.push(v);
    }

    SemanticIndex::new(embedder.model(), passages, vectors)
}
