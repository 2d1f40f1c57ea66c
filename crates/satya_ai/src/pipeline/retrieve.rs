use std::sync::Arc;

use satya_core::domain::Claim;
use satya_core::error::AppError;

use super::outcome::{log_fallback, StageOutcome};
use crate::embeddings::Embedder;
use crate::index::SemanticIndex;

const STAGE: &str = "retrieve";

/// Index plus the encoder that built it. Loaded once, shared read-only across requests.
pub struct KnowledgeBase {
    index: SemanticIndex,
    embedder: Arc<dyn Embedder>,
}

impl KnowledgeBase {
    pub fn new(index: SemanticIndex, embedder: Arc<dyn Embedder>) -> Self {
        if embedder.model() != index.model() {
            tracing::warn!(
                index_model = index.model(),
                embedder_model = embedder.model(),
                "Embedder model differs from the model the index was built with"
            );
        }
        Self { index, embedder }
    }

    pub fn index(&self) -> &SemanticIndex {
        &self.index
    }

    /// Passages nearest to one claim, closest first.
    pub fn lookup(&self, claim: &str, top_k: usize) -> Result<Vec<String>, AppError> {
        let k = top_k.min(self.index.len());
        if k == 0 {
            return Ok(Vec::new());
        }
        let v = self.embedder.embed(claim)?;
        let hits = self.index.nearest(&v, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|h| self.index.passage(h.index).map(str::to_string))
            .collect())
    }
}

/// Gather evidence for every claim, claim-major, no deduplication.
///
/// A missing or empty corpus is not an error for the pipeline: the value is an empty list
/// and the reason says why.
pub fn retrieve_evidence(
    knowledge: Option<&KnowledgeBase>,
    claims: &[Claim],
    top_k: usize,
) -> StageOutcome<Vec<String>> {
    let kb = match knowledge {
        Some(kb) if !kb.index().is_empty() => kb,
        Some(_) => {
            return StageOutcome::fallback(
                Vec::new(),
                AppError::new("INDEX_EMPTY", "Knowledge base has no passages"),
            );
        }
        None => {
            tracing::debug!(stage = STAGE, "No knowledge base loaded; skipping retrieval");
            return StageOutcome::fallback(
                Vec::new(),
                AppError::new("INDEX_UNAVAILABLE", "Knowledge base not loaded"),
            );
        }
    };

    let mut evidence = Vec::new();
    for claim in claims {
        match kb.lookup(claim, top_k) {
            Ok(passages) => evidence.extend(passages),
            Err(e) => {
                log_fallback(STAGE, claim, &e);
                return StageOutcome::fallback(Vec::new(), e);
            }
        }
    }

    tracing::info!(stage = STAGE, passages = evidence.len(), "Retrieved evidence");
    StageOutcome::Ok(evidence)
}
