use std::sync::Arc;

use pretty_assertions::assert_eq;
use satya_ai::embeddings::Embedder;
use satya_ai::index::SemanticIndex;
use satya_ai::pipeline::{retrieve_evidence, KnowledgeBase};
use satya_core::error::AppError;

struct CountABEmbedder;

impl Embedder for CountABEmbedder {
    fn model(&self) -> &str {
        "count-ab"
    }

    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError> {
        let mut a = 0u32;
        let mut b = 0u32;
        for ch in input.chars() {
            if ch == 'a' {
                a += 1;
            } else if ch == 'b' {
                b += 1;
            }
        }
        Ok(vec![a as f32, b as f32])
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn model(&self) -> &str {
        "count-ab"
    }

    fn embed(&self, _input: &str) -> Result<Vec<f32>, AppError> {
        Err(AppError::new("AI_EMBEDDINGS_UNREACHABLE", "down").with_retryable(true))
    }
}

fn knowledge(embedder: Arc<dyn Embedder>) -> KnowledgeBase {
    let passages = vec!["aaa", "bbb", "ab", "aab"]
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let vectors = passages
        .iter()
        .map(|p| CountABEmbedder.embed(p).expect("embed"))
        .collect();
    let index = SemanticIndex::new("count-ab", passages, vectors).expect("index");
    KnowledgeBase::new(index, embedder)
}

#[test]
fn lookup_orders_by_distance_and_breaks_ties_by_position() {
    let kb = knowledge(Arc::new(CountABEmbedder));

    // (1,1): "ab" d=0, "aab" d=1, "aaa" and "bbb" both d=5.
    assert_eq!(kb.lookup("ab", 2).expect("lookup"), vec!["ab", "aab"]);

    // (0,0): "ab" d=2, "aab" d=5, "aaa" and "bbb" both d=9; position decides.
    assert_eq!(
        kb.lookup("", 4).expect("lookup"),
        vec!["ab", "aab", "aaa", "bbb"]
    );
}

#[test]
fn evidence_is_claim_major_without_dedup() {
    let kb = knowledge(Arc::new(CountABEmbedder));
    let claims = vec!["aaa".to_string(), "aaa".to_string(), "bbb".to_string()];

    let out = retrieve_evidence(Some(&kb), &claims, 1);

    assert!(!out.is_fallback());
    assert_eq!(out.value(), &vec!["aaa", "aaa", "bbb"]);
}

#[test]
fn top_k_larger_than_corpus_returns_everything() {
    let kb = knowledge(Arc::new(CountABEmbedder));
    let out = retrieve_evidence(Some(&kb), &["b".to_string()], 10);
    assert_eq!(out.value().len(), 4);
}

#[test]
fn missing_or_empty_corpus_yields_empty_evidence() {
    let claims = vec!["anything".to_string()];

    let none = retrieve_evidence(None, &claims, 3);
    assert!(none.value().is_empty());
    assert_eq!(none.reason().map(|r| r.code.as_str()), Some("INDEX_UNAVAILABLE"));

    let empty_index = SemanticIndex::new("count-ab", Vec::new(), Vec::new()).expect("index");
    let kb = KnowledgeBase::new(empty_index, Arc::new(CountABEmbedder));
    let empty = retrieve_evidence(Some(&kb), &claims, 3);
    assert!(empty.value().is_empty());
    assert_eq!(empty.reason().map(|r| r.code.as_str()), Some("INDEX_EMPTY"));
}

#[test]
fn encoder_failure_degrades_to_no_evidence() {
    let kb = knowledge(Arc::new(FailingEmbedder));
    let out = retrieve_evidence(Some(&kb), &["aaa".to_string()], 3);

    assert!(out.is_fallback());
    assert!(out.value().is_empty());
    assert_eq!(
        out.reason().map(|r| r.code.as_str()),
        Some("AI_EMBEDDINGS_UNREACHABLE")
    );
}
