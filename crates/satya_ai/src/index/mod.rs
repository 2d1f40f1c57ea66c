//! Read-only semantic index over trusted-source passages.
//!
//! Passage position is the only identity: `passages[i]` is the text whose vector is
//! `vectors[i]`. The index is built offline and never mutated by a running process.

use satya_core::error::AppError;

pub mod builder;
pub mod chunking;
pub mod model;
pub mod store;

mod similarity;

pub use builder::build_index;
pub use model::{curated_facts, Article, IndexManifest};
pub use store::IndexStore;

/// One k-NN result: squared L2 distance and passage position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f32,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct SemanticIndex {
    model: String,
    dims: usize,
    passages: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl SemanticIndex {
    /// Pair passages with their vectors. Counts must match and all vectors share one dimension.
    pub fn new(
        model: impl Into<String>,
        passages: Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, AppError> {
        if passages.len() != vectors.len() {
            return Err(AppError::new(
                "INDEX_INVALID",
                "Passage and vector counts differ",
            )
            .with_details(format!(
                "passages={}; vectors={}",
                passages.len(),
                vectors.len()
            )));
        }
        let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dims || dims == 0 {
                return Err(AppError::new(
                    "INDEX_INVALID",
                    "Index vector dims mismatch",
                )
                .with_details(format!("position={i}; expected={dims}; got={}", v.len())));
            }
        }
        Ok(Self {
            model: model.into(),
            dims,
            passages,
            vectors,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub(crate) fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn passage(&self, index: usize) -> Option<&str> {
        self.passages.get(index).map(String::as_str)
    }

    /// Exact (flat) k-nearest-neighbor search, ascending distance, ties by position.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, AppError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dims {
            return Err(AppError::new(
                "INDEX_QUERY_FAILED",
                "Query embedding dims do not match index dims",
            )
            .with_details(format!("index_dims={}; query_dims={}", self.dims, query.len())));
        }

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| Neighbor {
                distance: similarity::l2_squared(query, v),
                index,
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        hits.truncate(k);
        Ok(hits)
    }
}
