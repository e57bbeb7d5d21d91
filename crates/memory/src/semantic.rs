//! Semantic store: long-term memory of past question/answer exchanges.
//!
//! Entries are kept in insertion order next to a [`FlatIpIndex`] whose row
//! `i` is the unit-normalized question embedding of entry `i`. Searching
//! normalizes the query and ranks rows by inner product, i.e. cosine
//! similarity, so embedding magnitude never affects the ranking.
//!
//! The embedding dimension is fixed by the first insertion and holds until
//! [`SemanticStore::clear`]. Any insertion or query with another length is
//! rejected with [`StoreError::DimensionMismatch`].
//!
//! The store itself has no interior locking. Share it across tasks through
//! [`SharedSemanticStore`], which serializes writers behind an `RwLock`.

use crate::vector::{FlatIpIndex, l2_normalize};
use recall_core::error::StoreError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A remembered exchange. Its embedding is the index row at the same position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

/// A semantic store shared between the engine and its callers.
pub type SharedSemanticStore = Arc<RwLock<SemanticStore>>;

/// Similarity index over embedded Q&A pairs.
#[derive(Debug, Default)]
pub struct SemanticStore {
    entries: Vec<QaEntry>,
    index: Option<FlatIpIndex>,
}

impl SemanticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh store for shared use.
    pub fn shared() -> SharedSemanticStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Remember an exchange under the given question embedding.
    pub fn add(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        embedding: &[f32],
    ) -> Result<(), StoreError> {
        if embedding.is_empty() {
            return Err(StoreError::EmptyEmbedding);
        }
        check_finite(embedding)?;

        let index = self
            .index
            .get_or_insert_with(|| FlatIpIndex::new(embedding.len()));
        if index.dim() != embedding.len() {
            return Err(StoreError::DimensionMismatch {
                expected: index.dim(),
                actual: embedding.len(),
            });
        }

        let mut row = embedding.to_vec();
        l2_normalize(&mut row);
        index.add(&row);

        self.entries.push(QaEntry {
            question: question.into(),
            answer: answer.into(),
        });

        debug_assert_eq!(index.len(), self.entries.len());
        debug!(entries = self.entries.len(), dim = index.dim(), "Semantic memory entry added");
        Ok(())
    }

    /// True iff nothing has been added since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The fixed embedding dimension, once the first entry has set it.
    pub fn dimension(&self) -> Option<usize> {
        self.index.as_ref().map(FlatIpIndex::dim)
    }

    /// Stored entries in insertion order.
    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    /// The normalized embedding stored for the entry at `position`.
    pub fn embedding_of(&self, position: usize) -> Option<&[f32]> {
        self.index.as_ref()?.row(position)
    }

    /// The most similar exchanges to `query`, most similar first.
    ///
    /// Returns at most `min(top_k, len())` pairs and an empty list on an
    /// empty store.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .search_scored(query, top_k)?
            .into_iter()
            .map(|(position, _)| {
                let entry = &self.entries[position];
                (entry.question.clone(), entry.answer.clone())
            })
            .collect())
    }

    /// Like [`search`](Self::search) but yields `(position, similarity)`.
    pub fn search_scored(&self, query: &[f32], top_k: usize) -> Result<Vec<(usize, f32)>, StoreError> {
        let Some(index) = self.index.as_ref().filter(|i| !i.is_empty()) else {
            return Ok(Vec::new());
        };

        if query.len() != index.dim() {
            return Err(StoreError::DimensionMismatch {
                expected: index.dim(),
                actual: query.len(),
            });
        }
        check_finite(query)?;

        let mut q = query.to_vec();
        l2_normalize(&mut q);

        let k = top_k.min(index.len());
        let hits = index.search(&q, k);
        debug!(requested = top_k, returned = hits.len(), "Semantic memory searched");
        Ok(hits)
    }

    /// Drop every entry and unset the dimension.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}

/// NaN or infinite components would make every similarity against the
/// vector meaningless.
fn check_finite(embedding: &[f32]) -> Result<(), StoreError> {
    match embedding.iter().position(|x| !x.is_finite()) {
        Some(position) => Err(StoreError::NonFiniteEmbedding { position }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(vectors: &[(&str, Vec<f32>)]) -> SemanticStore {
        let mut store = SemanticStore::new();
        for (label, v) in vectors {
            store
                .add(format!("Q {label}"), format!("A {label}"), v)
                .unwrap();
        }
        store
    }

    #[test]
    fn new_store_is_empty() {
        let store = SemanticStore::new();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn empty_store_search_returns_nothing() {
        let store = SemanticStore::new();
        assert!(store.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn first_insert_fixes_dimension() {
        let store = store_with(&[("a", vec![1.0, 0.0, 0.0])]);
        assert_eq!(store.dimension(), Some(3));
        assert!(!store.is_empty());
    }

    #[test]
    fn mismatched_insert_is_rejected() {
        let mut store = store_with(&[("a", vec![1.0, 0.0, 0.0])]);
        let err = store.add("q", "a", &[1.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn mismatched_query_is_rejected() {
        let store = store_with(&[("a", vec![1.0, 0.0, 0.0])]);
        assert!(matches!(
            store.search(&[1.0], 3),
            Err(StoreError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_embedding_is_rejected() {
        let mut store = SemanticStore::new();
        assert_eq!(store.add("q", "a", &[]), Err(StoreError::EmptyEmbedding));
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn non_finite_embedding_is_rejected() {
        let mut store = SemanticStore::new();
        assert_eq!(
            store.add("q", "a", &[1.0, f32::NAN, 0.0]),
            Err(StoreError::NonFiniteEmbedding { position: 1 })
        );
        assert_eq!(
            store.add("q", "a", &[f32::INFINITY, 0.0, 0.0]),
            Err(StoreError::NonFiniteEmbedding { position: 0 })
        );
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn non_finite_query_is_rejected() {
        let store = store_with(&[("a", vec![1.0, 0.0, 0.0])]);
        assert_eq!(
            store.search(&[0.0, 0.0, f32::NAN], 1),
            Err(StoreError::NonFiniteEmbedding { position: 2 })
        );
    }

    #[test]
    fn rejected_rows_never_reach_search_results() {
        let mut store = SemanticStore::new();
        for i in 0..64 {
            let v = if i % 3 == 0 {
                vec![f32::NAN, 1.0]
            } else {
                vec![1.0, i as f32 / 64.0]
            };
            let _ = store.add(format!("q{i}"), format!("a{i}"), &v);
        }
        let hits = store.search_scored(&[1.0, 0.0], 64).unwrap();
        assert_eq!(hits.len(), store.len());
        assert!(hits.iter().all(|(_, score)| score.is_finite()));
        assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn stored_embedding_is_unit_length() {
        let store = store_with(&[("a", vec![3.0, 4.0])]);
        let row = store.embedding_of(0).unwrap();
        let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn query_with_stored_embedding_ranks_it_first() {
        let vectors = vec![
            ("a", vec![1.0, 0.2, 0.0]),
            ("b", vec![0.0, 1.0, 0.3]),
            ("c", vec![0.5, 0.5, 0.5]),
            ("d", vec![0.1, 0.0, 1.0]),
        ];
        let store = store_with(&vectors);
        for (label, v) in &vectors {
            let results = store.search(v, vectors.len()).unwrap();
            assert_eq!(results[0], (format!("Q {label}"), format!("A {label}")));
        }
    }

    #[test]
    fn magnitude_does_not_affect_ranking() {
        let store = store_with(&[("small", vec![0.01, 0.0]), ("big", vec![100.0, 100.0])]);
        let results = store.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].0, "Q small");
    }

    #[test]
    fn never_returns_more_than_stored_or_requested() {
        let store = store_with(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
        assert_eq!(store.search(&[1.0, 1.0], 10).unwrap().len(), 2);
        assert_eq!(store.search(&[1.0, 1.0], 1).unwrap().len(), 1);
        assert!(store.search(&[1.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn scores_are_cosine_similarities() {
        let store = store_with(&[("a", vec![2.0, 0.0]), ("b", vec![1.0, 1.0])]);
        let hits = store.search_scored(&[5.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert!((hits[0].1 - 1.0).abs() < 1e-5);
        assert!((hits[1].1 - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn clear_resets_dimension() {
        let mut store = store_with(&[("a", vec![1.0, 0.0, 0.0])]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
        store.add("q", "a", &[1.0, 0.0]).unwrap();
        assert_eq!(store.dimension(), Some(2));
    }

    #[tokio::test]
    async fn shared_store_serializes_writers() {
        let shared = SemanticStore::shared();
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&shared);
            handles.push(tokio::spawn(async move {
                store
                    .write()
                    .await
                    .add(format!("q{i}"), format!("a{i}"), &[1.0, i as f32])
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let store = shared.read().await;
        assert_eq!(store.len(), 8);
        assert_eq!(store.entries().len(), 8);
    }
}
