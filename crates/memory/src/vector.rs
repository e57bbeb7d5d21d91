//! Vector similarity utilities and a flat inner-product index.
//!
//! Pure-Rust implementations of:
//! - L2 normalization
//! - Exhaustive top-k search by inner product over unit vectors

use std::cmp::Ordering;

/// Scale a vector to unit length in place.
///
/// A zero vector is left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm < 1e-10 {
        return;
    }
    for x in v.iter_mut() {
        *x = (*x as f64 / norm) as f32;
    }
}

/// Inner product of two equal-length vectors.
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// A flat (exhaustive) inner-product index.
///
/// Rows are stored contiguously; row `i` is the `i`-th inserted vector.
/// With unit-length rows and queries, the inner product is the cosine
/// similarity.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIpIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a row. The caller guarantees `row.len() == self.dim()`.
    pub fn add(&mut self, row: &[f32]) {
        debug_assert_eq!(row.len(), self.dim);
        self.data.extend_from_slice(row);
    }

    /// The row at `position`, if any.
    pub fn row(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// The `k` rows with the highest inner product against `query`.
    ///
    /// Returns `(position, score)` pairs, best first. Equal scores keep
    /// insertion order. `k` larger than the row count is clamped.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if self.dim == 0 || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, row)| (i, inner_product(row, query)))
            .collect();

        // Stable sort: ties stay in insertion order, NaN scores go last.
        scored.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        scored.truncate(k);
        scored
    }
}
