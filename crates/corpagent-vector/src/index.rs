use anyhow::{bail, Result};

/// Brute-force squared-L2 index over fixed-dimension vectors.
///
/// Vectors are stored row-major in one buffer; row `i` is the `i`-th vector
/// passed to [`FlatL2Index::build`]. Search is exact, so recall is 1.0.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// All vectors must share one non-zero dimension and be finite;
    /// otherwise nothing is built.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Ok(Self { dim: 0, data: Vec::new() });
        };
        let dim = first.len();
        if dim == 0 { bail!("embedding dimension is zero"); }
        let mut data = Vec::with_capacity(dim * vectors.len());
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dim { bail!("vector {} has dimension {}, expected {}", i, v.len(), dim); }
            if v.iter().any(|x| !x.is_finite()) { bail!("vector {} has non-finite components", i); }
            data.extend_from_slice(v);
        }
        Ok(Self { dim, data })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Up to `k` `(row, squared distance)` pairs, nearest first. Equal
    /// distances keep row order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.is_empty() || k == 0 { return Ok(vec![]); }
        if query.len() != self.dim { bail!("query has dimension {}, index has {}", query.len(), self.dim); }
        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, row)| (i, squared_l2(row, query)))
            .collect();
        // sort_by is stable: ties stay in insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
