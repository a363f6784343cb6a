//! Exact nearest-neighbour index over squared Euclidean distance

use crate::error::{Error, Result};

/// One search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the stored vector (and of its passage)
    pub position: usize,
    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// Flat index holding every vector contiguously; search is a full scan.
///
/// Position `i` is the `i`-th vector passed to [`FlatIndex::build`].
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    /// Row-major `len * dimensions` storage
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build from a non-empty sequence of equal-dimension vectors
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimensions = vectors
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::vector_index("Cannot build an index from zero vectors"))?;

        if dimensions == 0 {
            return Err(Error::vector_index("Vectors must have at least one dimension"));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimensions);
        for (position, vector) in vectors.into_iter().enumerate() {
            if vector.len() != dimensions {
                return Err(Error::vector_index(format!(
                    "Vector dimension mismatch at position {}: expected {}, got {}",
                    position,
                    dimensions,
                    vector.len()
                )));
            }
            data.extend(vector);
        }

        Ok(Self { dimensions, data })
    }

    /// Return up to `k` nearest vectors, nearest first.
    ///
    /// Holds fewer than `k` vectors: every stored vector is returned. Equal
    /// distances keep position order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimensions {
            return Err(Error::vector_index(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimensions,
                query.len()
            )));
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: euclidean_distance_squared(vector, query),
            })
            .collect();

        // Stable sort keeps position order among ties
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k);

        Ok(neighbors)
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Squared L2 distance; callers guarantee equal lengths
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
