//! Vector index and query-time retrieval

mod index;
mod retriever;

pub use index::{euclidean_distance_squared, FlatIndex, Neighbor};
pub use retriever::{RetrievedPassage, Retriever};
