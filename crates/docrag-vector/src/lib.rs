//! docrag-vector
//!
//! In-memory vector index with exact Euclidean k-nearest-neighbour search, and
//! the query-side retriever on top of it.

pub mod index;
pub mod retriever;

pub use index::VectorIndex;
pub use retriever::retrieve;
