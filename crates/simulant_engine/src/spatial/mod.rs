//! Spatial partitioning data structures
//!
//! Provides the per-screen bounding-box index used for picking and view
//! culling, and the mutation cache that keeps it coherent across world
//! snapshots.

mod quadtree;
mod mutant_cache;

pub use quadtree::{Quadtree, QuadtreeNode, QuadtreeConfig};
pub use mutant_cache::MutantCache;
