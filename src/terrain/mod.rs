//! Terrain categories and the adjacency rules between them

/// Terrain category enumeration
pub mod category;
/// Directed adjacency rule table
pub mod rules;

pub use category::Terrain;
pub use rules::AdjacencyRules;
