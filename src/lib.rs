//! Greedy wave function collapse over a hexagonal terrain grid
//!
//! Every cell of an axial hex grid starts able to take any terrain. The
//! generator repeatedly collapses the most constrained cell to a random
//! remaining terrain and propagates directed adjacency rules outward until
//! the grid is fully resolved or a cell runs out of options.

#![forbid(unsafe_code)]

/// Possibility store, selection, propagation and the generation driver
pub mod algorithm;
/// Input/output operations and error handling
pub mod io;
/// Hex coordinates and grid topology
pub mod spatial;
/// Terrain categories and adjacency rules
pub mod terrain;

pub use io::error::{GenerationError, Result};
