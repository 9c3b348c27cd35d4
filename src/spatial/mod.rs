//! Spatial data structures for hexagonal grids
//!
//! This module contains spatial-related functionality including:
//! - Axial coordinates and neighbour offsets
//! - Grid construction, cell ids and adjacency lookup

/// Hex grid topology
pub mod grid;

pub use grid::{CellId, HexCoord, HexGrid};
