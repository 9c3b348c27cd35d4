//! Per-cell possibility sets, the only mutable state of a generation run

use crate::algorithm::bitset::TerrainSet;
use crate::io::error::{GenerationError, Result};
use crate::spatial::{CellId, HexGrid};
use crate::terrain::Terrain;

/// Remaining terrain possibilities for every cell of one grid
///
/// Sets only ever shrink. A set of size one is a collapsed cell and is never
/// widened again. A restriction that would empty a set is refused and
/// reported instead of being written, so the store never holds an empty set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossibilityStore {
    sets: Vec<TerrainSet>,
    resolved: usize,
}

impl PossibilityStore {
    /// Give every cell of `grid` the full terrain enumeration
    pub fn initialize(grid: &HexGrid) -> Self {
        Self::with_cells(grid.len())
    }

    /// Create a store for `cell_count` cells with full possibilities
    pub fn with_cells(cell_count: usize) -> Self {
        let full = TerrainSet::all();
        let resolved = if full.count() == 1 { cell_count } else { 0 };
        Self {
            sets: vec![full; cell_count],
            resolved,
        }
    }

    /// Number of cells tracked
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the store tracks no cells
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Current possibilities of a cell
    pub fn get(&self, cell: CellId) -> Option<TerrainSet> {
        self.sets.get(cell.index()).copied()
    }

    /// Intersect a cell's possibilities with `allowed`
    ///
    /// Returns whether the set shrank.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cell does not belong to this store
    /// - The intersection is empty (the stored set is left unchanged)
    pub fn restrict(&mut self, cell: CellId, allowed: TerrainSet) -> Result<bool> {
        let cell_count = self.sets.len();
        let set = self
            .sets
            .get_mut(cell.index())
            .ok_or(GenerationError::UnknownCell {
                index: cell.index(),
                cell_count,
            })?;

        let narrowed = set.intersection(&allowed);
        if narrowed.is_empty() {
            return Err(GenerationError::EmptyPossibilities {
                index: cell.index(),
            });
        }
        if narrowed == *set {
            return Ok(false);
        }

        let was_resolved = set.count() == 1;
        *set = narrowed;
        if !was_resolved && narrowed.count() == 1 {
            self.resolved += 1;
        }
        Ok(true)
    }

    /// Commit a cell to exactly one terrain
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cell does not belong to this store
    /// - `terrain` is not among the cell's current possibilities
    pub fn collapse(&mut self, cell: CellId, terrain: Terrain) -> Result<()> {
        let cell_count = self.sets.len();
        let set = self
            .sets
            .get_mut(cell.index())
            .ok_or(GenerationError::UnknownCell {
                index: cell.index(),
                cell_count,
            })?;

        if !set.contains(terrain) {
            return Err(GenerationError::InvalidCollapse {
                index: cell.index(),
                terrain,
                remaining: *set,
            });
        }

        if set.count() > 1 {
            self.resolved += 1;
        }
        *set = TerrainSet::single(terrain);
        Ok(())
    }

    /// Whether a cell holds exactly one terrain
    pub fn is_resolved(&self, cell: CellId) -> bool {
        self.get(cell).is_some_and(|set| set.count() == 1)
    }

    /// The committed terrain of a resolved cell
    pub fn terrain(&self, cell: CellId) -> Option<Terrain> {
        self.get(cell).and_then(|set| set.single_member())
    }

    /// Number of resolved cells
    pub const fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Whether every cell is resolved
    pub fn all_resolved(&self) -> bool {
        self.resolved == self.sets.len()
    }

    /// All sets in cell id order
    pub fn iter(&self) -> impl Iterator<Item = (CellId, TerrainSet)> + '_ {
        self.sets
            .iter()
            .enumerate()
            .map(|(i, set)| (CellId::new(i), *set))
    }
}
