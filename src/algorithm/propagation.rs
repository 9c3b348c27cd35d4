//! Constraint propagation from resolved cells to their neighbours

use crate::{
    algorithm::store::PossibilityStore,
    io::error::{GenerationError, Result},
    spatial::{CellId, HexCoord, HexGrid},
    terrain::{AdjacencyRules, Terrain},
};
use bitvec::prelude::*;
use std::collections::VecDeque;
use std::fmt;

/// A cell whose possibilities were emptied during propagation
///
/// Terminal for the run that produced it. Restrictions applied before the
/// contradiction are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contradiction {
    /// Cell left with no possible terrain
    pub cell: HexCoord,
    /// Resolved cell whose rule emptied it
    pub source: HexCoord,
    /// Terrain of the source cell
    pub terrain: Terrain,
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell {} has no terrain compatible with {} at {}",
            self.cell, self.terrain, self.source
        )
    }
}

impl std::error::Error for Contradiction {}

/// Cell narrowed to a single terrain by propagation rather than selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedCell {
    /// The forced cell
    pub cell: CellId,
    /// Its coordinate
    pub coord: HexCoord,
    /// The only terrain it can still take
    pub terrain: Terrain,
}

/// Outcome of processing one worklist entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationStep {
    /// The dequeued cell
    pub source: CellId,
    /// Terrain the source propagated, `None` if it was still unresolved
    pub terrain: Option<Terrain>,
    /// Neighbours whose possibilities shrank
    pub narrowed: Vec<CellId>,
    /// Neighbours that shrank down to a single terrain
    pub forced: Vec<ForcedCell>,
}

/// FIFO worklist of cells whose neighbours must be re-checked
///
/// A cell is queued at most once at a time; re-narrowing a queued cell does
/// not duplicate it because its rule is read when it is dequeued.
#[derive(Debug, Clone)]
pub struct Propagation {
    queue: VecDeque<CellId>,
    queued: BitVec,
}

impl Propagation {
    /// Create an empty worklist for a grid of `cell_count` cells
    pub fn new(cell_count: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: bitvec![0; cell_count],
        }
    }

    /// Enqueue a cell unless it is already pending
    pub fn seed(&mut self, cell: CellId) {
        let Some(mut flag) = self.queued.get_mut(cell.index()) else {
            return;
        };
        if !*flag {
            flag.set(true);
            self.queue.push_back(cell);
        }
    }

    /// Whether the worklist is empty
    pub fn is_settled(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of cells waiting to be processed
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.queue.clear();
        self.queued.fill(false);
    }

    fn pop(&mut self) -> Option<CellId> {
        let cell = self.queue.pop_front()?;
        if let Some(mut flag) = self.queued.get_mut(cell.index()) {
            flag.set(false);
        }
        Some(cell)
    }

    /// Process a single worklist entry
    ///
    /// Only a resolved cell propagates: every neighbour, resolved or not, is
    /// intersected with the source terrain's allowed set. Checking resolved
    /// neighbours is a no-op unless they conflict, in which case it is the
    /// contradiction. Narrowed neighbours are queued in turn.
    ///
    /// Returns `Ok(None)` when the worklist is empty.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Contradiction`] if a neighbour runs out of
    /// possibilities; the rest of the worklist is discarded. Returns
    /// [`GenerationError::UnknownCell`] if the store does not match the grid.
    pub fn step(
        &mut self,
        grid: &HexGrid,
        rules: &AdjacencyRules,
        store: &mut PossibilityStore,
    ) -> Result<Option<PropagationStep>> {
        let Some(source) = self.pop() else {
            return Ok(None);
        };

        let mut step = PropagationStep {
            source,
            terrain: store.terrain(source),
            narrowed: Vec::new(),
            forced: Vec::new(),
        };
        let Some(terrain) = step.terrain else {
            return Ok(Some(step));
        };

        let allowed = rules.allowed_neighbors(terrain);
        for &neighbour in grid.neighbors(source) {
            match store.restrict(neighbour, allowed) {
                Ok(false) => {}
                Ok(true) => {
                    step.narrowed.push(neighbour);
                    // A singleton can only stay put or empty, so a shrink to one is new
                    if let (Some(coord), Some(only)) =
                        (grid.coord(neighbour), store.terrain(neighbour))
                    {
                        step.forced.push(ForcedCell {
                            cell: neighbour,
                            coord,
                            terrain: only,
                        });
                    }
                    self.seed(neighbour);
                }
                Err(GenerationError::EmptyPossibilities { .. }) => {
                    self.clear();
                    let (Some(cell), Some(origin)) = (grid.coord(neighbour), grid.coord(source))
                    else {
                        return Err(GenerationError::UnknownCell {
                            index: neighbour.index().max(source.index()),
                            cell_count: grid.len(),
                        });
                    };
                    return Err(Contradiction {
                        cell,
                        source: origin,
                        terrain,
                    }
                    .into());
                }
                Err(other) => {
                    self.clear();
                    return Err(other);
                }
            }
        }

        Ok(Some(step))
    }

    /// Process the worklist until it empties
    ///
    /// Returns every forced placement in the order it happened.
    ///
    /// # Errors
    ///
    /// See [`Propagation::step`].
    pub fn run(
        &mut self,
        grid: &HexGrid,
        rules: &AdjacencyRules,
        store: &mut PossibilityStore,
    ) -> Result<Vec<ForcedCell>> {
        let mut forced = Vec::new();
        while let Some(step) = self.step(grid, rules, store)? {
            forced.extend(step.forced);
        }
        Ok(forced)
    }
}

/// Propagate the consequences of collapsing `origin` to a fixed point
///
/// # Errors
///
/// Returns [`GenerationError::Contradiction`] identifying the exhausted cell
/// if any neighbour along the ripple runs out of possibilities.
pub fn propagate(
    origin: CellId,
    store: &mut PossibilityStore,
    grid: &HexGrid,
    rules: &AdjacencyRules,
) -> Result<Vec<ForcedCell>> {
    let mut propagation = Propagation::new(grid.len());
    propagation.seed(origin);
    propagation.run(grid, rules, store)
}
