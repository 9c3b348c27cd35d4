use crate::{
    algorithm::bitset::TerrainSet,
    algorithm::store::PossibilityStore,
    io::error::{GenerationError, Result},
    spatial::CellId,
    terrain::Terrain,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Pick the next cell to collapse
///
/// Chooses the unresolved cell with the fewest remaining possibilities.
/// Ties go to the lowest cell id, which is lexicographic `(q, r)` order for
/// grids built by [`HexGrid`](crate::spatial::HexGrid). Returns `None` once
/// every cell is resolved.
pub fn select_next(store: &PossibilityStore) -> Option<CellId> {
    let mut best: Option<(usize, CellId)> = None;

    for (cell, set) in store.iter() {
        let remaining = set.count();
        if remaining <= 1 {
            continue;
        }
        if best.is_none_or(|(fewest, _)| remaining < fewest) {
            best = Some((remaining, cell));
            // Two is the floor for an unresolved cell
            if remaining == 2 {
                break;
            }
        }
    }

    best.map(|(_, cell)| cell)
}

/// Pick a terrain for `cell` uniformly among its remaining possibilities
///
/// # Errors
///
/// Returns an error if the cell is unknown to the store or, which the store
/// never allows, has no possibilities left.
pub fn choose_category<R>(cell: CellId, store: &PossibilityStore, rng: &mut R) -> Result<Terrain>
where
    R: Rng + ?Sized,
{
    let set = store.get(cell).ok_or(GenerationError::UnknownCell {
        index: cell.index(),
        cell_count: store.len(),
    })?;

    uniform_member(set, rng).ok_or(GenerationError::EmptyPossibilities {
        index: cell.index(),
    })
}

fn uniform_member<R>(set: TerrainSet, rng: &mut R) -> Option<Terrain>
where
    R: Rng + ?Sized,
{
    let count = set.count();
    if count == 0 {
        return None;
    }
    let pick = rng.random_range(0..count);
    set.iter().nth(pick)
}

/// Seeded random source for reproducible stochastic choices
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Wrap an already constructed generator
    pub const fn from_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Uniform choice among the members of a set
    pub fn choose(&mut self, set: TerrainSet) -> Option<Terrain> {
        uniform_member(set, &mut self.rng)
    }

    /// Choose a terrain for `cell` from its current possibilities
    ///
    /// # Errors
    ///
    /// See [`choose_category`].
    pub fn choose_category(&mut self, cell: CellId, store: &PossibilityStore) -> Result<Terrain> {
        choose_category(cell, store, &mut self.rng)
    }

    /// Mutable access to the underlying generator
    pub const fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
