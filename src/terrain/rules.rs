//! Directed adjacency rules between terrain categories
//!
//! An entry `source -> allowed` says which terrains may sit next to a cell
//! whose terrain is `source`. The relation is directed:
//! propagation restricts a neighbour using the source cell's entry only, so
//! an asymmetric table produces different maps than its symmetric closure.

use crate::algorithm::bitset::TerrainSet;
use crate::io::error::{Result, invalid_rules};
use crate::terrain::Terrain;

/// Static mapping from a terrain to the terrains permitted as its neighbour
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjacencyRules {
    allowed: [TerrainSet; Terrain::COUNT],
}

impl Default for AdjacencyRules {
    fn default() -> Self {
        Self::reference()
    }
}

impl AdjacencyRules {
    /// The default terrain policy
    ///
    /// Directed: a mountain accepts grass beside it, grass refuses mountain.
    pub fn reference() -> Self {
        use Terrain::{Desert, Forest, Grass, Mountain, Water};

        let mut allowed = [TerrainSet::empty(); Terrain::COUNT];
        let entries = [
            (Grass, [Grass, Forest, Desert, Water].as_slice()),
            (Water, [Water, Grass, Desert].as_slice()),
            (Mountain, [Mountain, Forest, Desert, Grass].as_slice()),
            (Forest, [Forest, Grass, Mountain].as_slice()),
            (Desert, [Desert, Grass, Water, Mountain].as_slice()),
        ];
        for (source, neighbours) in entries {
            if let Some(slot) = allowed.get_mut(source.index()) {
                *slot = neighbours.iter().copied().collect();
            }
        }
        Self { allowed }
    }

    /// A table where every terrain may neighbour every terrain
    pub fn permissive() -> Self {
        Self {
            allowed: [TerrainSet::all(); Terrain::COUNT],
        }
    }

    /// Build a table from explicit `(source, allowed)` entries
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidRules`](crate::GenerationError::InvalidRules) if:
    /// - A terrain appears more than once as a source
    /// - A terrain has no entry at all
    /// - An entry does not allow its own terrain
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Terrain, TerrainSet)>,
    {
        let mut allowed: [Option<TerrainSet>; Terrain::COUNT] = [None; Terrain::COUNT];

        for (source, neighbours) in entries {
            let Some(slot) = allowed.get_mut(source.index()) else {
                continue;
            };
            if slot.is_some() {
                return Err(invalid_rules(&format!("duplicate entry for {source}")));
            }
            if !neighbours.contains(source) {
                return Err(invalid_rules(&format!(
                    "{source} must be allowed to neighbour itself"
                )));
            }
            *slot = Some(neighbours);
        }

        let mut table = [TerrainSet::empty(); Terrain::COUNT];
        for terrain in Terrain::ALL {
            let entry = allowed
                .get(terrain.index())
                .copied()
                .flatten()
                .ok_or_else(|| invalid_rules(&format!("missing entry for {terrain}")))?;
            if let Some(slot) = table.get_mut(terrain.index()) {
                *slot = entry;
            }
        }

        Ok(Self { allowed: table })
    }

    /// Terrains permitted next to a cell of terrain `source`
    pub fn allowed_neighbors(&self, source: Terrain) -> TerrainSet {
        self.allowed
            .get(source.index())
            .copied()
            .unwrap_or_default()
    }

    /// Whether `neighbour` may sit next to a cell of terrain `source`
    pub fn permits(&self, source: Terrain, neighbour: Terrain) -> bool {
        self.allowed_neighbors(source).contains(neighbour)
    }

    /// Whether the table is its own symmetric closure
    pub fn is_symmetric(&self) -> bool {
        Terrain::ALL.into_iter().all(|a| {
            Terrain::ALL
                .into_iter()
                .all(|b| self.permits(a, b) == self.permits(b, a))
        })
    }

    /// Symmetric closure of this table
    ///
    /// Only useful for comparison; generation always uses the directed table.
    #[must_use]
    pub fn symmetrized(&self) -> Self {
        let mut allowed = self.allowed;
        for source in Terrain::ALL {
            let neighbours = self.allowed_neighbors(source);
            for neighbour in neighbours.iter() {
                if let Some(reverse) = allowed.get_mut(neighbour.index()) {
                    reverse.insert(source);
                }
            }
        }
        Self { allowed }
    }

    /// Iterate over `(source, allowed)` entries in terrain order
    pub fn entries(&self) -> impl Iterator<Item = (Terrain, TerrainSet)> + '_ {
        Terrain::ALL
            .into_iter()
            .map(|terrain| (terrain, self.allowed_neighbors(terrain)))
    }
}
