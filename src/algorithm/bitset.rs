use crate::terrain::Terrain;
use bitvec::prelude::*;
use std::fmt;

type TerrainBits = BitArray<[u8; 1], Lsb0>;

const _: () = assert!(Terrain::COUNT <= 8, "terrain bits must fit in one byte");

/// Fixed-size bitset of terrain categories
///
/// Backs every possibility set and every adjacency rule entry. Bit `i` is set
/// when `Terrain::from_index(i)` is a member. Iteration always follows
/// terrain declaration order.
#[derive(Clone, Copy)]
pub struct TerrainSet {
    bits: TerrainBits,
}

impl PartialEq for TerrainSet {
    fn eq(&self, other: &Self) -> bool {
        self.bits.as_raw_slice() == other.bits.as_raw_slice()
    }
}

impl Eq for TerrainSet {}

impl Default for TerrainSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl TerrainSet {
    /// Create a set with no terrains present
    pub const fn empty() -> Self {
        Self {
            bits: TerrainBits::ZERO,
        }
    }

    /// Create a set containing every terrain
    pub fn all() -> Self {
        Terrain::ALL.into_iter().collect()
    }

    /// Create a set containing exactly one terrain
    pub fn single(terrain: Terrain) -> Self {
        let mut set = Self::empty();
        set.insert(terrain);
        set
    }

    /// Insert a terrain
    pub fn insert(&mut self, terrain: Terrain) {
        self.bits.set(terrain.index(), true);
    }

    /// Remove a terrain
    pub fn remove(&mut self, terrain: Terrain) {
        self.bits.set(terrain.index(), false);
    }

    /// Test terrain membership
    pub fn contains(&self, terrain: Terrain) -> bool {
        self.bits.get(terrain.index()).is_some_and(|bit| *bit)
    }

    /// Intersect this set with another in-place
    pub fn intersect_with(&mut self, other: &Self) {
        for terrain in Terrain::ALL {
            if !other.contains(terrain) {
                self.remove(terrain);
            }
        }
    }

    /// Create a new set containing the intersection
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = *self;
        result.intersect_with(other);
        result
    }

    /// Create a new set containing the union
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.iter().chain(other.iter()).collect()
    }

    /// Test whether every member of this set is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.iter().all(|terrain| other.contains(terrain))
    }

    /// Test if no terrains are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count terrains in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// The only member, when the set holds exactly one terrain
    pub fn single_member(&self) -> Option<Terrain> {
        if self.count() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Terrain> + '_ {
        self.bits.iter_ones().filter_map(Terrain::from_index)
    }

    /// Members collected into a vector
    pub fn to_vec(&self) -> Vec<Terrain> {
        self.iter().collect()
    }
}

impl FromIterator<Terrain> for TerrainSet {
    fn from_iter<I: IntoIterator<Item = Terrain>>(iter: I) -> Self {
        let mut set = Self::empty();
        for terrain in iter {
            set.insert(terrain);
        }
        set
    }
}

impl fmt::Debug for TerrainSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for TerrainSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TerrainSet({} terrains: {:?})", self.count(), self)
    }
}
