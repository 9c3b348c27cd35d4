//! Hexagonal grid topology in axial coordinates
//!
//! Cells are addressed by axial `(q, r)` coordinates and, once the grid is
//! built, by a dense [`CellId`] assigned in lexicographic coordinate order.
//! All per-cell state elsewhere in the crate is indexed by that id, and the
//! coordinate lookup is a dense `ndarray` table over the grid's bounding box.

use crate::io::configuration::MAX_GRID_RADIUS;
use crate::io::error::{Result, invalid_parameter};
use ndarray::Array2;
use std::collections::BTreeSet;
use std::fmt;

/// Axial coordinate of a hex cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HexCoord {
    /// Column axis
    pub q: i32,
    /// Diagonal row axis
    pub r: i32,
}

/// The six axial neighbour offsets, in the order neighbours are reported
pub const AXIAL_DIRECTIONS: [HexCoord; 6] = [
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
];

impl HexCoord {
    /// Create a coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate (`q + r + s == 0`)
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Translate by an offset
    #[must_use]
    pub const fn offset(self, delta: Self) -> Self {
        Self::new(self.q + delta.q, self.r + delta.r)
    }

    /// All six neighbouring coordinates, whether or not they are on a grid
    pub fn neighbors(self) -> [Self; 6] {
        AXIAL_DIRECTIONS.map(|direction| self.offset(direction))
    }

    /// Hex step distance between two coordinates
    pub const fn distance(self, other: Self) -> i32 {
        ((self.q - other.q).abs() + (self.r - other.r).abs() + (self.s() - other.s()).abs()) / 2
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Stable dense index of a cell within one [`HexGrid`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(usize);

impl CellId {
    /// Wrap a raw index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw index into per-cell arrays
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable hex grid with precomputed adjacency
#[derive(Debug, Clone)]
pub struct HexGrid {
    /// Coordinates indexed by `CellId`, sorted lexicographically
    coords: Vec<HexCoord>,
    /// Neighbour ids per cell, in `AXIAL_DIRECTIONS` order
    adjacency: Vec<Vec<CellId>>,
    /// Dense coordinate index over the bounding box (`q - min_q`, `r - min_r`)
    index: Array2<Option<CellId>>,
    /// Minimum coordinate of the bounding box
    origin: HexCoord,
}

impl HexGrid {
    /// Build the hex region `q ∈ [-width, width]`,
    /// `r ∈ [max(-height, -q-height), min(height, -q+height)]`
    ///
    /// Zero is a valid dimension: `build(0, 0)` and `build(1, 0)` are the
    /// single origin cell.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is negative or exceeds
    /// [`MAX_GRID_RADIUS`].
    pub fn build(width: i32, height: i32) -> Result<Self> {
        validate_dimension("width", width)?;
        validate_dimension("height", height)?;

        let mut coords = Vec::new();
        for q in -width..=width {
            let r_min = (-height).max(-q - height);
            let r_max = height.min(-q + height);
            for r in r_min..=r_max {
                coords.push(HexCoord::new(q, r));
            }
        }

        Self::from_sorted(coords)
    }

    /// Build a grid from an arbitrary set of coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if the set is empty, contains duplicates, or spans
    /// more than [`MAX_GRID_RADIUS`] in either axis from the origin.
    pub fn from_coords<I>(coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = HexCoord>,
    {
        let mut unique = BTreeSet::new();
        for coord in coords {
            if coord.q.abs() > MAX_GRID_RADIUS || coord.r.abs() > MAX_GRID_RADIUS {
                return Err(invalid_parameter(
                    "coords",
                    &coord,
                    &format!("coordinates must lie within ±{MAX_GRID_RADIUS}"),
                ));
            }
            if !unique.insert(coord) {
                return Err(invalid_parameter("coords", &coord, &"duplicate coordinate"));
            }
        }
        if unique.is_empty() {
            return Err(invalid_parameter(
                "coords",
                &"[]",
                &"a grid needs at least one cell",
            ));
        }

        Self::from_sorted(unique.into_iter().collect())
    }

    fn from_sorted(coords: Vec<HexCoord>) -> Result<Self> {
        let (Some(min_q), Some(max_q), Some(min_r), Some(max_r)) = (
            coords.iter().map(|c| c.q).min(),
            coords.iter().map(|c| c.q).max(),
            coords.iter().map(|c| c.r).min(),
            coords.iter().map(|c| c.r).max(),
        ) else {
            return Err(invalid_parameter(
                "coords",
                &"[]",
                &"a grid needs at least one cell",
            ));
        };

        let origin = HexCoord::new(min_q, min_r);
        let shape = ((max_q - min_q + 1) as usize, (max_r - min_r + 1) as usize);
        let mut index = Array2::from_elem(shape, None);
        for (i, coord) in coords.iter().enumerate() {
            if let Some(slot) = slot_of(origin, *coord).and_then(|slot| index.get_mut(slot)) {
                *slot = Some(CellId::new(i));
            }
        }

        let mut grid = Self {
            coords,
            adjacency: Vec::new(),
            index,
            origin,
        };
        grid.adjacency = grid
            .coords
            .iter()
            .map(|coord| {
                coord
                    .neighbors()
                    .into_iter()
                    .filter_map(|neighbour| grid.cell_at(neighbour))
                    .collect()
            })
            .collect();

        Ok(grid)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Look up a cell by exact coordinate
    pub fn cell_at(&self, coord: HexCoord) -> Option<CellId> {
        slot_of(self.origin, coord)
            .and_then(|slot| self.index.get(slot))
            .copied()
            .flatten()
    }

    /// Whether a coordinate belongs to the grid
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.cell_at(coord).is_some()
    }

    /// Coordinate of a cell
    pub fn coord(&self, cell: CellId) -> Option<HexCoord> {
        self.coords.get(cell.index()).copied()
    }

    /// On-grid neighbours of a cell in `AXIAL_DIRECTIONS` order
    pub fn neighbors(&self, cell: CellId) -> &[CellId] {
        self.adjacency
            .get(cell.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// On-grid neighbour coordinates of a coordinate
    pub fn neighbor_coords(&self, coord: HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|neighbour| self.contains(*neighbour))
            .collect()
    }

    /// All cells with their coordinates, in id order
    pub fn cells(&self) -> impl Iterator<Item = (CellId, HexCoord)> + '_ {
        self.coords
            .iter()
            .enumerate()
            .map(|(i, coord)| (CellId::new(i), *coord))
    }

    /// Coordinates in id order
    pub fn coords(&self) -> &[HexCoord] {
        &self.coords
    }

    /// Inclusive coordinate bounding box as `(min, max)`
    pub fn bounds(&self) -> (HexCoord, HexCoord) {
        let (q_span, r_span) = self.index.dim();
        (
            self.origin,
            HexCoord::new(
                self.origin.q + q_span as i32 - 1,
                self.origin.r + r_span as i32 - 1,
            ),
        )
    }
}

fn validate_dimension(parameter: &'static str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(invalid_parameter(parameter, &value, &"must not be negative"));
    }
    if value > MAX_GRID_RADIUS {
        return Err(invalid_parameter(
            parameter,
            &value,
            &format!("must not exceed {MAX_GRID_RADIUS}"),
        ));
    }
    Ok(())
}

/// Index of a coordinate in the dense lookup table, if it is not below the origin
fn slot_of(origin: HexCoord, coord: HexCoord) -> Option<(usize, usize)> {
    let row = usize::try_from(coord.q - origin.q).ok()?;
    let col = usize::try_from(coord.r - origin.r).ok()?;
    Some((row, col))
}
