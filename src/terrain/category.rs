use crate::io::error::{GenerationError, Result};
use std::fmt;
use std::str::FromStr;

/// Terrain category assigned to a hex cell
///
/// The derived ordering follows declaration order and is only used to keep
/// iteration and tie-breaking deterministic; it carries no semantic ranking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terrain {
    /// Open grassland
    Grass,
    /// Lakes and coastline
    Water,
    /// Impassable high ground
    Mountain,
    /// Woodland
    Forest,
    /// Arid sand
    Desert,
}

impl Terrain {
    /// Number of terrain categories
    pub const COUNT: usize = 5;

    /// Every terrain in declaration order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Grass,
        Self::Water,
        Self::Mountain,
        Self::Forest,
        Self::Desert,
    ];

    /// Dense zero-based index of this terrain
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Terrain::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lowercase display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Water => "water",
            Self::Mountain => "mountain",
            Self::Forest => "forest",
            Self::Desert => "desert",
        }
    }

    /// RGBA colour used by the raster and GIF exports
    pub const fn color(self) -> [u8; 4] {
        match self {
            Self::Grass => [106, 190, 48, 255],
            Self::Water => [48, 96, 200, 255],
            Self::Mountain => [128, 120, 112, 255],
            Self::Forest => [34, 100, 34, 255],
            Self::Desert => [230, 200, 120, 255],
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Terrain {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|terrain| terrain.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GenerationError::InvalidRules {
                reason: format!("unknown terrain '{wanted}'"),
            })
    }
}
