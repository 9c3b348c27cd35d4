//! PNG export of a resolved map on a square-pixel raster

use crate::io::configuration::UNRESOLVED_COLOR;
use crate::io::error::{GenerationError, Result};
use crate::spatial::{HexCoord, HexGrid};
use crate::terrain::Terrain;
use image::{Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::path::Path;

/// Placement of hex cells on a pixel raster
///
/// Cells are laid out in odd-q offset columns: each column is one axial `q`,
/// odd columns are pushed down by half a cell. Every cell becomes a
/// `scale` x `scale` block of pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterLayout {
    min_col: i32,
    min_row: i32,
    width: u32,
    height: u32,
    scale: u32,
}

const fn offset_position(coord: HexCoord) -> (i32, i32) {
    (coord.q, coord.r + coord.q.div_euclid(2))
}

impl RasterLayout {
    /// Fit a layout around every cell of `grid`
    pub fn for_grid(grid: &HexGrid, scale: u32) -> Self {
        let scale = scale.max(1);
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        let mut staggered = false;
        for &coord in grid.coords() {
            staggered |= coord.q.rem_euclid(2) == 1;
            let (col, row) = offset_position(coord);
            bounds = Some(match bounds {
                None => (col, col, row, row),
                Some((min_c, max_c, min_r, max_r)) => {
                    (min_c.min(col), max_c.max(col), min_r.min(row), max_r.max(row))
                }
            });
        }
        let (min_col, max_col, min_row, max_row) = bounds.unwrap_or_default();

        let cols = (max_col - min_col + 1) as u32;
        let rows = (max_row - min_row + 1) as u32;
        let stagger = if staggered { scale / 2 } else { 0 };

        Self {
            min_col,
            min_row,
            width: cols * scale,
            height: rows * scale + stagger,
            scale,
        }
    }

    /// Raster size in pixels as `(width, height)`
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Edge length of one cell block in pixels
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Top-left pixel of a cell's block, `None` if it falls outside the raster
    pub fn cell_origin(&self, coord: HexCoord) -> Option<(u32, u32)> {
        let (col, row) = offset_position(coord);
        let col = u32::try_from(col - self.min_col).ok()?;
        let row = u32::try_from(row - self.min_row).ok()?;
        let stagger = if coord.q.rem_euclid(2) == 1 {
            self.scale / 2
        } else {
            0
        };
        let x = col * self.scale;
        let y = row * self.scale + stagger;
        (x + self.scale <= self.width && y + self.scale <= self.height).then_some((x, y))
    }

    /// Fill a cell's block with `color`
    pub fn paint(&self, image: &mut RgbaImage, coord: HexCoord, color: [u8; 4]) {
        let Some((x0, y0)) = self.cell_origin(coord) else {
            return;
        };
        for y in y0..y0 + self.scale {
            for x in x0..x0 + self.scale {
                if let Some(pixel) = image.get_pixel_mut_checked(x, y) {
                    *pixel = Rgba(color);
                }
            }
        }
    }

    /// Render every cell of `grid` with the colour returned by `color_of`
    pub fn render<F>(&self, grid: &HexGrid, mut color_of: F) -> RgbaImage
    where
        F: FnMut(HexCoord) -> [u8; 4],
    {
        let mut image = RgbaImage::from_pixel(self.width, self.height, Rgba(UNRESOLVED_COLOR));
        for &coord in grid.coords() {
            self.paint(&mut image, coord, color_of(coord));
        }
        image
    }
}

/// Create the parent directory of `path` if it has one
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GenerationError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    Ok(())
}

/// Render a map with terrain colours, leaving unassigned cells transparent
pub fn render_map(
    grid: &HexGrid,
    assignment: &BTreeMap<HexCoord, Terrain>,
    scale: u32,
) -> RgbaImage {
    RasterLayout::for_grid(grid, scale).render(grid, |coord| {
        assignment
            .get(&coord)
            .map_or(UNRESOLVED_COLOR, |terrain| terrain.color())
    })
}

/// Export a resolved map as a PNG image with transparent background
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_map_as_png(
    grid: &HexGrid,
    assignment: &BTreeMap<HexCoord, Terrain>,
    scale: u32,
    output_path: &Path,
) -> Result<()> {
    let img = render_map(grid, assignment, scale);

    ensure_parent_dir(output_path)?;

    img.save(output_path)
        .map_err(|e| GenerationError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
