//! Frame capture and GIF generation for watching a map collapse

use crate::algorithm::executor::{CollapseKind, CollapseObserver, Placement};
use crate::algorithm::propagation::Contradiction;
use crate::io::configuration::{CONTRADICTION_COLOR, VIEWER_MIN_FRAME_DELAY_MS};
use crate::io::error::{GenerationError, Result};
use crate::io::image::{RasterLayout, ensure_parent_dir};
use crate::spatial::{HexCoord, HexGrid};
use crate::terrain::Terrain;
use image::{Frame, RgbaImage};
use std::collections::BTreeMap;
use std::path::Path;

/// Records collapse notifications so the run can be replayed as an animation
///
/// Unresolved cells are drawn in the average terrain colour, so the map
/// visibly fills in. A contradiction, if one ends the run, is drawn on the
/// last frame.
#[derive(Debug, Clone)]
pub struct VisualizationCapture {
    pub(crate) placements: Vec<Placement>,
    contradiction: Option<Contradiction>,
    layout: RasterLayout,
    coords: Vec<HexCoord>,
    empty_color: [u8; 4],
}

fn average_color() -> [u8; 4] {
    let mut sums = [0u32; 4];
    for terrain in Terrain::ALL {
        for (sum, channel) in sums.iter_mut().zip(terrain.color()) {
            *sum += u32::from(channel);
        }
    }
    let count = Terrain::COUNT as u32;
    sums.map(|sum| (sum / count) as u8)
}

impl VisualizationCapture {
    /// Prepare a capture for `grid`, drawing each cell `scale` pixels wide
    pub fn new(grid: &HexGrid, scale: u32) -> Self {
        Self {
            placements: Vec::with_capacity(grid.len()),
            contradiction: None,
            layout: RasterLayout::for_grid(grid, scale),
            coords: grid.coords().to_vec(),
            empty_color: average_color(),
        }
    }

    /// Returns all recorded placements
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The contradiction that ended the recorded run, if any
    pub const fn contradiction(&self) -> Option<&Contradiction> {
        self.contradiction.as_ref()
    }

    /// Returns the total number of placement events
    pub const fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Forget everything recorded so far
    pub fn reset(&mut self) {
        self.placements.clear();
        self.contradiction = None;
    }

    /// Export the captured frames as a GIF with automatic frame skipping
    ///
    /// Frame delays below what viewers support are raised, and frames are
    /// skipped in proportion so the animation keeps its apparent speed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No placements were captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(&self, output_path: &Path, frame_delay_ms: u32) -> Result<()> {
        if self.placements.is_empty() {
            return Err(GenerationError::InvalidParameter {
                parameter: "visualize",
                value: output_path.display().to_string(),
                reason: "no placements were captured".to_string(),
            });
        }

        let frame_delay_ms = frame_delay_ms.max(1);
        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms).max(1);

        let frames = self.generate_frames(effective_delay_ms, skip_factor as usize);

        ensure_parent_dir(output_path)?;

        let file = std::fs::File::create(output_path).map_err(|e| GenerationError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| GenerationError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn generate_frames(&self, delay_ms: u32, skip_factor: usize) -> Vec<Frame> {
        let mut state: BTreeMap<HexCoord, Terrain> = BTreeMap::new();
        let mut frames = vec![self.render_frame(&state, delay_ms)];

        for (count, placement) in self.placements.iter().enumerate() {
            state.insert(placement.coord, placement.terrain);
            if (count + 1) % skip_factor == 0 {
                frames.push(self.render_frame(&state, delay_ms));
            }
        }
        if self.placements.len() % skip_factor != 0 {
            frames.push(self.render_frame(&state, delay_ms));
        }

        let mut last = self.render_frame(&state, delay_ms).into_buffer();
        if let Some(contradiction) = self.contradiction {
            self.layout
                .paint(&mut last, contradiction.cell, CONTRADICTION_COLOR);
        }
        // Hold the final frame
        frames.push(Frame::from_parts(
            last,
            0,
            0,
            image::Delay::from_numer_denom_ms(delay_ms * 25, 1),
        ));

        frames
    }

    fn render_frame(&self, state: &BTreeMap<HexCoord, Terrain>, delay_ms: u32) -> Frame {
        let (width, height) = self.layout.dimensions();
        let mut img = RgbaImage::new(width, height);
        for &coord in &self.coords {
            let color = state
                .get(&coord)
                .map_or(self.empty_color, |terrain| terrain.color());
            self.layout.paint(&mut img, coord, color);
        }

        Frame::from_parts(img, 0, 0, image::Delay::from_numer_denom_ms(delay_ms, 1))
    }
}

impl CollapseObserver for VisualizationCapture {
    fn on_collapse(&mut self, coord: HexCoord, terrain: Terrain, kind: CollapseKind) {
        self.placements.push(Placement {
            coord,
            terrain,
            kind,
        });
    }

    fn on_contradiction(&mut self, contradiction: &Contradiction) {
        self.contradiction = Some(*contradiction);
    }
}
