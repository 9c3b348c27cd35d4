//! Tests for raster layout and PNG export

#[cfg(test)]
mod tests {
    use hexcollapse::io::configuration::UNRESOLVED_COLOR;
    use hexcollapse::io::image::{RasterLayout, export_map_as_png, render_map};
    use hexcollapse::spatial::{HexCoord, HexGrid};
    use hexcollapse::terrain::Terrain;
    use std::collections::{BTreeMap, HashSet};

    // Tests every cell gets its own block inside the raster
    // Verified by dropping the odd-column stagger
    #[test]
    fn test_layout_blocks_do_not_overlap() {
        let grid = HexGrid::build(3, 3).expect("Failed to build grid");
        let layout = RasterLayout::for_grid(&grid, 4);
        let (width, height) = layout.dimensions();

        let mut origins = HashSet::new();
        for &coord in grid.coords() {
            let (x, y) = layout.cell_origin(coord).expect("cell inside raster");
            assert!(x + layout.scale() <= width);
            assert!(y + layout.scale() <= height);
            assert!(origins.insert((x, y)), "{coord} shares a block");
        }
        assert_eq!(layout.cell_origin(HexCoord::new(40, 40)), None);
    }

    #[test]
    fn test_single_cell_layout() {
        let grid = HexGrid::build(0, 0).expect("Failed to build grid");
        let layout = RasterLayout::for_grid(&grid, 5);
        assert_eq!(layout.dimensions(), (5, 5));
        assert_eq!(layout.cell_origin(HexCoord::new(0, 0)), Some((0, 0)));

        // Zero scale is clamped to one pixel
        assert_eq!(RasterLayout::for_grid(&grid, 0).scale(), 1);
    }

    // Tests terrain colours land on the assigned cells only
    #[test]
    fn test_render_map_colors() {
        let grid = HexGrid::build(1, 1).expect("Failed to build grid");
        let mut assignment = BTreeMap::new();
        assignment.insert(HexCoord::new(0, 0), Terrain::Water);

        let img = render_map(&grid, &assignment, 2);
        let layout = RasterLayout::for_grid(&grid, 2);
        let (x, y) = layout.cell_origin(HexCoord::new(0, 0)).expect("centre");
        assert_eq!(img.get_pixel(x, y).0, Terrain::Water.color());

        let (x, y) = layout.cell_origin(HexCoord::new(1, 0)).expect("neighbour");
        assert_eq!(img.get_pixel(x, y).0, UNRESOLVED_COLOR);
    }

    // Tests PNG file creation including missing parent directories
    // Verified by disabling file save operation
    #[test]
    fn test_export_map_as_png_creates_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output_path = dir.path().join("nested/out.png");
        let grid = HexGrid::build(2, 2).expect("Failed to build grid");
        let assignment: BTreeMap<_, _> = grid
            .coords()
            .iter()
            .map(|&coord| (coord, Terrain::Grass))
            .collect();

        export_map_as_png(&grid, &assignment, 3, &output_path).expect("export");
        assert!(output_path.exists(), "PNG file should be created");

        let saved = image::open(&output_path).expect("readable png").to_rgba8();
        assert_eq!(
            saved.dimensions(),
            RasterLayout::for_grid(&grid, 3).dimensions()
        );
    }
}
