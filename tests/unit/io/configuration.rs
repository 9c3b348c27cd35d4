//! Tests for generation constants and defaults

#[cfg(test)]
mod tests {
    use hexcollapse::io::configuration::{
        CONTRADICTION_COLOR, DEFAULT_HEIGHT, DEFAULT_HEX_SIZE, DEFAULT_MAX_ATTEMPTS,
        DEFAULT_OUTPUT, DEFAULT_SEED, DEFAULT_STEP_DELAY_MS, DEFAULT_WIDTH, GIF_FRAME_DELAY_MS,
        MAX_GRID_RADIUS, PROGRESS_BAR_WIDTH, UNRESOLVED_COLOR, VIEWER_MIN_FRAME_DELAY_MS,
    };
    use hexcollapse::terrain::Terrain;

    // Tests default grid dimensions lie within the allowed radius
    // Verified by raising defaults above the limit
    #[test]
    fn test_default_dimensions_within_limit() {
        assert!((0..=MAX_GRID_RADIUS).contains(&DEFAULT_WIDTH));
        assert!((0..=MAX_GRID_RADIUS).contains(&DEFAULT_HEIGHT));
    }

    #[test]
    fn test_default_values() {
        assert_eq!(DEFAULT_SEED, 42);
        assert_eq!(DEFAULT_MAX_ATTEMPTS, 10);
        assert_eq!(DEFAULT_STEP_DELAY_MS, 0);
        assert!(DEFAULT_HEX_SIZE >= 1.0);
        assert!(DEFAULT_OUTPUT.ends_with(".png"));
    }

    // Tests the GIF delay is raised to what viewers support
    #[test]
    fn test_frame_delay_relationship() {
        assert!(GIF_FRAME_DELAY_MS > 0);
        assert!(GIF_FRAME_DELAY_MS <= VIEWER_MIN_FRAME_DELAY_MS);
    }

    // Tests marker colours cannot be confused with terrain
    #[test]
    fn test_marker_colors_distinct_from_terrain() {
        for terrain in Terrain::ALL {
            assert_ne!(terrain.color(), UNRESOLVED_COLOR);
            assert_ne!(terrain.color(), CONTRADICTION_COLOR);
        }
        assert_eq!(UNRESOLVED_COLOR[3], 0);
    }

    #[test]
    fn test_progress_bar_width() {
        assert_eq!(PROGRESS_BAR_WIDTH, 30);
    }
}
