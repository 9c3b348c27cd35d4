//! Generation constants and runtime configuration defaults

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid radius along either axial axis
pub const MAX_GRID_RADIUS: i32 = 1_000;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default grid width (radius along the q axis)
pub const DEFAULT_WIDTH: i32 = 10;

/// Default grid height (radius along the r axis)
pub const DEFAULT_HEIGHT: i32 = 10;

/// Default hex size, consumed only by the raster export
pub const DEFAULT_HEX_SIZE: f32 = 4.0;

/// Default number of fresh runs attempted before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Default pause between driver steps
pub const DEFAULT_STEP_DELAY_MS: u64 = 0;

// Output settings
/// Default file name for the resolved map
pub const DEFAULT_OUTPUT: &str = "terrain.png";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 5;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
/// Colour of cells not yet collapsed in exports
pub const UNRESOLVED_COLOR: [u8; 4] = [0, 0, 0, 0];
/// Colour marking the offending cell of a contradiction
pub const CONTRADICTION_COLOR: [u8; 4] = [220, 20, 60, 255];

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 30;
