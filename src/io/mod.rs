/// Command-line interface and attempt orchestration
pub mod cli;
/// Constants and defaults for generation and export
pub mod configuration;
/// Error types and result aliases
pub mod error;
/// PNG export of resolved maps
pub mod image;
/// Terminal progress bars
pub mod progress;
/// Adjacency rule file parsing
pub mod rules;
/// Animated GIF capture of a run
pub mod visualization;
