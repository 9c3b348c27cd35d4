//! Command-line interface for generating and exporting terrain maps

use crate::algorithm::executor::{GenerationConfig, GenerationRun, Pacing, RunState};
use crate::algorithm::propagation::Contradiction;
use crate::io::configuration::{
    DEFAULT_HEIGHT, DEFAULT_HEX_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT, DEFAULT_SEED,
    DEFAULT_STEP_DELAY_MS, DEFAULT_WIDTH, GIF_FRAME_DELAY_MS,
};
use crate::io::error::{GenerationError, Result, invalid_parameter};
use crate::io::image::export_map_as_png;
use crate::io::progress::ProgressManager;
use crate::io::rules::{format_rules, load_rules};
use crate::io::visualization::VisualizationCapture;
use crate::spatial::HexGrid;
use crate::terrain::AdjacencyRules;
use clap::Parser;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hexcollapse")]
#[command(
    author,
    version,
    about = "Generate hex terrain maps by greedy wave function collapse"
)]
/// Command-line arguments for the terrain generator
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Grid radius along the q axis
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH, allow_hyphen_values = true)]
    pub width: i32,

    /// Grid radius along the r axis
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT, allow_hyphen_values = true)]
    pub height: i32,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Pixel size of one hex in the exported images
    #[arg(long, default_value_t = DEFAULT_HEX_SIZE)]
    pub hex_size: f32,

    /// Adjacency rule file replacing the built-in table
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Fresh runs to try before giving up on contradictions
    #[arg(short, long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: usize,

    /// Pause between steps in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_STEP_DELAY_MS)]
    pub delay_ms: u64,

    /// Treat each propagation entry as its own step
    #[arg(short, long)]
    pub fine: bool,

    /// Output PNG path for the resolved map
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Also write an animated GIF of the collapse to this path
    #[arg(short, long, value_name = "GIF")]
    pub visualize: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the active rule table and exit
    #[arg(long)]
    pub dump_rules: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Step granularity selected by the flags
    pub const fn pacing(&self) -> Pacing {
        if self.fine {
            Pacing::PerPropagation
        } else {
            Pacing::PerCollapse
        }
    }

    /// Rule table from `--rules`, or the built-in one
    ///
    /// # Errors
    ///
    /// Returns an error if the rule file cannot be read or parsed
    pub fn rules(&self) -> Result<AdjacencyRules> {
        self.rules
            .as_deref()
            .map_or_else(|| Ok(AdjacencyRules::reference()), load_rules)
    }

    /// Generation configuration described by the flags
    ///
    /// # Errors
    ///
    /// Returns an error if the rule file is unusable or any value fails
    /// validation
    pub fn config(&self) -> Result<GenerationConfig> {
        let config = GenerationConfig::new(self.width, self.height)
            .with_seed(self.seed)
            .with_hex_size(self.hex_size)
            .with_step_delay(Duration::from_millis(self.delay_ms))
            .with_pacing(self.pacing())
            .with_rules(self.rules()?);
        config.validate()?;
        Ok(config)
    }
}

/// Runs generation attempts until one completes, then exports it
pub struct MapProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl MapProcessor {
    /// Create a new processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Generate and export a map according to the CLI arguments
    ///
    /// Each attempt is a fresh run seeded with `seed + attempt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, every attempt
    /// contradicts, or an export fails
    // Allow print for the rule dump, which is the command's output
    #[allow(clippy::print_stdout)]
    pub fn process(&mut self) -> Result<()> {
        if self.cli.dump_rules {
            print!("{}", format_rules(&self.cli.rules()?));
            return Ok(());
        }

        let config = self.cli.config()?;
        if self.cli.attempts == 0 {
            return Err(invalid_parameter(
                "attempts",
                &self.cli.attempts,
                &"at least one attempt is required",
            ));
        }
        let grid = config.build_grid()?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(self.cli.attempts);
        }

        let outcome = self.run_attempts(&config, &grid);

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        outcome
    }

    // Allow print for per-attempt feedback
    #[allow(clippy::print_stderr)]
    fn run_attempts(&mut self, config: &GenerationConfig, grid: &HexGrid) -> Result<()> {
        let scale = config.pixel_scale();
        let delay = config.step_delay;
        let mut last: Option<Contradiction> = None;
        let mut capture = self
            .cli
            .visualize
            .as_ref()
            .map(|_| VisualizationCapture::new(grid, scale));

        for attempt in 0..self.cli.attempts {
            let seed = config.seed.wrapping_add(attempt as u64);
            if let Some(ref mut pm) = self.progress_manager {
                pm.start_attempt(attempt, seed, grid.len());
            }
            if let Some(ref mut viz) = capture {
                viz.reset();
            }

            let mut run =
                GenerationRun::new(grid, &config.rules, seed).with_pacing(config.pacing);
            let mut observers = (self.progress_manager.as_mut(), capture.as_mut());
            let state = run.drive(&mut observers, |_| {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                ControlFlow::Continue(())
            })?;

            match state {
                RunState::Completed => {
                    let assignment = run.assignment().unwrap_or_default();
                    export_map_as_png(grid, &assignment, scale, &self.cli.output)?;
                    if let (Some(path), Some(viz)) = (&self.cli.visualize, &capture) {
                        viz.export_gif(path, GIF_FRAME_DELAY_MS)?;
                    }
                    return Ok(());
                }
                RunState::Contradicted(contradiction) => {
                    if !self.cli.quiet {
                        eprintln!(
                            "Attempt {} (seed {seed}) failed: {contradiction}",
                            attempt + 1
                        );
                    }
                    last = Some(contradiction);
                }
                RunState::Idle | RunState::Running | RunState::Cancelled => {}
            }
        }

        // Keep the failed animation, it shows where the last run broke
        if let (Some(path), Some(viz)) = (&self.cli.visualize, &capture) {
            viz.export_gif(path, GIF_FRAME_DELAY_MS)?;
        }

        Err(GenerationError::AttemptsExhausted {
            attempts: self.cli.attempts,
            last,
        })
    }
}
