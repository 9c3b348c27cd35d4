//! Terminal progress display for generation attempts

use crate::algorithm::executor::{CollapseKind, CollapseObserver};
use crate::algorithm::propagation::Contradiction;
use crate::io::configuration::PROGRESS_BAR_WIDTH;
use crate::spatial::HexCoord;
use crate::terrain::Terrain;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static RUN_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} cells {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static ATTEMPT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Attempts: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates progress display across generation attempts
///
/// Shows one bar counting resolved cells of the current run and, when more
/// than one attempt is allowed, a second bar counting attempts.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    attempt_bar: Option<ProgressBar>,
    run_bar: Option<ProgressBar>,
    forced: u64,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            attempt_bar: None,
            run_bar: None,
            forced: 0,
        }
    }

    /// Prepare the attempt counter for up to `max_attempts` runs
    pub fn initialize(&mut self, max_attempts: usize) {
        if max_attempts > 1 {
            let bar = ProgressBar::new(max_attempts as u64);
            bar.set_style(ATTEMPT_STYLE.clone());
            self.attempt_bar = Some(self.multi_progress.add(bar));
        }
    }

    /// Reset the run bar for a fresh attempt over `cell_count` cells
    pub fn start_attempt(&mut self, attempt: usize, seed: u64, cell_count: usize) {
        if let Some(bar) = self.run_bar.take() {
            self.multi_progress.remove(&bar);
        }
        let bar = ProgressBar::new(cell_count as u64);
        bar.set_style(RUN_STYLE.clone());
        bar.set_prefix(format!("#{} seed {seed}", attempt + 1));
        self.run_bar = Some(self.multi_progress.add(bar));
        self.forced = 0;
    }

    /// Number of forced placements reported in the current attempt
    pub const fn forced_count(&self) -> u64 {
        self.forced
    }

    /// Resolved cells reported in the current attempt
    pub fn position(&self) -> u64 {
        self.run_bar.as_ref().map_or(0, ProgressBar::position)
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref bar) = self.attempt_bar {
            bar.finish_and_clear();
        }
        let _ = self.multi_progress.clear();
    }
}

impl CollapseObserver for ProgressManager {
    fn on_collapse(&mut self, _coord: HexCoord, _terrain: Terrain, kind: CollapseKind) {
        if kind == CollapseKind::Forced {
            self.forced += 1;
        }
        if let Some(ref bar) = self.run_bar {
            bar.inc(1);
        }
    }

    fn on_contradiction(&mut self, contradiction: &Contradiction) {
        if let Some(ref bar) = self.run_bar {
            bar.abandon_with_message(format!("contradiction at {}", contradiction.cell));
        }
        if let Some(ref bar) = self.attempt_bar {
            bar.inc(1);
        }
    }

    fn on_complete(&mut self, _resolved: usize) {
        if let Some(ref bar) = self.run_bar {
            bar.finish_with_message(format!("done ({} forced)", self.forced));
        }
        if let Some(ref bar) = self.attempt_bar {
            bar.inc(1);
        }
    }
}
