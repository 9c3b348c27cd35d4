//! Steppable generation driver
//!
//! A [`GenerationRun`] moves through `Idle -> Running -> {Completed,
//! Contradicted, Cancelled}` one [`step`](GenerationRun::step) at a time and
//! reports committed cells to a [`CollapseObserver`].

use crate::{
    algorithm::propagation::{Contradiction, ForcedCell, Propagation},
    algorithm::selection::{RandomSelector, select_next},
    algorithm::store::PossibilityStore,
    io::configuration::{
        DEFAULT_HEIGHT, DEFAULT_HEX_SIZE, DEFAULT_SEED, DEFAULT_STEP_DELAY_MS, DEFAULT_WIDTH,
    },
    io::error::{GenerationError, Result, invalid_parameter},
    spatial::{CellId, HexCoord, HexGrid},
    terrain::{AdjacencyRules, Terrain},
};
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::time::Duration;

/// Granularity at which a run hands control back to its caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pacing {
    /// One step collapses a cell and propagates to a fixed point
    #[default]
    PerCollapse,
    /// Collapsing and each worklist entry of the ripple are separate steps
    PerPropagation,
}

/// Immutable parameters of a generation run
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Grid radius along the q axis
    pub width: i32,
    /// Grid radius along the r axis
    pub height: i32,
    /// Hex size in pixels, used only by the raster exports
    pub hex_size: f32,
    /// Seed for the random source
    pub seed: u64,
    /// Pause the caller should insert between steps
    pub step_delay: Duration,
    /// Step granularity
    pub pacing: Pacing,
    /// Adjacency rule table
    pub rules: AdjacencyRules,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl GenerationConfig {
    /// Configuration with default seed, pacing and reference rules
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            hex_size: DEFAULT_HEX_SIZE,
            seed: DEFAULT_SEED,
            step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
            pacing: Pacing::PerCollapse,
            rules: AdjacencyRules::reference(),
        }
    }

    /// Replace the seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the hex size
    #[must_use]
    pub const fn with_hex_size(mut self, hex_size: f32) -> Self {
        self.hex_size = hex_size;
        self
    }

    /// Replace the step delay
    #[must_use]
    pub const fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Replace the pacing
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Replace the adjacency rules
    #[must_use]
    pub fn with_rules(mut self, rules: AdjacencyRules) -> Self {
        self.rules = rules;
        self
    }

    /// Check every field before any grid is built
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are out of range or the hex size
    /// is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !self.hex_size.is_finite() || self.hex_size <= 0.0 {
            return Err(invalid_parameter(
                "hex_size",
                &self.hex_size,
                &"must be a positive finite number",
            ));
        }
        self.build_grid().map(|_| ())
    }

    /// Build the grid described by this configuration
    ///
    /// # Errors
    ///
    /// See [`HexGrid::build`].
    pub fn build_grid(&self) -> Result<HexGrid> {
        HexGrid::build(self.width, self.height)
    }

    /// Whole-pixel scale derived from the hex size
    pub fn pixel_scale(&self) -> u32 {
        self.hex_size.round().max(1.0) as u32
    }
}

/// Lifecycle of a generation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Created, no step taken yet
    Idle,
    /// At least one step taken, not finished
    Running,
    /// Every cell resolved
    Completed,
    /// Propagation emptied a cell
    Contradicted(Contradiction),
    /// Abandoned by the caller between steps
    Cancelled,
}

impl RunState {
    /// Whether no further steps will happen
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Contradicted(_) | Self::Cancelled
        )
    }
}

/// How a cell came to hold a single terrain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollapseKind {
    /// Picked by the selector
    Chosen,
    /// Narrowed to one terrain by propagation
    Forced,
}

/// A committed terrain assignment, in the order it happened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Cell coordinate
    pub coord: HexCoord,
    /// Committed terrain
    pub terrain: Terrain,
    /// Selector choice or propagation consequence
    pub kind: CollapseKind,
}

/// What a single call to [`GenerationRun::step`] did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepEvent {
    /// The selector collapsed a cell
    Collapsed {
        /// Collapsed cell
        coord: HexCoord,
        /// Chosen terrain
        terrain: Terrain,
        /// Cells forced by the propagation run within this step
        forced: Vec<ForcedCell>,
    },
    /// One worklist entry was processed
    Propagated {
        /// Dequeued cell
        source: HexCoord,
        /// Number of neighbours that shrank
        narrowed: usize,
        /// Neighbours that shrank to a single terrain
        forced: Vec<ForcedCell>,
    },
    /// Every cell is resolved
    Completed,
    /// Propagation emptied a cell; the run is over
    Contradicted(Contradiction),
}

/// Receiver of run notifications, typically a visual collaborator
///
/// Notifications are final: a cell reported through `on_collapse` keeps its
/// terrain even if the run later contradicts or is cancelled.
pub trait CollapseObserver {
    /// A cell was committed to a terrain
    fn on_collapse(&mut self, coord: HexCoord, terrain: Terrain, kind: CollapseKind);

    /// The run ended in a contradiction
    fn on_contradiction(&mut self, _contradiction: &Contradiction) {}

    /// The run resolved every cell
    fn on_complete(&mut self, _resolved: usize) {}
}

impl CollapseObserver for () {
    fn on_collapse(&mut self, _coord: HexCoord, _terrain: Terrain, _kind: CollapseKind) {}
}

impl<T: CollapseObserver + ?Sized> CollapseObserver for &mut T {
    fn on_collapse(&mut self, coord: HexCoord, terrain: Terrain, kind: CollapseKind) {
        (**self).on_collapse(coord, terrain, kind);
    }

    fn on_contradiction(&mut self, contradiction: &Contradiction) {
        (**self).on_contradiction(contradiction);
    }

    fn on_complete(&mut self, resolved: usize) {
        (**self).on_complete(resolved);
    }
}

impl<T: CollapseObserver> CollapseObserver for Option<T> {
    fn on_collapse(&mut self, coord: HexCoord, terrain: Terrain, kind: CollapseKind) {
        if let Some(observer) = self {
            observer.on_collapse(coord, terrain, kind);
        }
    }

    fn on_contradiction(&mut self, contradiction: &Contradiction) {
        if let Some(observer) = self {
            observer.on_contradiction(contradiction);
        }
    }

    fn on_complete(&mut self, resolved: usize) {
        if let Some(observer) = self {
            observer.on_complete(resolved);
        }
    }
}

impl<A: CollapseObserver, B: CollapseObserver> CollapseObserver for (A, B) {
    fn on_collapse(&mut self, coord: HexCoord, terrain: Terrain, kind: CollapseKind) {
        self.0.on_collapse(coord, terrain, kind);
        self.1.on_collapse(coord, terrain, kind);
    }

    fn on_contradiction(&mut self, contradiction: &Contradiction) {
        self.0.on_contradiction(contradiction);
        self.1.on_contradiction(contradiction);
    }

    fn on_complete(&mut self, resolved: usize) {
        self.0.on_complete(resolved);
        self.1.on_complete(resolved);
    }
}

/// Notification recorded by an [`EventLog`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservedEvent {
    /// A cell was committed
    Collapsed(Placement),
    /// The run contradicted
    Contradicted(Contradiction),
    /// The run completed with this many resolved cells
    Completed(usize),
}

/// Observer that records every notification in order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    /// Notifications in arrival order
    pub events: Vec<ObservedEvent>,
}

impl CollapseObserver for EventLog {
    fn on_collapse(&mut self, coord: HexCoord, terrain: Terrain, kind: CollapseKind) {
        self.events.push(ObservedEvent::Collapsed(Placement {
            coord,
            terrain,
            kind,
        }));
    }

    fn on_contradiction(&mut self, contradiction: &Contradiction) {
        self.events.push(ObservedEvent::Contradicted(*contradiction));
    }

    fn on_complete(&mut self, resolved: usize) {
        self.events.push(ObservedEvent::Completed(resolved));
    }
}

/// One greedy collapse of one grid
///
/// Borrows the grid and rule table, which outlive the run, and exclusively
/// owns the possibility store, the propagation worklist and the random
/// source. The run never advances on its own: each [`step`](Self::step)
/// performs one logical step and returns, so callers can pace, animate or
/// abandon the run between steps.
#[derive(Debug)]
pub struct GenerationRun<'a> {
    grid: &'a HexGrid,
    rules: &'a AdjacencyRules,
    store: PossibilityStore,
    propagation: Propagation,
    selector: RandomSelector,
    pacing: Pacing,
    state: RunState,
    history: Vec<Placement>,
    steps: usize,
}

impl<'a> GenerationRun<'a> {
    /// Create a run seeded from `seed`
    pub fn new(grid: &'a HexGrid, rules: &'a AdjacencyRules, seed: u64) -> Self {
        Self::with_selector(grid, rules, RandomSelector::new(seed))
    }

    /// Create a run drawing from an injected generator
    pub fn with_rng(grid: &'a HexGrid, rules: &'a AdjacencyRules, rng: StdRng) -> Self {
        Self::with_selector(grid, rules, RandomSelector::from_rng(rng))
    }

    /// Create a run using the rules, seed and pacing of `config`
    pub fn from_config(grid: &'a HexGrid, config: &'a GenerationConfig) -> Self {
        Self::new(grid, &config.rules, config.seed).with_pacing(config.pacing)
    }

    fn with_selector(
        grid: &'a HexGrid,
        rules: &'a AdjacencyRules,
        selector: RandomSelector,
    ) -> Self {
        Self {
            grid,
            rules,
            store: PossibilityStore::initialize(grid),
            propagation: Propagation::new(grid.len()),
            selector,
            pacing: Pacing::default(),
            state: RunState::Idle,
            history: Vec::with_capacity(grid.len()),
            steps: 0,
        }
    }

    /// Replace the step granularity
    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Current lifecycle state
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Whether the run has reached a terminal state
    pub const fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Read access to the possibility store
    pub const fn store(&self) -> &PossibilityStore {
        &self.store
    }

    /// The grid being generated
    pub const fn grid(&self) -> &'a HexGrid {
        self.grid
    }

    /// Every committed placement in the order it happened
    pub fn history(&self) -> &[Placement] {
        &self.history
    }

    /// Number of steps taken so far
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Cells waiting in the propagation worklist
    pub fn pending_propagation(&self) -> usize {
        self.propagation.pending()
    }

    /// Final coordinate to terrain mapping, available once completed
    pub fn assignment(&self) -> Option<BTreeMap<HexCoord, Terrain>> {
        if self.state != RunState::Completed {
            return None;
        }
        self.grid
            .cells()
            .map(|(cell, coord)| self.store.terrain(cell).map(|terrain| (coord, terrain)))
            .collect()
    }

    /// Abandon the run between steps
    ///
    /// Already emitted notifications stay valid; no further steps happen.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.propagation.clear();
            self.state = RunState::Cancelled;
        }
    }

    /// Perform one logical step
    ///
    /// Returns `Ok(None)` once the run is finished; the terminal
    /// [`StepEvent::Completed`] or [`StepEvent::Contradicted`] is returned
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns an error only for logic errors such as a collapse outside the
    /// cell's possibilities. Contradictions are reported as events.
    pub fn step<O>(&mut self, observer: &mut O) -> Result<Option<StepEvent>>
    where
        O: CollapseObserver + ?Sized,
    {
        match self.state {
            RunState::Idle => self.state = RunState::Running,
            RunState::Running => {}
            RunState::Completed | RunState::Contradicted(_) | RunState::Cancelled => {
                return Ok(None);
            }
        }
        self.steps += 1;

        if let Some(event) = self.propagate_once(observer)? {
            return Ok(Some(event));
        }

        let Some(cell) = select_next(&self.store) else {
            return Ok(Some(self.complete(observer)));
        };

        let terrain = self.selector.choose_category(cell, &self.store)?;
        self.store.collapse(cell, terrain)?;
        let coord = self.coord_of(cell)?;
        self.record(coord, terrain, CollapseKind::Chosen, observer);
        self.propagation.seed(cell);

        if self.pacing == Pacing::PerPropagation {
            return Ok(Some(StepEvent::Collapsed {
                coord,
                terrain,
                forced: Vec::new(),
            }));
        }

        let mut forced = Vec::new();
        loop {
            match self.propagation.step(self.grid, self.rules, &mut self.store) {
                Ok(Some(step)) => {
                    for placement in step.forced {
                        self.record(
                            placement.coord,
                            placement.terrain,
                            CollapseKind::Forced,
                            observer,
                        );
                        forced.push(placement);
                    }
                }
                Ok(None) => break,
                Err(GenerationError::Contradiction(contradiction)) => {
                    return Ok(Some(self.contradict(contradiction, observer)));
                }
                Err(other) => return Err(other),
            }
        }

        Ok(Some(StepEvent::Collapsed {
            coord,
            terrain,
            forced,
        }))
    }

    /// Step until finished or until `resume` asks to stop
    ///
    /// `resume` sees every event and returns [`ControlFlow::Break`] to cancel
    /// the run. Returns the state the run was left in.
    ///
    /// # Errors
    ///
    /// Propagates logic errors from [`step`](Self::step).
    pub fn drive<O, F>(&mut self, observer: &mut O, mut resume: F) -> Result<RunState>
    where
        O: CollapseObserver + ?Sized,
        F: FnMut(&StepEvent) -> ControlFlow<()>,
    {
        while let Some(event) = self.step(observer)? {
            if resume(&event).is_break() {
                self.cancel();
                break;
            }
        }
        Ok(self.state)
    }

    /// Step until finished, resuming immediately after every step
    ///
    /// # Errors
    ///
    /// Propagates logic errors from [`step`](Self::step).
    pub fn run_to_end<O>(&mut self, observer: &mut O) -> Result<RunState>
    where
        O: CollapseObserver + ?Sized,
    {
        self.drive(observer, |_| ControlFlow::Continue(()))
    }

    // `None` once the worklist is empty, so the caller moves on to selection
    fn propagate_once<O>(&mut self, observer: &mut O) -> Result<Option<StepEvent>>
    where
        O: CollapseObserver + ?Sized,
    {
        match self.propagation.step(self.grid, self.rules, &mut self.store) {
            Ok(Some(step)) => {
                for placement in &step.forced {
                    self.record(
                        placement.coord,
                        placement.terrain,
                        CollapseKind::Forced,
                        observer,
                    );
                }
                Ok(Some(StepEvent::Propagated {
                    source: self.coord_of(step.source)?,
                    narrowed: step.narrowed.len(),
                    forced: step.forced,
                }))
            }
            Ok(None) => Ok(None),
            Err(GenerationError::Contradiction(contradiction)) => {
                Ok(Some(self.contradict(contradiction, observer)))
            }
            Err(other) => Err(other),
        }
    }

    fn record<O>(&mut self, coord: HexCoord, terrain: Terrain, kind: CollapseKind, observer: &mut O)
    where
        O: CollapseObserver + ?Sized,
    {
        self.history.push(Placement {
            coord,
            terrain,
            kind,
        });
        observer.on_collapse(coord, terrain, kind);
    }

    fn complete<O>(&mut self, observer: &mut O) -> StepEvent
    where
        O: CollapseObserver + ?Sized,
    {
        self.state = RunState::Completed;
        observer.on_complete(self.store.resolved_count());
        StepEvent::Completed
    }

    fn contradict<O>(&mut self, contradiction: Contradiction, observer: &mut O) -> StepEvent
    where
        O: CollapseObserver + ?Sized,
    {
        self.state = RunState::Contradicted(contradiction);
        observer.on_contradiction(&contradiction);
        StepEvent::Contradicted(contradiction)
    }

    fn coord_of(&self, cell: CellId) -> Result<HexCoord> {
        self.grid.coord(cell).ok_or(GenerationError::UnknownCell {
            index: cell.index(),
            cell_count: self.grid.len(),
        })
    }
}
