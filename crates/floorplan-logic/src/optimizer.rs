//! Optimization controller.
//!
//! An [`OptimizationRun`] owns the run state and advances a [`Layout`] one
//! iteration per [`OptimizationRun::step`] call. Callers drive it with their
//! own loop, or use [`run`], which sleeps the configured step delay between
//! iterations and stops on the first `Done`.
//!
//! Smart mode walks three phases keyed on iteration count:
//!
//! | Phase | Iterations | Bulk move |
//! |-------|------------|-----------|
//! | 1 global placement | `[0, phase2_at)` | pull badly connected rooms toward their neighbors |
//! | 2 overlap resolution | `[phase2_at, phase3_at)` | extra overlap passes |
//! | 3 fine tune | `phase3_at..` | guarded moves, micro-alignment |
//!
//! Conservative and aggressive runs stay in phase 1 throughout.
//!
//! Cancellation is checked once, at the top of each step. A step that has
//! started always runs to completion.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{AREA_TOLERANCE, EDGE_TOLERANCE, MIN_GRID_SPACING, UNITS_PER_METER};
use crate::constraints::{enforce_boundary, overlaps_any, resolve_overlaps, settle, OVERLAP_PASSES};
use crate::error::ConfigError;
use crate::forces::ForceConfig;
use crate::geometry::{are_adjacent, corners_inside, Point};
use crate::grid::{apply_size_snap, find_empty_cells, AreaWarning, Grid, GridConfig};
use crate::layout::{Layout, Room};
use crate::placement::{find_best_dock, find_blocked_rooms, try_swap};
use crate::satisfaction::{evaluate, is_isolated, unmet_neighbors, Satisfaction};

// ── Tuning ──────────────────────────────────────────────────────────────

/// Stagnation escapes only fire below this score.
const ESCAPE_BELOW: f32 = 0.95;
/// Rooms perturbed per stagnation escape.
const ESCAPE_ROOMS: usize = 8;
/// Isolated rooms sent to empty cells per escape.
const ESCAPE_CELL_ROOMS: usize = 3;
/// Empty-cell search spacing (layout units).
const ESCAPE_CELL_SPACING: f32 = 50.0;
/// Unsatisfied rooms considered for approach moves and docking.
const WORST_ROOMS: usize = 15;
/// Partially satisfied rooms get their own pull after this iteration.
const PARTIAL_AFTER: u32 = 20;
/// Per-step cap on the partial pull (layout units).
const PARTIAL_STEP_CAP: f32 = 30.0;
/// Docking starts after this iteration.
const DOCK_AFTER: u32 = 30;
/// Blocked rooms offered a swap per step.
const SWAP_ROOMS: usize = 5;
/// Swap partners must be closer than this (layout units).
const SWAP_RADIUS: f32 = 200.0;
/// Micro-alignment needs at least this aggregate score.
const MICRO_ALIGN_ABOVE: f32 = 0.9;
/// Residual wall gap micro-alignment will close (layout units).
const MICRO_ALIGN_WINDOW: f32 = 10.0;

// ── Mode / phase ────────────────────────────────────────────────────────

/// Optimization strategy. Exactly one is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Small moves, rolled back on violation. No docking or swapping.
    Conservative,
    /// Larger moves, never rolled back.
    Aggressive,
    /// The three-phase schedule.
    #[default]
    Smart,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Conservative, Mode::Aggressive, Mode::Smart];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Conservative => "conservative",
            Mode::Aggressive => "aggressive",
            Mode::Smart => "smart",
        }
    }

    pub fn default_max_iterations(self) -> u32 {
        match self {
            Mode::Smart => 150,
            _ => 100,
        }
    }

    /// Fraction of the distance to the nearest unmet neighbor covered per step.
    fn approach_fraction(self, phase: Phase) -> f32 {
        match (self, phase) {
            (Mode::Aggressive, _) => 0.2,
            (Mode::Smart, Phase::GlobalPlacement) => 0.15,
            _ => 0.1,
        }
    }

    /// Fraction of the way to a dock candidate covered per step.
    fn dock_fraction(self) -> f32 {
        match self {
            Mode::Smart => 0.3,
            _ => 0.5,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    GlobalPlacement,
    OverlapResolution,
    FineTune,
}

impl Phase {
    pub fn number(self) -> u8 {
        match self {
            Phase::GlobalPlacement => 1,
            Phase::OverlapResolution => 2,
            Phase::FineTune => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::GlobalPlacement => "global placement",
            Phase::OverlapResolution => "overlap resolution",
            Phase::FineTune => "fine tune",
        }
    }
}

// ── Configuration ───────────────────────────────────────────────────────

/// Per-run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub mode: Mode,
    /// Iteration cap (None = mode default: 150 smart, 100 otherwise).
    pub max_iterations: Option<u32>,
    /// Wall-gap tolerance for adjacency (layout units).
    pub edge_tolerance: f32,
    /// Relative area deviation accepted by size snapping.
    pub area_tolerance: f32,
    pub grid: GridConfig,
    /// Link attraction and centring applied every tick.
    pub forces: ForceConfig,
    /// Pause between steps when driven by [`run`].
    pub step_delay_ms: u64,
    /// First iteration of phase 2 (smart mode).
    pub phase2_at: u32,
    /// First iteration of phase 3 (smart mode).
    pub phase3_at: u32,
    /// Aggregate score that ends the run as converged.
    pub target_score: f32,
    /// Score change below which an iteration counts as stagnant.
    pub stagnation_epsilon: f32,
    /// Stagnant iterations tolerated before an escape.
    pub stagnation_limit: u32,
    /// RNG seed for perturbations (None = from entropy).
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Smart,
            max_iterations: None,
            edge_tolerance: EDGE_TOLERANCE,
            area_tolerance: AREA_TOLERANCE,
            grid: GridConfig::default(),
            forces: ForceConfig::default(),
            step_delay_ms: 50,
            phase2_at: 30,
            phase3_at: 60,
            target_score: 0.99,
            stagnation_epsilon: 0.005,
            stagnation_limit: 10,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    pub fn iteration_limit(&self) -> u32 {
        self.max_iterations
            .unwrap_or_else(|| self.mode.default_max_iterations())
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Largest approach move per step (layout units).
    fn approach_cap(&self) -> f32 {
        self.grid.spacing.max(MIN_GRID_SPACING) * UNITS_PER_METER * 2.0
    }
}

/// Validate an optimizer configuration.
pub fn validate_config(config: &OptimizerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !(config.grid.spacing >= MIN_GRID_SPACING) {
        errors.push(ConfigError::GridSpacingTooSmall(config.grid.spacing));
    }
    if !(config.edge_tolerance >= 0.0) {
        errors.push(ConfigError::NegativeEdgeTolerance(config.edge_tolerance));
    }
    if !(0.0..=1.0).contains(&config.area_tolerance) {
        errors.push(ConfigError::AreaToleranceOutOfRange(config.area_tolerance));
    }
    if config.max_iterations == Some(0) {
        errors.push(ConfigError::ZeroIterations);
    }
    if config.phase2_at > config.phase3_at {
        errors.push(ConfigError::PhaseThresholdsInverted(
            config.phase2_at,
            config.phase3_at,
        ));
    }
    if !(config.target_score > 0.0 && config.target_score <= 1.0) {
        errors.push(ConfigError::TargetScoreOutOfRange(config.target_score));
    }
    let forces = &config.forces;
    for (name, value) in [
        ("link strength", forces.link_strength),
        ("centre strength", forces.center_strength),
        ("velocity decay", forces.velocity_decay),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::ForceOutOfRange(name, value));
        }
    }

    errors
}

// ── Cancellation ────────────────────────────────────────────────────────

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ── State / reports ─────────────────────────────────────────────────────

/// Mutable run state. Lives only as long as its run.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationState {
    pub iteration: u32,
    pub phase: Phase,
    pub stagnation: u32,
    pub previous_score: f32,
    pub best_score: f32,
}

impl Default for OptimizationState {
    fn default() -> Self {
        Self {
            iteration: 0,
            phase: Phase::GlobalPlacement,
            stagnation: 0,
            previous_score: 0.0,
            best_score: 0.0,
        }
    }
}

/// What one iteration saw: scores are taken before that iteration's moves.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub iteration: u32,
    pub phase: Phase,
    pub aggregate: f32,
    pub per_room: HashMap<u32, f32>,
}

impl StepReport {
    pub fn percent(&self) -> f32 {
        self.aggregate * 100.0
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Converged,
    MaxIterations,
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Termination::Converged => "converged",
            Termination::MaxIterations => "iteration limit reached",
            Termination::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Continue(StepReport),
    Done(Termination),
}

/// Result of a [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub termination: Termination,
    pub iterations: u32,
    /// Aggregate score of the final layout.
    pub aggregate: f32,
    pub best_score: f32,
    pub area_warnings: Vec<AreaWarning>,
}

// ── Controller ──────────────────────────────────────────────────────────

/// One optimization run. Not reusable: start a new run for a new attempt.
pub struct OptimizationRun {
    config: OptimizerConfig,
    state: OptimizationState,
    cancel: CancelToken,
    rng: StdRng,
    started: bool,
    area_warnings: Vec<AreaWarning>,
}

impl OptimizationRun {
    pub fn new(config: OptimizerConfig, cancel: CancelToken) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            state: OptimizationState::default(),
            cancel,
            rng,
            started: false,
            area_warnings: Vec::new(),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn state(&self) -> &OptimizationState {
        &self.state
    }

    /// Whether the first step has run (the run has left idle).
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Warnings from size snapping at the start of the run.
    pub fn area_warnings(&self) -> &[AreaWarning] {
        &self.area_warnings
    }

    fn start(&mut self, layout: &mut Layout) {
        if self.config.grid.snap_sizes {
            self.area_warnings =
                apply_size_snap(layout, self.config.grid.spacing, self.config.area_tolerance);
            if !self.area_warnings.is_empty() {
                log::info!(
                    "{} rooms miss their target area after size snapping",
                    self.area_warnings.len()
                );
            }
        }
        log::info!(
            "optimizing {} rooms, {} links ({} mode, up to {} iterations)",
            layout.rooms().len(),
            layout.links().len(),
            self.config.mode,
            self.config.iteration_limit()
        );
        self.started = true;
    }

    /// Run one iteration.
    pub fn step(&mut self, layout: &mut Layout) -> StepOutcome {
        if self.cancel.is_cancelled() {
            log::info!("optimization cancelled at iteration {}", self.state.iteration);
            return StepOutcome::Done(Termination::Cancelled);
        }
        if !self.started {
            self.start(layout);
        }

        let tolerance = self.config.edge_tolerance;
        let neighbors = layout.neighbor_indices();
        let sat = evaluate(layout.rooms(), &neighbors, tolerance);
        let aggregate = sat.aggregate;
        self.state.best_score = self.state.best_score.max(aggregate);

        let iteration = self.state.iteration;
        let limit = self.config.iteration_limit();
        if aggregate >= self.config.target_score {
            log::info!(
                "converged at iteration {} ({:.1}%)",
                iteration,
                sat.percent()
            );
            return StepOutcome::Done(Termination::Converged);
        }
        if iteration >= limit {
            log::info!(
                "stopped after {} iterations at {:.1}% (best {:.1}%)",
                iteration,
                sat.percent(),
                self.state.best_score * 100.0
            );
            return StepOutcome::Done(Termination::MaxIterations);
        }
        log::trace!(
            "iteration {} ({}): {:.1}%",
            iteration,
            self.state.phase.name(),
            sat.percent()
        );

        let per_room = sat.by_id(layout.rooms());
        let temperature = (1.0 - iteration as f32 / limit as f32).max(0.1);
        if (aggregate - self.state.previous_score).abs() < self.config.stagnation_epsilon {
            self.state.stagnation += 1;
        } else {
            self.state.stagnation = 0;
        }

        let grid = Grid::for_layout(layout, self.config.grid.spacing);
        let snap = grid.filter(|_| self.config.grid.snap_positions);
        let boundary = layout.boundary().map(<[Point]>::to_vec);
        let mut tick = Tick {
            rooms: layout.rooms_mut(),
            neighbors: &neighbors,
            boundary: boundary.as_deref(),
            grid,
            snap,
            tolerance,
        };

        if self.state.stagnation > self.config.stagnation_limit && aggregate < ESCAPE_BELOW {
            self.escape(&mut tick, &sat, temperature);
            self.state.stagnation = 0;
        }
        if self.config.mode == Mode::Smart {
            self.advance_phase(&mut tick, &sat);
        }

        let worst = worst_rooms(&sat);
        let phase = self.state.phase;
        let mode = self.config.mode;

        if iteration > PARTIAL_AFTER {
            pull_partial(&mut tick, &sat);
        }
        if mode != Mode::Conservative && iteration > DOCK_AFTER {
            dock_neighbors(&mut tick, &worst, mode.dock_fraction(), phase == Phase::FineTune);
        }
        if mode != Mode::Conservative {
            swap_blocked(&mut tick);
        }
        self.approach(&mut tick, &worst, temperature);
        if phase != Phase::GlobalPlacement || mode == Mode::Conservative {
            resolve_overlaps(tick.rooms, OVERLAP_PASSES);
        }
        if phase == Phase::FineTune && aggregate > MICRO_ALIGN_ABOVE {
            micro_align(&mut tick, &sat);
        }

        settle(
            tick.rooms,
            &neighbors,
            tick.boundary,
            tick.snap.as_ref(),
            &self.config.forces,
            tolerance,
        );

        self.state.previous_score = aggregate;
        self.state.iteration += 1;
        StepOutcome::Continue(StepReport {
            iteration,
            phase,
            aggregate,
            per_room,
        })
    }

    /// Shake up a stalled layout: jump the worst rooms near their
    /// neighbors and send isolated rooms to open space.
    fn escape(&mut self, t: &mut Tick<'_>, sat: &Satisfaction, temperature: f32) {
        log::debug!(
            "stagnant at {:.1}% (iteration {}), perturbing at T = {:.2}",
            sat.percent(),
            self.state.iteration,
            temperature
        );
        let neighbors = t.neighbors;

        let mut problem: Vec<usize> = (0..t.rooms.len())
            .filter(|&i| sat.ratio(i) < 1.0 && !t.rooms[i].pinned)
            .collect();
        problem.sort_by(|&a, &b| {
            let (sa, sb) = (sat.ratio(a), sat.ratio(b));
            (sa >= 0.5).cmp(&(sb >= 0.5)).then(sa.total_cmp(&sb))
        });
        problem.truncate(ESCAPE_ROOMS);

        for i in problem {
            let linked = &neighbors[i];
            let Some(center) = t.centroid(linked) else {
                continue;
            };

            if sat.ratio(i) >= 0.5 {
                // nearly there: step straight to flush distance on the dominant axis
                for &j in linked {
                    if t.adjacent(i, j) {
                        continue;
                    }
                    let (a, b) = (&t.rooms[i], &t.rooms[j]);
                    let dx = b.x - a.x;
                    let dy = b.y - a.y;
                    let flush_x = (a.width + b.width) / 2.0;
                    let flush_y = (a.height + b.height) / 2.0;
                    if dx.abs() > dy.abs() {
                        t.rooms[i].x += dx - dx.signum() * flush_x;
                    } else if dy != 0.0 {
                        t.rooms[i].y += dy - dy.signum() * flush_y;
                    }
                }
            } else {
                let jump = 100.0 * temperature + 50.0;
                let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                let target = Point::new(center.x + angle.cos() * jump, center.y + angle.sin() * jump);
                move_toward(&mut t.rooms[i], target, 0.5 + temperature * 0.3);
            }

            let anchor = t.rooms[i].center();
            for &j in linked {
                if !t.rooms[j].pinned && !t.adjacent(i, j) {
                    move_toward(&mut t.rooms[j], anchor, 0.1);
                }
            }
        }

        let Some(grid) = t.grid else {
            return;
        };
        let cells = find_empty_cells(t.rooms(), &grid.bounds, ESCAPE_CELL_SPACING);
        let isolated: Vec<usize> = (0..t.rooms.len())
            .filter(|&i| {
                sat.ratio(i) < 1.0
                    && !t.rooms[i].pinned
                    && is_isolated(t.rooms(), &neighbors[i], i, t.tolerance)
            })
            .take(ESCAPE_CELL_ROOMS)
            .collect();
        for (i, cell) in isolated.into_iter().zip(cells) {
            move_toward(&mut t.rooms[i], cell, 0.7);
        }
    }

    fn advance_phase(&mut self, t: &mut Tick<'_>, sat: &Satisfaction) {
        let iteration = self.state.iteration;
        match self.state.phase {
            Phase::GlobalPlacement if iteration < self.config.phase2_at => {
                pull_toward_neighbors(t, sat);
            }
            Phase::GlobalPlacement => self.enter(Phase::OverlapResolution),
            Phase::OverlapResolution if iteration < self.config.phase3_at => {
                resolve_overlaps(t.rooms, OVERLAP_PASSES);
                resolve_overlaps(t.rooms, OVERLAP_PASSES);
            }
            Phase::OverlapResolution => self.enter(Phase::FineTune),
            Phase::FineTune => {}
        }
    }

    fn enter(&mut self, phase: Phase) {
        log::info!(
            "phase {} ({}) at iteration {}",
            phase.number(),
            phase.name(),
            self.state.iteration
        );
        self.state.phase = phase;
    }

    /// Move each of the worst rooms a bounded step toward its nearest
    /// unmet neighbor.
    fn approach(&mut self, t: &mut Tick<'_>, worst: &[usize], temperature: f32) {
        let mode = self.config.mode;
        let phase = self.state.phase;
        let boost = if self.state.stagnation > 5 {
            1.0 + temperature
        } else {
            1.0
        };
        let fraction = mode.approach_fraction(phase);
        let cap = self.config.approach_cap();
        let guarded = mode == Mode::Conservative || phase == Phase::FineTune;

        for &i in worst {
            if t.rooms[i].pinned {
                continue;
            }
            let here = t.rooms[i].center();
            let closest = t
                .unmet(i)
                .into_iter()
                .map(|j| (here.distance(t.rooms[j].center()), j))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            let Some((distance, j)) = closest else {
                continue;
            };
            if distance == 0.0 {
                continue;
            }

            let target = t.rooms[j].center();
            let step = (distance * fraction * boost).min(cap);
            let mut next = here.translated(
                (target.x - here.x) / distance * step,
                (target.y - here.y) / distance * step,
            );
            if phase != Phase::GlobalPlacement {
                if let Some(grid) = t.snap {
                    let r = &t.rooms[i];
                    next = grid.snap_rect(next.x, next.y, r.width, r.height);
                }
            }

            t.rooms[i].set_center(next);
            if guarded
                && (!corners_inside(&t.rooms[i].rect(), t.boundary) || overlaps_any(t.rooms(), i))
            {
                t.rooms[i].set_center(here);
            }
        }
    }
}

/// Drive a run to completion, sleeping the configured delay between steps.
/// `observer` sees every completed step.
pub fn run(
    layout: &mut Layout,
    config: OptimizerConfig,
    cancel: CancelToken,
    mut observer: impl FnMut(&StepReport),
) -> RunSummary {
    let delay = config.step_delay();
    let tolerance = config.edge_tolerance;
    let mut run = OptimizationRun::new(config, cancel);

    let termination = loop {
        match run.step(layout) {
            StepOutcome::Continue(report) => {
                observer(&report);
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
            StepOutcome::Done(termination) => break termination,
        }
    };

    let aggregate = evaluate(layout.rooms(), &layout.neighbor_indices(), tolerance).aggregate;
    RunSummary {
        termination,
        iterations: run.state.iteration,
        aggregate,
        best_score: run.state.best_score.max(aggregate),
        area_warnings: run.area_warnings,
    }
}

// ── Step helpers ────────────────────────────────────────────────────────

/// Borrowed view of everything one step works on.
struct Tick<'a> {
    rooms: &'a mut [Room],
    neighbors: &'a [Vec<usize>],
    boundary: Option<&'a [Point]>,
    /// Grid for the layout, if it has a boundary.
    grid: Option<Grid>,
    /// Same grid, only when position snapping is on.
    snap: Option<Grid>,
    tolerance: f32,
}

impl Tick<'_> {
    fn rooms(&self) -> &[Room] {
        &*self.rooms
    }

    fn adjacent(&self, i: usize, j: usize) -> bool {
        are_adjacent(&self.rooms[i].rect(), &self.rooms[j].rect(), self.tolerance)
    }

    fn unmet(&self, i: usize) -> Vec<usize> {
        unmet_neighbors(self.rooms(), &self.neighbors[i], i, self.tolerance)
    }

    fn centroid(&self, indices: &[usize]) -> Option<Point> {
        if indices.is_empty() {
            return None;
        }
        let n = indices.len() as f32;
        let (sx, sy) = indices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &j| (sx + self.rooms[j].x, sy + self.rooms[j].y));
        Some(Point::new(sx / n, sy / n))
    }
}

fn move_toward(room: &mut Room, target: Point, fraction: f32) {
    room.x += (target.x - room.x) * fraction;
    room.y += (target.y - room.y) * fraction;
}

/// Unsatisfied rooms, worst first.
fn worst_rooms(sat: &Satisfaction) -> Vec<usize> {
    let mut rooms: Vec<usize> = (0..sat.ratios.len())
        .filter(|&i| sat.ratio(i) < 1.0)
        .collect();
    rooms.sort_by(|&a, &b| sat.ratio(a).total_cmp(&sat.ratio(b)));
    rooms.truncate(WORST_ROOMS);
    rooms
}

/// Phase 1 bulk move: rooms under half satisfied drift toward the centroid
/// of their neighbors, then get a boundary check.
fn pull_toward_neighbors(t: &mut Tick<'_>, sat: &Satisfaction) {
    let mut rooms: Vec<usize> = (0..t.rooms.len())
        .filter(|&i| sat.ratio(i) < 0.5 && !t.rooms[i].pinned)
        .collect();
    rooms.sort_by(|&a, &b| sat.ratio(a).total_cmp(&sat.ratio(b)));

    for i in rooms {
        let Some(center) = t.centroid(&t.neighbors[i]) else {
            continue;
        };
        move_toward(&mut t.rooms[i], center, 0.2);
        enforce_boundary(&mut t.rooms[i..=i], t.boundary);
    }
}

/// Rooms that are at least half satisfied pull hard toward each neighbor
/// they still miss.
fn pull_partial(t: &mut Tick<'_>, sat: &Satisfaction) {
    let neighbors = t.neighbors;
    for i in 0..t.rooms.len() {
        let s = sat.ratio(i);
        if !(0.5..1.0).contains(&s) || t.rooms[i].pinned {
            continue;
        }
        for &j in &neighbors[i] {
            if t.adjacent(i, j) {
                continue;
            }
            let dx = t.rooms[j].x - t.rooms[i].x;
            let dy = t.rooms[j].y - t.rooms[i].y;
            let d = dx.hypot(dy);
            if d == 0.0 {
                continue;
            }
            let step = (d * (0.15 + (1.0 - s) * 0.2)).min(PARTIAL_STEP_CAP);
            t.rooms[i].x += dx / d * step;
            t.rooms[i].y += dy / d * step;
        }
    }
}

/// Ease unmet neighbors of the worst rooms toward a flush dock.
fn dock_neighbors(t: &mut Tick<'_>, worst: &[usize], fraction: f32, snap: bool) {
    let neighbors = t.neighbors;
    for &i in worst {
        if t.rooms[i].pinned {
            continue;
        }
        for &j in &neighbors[i] {
            if t.rooms[j].pinned || t.adjacent(i, j) {
                continue;
            }
            let Some(dock) = find_best_dock(t.rooms(), i, j, t.tolerance) else {
                continue;
            };
            move_toward(&mut t.rooms[j], dock.position, fraction);
            if snap {
                if let Some(grid) = t.snap {
                    let p = grid.snap_room(&t.rooms[j]);
                    t.rooms[j].set_center(p);
                }
            }
        }
    }
}

/// Offer blocked rooms a swap with a nearby unpinned room.
fn swap_blocked(t: &mut Tick<'_>) {
    let blocked = find_blocked_rooms(t.rooms(), t.neighbors, t.tolerance);
    for b in blocked.into_iter().take(SWAP_ROOMS) {
        for o in 0..t.rooms.len() {
            if o == b || t.rooms[o].pinned {
                continue;
            }
            if t.rooms[b].center().distance(t.rooms[o].center()) >= SWAP_RADIUS {
                continue;
            }
            if try_swap(t.rooms, t.neighbors, b, o, t.tolerance) {
                break;
            }
        }
    }
}

/// Close small residual wall gaps of nearly satisfied rooms.
fn micro_align(t: &mut Tick<'_>, sat: &Satisfaction) {
    let neighbors = t.neighbors;
    for i in 0..t.rooms.len() {
        let s = sat.ratio(i);
        if !(s > 0.8 && s < 1.0) || t.rooms[i].pinned {
            continue;
        }
        for &j in &neighbors[i] {
            if t.adjacent(i, j) {
                continue;
            }
            let (a, b) = (&t.rooms[i], &t.rooms[j]);
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let gap_x = dx.abs() - (a.width + b.width) / 2.0;
            let gap_y = dy.abs() - (a.height + b.height) / 2.0;
            let other_pinned = b.pinned;

            if gap_x.abs() < MICRO_ALIGN_WINDOW {
                let shift = dx.signum() * gap_x;
                if other_pinned {
                    t.rooms[i].x += shift;
                } else {
                    t.rooms[i].x += shift / 2.0;
                    t.rooms[j].x -= shift / 2.0;
                }
            }
            if gap_y.abs() < MICRO_ALIGN_WINDOW {
                let shift = dy.signum() * gap_y;
                if other_pinned {
                    t.rooms[i].y += shift;
                } else {
                    t.rooms[i].y += shift / 2.0;
                    t.rooms[j].y -= shift / 2.0;
                }
            }
        }
    }
}
