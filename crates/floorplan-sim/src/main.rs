//! Floor Plan Headless Optimization Harness
//!
//! Loads a layout scenario, runs the optimizer in-process and validates the
//! result. No rendering, no networking.
//!
//! Usage:
//!   cargo run -p floorplan-sim
//!   cargo run -p floorplan-sim -- scenario.json --mode aggressive --verbose
//!   RUST_LOG=floorplan_logic=debug cargo run -p floorplan-sim -- --delay-ms 0

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use floorplan_logic::constants::link_types;
use floorplan_logic::geometry::are_adjacent;
use floorplan_logic::grid::GridConfig;
use floorplan_logic::layout::{Layout, Room};
use floorplan_logic::optimizer::{
    run, validate_config, CancelToken, Mode, OptimizerConfig, RunSummary, Termination,
};
use floorplan_logic::satisfaction::evaluate_layout;
use floorplan_logic::validation::{
    check_pinned_unmoved, check_room_dimensions, check_room_overlaps,
    check_rooms_within_boundary, validate_all, Severity,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

// ── Demo scenario (used when no file is given) ──────────────────────────
const DEMO_JSON: &str = include_str!("../../../data/demo_layout.json");

#[derive(Debug, Parser)]
#[command(name = "floorplan-sim", version, about = "Run the room layout optimizer headless")]
struct Args {
    /// Layout scenario (JSON). The built-in demo runs when omitted.
    scenario: Option<PathBuf>,

    /// Optimization mode: conservative, aggressive or smart.
    #[arg(long, default_value_t = Mode::Smart)]
    mode: Mode,

    /// Override the mode's default iteration limit.
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Grid spacing in metres.
    #[arg(long, default_value_t = 1.0)]
    grid_spacing: f32,

    /// Snap room sizes to the grid before optimizing.
    #[arg(long)]
    snap_sizes: bool,

    /// Pause between steps, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Seed for initial scatter and optimizer jitter.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Only optimize rooms on this floor ("all" for every floor).
    #[arg(long, default_value = "all")]
    floor: String,

    /// Pin a room by code before the run. Repeatable.
    #[arg(long = "pin", value_name = "CODE")]
    pins: Vec<String>,

    /// Re-scatter unpinned rooms around the boundary centre before the run.
    #[arg(long)]
    reshuffle: bool,

    /// Print every check and per-room scores.
    #[arg(short, long)]
    verbose: bool,

    /// Print the final rooms as JSON on stdout.
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a RunSummary,
    rooms: &'a [Room],
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = OptimizerConfig {
        mode: args.mode,
        max_iterations: args.max_iterations,
        grid: GridConfig {
            spacing: args.grid_spacing,
            snap_sizes: args.snap_sizes,
            ..GridConfig::default()
        },
        step_delay_ms: args.delay_ms,
        seed: Some(args.seed),
        ..OptimizerConfig::default()
    };
    let problems = validate_config(&config);
    if !problems.is_empty() {
        for p in &problems {
            log::error!("config: {p}");
        }
        return Err(format!("{} configuration error(s)", problems.len()).into());
    }

    let mut layout = load_layout(&args)?;
    for code in &args.pins {
        let id = layout
            .room_by_code(code)
            .map(|r| r.id)
            .ok_or_else(|| format!("--pin: no room with code {code:?}"))?;
        layout.set_pinned(id, true)?;
    }
    if args.reshuffle {
        if layout.boundary().is_none() {
            log::warn!("--reshuffle needs a boundary; rooms keep their positions");
        }
        layout.reshuffle(&mut StdRng::seed_from_u64(args.seed));
    }
    if args.floor != "all" && !layout.floors().contains(&args.floor) {
        return Err(format!("--floor: no rooms on floor {:?}", args.floor).into());
    }

    println!("=== Floor Plan Optimization Harness ===\n");
    let stats = layout.stats();
    println!(
        "{} rooms, {} links, {:.1} m² total, {:.2} links/room",
        stats.total_rooms, stats.total_links, stats.total_area, stats.avg_links_per_room
    );
    println!(
        "mode {}, limit {} iterations, grid {} m, floor {}\n",
        config.mode,
        config.iteration_limit(),
        config.grid.spacing,
        args.floor
    );

    // ── Run ──
    let mut view = layout.floor_view(&args.floor);
    let before = view.rooms().to_vec();
    let tolerance = config.edge_tolerance;
    let summary = run(&mut view, config, CancelToken::new(), |report| {
        log::debug!(
            "iteration {:>3} phase {} {:5.1}%",
            report.iteration,
            report.phase.number(),
            report.percent()
        );
        if report.iteration % 10 == 0 {
            println!(
                "  [{:>3}] {:<18} {:5.1}%",
                report.iteration,
                report.phase.name(),
                report.percent()
            );
        }
    });
    let written = layout.apply_positions(&view);
    log::info!("wrote {written} room positions back to the layout");

    println!(
        "\n{} after {} iterations: {:.1}% (best {:.1}%)",
        summary.termination,
        summary.iterations,
        summary.aggregate * 100.0,
        summary.best_score * 100.0
    );
    for w in &summary.area_warnings {
        println!(
            "  area: {} ({}) {:.1} → {:.1} m² ({:+.1})",
            w.code, w.name, w.original_area, w.new_area, w.area_change
        );
    }

    if args.verbose {
        let sat = evaluate_layout(&view, tolerance);
        println!("\n--- Per-room satisfaction ---");
        for (i, r) in view.rooms().iter().enumerate() {
            println!(
                "  {:<6} {:<16} {:>5.0}%  ({:.0}, {:.0}) {}×{}{}",
                r.code,
                r.name,
                sat.ratio(i) * 100.0,
                r.x,
                r.y,
                r.width,
                r.height,
                if r.pinned { "  [pinned]" } else { "" }
            );
        }

        println!("\n--- Links ---");
        for r in view.rooms() {
            for link in view.links() {
                let Some(other) = link.other(r.id).filter(|&o| o > r.id) else {
                    continue;
                };
                let Some(o) = view.room(other) else {
                    continue;
                };
                let met = are_adjacent(&r.rect(), &o.rect(), tolerance);
                println!(
                    "  {:<6} – {:<6} {:<7} {}",
                    r.code,
                    o.code,
                    link_types::name(link.link_type),
                    if met { "met" } else { "open" }
                );
            }
        }
    }

    // ── Checks ──
    let results = check_run(&before, &view, &summary);

    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if args.json {
        let report = Report {
            summary: &summary,
            rooms: layout.rooms(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn load_layout(args: &Args) -> Result<Layout, Box<dyn Error>> {
    let text = match &args.scenario {
        Some(path) => {
            log::info!("loading scenario {}", path.display());
            fs::read_to_string(path)?
        }
        None => {
            log::info!("no scenario given, using the built-in demo");
            DEMO_JSON.to_string()
        }
    };
    Ok(Layout::from_json(&text, args.seed)?)
}

// ── Post-run checks ─────────────────────────────────────────────────────

fn check_run(before: &[Room], after: &Layout, summary: &RunSummary) -> Vec<TestResult> {
    let mut results = Vec::new();
    let rooms = after.rooms();

    results.push(TestResult {
        name: "run_finished".into(),
        passed: summary.termination != Termination::Cancelled,
        detail: format!("{} in {} iterations", summary.termination, summary.iterations),
    });

    results.push(TestResult {
        name: "score_in_range".into(),
        passed: (0.0..=1.0).contains(&summary.aggregate)
            && (0.0..=1.0).contains(&summary.best_score),
        detail: format!(
            "final {:.3}, best {:.3}",
            summary.aggregate, summary.best_score
        ),
    });

    let moved = check_pinned_unmoved(before, after);
    let pinned = after.pinned_ids().len();
    results.push(TestResult {
        name: "pinned_unmoved".into(),
        passed: moved.is_empty(),
        detail: if moved.is_empty() {
            format!("{pinned} pinned rooms held in place")
        } else {
            moved[0].message.clone()
        },
    });

    let geometry = check_room_dimensions(rooms);
    results.push(TestResult {
        name: "room_geometry".into(),
        passed: geometry.is_empty(),
        detail: geometry
            .first()
            .map_or_else(|| "all rooms finite and positive".into(), |e| e.message.clone()),
    });

    let overlaps = check_room_overlaps(rooms);
    results.push(TestResult {
        name: "no_overlaps".into(),
        passed: overlaps.is_empty(),
        detail: if overlaps.is_empty() {
            "no overlapping room pairs".into()
        } else {
            format!("{} overlaps, first: {}", overlaps.len(), overlaps[0].message)
        },
    });

    let outside: Vec<_> = check_rooms_within_boundary(rooms, after.boundary())
        .into_iter()
        .filter(|e| e.severity == Severity::Error)
        .collect();
    results.push(TestResult {
        name: "inside_boundary".into(),
        passed: outside.is_empty(),
        detail: match (after.boundary(), outside.first()) {
            (None, _) => "no boundary".into(),
            (Some(_), None) => "every movable room inside".into(),
            (Some(_), Some(e)) => format!("{} rooms outside, first: {}", outside.len(), e.message),
        },
    });

    // warnings only; errors are covered by the checks above
    let report = validate_all(after);
    let warnings = report
        .iter()
        .filter(|e| e.severity == Severity::Warning)
        .count();
    results.push(TestResult {
        name: "room_warnings".into(),
        passed: true,
        detail: format!("{warnings} warnings across {} findings", report.len()),
    });

    results
}
