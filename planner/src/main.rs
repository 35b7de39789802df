use adventure_planner::direction::to_route_string;
use adventure_planner::{plan_traversal, replay, Plan, RandomChooser, RoomId, Verification, World};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "adventure-planner")]
#[command(about = "Plans a walk that visits every room of a maze", long_about = None)]
struct Args {
    /// Map file (JSON, room id -> [[x, y], {"n": id, ...}])
    map: PathBuf,

    /// Starting room (defaults to the lowest room id)
    #[arg(long)]
    start: Option<RoomId>,

    /// Seed for the random exit choice; runs are reproducible when set
    #[arg(long, env = "PLANNER_SEED")]
    seed: Option<u64>,

    /// Plan this many times and keep the shortest complete walk
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    runs: u64,

    /// Print a JSON report instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    map: String,
    start: RoomId,
    seed: Option<u64>,
    plan: &'a Plan,
    route: String,
    verification: &'a Verification,
}

fn plan_once(world: &World, start: RoomId, seed: Option<u64>) -> Result<(Plan, Verification)> {
    let chooser = match seed {
        Some(seed) => RandomChooser::seeded(seed),
        None => RandomChooser::from_entropy(),
    };
    let plan = plan_traversal(world, start, chooser).context("planner failed")?;
    let verification = replay(world, start, &plan.moves).context("plan replay failed")?;
    Ok((plan, verification))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let world = World::load(&args.map, args.start)
        .with_context(|| format!("failed to load map {}", args.map.display()))?;
    let start = world.starting_room();
    info!(
        rooms = world.len(),
        connections = world.edge_count(),
        start,
        "map loaded"
    );

    let mut best: Option<(Plan, Verification, Option<u64>)> = None;
    for run in 0..args.runs {
        let seed = args.seed.map(|s| s.wrapping_add(run));
        let (plan, verification) = plan_once(&world, start, seed)?;
        info!(run, moves = plan.len(), passed = verification.passed(), "run finished");

        if !verification.passed() {
            warn!(run, unvisited = verification.unvisited(), "incomplete traversal");
        }
        let better = match &best {
            None => true,
            Some((best_plan, best_verification, _)) => {
                (verification.passed() && !best_verification.passed())
                    || (verification.passed() == best_verification.passed()
                        && plan.len() < best_plan.len())
            }
        };
        if better {
            best = Some((plan, verification, seed));
        }
    }

    let Some((plan, verification, seed)) = best else {
        anyhow::bail!("no run produced a plan");
    };

    if args.json {
        let report = Report {
            map: args.map.display().to_string(),
            start,
            seed,
            plan: &plan,
            route: to_route_string(&plan.moves),
            verification: &verification,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", to_route_string(&plan.moves));
        println!(
            "{} ({} backtracks, {} shortcuts, {} loops)",
            verification, plan.backtracks, plan.shortcuts, plan.loops
        );
    }

    if !verification.passed() {
        anyhow::bail!(
            "traversal incomplete: {} of {} rooms unvisited",
            verification.unvisited(),
            verification.total_rooms
        );
    }
    Ok(())
}
