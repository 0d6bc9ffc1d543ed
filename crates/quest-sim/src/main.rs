//! Quest simulator - drives a quest behavior against a scripted host.
//!
//! The host loop mirrors a game client's: hostiles notice the agent, asynchronous cast events
//! arrive between ticks, combat hooks run while fighting, and the behavior ticks otherwise.

mod world;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use ai_core::{Blackboard, TickContext};
use ai_quest::{CombatWorld, QuestBehavior, QuestBehaviorConfig, COMBAT_MAIN_SLOT};
use ai_tools::{LogSink, TraceSink, TRACE_SINK};

use world::SimWorld;

const DEFAULT_CONFIG: &str = include_str!("../quest.yaml");

#[derive(Parser)]
#[command(name = "quest-sim")]
#[command(about = "Run a quest behavior against a scripted host", version)]
struct Cli {
    /// Behavior config (YAML); the built-in vault scenario when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Interrupt the first cast still in progress at or after this tick
    #[arg(long)]
    interrupt_at: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn log_sink() -> Box<dyn TraceSink> {
    Box::new(LogSink)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    anyhow::ensure!(
        cli.dt.is_finite() && cli.dt > 0.0,
        "--dt must be a positive number of seconds, got {}",
        cli.dt
    );

    let config = match &cli.config {
        Some(path) => QuestBehaviorConfig::load(path)?,
        None => QuestBehaviorConfig::from_yaml_str(DEFAULT_CONFIG)
            .context("built-in scenario config")?,
    };

    run(config, &cli)
}

fn run(config: QuestBehaviorConfig, cli: &Cli) -> Result<()> {
    let mut world = SimWorld::scenario(cli.dt);
    let mut behavior = QuestBehavior::<SimWorld>::new(config);
    behavior.blackboard_mut().set(TRACE_SINK, log_sink());
    let mut host_blackboard = Blackboard::new();
    host_blackboard.set(TRACE_SINK, log_sink());

    if let Err(err) = behavior.on_start(&mut world) {
        behavior.on_stop(&mut world);
        return Err(err).context("behavior refused to start");
    }

    let mut ctx = TickContext::new(0, 0.0);
    let mut pending_interrupt = cli.interrupt_at;
    while ctx.tick < cli.ticks && !behavior.is_done(&world) {
        world.begin_tick(&ctx);

        if pending_interrupt.is_some_and(|at| ctx.tick >= at) && world.interrupt_cast()? {
            pending_interrupt = None;
        }

        if world.in_combat() {
            world.run_hooks(COMBAT_MAIN_SLOT, &ctx, &mut host_blackboard);
        } else {
            let status = behavior.tick(&ctx, &mut world);
            tracing::trace!(tick = ctx.tick, ?status, "behavior ticked");
        }

        world.advance();
        ctx = ctx.next(cli.dt);
    }

    let done = behavior.is_done(&world);
    let interactions = behavior.interactions_done();
    behavior.on_stop(&mut world);

    let stats = world.stats();
    let settings = world.host_settings();
    tracing::info!(
        ticks = ctx.tick,
        seconds = ctx.now_seconds,
        done,
        quest_complete = world.quest_complete(),
        interactions,
        interacts = stats.interacts,
        interrupts = stats.interrupts,
        kills = stats.kills,
        retargets = stats.retargets,
        move_commands = stats.move_commands,
        pull_distance = settings.pull_distance,
        kill_between_hotspots = settings.kill_between_hotspots,
        "simulation finished"
    );

    anyhow::ensure!(done, "behavior did not finish within {} ticks", cli.ticks);
    Ok(())
}
