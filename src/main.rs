//! Bounce Simulation Driver
//!
//! Runs a demo level through the deterministic core and checks that a replay
//! of the same inputs lands on the same state hash.
//!
//! Usage: `bounce-sim [config.json]`

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bounce_physics::{
    SimConfig, TICK_MS, VERSION,
    game::{
        events::GameEventData,
        input::{hash_recording, InputFrame, DIR_LEFT, DIR_RIGHT, DIR_UP},
        level::{Level, MovingObject},
        state::Simulation,
        tick::{replay, tick},
    },
    IVec2,
};

/// Demo ticks (one minute of play)
const DEMO_TICKS: u32 = 2000;

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => SimConfig::default(),
    }
    .with_env_overrides();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Bounce Physics v{}", VERSION);
    info!("Tick: {} ms", TICK_MS);

    demo_level(&config)
}

/// Build the demo level.
fn build_level() -> Result<Level> {
    let level = Level::from_ascii(&[
        "####################",
        "#..................#",
        "#..........o.......#",
        "#..C.......u....+..#",
        "#####..#########...#",
        "#..MM..#......4#...#",
        "#..MM..#...........#",
        "#......#..S....2..E#",
        "####################",
    ])?
    .with_respawn(1, 3)
    .with_moving_objects(vec![MovingObject::new(
        IVec2::new(1, 5),
        IVec2::new(7, 7),
        IVec2::new(2, 0),
    )])?;
    Ok(level)
}

/// Scripted input: roll right, hop now and then, occasionally back off.
fn scripted_input(t: u32) -> InputFrame {
    match t % 90 {
        0..=59 => InputFrame::new(DIR_RIGHT),
        60..=64 => InputFrame::new(DIR_RIGHT).with(DIR_UP),
        65..=79 => InputFrame::new(DIR_LEFT),
        _ => InputFrame::idle(),
    }
}

/// Run the demo level, then replay it and compare hashes.
fn demo_level(config: &SimConfig) -> Result<()> {
    info!("=== Starting Demo Level ===");

    let initial = Simulation::spawn(build_level()?, &config.session);
    info!(
        "Level {}x{}, {} ring(s), respawn {:?}",
        initial.level.width(),
        initial.level.height(),
        initial.level.total_rings(),
        initial.level.respawn()
    );

    let inputs: Vec<InputFrame> = (0..DEMO_TICKS).map(scripted_input).collect();
    info!("Input Recording Hash: {}", hex::encode(hash_recording(&inputs)));

    let mut sim = initial.clone();
    let mut total_events = 0;

    for input in &inputs {
        let result = tick(&mut sim, *input);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::RingCollected { tile } => {
                    info!("Tick {}: ring at {:?}", event.tick, tile);
                }
                GameEventData::CheckpointActivated { tile } => {
                    info!("Tick {}: checkpoint at {:?}", event.tick, tile);
                }
                GameEventData::LifeLost => {
                    info!("Tick {}: popped, {} lives left", event.tick, sim.session.lives);
                }
                _ => {}
            }
        }

        if sim.tick % 500 == 0 {
            info!(
                "Tick {}: ball at ({}, {}), score {}",
                sim.tick, sim.ball.position.x, sim.ball.position.y, sim.session.score
            );
        }

        if result.level_completed || result.game_over {
            break;
        }
    }

    // Print final results
    info!("=== Results ===");
    info!("Ticks: {}", sim.tick);
    info!("Score: {}", sim.session.score);
    info!("Lives: {}", sim.session.lives);
    info!("Level complete: {}", sim.session.level_complete);
    info!("Total events: {}", total_events);

    let hash = sim.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay(initial, &inputs);
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("replay diverged at tick {} vs {}", sim.tick, replayed.tick);
    }
    info!("Determinism verified: hashes match");
    Ok(())
}
