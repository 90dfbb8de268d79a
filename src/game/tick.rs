//! Simulation Tick
//!
//! The fixed-timestep driver. Same simulation plus same input sequence gives
//! the same state hash, every time.

use tracing::{info, trace};

use crate::game::ball::Lifecycle;
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::state::Simulation;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// The level is complete (this tick or earlier)
    pub level_completed: bool,
    /// Lives are exhausted (this tick or earlier)
    pub game_over: bool,
    /// The ball died and was put back on the respawn tile this tick
    pub respawned: bool,
}

/// Run one simulation tick.
///
/// Once the level is complete or the game is over, further ticks change
/// nothing and only report the final flags.
pub fn tick(sim: &mut Simulation, input: InputFrame) -> TickResult {
    let mut result = TickResult::default();

    if sim.session.is_finished() {
        result.level_completed = sim.session.level_complete;
        result.game_over = sim.session.game_over;
        return result;
    }

    sim.tick += 1;

    // 1. Inputs (Down is not a movement key)
    sim.ball.direction = input.movement_bits();

    // 2. Physics; session effects are folded in on return
    sim.player_update();

    // 3. Death
    if sim.ball.lifecycle == Lifecycle::Dead {
        if sim.session.lives < 0 {
            sim.session.game_over = true;
            info!(tick = sim.tick, score = sim.session.score, "game over");
        } else {
            sim.respawn();
            result.respawned = true;
        }
    }

    // 4. Moving spikes
    sim.level.update_moving_objects();

    // 5. Exit door
    sim.session.advance_door();

    trace!(
        tick = sim.tick,
        x = sim.ball.position.x,
        y = sim.ball.position.y,
        vx = sim.ball.velocity.x,
        vy = sim.ball.velocity.y,
        lifecycle = ?sim.ball.lifecycle,
        "ball"
    );

    #[cfg(feature = "debug-tracing")]
    trace!(hash = %hex::encode(sim.compute_hash()), tick = sim.tick, "state hash");

    result.events = sim.take_events();
    result.level_completed = sim.session.level_complete;
    result.game_over = sim.session.game_over;
    result
}

/// Replay an input recording from a given simulation.
///
/// Stops early once the level is complete or the game is over. Returns the
/// final simulation and every event raised along the way.
pub fn replay(initial: Simulation, inputs: &[InputFrame]) -> (Simulation, Vec<GameEvent>) {
    let mut sim = initial;
    let mut all_events = sim.take_events();

    for &input in inputs {
        let result = tick(&mut sim, input);
        all_events.extend(result.events);

        if result.level_completed || result.game_over {
            break;
        }
    }

    (sim, all_events)
}
