//! Simulation State
//!
//! The explicitly owned simulation value: ball, level, session and tick
//! counter. Every physics entry point goes through here so that events are
//! stamped, queued and folded into the session the same way.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::config::SessionConfig;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::vec2::IVec2;
use crate::game::ball::{Ball, SizeState};
use crate::game::collision::{self, CollisionOutcome, PhysicsContext};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::level::Level;
use crate::game::physics;
use crate::game::session::GameSession;
use crate::game::tile::TILE_SIZE;

/// One independent simulation instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Simulation {
    /// Ticks run so far
    pub tick: u32,
    /// The player ball
    pub ball: Ball,
    /// Tile grid, moving objects and respawn point
    pub level: Level,
    /// Score, lives, rings and door
    pub session: GameSession,
    /// Events not yet handed to the caller
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl Simulation {
    /// Wrap a level. The ball is not placed until [`Simulation::player_init`].
    pub fn new(level: Level, config: &SessionConfig) -> Self {
        let session = GameSession::new(config, level.total_rings());
        Self {
            tick: 0,
            ball: Ball::new(),
            level,
            session,
            pending_events: Vec::new(),
        }
    }

    /// Wrap a level and drop a small ball on its respawn tile.
    pub fn spawn(level: Level, config: &SessionConfig) -> Self {
        let mut sim = Self::new(level, config);
        let position = sim.respawn_position(SizeState::Small);
        sim.player_init(position, SizeState::Small);
        sim
    }

    /// Pixel center of the respawn tile for a ball of `size`.
    pub fn respawn_position(&self, size: SizeState) -> IVec2 {
        let tile = self.level.respawn();
        IVec2::new(
            tile.x * TILE_SIZE + size.half(),
            tile.y * TILE_SIZE + size.half(),
        )
    }

    /// Place the ball at `position` with `size` and reset its state.
    pub fn player_init(&mut self, position: IVec2, size: SizeState) {
        let mut events = Vec::new();
        {
            let mut ctx = PhysicsContext::new(&mut self.level, &self.session, &mut events);
            physics::player_init(&mut self.ball, &mut ctx, position, size);
        }
        self.absorb(events);
    }

    /// Advance the ball one tick.
    pub fn player_update(&mut self) {
        let mut events = Vec::new();
        {
            let mut ctx = PhysicsContext::new(&mut self.level, &self.session, &mut events);
            physics::player_update(&mut self.ball, &mut ctx);
        }
        self.absorb(events);
    }

    /// Test the ball at `(x, y)`, applying tile effects.
    ///
    /// The outcome carries the events raised by this test; they are also
    /// queued and applied to the session.
    pub fn test_move(&mut self, x: i32, y: i32) -> CollisionOutcome {
        let outcome = collision::test_move(&mut self.ball, &mut self.level, &self.session, x, y);
        self.absorb(outcome.events.clone());
        outcome
    }

    /// Re-initialize a dead ball on the respawn tile, keeping its size.
    pub fn respawn(&mut self) {
        let size = self.ball.size;
        let position = self.respawn_position(size);
        debug!(tick = self.tick, x = position.x, y = position.y, "ball respawned");
        self.player_init(position, size);
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Compute a deterministic hash of the whole simulation.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            self.ball.hash_into(hasher);
            self.level.hash_into(hasher);
            self.session.hash_into(hasher);
        })
    }

    /// Session effects are applied after the physics call returns.
    fn absorb(&mut self, events: Vec<GameEventData>) {
        for data in events {
            self.session.apply(&data);
            self.pending_events.push(GameEvent::new(self.tick, data));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ball::Lifecycle;
    use crate::game::session::RING_POINTS;
    use crate::game::tile::ID_CHECKPOINT_USED;

    fn arena() -> Level {
        Level::from_ascii(&[
            "######",
            "#....#",
            "#....#",
            "#....#",
            "######",
        ])
        .unwrap()
        .with_respawn(2, 2)
    }

    #[test]
    fn test_spawn_places_ball() {
        let sim = Simulation::spawn(arena(), &SessionConfig::default());
        assert!(sim.ball.is_initialized());
        assert_eq!(sim.ball.position, IVec2::new(30, 30));
        assert_eq!(sim.ball.size, SizeState::Small);
        assert_eq!(sim.session.lives, 3);
        assert_eq!(sim.tick, 0);
    }

    #[test]
    fn test_new_leaves_ball_uninitialized() {
        let sim = Simulation::new(arena(), &SessionConfig::default());
        assert!(!sim.ball.is_initialized());
        assert_eq!(sim.respawn_position(SizeState::Large), IVec2::new(32, 32));
    }

    #[test]
    fn test_move_queues_and_applies_events() {
        let level = Level::from_ascii(&["....", ".C..", "...."]).unwrap();
        let mut sim = Simulation::new(level, &SessionConfig::default());
        sim.player_init(IVec2::new(6, 6), SizeState::Small);

        let outcome = sim.test_move(18, 18);
        assert!(outcome.can_move);
        assert_eq!(
            outcome.events,
            vec![
                GameEventData::ScoreDelta { points: 200 },
                GameEventData::CheckpointActivated { tile: IVec2::new(1, 1) },
            ]
        );
        assert_eq!(sim.session.score, 200);
        assert_eq!(sim.level.respawn(), IVec2::new(1, 1));
        assert_eq!(sim.level.tile_id(1, 1), ID_CHECKPOINT_USED);

        let events = sim.take_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.tick == 0));
        assert!(sim.take_events().is_empty());
    }

    #[test]
    fn test_ring_counts_against_grid_total() {
        let level = Level::from_ascii(&["....", ".o..", ".u..", "...."]).unwrap();
        let mut sim = Simulation::new(level, &SessionConfig::default());
        assert_eq!(sim.session.total_rings, 1);
        sim.player_init(IVec2::new(6, 6), SizeState::Small);

        // thin band of the bottom half at x 16..20
        assert!(sim.test_move(18, 30).can_move);
        assert_eq!(sim.session.score, RING_POINTS);
        assert_eq!(sim.session.rings_collected, 1);
        assert!(sim.session.door_opening);
    }

    #[test]
    fn test_ring_total_override_holds_door() {
        let level = Level::from_ascii(&["....", ".o..", ".u..", "...."])
            .unwrap()
            .with_total_rings(2);
        let mut sim = Simulation::new(level, &SessionConfig::default());
        assert_eq!(sim.session.total_rings, 2);
        sim.player_init(IVec2::new(6, 6), SizeState::Small);

        assert!(sim.test_move(18, 30).can_move);
        assert_eq!(sim.session.rings_collected, 1);
        assert!(!sim.session.door_opening);
    }

    #[test]
    fn test_respawn_keeps_size() {
        let mut sim = Simulation::spawn(arena(), &SessionConfig::default());
        sim.ball.size = SizeState::Large;
        sim.ball.lifecycle = Lifecycle::Dead;
        sim.respawn();
        assert_eq!(sim.ball.lifecycle, Lifecycle::Normal);
        assert_eq!(sim.ball.size, SizeState::Large);
        assert_eq!(sim.ball.position, IVec2::new(32, 32));
    }

    #[test]
    fn test_hash_tracks_state() {
        let a = Simulation::spawn(arena(), &SessionConfig::default());
        let b = Simulation::spawn(arena(), &SessionConfig::default());
        assert_eq!(a.compute_hash(), b.compute_hash());

        let mut c = b.clone();
        c.ball.velocity.x = 1;
        assert_ne!(a.compute_hash(), c.compute_hash());

        let mut d = b.clone();
        d.tick = 1;
        assert_ne!(a.compute_hash(), d.compute_hash());

        let mut e = b;
        e.session.score = 1;
        assert_ne!(a.compute_hash(), e.compute_hash());
    }

    #[test]
    fn test_corrupt_level_snapshot_fails_to_load() {
        let sim = Simulation::spawn(arena(), &SessionConfig::default());
        let mut value = serde_json::to_value(&sim).unwrap();
        value["level"]["tiles"] = serde_json::json!([0, 0, 0]);
        assert!(serde_json::from_value::<Simulation>(value).is_err());
    }

    #[test]
    fn test_serde_skips_pending_events() {
        let mut sim = Simulation::spawn(arena(), &SessionConfig::default());
        sim.pending_events.push(GameEvent::new(0, GameEventData::LifeLost));
        let json = serde_json::to_string(&sim).unwrap();
        let back: Simulation = serde_json::from_str(&json).unwrap();
        assert!(back.pending_events.is_empty());
        assert_eq!(back.compute_hash(), sim.compute_hash());
    }
}
