//! Game Session
//!
//! Reference game-event collaborator: score, lives, ring count and the exit
//! door. It answers the two hook queries the physics core asks mid-tick and
//! folds the tick's events in afterwards.

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::core::hash::StateHasher;
use super::events::{GameEventData, GameHooks};

/// Points for passing a ring.
pub const RING_POINTS: u32 = 500;
/// Points for an extra life crystal.
pub const EXTRA_LIFE_POINTS: u32 = 1000;
/// Points for finishing a level.
pub const EXIT_POINTS: u32 = 5000;

/// Door offset at which the exit counts as open, in pixels.
pub const DOOR_OPEN_OFFSET: i32 = 24;
/// Door movement per tick while opening, in pixels.
pub const DOOR_STEP: i32 = 4;

/// Score, lives, rings and the exit door for one level run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Accumulated score
    pub score: u32,
    /// Lives left; the run ends when this drops below zero
    pub lives: i32,
    /// Extra lives never raise `lives` past this
    pub max_lives: i32,
    /// Ring pairs passed
    pub rings_collected: u32,
    /// Ring pairs needed to open the exit
    pub total_rings: u32,
    /// Door slide offset in pixels
    pub door_offset: i32,
    /// Door is animating open
    pub door_opening: bool,
    /// Pops are suppressed
    pub invincible: bool,
    /// Exit reached
    pub level_complete: bool,
    /// Lives exhausted
    pub game_over: bool,
}

impl GameSession {
    /// Fresh session for a level with `total_rings` ring pairs.
    pub fn new(config: &SessionConfig, total_rings: u32) -> Self {
        Self {
            score: 0,
            lives: config.starting_lives,
            max_lives: config.max_lives,
            rings_collected: 0,
            total_rings,
            door_offset: 0,
            door_opening: false,
            invincible: config.invincible,
            level_complete: false,
            game_over: false,
        }
    }

    /// Whether the run has ended either way.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.level_complete || self.game_over
    }

    /// Fold one event into the session.
    pub fn apply(&mut self, event: &GameEventData) {
        match event {
            GameEventData::ScoreDelta { points } => self.add_score(*points),
            GameEventData::RingCollected { .. } => {
                self.add_score(RING_POINTS);
                self.rings_collected += 1;
                if self.rings_collected >= self.total_rings {
                    self.open_door();
                }
            }
            GameEventData::ExtraLife { .. } => {
                self.add_score(EXTRA_LIFE_POINTS);
                if self.lives < self.max_lives {
                    self.lives += 1;
                }
            }
            GameEventData::LevelCompleted => {
                if !self.level_complete {
                    self.add_score(EXIT_POINTS);
                    self.level_complete = true;
                    info!(score = self.score, "level complete");
                }
            }
            GameEventData::LifeLost => {
                self.lives -= 1;
                debug!(lives = self.lives, "life lost");
            }
            GameEventData::CheckpointActivated { .. }
            | GameEventData::BonusArmed { .. }
            | GameEventData::BallResized { .. } => {}
        }
    }

    /// Start the door animation. A door that is opening or open stays put.
    pub fn open_door(&mut self) {
        if !self.door_opening && self.door_offset == 0 {
            self.door_opening = true;
            debug!(rings = self.rings_collected, "exit door opening");
        }
    }

    /// Advance the door animation one tick.
    pub fn advance_door(&mut self) {
        if self.door_opening {
            self.door_offset = (self.door_offset + DOOR_STEP).min(DOOR_OPEN_OFFSET);
            if self.door_offset == DOOR_OPEN_OFFSET {
                self.door_opening = false;
            }
        }
    }

    /// Toggle pop suppression.
    pub fn toggle_invincible(&mut self) {
        self.invincible = !self.invincible;
    }

    fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Feed the session into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.score);
        hasher.update_i32(self.lives);
        hasher.update_u32(self.rings_collected);
        hasher.update_u32(self.total_rings);
        hasher.update_i32(self.door_offset);
        hasher.update_bool(self.door_opening);
        hasher.update_bool(self.invincible);
        hasher.update_bool(self.level_complete);
        hasher.update_bool(self.game_over);
    }
}

impl GameHooks for GameSession {
    fn door_open(&self) -> bool {
        self.door_offset >= DOOR_OPEN_OFFSET
    }

    fn invincible(&self) -> bool {
        self.invincible
    }
}

// =============================================================================
// TESTS
// =============================================================================
