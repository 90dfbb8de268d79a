//! Game Events
//!
//! Everything the physics core reports to the game-event collaborator, and
//! the two questions it asks back.

use serde::{Serialize, Deserialize};

use crate::core::vec2::IVec2;
use super::ball::SizeState;
use super::tile::BonusKind;

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Flat score award
    ScoreDelta {
        /// Points added
        points: u32,
    },

    /// An active ring half was passed; the pair is now inactive
    RingCollected {
        /// Tile that triggered the collection
        tile: IVec2,
    },

    /// Checkpoint taken; respawn point moved here
    CheckpointActivated {
        /// Checkpoint tile
        tile: IVec2,
    },

    /// Extra life crystal picked up and removed
    ExtraLife {
        /// Crystal tile
        tile: IVec2,
    },

    /// Exit entered with the door open
    LevelCompleted,

    /// Ball popped
    LifeLost,

    /// Timed bonus armed
    BonusArmed {
        /// Which bonus
        kind: BonusKind,
    },

    /// Ball changed size
    BallResized {
        /// New size
        size: SizeState,
    },
}

/// A game event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }
}

/// Queries the physics core makes of the game layer mid-tick.
///
/// Implementations must answer immediately and must not call back into the
/// simulation.
pub trait GameHooks {
    /// Whether the exit door has finished opening.
    fn door_open(&self) -> bool;

    /// Whether pops are suppressed.
    fn invincible(&self) -> bool;
}

/// Hooks with fixed answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedHooks {
    /// Answer for `door_open`
    pub door_open: bool,
    /// Answer for `invincible`
    pub invincible: bool,
}

impl GameHooks for FixedHooks {
    fn door_open(&self) -> bool {
        self.door_open
    }

    fn invincible(&self) -> bool {
        self.invincible
    }
}
