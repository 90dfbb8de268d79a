//! Ball State
//!
//! The single controllable actor and the tuning constants that drive it.
//! Positions are the ball's center in pixels; speeds are tenths of a pixel
//! per tick (a sweep takes `|v| / 10` one-pixel steps).

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::vec2::IVec2;
use super::input::{DIR_LEFT, DIR_RIGHT, DIR_UP};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Small ball diameter in pixels
pub const SMALL_SIZE: i32 = 12;
/// Large ball diameter in pixels
pub const LARGE_SIZE: i32 = 16;

/// Jump impulse (negative is up)
pub const JUMP_STRENGTH: i32 = -67;
/// Jump offset forced while the jump bonus is armed
pub const JUMP_BONUS_STRENGTH: i32 = -80;

/// Terminal fall speed, small ball
pub const NORMAL_MAX_GRAVITY: i32 = 80;
/// Gravity step, small ball
pub const NORMAL_GRAVITY_ACCEL: i32 = 4;
/// Terminal fall speed, large ball
pub const LARGE_MAX_GRAVITY: i32 = 38;
/// Gravity step, large ball
pub const LARGE_GRAVITY_ACCEL: i32 = 3;
/// Terminal sink speed, small ball under water
pub const UWATER_MAX_GRAVITY: i32 = 42;
/// Gravity step, small ball under water
pub const UWATER_GRAVITY_ACCEL: i32 = 6;
/// Terminal rise speed, large ball under water (buoyant)
pub const UWATER_LARGE_MAX_GRAVITY: i32 = -30;
/// Gravity step, large ball under water
pub const UWATER_LARGE_GRAVITY_ACCEL: i32 = -2;
/// Lift applied to a large ball resting under water
pub const BASE_GRAVITY: i32 = 10;

/// Per-axis speed cap
pub const MAX_SPEED: i32 = 150;
/// Horizontal acceleration per tick
pub const HORZ_ACCEL: i32 = 6;
/// Horizontal friction per tick
pub const FRICTION_DECEL: i32 = 4;
/// Horizontal speed cap
pub const MAX_HORZ_SPEED: i32 = 50;
/// Horizontal speed cap with the speed bonus
pub const MAX_HORZ_BONUS_SPEED: i32 = 100;
/// Smallest bounce speed; also the rubber jump boost
pub const MIN_BOUNCE_SPEED: i32 = 10;
/// Speed the ball is knocked back with after hitting a ceiling
pub const ROOF_COLLISION_SPEED: i32 = 20;
/// Horizontal speed below which ramp slides are attempted
pub const SLIDE_SPEED_THRESHOLD: i32 = 10;
/// Slide attempts happen when the slide counter wraps to zero
pub const SLIDE_PERIOD: u8 = 3;
/// Jump offset added per airborne tick to a large ball
pub const LARGE_JUMP_CREEP: i32 = 5;

/// Bonus duration in ticks
pub const BONUS_DURATION: u16 = 300;
/// Ticks spent in the popped state
pub const POPPED_FRAMES: u8 = 5;
/// Speed units per one-pixel sweep step
pub const STEP_DIVISOR: i32 = 10;
/// Nudge distance when a large ball spawns inside geometry
pub const STUCK_BALL_OFFSET: i32 = 4;

// =============================================================================
// STATE ENUMS
// =============================================================================

/// Ball size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeState {
    /// 12 px
    #[default]
    Small,
    /// 16 px
    Large,
}

impl SizeState {
    /// Diameter in pixels.
    #[inline]
    pub const fn diameter(self) -> i32 {
        match self {
            SizeState::Small => SMALL_SIZE,
            SizeState::Large => LARGE_SIZE,
        }
    }

    /// Half the diameter.
    #[inline]
    pub const fn half(self) -> i32 {
        self.diameter() / 2
    }

    /// Whether this is the large size.
    #[inline]
    pub const fn is_large(self) -> bool {
        matches!(self, SizeState::Large)
    }

    fn as_u8(self) -> u8 {
        match self {
            SizeState::Small => 0,
            SizeState::Large => 1,
        }
    }
}

/// Ball lifecycle. Only moves forward until the driver re-initializes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Active physics
    #[default]
    Normal,
    /// Pop animation, physics frozen
    Popped,
    /// Awaiting respawn
    Dead,
}

impl Lifecycle {
    fn as_u8(self) -> u8 {
        match self {
            Lifecycle::Normal => 0,
            Lifecycle::Popped => 1,
            Lifecycle::Dead => 2,
        }
    }
}

/// Frame counters for the timed bonuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusCounters {
    /// Speed bonus ticks left
    pub speed: u16,
    /// Reverse gravity ticks left
    pub gravity: u16,
    /// Jump bonus ticks left
    pub jump: u16,
}

impl BonusCounters {
    /// Clear all bonuses.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// BALL
// =============================================================================

/// The ball.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    /// Center position in pixels
    pub position: IVec2,
    /// Velocity in tenths of a pixel per tick
    pub velocity: IVec2,
    /// Current size
    pub size: SizeState,
    /// Lifecycle state
    pub lifecycle: Lifecycle,
    /// Held direction bits (`DIR_*`)
    pub direction: u8,

    /// Last vertical step was blocked while moving with gravity
    pub grounded: bool,
    /// Ramp contact seen by the detector
    pub touching_ramp: bool,
    /// Rubber contact seen by the detector
    pub touching_rubber: bool,
    /// Center tile is under water
    pub in_water: bool,

    /// Timed bonuses
    pub bonus: BonusCounters,
    /// Offset added to the next jump impulse
    pub jump_offset: i32,
    /// Counts 0, 1, 2 and wraps; slides are tried at 0
    pub slide_counter: u8,
    /// Pop animation ticks left
    pub pop_counter: u8,

    /// Set by `player_init`
    #[serde(default)]
    pub(crate) initialized: bool,
}

impl Ball {
    /// Uninitialized ball; call `player_init` before updating it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diameter in pixels.
    #[inline]
    pub fn diameter(&self) -> i32 {
        self.size.diameter()
    }

    /// Half the diameter.
    #[inline]
    pub fn half_size(&self) -> i32 {
        self.size.half()
    }

    /// Whether `player_init` has run.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Hold a direction. Down is not a movement input and is ignored.
    pub fn set_direction(&mut self, bit: u8) {
        if bit & (DIR_LEFT | DIR_RIGHT | DIR_UP) == bit {
            self.direction |= bit;
        }
    }

    /// Release a direction.
    pub fn release_direction(&mut self, bit: u8) {
        self.direction &= !bit;
    }

    /// Whether a direction is held.
    #[inline]
    pub fn holds(&self, bit: u8) -> bool {
        self.direction & bit != 0
    }

    /// Reset everything for a fresh life at `position`.
    pub(crate) fn reset(&mut self, position: IVec2, size: SizeState) {
        *self = Self {
            position,
            size,
            initialized: true,
            ..Self::default()
        };
    }

    /// Feed the ball into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_u8(self.size.as_u8());
        hasher.update_u8(self.lifecycle.as_u8());
        hasher.update_u8(self.direction);
        hasher.update_bool(self.grounded);
        hasher.update_bool(self.touching_ramp);
        hasher.update_bool(self.touching_rubber);
        hasher.update_bool(self.in_water);
        hasher.update_u16(self.bonus.speed);
        hasher.update_u16(self.bonus.gravity);
        hasher.update_u16(self.bonus.jump);
        hasher.update_i32(self.jump_offset);
        hasher.update_u8(self.slide_counter);
        hasher.update_u8(self.pop_counter);
    }
}

// =============================================================================
// TESTS
// =============================================================================
