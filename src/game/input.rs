//! Input Frames
//!
//! The input collaborator hands the simulation one direction mask per tick,
//! already debounced. The core never looks at devices.

use serde::{Serialize, Deserialize};

use crate::core::hash::{HashDomain, StateHash, StateHasher};

// =============================================================================
// DIRECTION BITS
// =============================================================================

/// Roll left
pub const DIR_LEFT: u8 = 0x01;
/// Roll right
pub const DIR_RIGHT: u8 = 0x02;
/// Down; accepted on the wire but not a movement input
pub const DIR_DOWN: u8 = 0x04;
/// Jump
pub const DIR_UP: u8 = 0x08;

/// Bits the simulation reacts to.
pub const DIR_MOVEMENT_MASK: u8 = DIR_LEFT | DIR_RIGHT | DIR_UP;

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Held directions for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(C)]
pub struct InputFrame {
    /// Direction bits (`DIR_*`)
    pub direction: u8,
}

impl InputFrame {
    /// Create from raw direction bits.
    #[inline]
    pub const fn new(direction: u8) -> Self {
        Self { direction }
    }

    /// Nothing held.
    #[inline]
    pub const fn idle() -> Self {
        Self { direction: 0 }
    }

    /// Add a held direction.
    #[inline]
    pub const fn with(self, bit: u8) -> Self {
        Self {
            direction: self.direction | bit,
        }
    }

    /// Left held.
    #[inline]
    pub fn left_held(&self) -> bool {
        self.direction & DIR_LEFT != 0
    }

    /// Right held.
    #[inline]
    pub fn right_held(&self) -> bool {
        self.direction & DIR_RIGHT != 0
    }

    /// Jump held.
    #[inline]
    pub fn up_held(&self) -> bool {
        self.direction & DIR_UP != 0
    }

    /// Bits that affect movement.
    #[inline]
    pub fn movement_bits(&self) -> u8 {
        self.direction & DIR_MOVEMENT_MASK
    }
}

/// Hash an input recording for replay bookkeeping.
pub fn hash_recording(frames: &[InputFrame]) -> StateHash {
    let mut hasher = StateHasher::new(HashDomain::InputRecording);
    hasher.update_u32(frames.len() as u32);
    for frame in frames {
        hasher.update_u8(frame.direction);
    }
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_flags() {
        let frame = InputFrame::idle().with(DIR_RIGHT).with(DIR_UP);
        assert!(frame.right_held());
        assert!(frame.up_held());
        assert!(!frame.left_held());
    }

    #[test]
    fn test_down_is_masked() {
        let frame = InputFrame::new(DIR_DOWN | DIR_LEFT);
        assert_eq!(frame.movement_bits(), DIR_LEFT);
    }

    #[test]
    fn test_recording_hash() {
        let a = vec![InputFrame::new(DIR_LEFT), InputFrame::idle()];
        let b = vec![InputFrame::idle(), InputFrame::new(DIR_LEFT)];
        assert_eq!(hash_recording(&a), hash_recording(&a.clone()));
        assert_ne!(hash_recording(&a), hash_recording(&b));
    }
}
