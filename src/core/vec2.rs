//! Integer 2D Vector
//!
//! Pixel-space positions and velocities. All components are plain `i32`,
//! no fixed-point scaling: one unit is one pixel (position) or one tenth of
//! a pixel per tick (velocity).

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

use super::arith::clamp_abs;

/// 2D vector with integer components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IVec2 {
    /// X component
    pub x: i32,
    /// Y component (grows downward)
    pub y: i32,
}

impl IVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by the given deltas.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Swap the components.
    #[inline]
    pub const fn swapped(self) -> Self {
        Self { x: self.y, y: self.x }
    }

    /// Clamp both components to `[-limit, limit]`.
    #[inline]
    pub fn clamp_abs(self, limit: i32) -> Self {
        Self {
            x: clamp_abs(self.x, limit),
            y: clamp_abs(self.y, limit),
        }
    }
}

impl Add for IVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for IVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for IVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Debug for IVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IVec2({}, {})", self.x, self.y)
    }
}

impl fmt::Display for IVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_ops() {
        let a = IVec2::new(3, 4);
        let b = IVec2::new(1, -2);
        assert_eq!(a + b, IVec2::new(4, 2));
        assert_eq!(a - b, IVec2::new(2, 6));
        assert_eq!(-a, IVec2::new(-3, -4));
        assert_eq!(a.offset(-1, 1), IVec2::new(2, 5));
        assert_eq!(a.swapped(), IVec2::new(4, 3));
    }

    #[test]
    fn test_vec2_clamp_abs() {
        let v = IVec2::new(400, -151).clamp_abs(150);
        assert_eq!(v, IVec2::new(150, -150));
        assert_eq!(IVec2::new(10, -10).clamp_abs(150), IVec2::new(10, -10));
    }

    #[test]
    fn test_vec2_display() {
        assert_eq!(format!("{}", IVec2::new(-1, 7)), "(-1, 7)");
        assert_eq!(format!("{:?}", IVec2::ZERO), "IVec2(0, 0)");
    }
}
