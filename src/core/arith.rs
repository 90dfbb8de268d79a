//! Integer Rounding Helpers
//!
//! The physics was tuned against a runtime with truncating division and
//! arithmetic shifts. Rust's `/` on `i32` already truncates toward zero and
//! `>>` on signed integers is arithmetic, but the *order* of negation and
//! halving differs between call sites, so each rounding flavor gets a name.
//!
//! | helper              | expression      | `-5` gives | `5` gives |
//! |---------------------|-----------------|-----------:|----------:|
//! | `halve_shift`       | `v >> 1`        | `-3`       | `2`       |
//! | `neg_halve_shift`   | `-(v >> 1)`     | `3`        | `-2`      |
//! | `neg_halve_div`     | `v * -1 / 2`    | `2`        | `-2`      |
//! | `div_trunc(v, 10)`  | `v / 10`        | `0`        | `0`       |

/// Truncating division (rounds toward zero).
#[inline]
pub const fn div_trunc(value: i32, divisor: i32) -> i32 {
    value / divisor
}

/// Arithmetic shift halving (rounds toward negative infinity).
#[inline]
pub const fn halve_shift(value: i32) -> i32 {
    value >> 1
}

/// Shift-halve then negate. Used for horizontal bounces and ramp redirects.
#[inline]
pub const fn neg_halve_shift(value: i32) -> i32 {
    -(value >> 1)
}

/// Negate then truncating-divide by two. Used for vertical bounces.
#[inline]
pub const fn neg_halve_div(value: i32) -> i32 {
    value * -1 / 2
}

/// Sign of a value as `-1`, `0` or `1`.
#[inline]
pub const fn sign(value: i32) -> i32 {
    value.signum()
}

/// Clamp to a symmetric range `[-limit, limit]`.
#[inline]
pub fn clamp_abs(value: i32, limit: i32) -> i32 {
    value.clamp(-limit, limit)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rounding_pins() {
        assert_eq!(neg_halve_shift(-5), 3);
        assert_eq!(neg_halve_shift(5), -2);
        assert_eq!(neg_halve_div(-5), 2);
        assert_eq!(neg_halve_div(5), -2);
        assert_eq!(halve_shift(-5), -3);
        assert_eq!(halve_shift(-1), -1);
        assert_eq!(div_trunc(-19, 10), -1);
        assert_eq!(div_trunc(19, 10), 1);
    }

    #[test]
    fn test_shift_and_divide_disagree_on_odd_negatives() {
        // -(-5 >> 1) and -5 / -2 are not the same operation
        assert_eq!(neg_halve_shift(-5), 3);
        assert_eq!(-5 / -2, 2);
    }

    #[test]
    fn test_clamp_abs() {
        assert_eq!(clamp_abs(200, 150), 150);
        assert_eq!(clamp_abs(-200, 150), -150);
        assert_eq!(clamp_abs(42, 150), 42);
    }

    proptest! {
        #[test]
        fn prop_neg_halve_div_rounds_toward_zero(v in -10_000i32..10_000) {
            let r = neg_halve_div(v);
            prop_assert!(r.abs() * 2 <= v.abs());
            prop_assert!(v.abs() - r.abs() * 2 <= 1);
            prop_assert!(v == 0 || r == 0 || r.signum() == -v.signum());
        }

        #[test]
        fn prop_halve_shift_is_floor(v in -10_000i32..10_000) {
            prop_assert_eq!(halve_shift(v), v.div_euclid(2));
        }

        #[test]
        fn prop_div_trunc_matches_abs(v in -10_000i32..10_000) {
            prop_assert_eq!(div_trunc(v, 10).abs(), v.abs() / 10);
        }
    }
}
