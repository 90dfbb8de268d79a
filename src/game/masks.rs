//! Collision Masks
//!
//! Pixel bitmaps for the two ball footprints and the ramp triangle, built at
//! compile time. All of them assume 12 pixel tiles.

use super::tile::TILE_SIZE;

/// Small ball footprint edge in pixels.
pub const SMALL_MASK_SIZE: usize = 12;

/// Large ball footprint edge in pixels.
pub const LARGE_MASK_SIZE: usize = 16;

/// Ramp triangle edge in pixels.
pub const RAMP_MASK_SIZE: usize = TILE_SIZE as usize;

const SMALL_ROW_WIDTHS: [usize; SMALL_MASK_SIZE] = [4, 8, 10, 10, 12, 12, 12, 12, 10, 10, 8, 4];

const LARGE_ROW_WIDTHS: [usize; LARGE_MASK_SIZE] =
    [6, 10, 12, 14, 14, 16, 16, 16, 16, 16, 16, 14, 14, 12, 10, 6];

/// Disc with centered rows of the given widths.
const fn disc<const N: usize>(widths: [usize; N]) -> [[u8; N]; N] {
    let mut mask = [[0u8; N]; N];
    let mut y = 0;
    while y < N {
        let start = (N - widths[y]) / 2;
        let mut x = start;
        while x < start + widths[y] {
            mask[y][x] = 1;
            x += 1;
        }
        y += 1;
    }
    mask
}

/// Small ball footprint, `[row][col]`.
pub static SMALL_BALL: [[u8; SMALL_MASK_SIZE]; SMALL_MASK_SIZE] = disc(SMALL_ROW_WIDTHS);

/// Large ball footprint, `[row][col]`.
pub static LARGE_BALL: [[u8; LARGE_MASK_SIZE]; LARGE_MASK_SIZE] = disc(LARGE_ROW_WIDTHS);

/// Ramp occupancy with the bottom-right half solid, `[row][col]`.
///
/// Other corners address it with mirrored indices, see
/// `RampCorner::mask_offset`.
pub static RAMP_TRIANGLE: [[u8; RAMP_MASK_SIZE]; RAMP_MASK_SIZE] = {
    let mut mask = [[0u8; RAMP_MASK_SIZE]; RAMP_MASK_SIZE];
    let mut y = 0;
    while y < RAMP_MASK_SIZE {
        let mut x = 0;
        while x < RAMP_MASK_SIZE {
            if x + y >= RAMP_MASK_SIZE - 1 {
                mask[y][x] = 1;
            }
            x += 1;
        }
        y += 1;
    }
    mask
};

/// Footprint pixel lookup. Out of range reads as empty.
#[inline]
pub fn ball_pixel(large: bool, col: i32, row: i32) -> bool {
    if col < 0 || row < 0 {
        return false;
    }
    let (col, row) = (col as usize, row as usize);
    if large {
        row < LARGE_MASK_SIZE && col < LARGE_MASK_SIZE && LARGE_BALL[row][col] != 0
    } else {
        row < SMALL_MASK_SIZE && col < SMALL_MASK_SIZE && SMALL_BALL[row][col] != 0
    }
}

/// Ramp triangle pixel lookup. Out of range reads as empty.
#[inline]
pub fn ramp_pixel(col: i32, row: i32) -> bool {
    if col < 0 || row < 0 {
        return false;
    }
    let (col, row) = (col as usize, row as usize);
    row < RAMP_MASK_SIZE && col < RAMP_MASK_SIZE && RAMP_TRIANGLE[row][col] != 0
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row_count(row: &[u8]) -> usize {
        row.iter().filter(|&&p| p != 0).count()
    }

    #[test]
    fn test_small_ball_shape() {
        for (row, width) in SMALL_BALL.iter().zip(SMALL_ROW_WIDTHS) {
            assert_eq!(row_count(row), width);
        }
        assert!(!ball_pixel(false, 0, 0));
        assert!(ball_pixel(false, 0, 5));
        assert!(ball_pixel(false, 5, 0));
        assert!(!ball_pixel(false, 12, 5));
    }

    #[test]
    fn test_large_ball_shape() {
        for (row, width) in LARGE_BALL.iter().zip(LARGE_ROW_WIDTHS) {
            assert_eq!(row_count(row), width);
        }
        assert!(ball_pixel(true, 15, 8));
        assert!(!ball_pixel(true, 0, 0));
        assert!(!ball_pixel(true, 16, 8));
    }

    #[test]
    fn test_masks_are_symmetric() {
        for y in 0..SMALL_MASK_SIZE {
            for x in 0..SMALL_MASK_SIZE {
                assert_eq!(SMALL_BALL[y][x], SMALL_BALL[x][y]);
                assert_eq!(SMALL_BALL[y][x], SMALL_BALL[y][SMALL_MASK_SIZE - 1 - x]);
            }
        }
        for y in 0..LARGE_MASK_SIZE {
            for x in 0..LARGE_MASK_SIZE {
                assert_eq!(LARGE_BALL[y][x], LARGE_BALL[x][y]);
            }
        }
    }

    #[test]
    fn test_ramp_triangle() {
        assert!(!ramp_pixel(0, 0));
        assert!(ramp_pixel(11, 0));
        assert!(ramp_pixel(0, 11));
        assert!(ramp_pixel(11, 11));
        assert!(!ramp_pixel(5, 5));
        assert!(ramp_pixel(6, 5));
        let filled: usize = RAMP_TRIANGLE.iter().map(|r| row_count(r)).sum();
        assert_eq!(filled, 78);
    }
}
