//! Ring and Checkpoint Mutator
//!
//! Paired tile rewrites. Both halves of a ring flip to their inactive ids
//! together; checkpoints flip from gem to indicator. Flag bits (water and the
//! loader's bit 7) survive every rewrite.

use tracing::debug;

use super::level::Level;
use super::tile::{
    TileKind, ID_CHECKPOINT, ID_CHECKPOINT_USED, ring_id, tile_kind,
};

/// Deactivate the ring pair containing `(tx, ty)`.
///
/// `id` is the id the caller saw at that tile. Inactive or non-ring ids are
/// a no-op, which makes repeated calls harmless.
pub fn collect_ring(level: &mut Level, tx: i32, ty: i32, id: u8) {
    let TileKind::Ring { size, orientation, active: true } = tile_kind(id) else {
        return;
    };

    let (dx, dy) = orientation.partner_offset();
    let partner = orientation.partner();

    level.set_tile_id(tx, ty, ring_id(size, orientation, false));
    level.set_tile_id(tx + dx, ty + dy, ring_id(size, partner, false));

    debug!(tx, ty, ?size, ?orientation, "ring pair deactivated");
}

/// Move the respawn point to `(tx, ty)` and mark it taken.
///
/// The previous respawn tile is demoted to the indicator only if it still
/// shows a gem.
pub fn activate_checkpoint(level: &mut Level, tx: i32, ty: i32) {
    let previous = level.respawn();
    if level.in_bounds(previous.x, previous.y) && level.tile_id(previous.x, previous.y) == ID_CHECKPOINT {
        level.set_tile_id(previous.x, previous.y, ID_CHECKPOINT_USED);
    }

    level.set_respawn(tx, ty);
    level.set_tile_id(tx, ty, ID_CHECKPOINT_USED);

    debug!(tx, ty, "checkpoint activated");
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::IVec2;
    use crate::game::tile::{Tile, ID_RING_LARGE_HORIZ_RIGHT, ID_RING_SMALL_VERT_BOTTOM, ID_RING_SMALL_VERT_TOP};
    use proptest::prelude::*;

    fn vertical_ring() -> Level {
        Level::from_ascii(&["....", ".o..", ".u..", "...."]).unwrap()
    }

    #[test]
    fn test_collect_from_top_half() {
        let mut level = vertical_ring();
        collect_ring(&mut level, 1, 1, ID_RING_SMALL_VERT_TOP);
        assert_eq!(level.tile_id(1, 1), 17);
        assert_eq!(level.tile_id(1, 2), 18);
    }

    #[test]
    fn test_collect_from_bottom_half() {
        let mut level = vertical_ring();
        collect_ring(&mut level, 1, 2, ID_RING_SMALL_VERT_BOTTOM);
        assert_eq!(level.tile_id(1, 1), 17);
        assert_eq!(level.tile_id(1, 2), 18);
    }

    #[test]
    fn test_collect_horizontal_pairs() {
        let mut level = Level::empty(4, 1).unwrap();
        level.set_tile_id(1, 0, 15);
        level.set_tile_id(2, 0, 16);
        collect_ring(&mut level, 1, 0, 15);
        assert_eq!((level.tile_id(1, 0), level.tile_id(2, 0)), (19, 20));

        let mut level = Level::empty(4, 1).unwrap();
        level.set_tile_id(1, 0, 23);
        level.set_tile_id(2, 0, ID_RING_LARGE_HORIZ_RIGHT);
        collect_ring(&mut level, 2, 0, ID_RING_LARGE_HORIZ_RIGHT);
        assert_eq!((level.tile_id(1, 0), level.tile_id(2, 0)), (27, 28));
    }

    #[test]
    fn test_collect_large_vertical() {
        let mut level = Level::from_ascii(&[".O.", ".U."]).unwrap();
        collect_ring(&mut level, 1, 1, 22);
        assert_eq!((level.tile_id(1, 0), level.tile_id(1, 1)), (25, 26));
    }

    #[test]
    fn test_collect_keeps_water_flag() {
        let mut level = vertical_ring();
        level.set_tile(1, 2, Tile::new(ID_RING_SMALL_VERT_BOTTOM, true));
        collect_ring(&mut level, 1, 1, ID_RING_SMALL_VERT_TOP);
        assert_eq!(level.tile_id(1, 2), 18);
        assert!(level.get_tile(1, 2).is_water());
    }

    #[test]
    fn test_partner_off_grid_is_dropped() {
        let mut level = Level::from_ascii(&[".u."]).unwrap();
        collect_ring(&mut level, 1, 0, ID_RING_SMALL_VERT_BOTTOM);
        assert_eq!(level.tile_id(1, 0), 18);
    }

    #[test]
    fn test_checkpoint_moves_respawn() {
        let mut level = Level::from_ascii(&["C..C"]).unwrap().with_respawn(0, 0);
        activate_checkpoint(&mut level, 0, 0);
        assert_eq!(level.tile_id(0, 0), ID_CHECKPOINT_USED);

        activate_checkpoint(&mut level, 3, 0);
        assert_eq!(level.respawn(), IVec2::new(3, 0));
        assert_eq!(level.tile_id(3, 0), ID_CHECKPOINT_USED);
        assert_eq!(level.tile_id(0, 0), ID_CHECKPOINT_USED);
    }

    #[test]
    fn test_checkpoint_demotes_untaken_gem() {
        // respawn configured onto a gem that was never touched
        let mut level = Level::from_ascii(&["C.C."]).unwrap().with_respawn(0, 0);
        activate_checkpoint(&mut level, 2, 0);
        assert_eq!(level.tile_id(0, 0), ID_CHECKPOINT_USED);
        assert_eq!(level.respawn(), IVec2::new(2, 0));
    }

    proptest! {
        #[test]
        fn prop_collect_ring_is_idempotent(
            id in 13u8..=24,
            tx in 1i32..3,
            ty in 1i32..3,
            water in any::<bool>(),
        ) {
            let mut level = Level::empty(4, 4).unwrap();
            for y in 0..4 {
                for x in 0..4 {
                    level.set_tile(x, y, Tile::new(0, water));
                }
            }
            level.set_tile_id(tx, ty, id);

            let mut once = level.clone();
            collect_ring(&mut once, tx, ty, id);
            let mut twice = once.clone();
            collect_ring(&mut twice, tx, ty, id);
            prop_assert_eq!(&once, &twice);

            // a second call seeing the now-inactive id writes nothing
            let mut stale = once.clone();
            collect_ring(&mut stale, tx, ty, once.tile_id(tx, ty));
            prop_assert_eq!(&once, &stale);
        }
    }
}
