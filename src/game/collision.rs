//! Collision Detection
//!
//! `test_move` answers "can the ball's center sit at this pixel?" and, as
//! part of the same contract, applies tile effects: pickups arm bonuses,
//! spikes pop, rings flip, checkpoints move the respawn point. Every tile
//! under the candidate footprint is visited even after one blocks, so
//! effects on later tiles still fire.

use crate::core::arith::{halve_shift, neg_halve_shift};
use crate::core::vec2::IVec2;
use super::ball::{Ball, Lifecycle, SizeState, BONUS_DURATION};
use super::events::{GameEventData, GameHooks};
use super::level::{Level, MOVING_SPIKE_PX};
use super::masks::{ball_pixel, ramp_pixel};
use super::physics::{enlarge, pop, shrink};
use super::ring::{activate_checkpoint, collect_ring};
use super::tile::{
    BonusKind, RampCorner, RingOrientation, RingSize, ThinAxis, TileKind, ID_EMPTY, TILE_SIZE,
    tile_meta,
};

/// Score for taking a checkpoint.
pub const CHECKPOINT_POINTS: u32 = 200;

/// Pixels shaved off each side of a thin tile.
pub const THIN_MARGIN: i32 = 4;

/// Verdict plus the events raised while reaching it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// Whether the ball may occupy the candidate position
    pub can_move: bool,
    /// Events raised by tile effects, in visiting order
    pub events: Vec<GameEventData>,
}

/// Borrowed world the detector and integrator work against.
pub struct PhysicsContext<'a> {
    /// Tile grid, mutated by tile effects
    pub level: &'a mut Level,
    /// Door and invincibility queries
    pub hooks: &'a dyn GameHooks,
    /// Event sink
    pub events: &'a mut Vec<GameEventData>,
    /// Set while a resize searches for room; nested resizes are skipped
    pub(crate) resizing: bool,
}

impl<'a> PhysicsContext<'a> {
    /// Bundle the world for one call.
    pub fn new(
        level: &'a mut Level,
        hooks: &'a dyn GameHooks,
        events: &'a mut Vec<GameEventData>,
    ) -> Self {
        Self { level, hooks, events, resizing: false }
    }

    #[inline]
    pub(crate) fn emit(&mut self, event: GameEventData) {
        self.events.push(event);
    }
}

/// Test the ball at `(x, y)` and apply tile effects.
pub fn test_move(
    ball: &mut Ball,
    level: &mut Level,
    hooks: &dyn GameHooks,
    x: i32,
    y: i32,
) -> CollisionOutcome {
    let mut events = Vec::new();
    let can_move = {
        let mut ctx = PhysicsContext::new(level, hooks, &mut events);
        probe(ball, &mut ctx, x, y)
    };
    CollisionOutcome { can_move, events }
}

// =============================================================================
// FOOTPRINT
// =============================================================================

/// Ball bounding square at a candidate position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Footprint {
    /// Left edge
    x: i32,
    /// Top edge
    y: i32,
    /// Edge length
    size: i32,
    large: bool,
}

impl Footprint {
    fn at(center: IVec2, size: SizeState) -> Self {
        Self {
            x: center.x - size.half(),
            y: center.y - size.half(),
            size: size.diameter(),
            large: size.is_large(),
        }
    }

    /// Inclusive rectangle test.
    #[inline]
    fn touches(&self, rx1: i32, ry1: i32, rx2: i32, ry2: i32) -> bool {
        rect_collide(self.x, self.y, self.x + self.size, self.y + self.size, rx1, ry1, rx2, ry2)
    }
}

/// Closed-rectangle overlap; touching edges count.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn rect_collide(x1: i32, y1: i32, x2: i32, y2: i32, rx1: i32, ry1: i32, rx2: i32, ry2: i32) -> bool {
    x1 <= rx2 && y1 <= ry2 && rx1 <= x2 && ry1 <= y2
}

/// Tile range `[first, last)` on one axis covered by a footprint.
#[inline]
fn tile_span(center: i32, half: i32) -> (i32, i32) {
    ((center - half) / TILE_SIZE, (center - 1 + half) / TILE_SIZE + 1)
}

// =============================================================================
// DETECTOR
// =============================================================================

/// Detector core shared by `test_move` and the integrator.
pub(crate) fn probe(ball: &mut Ball, ctx: &mut PhysicsContext<'_>, x: i32, y: i32) -> bool {
    let half = ball.half_size();
    // truncating division rounds the first row toward zero above the grid
    let row_bias = if y < 0 { TILE_SIZE } else { 0 };
    let (first_col, last_col) = tile_span(x, half);
    let (first_row, last_row) = tile_span(y - row_bias, half);
    let footprint = Footprint::at(IVec2::new(x, y), ball.size);

    let mut can_move = true;
    for tx in first_col..last_col {
        for ty in first_row..last_row {
            if !test_tile(ball, ctx, &footprint, tx, ty) {
                can_move = false;
            }
        }
    }
    can_move
}

/// One tile's verdict. `true` means this tile does not block.
fn test_tile(ball: &mut Ball, ctx: &mut PhysicsContext<'_>, fp: &Footprint, tx: i32, ty: i32) -> bool {
    if !ctx.level.in_bounds(tx, ty) {
        return false;
    }
    if ball.lifecycle == Lifecycle::Popped {
        return true;
    }

    let id = ctx.level.get_tile(tx, ty).id();
    let Some(meta) = tile_meta(id) else {
        return true;
    };
    let origin = IVec2::new(tx * TILE_SIZE, ty * TILE_SIZE);

    match meta.kind {
        TileKind::Passable => true,

        TileKind::Solid { rubber } => {
            let hit = square_collide(fp, origin);
            if rubber {
                ball.touching_rubber = true;
            }
            if !hit {
                ball.touching_ramp = true;
            }
            !hit
        }

        TileKind::Spike { .. } => {
            if thin_hit(fp, origin, meta.kind) {
                pop(ball, ctx);
                false
            } else {
                true
            }
        }

        TileKind::MovingSpikes => {
            let hit = ctx.level.find_moving_object(tx, ty).is_some_and(|object| {
                let block = object.block_origin();
                fp.touches(block.x, block.y, block.x + MOVING_SPIKE_PX, block.y + MOVING_SPIKE_PX)
            });
            if hit {
                pop(ball, ctx);
            }
            !hit
        }

        TileKind::Ring { .. } => ring_tile(ctx, fp, origin, (tx, ty, id), meta.kind),

        TileKind::Ramp { corner, rubber } => {
            if triangle_collide(fp, origin, corner) {
                if !ball.grounded {
                    redirect(ball, corner, rubber);
                }
                ball.touching_ramp = true;
                if rubber {
                    ball.touching_rubber = true;
                }
                false
            } else {
                true
            }
        }

        TileKind::Bonus { kind, .. } => {
            match kind {
                BonusKind::Speed => ball.bonus.speed = BONUS_DURATION,
                BonusKind::Gravity => ball.bonus.gravity = BONUS_DURATION,
                BonusKind::Jump => ball.bonus.jump = BONUS_DURATION,
            }
            ctx.emit(GameEventData::BonusArmed { kind });
            false
        }

        TileKind::Deflator { .. } => {
            if ball.size == SizeState::Large && !ctx.resizing {
                shrink(ball, ctx);
            }
            false
        }

        TileKind::Inflator { .. } => {
            if thin_hit(fp, origin, meta.kind) {
                if ball.size == SizeState::Small && !ctx.resizing {
                    enlarge(ball, ctx);
                }
                false
            } else {
                true
            }
        }

        TileKind::Checkpoint => {
            ctx.emit(GameEventData::ScoreDelta { points: CHECKPOINT_POINTS });
            activate_checkpoint(ctx.level, tx, ty);
            ctx.emit(GameEventData::CheckpointActivated { tile: IVec2::new(tx, ty) });
            true
        }

        TileKind::Exit => {
            if ctx.hooks.door_open() {
                ctx.emit(GameEventData::LevelCompleted);
                true
            } else {
                false
            }
        }

        TileKind::ExtraLife => {
            ctx.emit(GameEventData::ExtraLife { tile: IVec2::new(tx, ty) });
            ctx.level.set_tile_id(tx, ty, ID_EMPTY);
            true
        }
    }
}

/// Ring halves. Entry from the top rim blocks, the bottom half never does.
fn ring_tile(
    ctx: &mut PhysicsContext<'_>,
    fp: &Footprint,
    origin: IVec2,
    (tx, ty, id): (i32, i32, u8),
    kind: TileKind,
) -> bool {
    let TileKind::Ring { size, orientation, active } = kind else {
        return true;
    };

    // collected large rings keep only their rims
    if size == RingSize::Large && !active {
        return orientation == RingOrientation::VertBottom || !edge_collide(fp, origin, size, orientation);
    }

    if !thin_hit(fp, origin, kind) {
        return true;
    }
    if size == RingSize::Small && fp.large {
        return false;
    }

    if orientation != RingOrientation::VertBottom && edge_collide(fp, origin, size, orientation) {
        return false;
    }
    if active {
        collect_ring(ctx.level, tx, ty, id);
        ctx.emit(GameEventData::RingCollected { tile: IVec2::new(tx, ty) });
    }
    true
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Clip one axis of the footprint against a tile. Returns tile-local `[start, end)`.
#[inline]
fn clip_axis(rel: i32, size: i32) -> (i32, i32) {
    let (start, end) = if rel >= 0 { (rel, TILE_SIZE) } else { (0, size + rel) };
    (start, end.min(TILE_SIZE))
}

/// Per-pixel footprint test against a full square.
fn square_collide(fp: &Footprint, origin: IVec2) -> bool {
    let k = fp.x - origin.x;
    let m = fp.y - origin.y;
    let (x0, x1) = clip_axis(k, fp.size);
    let (y0, y1) = clip_axis(m, fp.size);

    (x0..x1).any(|px| (y0..y1).any(|py| ball_pixel(fp.large, px - k, py - m)))
}

/// Per-pixel footprint test against a ramp triangle.
fn triangle_collide(fp: &Footprint, origin: IVec2, corner: RampCorner) -> bool {
    let k = fp.x - origin.x;
    let m = fp.y - origin.y;
    let (col_off, row_off) = corner.mask_offset();
    let (x0, x1) = clip_axis(k, fp.size);
    let (y0, y1) = clip_axis(m, fp.size);

    (x0..x1).any(|px| {
        (y0..y1).any(|py| {
            ramp_pixel((px - col_off).abs(), (py - row_off).abs())
                && ball_pixel(fp.large, px - k, py - m)
        })
    })
}

/// Narrowed-rectangle test on the axis the tile table gives for `kind`.
fn thin_hit(fp: &Footprint, origin: IVec2, kind: TileKind) -> bool {
    kind.thin_axis().is_some_and(|axis| thin_collide(fp, origin, axis))
}

/// Rectangle test against a tile narrowed along one axis.
fn thin_collide(fp: &Footprint, origin: IVec2, axis: ThinAxis) -> bool {
    let (mut x1, mut y1) = (origin.x, origin.y);
    let (mut x2, mut y2) = (origin.x + TILE_SIZE, origin.y + TILE_SIZE);
    match axis {
        ThinAxis::X => {
            x1 += THIN_MARGIN;
            x2 -= THIN_MARGIN;
        }
        ThinAxis::Y => {
            y1 += THIN_MARGIN;
            y2 -= THIN_MARGIN;
        }
    }
    fp.touches(x1, y1, x2, y2)
}

/// Rim rectangle of a ring half, as `(x1, y1, x2, y2)` in pixels.
pub fn ring_edge_rect(origin: IVec2, size: RingSize, orientation: RingOrientation) -> (i32, i32, i32, i32) {
    let (x, y) = (origin.x, origin.y);
    let mid = TILE_SIZE / 2;
    match (orientation, size) {
        (RingOrientation::VertTop, RingSize::Small) => (x + mid, y, x + mid, y + 1),
        (RingOrientation::VertTop, RingSize::Large) => (x + mid, y - 1, x + mid, y),
        (RingOrientation::VertBottom, _) => (x + mid, y + TILE_SIZE - 1, x + mid, y + TILE_SIZE),
        (RingOrientation::HorizLeft, _) => (x, y + mid, x + 1, y + mid),
        (RingOrientation::HorizRight, _) => (x + TILE_SIZE - 1, y + mid, x + TILE_SIZE, y + mid),
    }
}

fn edge_collide(fp: &Footprint, origin: IVec2, size: RingSize, orientation: RingOrientation) -> bool {
    let (x1, y1, x2, y2) = ring_edge_rect(origin, size, orientation);
    fp.touches(x1, y1, x2, y2)
}

// =============================================================================
// RAMP REDIRECTION
// =============================================================================

/// Turn the velocity along a ramp face.
///
/// | ramp                   | rigid                     | rubber     |
/// |------------------------|---------------------------|------------|
/// | top-right, bottom-left | `(vy >> 1, vx >> 1)`      | `(vy, vx)` |
/// | top-left, bottom-right | `(-(vy >> 1), -(vx >> 1))`| `(-vy, -vx)` |
pub fn redirect(ball: &mut Ball, corner: RampCorner, rubber: bool) {
    let IVec2 { x: vx, y: vy } = ball.velocity;
    ball.velocity = match (corner, rubber) {
        (RampCorner::TopRight | RampCorner::BottomLeft, true) => ball.velocity.swapped(),
        (RampCorner::TopRight | RampCorner::BottomLeft, false) => IVec2::new(halve_shift(vy), halve_shift(vx)),
        (RampCorner::TopLeft | RampCorner::BottomRight, true) => IVec2::new(-vy, -vx),
        (RampCorner::TopLeft | RampCorner::BottomRight, false) => {
            IVec2::new(neg_halve_shift(vy), neg_halve_shift(vx))
        }
    };
}

// =============================================================================
// TESTS
// =============================================================================
