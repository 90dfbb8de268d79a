//! Ball Integrator
//!
//! One fixed step of ball motion: gravity selection, bonuses, a vertical
//! sweep, a horizontal sweep and the world clamp. Sweeps move one pixel at a
//! time through the collision detector, so every tile effect fires on the
//! exact pixel where the ball meets it.
//!
//! All arithmetic is integer and follows the rounding rules in
//! [`crate::core::arith`].

use tracing::{debug, warn};

use crate::core::arith::{div_trunc, halve_shift, neg_halve_div, neg_halve_shift, sign};
use crate::core::vec2::IVec2;
use super::ball::*;
use super::collision::{probe, PhysicsContext};
use super::events::GameEventData;
use super::input::{DIR_LEFT, DIR_RIGHT, DIR_UP};
use super::tile::TILE_SIZE;

/// Largest offset tried when a growing ball looks for room.
pub const MAX_ENLARGE_OFFSET: i32 = 4 * TILE_SIZE;

/// First offset tried when a growing ball looks for room.
const MIN_ENLARGE_OFFSET: i32 = 2;

/// Vertical nudge after shrinking.
const SHRINK_NUDGE: i32 = 2;

/// Unit directions tried by `enlarge`, in order.
const ENLARGE_DIRECTIONS: [(i32, i32); 6] = [(0, -1), (-1, -1), (1, -1), (0, 1), (-1, 1), (1, 1)];

/// Nudges tried when a large ball spawns inside geometry.
const SPAWN_NUDGES: [(i32, i32); 3] = [
    (-STUCK_BALL_OFFSET, 0),
    (0, -STUCK_BALL_OFFSET),
    (-STUCK_BALL_OFFSET, -STUCK_BALL_OFFSET),
];

// =============================================================================
// GRAVITY
// =============================================================================

/// Gravity for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Gravity {
    /// Terminal vertical speed
    target: i32,
    /// Per-tick change toward `target`
    step: i32,
    /// Reverse gravity bonus active this tick
    reversed: bool,
}

impl Gravity {
    fn select(in_water: bool, large: bool) -> Self {
        let (target, step) = match (in_water, large) {
            (false, false) => (NORMAL_MAX_GRAVITY, NORMAL_GRAVITY_ACCEL),
            (false, true) => (LARGE_MAX_GRAVITY, LARGE_GRAVITY_ACCEL),
            (true, false) => (UWATER_MAX_GRAVITY, UWATER_GRAVITY_ACCEL),
            (true, true) => (UWATER_LARGE_MAX_GRAVITY, UWATER_LARGE_GRAVITY_ACCEL),
        };
        Self { target, step, reversed: false }
    }

    fn reversed(self) -> Self {
        Self {
            target: -self.target,
            step: -self.step,
            reversed: true,
        }
    }

    /// Sign of "down" for this tick.
    #[inline]
    fn down(self) -> i32 {
        if self.reversed { -1 } else { 1 }
    }

    /// Large ball floating up through water.
    #[inline]
    fn buoyant(self) -> bool {
        !self.reversed && self.target == UWATER_LARGE_MAX_GRAVITY
    }

    /// Move `vy` one step toward the target without passing it.
    fn approach(self, vy: i32) -> i32 {
        if self.step > 0 && vy < self.target {
            (vy + self.step).min(self.target)
        } else if self.step < 0 && vy > self.target {
            (vy + self.step).max(self.target)
        } else {
            vy
        }
    }
}

// =============================================================================
// INIT
// =============================================================================

/// Start a fresh life at `position`.
///
/// A large ball that spawns overlapping geometry is nudged left, up, or
/// up-left by a few pixels if one of those is free.
pub fn player_init(ball: &mut Ball, ctx: &mut PhysicsContext<'_>, position: IVec2, size: SizeState) {
    ball.reset(position, size);

    if size == SizeState::Large && !probe(ball, ctx, position.x, position.y) {
        for (dx, dy) in SPAWN_NUDGES {
            let candidate = ball.position.offset(dx, dy);
            if probe(ball, ctx, candidate.x, candidate.y) {
                ball.position = candidate;
                break;
            }
        }
    }
}

// =============================================================================
// UPDATE
// =============================================================================

/// Advance the ball one tick.
///
/// Popped balls only count down toward `Dead`; dead balls are left alone.
pub fn player_update(ball: &mut Ball, ctx: &mut PhysicsContext<'_>) {
    debug_assert!(ball.is_initialized(), "player_update called before player_init");
    if !ball.is_initialized() {
        return;
    }

    match ball.lifecycle {
        Lifecycle::Normal => {}
        Lifecycle::Popped => {
            ball.jump_offset = 0;
            ball.pop_counter = ball.pop_counter.saturating_sub(1);
            if ball.pop_counter == 0 {
                ball.lifecycle = Lifecycle::Dead;
            }
            return;
        }
        Lifecycle::Dead => return,
    }

    // 1. Water and gravity
    let center_col = ball.position.x / TILE_SIZE;
    ball.in_water = water_at(ctx, center_col, ball.position.y / TILE_SIZE);

    let mut gravity = Gravity::select(ball.in_water, ball.size.is_large());
    if gravity.buoyant() && ball.grounded {
        ball.velocity.y = -BASE_GRAVITY;
    }

    if ball.bonus.gravity > 0 {
        ball.bonus.gravity -= 1;
        if ball.bonus.gravity == 0 {
            ball.grounded = false;
        } else {
            gravity = gravity.reversed();
        }
    }

    // 2. Jump bonus
    if ball.bonus.jump > 0 {
        if ball.jump_offset.abs() < -JUMP_BONUS_STRENGTH {
            ball.jump_offset = JUMP_BONUS_STRENGTH * gravity.down();
        }
        ball.bonus.jump -= 1;
    }

    // 3. Slide throttle
    ball.slide_counter = (ball.slide_counter + 1) % SLIDE_PERIOD;

    // 4. Speed clamp
    ball.velocity = ball.velocity.clamp_abs(MAX_SPEED);

    // 5. Vertical sweep
    vertical_sweep(ball, ctx, gravity, center_col);
    if ball.lifecycle != Lifecycle::Normal {
        return;
    }

    // 6. Gravity
    if gravity.buoyant() || !ball.grounded {
        ball.velocity.y = gravity.approach(ball.velocity.y);
    }

    // 7. Large ball jump offset creep
    if ball.size.is_large() && ball.bonus.jump == 0 && !ball.grounded {
        ball.jump_offset = ball
            .jump_offset
            .saturating_add(-LARGE_JUMP_CREEP * gravity.down());
    }

    // 8. Horizontal acceleration
    accelerate(ball);

    // 9. Jump
    if ball.grounded && ball.holds(DIR_UP) {
        ball.velocity.y = JUMP_STRENGTH * gravity.down() + ball.jump_offset;
        ball.grounded = false;
    }

    // 10. Horizontal sweep
    horizontal_sweep(ball, ctx, gravity);

    // 11. World bounds and final clamp
    let half = ball.half_size();
    let max_x = ctx.level.width_px() - half;
    ball.position.x = ball.position.x.max(half).min(max_x);
    ball.velocity = ball.velocity.clamp_abs(MAX_SPEED);
}

fn water_at(ctx: &PhysicsContext<'_>, tx: i32, ty: i32) -> bool {
    ctx.level.in_bounds(tx, ty) && ctx.level.get_tile(tx, ty).is_water()
}

fn vertical_sweep(ball: &mut Ball, ctx: &mut PhysicsContext<'_>, gravity: Gravity, center_col: i32) {
    let mut i = 0;
    while i < div_trunc(ball.velocity.y.abs(), STEP_DIVISOR) {
        i += 1;
        let step = sign(ball.velocity.y);
        let IVec2 { x, y } = ball.position;

        if probe(ball, ctx, x, y + step) {
            ball.position.y += step;
            ball.grounded = false;

            // leaving water slows a floating ball
            if gravity.buoyant() {
                let row = ball.position.y / TILE_SIZE;
                if ctx.level.in_bounds(center_col, row) && !water_at(ctx, center_col, row) {
                    ball.velocity.y = halve_shift(ball.velocity.y);
                    if ball.velocity.y.abs() <= MIN_BOUNCE_SPEED {
                        ball.velocity.y = 0;
                    }
                }
            }
            continue;
        }
        if ball.lifecycle != Lifecycle::Normal {
            break;
        }

        if ball.touching_ramp
            && ball.velocity.x < SLIDE_SPEED_THRESHOLD
            && ball.slide_counter == 0
            && take_first_free(ball, ctx, [(1, step), (-1, step)])
        {
            ball.touching_ramp = false;
            continue;
        }

        if step == gravity.down() {
            bounce(ball, gravity);
        } else {
            ball.velocity.y = ROOF_COLLISION_SPEED * gravity.down();
        }
        break;
    }
}

/// Floor contact: halve and reverse, then settle or rubber-boost.
fn bounce(ball: &mut Ball, gravity: Gravity) {
    ball.velocity.y = neg_halve_div(ball.velocity.y);
    ball.grounded = true;

    if ball.touching_rubber && ball.holds(DIR_UP) {
        ball.touching_rubber = false;
        ball.jump_offset -= MIN_BOUNCE_SPEED * gravity.down();
    } else if ball.bonus.jump == 0 {
        ball.jump_offset = 0;
    }

    if ball.velocity.y.abs() < MIN_BOUNCE_SPEED {
        ball.velocity.y = MIN_BOUNCE_SPEED * gravity.down();
    }
}

fn accelerate(ball: &mut Ball) {
    let max_speed = if ball.bonus.speed > 0 {
        ball.bonus.speed -= 1;
        MAX_HORZ_BONUS_SPEED
    } else {
        MAX_HORZ_SPEED
    };

    let vx = ball.velocity.x;
    ball.velocity.x = if ball.holds(DIR_RIGHT) && vx < max_speed {
        vx + HORZ_ACCEL
    } else if ball.holds(DIR_LEFT) && vx > -max_speed {
        vx - HORZ_ACCEL
    } else if vx > 0 {
        (vx - FRICTION_DECEL).max(0)
    } else if vx < 0 {
        (vx + FRICTION_DECEL).min(0)
    } else {
        0
    };
}

fn horizontal_sweep(ball: &mut Ball, ctx: &mut PhysicsContext<'_>, gravity: Gravity) {
    let mut i = 0;
    while i < div_trunc(ball.velocity.x.abs(), STEP_DIVISOR) {
        i += 1;
        let step = sign(ball.velocity.x);
        let IVec2 { x, y } = ball.position;

        if probe(ball, ctx, x + step, y) {
            ball.position.x += step;
            continue;
        }
        if ball.lifecycle != Lifecycle::Normal {
            break;
        }

        if ball.touching_ramp {
            ball.touching_ramp = false;
            // climb first, then drop
            let up = -gravity.down();
            if take_first_free(ball, ctx, [(step, up), (step, -up)]) {
                continue;
            }
        }
        ball.velocity.x = neg_halve_shift(ball.velocity.x);
    }
}

/// Move by the first free offset, trying them in order.
fn take_first_free(ball: &mut Ball, ctx: &mut PhysicsContext<'_>, offsets: [(i32, i32); 2]) -> bool {
    for (dx, dy) in offsets {
        let candidate = ball.position.offset(dx, dy);
        if probe(ball, ctx, candidate.x, candidate.y) {
            ball.position = candidate;
            return true;
        }
    }
    false
}

// =============================================================================
// SIZE AND POP
// =============================================================================

/// Grow a small ball and move it to the nearest free spot.
///
/// The search widens from 2 px out to [`MAX_ENLARGE_OFFSET`]. If nothing is
/// free the ball grows in place.
pub fn enlarge(ball: &mut Ball, ctx: &mut PhysicsContext<'_>) {
    if ball.size == SizeState::Large {
        return;
    }
    ball.size = SizeState::Large;
    ctx.emit(GameEventData::BallResized { size: SizeState::Large });

    let nested = std::mem::replace(&mut ctx.resizing, true);
    let found = find_room(ball, ctx);
    ctx.resizing = nested;

    match found {
        Some(position) => {
            ball.position = position;
            debug!(x = position.x, y = position.y, "ball enlarged");
        }
        None => warn!(
            x = ball.position.x,
            y = ball.position.y,
            "no room to enlarge ball, growing in place"
        ),
    }
}

fn find_room(ball: &mut Ball, ctx: &mut PhysicsContext<'_>) -> Option<IVec2> {
    for offset in MIN_ENLARGE_OFFSET..=MAX_ENLARGE_OFFSET {
        for (dx, dy) in ENLARGE_DIRECTIONS {
            let candidate = ball.position.offset(dx * offset, dy * offset);
            if probe(ball, ctx, candidate.x, candidate.y) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Shrink a large ball, settling 2 px down or up if there is room.
pub fn shrink(ball: &mut Ball, ctx: &mut PhysicsContext<'_>) {
    if ball.size == SizeState::Small {
        return;
    }
    ball.size = SizeState::Small;
    ctx.emit(GameEventData::BallResized { size: SizeState::Small });

    let nested = std::mem::replace(&mut ctx.resizing, true);
    let _ = take_first_free(ball, ctx, [(0, SHRINK_NUDGE), (0, -SHRINK_NUDGE)]);
    ctx.resizing = nested;

    debug!(x = ball.position.x, y = ball.position.y, "ball shrunk");
}

/// Pop the ball unless the game reports invincibility.
pub fn pop(ball: &mut Ball, ctx: &mut PhysicsContext<'_>) {
    if ctx.hooks.invincible() {
        return;
    }
    ball.lifecycle = Lifecycle::Popped;
    ball.pop_counter = POPPED_FRAMES;
    ball.velocity = IVec2::ZERO;
    ball.jump_offset = 0;
    ball.bonus.clear();
    ctx.emit(GameEventData::LifeLost);

    debug!(x = ball.position.x, y = ball.position.y, "ball popped");
}

// =============================================================================
// TESTS
// =============================================================================
