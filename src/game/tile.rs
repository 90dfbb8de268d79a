//! Tiles and Tile Metadata
//!
//! A grid cell is one byte: the low six bits are the tile id, bit 6 marks
//! water, bit 7 is carried through untouched for the level loader.
//!
//! Collision and effect logic never branches on raw ids. Every id maps to a
//! [`TileKind`] through [`TILE_TABLE`], and the detector matches on the kind.

use serde::{Serialize, Deserialize};

/// Edge length of a tile in pixels.
pub const TILE_SIZE: i32 = 12;

/// Number of entries in the metadata table (ids `0..TILE_COUNT`).
pub const TILE_COUNT: usize = 55;

// =============================================================================
// TILE IDS
// =============================================================================

/// Empty space
pub const ID_EMPTY: u8 = 0;
/// Solid brick
pub const ID_BRICK: u8 = 1;
/// Rubber brick
pub const ID_RUBBER: u8 = 2;
/// Spikes pointing up
pub const ID_SPIKE_UP: u8 = 3;
/// Spikes pointing left
pub const ID_SPIKE_LEFT: u8 = 4;
/// Spikes pointing down
pub const ID_SPIKE_DOWN: u8 = 5;
/// Spikes pointing right
pub const ID_SPIKE_RIGHT: u8 = 6;
/// Checkpoint gem, not yet taken
pub const ID_CHECKPOINT: u8 = 7;
/// Checkpoint indicator left behind once a gem is taken
pub const ID_CHECKPOINT_USED: u8 = 8;
/// Level exit
pub const ID_EXIT: u8 = 9;
/// Moving spikes region marker
pub const ID_MOVING_SPIKES: u8 = 10;
/// Small active ring, vertical, top half
pub const ID_RING_SMALL_VERT_TOP: u8 = 13;
/// Small active ring, vertical, bottom half
pub const ID_RING_SMALL_VERT_BOTTOM: u8 = 14;
/// Small active ring, horizontal, left half
pub const ID_RING_SMALL_HORIZ_LEFT: u8 = 15;
/// Small active ring, horizontal, right half
pub const ID_RING_SMALL_HORIZ_RIGHT: u8 = 16;
/// Large active ring, vertical, top half
pub const ID_RING_LARGE_VERT_TOP: u8 = 21;
/// Large active ring, vertical, bottom half
pub const ID_RING_LARGE_VERT_BOTTOM: u8 = 22;
/// Large active ring, horizontal, left half
pub const ID_RING_LARGE_HORIZ_LEFT: u8 = 23;
/// Large active ring, horizontal, right half
pub const ID_RING_LARGE_HORIZ_RIGHT: u8 = 24;
/// Offset from an active ring id to its inactive counterpart
pub const RING_INACTIVE_OFFSET: u8 = 4;
/// Extra life crystal
pub const ID_EXTRA_LIFE: u8 = 29;
/// First rigid ramp id (top-left corner)
pub const ID_RAMP_FIRST: u8 = 30;
/// First rubber ramp id (top-left corner)
pub const ID_RUBBER_RAMP_FIRST: u8 = 34;
/// Speed bonus
pub const ID_SPEED_BONUS: u8 = 38;
/// First deflator id (floor)
pub const ID_DEFLATOR_FIRST: u8 = 39;
/// First inflator id (floor)
pub const ID_INFLATOR_FIRST: u8 = 43;
/// First gravity bonus id (floor)
pub const ID_GRAVITY_FIRST: u8 = 47;
/// First jump bonus id (floor)
pub const ID_JUMP_FIRST: u8 = 51;

// =============================================================================
// TILE BYTE
// =============================================================================

/// One grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tile(pub u8);

impl Tile {
    /// Bits holding the tile id.
    pub const ID_MASK: u8 = 0x3F;
    /// Water flag bit.
    pub const WATER_FLAG: u8 = 0x40;

    /// Build a tile from an id and water flag.
    #[inline]
    pub const fn new(id: u8, water: bool) -> Self {
        let flags = if water { Self::WATER_FLAG } else { 0 };
        Self((id & Self::ID_MASK) | flags)
    }

    /// Tile type id.
    #[inline]
    pub const fn id(self) -> u8 {
        self.0 & Self::ID_MASK
    }

    /// Whether the cell is under water.
    #[inline]
    pub const fn is_water(self) -> bool {
        self.0 & Self::WATER_FLAG != 0
    }

    /// Non-id bits.
    #[inline]
    pub const fn flags(self) -> u8 {
        self.0 & !Self::ID_MASK
    }

    /// Same flags, different id.
    #[inline]
    pub const fn with_id(self, id: u8) -> Self {
        Self(self.flags() | (id & Self::ID_MASK))
    }
}

// =============================================================================
// TILE KINDS
// =============================================================================

/// Axis along which a thin tile is narrowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThinAxis {
    /// Narrowed horizontally: `[x + 4, x + 8]`
    X,
    /// Narrowed vertically: `[y + 4, y + 8]`
    Y,
}

/// Filled corner of a ramp tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RampCorner {
    /// Solid in the top-left
    TopLeft,
    /// Solid in the top-right
    TopRight,
    /// Solid in the bottom-right
    BottomRight,
    /// Solid in the bottom-left
    BottomLeft,
}

impl RampCorner {
    /// Column and row offsets used to mirror the triangle mask.
    pub const fn mask_offset(self) -> (i32, i32) {
        match self {
            RampCorner::TopLeft => (11, 11),
            RampCorner::TopRight => (0, 11),
            RampCorner::BottomRight => (0, 0),
            RampCorner::BottomLeft => (11, 0),
        }
    }

    const fn from_index(index: u8) -> Self {
        match index {
            0 => RampCorner::TopLeft,
            1 => RampCorner::TopRight,
            2 => RampCorner::BottomRight,
            _ => RampCorner::BottomLeft,
        }
    }
}

/// Which half of a ring a tile holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingOrientation {
    /// Vertical ring, upper half
    VertTop,
    /// Vertical ring, lower half (the exit side)
    VertBottom,
    /// Horizontal ring, left half
    HorizLeft,
    /// Horizontal ring, right half
    HorizRight,
}

impl RingOrientation {
    /// Thin axis of the ring half.
    pub const fn thin_axis(self) -> ThinAxis {
        match self {
            RingOrientation::VertTop | RingOrientation::VertBottom => ThinAxis::X,
            RingOrientation::HorizLeft | RingOrientation::HorizRight => ThinAxis::Y,
        }
    }

    /// Tile offset to the other half of the pair.
    pub const fn partner_offset(self) -> (i32, i32) {
        match self {
            RingOrientation::VertTop => (0, 1),
            RingOrientation::VertBottom => (0, -1),
            RingOrientation::HorizLeft => (1, 0),
            RingOrientation::HorizRight => (-1, 0),
        }
    }

    /// Orientation of the other half of the pair.
    pub const fn partner(self) -> Self {
        match self {
            RingOrientation::VertTop => RingOrientation::VertBottom,
            RingOrientation::VertBottom => RingOrientation::VertTop,
            RingOrientation::HorizLeft => RingOrientation::HorizRight,
            RingOrientation::HorizRight => RingOrientation::HorizLeft,
        }
    }

    const fn index(self) -> u8 {
        match self {
            RingOrientation::VertTop => 0,
            RingOrientation::VertBottom => 1,
            RingOrientation::HorizLeft => 2,
            RingOrientation::HorizRight => 3,
        }
    }

    const fn from_index(index: u8) -> Self {
        match index {
            0 => RingOrientation::VertTop,
            1 => RingOrientation::VertBottom,
            2 => RingOrientation::HorizLeft,
            _ => RingOrientation::HorizRight,
        }
    }
}

/// Ring diameter class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingSize {
    /// Fits only the small ball
    Small,
    /// Fits both ball sizes
    Large,
}

/// Wall a pickup tile is mounted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wall {
    /// Mounted on the floor
    Floor,
    /// Mounted on a left wall
    LeftWall,
    /// Mounted on the ceiling
    Ceiling,
    /// Mounted on a right wall
    RightWall,
}

impl Wall {
    const fn from_index(index: u8) -> Self {
        match index {
            0 => Wall::Floor,
            1 => Wall::LeftWall,
            2 => Wall::Ceiling,
            _ => Wall::RightWall,
        }
    }

    /// Thin axis of an inflator mounted on this wall.
    pub const fn inflator_axis(self) -> ThinAxis {
        match self {
            Wall::Floor | Wall::Ceiling => ThinAxis::X,
            Wall::LeftWall | Wall::RightWall => ThinAxis::Y,
        }
    }
}

/// Timed bonus armed by a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusKind {
    /// Raises the horizontal speed cap
    Speed,
    /// Reverses gravity
    Gravity,
    /// Raises jump strength
    Jump,
}

/// Collision and effect class of a tile id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// No collision, no effect
    Passable,
    /// Full square tested against the ball footprint mask
    Solid {
        /// Rubber bricks assist bounce jumps
        rubber: bool,
    },
    /// Pops the ball on thin-rect contact
    Spike {
        /// Narrowed axis
        axis: ThinAxis,
    },
    /// Region swept by a 2x2 spike block
    MovingSpikes,
    /// One half of a ring
    Ring {
        /// Diameter class
        size: RingSize,
        /// Which half
        orientation: RingOrientation,
        /// Not yet collected
        active: bool,
    },
    /// Triangular slope
    Ramp {
        /// Filled corner
        corner: RampCorner,
        /// Rubber ramps keep full speed on redirect
        rubber: bool,
    },
    /// Timed bonus pickup, always blocks
    Bonus {
        /// Bonus armed on contact
        kind: BonusKind,
        /// Mounting wall
        wall: Wall,
    },
    /// Checkpoint gem
    Checkpoint,
    /// Level exit, blocks until the door is open
    Exit,
    /// Extra life crystal
    ExtraLife,
    /// Shrinks a large ball, always blocks
    Deflator {
        /// Mounting wall
        wall: Wall,
    },
    /// Enlarges a small ball on thin-rect contact
    Inflator {
        /// Mounting wall
        wall: Wall,
    },
}

impl TileKind {
    /// Thin axis for kinds tested with the narrowed rectangle.
    pub const fn thin_axis(self) -> Option<ThinAxis> {
        match self {
            TileKind::Spike { axis } => Some(axis),
            TileKind::Ring { orientation, .. } => Some(orientation.thin_axis()),
            TileKind::Inflator { wall } => Some(wall.inflator_axis()),
            _ => None,
        }
    }
}

// =============================================================================
// RENDER METADATA
// =============================================================================

/// Image transform applied to the atlas sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// As stored
    None,
    /// Rotated 90 degrees clockwise
    Rot90,
    /// Rotated 180 degrees
    Rot180,
    /// Rotated 270 degrees clockwise
    Rot270,
    /// Mirrored horizontally
    FlipX,
    /// Mirrored vertically
    FlipY,
}

/// How the renderer draws the tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderHint {
    /// Single sprite
    Normal,
    /// Multi-tile composite (moving spikes)
    Composite,
    /// Ring half drawn in two layers around the ball
    Hoop,
}

/// Atlas index meaning "no sprite".
pub const NO_SPRITE: u8 = 255;

/// Immutable per-id tile description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMeta {
    /// Collision and effect class
    pub kind: TileKind,
    /// Sprite transform
    pub transform: Transform,
    /// Sprite atlas index, `NO_SPRITE` for none
    pub atlas_index: u8,
    /// Render hint
    pub render: RenderHint,
}

const fn meta(kind: TileKind, transform: Transform, atlas_index: u8, render: RenderHint) -> TileMeta {
    TileMeta { kind, transform, atlas_index, render }
}

const fn ring_meta(id: u8) -> TileMeta {
    let rel = id - ID_RING_SMALL_VERT_TOP;
    let size = if rel < 8 { RingSize::Small } else { RingSize::Large };
    let active = rel % 8 < 4;
    let atlas_index = match (rel / 4) as u8 {
        0 => 21,
        1 => 23,
        2 => 20,
        _ => 22,
    };
    meta(
        TileKind::Ring {
            size,
            orientation: RingOrientation::from_index(rel % 4),
            active,
        },
        Transform::None,
        atlas_index,
        RenderHint::Hoop,
    )
}

const fn ramp_meta(id: u8) -> TileMeta {
    let rel = id - ID_RAMP_FIRST;
    let corner = RampCorner::from_index(rel % 4);
    let transform = match corner {
        RampCorner::TopLeft => Transform::Rot180,
        RampCorner::TopRight => Transform::Rot90,
        RampCorner::BottomRight => Transform::None,
        RampCorner::BottomLeft => Transform::Rot270,
    };
    let rubber = rel >= 4;
    let atlas_index = if rubber { 8 } else { 0 };
    meta(TileKind::Ramp { corner, rubber }, transform, atlas_index, RenderHint::Normal)
}

const fn wall_transform(wall: Wall) -> Transform {
    match wall {
        Wall::Floor => Transform::None,
        Wall::LeftWall => Transform::Rot90,
        Wall::Ceiling => Transform::Rot180,
        Wall::RightWall => Transform::Rot270,
    }
}

const fn wall_meta(id: u8) -> TileMeta {
    let (first, atlas_index) = if id >= ID_JUMP_FIRST {
        (ID_JUMP_FIRST, 10)
    } else if id >= ID_GRAVITY_FIRST {
        (ID_GRAVITY_FIRST, 11)
    } else if id >= ID_INFLATOR_FIRST {
        (ID_INFLATOR_FIRST, 18)
    } else {
        (ID_DEFLATOR_FIRST, 7)
    };
    let wall = Wall::from_index(id - first);
    let kind = match first {
        ID_JUMP_FIRST => TileKind::Bonus { kind: BonusKind::Jump, wall },
        ID_GRAVITY_FIRST => TileKind::Bonus { kind: BonusKind::Gravity, wall },
        ID_INFLATOR_FIRST => TileKind::Inflator { wall },
        _ => TileKind::Deflator { wall },
    };
    // jump pickups are drawn mirrored on the side walls
    let transform = match (first, wall) {
        (ID_JUMP_FIRST, Wall::LeftWall) => Transform::Rot270,
        (ID_JUMP_FIRST, Wall::RightWall) => Transform::Rot90,
        _ => wall_transform(wall),
    };
    meta(kind, transform, atlas_index, RenderHint::Normal)
}

/// Tile metadata indexed by id.
pub static TILE_TABLE: [TileMeta; TILE_COUNT] = {
    use RenderHint::Normal;
    let empty = meta(TileKind::Passable, Transform::None, NO_SPRITE, Normal);
    let mut table = [empty; TILE_COUNT];

    table[ID_BRICK as usize] = meta(TileKind::Solid { rubber: false }, Transform::None, 1, Normal);
    table[ID_RUBBER as usize] = meta(TileKind::Solid { rubber: true }, Transform::None, 9, Normal);
    table[ID_SPIKE_UP as usize] = meta(TileKind::Spike { axis: ThinAxis::X }, Transform::None, 12, Normal);
    table[ID_SPIKE_LEFT as usize] = meta(TileKind::Spike { axis: ThinAxis::Y }, Transform::Rot270, 12, Normal);
    table[ID_SPIKE_DOWN as usize] = meta(TileKind::Spike { axis: ThinAxis::X }, Transform::FlipY, 12, Normal);
    table[ID_SPIKE_RIGHT as usize] = meta(TileKind::Spike { axis: ThinAxis::Y }, Transform::Rot90, 12, Normal);
    table[ID_CHECKPOINT as usize] = meta(TileKind::Checkpoint, Transform::None, 16, Normal);
    table[ID_CHECKPOINT_USED as usize] = meta(TileKind::Passable, Transform::None, 19, Normal);
    table[ID_EXIT as usize] = meta(TileKind::Exit, Transform::None, 14, Normal);
    table[ID_MOVING_SPIKES as usize] =
        meta(TileKind::MovingSpikes, Transform::None, 13, RenderHint::Composite);

    let mut id = ID_RING_SMALL_VERT_TOP;
    while id < ID_EXTRA_LIFE {
        table[id as usize] = ring_meta(id);
        id += 1;
    }

    table[ID_EXTRA_LIFE as usize] = meta(TileKind::ExtraLife, Transform::None, 15, Normal);

    let mut id = ID_RAMP_FIRST;
    while id < ID_SPEED_BONUS {
        table[id as usize] = ramp_meta(id);
        id += 1;
    }

    table[ID_SPEED_BONUS as usize] = meta(
        TileKind::Bonus { kind: BonusKind::Speed, wall: Wall::Floor },
        Transform::FlipX,
        5,
        Normal,
    );

    let mut id = ID_DEFLATOR_FIRST;
    while (id as usize) < TILE_COUNT {
        table[id as usize] = wall_meta(id);
        id += 1;
    }

    table
};

/// Look up metadata for an id. Ids past the table are unknown.
#[inline]
pub fn tile_meta(id: u8) -> Option<&'static TileMeta> {
    TILE_TABLE.get(id as usize)
}

/// Kind for an id, `Passable` for unknown ids.
#[inline]
pub fn tile_kind(id: u8) -> TileKind {
    tile_meta(id).map_or(TileKind::Passable, |m| m.kind)
}

/// Id of a ring half with the given attributes.
pub const fn ring_id(size: RingSize, orientation: RingOrientation, active: bool) -> u8 {
    let base = match size {
        RingSize::Small => ID_RING_SMALL_VERT_TOP,
        RingSize::Large => ID_RING_LARGE_VERT_TOP,
    };
    let state = if active { 0 } else { RING_INACTIVE_OFFSET };
    base + state + orientation.index()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_byte_fields() {
        let tile = Tile(0x40 | 0x80 | ID_BRICK);
        assert_eq!(tile.id(), ID_BRICK);
        assert!(tile.is_water());
        assert_eq!(tile.flags(), 0xC0);

        let rewritten = tile.with_id(ID_EMPTY);
        assert_eq!(rewritten.0, 0xC0);
        assert!(rewritten.is_water());

        assert_eq!(Tile::new(ID_RUBBER, true).0, 0x42);
        assert_eq!(Tile::new(0xFF, false).id(), 0x3F);
    }

    #[test]
    fn test_table_length_and_unknown_ids() {
        assert_eq!(TILE_TABLE.len(), 55);
        assert!(tile_meta(54).is_some());
        assert!(tile_meta(55).is_none());
        assert!(tile_meta(63).is_none());
        assert_eq!(tile_kind(60), TileKind::Passable);
    }

    #[test]
    fn test_passable_ids() {
        for id in [ID_EMPTY, ID_CHECKPOINT_USED, 11, 12] {
            assert_eq!(tile_kind(id), TileKind::Passable, "id {}", id);
        }
    }

    #[test]
    fn test_spike_axes() {
        assert_eq!(tile_kind(ID_SPIKE_UP), TileKind::Spike { axis: ThinAxis::X });
        assert_eq!(tile_kind(ID_SPIKE_LEFT), TileKind::Spike { axis: ThinAxis::Y });
        assert_eq!(tile_kind(ID_SPIKE_DOWN), TileKind::Spike { axis: ThinAxis::X });
        assert_eq!(tile_kind(ID_SPIKE_RIGHT), TileKind::Spike { axis: ThinAxis::Y });
    }

    #[test]
    fn test_ring_layout() {
        assert_eq!(
            tile_kind(13),
            TileKind::Ring { size: RingSize::Small, orientation: RingOrientation::VertTop, active: true }
        );
        assert_eq!(
            tile_kind(18),
            TileKind::Ring { size: RingSize::Small, orientation: RingOrientation::VertBottom, active: false }
        );
        assert_eq!(
            tile_kind(24),
            TileKind::Ring { size: RingSize::Large, orientation: RingOrientation::HorizRight, active: true }
        );
        assert_eq!(
            tile_kind(27),
            TileKind::Ring { size: RingSize::Large, orientation: RingOrientation::HorizLeft, active: false }
        );

        for id in 13..=28u8 {
            if let TileKind::Ring { size, orientation, active } = tile_kind(id) {
                assert_eq!(ring_id(size, orientation, active), id);
                assert_eq!(TILE_TABLE[id as usize].render, RenderHint::Hoop);
            } else {
                panic!("id {} is not a ring", id);
            }
        }
    }

    #[test]
    fn test_ramp_layout() {
        assert_eq!(tile_kind(30), TileKind::Ramp { corner: RampCorner::TopLeft, rubber: false });
        assert_eq!(tile_kind(33), TileKind::Ramp { corner: RampCorner::BottomLeft, rubber: false });
        assert_eq!(tile_kind(35), TileKind::Ramp { corner: RampCorner::TopRight, rubber: true });
        assert_eq!(tile_kind(36), TileKind::Ramp { corner: RampCorner::BottomRight, rubber: true });
        assert_eq!(TILE_TABLE[30].transform, Transform::Rot180);
        assert_eq!(TILE_TABLE[37].atlas_index, 8);
    }

    #[test]
    fn test_wall_pickups() {
        assert_eq!(tile_kind(38), TileKind::Bonus { kind: BonusKind::Speed, wall: Wall::Floor });
        assert_eq!(tile_kind(41), TileKind::Deflator { wall: Wall::Ceiling });
        assert_eq!(tile_kind(44), TileKind::Inflator { wall: Wall::LeftWall });
        assert_eq!(tile_kind(50), TileKind::Bonus { kind: BonusKind::Gravity, wall: Wall::RightWall });
        assert_eq!(tile_kind(51), TileKind::Bonus { kind: BonusKind::Jump, wall: Wall::Floor });
        assert_eq!(TILE_TABLE[52].transform, Transform::Rot270);
        assert_eq!(TILE_TABLE[48].transform, Transform::Rot90);
    }

    #[test]
    fn test_thin_axes() {
        assert_eq!(tile_kind(43).thin_axis(), Some(ThinAxis::X));
        assert_eq!(tile_kind(46).thin_axis(), Some(ThinAxis::Y));
        assert_eq!(tile_kind(14).thin_axis(), Some(ThinAxis::X));
        assert_eq!(tile_kind(16).thin_axis(), Some(ThinAxis::Y));
        assert_eq!(tile_kind(ID_EXIT).thin_axis(), None);
        assert_eq!(tile_kind(ID_BRICK).thin_axis(), None);
    }

    #[test]
    fn test_ring_partners() {
        for o in [
            RingOrientation::VertTop,
            RingOrientation::VertBottom,
            RingOrientation::HorizLeft,
            RingOrientation::HorizRight,
        ] {
            assert_eq!(o.partner().partner(), o);
            let (dx, dy) = o.partner_offset();
            let (px, py) = o.partner().partner_offset();
            assert_eq!((dx + px, dy + py), (0, 0));
        }
    }
}
