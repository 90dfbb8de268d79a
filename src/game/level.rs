//! Level State
//!
//! The mutable tile grid, the moving spike blocks and the respawn point.
//! Reads outside the grid never fail: `get_tile` answers with a brick and
//! `tile_id` with empty, writes outside the grid are dropped.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::vec2::IVec2;
use super::tile::{
    Tile, TileKind, TILE_SIZE, ID_BRICK, ID_EMPTY, ID_RUBBER, ID_SPIKE_UP, ID_SPIKE_LEFT,
    ID_SPIKE_DOWN, ID_SPIKE_RIGHT, ID_CHECKPOINT, ID_EXIT, ID_MOVING_SPIKES,
    ID_RING_SMALL_VERT_TOP, ID_RING_SMALL_VERT_BOTTOM, ID_RING_SMALL_HORIZ_LEFT,
    ID_RING_SMALL_HORIZ_RIGHT, ID_RING_LARGE_VERT_TOP, ID_RING_LARGE_VERT_BOTTOM,
    ID_EXTRA_LIFE, ID_RAMP_FIRST, ID_RUBBER_RAMP_FIRST, ID_SPEED_BONUS, ID_DEFLATOR_FIRST,
    ID_INFLATOR_FIRST, ID_GRAVITY_FIRST, ID_JUMP_FIRST, RingOrientation, tile_kind,
};

/// Largest grid edge in tiles.
pub const MAX_LEVEL_DIM: usize = 255;

/// Most moving objects a level can hold.
pub const MAX_MOVING_OBJECTS: usize = 16;

/// Edge of the spike block carried by a moving object, in pixels.
pub const MOVING_SPIKE_PX: i32 = 2 * TILE_SIZE;

/// Errors raised while assembling a level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    /// Width or height is zero or above the limit.
    #[error("level dimensions {width}x{height} out of range (1..={max})", max = MAX_LEVEL_DIM)]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// Cell buffer does not match the dimensions.
    #[error("expected {expected} tiles, got {actual}")]
    TileCountMismatch {
        /// `width * height`
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// Moving object list is too long.
    #[error("too many moving objects: {0} (max {max})", max = MAX_MOVING_OBJECTS)]
    TooManyMovingObjects(usize),

    /// Fixture text contains a character with no tile mapping.
    #[error("unknown tile glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph {
        /// Offending character
        glyph: char,
        /// Column
        x: usize,
        /// Row
        y: usize,
    },
}

// =============================================================================
// MOVING OBJECTS
// =============================================================================

/// A 2x2 spike block bouncing inside a rectangular tile region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingObject {
    /// Region top-left, in tiles (inclusive)
    pub top_left: IVec2,
    /// Region bottom-right, in tiles (exclusive)
    pub bot_right: IVec2,
    /// Pixel offset of the block from `top_left`
    pub offset: IVec2,
    /// Per-axis step, each component -1, 0 or 1
    pub direction: IVec2,
}

impl MovingObject {
    /// Create a mover at rest in its top-left corner.
    pub fn new(top_left: IVec2, bot_right: IVec2, direction: IVec2) -> Self {
        Self {
            top_left,
            bot_right,
            offset: IVec2::ZERO,
            direction,
        }
    }

    /// Whether a tile coordinate lies inside the swept region.
    #[inline]
    pub fn contains_tile(&self, tx: i32, ty: i32) -> bool {
        self.top_left.x <= tx && tx < self.bot_right.x && self.top_left.y <= ty && ty < self.bot_right.y
    }

    /// Pixel origin of the spike block.
    #[inline]
    pub fn block_origin(&self) -> IVec2 {
        IVec2::new(
            self.top_left.x * TILE_SIZE + self.offset.x,
            self.top_left.y * TILE_SIZE + self.offset.y,
        )
    }

    /// Largest offset per axis before the block leaves the region.
    #[inline]
    pub fn max_offset(&self) -> IVec2 {
        IVec2::new(
            (self.bot_right.x - self.top_left.x - 2) * TILE_SIZE,
            (self.bot_right.y - self.top_left.y - 2) * TILE_SIZE,
        )
    }

    /// Advance one tick, reflecting at both ends of each axis.
    pub fn advance(&mut self) {
        let max = self.max_offset();
        step_axis(&mut self.offset.x, &mut self.direction.x, max.x);
        step_axis(&mut self.offset.y, &mut self.direction.y, max.y);
    }
}

fn step_axis(offset: &mut i32, direction: &mut i32, max: i32) {
    *offset += *direction;
    if *offset <= 0 {
        *offset = 0;
        *direction = -*direction;
    } else if *offset >= max {
        *offset = max;
        *direction = -*direction;
    }
}

// =============================================================================
// LEVEL
// =============================================================================

/// Tile grid plus the state that mutates with it.
///
/// Deserialization goes through [`Level::new`], so a snapshot with a bad
/// shape is rejected instead of producing a grid that indexes out of range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LevelData")]
pub struct Level {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    moving_objects: Vec<MovingObject>,
    respawn: IVec2,
    total_rings: u32,
}

/// Unchecked wire form of a [`Level`].
#[derive(Deserialize)]
struct LevelData {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    #[serde(default)]
    moving_objects: Vec<MovingObject>,
    #[serde(default)]
    respawn: IVec2,
    /// Missing means count the rings in the grid
    #[serde(default)]
    total_rings: Option<u32>,
}

impl TryFrom<LevelData> for Level {
    type Error = LevelError;

    fn try_from(data: LevelData) -> Result<Self, Self::Error> {
        let level = Level::new(data.width, data.height, data.tiles)?
            .with_moving_objects(data.moving_objects)?
            .with_respawn(data.respawn.x, data.respawn.y);
        Ok(match data.total_rings {
            Some(total) => level.with_total_rings(total),
            None => level,
        })
    }
}

impl Level {
    /// Build a level from row-major cells.
    pub fn new(width: usize, height: usize, tiles: Vec<Tile>) -> Result<Self, LevelError> {
        if width == 0 || height == 0 || width > MAX_LEVEL_DIM || height > MAX_LEVEL_DIM {
            return Err(LevelError::InvalidDimensions { width, height });
        }
        if tiles.len() != width * height {
            return Err(LevelError::TileCountMismatch {
                expected: width * height,
                actual: tiles.len(),
            });
        }
        let total_rings = count_ring_pairs(&tiles);
        Ok(Self {
            width: width as i32,
            height: height as i32,
            tiles,
            moving_objects: Vec::new(),
            respawn: IVec2::ZERO,
            total_rings,
        })
    }

    /// Empty level of the given size.
    pub fn empty(width: usize, height: usize) -> Result<Self, LevelError> {
        Self::new(width, height, vec![Tile::default(); width * height])
    }

    /// Build a level from fixture text, one string per row.
    ///
    /// | glyph | tile              | glyph | tile                   |
    /// |-------|-------------------|-------|------------------------|
    /// | `.`   | empty             | `~`   | empty water            |
    /// | `#`   | brick             | `B`   | rubber brick           |
    /// | `^ < v >` | spikes        | `C`   | checkpoint             |
    /// | `E`   | exit              | `M`   | moving spikes region   |
    /// | `o u` | small ring top/bottom | `O U` | large ring top/bottom |
    /// | `[ ]` | small ring left/right | `+` | extra life            |
    /// | `1-4` | ramps TL, TR, BR, BL | `5-8` | rubber ramps          |
    /// | `S`   | speed bonus       | `D`   | deflator (floor)       |
    /// | `I`   | inflator (floor)  | `G`   | gravity bonus (floor)  |
    /// | `J`   | jump bonus (floor)|       |                        |
    pub fn from_ascii(rows: &[&str]) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                tiles.push(glyph_tile(glyph).ok_or(LevelError::UnknownGlyph { glyph, x, y })?);
            }
        }
        Self::new(width, height, tiles)
    }

    /// Attach moving objects.
    pub fn with_moving_objects(mut self, objects: Vec<MovingObject>) -> Result<Self, LevelError> {
        if objects.len() > MAX_MOVING_OBJECTS {
            return Err(LevelError::TooManyMovingObjects(objects.len()));
        }
        self.moving_objects = objects;
        Ok(self)
    }

    /// Set the initial respawn tile.
    pub fn with_respawn(mut self, tx: i32, ty: i32) -> Self {
        self.respawn = IVec2::new(tx, ty);
        self
    }

    /// Override the ring pair count needed to open the exit.
    pub fn with_total_rings(mut self, total_rings: u32) -> Self {
        self.total_rings = total_rings;
        self
    }

    /// Width in tiles.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Width in pixels.
    #[inline]
    pub fn width_px(&self) -> i32 {
        self.width * TILE_SIZE
    }

    /// Ring pairs to collect before the exit opens.
    #[inline]
    pub fn total_rings(&self) -> u32 {
        self.total_rings
    }

    /// Whether a tile coordinate is on the grid.
    #[inline]
    pub fn in_bounds(&self, tx: i32, ty: i32) -> bool {
        tx >= 0 && tx < self.width && ty >= 0 && ty < self.height
    }

    #[inline]
    fn index(&self, tx: i32, ty: i32) -> Option<usize> {
        self.in_bounds(tx, ty).then(|| (ty * self.width + tx) as usize)
    }

    /// Raw cell. Off-grid reads as a brick wall.
    #[inline]
    pub fn get_tile(&self, tx: i32, ty: i32) -> Tile {
        self.index(tx, ty)
            .map_or(Tile::new(ID_BRICK, false), |i| self.tiles[i])
    }

    /// Tile id. Off-grid reads as empty.
    #[inline]
    pub fn tile_id(&self, tx: i32, ty: i32) -> u8 {
        self.index(tx, ty).map_or(ID_EMPTY, |i| self.tiles[i].id())
    }

    /// Replace a tile id, keeping the cell's flag bits. Off-grid writes are ignored.
    pub fn set_tile_id(&mut self, tx: i32, ty: i32, id: u8) {
        if let Some(i) = self.index(tx, ty) {
            self.tiles[i] = self.tiles[i].with_id(id);
        }
    }

    /// Overwrite a whole cell. Off-grid writes are ignored.
    pub fn set_tile(&mut self, tx: i32, ty: i32, tile: Tile) {
        if let Some(i) = self.index(tx, ty) {
            self.tiles[i] = tile;
        }
    }

    /// Current respawn tile.
    #[inline]
    pub fn respawn(&self) -> IVec2 {
        self.respawn
    }

    /// Move the respawn point.
    #[inline]
    pub fn set_respawn(&mut self, tx: i32, ty: i32) {
        self.respawn = IVec2::new(tx, ty);
    }

    /// All moving objects.
    #[inline]
    pub fn moving_objects(&self) -> &[MovingObject] {
        &self.moving_objects
    }

    /// First moving object whose region covers the tile.
    pub fn find_moving_object(&self, tx: i32, ty: i32) -> Option<&MovingObject> {
        self.moving_objects.iter().find(|o| o.contains_tile(tx, ty))
    }

    /// Advance every moving object one tick.
    pub fn update_moving_objects(&mut self) {
        for object in &mut self.moving_objects {
            object.advance();
        }
    }

    /// Hash cells, movers and respawn point.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_i32(self.width);
        hasher.update_i32(self.height);
        hasher.update_cells(self.tiles.iter().map(|t| t.0));
        hasher.update_u32(self.moving_objects.len() as u32);
        for object in &self.moving_objects {
            hasher.update_vec2(object.top_left);
            hasher.update_vec2(object.bot_right);
            hasher.update_vec2(object.offset);
            hasher.update_vec2(object.direction);
        }
        hasher.update_vec2(self.respawn);
    }
}

/// Active ring pairs, counted by their top or left halves.
fn count_ring_pairs(tiles: &[Tile]) -> u32 {
    tiles
        .iter()
        .filter(|t| {
            matches!(
                tile_kind(t.id()),
                TileKind::Ring {
                    active: true,
                    orientation: RingOrientation::VertTop | RingOrientation::HorizLeft,
                    ..
                }
            )
        })
        .count() as u32
}

fn glyph_tile(glyph: char) -> Option<Tile> {
    let id = match glyph {
        '.' => ID_EMPTY,
        '~' => return Some(Tile::new(ID_EMPTY, true)),
        '#' => ID_BRICK,
        'B' => ID_RUBBER,
        '^' => ID_SPIKE_UP,
        '<' => ID_SPIKE_LEFT,
        'v' => ID_SPIKE_DOWN,
        '>' => ID_SPIKE_RIGHT,
        'C' => ID_CHECKPOINT,
        'E' => ID_EXIT,
        'M' => ID_MOVING_SPIKES,
        'o' => ID_RING_SMALL_VERT_TOP,
        'u' => ID_RING_SMALL_VERT_BOTTOM,
        '[' => ID_RING_SMALL_HORIZ_LEFT,
        ']' => ID_RING_SMALL_HORIZ_RIGHT,
        'O' => ID_RING_LARGE_VERT_TOP,
        'U' => ID_RING_LARGE_VERT_BOTTOM,
        '+' => ID_EXTRA_LIFE,
        '1'..='4' => ID_RAMP_FIRST + (glyph as u8 - b'1'),
        '5'..='8' => ID_RUBBER_RAMP_FIRST + (glyph as u8 - b'5'),
        'S' => ID_SPEED_BONUS,
        'D' => ID_DEFLATOR_FIRST,
        'I' => ID_INFLATOR_FIRST,
        'G' => ID_GRAVITY_FIRST,
        'J' => ID_JUMP_FIRST,
        _ => return None,
    };
    Some(Tile::new(id, false))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::HashDomain;

    #[test]
    fn test_dimension_validation() {
        assert_eq!(
            Level::empty(0, 4).unwrap_err(),
            LevelError::InvalidDimensions { width: 0, height: 4 }
        );
        assert!(Level::empty(256, 1).is_err());
        assert!(Level::empty(255, 255).is_ok());
        assert_eq!(
            Level::new(2, 2, vec![Tile::default(); 3]).unwrap_err(),
            LevelError::TileCountMismatch { expected: 4, actual: 3 }
        );
    }

    #[test]
    fn test_off_grid_reads() {
        let level = Level::empty(3, 3).unwrap();
        assert_eq!(level.get_tile(-1, 0).id(), ID_BRICK);
        assert_eq!(level.get_tile(3, 0).id(), ID_BRICK);
        assert_eq!(level.tile_id(0, -1), ID_EMPTY);
        assert_eq!(level.tile_id(0, 3), ID_EMPTY);
        assert_eq!(level.get_tile(1, 1).id(), ID_EMPTY);
    }

    #[test]
    fn test_set_tile_id_keeps_flags() {
        let mut level = Level::from_ascii(&["~#", ".."]).unwrap();
        level.set_tile_id(0, 0, ID_EXTRA_LIFE);
        assert_eq!(level.tile_id(0, 0), ID_EXTRA_LIFE);
        assert!(level.get_tile(0, 0).is_water());

        let before = level.clone();
        level.set_tile_id(5, 5, ID_BRICK);
        level.set_tile_id(-1, 0, ID_BRICK);
        assert_eq!(level, before);
    }

    #[test]
    fn test_from_ascii() {
        let level = Level::from_ascii(&[
            "#..o#",
            "#..u#",
            "#1[]#",
            "#####",
        ])
        .unwrap();
        assert_eq!(level.width(), 5);
        assert_eq!(level.height(), 4);
        assert_eq!(level.width_px(), 60);
        assert_eq!(level.tile_id(3, 0), ID_RING_SMALL_VERT_TOP);
        assert_eq!(level.tile_id(1, 2), ID_RAMP_FIRST);
        assert_eq!(level.total_rings(), 2);

        assert_eq!(
            Level::from_ascii(&["#?"]).unwrap_err(),
            LevelError::UnknownGlyph { glyph: '?', x: 1, y: 0 }
        );
    }

    #[test]
    fn test_moving_object_limit() {
        let level = Level::empty(4, 4).unwrap();
        let mover = MovingObject::new(IVec2::new(0, 0), IVec2::new(4, 2), IVec2::new(1, 0));
        assert!(level.clone().with_moving_objects(vec![mover; 16]).is_ok());
        assert_eq!(
            level.with_moving_objects(vec![mover; 17]).unwrap_err(),
            LevelError::TooManyMovingObjects(17)
        );
    }

    #[test]
    fn test_moving_object_lookup_is_half_open() {
        let level = Level::empty(8, 8)
            .unwrap()
            .with_moving_objects(vec![MovingObject::new(
                IVec2::new(2, 2),
                IVec2::new(6, 4),
                IVec2::new(1, 0),
            )])
            .unwrap();
        assert!(level.find_moving_object(2, 2).is_some());
        assert!(level.find_moving_object(5, 3).is_some());
        assert!(level.find_moving_object(6, 3).is_none());
        assert!(level.find_moving_object(5, 4).is_none());
        assert!(level.find_moving_object(1, 2).is_none());
    }

    #[test]
    fn test_moving_object_reflects() {
        // region 4 tiles wide: block travels 0..=24 px
        let mut mover = MovingObject::new(IVec2::new(0, 0), IVec2::new(4, 2), IVec2::new(1, 0));
        assert_eq!(mover.max_offset(), IVec2::new(24, 0));

        mover.advance();
        assert_eq!(mover.offset.x, 1);
        // y axis sits at its lower bound and keeps flipping a zero direction
        assert_eq!(mover.offset.y, 0);

        for _ in 0..23 {
            mover.advance();
        }
        assert_eq!(mover.offset.x, 24);
        assert_eq!(mover.direction.x, -1);

        mover.advance();
        assert_eq!(mover.offset.x, 23);

        for _ in 0..23 {
            mover.advance();
        }
        assert_eq!(mover.offset.x, 0);
        assert_eq!(mover.direction.x, 1);
        assert_eq!(mover.block_origin(), IVec2::new(0, 0));
    }

    #[test]
    fn test_respawn_roundtrip() {
        let mut level = Level::empty(4, 4).unwrap().with_respawn(1, 2);
        assert_eq!(level.respawn(), IVec2::new(1, 2));
        level.set_respawn(3, 0);
        assert_eq!(level.respawn(), IVec2::new(3, 0));
    }

    #[test]
    fn test_hash_tracks_cells() {
        let level = Level::empty(4, 4).unwrap();
        let mut changed = level.clone();
        changed.set_tile_id(1, 1, ID_BRICK);

        let hash = |l: &Level| {
            let mut h = StateHasher::new(HashDomain::Simulation);
            l.hash_into(&mut h);
            h.finalize()
        };
        assert_eq!(hash(&level), hash(&level.clone()));
        assert_ne!(hash(&level), hash(&changed));
    }

    #[test]
    fn test_total_rings_override() {
        let level = Level::from_ascii(&[".o.", ".u."]).unwrap();
        assert_eq!(level.total_rings(), 1);
        assert_eq!(level.with_total_rings(3).total_rings(), 3);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let level = Level::from_ascii(&["#o#", "Cu."])
            .unwrap()
            .with_respawn(0, 1)
            .with_total_rings(2)
            .with_moving_objects(vec![MovingObject::new(IVec2::new(0, 0), IVec2::new(3, 2), IVec2::new(1, 0))])
            .unwrap();
        let json = serde_json::to_string(&level).unwrap();
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(back, level);
    }

    #[test]
    fn test_snapshot_missing_ring_total_counts_grid() {
        let json = r#"{ "width": 2, "height": 2, "tiles": [13, 0, 14, 0] }"#;
        let level: Level = serde_json::from_str(json).unwrap();
        assert_eq!(level.total_rings(), 1);
        assert_eq!(level.respawn(), IVec2::ZERO);
        assert!(level.moving_objects().is_empty());
    }

    #[test]
    fn test_malformed_snapshot_is_rejected() {
        let short = r#"{ "width": 5, "height": 5, "tiles": [], "moving_objects": [], "respawn": { "x": 0, "y": 0 }, "total_rings": 0 }"#;
        let err = serde_json::from_str::<Level>(short).unwrap_err();
        assert!(err.to_string().contains("expected 25 tiles, got 0"));

        let empty = r#"{ "width": 0, "height": 3, "tiles": [] }"#;
        assert!(serde_json::from_str::<Level>(empty).is_err());

        let negative = r#"{ "width": -1, "height": 1, "tiles": [0] }"#;
        assert!(serde_json::from_str::<Level>(negative).is_err());
    }
}
