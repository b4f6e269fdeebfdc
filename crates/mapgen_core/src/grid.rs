//! Fixed-size tile grid with a parallel access-code layer.
//!
//! Reads are total: out-of-bounds tile reads return `None` and
//! out-of-bounds access reads return [`AccessCode::NOTHING`], so neighbor
//! probes never need their own bounds checks. Writes to the access layer
//! require an in-bounds position.

use serde::{Deserialize, Serialize};

use crate::access::{AccessCode, BaseType};
use crate::error::{MapError, Result};
use crate::math::{TilePos, Vec2Fixed, Vec2i};
use crate::tile::Tile;

/// The 2D tile array and its access layer, indexed `y * width + x`.
///
/// Both layers always have `width * height` entries and are never resized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: Vec2i,
    tiles: Vec<Tile>,
    access: Vec<AccessCode>,
}

impl Grid {
    /// Allocate a grid of default tiles, every cell `Floor`.
    pub fn new(size: Vec2i) -> Result<Self> {
        if size.x <= 0 || size.y <= 0 {
            return Err(MapError::InvalidSize {
                width: size.x,
                height: size.y,
            });
        }
        #[allow(clippy::cast_sign_loss)]
        let cell_count = size.x as usize * size.y as usize;
        Ok(Self {
            size,
            tiles: vec![Tile::default(); cell_count],
            access: vec![AccessCode::FLOOR; cell_count],
        })
    }

    /// Grid size in tiles.
    #[must_use]
    pub const fn size(&self) -> Vec2i {
        self.size
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.size.x
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.size.y
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True for the empty grid of a map that has not been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Check if a tile coordinate is inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size.x && pos.y < self.size.y
    }

    /// Check if a world position lies on a tile inside the grid.
    #[must_use]
    pub fn is_pos_in(&self, pos: Vec2Fixed) -> bool {
        self.in_bounds(pos.to_tile())
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn index(&self, pos: TilePos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.size.x as usize + pos.x as usize)
    }

    /// Tile at a coordinate, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    /// Mutable tile at a coordinate, or `None` outside the grid.
    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index(pos).map(|i| &mut self.tiles[i])
    }

    /// Access code at a coordinate; [`AccessCode::NOTHING`] outside the grid.
    #[must_use]
    pub fn access_code(&self, pos: TilePos) -> AccessCode {
        self.index(pos)
            .map_or(AccessCode::NOTHING, |i| self.access[i])
    }

    /// Base type at a coordinate; `Nothing` outside the grid.
    #[must_use]
    pub fn base_type(&self, pos: TilePos) -> BaseType {
        self.access_code(pos).base
    }

    /// Overwrite the access code of a cell.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the grid. Callers bounds-check writes.
    pub fn set_access_code(&mut self, pos: TilePos, code: AccessCode) {
        let Some(index) = self.index(pos) else {
            panic!(
                "access write at {pos:?} outside {}x{} grid",
                self.size.x, self.size.y
            );
        };
        self.access[index] = code;
    }

    /// Whether a cell carries any keycard access bit.
    #[must_use]
    pub fn is_tile_in_locked_room(&self, pos: TilePos) -> bool {
        self.access_code(pos).is_locked()
    }

    /// Whether the tile under a world position carries any access bit.
    #[must_use]
    pub fn is_pos_in_locked_room(&self, pos: Vec2Fixed) -> bool {
        self.is_tile_in_locked_room(pos.to_tile())
    }

    /// All tile coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> {
        let size = self.size;
        (0..size.y).flat_map(move |y| (0..size.x).map(move |x| Vec2i::new(x, y)))
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The access layer in row-major order.
    #[must_use]
    pub fn access_codes(&self) -> &[AccessCode] {
        &self.access
    }

    /// Replace the whole access layer.
    ///
    /// # Panics
    ///
    /// Panics if `codes` does not have one entry per cell.
    pub fn replace_access_codes(&mut self, codes: Vec<AccessCode>) {
        assert_eq!(
            codes.len(),
            self.access.len(),
            "access layer length must match grid"
        );
        self.access = codes;
    }

    /// Count of walls (non-walkable tiles) directly left, right, above and
    /// below. Border tiles report zero.
    #[must_use]
    pub fn num_walls_adjacent(&self, pos: TilePos) -> usize {
        if !self.is_interior(pos) {
            return 0;
        }
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter(|&(dx, dy)| !self.can_walk(pos.offset(dx, dy)))
            .count()
    }

    /// Count of walls among all 8 surrounding tiles. Border tiles report
    /// zero.
    #[must_use]
    pub fn num_walls_around(&self, pos: TilePos) -> usize {
        if !self.is_interior(pos) {
            return 0;
        }
        let diagonals = [(-1, -1), (1, 1), (1, -1), (-1, 1)]
            .into_iter()
            .filter(|&(dx, dy)| !self.can_walk(pos.offset(dx, dy)))
            .count();
        self.num_walls_adjacent(pos) + diagonals
    }

    fn is_interior(&self, pos: TilePos) -> bool {
        pos.x > 0 && pos.y > 0 && pos.x < self.size.x - 1 && pos.y < self.size.y - 1
    }

    fn can_walk(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(Tile::can_walk)
    }
}
