//! Fixed-point world positions and integer tile coordinates.
//!
//! Entity positions are sub-tile world coordinates in fixed-point so that
//! placement and collision stay reproducible for a given seed. Tile
//! coordinates are plain signed integers: neighbor lookups routinely step
//! off the grid (the row above row 0) and must not wrap.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for world coordinates.
pub type Fixed = I32F32;

/// Tile width in world units.
pub const TILE_WIDTH: i32 = 16;
/// Tile height in world units.
pub const TILE_HEIGHT: i32 = 12;

/// Integer 2D vector, used for tile coordinates and bounding box sizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Vec2i {
    /// X component.
    pub x: i32,
    /// Y component.
    pub y: i32,
}

/// A tile coordinate on the grid.
pub type TilePos = Vec2i;

impl Vec2i {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new integer vector.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::ops::Add for Vec2i {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from whole world units.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Tile containing this world position.
    ///
    /// Rounds towards negative infinity, so small negative positions land
    /// in tile -1 rather than tile 0.
    #[must_use]
    pub fn to_tile(self) -> TilePos {
        Vec2i::new(
            (self.x / Fixed::from_num(TILE_WIDTH)).to_num::<i32>(),
            (self.y / Fixed::from_num(TILE_HEIGHT)).to_num::<i32>(),
        )
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// World position of the center of a tile.
#[must_use]
pub fn tile_center(tile: TilePos) -> Vec2Fixed {
    Vec2Fixed::new(
        Fixed::from_num(tile.x * TILE_WIDTH + TILE_WIDTH / 2),
        Fixed::from_num(tile.y * TILE_HEIGHT + TILE_HEIGHT / 2),
    )
}

/// Axis-aligned bounding box overlap between two boxes centered on
/// `pos1` and `pos2`.
///
/// Touching edges do not count as overlap.
#[must_use]
pub fn aabb_overlap(pos1: Vec2Fixed, pos2: Vec2Fixed, size1: Vec2i, size2: Vec2i) -> bool {
    let half_w = Fixed::from_num(size1.x + size2.x) / Fixed::from_num(2);
    let half_h = Fixed::from_num(size1.y + size2.y) / Fixed::from_num(2);
    (pos1.x - pos2.x).abs() < half_w && (pos1.y - pos2.y).abs() < half_h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_tile_floors() {
        let pos = Vec2Fixed::from_ints(17, 11);
        assert_eq!(pos.to_tile(), Vec2i::new(1, 0));

        let neg = Vec2Fixed::new(Fixed::from_num(-0.5), Fixed::ZERO);
        assert_eq!(neg.to_tile(), Vec2i::new(-1, 0));
    }

    #[test]
    fn test_tile_center_round_trips() {
        let tile = Vec2i::new(3, 7);
        assert_eq!(tile_center(tile).to_tile(), tile);
        assert_eq!(tile_center(tile), Vec2Fixed::from_ints(56, 90));
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Vec2Fixed::from_ints(10, 10);
        let size = Vec2i::new(4, 4);
        assert!(aabb_overlap(a, Vec2Fixed::from_ints(13, 10), size, size));
        // Exactly touching
        assert!(!aabb_overlap(a, Vec2Fixed::from_ints(14, 10), size, size));
        assert!(!aabb_overlap(a, Vec2Fixed::from_ints(10, 20), size, size));
    }

    #[test]
    fn test_fixed_determinism() {
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a * Fixed::from_num(7), b * Fixed::from_num(7));
    }
}
