//! Line-of-sight visibility buffer.
//!
//! Sized with the grid at load and torn down with it. The ray casting that
//! decides what the player sees lives with the gameplay code; tiles it
//! reports through [`Map::mark_visited`](crate::map::Map::mark_visited)
//! become visible here.

use crate::math::{TilePos, Vec2i};

/// Per-tile "currently visible" flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineOfSight {
    size: Vec2i,
    visible: Vec<bool>,
}

impl LineOfSight {
    /// Allocate a buffer for a grid of the given size, nothing visible.
    pub fn init(&mut self, size: Vec2i) {
        self.size = size;
        #[allow(clippy::cast_sign_loss)]
        let cells = size.x.max(0) as usize * size.y.max(0) as usize;
        self.visible = vec![false; cells];
    }

    /// Release the buffer.
    pub fn terminate(&mut self) {
        self.size = Vec2i::ZERO;
        self.visible = Vec::new();
    }

    /// Size the buffer was initialized with.
    #[must_use]
    pub const fn size(&self) -> Vec2i {
        self.size
    }

    #[allow(clippy::cast_sign_loss)]
    fn index(&self, pos: TilePos) -> Option<usize> {
        (pos.x >= 0 && pos.y >= 0 && pos.x < self.size.x && pos.y < self.size.y)
            .then(|| pos.y as usize * self.size.x as usize + pos.x as usize)
    }

    /// Whether a tile is currently visible. False outside the grid.
    #[must_use]
    pub fn is_visible(&self, pos: TilePos) -> bool {
        self.index(pos).is_some_and(|i| self.visible[i])
    }

    /// Set the visibility of a tile. Ignored outside the grid.
    pub fn set_visible(&mut self, pos: TilePos, visible: bool) {
        if let Some(i) = self.index(pos) {
            self.visible[i] = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_and_terminate() {
        let mut los = LineOfSight::default();
        los.init(Vec2i::new(4, 4));
        los.set_visible(Vec2i::new(1, 2), true);
        assert!(los.is_visible(Vec2i::new(1, 2)));
        assert!(!los.is_visible(Vec2i::new(5, 2)));
        los.set_visible(Vec2i::new(-1, 0), true);
        assert!(!los.is_visible(Vec2i::new(-1, 0)));

        los.terminate();
        assert_eq!(los.size(), Vec2i::ZERO);
        assert!(!los.is_visible(Vec2i::new(1, 2)));
    }
}
