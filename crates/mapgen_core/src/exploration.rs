//! Explored-tile bookkeeping and nearest-tile search.

use crate::error::{MapError, Result};
use crate::map::Map;
use crate::math::{TilePos, Vec2i};
use crate::tile::Tile;

impl Map {
    /// Mark a tile as seen by the player and visible in the line-of-sight
    /// buffer.
    ///
    /// Counts towards the explored percentage only the first time, and
    /// only for walkable tiles. Off-grid positions are ignored.
    pub fn mark_visited(&mut self, pos: TilePos) {
        let Some(tile) = self.grid.tile_mut(pos) else {
            return;
        };
        if !tile.is_visited && tile.can_walk() {
            self.tiles_seen += 1;
        }
        tile.is_visited = true;
        self.los.set_visible(pos, true);
    }

    /// Mark every tile as seen.
    pub fn mark_all_visited(&mut self) {
        for pos in self.grid.positions().collect::<Vec<_>>() {
            self.mark_visited(pos);
        }
    }

    /// Count of explorable (walkable) tiles, fixed at load.
    #[must_use]
    pub const fn num_explorable_tiles(&self) -> usize {
        self.num_explorable_tiles
    }

    /// Count of explorable tiles seen so far.
    #[must_use]
    pub const fn tiles_seen(&self) -> usize {
        self.tiles_seen
    }

    /// Recount explorable tiles from the current tile flags.
    pub fn count_explorable_tiles(&mut self) -> usize {
        self.num_explorable_tiles = self.grid.tiles().iter().filter(|t| t.can_walk()).count();
        self.num_explorable_tiles
    }

    /// Percentage of explorable tiles seen, rounded down.
    ///
    /// Zero for a map without explorable tiles.
    #[must_use]
    pub fn explored_percentage(&self) -> usize {
        (100 * self.tiles_seen)
            .checked_div(self.num_explorable_tiles)
            .unwrap_or(0)
    }

    /// Whether a tile is walkable and not yet seen.
    #[must_use]
    pub fn tile_is_unexplored(&self, pos: TilePos) -> bool {
        self.grid
            .tile(pos)
            .is_some_and(|t| !t.is_visited && t.can_walk())
    }

    /// Nearest tile to `start` satisfying `matches`, searching rings of
    /// growing radius and checking only each ring's perimeter.
    ///
    /// Fails with [`MapError::SearchExhausted`] once the radius reaches the
    /// grid's larger dimension.
    pub fn search_tile_around<F>(&self, start: TilePos, mut matches: F) -> Result<TilePos>
    where
        F: FnMut(&Map, TilePos) -> bool,
    {
        if matches(self, start) {
            return Ok(start);
        }
        let size = self.grid.size();
        for radius in 1..size.x.max(size.y) {
            for x in (start.x - radius).max(0)..=(start.x + radius).min(size.x - 1) {
                for y in (start.y - radius).max(0)..=(start.y + radius).min(size.y - 1) {
                    let on_ring = x == start.x - radius
                        || x == start.x + radius
                        || y == start.y - radius
                        || y == start.y + radius;
                    if !on_ring {
                        continue;
                    }
                    let tile = Vec2i::new(x, y);
                    if matches(self, tile) {
                        return Ok(tile);
                    }
                }
            }
        }
        Err(MapError::SearchExhausted { start })
    }

    /// Nearest walkable, unvisited tile to `start`.
    pub fn nearest_unexplored(&self, start: TilePos) -> Result<TilePos> {
        self.search_tile_around(start, |map, pos| map.tile_is_unexplored(pos))
    }
}

/// Convenience predicate: the tile exists and can be walked on.
#[must_use]
pub fn is_walkable(map: &Map, pos: TilePos) -> bool {
    map.grid().tile(pos).is_some_and(Tile::can_walk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessCode, BaseType};
    use crate::config::MapConfig;

    fn loaded(w: i32, h: i32, walls: &[(i32, i32)]) -> Map {
        let mut m = Map::with_size(MapConfig::default(), Vec2i::new(w, h)).unwrap();
        for &(x, y) in walls {
            m.grid_mut()
                .set_access_code(Vec2i::new(x, y), AccessCode::new(BaseType::Wall));
        }
        m.setup_tiles_and_walls();
        m.count_explorable_tiles();
        m
    }

    #[test]
    fn test_mark_visited_idempotent() {
        let mut m = loaded(4, 4, &[]);
        m.mark_visited(Vec2i::new(1, 1));
        m.mark_visited(Vec2i::new(1, 1));
        assert_eq!(m.tiles_seen(), 1);
        assert!(m.grid().tile(Vec2i::new(1, 1)).unwrap().is_visited);
        assert!(m.los().is_visible(Vec2i::new(1, 1)));
        assert!(!m.los().is_visible(Vec2i::new(2, 1)));
    }

    #[test]
    fn test_walls_do_not_count() {
        let mut m = loaded(4, 4, &[(0, 0)]);
        assert_eq!(m.num_explorable_tiles(), 15);
        m.mark_visited(Vec2i::new(0, 0));
        assert_eq!(m.tiles_seen(), 0);
        assert!(m.grid().tile(Vec2i::ZERO).unwrap().is_visited);
    }

    #[test]
    fn test_percentage_bounds() {
        let mut m = loaded(3, 3, &[(1, 1)]);
        assert_eq!(m.explored_percentage(), 0);
        m.mark_visited(Vec2i::new(0, 0));
        assert_eq!(m.explored_percentage(), 12); // floor(100 / 8)
        m.mark_all_visited();
        assert_eq!(m.explored_percentage(), 100);
    }

    #[test]
    fn test_percentage_without_explorable_tiles() {
        let m = Map::new(MapConfig::default());
        assert_eq!(m.explored_percentage(), 0);
    }

    #[test]
    fn test_search_returns_start_when_matching() {
        let m = loaded(5, 5, &[]);
        assert_eq!(m.nearest_unexplored(Vec2i::new(2, 2)).unwrap(), Vec2i::new(2, 2));
    }

    #[test]
    fn test_search_expands_rings() {
        let m = loaded(7, 7, &[(5, 3), (6, 6)]);
        let found = m
            .search_tile_around(Vec2i::new(3, 3), |map, pos| !is_walkable(map, pos))
            .unwrap();
        assert_eq!(found, Vec2i::new(5, 3));
    }

    #[test]
    fn test_search_near_corner_skips_off_grid() {
        let m = loaded(4, 4, &[]);
        let target = Vec2i::new(3, 3);
        let found = m
            .search_tile_around(Vec2i::ZERO, |_, pos| pos == target)
            .unwrap();
        assert_eq!(found, target);
    }

    #[test]
    fn test_search_exhausted() {
        let m = loaded(3, 3, &[]);
        let err = m.search_tile_around(Vec2i::new(1, 1), |_, _| false).unwrap_err();
        assert!(matches!(err, MapError::SearchExhausted { start } if start == Vec2i::new(1, 1)));
    }
}
