//! Per-tile occupant index and localized collision queries.
//!
//! Each tile keeps the [`ThingId`]s of the things standing on it. A thing
//! is listed on at most one tile at a time: moves remove from the old tile
//! before inserting into the new one.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::map::Map;
use crate::math::{aabb_overlap, Fixed, TilePos, Vec2Fixed, Vec2i};
use crate::tile::{ThingId, ThingKind, Tile};

/// Position and footprint of a dynamic thing, as tracked by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileItem {
    /// Id within the kind's id space.
    pub id: u32,
    /// Kind of thing.
    pub kind: ThingKind,
    /// World position; `None` until first placed.
    pub pos: Option<Vec2Fixed>,
    /// Bounding box size in world units, centered on `pos`.
    pub size: Vec2i,
}

impl TileItem {
    /// Create an item that has not been placed yet.
    #[must_use]
    pub const fn new(id: u32, kind: ThingKind, size: Vec2i) -> Self {
        Self {
            id,
            kind,
            pos: None,
            size,
        }
    }

    /// The reference stored in tile occupant lists.
    #[must_use]
    pub const fn thing_id(&self) -> ThingId {
        ThingId::new(self.id, self.kind)
    }
}

/// Resolves thing references back to their tracked position and size.
///
/// Implemented by whatever owns the real actors, objects and pickups.
pub trait ThingRegistry {
    /// Tracked item for a reference, if it still exists.
    fn tile_item(&self, thing: ThingId) -> Option<&TileItem>;
}

impl ThingRegistry for BTreeMap<ThingId, TileItem> {
    fn tile_item(&self, thing: ThingId) -> Option<&TileItem> {
        self.get(&thing)
    }
}

impl ThingRegistry for HashMap<ThingId, TileItem> {
    fn tile_item(&self, thing: ThingId) -> Option<&TileItem> {
        self.get(&thing)
    }
}

impl Map {
    /// Append a thing to a tile's occupant list. No de-duplication.
    ///
    /// # Panics
    ///
    /// Panics if `tile` is outside the grid.
    pub fn insert_thing(&mut self, tile: TilePos, thing: ThingId) {
        let Some(t) = self.grid.tile_mut(tile) else {
            panic!("cannot insert {thing:?} at {tile:?}: outside grid");
        };
        t.things.push(thing);
    }

    /// Remove the first matching reference from a tile's occupant list.
    ///
    /// # Panics
    ///
    /// Panics if `tile` is outside the grid or the thing is not listed
    /// there; either means the index is out of sync with its owner.
    pub fn remove_thing(&mut self, tile: TilePos, thing: ThingId) {
        let Some(t) = self.grid.tile_mut(tile) else {
            panic!("cannot remove {thing:?} at {tile:?}: outside grid");
        };
        let Some(index) = t.things.iter().position(|&other| other == thing) else {
            panic!("{thing:?} not found on tile {tile:?}");
        };
        t.things.remove(index);
    }

    /// Remove an item from the tile under its current position.
    ///
    /// Items that were never placed, or sit outside the grid, are ignored.
    pub fn remove_tile_item(&mut self, item: &TileItem) {
        let Some(pos) = item.pos else {
            return;
        };
        if !self.grid.is_pos_in(pos) {
            return;
        }
        self.remove_thing(pos.to_tile(), item.thing_id());
    }

    /// Move an item to a new world position, keeping the index in sync.
    ///
    /// Returns `false`, changing nothing, if `pos` is outside the grid.
    /// Moves within the same tile only update the stored position.
    pub fn try_move_tile_item(&mut self, item: &mut TileItem, pos: Vec2Fixed) -> bool {
        if !self.grid.is_pos_in(pos) {
            return false;
        }
        let new_tile = pos.to_tile();
        match item.pos {
            Some(old) if old.to_tile() == new_tile => {
                item.pos = Some(pos);
                return true;
            }
            Some(_) => self.remove_tile_item(item),
            None => {}
        }
        item.pos = Some(pos);
        #[cfg(feature = "debug-validation")]
        assert!(
            !self
                .grid
                .tiles()
                .iter()
                .any(|t| t.things.contains(&item.thing_id())),
            "{:?} already listed on another tile",
            item.thing_id()
        );
        self.insert_thing(new_tile, item.thing_id());
        true
    }

    /// Whether a box of `size` centered at `pos` touches a non-walkable or
    /// off-grid tile.
    #[must_use]
    pub fn is_collision_with_wall(&self, pos: Vec2Fixed, size: Vec2i) -> bool {
        let two = Fixed::from_num(2);
        let half = Vec2Fixed::new(Fixed::from_num(size.x) / two, Fixed::from_num(size.y) / two);
        let min = (pos - half).to_tile();
        let max = (pos + half).to_tile();
        (min.y..=max.y).any(|y| {
            (min.x..=max.x).any(|x| !self.grid.tile(Vec2i::new(x, y)).is_some_and(Tile::can_walk))
        })
    }

    /// Whether a box of `size` centered at `pos` is free of walls and of
    /// every thing on the surrounding 3x3 tiles.
    ///
    /// Assumes no thing's box reaches more than one tile beyond its own.
    pub fn is_tile_area_clear<R>(&self, pos: Vec2Fixed, size: Vec2i, registry: &R) -> bool
    where
        R: ThingRegistry + ?Sized,
    {
        if self.is_collision_with_wall(pos, size) {
            return false;
        }
        let center = pos.to_tile();
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(tile) = self.grid.tile(center.offset(dx, dy)) else {
                    continue;
                };
                let hit = tile
                    .things
                    .iter()
                    .filter_map(|&thing| registry.tile_item(thing))
                    .filter_map(|item| item.pos.map(|p| (p, item.size)))
                    .any(|(other_pos, other_size)| aabb_overlap(pos, other_pos, size, other_size));
                if hit {
                    return false;
                }
            }
        }
        true
    }

    /// Whether an item stands inside the exit area.
    #[must_use]
    pub fn is_item_in_exit(&self, item: &TileItem) -> bool {
        item.pos.is_some_and(|pos| self.is_tile_in_exit(pos))
    }
}
