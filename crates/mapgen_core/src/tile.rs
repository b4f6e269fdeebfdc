//! Tile records and lightweight entity references.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Dynamic per-tile flags, derived from the base type at load.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TileFlags: u16 {
        /// Actors cannot walk here.
        const NO_WALK = 0x01;
        /// Blocks line of sight.
        const NO_SEE = 0x02;
        /// Plain corridor floor (not room, not exit).
        const NORMAL_FLOOR = 0x04;
        /// Part of a door group.
        const DOOR = 0x08;
    }
}

/// Picture role of a tile.
///
/// Only identifies which picture variant a renderer should use; picture
/// lookup itself lives outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TilePic {
    /// No picture assigned yet.
    #[default]
    None,
    /// Corridor floor.
    Floor,
    /// Corridor floor shadowed by a sight-blocking tile above.
    FloorShadow,
    /// Room floor.
    Room,
    /// Room floor shadowed by a sight-blocking tile above.
    RoomShadow,
    /// Wall.
    Wall,
    /// Door.
    Door,
    /// Exit area marking.
    Exit,
    /// Exit area marking in shadow.
    ExitShadow,
}

/// Kind of dynamic thing that can occupy a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThingKind {
    /// A player or AI actor.
    Actor,
    /// A map object (barrel, crate, drain).
    Object,
    /// A pickup (key, collectible, ammo).
    Pickup,
}

/// Non-owning reference to a dynamic thing: `(id, kind)`.
///
/// Resolved back to the real thing through a
/// [`ThingRegistry`](crate::spatial::ThingRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThingId {
    /// Id within the kind's own id space.
    pub id: u32,
    /// Which registry the id belongs to.
    pub kind: ThingKind,
}

impl ThingId {
    /// Create a new thing reference.
    #[must_use]
    pub const fn new(id: u32, kind: ThingKind) -> Self {
        Self { id, kind }
    }
}

bitflags! {
    /// Flags attached to spawned objects and pickups.
    ///
    /// The upper byte carries the objective index when
    /// [`ItemFlags::OBJECTIVE`] is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ItemFlags: u32 {
        /// Counts towards a mission objective.
        const OBJECTIVE = 0x0001;
        /// Hurts actors on contact.
        const DANGEROUS = 0x0002;
        /// Cannot be shot.
        const NO_SHOOT = 0x0004;
        /// Wreck left behind by a destroyed object.
        const WRECK = 0x0008;
        /// Drawn below actors.
        const DRAW_BELOW = 0x0010;
        const _ = !0;
    }
}

const OBJECTIVE_SHIFT: u32 = 8;

impl ItemFlags {
    /// Flags tagging an item with an objective index.
    #[must_use]
    pub fn for_objective(objective: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let index = (objective as u32) << OBJECTIVE_SHIFT;
        Self::OBJECTIVE | Self::from_bits_retain(index)
    }

    /// Objective index carried by these flags, if any.
    #[must_use]
    pub fn objective(self) -> Option<usize> {
        self.contains(Self::OBJECTIVE)
            .then(|| (self.bits() >> OBJECTIVE_SHIFT) as usize)
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Picture role.
    pub pic: TilePic,
    /// Walk/see/door flags.
    pub flags: TileFlags,
    /// Whether the player has seen this tile.
    pub is_visited: bool,
    /// Things currently on this tile, in insertion order.
    pub things: Vec<ThingId>,
}

impl Tile {
    /// Whether actors can walk on this tile.
    #[must_use]
    pub fn can_walk(&self) -> bool {
        !self.flags.contains(TileFlags::NO_WALK)
    }

    /// Whether this tile lets sight through.
    #[must_use]
    pub fn can_see(&self) -> bool {
        !self.flags.contains(TileFlags::NO_SEE)
    }

    /// Plain corridor floor.
    #[must_use]
    pub fn is_normal_floor(&self) -> bool {
        self.flags.contains(TileFlags::NORMAL_FLOOR)
    }

    /// Walkable and unoccupied.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.can_walk() && self.things.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tile_is_clear() {
        let tile = Tile::default();
        assert!(tile.can_walk());
        assert!(tile.can_see());
        assert!(tile.is_clear());
        assert!(!tile.is_visited);
    }

    #[test]
    fn test_occupied_tile_not_clear() {
        let mut tile = Tile::default();
        tile.things.push(ThingId::new(1, ThingKind::Object));
        assert!(!tile.is_clear());
    }

    #[test]
    fn test_wall_flags() {
        let tile = Tile {
            flags: TileFlags::NO_WALK | TileFlags::NO_SEE,
            ..Default::default()
        };
        assert!(!tile.can_walk());
        assert!(!tile.can_see());
        assert!(!tile.is_clear());
    }

    #[test]
    fn test_objective_flags() {
        let flags = ItemFlags::for_objective(3);
        assert_eq!(flags.objective(), Some(3));
        assert_eq!(ItemFlags::DANGEROUS.objective(), None);
        assert_eq!(ItemFlags::for_objective(0).objective(), Some(0));
    }
}
