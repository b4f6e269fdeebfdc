//! Randomized placement of objects, collectibles, destructibles and keys.
//!
//! Every placement samples random candidates under a retry budget and
//! reports success as a `bool` (or a placed count). Running out of retries
//! is an expected outcome, not an error: objective totals shrink to match
//! what was placed. Key placement is the exception; it keeps sampling
//! until the configured safety valve trips.

use serde::{Deserialize, Serialize};

use crate::access::{AccessBits, AccessCode, BaseType, Keycard};
use crate::error::{MapError, Result};
use crate::events::{AddObject, AddPickup, EventQueue, MapEvent};
use crate::map::Map;
use crate::math::{tile_center, Fixed, TilePos, Vec2Fixed, Vec2i, TILE_HEIGHT};
use crate::mission::{
    MapObject, MapObjectDensity, MissionSpec, Objective, ObjectiveKind, PlacementFlags,
};
use crate::tile::{ItemFlags, Tile};

/// Retry budget for unconstrained placement.
pub const PLACEMENT_RETRIES: u32 = 100;
/// Retry budget when candidates must be inside or outside locked rooms.
pub const CONSTRAINED_PLACEMENT_RETRIES: u32 = 1000;
/// Collectible footprint in world units.
pub const COLLECTABLE_SIZE: Vec2i = Vec2i::new(4, 3);

/// Locked-region constraint on placement candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlacementAccess {
    /// Anywhere.
    #[default]
    Any,
    /// Only inside locked rooms.
    Locked,
    /// Only outside locked rooms.
    NotLocked,
}

/// Retry budget and candidate filter for one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetryPolicy {
    retries: u32,
    locked_only: bool,
    unlocked_only: bool,
}

impl RetryPolicy {
    fn new(retries_constrained: bool, locked_only: bool, unlocked_only: bool) -> Self {
        Self {
            retries: if retries_constrained {
                CONSTRAINED_PLACEMENT_RETRIES
            } else {
                PLACEMENT_RETRIES
            },
            locked_only,
            unlocked_only,
        }
    }

    const fn accepts(self, in_locked_room: bool) -> bool {
        (!self.locked_only || in_locked_room) && (!self.unlocked_only || !in_locked_room)
    }
}

/// Loose tile check: base type, emptiness and the tile above.
///
/// Used for decorative filler.
#[must_use]
pub fn is_tile_ok_loose(
    object: &MapObject,
    code: AccessCode,
    is_empty: bool,
    above: AccessCode,
) -> bool {
    if !is_empty || code.leave_free {
        return false;
    }
    if matches!(code.base, BaseType::Wall | BaseType::Door | BaseType::Nothing) {
        return false;
    }
    let placement = object.placement;
    if placement.contains(PlacementFlags::OUTSIDE) && code.base != BaseType::Floor {
        return false;
    }
    if placement.contains(PlacementFlags::INSIDE) && code.base != BaseType::Room {
        return false;
    }
    if placement.contains(PlacementFlags::ON_WALL) && above.base != BaseType::Wall {
        return false;
    }
    true
}

/// Strict tile check: the loose check plus the tile below and wall counts.
///
/// Used for gameplay-critical placements such as destructibles.
#[must_use]
pub fn is_tile_ok_strict(
    object: &MapObject,
    code: AccessCode,
    is_empty: bool,
    above: AccessCode,
    below: AccessCode,
    walls_adjacent: usize,
    walls_around: usize,
) -> bool {
    if !is_tile_ok_loose(object, code, is_empty, above) {
        return false;
    }
    // Never block a doorway
    if above.base == BaseType::Door || below.base == BaseType::Door {
        return false;
    }
    let placement = object.placement;
    if placement.contains(PlacementFlags::NO_WALLS) && walls_around != 0 {
        return false;
    }
    if placement.contains(PlacementFlags::ONE_WALL) && walls_adjacent != 1 {
        return false;
    }
    if placement.contains(PlacementFlags::ONE_OR_MORE_WALLS) && walls_adjacent == 0 {
        return false;
    }
    if placement.contains(PlacementFlags::FREE_IN_FRONT)
        && (!below.base.is_floor_like() || below.leave_free)
    {
        return false;
    }
    true
}

/// Spawn position of an object on a tile.
#[must_use]
pub fn object_placement_pos(object: &MapObject, tile: TilePos) -> Vec2Fixed {
    let mut pos = tile_center(tile) + Vec2Fixed::from_ints(object.offset.x, object.offset.y);
    if object.placement.contains(PlacementFlags::ON_WALL) {
        pos.y -= Fixed::from_num(TILE_HEIGHT / 2);
    }
    pos
}

/// Enqueue a collectible pickup for an objective.
pub fn place_collectible(
    events: &mut EventQueue,
    objective: usize,
    pickup_class: &str,
    pos: Vec2Fixed,
) {
    let uid = events.next_pickup_uid();
    events.push(MapEvent::AddPickup(AddPickup {
        uid,
        pickup_class: pickup_class.to_string(),
        is_random_spawned: false,
        spawner_uid: None,
        flags: ItemFlags::for_objective(objective),
        pos,
    }));
}

/// Enqueue a key pickup at the center of a tile.
pub fn place_key(events: &mut EventQueue, pickup_class: &str, tile: TilePos) {
    let uid = events.next_pickup_uid();
    events.push(MapEvent::AddPickup(AddPickup {
        uid,
        pickup_class: pickup_class.to_string(),
        is_random_spawned: false,
        spawner_uid: None,
        flags: ItemFlags::empty(),
        pos: tile_center(tile),
    }));
}

/// Key tiers placed for each access count threshold, highest first:
/// `(min key_access_count, key index, room access the key lies in)`.
const KEY_TIERS: [(usize, usize, AccessBits); 4] = [
    (5, 3, AccessBits::BLUE),
    (4, 2, AccessBits::GREEN),
    (3, 1, AccessBits::YELLOW),
    (2, 0, AccessBits::empty()),
];

impl Map {
    fn retry_policy(&self, access: PlacementAccess) -> RetryPolicy {
        let locked = access == PlacementAccess::Locked;
        let unlocked = access == PlacementAccess::NotLocked;
        RetryPolicy::new(
            (locked && self.has_locked_rooms()) || unlocked,
            locked,
            unlocked,
        )
    }

    /// Retry budget used by [`Map::place_random_tile`] and
    /// [`Map::place_random_pos`] for a constraint.
    #[must_use]
    pub fn placement_retries(&self, access: PlacementAccess) -> u32 {
        self.retry_policy(access).retries
    }

    /// Offer random tiles to `try_place` until it succeeds or the retry
    /// budget runs out. Tiles failing the access constraint are skipped
    /// without calling `try_place`.
    pub fn place_random_tile<F>(&mut self, access: PlacementAccess, mut try_place: F) -> bool
    where
        F: FnMut(&mut Map, TilePos) -> bool,
    {
        let policy = self.retry_policy(access);
        for _ in 0..policy.retries {
            let tile = self.random_tile();
            if policy.accepts(self.grid.is_tile_in_locked_room(tile)) && try_place(self, tile) {
                return true;
            }
        }
        false
    }

    /// Like [`Map::place_random_tile`] with sub-tile world positions.
    pub fn place_random_pos<F>(&mut self, access: PlacementAccess, mut try_place: F) -> bool
    where
        F: FnMut(&mut Map, Vec2Fixed) -> bool,
    {
        let policy = self.retry_policy(access);
        for _ in 0..policy.retries {
            let pos = self.random_pos();
            if policy.accepts(self.grid.is_pos_in_locked_room(pos)) && try_place(self, pos) {
                return true;
            }
        }
        false
    }

    /// Try to place a map object on a tile, enqueueing an add-object
    /// request on success.
    ///
    /// The grid itself is only touched to mark the tile below leave-free
    /// for objects that need their front kept clear.
    pub fn try_place_one_object(
        &mut self,
        events: &mut EventQueue,
        tile: TilePos,
        object: &MapObject,
        extra_flags: ItemFlags,
        strict: bool,
    ) -> bool {
        if !self.config.ammo_enabled && object.spawns_ammo() {
            return false;
        }
        let grid = &self.grid;
        let code = grid.access_code(tile);
        let is_empty = grid.tile(tile).is_some_and(Tile::is_clear);
        let above = grid.access_code(tile.offset(0, -1));
        let below_pos = tile.offset(0, 1);
        let below = grid.access_code(below_pos);
        let ok = if strict {
            is_tile_ok_strict(
                object,
                code,
                is_empty,
                above,
                below,
                grid.num_walls_adjacent(tile),
                grid.num_walls_around(tile),
            )
        } else {
            is_tile_ok_loose(object, code, is_empty, above)
        };
        if !ok {
            return false;
        }

        if object.placement.contains(PlacementFlags::FREE_IN_FRONT)
            && self.grid.in_bounds(below_pos)
        {
            self.grid.set_access_code(below_pos, below.with_leave_free());
        }

        let uid = events.next_object_uid();
        events.push(MapEvent::AddObject(AddObject {
            uid,
            class_name: object.name.clone(),
            pos: object_placement_pos(object, tile),
            flags: object.flags | extra_flags,
            health: object.health,
        }));
        true
    }

    /// Try to place one collectible for an objective at a random position
    /// clear of walls.
    pub fn try_place_collectible(
        &mut self,
        events: &mut EventQueue,
        index: usize,
        objective: &Objective,
        pickup_class: &str,
    ) -> bool {
        let locked_only = objective.hi_access && self.has_locked_rooms();
        let unlocked_only = objective.no_access;
        let policy = RetryPolicy::new(locked_only || unlocked_only, locked_only, unlocked_only);
        for _ in 0..policy.retries {
            let pos = self.random_pos();
            if self.is_collision_with_wall(pos, COLLECTABLE_SIZE) {
                continue;
            }
            if policy.accepts(self.grid.is_pos_in_locked_room(pos)) {
                place_collectible(events, index, pickup_class, pos);
                return true;
            }
        }
        false
    }

    /// Try to place one destructible for an objective, using the strict
    /// tile check.
    pub fn try_place_destructible(
        &mut self,
        events: &mut EventQueue,
        index: usize,
        objective: &Objective,
        object: &MapObject,
    ) -> bool {
        let flags = ItemFlags::for_objective(index);
        self.place_random_tile(objective.placement_access(), |map, tile| {
            map.try_place_one_object(events, tile, object, flags, true)
        })
    }

    /// Place collect and destroy objectives, shrinking each objective's
    /// count and required total to what could actually be placed.
    pub fn add_objectives(&mut self, events: &mut EventQueue, objectives: &mut [Objective]) {
        for (index, objective) in objectives.iter_mut().enumerate() {
            let snapshot = objective.clone();
            let mut placed = objective.placed;
            for _ in objective.placed..objective.count {
                let ok = match &snapshot.kind {
                    ObjectiveKind::Collect(pickup) => {
                        self.try_place_collectible(events, index, &snapshot, &pickup.name)
                    }
                    ObjectiveKind::Destroy(object) => {
                        self.try_place_destructible(events, index, &snapshot, object)
                    }
                    _ => break,
                };
                if ok {
                    placed += 1;
                }
            }
            if !matches!(snapshot.kind, ObjectiveKind::Collect(_) | ObjectiveKind::Destroy(_)) {
                continue;
            }
            if placed < objective.count {
                tracing::warn!(
                    objective = index,
                    placed,
                    wanted = objective.count,
                    "Could not place every objective instance"
                );
            }
            objective.placed = placed;
            objective.count = placed;
            objective.required = objective.required.min(placed);
        }
    }

    /// Place one key on a random clear, unlocked-below room tile whose
    /// access bits equal `access`.
    ///
    /// Gives up with [`MapError::KeyPlacementExhausted`] after
    /// `key_placement_attempts` samples.
    pub fn place_card(
        &mut self,
        events: &mut EventQueue,
        pickup_class: &str,
        key_index: usize,
        access: AccessBits,
    ) -> Result<TilePos> {
        let attempts = self.config.key_placement_attempts;
        for _ in 0..attempts {
            let tile = self.random_tile();
            let code = self.grid.access_code(tile);
            let clear = |pos: TilePos| self.grid.tile(pos).is_some_and(Tile::is_clear);
            if clear(tile)
                && code.access == access
                && code.base == BaseType::Room
                && clear(tile.offset(0, 1))
            {
                place_key(events, pickup_class, tile);
                return Ok(tile);
            }
        }
        Err(MapError::KeyPlacementExhausted {
            key_index,
            access: access.bits(),
            attempts,
        })
    }

    /// Place one fewer key than there are access tiers, highest tier first.
    ///
    /// Returns the number of keys placed.
    pub fn add_keys(&mut self, events: &mut EventQueue, mission: &MissionSpec) -> Result<usize> {
        let mut placed = 0;
        for (threshold, key_index, access) in KEY_TIERS {
            if self.key_access_count < threshold {
                continue;
            }
            let card = Keycard::from_index(key_index).unwrap_or(Keycard::Yellow);
            let class = mission.key_pickup_class(card);
            let tile = self.place_card(events, &class, key_index, access)?;
            tracing::debug!(key = ?card, ?tile, "Key placed");
            placed += 1;
        }
        Ok(placed)
    }

    /// Scatter map objects: `density * area / 1000` strict attempts per
    /// rule. Returns the number placed.
    pub fn scatter_map_objects(
        &mut self,
        events: &mut EventQueue,
        densities: &[MapObjectDensity],
    ) -> usize {
        let area = u64::try_from(self.grid.len()).unwrap_or(u64::MAX);
        let mut placed = 0;
        for rule in densities {
            let attempts = u64::from(rule.density) * area / 1000;
            for _ in 0..attempts {
                let tile = self.random_tile();
                if self.try_place_one_object(events, tile, &rule.object, ItemFlags::empty(), true) {
                    placed += 1;
                }
            }
        }
        placed
    }
}
