//! Mission descriptions consumed by map loading.
//!
//! All structs are designed to be deserialized from RON files.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::access::Keycard;
use crate::error::{MapError, Result};
use crate::map::ExitArea;
use crate::math::Vec2i;
use crate::placement::PlacementAccess;
use crate::tile::ItemFlags;

/// Map style; selects exactly one generator at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    /// Rooms-and-corridors layout. Gets random drains after generation.
    Classic,
    /// Cellular cave layout.
    Cave,
    /// Hand-authored layout.
    Static,
}

/// Campaign game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Normal mission play with objectives and keys.
    #[default]
    Campaign,
    /// Player-vs-player arena.
    Dogfight,
    /// Free-for-all arena.
    Deathmatch,
}

impl GameMode {
    /// Whether missions in this mode place objectives.
    #[must_use]
    pub const fn has_objectives(self) -> bool {
        matches!(self, Self::Campaign)
    }

    /// Whether missions in this mode place keys.
    #[must_use]
    pub const fn keys_allowed(self) -> bool {
        matches!(self, Self::Campaign)
    }
}

/// Broad category of a pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Restores health.
    Health,
    /// Restores ammo.
    Ammo,
    /// Keycard.
    Key,
    /// Weapon.
    Gun,
    /// Score or objective item.
    Score,
}

/// A pickup class referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PickupClass {
    /// Class name understood by the pickup system.
    pub name: String,
    /// Category.
    pub kind: PickupKind,
}

bitflags! {
    /// Constraints on where a map object may be placed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PlacementFlags: u16 {
        /// Only on corridor floor, never in rooms.
        const OUTSIDE = 0x01;
        /// Only inside rooms.
        const INSIDE = 0x02;
        /// No walls in any of the 8 surrounding tiles.
        const NO_WALLS = 0x04;
        /// Exactly one wall directly adjacent.
        const ONE_WALL = 0x08;
        /// At least one wall directly adjacent.
        const ONE_OR_MORE_WALLS = 0x10;
        /// Tile below must stay free; marks it leave-free once placed.
        const FREE_IN_FRONT = 0x20;
        /// Hung on the wall directly above.
        const ON_WALL = 0x40;
    }
}

/// What a map object is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapObjectKind {
    /// Plain object: decoration or destructible.
    #[default]
    Normal,
    /// Periodically spawns a pickup.
    PickupSpawner(PickupClass),
}

/// A placeable map object descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapObject {
    /// Class name sent in the add-object request.
    pub name: String,
    /// Object kind.
    #[serde(default)]
    pub kind: MapObjectKind,
    /// Placement constraints.
    #[serde(default)]
    pub placement: PlacementFlags,
    /// Flags given to the spawned object.
    #[serde(default)]
    pub flags: ItemFlags,
    /// Initial health; zero for indestructible objects.
    #[serde(default)]
    pub health: i32,
    /// Offset from the tile center, in world units.
    #[serde(default)]
    pub offset: Vec2i,
}

impl MapObject {
    /// Create a plain object with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MapObjectKind::Normal,
            placement: PlacementFlags::empty(),
            flags: ItemFlags::empty(),
            health: 0,
            offset: Vec2i::ZERO,
        }
    }

    /// Floor drain scattered over classic maps.
    #[must_use]
    pub fn drain() -> Self {
        Self {
            flags: ItemFlags::DRAW_BELOW,
            ..Self::new("drain0")
        }
    }

    /// Set placement constraints.
    #[must_use]
    pub fn with_placement(mut self, placement: PlacementFlags) -> Self {
        self.placement = placement;
        self
    }

    /// Set initial health.
    #[must_use]
    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    /// Make this a pickup spawner.
    #[must_use]
    pub fn with_spawner(mut self, pickup: PickupClass) -> Self {
        self.kind = MapObjectKind::PickupSpawner(pickup);
        self
    }

    /// Whether this object spawns ammo.
    #[must_use]
    pub fn spawns_ammo(&self) -> bool {
        matches!(&self.kind, MapObjectKind::PickupSpawner(p) if p.kind == PickupKind::Ammo)
    }
}

/// Random scatter rule: `density * area / 1000` placement attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapObjectDensity {
    /// Object to scatter.
    pub object: MapObject,
    /// Attempts per thousand tiles.
    pub density: u32,
}

/// What an objective asks of the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    /// Kill specific characters.
    Kill,
    /// Pick up items of a pickup class.
    Collect(PickupClass),
    /// Destroy map objects.
    Destroy(MapObject),
    /// Rescue prisoners.
    Rescue,
    /// Explore a share of the map.
    Explore,
}

/// A mission objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Objective kind and its target.
    pub kind: ObjectiveKind,
    /// Instances to place.
    pub count: u32,
    /// Instances needed to complete the objective.
    pub required: u32,
    /// Instances placed so far.
    #[serde(default)]
    pub placed: u32,
    /// Place instances inside locked rooms.
    #[serde(default)]
    pub hi_access: bool,
    /// Place instances outside locked rooms.
    #[serde(default)]
    pub no_access: bool,
}

impl Objective {
    /// Create an objective requiring every placed instance.
    #[must_use]
    pub fn new(kind: ObjectiveKind, count: u32) -> Self {
        Self {
            kind,
            count,
            required: count,
            placed: 0,
            hi_access: false,
            no_access: false,
        }
    }

    /// Set the number of instances required.
    #[must_use]
    pub fn with_required(mut self, required: u32) -> Self {
        self.required = required;
        self
    }

    /// Placement access constraint implied by the objective flags.
    #[must_use]
    pub fn placement_access(&self) -> PlacementAccess {
        if self.hi_access {
            PlacementAccess::Locked
        } else if self.no_access {
            PlacementAccess::NotLocked
        } else {
            PlacementAccess::Any
        }
    }
}

/// Characters available to generators that place actors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStore {
    /// Character class names, indexed by the id lists below.
    pub classes: Vec<String>,
    /// Ids of characters that may appear as prisoners.
    pub prisoner_ids: Vec<usize>,
    /// Ids of regular enemies.
    pub baddie_ids: Vec<usize>,
    /// Ids of special (objective) characters.
    pub special_ids: Vec<usize>,
}

/// Everything map loading needs to know about a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSpec {
    /// Mission title.
    #[serde(default)]
    pub title: String,
    /// Grid size in tiles.
    pub size: Vec2i,
    /// Map style.
    pub map_type: MapType,
    /// Game mode the mission is played in.
    #[serde(default)]
    pub mode: GameMode,
    /// Exit picture style.
    #[serde(default = "default_style")]
    pub exit_style: String,
    /// Key pickup style.
    #[serde(default = "default_style")]
    pub key_style: String,
    /// Exit rectangle fixed by the mission; random when absent.
    #[serde(default)]
    pub exit_area: Option<ExitArea>,
    /// Objectives to place.
    #[serde(default)]
    pub objectives: Vec<Objective>,
    /// Random map object scatter rules.
    #[serde(default)]
    pub map_object_densities: Vec<MapObjectDensity>,
}

fn default_style() -> String {
    "plain".to_string()
}

impl MissionSpec {
    /// Create a mission with no objectives or scatter.
    #[must_use]
    pub fn new(size: Vec2i, map_type: MapType) -> Self {
        Self {
            title: String::new(),
            size,
            map_type,
            mode: GameMode::Campaign,
            exit_style: default_style(),
            key_style: default_style(),
            exit_area: None,
            objectives: Vec::new(),
            map_object_densities: Vec::new(),
        }
    }

    /// Parse a mission from RON.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| MapError::ParseError {
            what: "mission",
            message: e.to_string(),
        })
    }

    /// Pickup class name of the key with the given index.
    #[must_use]
    pub fn key_pickup_class(&self, card: Keycard) -> String {
        format!("{}_{}", self.key_style, card.color_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_from_ron() {
        let source = r#"(
            title: "Warehouse",
            size: (x: 32, y: 24),
            map_type: Classic,
            exit_area: Some((start: (x: 20, y: 10), end: (x: 29, y: 19))),
            objectives: [
                (kind: Collect((name: "folder", kind: Score)), count: 4, required: 3),
                (
                    kind: Destroy((name: "computer", health: 40)),
                    count: 2,
                    required: 2,
                    hi_access: true,
                ),
                (kind: Kill, count: 1, required: 1),
            ],
            map_object_densities: [
                (object: (name: "barrel", placement: "NO_WALLS"), density: 5),
            ],
        )"#;
        let mission = MissionSpec::from_ron(source).unwrap();
        assert_eq!(mission.size, Vec2i::new(32, 24));
        assert_eq!(mission.map_type, MapType::Classic);
        assert_eq!(mission.mode, GameMode::Campaign);
        assert_eq!(mission.exit_area.map(|e| e.end), Some(Vec2i::new(29, 19)));
        assert_eq!(mission.objectives.len(), 3);
        assert_eq!(mission.objectives[1].placement_access(), PlacementAccess::Locked);
        assert_eq!(
            mission.map_object_densities[0].object.placement,
            PlacementFlags::NO_WALLS
        );
    }

    #[test]
    fn test_mission_parse_error() {
        let err = MissionSpec::from_ron("(size: (x: 1))").unwrap_err();
        assert!(matches!(err, MapError::ParseError { what: "mission", .. }));
    }

    #[test]
    fn test_placement_access_from_flags() {
        let mut o = Objective::new(ObjectiveKind::Kill, 1);
        assert_eq!(o.placement_access(), PlacementAccess::Any);
        o.no_access = true;
        assert_eq!(o.placement_access(), PlacementAccess::NotLocked);
        o.hi_access = true;
        assert_eq!(o.placement_access(), PlacementAccess::Locked);
    }

    #[test]
    fn test_modes() {
        assert!(GameMode::Campaign.has_objectives());
        assert!(GameMode::Campaign.keys_allowed());
        assert!(!GameMode::Deathmatch.has_objectives());
        assert!(!GameMode::Dogfight.keys_allowed());
    }

    #[test]
    fn test_ammo_spawner() {
        let ammo = MapObject::new("ammo_spawner").with_spawner(PickupClass {
            name: "ammo_box".to_string(),
            kind: PickupKind::Ammo,
        });
        assert!(ammo.spawns_ammo());
        assert!(!MapObject::drain().spawns_ammo());
    }

    #[test]
    fn test_key_pickup_class() {
        let mission = MissionSpec::new(Vec2i::new(8, 8), MapType::Cave);
        assert_eq!(mission.key_pickup_class(Keycard::Green), "plain_green");
    }
}
