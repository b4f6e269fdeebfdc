//! # Mapgen Core
//!
//! Tile map engine for top-down mission levels.
//!
//! This crate owns the level grid and everything placed on it:
//! - No rendering
//! - No IO
//! - No system randomness (a seeded generator lives on the [`map::Map`])
//!
//! Map style generators fill the grid; this crate finishes the level
//! (tile flags, doors, exit), then populates it with objects, objectives
//! and keys by emitting add-object and add-pickup requests.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Tile array and access layer
//! - [`access`] - Base types, keycards and lock bits
//! - [`spatial`] - Per-tile occupant index and collision queries
//! - [`placement`] - Randomized placement engine
//! - [`exploration`] - Visited tiles and nearest-tile search
//! - [`lifecycle`] - Load, dynamic population and teardown

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod access;
pub mod config;
pub mod doors;
pub mod error;
pub mod events;
pub mod exploration;
pub mod grid;
pub mod lifecycle;
pub mod los;
pub mod map;
pub mod math;
pub mod mission;
pub mod placement;
pub mod spatial;
pub mod tile;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::access::{AccessBits, AccessCode, BaseType, Keycard};
    pub use crate::config::MapConfig;
    pub use crate::doors::{DoorGroup, DoorOrientation};
    pub use crate::error::{MapError, Result};
    pub use crate::events::{AddObject, AddPickup, EventQueue, MapEvent};
    pub use crate::grid::Grid;
    pub use crate::lifecycle::{Generators, MapGenerator, NoPathCache, PathCache};
    pub use crate::map::{ExitArea, Map, Trigger};
    pub use crate::math::{tile_center, Fixed, TilePos, Vec2Fixed, Vec2i};
    pub use crate::mission::{
        CharacterStore, GameMode, MapObject, MapObjectDensity, MapType, MissionSpec, Objective,
        ObjectiveKind, PickupClass, PickupKind, PlacementFlags,
    };
    pub use crate::placement::PlacementAccess;
    pub use crate::spatial::{ThingRegistry, TileItem};
    pub use crate::tile::{ItemFlags, ThingId, ThingKind, Tile, TileFlags, TilePic};
}
