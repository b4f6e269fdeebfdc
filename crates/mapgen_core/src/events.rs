//! Outbound spawn requests for the object and pickup systems.
//!
//! Placement never creates things directly. It enqueues requests here and
//! the object/pickup lifecycle code consumes them later, registering the
//! spawned things with the spatial index once they exist.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;
use crate::tile::ItemFlags;

/// Request to spawn a map object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddObject {
    /// Freshly allocated object id.
    pub uid: u32,
    /// Map object class name.
    pub class_name: String,
    /// Spawn position.
    pub pos: Vec2Fixed,
    /// Object flags combined with any extra flags from the caller.
    pub flags: ItemFlags,
    /// Initial health.
    pub health: i32,
}

/// Request to spawn a pickup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddPickup {
    /// Freshly allocated pickup id.
    pub uid: u32,
    /// Pickup class name.
    pub pickup_class: String,
    /// Spawned by a random spawner rather than by the map.
    pub is_random_spawned: bool,
    /// Spawner that produced this pickup, if any.
    pub spawner_uid: Option<u32>,
    /// Pickup flags (objective tagging).
    pub flags: ItemFlags,
    /// Spawn position.
    pub pos: Vec2Fixed,
}

/// A queued spawn request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapEvent {
    /// Spawn a map object.
    AddObject(AddObject),
    /// Spawn a pickup.
    AddPickup(AddPickup),
}

/// Append-only queue of spawn requests with per-kind uid allocation.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<MapEvent>,
    next_object_uid: u32,
    next_pickup_uid: u32,
}

impl EventQueue {
    /// Create an empty queue with uids starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next object uid.
    pub fn next_object_uid(&mut self) -> u32 {
        let uid = self.next_object_uid;
        self.next_object_uid += 1;
        uid
    }

    /// Allocate the next pickup uid.
    pub fn next_pickup_uid(&mut self) -> u32 {
        let uid = self.next_pickup_uid;
        self.next_pickup_uid += 1;
        uid
    }

    /// Enqueue a request.
    pub fn push(&mut self, event: MapEvent) {
        self.events.push_back(event);
    }

    /// Number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no requests are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending requests, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MapEvent> {
        self.events.iter()
    }

    /// Pending pickup requests, oldest first.
    pub fn pickups(&self) -> impl Iterator<Item = &AddPickup> {
        self.events.iter().filter_map(|e| match e {
            MapEvent::AddPickup(p) => Some(p),
            MapEvent::AddObject(_) => None,
        })
    }

    /// Pending object requests, oldest first.
    pub fn objects(&self) -> impl Iterator<Item = &AddObject> {
        self.events.iter().filter_map(|e| match e {
            MapEvent::AddObject(o) => Some(o),
            MapEvent::AddPickup(_) => None,
        })
    }

    /// Take every pending request, oldest first. Uid counters keep running.
    pub fn drain(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }
}
