//! Door keycard lookup and door grouping.
//!
//! Door cells themselves are plain `Door` base types; the keycard a door
//! needs is read from the locked region next to it.

use serde::{Deserialize, Serialize};

use crate::access::{decode_keycard_flag, BaseType, Keycard};
use crate::grid::Grid;
use crate::map::Map;
use crate::math::{TilePos, Vec2i};

/// Probe order around a door: self, left, right, up, down.
const DOOR_PROBES: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// Direction a door group runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorOrientation {
    /// Cells run left to right.
    Horizontal,
    /// Cells run top to bottom.
    Vertical,
}

/// A run of contiguous door cells acting as one door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorGroup {
    /// Top or left-most cell.
    pub anchor: TilePos,
    /// Number of cells in the run.
    pub length: i32,
    /// Direction of the run.
    pub orientation: DoorOrientation,
    /// Keycard needed to open, if locked.
    pub keycard: Option<Keycard>,
    /// Trigger that opens the door.
    pub trigger_id: u32,
}

impl DoorGroup {
    /// Cells of the run, anchor first.
    pub fn cells(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.length).map(move |i| match self.orientation {
            DoorOrientation::Horizontal => self.anchor.offset(i, 0),
            DoorOrientation::Vertical => self.anchor.offset(0, i),
        })
    }
}

fn probe(grid: &Grid, pos: TilePos) -> impl Iterator<Item = Option<Keycard>> + '_ {
    DOOR_PROBES
        .into_iter()
        .map(move |(dx, dy)| decode_keycard_flag(grid.access_code(pos.offset(dx, dy))))
}

/// Keycard for a door: the first probe position carrying access bits.
///
/// A door between two different locked regions resolves to whichever
/// neighbor is probed first.
#[must_use]
pub fn door_keycard_flag(grid: &Grid, pos: TilePos) -> Option<Keycard> {
    probe(grid, pos).flatten().next()
}

/// Highest-priority keycard over all five probe positions.
#[must_use]
pub fn door_access_flags(grid: &Grid, pos: TilePos) -> Option<Keycard> {
    probe(grid, pos).flatten().max()
}

impl Map {
    /// Find every door group and create its trigger.
    ///
    /// A cell anchors a group when it is a door and neither its left nor
    /// its top neighbor is. Returns the number of groups created.
    pub fn setup_doors(&mut self) -> usize {
        let anchors: Vec<TilePos> = self
            .grid
            .positions()
            .filter(|&pos| {
                self.grid.base_type(pos) == BaseType::Door
                    && self.grid.base_type(pos.offset(-1, 0)) != BaseType::Door
                    && self.grid.base_type(pos.offset(0, -1)) != BaseType::Door
            })
            .collect();
        for &anchor in &anchors {
            let keycard = door_access_flags(&self.grid, anchor);
            self.add_door_group(anchor, keycard);
        }
        tracing::debug!(groups = anchors.len(), "Door groups set up");
        anchors.len()
    }

    /// Create a door group from an anchor, walking contiguous door cells
    /// right, or down if the cell to the right is not a door.
    pub fn add_door_group(&mut self, anchor: TilePos, keycard: Option<Keycard>) -> &DoorGroup {
        let is_door = |pos: TilePos| self.grid.base_type(pos) == BaseType::Door;
        let (orientation, step) = if is_door(anchor.offset(1, 0)) {
            (DoorOrientation::Horizontal, Vec2i::new(1, 0))
        } else {
            (DoorOrientation::Vertical, Vec2i::new(0, 1))
        };
        let mut length = 1;
        let mut next = anchor + step;
        while is_door(next) {
            length += 1;
            next = next + step;
        }
        let size = match orientation {
            DoorOrientation::Horizontal => Vec2i::new(length, 1),
            DoorOrientation::Vertical => Vec2i::new(1, length),
        };

        let trigger = self.new_trigger();
        trigger.pos = anchor;
        trigger.size = size;
        trigger.keycard = keycard;
        let trigger_id = trigger.id;

        self.door_groups.push(DoorGroup {
            anchor,
            length,
            orientation,
            keycard,
            trigger_id,
        });
        let last = self.door_groups.len() - 1;
        &self.door_groups[last]
    }
}
