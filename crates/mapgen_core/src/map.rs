//! The mission map: grid, triggers, exit area and level-wide counters.
//!
//! A [`Map`] is an explicitly owned context object. Every operation takes
//! it as a parameter, so tests can hold several maps side by side.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::access::{AccessCode, BaseType, Keycard};
use crate::config::MapConfig;
use crate::doors::DoorGroup;
use crate::error::{MapError, Result};
use crate::grid::Grid;
use crate::los::LineOfSight;
use crate::math::{tile_center, Fixed, TilePos, Vec2Fixed, Vec2i, TILE_HEIGHT, TILE_WIDTH};
use crate::tile::{TileFlags, TilePic};

/// Exit rectangle width, not counting its border.
pub const EXIT_WIDTH: i32 = 8;
/// Exit rectangle height, not counting its border.
pub const EXIT_HEIGHT: i32 = 8;
const EXIT_AREA_ATTEMPTS: u32 = 10_000;
const FREE_POSITION_ATTEMPTS: u32 = 100;

/// Inclusive tile rectangle marking the level exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitArea {
    /// Top-left tile.
    pub start: TilePos,
    /// Bottom-right tile.
    pub end: TilePos,
}

impl ExitArea {
    /// Whether a tile lies in the rectangle.
    #[must_use]
    pub const fn contains(&self, tile: TilePos) -> bool {
        tile.x >= self.start.x
            && tile.x <= self.end.x
            && tile.y >= self.start.y
            && tile.y <= self.end.y
    }

    /// World position of the middle tile's center.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        tile_center(Vec2i::new(
            (self.start.x + self.end.x) / 2,
            (self.start.y + self.end.y) / 2,
        ))
    }
}

/// A door or event trigger owned by the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trigger {
    /// Unique id, allocated in creation order.
    pub id: u32,
    /// Top-left tile covered.
    pub pos: TilePos,
    /// Extent in tiles; zero until placed.
    pub size: Vec2i,
    /// Keycard needed to fire the trigger.
    pub keycard: Option<Keycard>,
    /// Whether the trigger can currently fire.
    pub is_active: bool,
}

/// Level state for one loaded mission.
#[derive(Debug, Clone)]
pub struct Map {
    pub(crate) grid: Grid,
    pub(crate) triggers: Vec<Trigger>,
    pub(crate) door_groups: Vec<DoorGroup>,
    pub(crate) exit: Option<ExitArea>,
    pub(crate) key_access_count: usize,
    pub(crate) num_explorable_tiles: usize,
    pub(crate) tiles_seen: usize,
    pub(crate) next_trigger_id: u32,
    pub(crate) los: LineOfSight,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) config: MapConfig,
}

impl Map {
    /// Create an unloaded map. Call [`Map::load`] to allocate the grid.
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        Self {
            grid: Grid::default(),
            triggers: Vec::new(),
            door_groups: Vec::new(),
            exit: None,
            key_access_count: 0,
            num_explorable_tiles: 0,
            tiles_seen: 0,
            next_trigger_id: 0,
            los: LineOfSight::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Create a map with an allocated, all-floor grid, skipping generation.
    ///
    /// Useful for generators and tests that fill the grid by hand.
    pub fn with_size(config: MapConfig, size: Vec2i) -> Result<Self> {
        let mut map = Self::new(config);
        map.grid = Grid::new(size)?;
        map.los.init(size);
        Ok(map)
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The tile grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable tile grid, for generators.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Grid size in tiles.
    #[must_use]
    pub const fn size(&self) -> Vec2i {
        self.grid.size()
    }

    /// Line-of-sight buffer.
    #[must_use]
    pub const fn los(&self) -> &LineOfSight {
        &self.los
    }

    /// Mutable line-of-sight buffer.
    pub fn los_mut(&mut self) -> &mut LineOfSight {
        &mut self.los
    }

    /// Number of distinct keycard tiers in use, counting "no card".
    #[must_use]
    pub const fn key_access_count(&self) -> usize {
        self.key_access_count
    }

    /// Set by generators once locked rooms are laid out.
    pub fn set_key_access_count(&mut self, count: usize) {
        self.key_access_count = count;
    }

    /// Whether the level has more than one access partition.
    #[must_use]
    pub const fn has_locked_rooms(&self) -> bool {
        self.key_access_count > 1
    }

    /// Triggers in creation order.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Door groups found at load.
    #[must_use]
    pub fn door_groups(&self) -> &[DoorGroup] {
        &self.door_groups
    }

    /// Create an unplaced trigger with the next id.
    pub fn new_trigger(&mut self) -> &mut Trigger {
        let id = self.next_trigger_id;
        self.next_trigger_id += 1;
        self.triggers.push(Trigger {
            id,
            pos: Vec2i::ZERO,
            size: Vec2i::ZERO,
            keycard: None,
            is_active: true,
        });
        let last = self.triggers.len() - 1;
        &mut self.triggers[last]
    }

    /// Exit rectangle, once set.
    #[must_use]
    pub const fn exit_area(&self) -> Option<ExitArea> {
        self.exit
    }

    /// Set the exit rectangle explicitly.
    pub fn set_exit_area(&mut self, start: TilePos, end: TilePos) {
        self.exit = Some(ExitArea { start, end });
    }

    /// World position of the exit's center, or the origin with no exit.
    #[must_use]
    pub fn exit_pos(&self) -> Vec2Fixed {
        self.exit.map_or(Vec2Fixed::ZERO, |e| e.center())
    }

    /// Whether the tile under a world position is in the exit area.
    #[must_use]
    pub fn is_tile_in_exit(&self, pos: Vec2Fixed) -> bool {
        self.exit.is_some_and(|e| e.contains(pos.to_tile()))
    }

    /// Uniformly random tile coordinate.
    pub fn random_tile(&mut self) -> TilePos {
        let size = self.grid.size();
        Vec2i::new(
            self.rng.gen_range(0..size.x.max(1)),
            self.rng.gen_range(0..size.y.max(1)),
        )
    }

    /// Uniformly random world position on the grid.
    pub fn random_pos(&mut self) -> Vec2Fixed {
        let size = self.grid.size();
        let max_x = Fixed::from_num((size.x * TILE_WIDTH).max(1)).to_bits();
        let max_y = Fixed::from_num((size.y * TILE_HEIGHT).max(1)).to_bits();
        Vec2Fixed::new(
            Fixed::from_bits(self.rng.gen_range(0..max_x)),
            Fixed::from_bits(self.rng.gen_range(0..max_y)),
        )
    }

    /// Derive tile flags and pictures from the access layer.
    ///
    /// Flags first, then pictures: a floor picture depends on whether the
    /// tile above blocks sight.
    pub fn setup_tiles_and_walls(&mut self) {
        for pos in self.grid.positions().collect::<Vec<_>>() {
            let base = self.grid.base_type(pos);
            let Some(tile) = self.grid.tile_mut(pos) else {
                continue;
            };
            let (flags, pic) = match base {
                BaseType::Wall => (TileFlags::NO_WALK | TileFlags::NO_SEE, TilePic::Wall),
                BaseType::Nothing => (TileFlags::NO_WALK | TileFlags::NO_SEE, TilePic::None),
                BaseType::Door => (TileFlags::NO_SEE | TileFlags::DOOR, TilePic::Door),
                BaseType::Floor => (TileFlags::NORMAL_FLOOR, TilePic::Floor),
                BaseType::Room | BaseType::Square => (TileFlags::empty(), TilePic::Room),
            };
            tile.flags = flags;
            tile.pic = pic;
        }
        for pos in self.grid.positions().collect::<Vec<_>>() {
            match self.grid.base_type(pos) {
                BaseType::Floor => self.change_floor(pos, TilePic::Floor, TilePic::FloorShadow),
                BaseType::Room | BaseType::Square => {
                    self.change_floor(pos, TilePic::Room, TilePic::RoomShadow);
                }
                _ => {}
            }
        }
    }

    /// Set a floor-like tile's picture to `normal`, or `shadow` when the
    /// tile above blocks sight. Other base types are left alone.
    pub fn change_floor(&mut self, pos: TilePos, normal: TilePic, shadow: TilePic) {
        let can_see_above = pos.y <= 0
            || self
                .grid
                .tile(pos.offset(0, -1))
                .map_or(true, |t| t.can_see());
        if !self.grid.base_type(pos).is_floor_like() {
            return;
        }
        if let Some(tile) = self.grid.tile_mut(pos) {
            tile.pic = if can_see_above { normal } else { shadow };
        }
    }

    /// Paint the perimeter of the exit rectangle with the exit picture.
    pub fn show_exit_area(&mut self, area: ExitArea) {
        let ExitArea { start, end } = area;
        for x in start.x..=end.x {
            self.change_floor(Vec2i::new(x, start.y), TilePic::Exit, TilePic::ExitShadow);
            self.change_floor(Vec2i::new(x, end.y), TilePic::Exit, TilePic::ExitShadow);
        }
        for y in start.y + 1..end.y {
            self.change_floor(Vec2i::new(start.x, y), TilePic::Exit, TilePic::ExitShadow);
            self.change_floor(Vec2i::new(end.x, y), TilePic::Exit, TilePic::ExitShadow);
        }
    }

    /// Pick a random exit rectangle whose tiles are all walkable.
    ///
    /// Falls back to the last candidate if none is found.
    pub fn generate_random_exit_area(&mut self) -> ExitArea {
        let size = self.grid.size();
        let mut area = ExitArea {
            start: Vec2i::ZERO,
            end: Vec2i::new(size.x - 1, size.y - 1),
        };
        for _ in 0..EXIT_AREA_ATTEMPTS {
            let start = Vec2i::new(
                self.rng.gen_range(0..(size.x - EXIT_WIDTH - 1).max(1)),
                self.rng.gen_range(0..(size.y - EXIT_HEIGHT - 1).max(1)),
            );
            area = ExitArea {
                start,
                end: Vec2i::new(
                    (start.x + EXIT_WIDTH + 1).min(size.x - 1),
                    (start.y + EXIT_HEIGHT + 1).min(size.y - 1),
                ),
            };
            if self.is_area_walkable(area) {
                return area;
            }
        }
        tracing::warn!(?area, "No fully walkable exit area found, using last candidate");
        area
    }

    fn is_area_walkable(&self, area: ExitArea) -> bool {
        (area.start.y..=area.end.y).all(|y| {
            (area.start.x..=area.end.x)
                .all(|x| self.grid.tile(Vec2i::new(x, y)).is_some_and(|t| t.can_walk()))
        })
    }

    /// Whether a player may start at a world position.
    ///
    /// Plain unlocked floor always qualifies; unlocked room and square
    /// tiles only with `allow_all_tiles`.
    #[must_use]
    pub fn is_pos_ok_for_player(&self, pos: Vec2Fixed, allow_all_tiles: bool) -> bool {
        let code = self.grid.access_code(pos.to_tile());
        if code == AccessCode::FLOOR {
            return true;
        }
        allow_all_tiles
            && (code == AccessCode::new(BaseType::Square)
                || code == AccessCode::new(BaseType::Room))
    }

    /// A random position where a box of `size` does not hit a wall, or the
    /// origin if none turns up.
    pub fn generate_free_position(&mut self, size: Vec2i) -> Vec2Fixed {
        for _ in 0..FREE_POSITION_ATTEMPTS {
            let pos = self.random_pos();
            if !self.is_collision_with_wall(pos, size) {
                return pos;
            }
        }
        Vec2Fixed::ZERO
    }

    /// ASCII rows of the access layer, one string per grid row.
    #[must_use]
    pub fn ascii_rows(&self) -> Vec<String> {
        (0..self.grid.height())
            .map(|y| {
                (0..self.grid.width())
                    .map(|x| self.grid.base_type(Vec2i::new(x, y)).ascii())
                    .collect()
            })
            .collect()
    }

    /// Serialize the access layer in its packed 16-bit form.
    pub fn encode_access_layer(&self) -> Result<Vec<u8>> {
        let packed: Vec<u16> = self
            .grid
            .access_codes()
            .iter()
            .map(|c| c.to_bits())
            .collect();
        bincode::serialize(&(self.grid.size(), packed))
            .map_err(|e| MapError::SnapshotError(format!("Failed to encode access layer: {e}")))
    }

    /// Restore an access layer produced by [`Map::encode_access_layer`].
    ///
    /// The snapshot must match this map's size.
    pub fn decode_access_layer(&mut self, data: &[u8]) -> Result<()> {
        let (size, packed): (Vec2i, Vec<u16>) = bincode::deserialize(data)
            .map_err(|e| MapError::SnapshotError(format!("Failed to decode access layer: {e}")))?;
        if size != self.grid.size() || packed.len() != self.grid.len() {
            return Err(MapError::SnapshotError(format!(
                "snapshot is {}x{}, map is {}x{}",
                size.x,
                size.y,
                self.grid.width(),
                self.grid.height()
            )));
        }
        let codes = packed
            .into_iter()
            .map(|bits| {
                AccessCode::from_bits(bits).ok_or_else(|| {
                    MapError::SnapshotError(format!("invalid access code {bits:#06x}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.grid.replace_access_codes(codes);
        Ok(())
    }

    /// Hash of the level layout for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.grid.size().hash(&mut hasher);
        for code in self.grid.access_codes() {
            code.to_bits().hash(&mut hasher);
        }
        for tile in self.grid.tiles() {
            tile.flags.hash(&mut hasher);
            tile.pic.hash(&mut hasher);
        }
        self.triggers.hash(&mut hasher);
        self.door_groups.hash(&mut hasher);
        self.exit.hash(&mut hasher);
        self.key_access_count.hash(&mut hasher);
        self.num_explorable_tiles.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessBits;

    fn map(w: i32, h: i32) -> Map {
        Map::with_size(MapConfig::default(), Vec2i::new(w, h)).unwrap()
    }

    #[test]
    fn test_triggers_get_increasing_ids() {
        let mut m = map(4, 4);
        assert_eq!(m.new_trigger().id, 0);
        assert_eq!(m.new_trigger().id, 1);
        assert_eq!(m.triggers().len(), 2);
    }

    #[test]
    fn test_random_tile_in_bounds() {
        let mut m = map(5, 3);
        for _ in 0..200 {
            let tile = m.random_tile();
            assert!(m.grid().in_bounds(tile));
            let pos = m.random_pos();
            assert!(m.grid().is_pos_in(pos));
        }
    }

    #[test]
    fn test_shadow_under_wall() {
        let mut m = map(3, 3);
        m.grid_mut()
            .set_access_code(Vec2i::new(1, 0), AccessCode::new(BaseType::Wall));
        m.grid_mut()
            .set_access_code(Vec2i::new(1, 1), AccessCode::new(BaseType::Room));
        m.setup_tiles_and_walls();

        let g = m.grid();
        assert_eq!(g.tile(Vec2i::new(1, 0)).unwrap().pic, TilePic::Wall);
        assert_eq!(g.tile(Vec2i::new(1, 1)).unwrap().pic, TilePic::RoomShadow);
        assert_eq!(g.tile(Vec2i::new(0, 1)).unwrap().pic, TilePic::Floor);
        assert!(g.tile(Vec2i::new(0, 0)).unwrap().is_normal_floor());
        assert!(!g.tile(Vec2i::new(1, 0)).unwrap().can_walk());
    }

    #[test]
    fn test_exit_area_contains_and_center() {
        let area = ExitArea {
            start: Vec2i::new(2, 2),
            end: Vec2i::new(4, 6),
        };
        assert!(area.contains(Vec2i::new(4, 6)));
        assert!(!area.contains(Vec2i::new(5, 6)));
        assert_eq!(area.center().to_tile(), Vec2i::new(3, 4));
    }

    #[test]
    fn test_random_exit_area_is_walkable() {
        let mut m = map(20, 20);
        m.setup_tiles_and_walls();
        let area = m.generate_random_exit_area();
        assert_eq!(area.end.x - area.start.x, EXIT_WIDTH + 1);
        assert!(m.is_area_walkable(area));
    }

    #[test]
    fn test_exit_area_clamped_on_small_map() {
        let mut m = map(4, 4);
        m.setup_tiles_and_walls();
        let area = m.generate_random_exit_area();
        assert_eq!(area.start, Vec2i::ZERO);
        assert_eq!(area.end, Vec2i::new(3, 3));
    }

    #[test]
    fn test_show_exit_area_paints_perimeter() {
        let mut m = map(6, 6);
        m.setup_tiles_and_walls();
        let area = ExitArea {
            start: Vec2i::new(1, 1),
            end: Vec2i::new(4, 4),
        };
        m.show_exit_area(area);
        let g = m.grid();
        assert_eq!(g.tile(Vec2i::new(1, 1)).unwrap().pic, TilePic::Exit);
        assert_eq!(g.tile(Vec2i::new(4, 3)).unwrap().pic, TilePic::Exit);
        assert_eq!(g.tile(Vec2i::new(2, 2)).unwrap().pic, TilePic::Floor);
    }

    #[test]
    fn test_pos_ok_for_player() {
        let mut m = map(3, 1);
        m.grid_mut()
            .set_access_code(Vec2i::new(1, 0), AccessCode::new(BaseType::Room));
        m.grid_mut().set_access_code(
            Vec2i::new(2, 0),
            AccessCode::new(BaseType::Room).with_access(AccessBits::BLUE),
        );
        let floor = tile_center(Vec2i::new(0, 0));
        let room = tile_center(Vec2i::new(1, 0));
        let locked = tile_center(Vec2i::new(2, 0));
        assert!(m.is_pos_ok_for_player(floor, false));
        assert!(!m.is_pos_ok_for_player(room, false));
        assert!(m.is_pos_ok_for_player(room, true));
        assert!(!m.is_pos_ok_for_player(locked, true));
    }

    #[test]
    fn test_access_layer_snapshot() {
        let mut m = map(4, 2);
        m.grid_mut().set_access_code(
            Vec2i::new(3, 1),
            AccessCode::new(BaseType::Room).with_access(AccessBits::GREEN),
        );
        let bytes = m.encode_access_layer().unwrap();

        let mut other = map(4, 2);
        other.decode_access_layer(&bytes).unwrap();
        assert_eq!(other.grid().access_codes(), m.grid().access_codes());

        let mut wrong_size = map(2, 2);
        assert!(matches!(
            wrong_size.decode_access_layer(&bytes),
            Err(MapError::SnapshotError(_))
        ));
    }

    #[test]
    fn test_same_seed_same_random_tiles() {
        let mut a = map(30, 30);
        let mut b = map(30, 30);
        for _ in 0..20 {
            assert_eq!(a.random_tile(), b.random_tile());
        }
    }

    #[test]
    fn test_free_position_clear_of_walls() {
        let mut m = map(8, 8);
        for y in 0..8 {
            for x in 0..4 {
                m.grid_mut()
                    .set_access_code(Vec2i::new(x, y), AccessCode::new(BaseType::Wall));
            }
        }
        m.setup_tiles_and_walls();

        let size = Vec2i::new(4, 3);
        for _ in 0..10 {
            let pos = m.generate_free_position(size);
            assert!(!m.is_collision_with_wall(pos, size));
            assert!(m.grid().tile(pos.to_tile()).unwrap().can_walk());
            assert!(pos.to_tile().x >= 4);
        }
    }

    #[test]
    fn test_free_position_falls_back_to_origin() {
        let mut m = map(3, 3);
        for pos in m.grid().positions().collect::<Vec<_>>() {
            m.grid_mut().set_access_code(pos, AccessCode::new(BaseType::Wall));
        }
        m.setup_tiles_and_walls();
        assert_eq!(m.generate_free_position(Vec2i::new(4, 3)), Vec2Fixed::ZERO);
    }
}
