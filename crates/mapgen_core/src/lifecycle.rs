//! Map load, dynamic population and teardown.
//!
//! Loading runs in two steps. [`Map::load`] builds the static level: a
//! fresh grid filled by one map style generator, tile flags, door groups,
//! drains and the exit. [`Map::load_dynamic`] then populates it with
//! scattered objects, objectives and keys.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::events::EventQueue;
use crate::grid::Grid;
use crate::map::Map;
use crate::math::Vec2i;
use crate::mission::{CharacterStore, MapObject, MapType, MissionSpec};
use crate::tile::{ItemFlags, Tile};

/// Tiles per drain attempt on classic maps.
pub const DRAIN_DENSITY: usize = 45;

/// A map style: fills a fresh grid with a layout.
///
/// Generators write the access layer through [`Map::grid_mut`] and may set
/// the exit area and key access count. Tile flags, doors and the exit are
/// finished by [`Map::load`] afterwards.
pub trait MapGenerator {
    /// Lay out the level on an all-floor grid of the mission's size.
    fn generate(&mut self, map: &mut Map, mission: &MissionSpec) -> Result<()>;

    /// Style-specific population run at the start of [`Map::load_dynamic`].
    ///
    /// Only called for [`MapType::Static`] maps.
    fn load_dynamic(
        &mut self,
        _map: &mut Map,
        _mission: &MissionSpec,
        _events: &mut EventQueue,
        _characters: &CharacterStore,
    ) -> Result<()> {
        Ok(())
    }
}

impl<F> MapGenerator for F
where
    F: FnMut(&mut Map, &MissionSpec) -> Result<()>,
{
    fn generate(&mut self, map: &mut Map, mission: &MissionSpec) -> Result<()> {
        self(map, mission)
    }
}

/// One generator per map style.
pub struct Generators {
    classic: Box<dyn MapGenerator>,
    cave: Box<dyn MapGenerator>,
    static_map: Box<dyn MapGenerator>,
}

impl Generators {
    /// Register the three map style generators.
    pub fn new(
        classic: impl MapGenerator + 'static,
        cave: impl MapGenerator + 'static,
        static_map: impl MapGenerator + 'static,
    ) -> Self {
        Self {
            classic: Box::new(classic),
            cave: Box::new(cave),
            static_map: Box::new(static_map),
        }
    }

    /// Use the same generator for every map style.
    pub fn uniform<G>(generator: G) -> Self
    where
        G: MapGenerator + Clone + 'static,
    {
        Self::new(generator.clone(), generator.clone(), generator)
    }

    /// Generator for a map style.
    pub fn for_type(&mut self, map_type: MapType) -> &mut dyn MapGenerator {
        match map_type {
            MapType::Classic => self.classic.as_mut(),
            MapType::Cave => self.cave.as_mut(),
            MapType::Static => self.static_map.as_mut(),
        }
    }
}

impl std::fmt::Debug for Generators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generators").finish_non_exhaustive()
    }
}

/// Path-finding cache notified when a grid is built or torn down.
pub trait PathCache {
    /// A grid of `size` tiles was allocated.
    fn init(&mut self, size: Vec2i);
    /// The grid is going away.
    fn terminate(&mut self);
}

/// Path cache for callers without path-finding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPathCache;

impl PathCache for NoPathCache {
    fn init(&mut self, _size: Vec2i) {}
    fn terminate(&mut self) {}
}

impl Map {
    /// Tear down the loaded level: triggers, door groups, grid, caches and
    /// counters. The map can be loaded again afterwards.
    pub fn terminate(&mut self, path_cache: &mut dyn PathCache) {
        self.triggers.clear();
        self.door_groups.clear();
        self.next_trigger_id = 0;
        self.grid = Grid::default();
        self.los.terminate();
        path_cache.terminate();
        self.exit = None;
        self.key_access_count = 0;
        self.num_explorable_tiles = 0;
        self.tiles_seen = 0;
    }

    /// Build the static level for a mission.
    ///
    /// Any previous level is torn down first. Drains scattered on classic
    /// maps go to `events`.
    pub fn load(
        &mut self,
        mission: &MissionSpec,
        generators: &mut Generators,
        path_cache: &mut dyn PathCache,
        events: &mut EventQueue,
    ) -> Result<()> {
        self.terminate(path_cache);

        let size = mission.size;
        self.grid = Grid::new(size)?;
        self.los.init(size);
        path_cache.init(size);
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.exit = mission.exit_area;
        tracing::debug!(
            width = size.x,
            height = size.y,
            map_type = ?mission.map_type,
            "Generating map"
        );

        generators.for_type(mission.map_type).generate(self, mission)?;
        if tracing::enabled!(tracing::Level::TRACE) {
            for row in self.ascii_rows() {
                tracing::trace!("{row}");
            }
        }

        self.setup_tiles_and_walls();
        self.setup_doors();

        if mission.map_type == MapType::Classic {
            let placed = self.place_drains(events);
            tracing::debug!(placed, "Drains placed");
        }

        let exit = match self.exit {
            Some(exit) => exit,
            None => {
                let exit = self.generate_random_exit_area();
                self.exit = Some(exit);
                exit
            }
        };
        self.show_exit_area(exit);

        let explorable = self.count_explorable_tiles();
        tracing::debug!(?exit, explorable, "Map loaded");
        Ok(())
    }

    /// Scatter drains on even-aligned normal floor tiles, one attempt per
    /// [`DRAIN_DENSITY`] tiles. Returns the number placed.
    fn place_drains(&mut self, events: &mut EventQueue) -> usize {
        let drain = MapObject::drain();
        let mut placed = 0;
        for _ in 0..self.grid.len() / DRAIN_DENSITY {
            let tile = self.random_tile();
            let tile = Vec2i::new(tile.x & !1, tile.y & !1);
            if !self.grid.tile(tile).is_some_and(Tile::is_normal_floor) {
                continue;
            }
            if self.try_place_one_object(events, tile, &drain, ItemFlags::empty(), false) {
                placed += 1;
            }
        }
        placed
    }

    /// Populate a loaded level: static map setup, scattered map objects,
    /// then objectives and keys if the game mode uses them.
    ///
    /// Objective counts in `mission` are clamped to what was placed.
    pub fn load_dynamic(
        &mut self,
        mission: &mut MissionSpec,
        generators: &mut Generators,
        events: &mut EventQueue,
        characters: &CharacterStore,
    ) -> Result<()> {
        if mission.map_type == MapType::Static {
            generators
                .for_type(MapType::Static)
                .load_dynamic(self, mission, events, characters)?;
        }

        let scattered = self.scatter_map_objects(events, &mission.map_object_densities);
        tracing::debug!(scattered, "Map objects scattered");

        if mission.mode.has_objectives() {
            self.add_objectives(events, &mut mission.objectives);
        }
        if mission.mode.keys_allowed() {
            let keys = self.add_keys(events, mission)?;
            tracing::debug!(keys, key_access_count = self.key_access_count, "Keys placed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessBits, AccessCode, BaseType};
    use crate::config::MapConfig;
    use crate::error::MapError;
    use crate::events::MapEvent;
    use crate::mission::{GameMode, Objective, ObjectiveKind, PickupClass, PickupKind};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct CountingCache {
        inits: Vec<Vec2i>,
        terminations: usize,
    }

    impl PathCache for CountingCache {
        fn init(&mut self, size: Vec2i) {
            self.inits.push(size);
        }

        fn terminate(&mut self) {
            self.terminations += 1;
        }
    }

    fn empty(_: &mut Map, _: &MissionSpec) -> Result<()> {
        Ok(())
    }

    fn walled(map: &mut Map, _: &MissionSpec) -> Result<()> {
        let size = map.size();
        for pos in map.grid().positions().collect::<Vec<_>>() {
            if pos.x == 0 || pos.y == 0 || pos.x == size.x - 1 || pos.y == size.y - 1 {
                map.grid_mut().set_access_code(pos, AccessCode::new(BaseType::Wall));
            }
        }
        map.grid_mut()
            .set_access_code(Vec2i::new(5, 3), AccessCode::new(BaseType::Door));
        Ok(())
    }

    fn failing(_: &mut Map, _: &MissionSpec) -> Result<()> {
        Err(MapError::GeneratorFailed("no layout".to_string()))
    }

    /// Counts calls to its dynamic population hook.
    #[derive(Debug, Clone, Default)]
    struct HookCounter(Rc<Cell<u32>>);

    impl MapGenerator for HookCounter {
        fn generate(&mut self, _map: &mut Map, _mission: &MissionSpec) -> Result<()> {
            Ok(())
        }

        fn load_dynamic(
            &mut self,
            _map: &mut Map,
            _mission: &MissionSpec,
            _events: &mut EventQueue,
            _characters: &CharacterStore,
        ) -> Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_load_dispatches_by_type() {
        let mut generators = Generators::new(empty, walled, failing);
        let mut map = Map::new(MapConfig::default());
        let mut cache = NoPathCache;
        let mut events = EventQueue::new();

        let cave = MissionSpec::new(Vec2i::new(12, 12), MapType::Cave);
        map.load(&cave, &mut generators, &mut cache, &mut events).unwrap();
        assert_eq!(map.grid().base_type(Vec2i::ZERO), BaseType::Wall);
        assert_eq!(map.door_groups().len(), 1);
        // Cave maps get no drains
        assert!(events.is_empty());

        let static_map = MissionSpec::new(Vec2i::new(12, 12), MapType::Static);
        let err = map
            .load(&static_map, &mut generators, &mut cache, &mut events)
            .unwrap_err();
        assert!(matches!(err, MapError::GeneratorFailed(_)));
    }

    #[test]
    fn test_load_finishes_level() {
        let mut generators = Generators::uniform(walled);
        let mut map = Map::new(MapConfig::default());
        let mut cache = CountingCache::default();
        let mut events = EventQueue::new();
        let mission = MissionSpec::new(Vec2i::new(20, 16), MapType::Cave);

        map.load(&mission, &mut generators, &mut cache, &mut events)
            .unwrap();
        assert_eq!(cache.inits, vec![Vec2i::new(20, 16)]);
        assert_eq!(cache.terminations, 1);
        assert_eq!(map.los().size(), Vec2i::new(20, 16));

        // Border walls are not explorable; doors are
        let walls = 2 * 20 + 2 * 14;
        assert_eq!(map.num_explorable_tiles(), 20 * 16 - walls);
        let exit = map.exit_area().unwrap();
        assert!(map.grid().tile(exit.start).unwrap().can_walk());
        assert_eq!(map.triggers().len(), 1);
    }

    #[test]
    fn test_explicit_exit_kept() {
        let mut generators = Generators::uniform(empty);
        let mut map = Map::new(MapConfig::default());
        let mut events = EventQueue::new();
        let mut mission = MissionSpec::new(Vec2i::new(10, 10), MapType::Cave);
        mission.exit_area = Some(crate::map::ExitArea {
            start: Vec2i::new(1, 1),
            end: Vec2i::new(3, 3),
        });
        map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
            .unwrap();
        assert_eq!(map.exit_area(), mission.exit_area);
        assert_eq!(
            map.grid().tile(Vec2i::new(1, 2)).unwrap().pic,
            crate::tile::TilePic::Exit
        );
    }

    #[test]
    fn test_reload_clears_previous_level() {
        let mut generators = Generators::uniform(walled);
        let mut map = Map::new(MapConfig::default());
        let mut events = EventQueue::new();
        let mission = MissionSpec::new(Vec2i::new(10, 10), MapType::Cave);

        map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
            .unwrap();
        map.mark_visited(Vec2i::new(2, 2));
        map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
            .unwrap();
        assert_eq!(map.triggers().len(), 1);
        assert_eq!(map.triggers()[0].id, 0);
        assert_eq!(map.tiles_seen(), 0);
        assert!(!map.grid().tile(Vec2i::new(2, 2)).unwrap().is_visited);
    }

    #[test]
    fn test_classic_drains_on_even_floor() {
        let mut generators = Generators::uniform(empty);
        let mut map = Map::new(MapConfig::default());
        let mut events = EventQueue::new();
        let mission = MissionSpec::new(Vec2i::new(30, 30), MapType::Classic);
        map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
            .unwrap();

        assert!(events.len() <= 900 / DRAIN_DENSITY);
        assert!(!events.is_empty());
        for drain in events.objects() {
            assert_eq!(drain.class_name, "drain0");
            assert!(drain.flags.contains(ItemFlags::DRAW_BELOW));
            let tile = drain.pos.to_tile();
            assert_eq!((tile.x % 2, tile.y % 2), (0, 0));
        }
    }

    #[test]
    fn test_terminate_resets_everything() {
        let mut generators = Generators::uniform(walled);
        let mut map = Map::new(MapConfig::default());
        let mut cache = CountingCache::default();
        let mut events = EventQueue::new();
        let mission = MissionSpec::new(Vec2i::new(10, 10), MapType::Cave);
        map.load(&mission, &mut generators, &mut cache, &mut events)
            .unwrap();

        map.terminate(&mut cache);
        assert_eq!(cache.terminations, 2);
        assert!(map.grid().is_empty());
        assert!(map.triggers().is_empty());
        assert!(map.door_groups().is_empty());
        assert_eq!(map.exit_area(), None);
        assert_eq!(map.num_explorable_tiles(), 0);
    }

    #[test]
    fn test_load_dynamic_places_objectives_and_keys() {
        fn with_rooms(map: &mut Map, _: &MissionSpec) -> Result<()> {
            for x in 2..8 {
                map.grid_mut()
                    .set_access_code(Vec2i::new(x, 2), AccessCode::new(BaseType::Room));
                map.grid_mut().set_access_code(
                    Vec2i::new(x, 8),
                    AccessCode::new(BaseType::Room).with_access(AccessBits::YELLOW),
                );
            }
            map.set_key_access_count(2);
            Ok(())
        }

        let mut generators = Generators::uniform(with_rooms);
        let mut map = Map::new(MapConfig::default());
        let mut events = EventQueue::new();
        let mut mission = MissionSpec::new(Vec2i::new(16, 16), MapType::Cave);
        mission.objectives.push(Objective::new(
            ObjectiveKind::Collect(PickupClass {
                name: "folder".to_string(),
                kind: PickupKind::Score,
            }),
            2,
        ));

        map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
            .unwrap();
        map.load_dynamic(&mut mission, &mut generators, &mut events, &CharacterStore::default())
            .unwrap();

        let classes: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                MapEvent::AddPickup(p) => Some(p.pickup_class.as_str()),
                MapEvent::AddObject(_) => None,
            })
            .collect();
        assert_eq!(classes, vec!["folder", "folder", "plain_yellow"]);
        assert_eq!(mission.objectives[0].placed, 2);
    }

    #[test]
    fn test_load_dynamic_skips_keys_outside_campaign() {
        let mut generators = Generators::uniform(empty);
        let mut map = Map::new(MapConfig::default());
        let mut events = EventQueue::new();
        let mut mission = MissionSpec::new(Vec2i::new(10, 10), MapType::Cave);
        mission.mode = GameMode::Deathmatch;
        mission
            .objectives
            .push(Objective::new(ObjectiveKind::Destroy(MapObject::new("computer")), 3));

        map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
            .unwrap();
        // No room tiles: a campaign would fail to place its key here
        map.set_key_access_count(2);
        map.load_dynamic(&mut mission, &mut generators, &mut events, &CharacterStore::default())
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(mission.objectives[0].placed, 0);
    }

    #[test]
    fn test_dynamic_hook_runs_for_static_maps_only() {
        let calls = HookCounter::default();
        let mut generators = Generators::uniform(calls.clone());
        let mut map = Map::new(MapConfig::default());
        let mut events = EventQueue::new();
        let characters = CharacterStore::default();

        for map_type in [MapType::Classic, MapType::Cave] {
            let mut mission = MissionSpec::new(Vec2i::new(10, 10), map_type);
            mission.mode = GameMode::Deathmatch;
            map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
                .unwrap();
            map.load_dynamic(&mut mission, &mut generators, &mut events, &characters)
                .unwrap();
        }
        assert_eq!(calls.0.get(), 0);

        let mut mission = MissionSpec::new(Vec2i::new(10, 10), MapType::Static);
        mission.mode = GameMode::Deathmatch;
        map.load(&mission, &mut generators, &mut NoPathCache, &mut events)
            .unwrap();
        map.load_dynamic(&mut mission, &mut generators, &mut events, &characters)
            .unwrap();
        assert_eq!(calls.0.get(), 1);
    }
}
