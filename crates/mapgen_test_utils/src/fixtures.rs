//! Fixture levels and grid painting helpers.
//!
//! Fixtures paint the access layer directly and then run the same tile
//! setup that [`Map::load`] would, so tests can start from a finished grid
//! without going through a generator.

use mapgen_core::prelude::*;

/// Create a map of `width` x `height` floor tiles with tile flags set up.
///
/// # Panics
///
/// Panics on a non-positive size.
#[must_use]
pub fn blank_map(width: i32, height: i32) -> Map {
    blank_map_with(MapConfig::default(), width, height)
}

/// Like [`blank_map`] with an explicit config.
///
/// # Panics
///
/// Panics on a non-positive size.
#[must_use]
pub fn blank_map_with(config: MapConfig, width: i32, height: i32) -> Map {
    let mut map = Map::with_size(config, Vec2i::new(width, height))
        .unwrap_or_else(|e| panic!("fixture map: {e}"));
    map.setup_tiles_and_walls();
    map
}

/// Wall off the outermost ring of tiles.
pub fn paint_border(map: &mut Map) {
    let size = map.size();
    for pos in map.grid().positions().collect::<Vec<_>>() {
        if pos.x == 0 || pos.y == 0 || pos.x == size.x - 1 || pos.y == size.y - 1 {
            map.grid_mut()
                .set_access_code(pos, AccessCode::new(BaseType::Wall));
        }
    }
}

/// Paint a horizontal strip of room tiles carrying `access` bits.
pub fn paint_room_strip(map: &mut Map, start: TilePos, length: i32, access: AccessBits) {
    for i in 0..length {
        map.grid_mut().set_access_code(
            start.offset(i, 0),
            AccessCode::new(BaseType::Room).with_access(access),
        );
    }
}

/// Paint a rectangle of one base type, `start` and `end` inclusive.
pub fn paint_rect(map: &mut Map, start: TilePos, end: TilePos, code: AccessCode) {
    for y in start.y..=end.y {
        for x in start.x..=end.x {
            map.grid_mut().set_access_code(Vec2i::new(x, y), code);
        }
    }
}

/// Two-room fixture layout.
///
/// Border walls, an unlocked room strip near the top, and a yellow-locked
/// room filling the bottom half behind a wall with a single door. Sets the
/// key access count to 2. Needs at least 8x8 tiles.
pub fn two_room_level(map: &mut Map, _mission: &MissionSpec) -> Result<()> {
    let size = map.size();
    if size.x < 8 || size.y < 8 {
        return Err(MapError::GeneratorFailed(format!(
            "two-room level needs 8x8 tiles, got {}x{}",
            size.x, size.y
        )));
    }
    paint_border(map);
    let mid = size.y / 2;
    paint_room_strip(map, Vec2i::new(2, 2), size.x - 4, AccessBits::empty());
    paint_rect(
        map,
        Vec2i::new(1, mid),
        Vec2i::new(size.x - 2, mid),
        AccessCode::new(BaseType::Wall),
    );
    paint_rect(
        map,
        Vec2i::new(1, mid + 1),
        Vec2i::new(size.x - 2, size.y - 2),
        AccessCode::new(BaseType::Room).with_access(AccessBits::YELLOW),
    );
    map.grid_mut()
        .set_access_code(Vec2i::new(size.x / 2, mid), AccessCode::new(BaseType::Door));
    map.set_key_access_count(2);
    Ok(())
}

/// A mission on the two-room fixture with one collect and one destroy
/// objective.
#[must_use]
pub fn two_room_mission(width: i32, height: i32) -> MissionSpec {
    let mut mission = MissionSpec::new(Vec2i::new(width, height), MapType::Classic);
    mission.title = "Fixture".to_string();
    mission.objectives = vec![
        Objective::new(
            ObjectiveKind::Collect(PickupClass {
                name: "folder".to_string(),
                kind: PickupKind::Score,
            }),
            3,
        )
        .with_required(2),
        Objective::new(
            ObjectiveKind::Destroy(MapObject::new("computer").with_health(40)),
            2,
        ),
    ];
    mission.map_object_densities = vec![MapObjectDensity {
        object: MapObject::new("barrel").with_placement(PlacementFlags::NO_WALLS),
        density: 20,
    }];
    mission
}

/// Path cache recording the notifications it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingPathCache {
    /// Sizes passed to `init`, in order.
    pub inits: Vec<Vec2i>,
    /// Number of `terminate` calls.
    pub terminations: usize,
}

impl PathCache for RecordingPathCache {
    fn init(&mut self, size: Vec2i) {
        self.inits.push(size);
    }

    fn terminate(&mut self) {
        self.terminations += 1;
    }
}

/// A fully loaded and populated level plus everything it emitted.
#[derive(Debug)]
pub struct LoadedLevel {
    /// The map after `load` and `load_dynamic`.
    pub map: Map,
    /// Mission with objective counts clamped.
    pub mission: MissionSpec,
    /// Emitted add-object and add-pickup requests.
    pub events: EventQueue,
}

/// Run `load` and `load_dynamic` with one generator for every map style.
pub fn load_level<G>(
    config: MapConfig,
    mut mission: MissionSpec,
    generator: G,
) -> Result<LoadedLevel>
where
    G: MapGenerator + Clone + 'static,
{
    let mut generators = Generators::uniform(generator);
    let mut map = Map::new(config);
    let mut events = EventQueue::new();
    map.load(&mission, &mut generators, &mut NoPathCache, &mut events)?;
    map.load_dynamic(
        &mut mission,
        &mut generators,
        &mut events,
        &CharacterStore::default(),
    )?;
    tracing::debug!(events = events.len(), "Fixture level loaded");
    Ok(LoadedLevel {
        map,
        mission,
        events,
    })
}

/// Load the two-room fixture level with a seed.
///
/// # Panics
///
/// Panics if loading fails.
#[must_use]
pub fn load_two_room_level(seed: u64, width: i32, height: i32) -> LoadedLevel {
    load_level(
        MapConfig::default().with_seed(seed),
        two_room_mission(width, height),
        two_room_level,
    )
    .unwrap_or_else(|e| panic!("two-room fixture failed to load: {e}"))
}
