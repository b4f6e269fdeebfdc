//! Load a mission on an ASCII layout and summarize the result.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use mapgen_core::prelude::*;
use serde::Serialize;

use crate::error::{Result, ToolError};
use crate::layout::AsciiLayout;

/// Inputs of the `generate` command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Mission RON file.
    pub mission: PathBuf,
    /// ASCII layout file.
    pub layout: PathBuf,
    /// Optional `MapConfig` RON file.
    pub config: Option<PathBuf>,
    /// Seed overriding the config.
    pub seed: Option<u64>,
}

/// Everything worth looking at after a load.
#[derive(Debug, Clone, Serialize)]
pub struct MapReport {
    /// Mission title.
    pub title: String,
    /// Grid size in tiles.
    pub size: Vec2i,
    /// Access layer dump, one string per row.
    pub rows: Vec<String>,
    /// Door groups in scan order.
    pub door_groups: Vec<DoorGroup>,
    /// Final exit rectangle.
    pub exit: Option<ExitArea>,
    /// Walkable tile count.
    pub explorable_tiles: usize,
    /// Access partitions in use.
    pub key_access_count: usize,
    /// Objectives with counts clamped to what was placed.
    pub objectives: Vec<Objective>,
    /// Add requests in emission order.
    pub events: Vec<MapEvent>,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and populate a mission on a layout.
///
/// The mission size is taken from the layout.
pub fn generate(
    mut mission: MissionSpec,
    layout: AsciiLayout,
    config: MapConfig,
) -> Result<MapReport> {
    if mission.size != layout.size() {
        tracing::warn!(
            mission = ?mission.size,
            layout = ?layout.size(),
            "Mission size differs from layout, using layout size"
        );
        mission.size = layout.size();
    }

    let mut generators = Generators::uniform(layout);
    let mut map = Map::new(config);
    let mut events = EventQueue::new();
    map.load(&mission, &mut generators, &mut NoPathCache, &mut events)?;
    map.load_dynamic(
        &mut mission,
        &mut generators,
        &mut events,
        &CharacterStore::default(),
    )?;

    Ok(MapReport {
        title: mission.title.clone(),
        size: map.size(),
        rows: map.ascii_rows(),
        door_groups: map.door_groups().to_vec(),
        exit: map.exit_area(),
        explorable_tiles: map.num_explorable_tiles(),
        key_access_count: map.key_access_count(),
        objectives: mission.objectives,
        events: events.drain(),
    })
}

/// Read the inputs named by `options` and run [`generate`].
pub fn run_generate(options: &GenerateOptions) -> Result<MapReport> {
    let mission = MissionSpec::from_ron(&read(&options.mission)?)?;
    let layout = AsciiLayout::parse(&read(&options.layout)?)?;
    let mut config = match &options.config {
        Some(path) => MapConfig::from_ron(&read(path)?)?,
        None => MapConfig::default(),
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    tracing::info!(seed = config.seed, mission = %options.mission.display(), "Generating");
    generate(mission, layout, config)
}

/// Parse a mission file without loading it.
pub fn validate_mission(path: &Path) -> Result<MissionSpec> {
    Ok(MissionSpec::from_ron(&read(path)?)?)
}

impl MapReport {
    /// Human-readable summary.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({}x{})", self.title, self.size.x, self.size.y);
        for row in &self.rows {
            let _ = writeln!(out, "  {row}");
        }
        let _ = writeln!(
            out,
            "explorable tiles: {}, access partitions: {}",
            self.explorable_tiles, self.key_access_count
        );
        if let Some(exit) = self.exit {
            let _ = writeln!(
                out,
                "exit: ({}, {}) - ({}, {})",
                exit.start.x, exit.start.y, exit.end.x, exit.end.y
            );
        }
        for group in &self.door_groups {
            let card = group.keycard.map_or("none", Keycard::color_name);
            let _ = writeln!(
                out,
                "door at ({}, {}) x{} {:?}, key: {card}",
                group.anchor.x, group.anchor.y, group.length, group.orientation
            );
        }
        for (i, objective) in self.objectives.iter().enumerate() {
            let _ = writeln!(
                out,
                "objective {i}: {}/{} placed, {} required",
                objective.placed, objective.count, objective.required
            );
        }
        for event in &self.events {
            let _ = match event {
                MapEvent::AddObject(o) => writeln!(
                    out,
                    "object #{} {} at ({:.1}, {:.1})",
                    o.uid, o.class_name, o.pos.x, o.pos.y
                ),
                MapEvent::AddPickup(p) => writeln!(
                    out,
                    "pickup #{} {} at ({:.1}, {:.1})",
                    p.uid, p.pickup_class, p.pos.x, p.pos.y
                ),
            };
        }
        out
    }

    /// Pretty JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
