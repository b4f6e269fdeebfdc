//! Placement and spatial query benchmarks for mapgen_core.
//!
//! Run with: `cargo bench -p mapgen_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mapgen_core::prelude::*;
use mapgen_test_utils::fixtures::{load_two_room_level, paint_border};

fn bordered_map(size: i32) -> Map {
    let mut map = Map::with_size(MapConfig::default(), Vec2i::new(size, size))
        .unwrap_or_else(|e| panic!("bench map: {e}"));
    paint_border(&mut map);
    map.setup_tiles_and_walls();
    map
}

/// Random placement of scattered objects on an open map.
pub fn placement_benchmark(c: &mut Criterion) {
    let densities = vec![MapObjectDensity {
        object: MapObject::new("barrel").with_placement(PlacementFlags::NO_WALLS),
        density: 30,
    }];
    c.bench_function("scatter_64x64", |b| {
        b.iter(|| {
            let mut map = bordered_map(64);
            let mut events = EventQueue::new();
            black_box(map.scatter_map_objects(&mut events, &densities))
        })
    });

    c.bench_function("load_two_room_32x24", |b| {
        b.iter(|| black_box(load_two_room_level(black_box(11), 32, 24).events.len()))
    });
}

/// Area-clear queries against a crowded occupant index.
pub fn spatial_benchmark(c: &mut Criterion) {
    let mut map = bordered_map(32);
    let mut registry = BTreeMap::new();
    let mut id = 0;
    for pos in map.grid().positions().collect::<Vec<_>>() {
        if pos.x % 2 == 0 && pos.y % 3 == 0 {
            let mut item = TileItem::new(id, ThingKind::Object, Vec2i::new(6, 6));
            if map.try_move_tile_item(&mut item, tile_center(pos)) {
                registry.insert(item.thing_id(), item);
            }
            id += 1;
        }
    }
    let probes: Vec<Vec2Fixed> = (1..31).map(|i| tile_center(Vec2i::new(i, 31 - i))).collect();

    c.bench_function("area_clear_crowded", |b| {
        b.iter(|| {
            probes
                .iter()
                .filter(|&&pos| map.is_tile_area_clear(pos, Vec2i::new(8, 8), &registry))
                .count()
        })
    });
}

criterion_group!(benches, placement_benchmark, spatial_benchmark);
criterion_main!(benches);
