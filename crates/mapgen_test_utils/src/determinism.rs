//! Determinism testing utilities.
//!
//! A level loaded twice from the same mission, generator and seed must
//! produce the same grid and the same stream of add requests. Sources of
//! divergence to watch for:
//!
//! - **Unseeded randomness**: every random choice must come from the
//!   map's seeded generator.
//! - **HashMap iteration order**: scans run in row-major tile order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use mapgen_core::prelude::*;

use crate::fixtures::{load_level, LoadedLevel};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic load).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Map load is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash of a loaded level: map state plus every emitted event, in order.
#[must_use]
pub fn level_hash(level: &LoadedLevel) -> u64 {
    let mut hasher = DefaultHasher::new();
    level.map.state_hash().hash(&mut hasher);
    for event in level.events.iter() {
        event.hash(&mut hasher);
    }
    for objective in &level.mission.objectives {
        (objective.count, objective.required, objective.placed).hash(&mut hasher);
    }
    hasher.finish()
}

/// Run a setup function several times and compare the hashes it yields.
pub fn verify_determinism<S, Setup, HashFn>(
    runs: usize,
    setup: Setup,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| hash(&setup())).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Load a level `runs` times with the same seed and compare.
///
/// # Panics
///
/// Panics if any load fails.
pub fn verify_load_determinism<G>(
    runs: usize,
    config: &MapConfig,
    mission: &MissionSpec,
    generator: G,
) -> DeterminismResult
where
    G: MapGenerator + Clone + 'static,
{
    verify_determinism(
        runs,
        || {
            load_level(config.clone(), mission.clone(), generator.clone())
                .unwrap_or_else(|e| panic!("load failed: {e}"))
        },
        level_hash,
    )
}
