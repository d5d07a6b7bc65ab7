//! Tile generation: ratio-guided category choice, the desert-gap override and
//! the local placement rules.
//!
//! [`generate`] is a pure function of its arguments. Every draw comes from the
//! tile's keyed stream and the caller applies the result to the world.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::DifficultyProfile;
use crate::hex::Hex;
use crate::key_rng::{self, RandomStream};
use crate::terrain::{Category, TerrainType};

pub const DEFAULT_BIOME_FRACTION: f64 = 0.35;

/// Largest ring searched for the nearest Biome tile; past it the gap is infinite.
pub const NEAREST_BIOME_SCAN_RADIUS: u32 = 6;

/// Read access to tiles that already exist.
pub trait TileLookup {
    fn terrain_at(&self, hex: Hex) -> Option<TerrainType>;
}

impl TileLookup for HashMap<Hex, TerrainType> {
    fn terrain_at(&self, hex: Hex) -> Option<TerrainType> {
        self.get(&hex).copied()
    }
}

/// Generated tiles per category; feedback input for the category draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioCounters {
    pub biome: u64,
    pub desert: u64,
}

impl RatioCounters {
    pub fn record(&mut self, category: Category) {
        match category {
            Category::Biome => self.biome += 1,
            Category::Desert => self.desert += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.biome + self.desert
    }

    pub fn biome_fraction(&self) -> f64 {
        match self.total() {
            0 => DEFAULT_BIOME_FRACTION,
            total => self.biome as f64 / total as f64,
        }
    }
}

/// Probability of drawing a Biome given the current biome fraction.
///
/// Keeps the long-run ratio inside a 30-40% biome band without clamping any
/// single draw.
pub fn biome_bias(fraction: f64) -> f64 {
    if fraction < 0.30 {
        0.55
    } else if fraction < 0.35 {
        0.45
    } else if fraction <= 0.40 {
        0.30
    } else {
        0.20
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileKey<'a> {
    pub seed: &'a str,
    pub move_id: u64,
    pub reroll_nonce: u32,
    pub coord: Hex,
}

impl TileKey<'_> {
    pub fn stream(&self) -> RandomStream {
        key_rng::stream_for(
            self.seed,
            self.move_id,
            self.reroll_nonce,
            self.coord.q,
            self.coord.r,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRule {
    /// Lac or Mer d'ombre with five or more identical neighbours.
    InlandSeaCap,
    /// Cité Fantôme with three or more identical neighbours.
    GhostCityCap,
    /// Same-category neighbours already at the profile's blob limit.
    BlobCap,
    /// Oasis touching a Biome, or a Biome touching an Oasis.
    OasisIsolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub terrain: TerrainType,
    /// The desert-gap override replaced a Desert draw.
    pub forced_biome: bool,
    /// Every candidate broke a rule and the first one was taken anyway.
    pub relaxed: bool,
}

pub fn generate(
    key: TileKey<'_>,
    view: &impl TileLookup,
    counters: &RatioCounters,
    profile: &DifficultyProfile,
) -> TerrainType {
    place(key, view, counters, profile).terrain
}

pub fn place(
    key: TileKey<'_>,
    view: &impl TileLookup,
    counters: &RatioCounters,
    profile: &DifficultyProfile,
) -> Placement {
    let mut stream = key.stream();

    let p_biome = biome_bias(counters.biome_fraction());
    let mut category = if stream.next_unit() < p_biome {
        Category::Biome
    } else {
        Category::Desert
    };

    let mut forced_biome = false;
    if category == Category::Desert {
        if let Some(max_gap) = profile.max_desert_gap {
            let gap_exceeded = match nearest_biome_distance(view, key.coord) {
                Some(distance) => distance > max_gap,
                None => true,
            };
            if gap_exceeded {
                category = Category::Biome;
                forced_biome = true;
            }
        }
    }

    let mut candidates = *category.types();
    stream.shuffle(&mut candidates);

    let fitting = candidates
        .iter()
        .copied()
        .find(|candidate| broken_rule(*candidate, key.coord, view, profile).is_none());
    let placement = Placement {
        terrain: fitting.unwrap_or(candidates[0]),
        forced_biome,
        relaxed: fitting.is_none(),
    };

    tracing::trace!(
        target: "hexmapper::generation",
        q = key.coord.q,
        r = key.coord.r,
        move_id = key.move_id,
        reroll_nonce = key.reroll_nonce,
        p_biome,
        terrain = placement.terrain.key(),
        forced_biome,
        relaxed = placement.relaxed,
        "generation.tile"
    );
    placement
}

/// Hex distance to the closest Biome tile, `None` if there is none within
/// [`NEAREST_BIOME_SCAN_RADIUS`].
///
/// The scan starts at ring 1: the target's own entry (present during a reroll)
/// must not count as its own neighbour.
pub fn nearest_biome_distance(view: &impl TileLookup, hex: Hex) -> Option<u32> {
    (1..=NEAREST_BIOME_SCAN_RADIUS).find(|radius| {
        hex.ring(*radius).any(|cell| {
            view.terrain_at(cell)
                .is_some_and(|t| t.category() == Category::Biome)
        })
    })
}

/// First local rule `candidate` would break at `hex`, if any.
pub fn broken_rule(
    candidate: TerrainType,
    hex: Hex,
    view: &impl TileLookup,
    profile: &DifficultyProfile,
) -> Option<LocalRule> {
    let around: Vec<TerrainType> = hex
        .neighbors()
        .into_iter()
        .filter_map(|n| view.terrain_at(n))
        .collect();
    let identical = around.iter().filter(|t| **t == candidate).count();

    if candidate.is_inland_sea() && identical >= 5 {
        return Some(LocalRule::InlandSeaCap);
    }
    if candidate == TerrainType::CiteFantome && identical >= 3 {
        return Some(LocalRule::GhostCityCap);
    }

    let category = candidate.category();
    if let Some(max_blob) = profile.max_blob(category) {
        let same_category = around.iter().filter(|t| t.category() == category).count();
        if same_category as u64 >= max_blob as u64 {
            return Some(LocalRule::BlobCap);
        }
    }

    if profile.isolate_oasis && category == Category::Biome {
        let touches_biome = around.iter().any(|t| t.category() == Category::Biome);
        let touches_oasis = around.contains(&TerrainType::Oasis);
        if (candidate == TerrainType::Oasis && touches_biome) || touches_oasis {
            return Some(LocalRule::OasisIsolation);
        }
    }

    None
}
