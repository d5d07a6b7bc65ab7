use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::DifficultyProfile;
use crate::generation::{self, RatioCounters, TileKey, TileLookup};
use crate::hex::Hex;
use crate::terrain::{Category, TerrainType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Hex,
    pub terrain: TerrainType,
    /// Move during which the tile was first generated.
    pub move_id: u64,
}

/// Grow-only map of generated tiles.
///
/// Keys are only ever added; a reroll rewrites terrain in place. Tiles are
/// enumerated in insertion order so every walk over the map is reproducible.
#[derive(Debug, Clone, Default)]
pub struct WorldMap {
    tiles: HashMap<Hex, Tile>,
    order: Vec<Hex>,
    counters: RatioCounters,
}

impl TileLookup for WorldMap {
    fn terrain_at(&self, hex: Hex) -> Option<TerrainType> {
        self.tiles.get(&hex).map(|tile| tile.terrain)
    }
}

impl WorldMap {
    pub fn new() -> Self {
        WorldMap::default()
    }

    /// A map holding a single tile, stamped with move 0.
    pub fn with_origin(coord: Hex, terrain: TerrainType) -> Self {
        let mut map = WorldMap::new();
        map.insert(Tile {
            coord,
            terrain,
            move_id: 0,
        });
        map
    }

    fn insert(&mut self, tile: Tile) {
        self.counters.record(tile.terrain.category());
        self.order.push(tile.coord);
        self.tiles.insert(tile.coord, tile);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.tiles.contains_key(&hex)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.order.iter().filter_map(|hex| self.tiles.get(hex))
    }

    /// Running totals fed to the generator. Rerolls leave them alone, so they
    /// can differ from [`WorldMap::category_counts`].
    pub fn counters(&self) -> RatioCounters {
        self.counters
    }

    /// Tiles per category as the map stands now.
    pub fn category_counts(&self) -> RatioCounters {
        let mut counts = RatioCounters::default();
        for tile in self.tiles() {
            counts.record(tile.terrain.category());
        }
        counts
    }

    /// Generates every missing coordinate within `radius` of `center`.
    ///
    /// Cells are filled center-out; each one sees the tiles and counters left by
    /// the cells before it. Existing tiles are never touched. Returns the number
    /// of tiles added.
    pub fn ensure_generated(
        &mut self,
        center: Hex,
        radius: u32,
        seed: &str,
        move_id: u64,
        reroll_nonce: u32,
        profile: &DifficultyProfile,
    ) -> usize {
        let mut added = 0;
        for coord in center.disk(radius) {
            if self.contains(coord) {
                continue;
            }
            let key = TileKey {
                seed,
                move_id,
                reroll_nonce,
                coord,
            };
            let terrain = generation::generate(key, &*self, &self.counters, profile);
            self.insert(Tile {
                coord,
                terrain,
                move_id,
            });
            added += 1;
        }

        tracing::debug!(
            target: "hexmapper::world",
            q = center.q,
            r = center.r,
            radius,
            move_id,
            added,
            total = self.len(),
            "world.ensure_generated"
        );
        added
    }

    /// Regenerates, in creation order, every tile stamped with `move_id`.
    ///
    /// Tiles from other moves are left as they are. Counters are not adjusted.
    /// Returns the number of tiles rewritten; zero means nothing matched.
    pub fn reroll_move(
        &mut self,
        seed: &str,
        move_id: u64,
        reroll_nonce: u32,
        profile: &DifficultyProfile,
    ) -> usize {
        let targets: Vec<Hex> = self
            .tiles()
            .filter(|tile| tile.move_id == move_id)
            .map(|tile| tile.coord)
            .collect();

        let mut changed = 0;
        for coord in &targets {
            let key = TileKey {
                seed,
                move_id,
                reroll_nonce,
                coord: *coord,
            };
            let terrain = generation::generate(key, &*self, &self.counters, profile);
            if let Some(tile) = self.tiles.get_mut(coord) {
                if tile.terrain != terrain {
                    changed += 1;
                }
                tile.terrain = terrain;
            }
        }

        tracing::debug!(
            target: "hexmapper::world",
            move_id,
            reroll_nonce,
            rerolled = targets.len(),
            changed,
            "world.reroll_move"
        );
        targets.len()
    }

    /// Types of `category` present anywhere on the map, in palette-group order.
    pub fn discovered(&self, category: Category) -> Vec<TerrainType> {
        let found: BTreeSet<_> = self
            .tiles()
            .map(|tile| tile.terrain)
            .filter(|t| t.category() == category)
            .map(|t| (t.palette_group(), t))
            .collect();
        found.into_iter().map(|(_, t)| t).collect()
    }
}
