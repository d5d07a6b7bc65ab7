//! Explorer state and the session that owns the generated world.
//!
//! [`ExplorerSession`] is the engine's boundary: moves, rerolls and
//! configuration go in, tiles, rivers and the trail come out. Every operation
//! runs to completion on `&mut self`; there is no background work.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Difficulty, DifficultyProfile, EngineConfig, VisionRadius};
use crate::hex::{Direction, Hex};
use crate::key_rng;
use crate::river::{RiverEvent, RiverNetwork};
use crate::terrain::{Category, TerrainType};
use crate::visibility::FogOfWar;
use crate::world::{Tile, WorldMap};

/// Radius materialized around the explorer after each move.
pub const MOVE_REVEAL_RADIUS: u32 = 2;
/// Previously occupied cells kept for display.
pub const TRAIL_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerState {
    pub position: Hex,
    pub move_id: u64,
    pub reroll_nonce: u32,
    trail: VecDeque<Hex>,
}

impl ExplorerState {
    pub fn new(position: Hex) -> Self {
        ExplorerState {
            position,
            move_id: 0,
            reroll_nonce: 0,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Moves one cell, stamps a new move id and remembers where we were.
    pub fn step(&mut self, direction: Direction) -> Hex {
        let previous = self.position;
        self.position = previous.neighbor(direction);
        self.move_id += 1;
        self.reroll_nonce = 0;
        if self.trail.len() == TRAIL_LENGTH {
            self.trail.pop_front();
        }
        self.trail.push_back(previous);
        previous
    }

    /// Oldest first.
    pub fn trail(&self) -> &VecDeque<Hex> {
        &self.trail
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub move_id: u64,
    pub position: Hex,
    pub tiles_added: usize,
    pub river: RiverEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub seed: String,
    pub difficulty: Difficulty,
    pub position: Hex,
    pub move_id: u64,
    pub reroll_nonce: u32,
    pub tiles: usize,
    pub biome_tiles: u64,
    pub desert_tiles: u64,
    pub biome_fraction: f64,
    pub rivers: usize,
    pub finished_rivers: usize,
    pub discovered_biomes: usize,
    pub discovered_deserts: usize,
}

#[derive(Debug, Clone)]
pub struct ExplorerSession {
    seed: String,
    profile: DifficultyProfile,
    fog: FogOfWar,
    origin_terrain: TerrainType,
    explorer: ExplorerState,
    world: WorldMap,
    rivers: RiverNetwork,
    /// Rivers as they stood before the current move's growth step.
    rivers_before_move: RiverNetwork,
}

impl ExplorerSession {
    /// Starts at the origin with a single seeded tile.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let position = Hex::ORIGIN;
        let session = ExplorerSession {
            world: WorldMap::with_origin(position, config.origin_terrain),
            seed: config.seed,
            profile: config.difficulty.profile(),
            fog: FogOfWar {
                enabled: config.fog_enabled,
                vision_radius: config.vision_radius,
            },
            origin_terrain: config.origin_terrain,
            explorer: ExplorerState::new(position),
            rivers: RiverNetwork::new(),
            rivers_before_move: RiverNetwork::new(),
        };
        tracing::info!(
            target: "hexmapper::explorer",
            seed = %session.seed,
            difficulty = %session.profile.difficulty,
            origin = session.origin_terrain.key(),
            "explorer.session_started"
        );
        Ok(session)
    }

    pub fn move_explorer(&mut self, direction: Direction) -> MoveReport {
        self.explorer.step(direction);
        let position = self.explorer.position;
        let move_id = self.explorer.move_id;

        let tiles_added = self.world.ensure_generated(
            position,
            MOVE_REVEAL_RADIUS,
            &self.seed,
            move_id,
            self.explorer.reroll_nonce,
            &self.profile,
        );

        self.rivers_before_move = self.rivers.clone();
        let river = self.grow_rivers();

        tracing::info!(
            target: "hexmapper::explorer",
            move_id,
            direction = direction.short_name(),
            q = position.q,
            r = position.r,
            tiles_added,
            river = ?river,
            "explorer.moved"
        );
        MoveReport {
            move_id,
            position,
            tiles_added,
            river,
        }
    }

    fn grow_rivers(&mut self) -> RiverEvent {
        let position = self.explorer.position;
        let mut stream = key_rng::river_stream(&self.seed, self.explorer.move_id, position);
        self.rivers.grow(&self.world, position, &mut stream)
    }

    /// Regenerates the tiles created by the current move with a fresh nonce,
    /// then replays the move's river step over the new terrain.
    ///
    /// Before the first move there is nothing to reroll: the origin tile is
    /// configured, not generated. Returns the number of tiles regenerated.
    pub fn reroll_last_move(&mut self) -> usize {
        let move_id = self.explorer.move_id;
        if move_id == 0 {
            tracing::debug!(target: "hexmapper::explorer", "explorer.reroll_skipped_origin");
            return 0;
        }
        let nonce = self.explorer.reroll_nonce + 1;
        let rerolled = self.world.reroll_move(&self.seed, move_id, nonce, &self.profile);
        self.explorer.reroll_nonce = nonce;

        self.rivers = self.rivers_before_move.clone();
        let river = self.grow_rivers();

        tracing::info!(
            target: "hexmapper::explorer",
            move_id,
            reroll_nonce = nonce,
            rerolled,
            river = ?river,
            "explorer.rerolled_move"
        );
        rerolled
    }

    /// Discards the whole world and restarts from a single origin tile under
    /// `new_seed`, keeping the explorer where it stands.
    pub fn reroll_global(&mut self, new_seed: impl Into<String>) {
        let position = self.explorer.position;
        let world = WorldMap::with_origin(position, self.origin_terrain);
        let explorer = ExplorerState::new(position);

        self.seed = new_seed.into();
        self.world = world;
        self.explorer = explorer;
        self.rivers.clear();
        self.rivers_before_move.clear();

        tracing::info!(
            target: "hexmapper::explorer",
            seed = %self.seed,
            q = position.q,
            r = position.r,
            "explorer.rerolled_world"
        );
    }

    pub fn set_difficulty(&mut self, id: &str) -> Result<(), ConfigError> {
        let difficulty: Difficulty = id.parse()?;
        self.set_difficulty_level(difficulty);
        Ok(())
    }

    pub fn set_difficulty_level(&mut self, difficulty: Difficulty) {
        self.profile = difficulty.profile();
        tracing::debug!(target: "hexmapper::explorer", %difficulty, "explorer.difficulty_set");
    }

    pub fn set_fog(&mut self, enabled: bool) {
        self.fog.enabled = enabled;
    }

    pub fn set_vision_radius(&mut self, radius: u8) -> Result<(), ConfigError> {
        self.fog.vision_radius = VisionRadius::new(radius)?;
        Ok(())
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn fog(&self) -> FogOfWar {
        self.fog
    }

    pub fn explorer(&self) -> &ExplorerState {
        &self.explorer
    }

    pub fn position(&self) -> Hex {
        self.explorer.position
    }

    pub fn trail(&self) -> &VecDeque<Hex> {
        self.explorer.trail()
    }

    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    pub fn rivers(&self) -> &RiverNetwork {
        &self.rivers
    }

    pub fn is_visible(&self, tile: &Tile) -> bool {
        self.fog.is_visible(tile, self.explorer.position)
    }

    /// Every generated tile with its current visibility, in creation order.
    pub fn tiles_with_visibility(&self) -> impl Iterator<Item = (&Tile, bool)> + '_ {
        self.world.tiles().map(move |tile| (tile, self.is_visible(tile)))
    }

    pub fn discovered(&self, category: Category) -> Vec<TerrainType> {
        self.world.discovered(category)
    }

    pub fn summary(&self) -> SessionSummary {
        let counts = self.world.category_counts();
        SessionSummary {
            seed: self.seed.clone(),
            difficulty: self.profile.difficulty,
            position: self.explorer.position,
            move_id: self.explorer.move_id,
            reroll_nonce: self.explorer.reroll_nonce,
            tiles: self.world.len(),
            biome_tiles: counts.biome,
            desert_tiles: counts.desert,
            biome_fraction: counts.biome_fraction(),
            rivers: self.rivers.len(),
            finished_rivers: self.rivers.finished_count(),
            discovered_biomes: self.discovered(Category::Biome).len(),
            discovered_deserts: self.discovered(Category::Desert).len(),
        }
    }
}
