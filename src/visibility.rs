//! Fog of war.

use serde::{Deserialize, Serialize};

use crate::config::VisionRadius;
use crate::hex::Hex;
use crate::terrain::TerrainType;
use crate::world::Tile;

/// Extra range at which mountains stay in sight.
pub const MOUNTAIN_SIGHT_BONUS: u32 = 2;

/// Range at which a tile of `terrain` can be seen.
pub fn sight_range(terrain: TerrainType, vision_radius: u32) -> u32 {
    if terrain.is_mountain() {
        vision_radius.saturating_add(MOUNTAIN_SIGHT_BONUS)
    } else {
        vision_radius
    }
}

pub fn is_visible(tile: &Tile, explorer: Hex, vision_radius: u32, fog_enabled: bool) -> bool {
    if !fog_enabled {
        return true;
    }
    tile.coord.distance(&explorer) <= sight_range(tile.terrain, vision_radius)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FogOfWar {
    pub enabled: bool,
    pub vision_radius: VisionRadius,
}

impl Default for FogOfWar {
    fn default() -> Self {
        FogOfWar {
            enabled: true,
            vision_radius: VisionRadius::default(),
        }
    }
}

impl FogOfWar {
    pub fn is_visible(&self, tile: &Tile, explorer: Hex) -> bool {
        is_visible(tile, explorer, self.vision_radius.get(), self.enabled)
    }
}
