//! Engine configuration: difficulty profiles, vision radius and session setup.
//!
//! Difficulty profiles ship as a builtin JSON table. An [`EngineConfig`] can
//! be loaded from a JSON file; anything outside the enumerated values is
//! rejected here, before it reaches the engine.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::{Category, TerrainType, UnknownTerrainKey};

pub const BUILTIN_DIFFICULTY_PROFILES: &str = include_str!("data/difficulty_profiles.json");

pub const DEFAULT_SEED: &str = "caerwynn-001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown difficulty profile '{0}' (expected one of easy, normal, hard, sandbox)")]
    UnknownDifficulty(String),
    #[error("vision radius {0} is out of range (expected 1, 2 or 3)")]
    VisionRadius(u8),
    #[error("origin terrain '{}' is not a Biome type", .0.key())]
    OriginNotBiome(TerrainType),
    #[error(transparent)]
    UnknownTerrain(#[from] UnknownTerrainKey),
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read engine config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Sandbox,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Sandbox,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Sandbox => "sandbox",
        }
    }

    pub fn profile(&self) -> DifficultyProfile {
        builtin_profiles()
            .get(self)
            .copied()
            .unwrap_or_else(|| DifficultyProfile::unconstrained(*self))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.id() == wanted)
            .ok_or_else(|| ConfigError::UnknownDifficulty(s.to_string()))
    }
}

impl TryFrom<String> for Difficulty {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Constraint parameters handed to the generator. `None` means "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    #[serde(skip)]
    pub difficulty: Difficulty,
    /// Hex distance to the nearest Biome tile beyond which a Biome is forced.
    pub max_desert_gap: Option<u32>,
    /// Biome neighbours at which a new Biome candidate is refused.
    pub max_biome_blob: Option<u32>,
    pub max_desert_blob: Option<u32>,
    pub isolate_oasis: bool,
}

impl DifficultyProfile {
    pub fn unconstrained(difficulty: Difficulty) -> Self {
        DifficultyProfile {
            difficulty,
            max_desert_gap: None,
            max_biome_blob: None,
            max_desert_blob: None,
            isolate_oasis: false,
        }
    }

    pub fn max_blob(&self, category: Category) -> Option<u32> {
        match category {
            Category::Biome => self.max_biome_blob,
            Category::Desert => self.max_desert_blob,
        }
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Difficulty::default().profile()
    }
}

fn builtin_profiles() -> &'static HashMap<Difficulty, DifficultyProfile> {
    static PROFILES: OnceLock<HashMap<Difficulty, DifficultyProfile>> = OnceLock::new();
    PROFILES.get_or_init(|| {
        parse_profiles(BUILTIN_DIFFICULTY_PROFILES)
            .expect("builtin difficulty profiles should parse")
    })
}

pub fn parse_profiles(json: &str) -> Result<HashMap<Difficulty, DifficultyProfile>, ConfigError> {
    let mut table: HashMap<Difficulty, DifficultyProfile> = serde_json::from_str(json)?;
    for (difficulty, profile) in table.iter_mut() {
        profile.difficulty = *difficulty;
    }
    Ok(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct VisionRadius(u8);

impl VisionRadius {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(radius: u8) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&radius) {
            Ok(VisionRadius(radius))
        } else {
            Err(ConfigError::VisionRadius(radius))
        }
    }

    pub fn get(&self) -> u32 {
        self.0 as u32
    }
}

impl Default for VisionRadius {
    fn default() -> Self {
        VisionRadius(2)
    }
}

impl TryFrom<u8> for VisionRadius {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        VisionRadius::new(value)
    }
}

impl From<VisionRadius> for u8 {
    fn from(value: VisionRadius) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: String,
    pub difficulty: Difficulty,
    pub fog_enabled: bool,
    pub vision_radius: VisionRadius,
    /// Terrain placed on the origin tile at session start and on global reroll.
    pub origin_terrain: TerrainType,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: DEFAULT_SEED.to_string(),
            difficulty: Difficulty::default(),
            fog_enabled: true,
            vision_radius: VisionRadius::default(),
            origin_terrain: TerrainType::Foret,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(seed: impl Into<String>) -> Self {
        EngineConfig {
            seed: seed.into(),
            ..EngineConfig::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        EngineConfig::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.origin_terrain.category() != Category::Biome {
            return Err(ConfigError::OriginNotBiome(self.origin_terrain));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_cover_every_difficulty() {
        for difficulty in Difficulty::ALL {
            assert!(builtin_profiles().contains_key(&difficulty), "{}", difficulty);
            assert_eq!(difficulty.profile().difficulty, difficulty);
        }
        let normal = Difficulty::Normal.profile();
        assert_eq!(normal.max_desert_gap, Some(3));
        assert_eq!(normal.max_blob(Category::Biome), Some(4));
        assert_eq!(normal.max_blob(Category::Desert), Some(5));
        assert!(normal.isolate_oasis);
        assert_eq!(
            Difficulty::Sandbox.profile(),
            DifficultyProfile::unconstrained(Difficulty::Sandbox)
        );
    }

    #[test]
    fn test_unknown_difficulty_is_rejected() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        let err = "nightmare".parse::<Difficulty>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDifficulty(ref id) if id == "nightmare"));
    }

    #[test]
    fn test_vision_radius_bounds() {
        assert!(VisionRadius::new(0).is_err());
        assert_eq!(VisionRadius::new(1).unwrap().get(), 1);
        assert_eq!(VisionRadius::new(3).unwrap().get(), 3);
        assert!(matches!(VisionRadius::new(4), Err(ConfigError::VisionRadius(4))));
    }

    #[test]
    fn test_engine_config_from_json() {
        let config = EngineConfig::from_json_str(
            r#"{ "seed": "test-1", "difficulty": "hard", "vision_radius": 3, "origin_terrain": "plaine" }"#,
        )
        .unwrap();
        assert_eq!(config.seed, "test-1");
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.vision_radius.get(), 3);
        assert!(config.fog_enabled);
        assert_eq!(config.origin_terrain, TerrainType::Plaine);
    }

    #[test]
    fn test_engine_config_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "difficulty": "nightmare" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "vision_radius": 7 }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "origin_terrain": "mont_noir" }"#),
            Err(ConfigError::OriginNotBiome(TerrainType::MontNoir))
        ));
    }

    #[test]
    fn test_missing_config_file_reports_path() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/hexmapper.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("hexmapper.json"));
    }
}
