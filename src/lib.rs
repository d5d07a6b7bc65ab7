//! Procedural hex map that grows around a moving explorer.
//!
//! ```
//! use hexmapper::{Direction, EngineConfig, ExplorerSession};
//!
//! let mut session = ExplorerSession::new(EngineConfig::with_seed("caerwynn-001")).unwrap();
//! session.move_explorer(Direction::East);
//! assert_eq!(session.world().len(), 19);
//! ```
//!
//! Rendering, legends and export live outside this crate; they read tiles,
//! rivers and the trail from [`ExplorerSession`].

pub mod config;
pub mod explorer;
pub mod generation;
pub mod hex;
pub mod key_rng;
pub mod river;
pub mod terrain;
pub mod visibility;
pub mod world;

pub use config::{ConfigError, Difficulty, DifficultyProfile, EngineConfig, VisionRadius};
pub use explorer::{ExplorerSession, ExplorerState, MoveReport, SessionSummary};
pub use generation::{generate, RatioCounters, TileKey, TileLookup};
pub use hex::{Direction, Hex};
pub use river::{River, RiverEvent, RiverNetwork};
pub use terrain::{Category, PaletteGroup, TerrainType};
pub use visibility::{is_visible, FogOfWar};
pub use world::{Tile, WorldMap};
