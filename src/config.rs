//! # Configuration
//!
//! Tunable constants for terrain generation, chunk streaming, the movement integrator and
//! block interaction. Every struct carries its standard values through `Default`, and
//! every field is `#[serde(default)]` so a JSON file only needs to name what it overrides.
//!
//! ```json
//! { "world": { "streaming": { "render_distance": 6 } }, "physics": { "gravity": 25.0 } }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::voxels::block::block_type::BlockType;

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration text is not valid JSON for [`EngineConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value parsed correctly but is outside its allowed range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: &'static str,
    },
}

/// Top-level configuration for a [`Simulation`](crate::engine_state::Simulation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World layout, terrain and streaming.
    pub world: WorldConfig,
    /// Movement integrator constants.
    pub physics: PhysicsConfig,
    /// Block picking and placement.
    pub interaction: InteractionConfig,
}

/// Chunk layout and the settings of everything that fills and streams chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal extent of a chunk in voxels.
    pub chunk_size: i32,
    /// Terrain generator settings.
    pub terrain: TerrainConfig,
    /// Chunk streaming settings.
    pub streaming: StreamingConfig,
}

impl WorldConfig {
    /// Checks the chunk layout, terrain and streaming ranges a world relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let terrain = &self.terrain;

        if self.chunk_size <= 0 || self.chunk_size > i32::from(u8::MAX) {
            return Err(invalid("world.chunk_size", "must be within 1..=255"));
        }
        if self.streaming.render_distance < 0 {
            return Err(invalid("world.streaming.render_distance", "must not be negative"));
        }
        if self.streaming.unload_margin < 0 {
            return Err(invalid("world.streaming.unload_margin", "must not be negative"));
        }
        if terrain.min_height > terrain.max_height {
            return Err(invalid("world.terrain.min_height", "must not exceed max_height"));
        }
        if terrain.bedrock_depth >= terrain.min_height {
            return Err(invalid("world.terrain.bedrock_depth", "must lie below min_height"));
        }
        if !(0.0..=1.0).contains(&terrain.tree_chance) {
            return Err(invalid("world.terrain.tree_chance", "must be within 0..=1"));
        }
        if terrain.min_trunk < 1 || terrain.min_trunk > terrain.max_trunk {
            return Err(invalid("world.terrain.min_trunk", "must be within 1..=max_trunk"));
        }
        if !terrain.noise_scale.is_finite() || terrain.noise_scale <= 0.0 {
            return Err(invalid("world.terrain.noise_scale", "must be positive"));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            terrain: TerrainConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

/// Which generator fills a freshly created chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainMode {
    /// Noise heightfield with the full column rule table and trees.
    Noise,
    /// A single flat layer of `block` at `height`.
    Flat {
        /// Y coordinate of the layer.
        height: i32,
        /// Block the layer is made of.
        block: BlockType,
    },
    /// No voxels at all.
    Empty,
}

/// Terrain generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Generator used for new chunks.
    pub mode: TerrainMode,
    /// Seed of the noise permutation table.
    pub seed: u32,
    /// Multiplier applied to world coordinates before sampling noise.
    pub noise_scale: f64,
    /// Lowest surface height.
    pub min_height: i32,
    /// Highest surface height.
    pub max_height: i32,
    /// Columns whose surface is below this level are flooded with water.
    pub sea_level: i32,
    /// Surfaces strictly above this height are covered in snow.
    pub snow_height: i32,
    /// Y coordinate of the bedrock layer.
    pub bedrock_depth: i32,
    /// Probability that a grass column grows a tree.
    pub tree_chance: f64,
    /// Shortest tree trunk.
    pub min_trunk: i32,
    /// Tallest tree trunk.
    pub max_trunk: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mode: TerrainMode::Noise,
            seed: 0,
            noise_scale: 0.03,
            min_height: 0,
            max_height: 20,
            sea_level: 6,
            snow_height: 15,
            bedrock_depth: -5,
            tree_chance: 0.02,
            min_trunk: 3,
            max_trunk: 4,
        }
    }
}

/// Chunk streaming settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Radius, in chunks, of the square kept loaded around the viewer.
    pub render_distance: i32,
    /// Extra chunks a loaded chunk may drift beyond `render_distance` before it unloads.
    /// Zero unloads a chunk as soon as it leaves render distance.
    pub unload_margin: i32,
    /// Minimum wall-clock time between two streaming passes.
    pub update_interval_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 4,
            unload_margin: 0,
            update_interval_ms: 200,
        }
    }
}

/// Movement integrator constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Horizontal half-extent of the viewer's bounding box.
    pub player_radius: f32,
    /// Distance from the eye down to the feet.
    pub player_height: f32,
    /// Lower slice of the box ignored by horizontal collision checks.
    pub step_height: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Vertical velocity set by a jump.
    pub jump_speed: f32,
    /// Horizontal acceleration applied while a movement key is held.
    pub move_acceleration: f32,
    /// Exponential horizontal damping rate.
    pub friction: f32,
    /// Upper bound on a tick's delta time, in seconds.
    pub max_dt: f32,
    /// Number of equal slices each tick is integrated in.
    pub sub_steps: u32,
    /// Falling below this height respawns the viewer.
    pub fall_floor: f32,
    /// Respawn position.
    pub spawn: [f32; 3],
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            player_radius: 0.45,
            player_height: 1.6,
            step_height: 0.5,
            gravity: 30.0,
            jump_speed: 12.0,
            move_acceleration: 100.0,
            friction: 10.0,
            max_dt: 0.1,
            sub_steps: 5,
            fall_floor: -30.0,
            spawn: [0.0, 30.0, 0.0],
        }
    }
}

/// Block picking and placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Maximum distance of the view-centre ray.
    pub reach: f32,
    /// Radians of rotation per unit of mouse delta.
    pub mouse_sensitivity: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reach: 6.0,
            mouse_sensitivity: 0.002,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every range constraint the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        let physics = &self.physics;

        if physics.sub_steps == 0 {
            return Err(invalid("physics.sub_steps", "must be at least 1"));
        }
        let non_negative = [
            ("physics.player_radius", physics.player_radius),
            ("physics.player_height", physics.player_height),
            ("physics.step_height", physics.step_height),
            ("physics.gravity", physics.gravity),
            ("physics.jump_speed", physics.jump_speed),
            ("physics.move_acceleration", physics.move_acceleration),
            ("physics.friction", physics.friction),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be finite and not negative"));
            }
        }
        if !physics.max_dt.is_finite() || physics.max_dt <= 0.0 {
            return Err(invalid("physics.max_dt", "must be positive"));
        }
        if physics.step_height > physics.player_height {
            return Err(invalid("physics.step_height", "must not exceed player_height"));
        }
        if !physics.fall_floor.is_finite() || physics.spawn.iter().any(|v| !v.is_finite()) {
            return Err(invalid("physics.spawn", "must be finite"));
        }
        if physics.spawn[1] <= physics.fall_floor {
            return Err(invalid("physics.spawn", "must lie above fall_floor"));
        }

        if !self.interaction.reach.is_finite() || self.interaction.reach <= 0.0 {
            return Err(invalid("interaction.reach", "must be positive"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
