//! Scene configuration.
//!
//! A scene is described by a small JSON file; every field is optional and
//! falls back to the values the demos ship with.
//!
//! ```json
//! {
//!   "scene": "runes",
//!   "rotation": ["pentagram", "hexagram", "runic"],
//!   "gesture": { "cooldown_ms": 2000 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ambient::FIELD_COUNT;
use crate::error::ConfigError;
use crate::gesture::GestureConfig;
use crate::raster::RASTER_SIZE;
use crate::shapes::ShapeFamily;

/// Largest particle buffer a config may ask for.
pub const MAX_CAPACITY: usize = 2_000_000;

/// Which demo the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Shapes and images morph in the main particle buffer.
    #[default]
    Morph,
    /// Circles summon transient rune sigils over a starry sky.
    Runes,
}

impl SceneKind {
    /// Rotation used when the config does not list one.
    pub fn default_rotation(&self) -> Vec<ShapeFamily> {
        match self {
            SceneKind::Morph => ShapeFamily::GEOMETRIC.to_vec(),
            SceneKind::Runes => ShapeFamily::SIGILS.to_vec(),
        }
    }
}

/// Look of the morph particles.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualConfig {
    /// Base particle colour, linear RGB.
    pub color: [f32; 3],
    pub point_size: f32,
    /// How far individual particles drift from the base colour.
    pub color_variation: f32,
    pub background: [f32; 3],
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            color: [0.0, 1.0, 1.0],
            point_size: 2.5,
            color_variation: 0.3,
            background: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "glyphmorph".into(),
            width: 1280,
            height: 720,
        }
    }
}

fn default_capacity() -> usize {
    100_000
}

fn default_raster_size() -> u32 {
    RASTER_SIZE
}

fn default_star_count() -> usize {
    15_000
}

fn default_field_count() -> usize {
    FIELD_COUNT
}

/// Complete scene configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SceneConfig {
    #[serde(default)]
    pub scene: SceneKind,
    /// Particle buffer capacity, fixed for the lifetime of the engine.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Shapes that gestures cycle through. Empty means the scene's default.
    #[serde(default)]
    pub rotation: Vec<ShapeFamily>,
    /// Images the `I` key cycles through.
    #[serde(default)]
    pub images: Vec<PathBuf>,
    /// Edge of the square raster images are sampled on.
    #[serde(default = "default_raster_size")]
    pub raster_size: u32,
    #[serde(default = "default_star_count")]
    pub star_count: usize,
    /// Ambient field particles of the rune scene.
    #[serde(default = "default_field_count")]
    pub field_count: usize,
    /// Fixed RNG seed; the clock is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub visuals: VisualConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene: SceneKind::default(),
            capacity: default_capacity(),
            rotation: Vec::new(),
            images: Vec::new(),
            raster_size: default_raster_size(),
            star_count: default_star_count(),
            field_count: default_field_count(),
            seed: None,
            visuals: VisualConfig::default(),
            gesture: GestureConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The rotation actually used.
    pub fn effective_rotation(&self) -> Vec<ShapeFamily> {
        if self.rotation.is_empty() {
            self.scene.default_rotation()
        } else {
            self.rotation.clone()
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return invalid(format!("capacity must be in 1..={}, got {}", MAX_CAPACITY, self.capacity));
        }
        if self.field_count > MAX_CAPACITY {
            return invalid(format!("field_count must be at most {}, got {}", MAX_CAPACITY, self.field_count));
        }
        if self.raster_size == 0 {
            return invalid("raster_size must be positive".into());
        }
        if !(self.visuals.point_size > 0.0) {
            return invalid(format!("point_size must be positive, got {}", self.visuals.point_size));
        }
        let g = &self.gesture;
        if g.min_samples < 3 {
            return invalid(format!("gesture.min_samples must be at least 3, got {}", g.min_samples));
        }
        if !(g.window_ms > 0.0) || !(g.progress_span > 0.0) {
            return invalid("gesture.window_ms and gesture.progress_span must be positive".into());
        }
        if g.cooldown_ms < 0.0 || g.min_radius < 0.0 {
            return invalid("gesture thresholds must not be negative".into());
        }
        Ok(())
    }
}
