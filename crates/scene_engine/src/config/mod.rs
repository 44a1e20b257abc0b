//! Configuration system
//!
//! Engine settings can be loaded from TOML or RON files; every field has a
//! default so partial files are accepted.

use std::path::Path;

pub use serde::{Serialize, Deserialize};

use crate::foundation::math::{Vec3, Vec4};
use crate::render::LightingParams;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Viewport dimensions, used for the projection aspect ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

impl ViewportConfig {
    /// Width over height
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Camera placement and lens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position
    pub eye: Vec3,
    /// Point the camera looks at
    pub focal_point: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 20.0, -90.0),
            focal_point: Vec3::zeros(),
            up: Vec3::y(),
            fov_degrees: 45.0,
            near: 1.0,
            far: 10000.0,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Viewport settings
    pub viewport: ViewportConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Clear colour (RGBA)
    pub background_colour: Vec4,
    /// Fixed lighting applied by every shape node
    pub lighting: LightingParams,
    /// Frames to run before stopping; 0 runs until the application stops
    pub frame_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            camera: CameraConfig::default(),
            background_colour: Vec4::new(0.154_215_69, 0.124_313_75, 0.131_941_18, 1.0),
            lighting: LightingParams::default(),
            frame_limit: 0,
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("scene_engine_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "frame_limit = 12\n\n[viewport]\nwidth = 1024\n").unwrap();

        let config = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.frame_limit, 12);
        assert_eq!(config.viewport.width, 1024);
        assert_eq!(config.viewport.height, 600);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_ron_save_and_load() {
        let path = temp_path("engine.ron");
        let mut config = EngineConfig::default();
        config.frame_limit = 3;
        config.camera.fov_degrees = 60.0;

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::default().save_to_file(temp_path("engine.json"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = EngineConfig::load_from_file(temp_path("does_not_exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_aspect_ratio() {
        let viewport = ViewportConfig { width: 800, height: 600 };
        assert!((viewport.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }
}
