use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Color4, DrawingMode};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "paint-surface.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub mode: DrawingMode,
    pub color: Color4,
    pub thickness: u32,
    pub zoom: f32,
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
    pub debug_logging: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            mode: DrawingMode::Freehand,
            color: Color4::BLACK,
            thickness: 3,
            zoom: 1.0,
            width: 800,
            height: 600,
            jpeg_quality: 75,
            debug_logging: false,
        }
    }
}

impl SurfaceConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thickness == 0 {
            return Err(ConfigError::Invalid("thickness must be positive".into()));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom must be positive, got {}",
                self.zoom
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Resolve the configuration for this run: the explicit path if given,
/// otherwise [`DEFAULT_CONFIG_FILE`] when it exists, otherwise defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<SurfaceConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !path.exists() {
                return Ok(SurfaceConfig::default());
            }
            path
        }
    };
    SurfaceConfig::load(&path)
}
