//! TOML configuration of the system: which models to load, how bodies move,
//! and how the cameras and timers behave.
//!
//! Every field has a default, so an empty file (or no file) describes the
//! Ruber system itself.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::{CameraFrame, ViewPreset};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "cannot read config {}: {source}", path.display()),
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory of the model files, relative to the config file.
    pub model_dir: PathBuf,
    pub timing: TimingConfig,
    pub camera: CameraConfig,
    pub ship: ShipConfig,
    pub logging: LoggingSection,
    pub bodies: Vec<BodyConfig>,
    pub cameras: Vec<FollowCameraConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Update period of the interval timer.
    pub interval_ms: u64,
    /// Shortest update period of the idle timer.
    pub idle_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye distance of the fixed view presets.
    pub distance: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub initial_view: ViewPreset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Distance travelled per update for each unit of thrust.
    pub speed: f32,
    /// Radians turned per update for each unit of pitch, yaw or roll.
    pub turn_radians: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `env_logger` filter, e.g. `"info"` or `"ruber_core=debug"`.
    pub filter: Option<String>,
    /// Write log records here instead of stderr.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    pub model: PathBuf,
    /// Expected vertex count of the model file, checked at load.
    #[serde(default)]
    pub vertices: Option<usize>,
    /// Radius the model is scaled to.
    pub size: f32,
    /// Start position, or the offset from the parent for bodies with one.
    #[serde(default)]
    pub translate: [f32; 3],
    /// Rotation about the Y axis per update.
    #[serde(default)]
    pub radians: f32,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub ship: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowCameraConfig {
    pub name: String,
    pub body: String,
    pub offset: [f32; 3],
    #[serde(default)]
    pub frame: CameraFrame,
    #[serde(default = "default_up")]
    pub up: [f32; 3],
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 40,
            idle_ms: 5,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 20_000.0,
            fov_degrees: 45.0,
            near: 1.0,
            far: 100_000.0,
            initial_view: ViewPreset::Overhead,
        }
    }
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            speed: 25.0,
            turn_radians: 0.02,
        }
    }
}

impl BodyConfig {
    fn orbiting(name: &str, vertices: usize, size: f32, x: f32, radians: f32) -> Self {
        Self {
            name: name.to_string(),
            model: PathBuf::from(format!("{name}.tri")),
            vertices: Some(vertices),
            size,
            translate: [x, 0.0, 0.0],
            radians,
            parent: None,
            ship: false,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        let moon = |name: &str, size: f32, x: f32, radians: f32| BodyConfig {
            parent: Some("duo".to_string()),
            ..BodyConfig::orbiting(name, 264 * 3, size, x, radians)
        };
        let warbird = BodyConfig {
            ship: true,
            ..BodyConfig::orbiting("warbird", 996 * 3, 100.0, 15_000.0, 0.0)
        };

        Self {
            model_dir: PathBuf::from("assets"),
            timing: TimingConfig::default(),
            camera: CameraConfig::default(),
            ship: ShipConfig::default(),
            logging: LoggingSection::default(),
            bodies: vec![
                BodyConfig::orbiting("ruber", 264 * 3, 2000.0, 0.0, 0.0),
                BodyConfig::orbiting("unum", 264 * 3, 200.0, 4000.0, 0.004),
                BodyConfig::orbiting("duo", 264 * 3, 400.0, 9000.0, 0.002),
                moon("primus", 100.0, 2000.0, 0.002),
                moon("secundus", 150.0, 4000.0, 0.004),
                warbird,
                BodyConfig::orbiting("missile", 252 * 3, 45.0, 14_500.0, 0.0),
            ],
            cameras: vec![
                FollowCameraConfig {
                    name: "warbird view".to_string(),
                    body: "warbird".to_string(),
                    offset: [0.0, 300.0, 1000.0],
                    frame: CameraFrame::Body,
                    up: default_up(),
                },
                FollowCameraConfig {
                    name: "unum view".to_string(),
                    body: "unum".to_string(),
                    offset: [0.0, 4000.0, 0.0],
                    frame: CameraFrame::World,
                    up: [0.0, 0.0, -1.0],
                },
                FollowCameraConfig {
                    name: "duo view".to_string(),
                    body: "duo".to_string(),
                    offset: [0.0, 4000.0, 0.0],
                    frame: CameraFrame::World,
                    up: [0.0, 0.0, -1.0],
                },
            ],
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// A scene of one spinning model, viewed from the front.
    pub fn single_model(model: impl Into<PathBuf>) -> Self {
        let model = model.into();
        let name = model
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        Self {
            model_dir: PathBuf::new(),
            camera: CameraConfig {
                distance: 3.0,
                initial_view: ViewPreset::Front,
                ..CameraConfig::default()
            },
            bodies: vec![BodyConfig {
                name,
                model,
                vertices: None,
                size: 1.0,
                translate: [0.0; 3],
                radians: 0.02,
                parent: None,
                ship: false,
            }],
            cameras: Vec::new(),
            ..Self::default()
        }
    }

    /// Path of a body's model file relative to `base_dir`.
    pub fn model_path(&self, base_dir: &Path, body: &BodyConfig) -> PathBuf {
        base_dir.join(&self.model_dir).join(&body.model)
    }
}
