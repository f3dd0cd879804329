use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;

use crate::{proxy::NamedProxy, split::SplitPlan};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("split fractions must be non-negative (train {train}, valid {valid})")]
    NegativeSplit { train: f32, valid: f32 },
    #[error("train + valid fractions exceed 1 ({0})")]
    SplitOverflow(f32),
    #[error("render resolution must be non-zero, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },
    #[error("invalid camera range: {0}")]
    InvalidCameraRange(&'static str),
    #[error("at least one board is required")]
    NoBoards,
    #[error("jpeg quality must be in 1..=100, got {0}")]
    InvalidJpegQuality(u8),
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Random perturbation applied to each placed piece.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlacementJitter {
    /// Planar offset bound, in world units, per axis.
    pub max_position_offset: f32,
    /// Yaw is drawn from `-max..max` degrees.
    pub max_rotation_offset: f32,
    /// Fixed pitch in degrees; non-zero switches the yaw onto the piece's roll axis.
    pub pitch_offset: f32,
}

impl Default for PlacementJitter {
    fn default() -> Self {
        Self {
            max_position_offset: 0.0,
            max_rotation_offset: 360.0,
            pitch_offset: 0.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraJitter {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub fov_y_deg: f32,
}

impl Default for CameraJitter {
    fn default() -> Self {
        Self {
            min_distance: 0.4,
            max_distance: 2.5,
            min_height: 1.4,
            max_height: 1.8,
            fov_y_deg: 60.0,
        }
    }
}

/// World placement of one physical board.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BoardRigConfig {
    pub top_left: [f32; 3],
    pub bottom_right: [f32; 3],
    pub yaw_deg: f32,
}

impl Default for BoardRigConfig {
    fn default() -> Self {
        Self {
            top_left: [-0.2, 0.75, -0.2],
            bottom_right: [0.2, 0.75, 0.2],
            yaw_deg: 0.0,
        }
    }
}

impl BoardRigConfig {
    pub fn top_left(&self) -> Vec3 {
        Vec3::from_array(self.top_left)
    }

    pub fn bottom_right(&self) -> Vec3 {
        Vec3::from_array(self.bottom_right)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    pub total_images: u32,
    pub train_split: f32,
    pub valid_split: f32,
    pub out_dir: PathBuf,
    pub render_width: u32,
    pub render_height: u32,
    pub jpeg_quality: u8,
    /// Master seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub max_moves: u32,
    /// Renderer gets a chance to drop transient resources every this many images.
    pub release_every: u32,
    /// Remove an existing output folder before generating.
    pub clean_output: bool,
    pub placement: PlacementJitter,
    pub camera: CameraJitter,
    pub boards: Vec<BoardRigConfig>,
    /// Model bounds by piece name; empty means cylinder stand-ins sized from the board.
    pub proxies: Vec<NamedProxy>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            total_images: 6000,
            train_split: 0.75,
            valid_split: 0.2,
            out_dir: PathBuf::from("SyntheticChessData"),
            render_width: 512,
            render_height: 512,
            jpeg_quality: 90,
            seed: None,
            max_moves: position::generator::DEFAULT_MAX_MOVES,
            release_every: 100,
            clean_output: true,
            placement: PlacementJitter::default(),
            camera: CameraJitter::default(),
            boards: vec![BoardRigConfig::default()],
            proxies: Vec::new(),
        }
    }
}

impl GenConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        SplitPlan::from_ratios(self.total_images, self.train_split, self.valid_split)?;
        if self.render_width == 0 || self.render_height == 0 {
            return Err(ConfigError::ZeroResolution {
                width: self.render_width,
                height: self.render_height,
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidJpegQuality(self.jpeg_quality));
        }
        let cam = &self.camera;
        if !(cam.min_distance <= cam.max_distance) {
            return Err(ConfigError::InvalidCameraRange("min_distance > max_distance"));
        }
        if !(cam.min_height <= cam.max_height) {
            return Err(ConfigError::InvalidCameraRange("min_height > max_height"));
        }
        if !(cam.fov_y_deg > 0.0 && cam.fov_y_deg < 180.0) {
            return Err(ConfigError::InvalidCameraRange("fov_y_deg outside (0, 180)"));
        }
        if self.boards.is_empty() {
            return Err(ConfigError::NoBoards);
        }
        Ok(())
    }
}
