//! Configuration loading and validation
//!
//! Settings come from an optional JSON file (`GESTURE_DAEMON_CONFIG`, or
//! `~/.config/gesture-control/config.json`); a missing file means
//! defaults. Every value is validated here once so the pipeline only ever
//! sees parsed, in-range numbers.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hand::FingerThresholds;
use crate::state::ControlMode;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "GESTURE_DAEMON_CONFIG";

/// Hand-tracking provider settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Detection confidence below this flags a frame as low-confidence
    /// and penalizes its gesture score
    pub detection_confidence: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detection_confidence: 0.7,
        }
    }
}

/// Gesture recognition thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureSettings {
    /// PIP angle at or above which a finger reads Extended, degrees
    pub finger_extended_angle: f32,
    /// PIP angle at or below which a finger reads Curled, degrees; the
    /// gap up to `finger_extended_angle` is the Neutral hysteresis band
    pub finger_curled_angle: f32,
    /// Thumb tip-to-palm distance (hand spans) at or above which the
    /// thumb reads Extended
    pub distance_threshold: f32,
    /// Thumb hysteresis: Curled at or below
    /// `distance_threshold - distance_margin`
    pub distance_margin: f32,
    /// Candidates scoring below this are never confirmed
    pub confidence_threshold: f32,
    /// Cooldown between confirmations of the same discrete gesture
    pub debounce_time_ms: u64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            finger_extended_angle: 90.0,
            finger_curled_angle: 50.0,
            distance_threshold: 0.9,
            distance_margin: 0.2,
            confidence_threshold: 0.7,
            debounce_time_ms: 300,
        }
    }
}

/// Cursor and scroll behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointerConfig {
    /// Multiplier on the raw cursor delta, [0.1, 2.0]
    pub movement_speed: f32,
    /// Scroll steps emitted per confirmed scroll gesture
    pub scroll_speed: u32,
    /// Interpolate cursor movement towards the target
    pub smoothing: bool,
    /// Interpolation factor in (0, 1]; lower is smoother
    pub smoothing_factor: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            movement_speed: 1.0,
            scroll_speed: 3,
            smoothing: true,
            smoothing_factor: 0.3,
        }
    }
}

/// On-disk layout of the config file; sections may be omitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    tracker: TrackerConfig,
    gesture: GestureSettings,
    pointer: PointerConfig,
    default_mode: ControlMode,
}

/// Resolved daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub gesture: GestureSettings,
    pub pointer: PointerConfig,
    /// Mode active at startup
    pub default_mode: ControlMode,
    /// Directory for runtime data
    pub data_dir: PathBuf,
    /// Socket the tracking provider pushes frames into
    pub frame_socket_path: PathBuf,
    /// Socket for status/control IPC
    pub ipc_socket_path: PathBuf,
    /// Learned calibration profile location
    pub calibration_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HOME is not set")]
    HomeNotSet,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file {path} is invalid: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to create data directory {path}: {source}")]
    CreateDirs {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("finger_extended_angle {0} must be within (0, 180)")]
    ExtendedAngleRange(f32),

    #[error("finger_curled_angle {curled} must be positive and below finger_extended_angle {extended}")]
    AngleOrder { curled: f32, extended: f32 },

    #[error("distance_threshold {threshold} must exceed distance_margin {margin}, both positive")]
    DistanceBand { threshold: f32, margin: f32 },

    #[error("{field} {value} must be within [0, 1]")]
    ConfidenceRange { field: &'static str, value: f32 },

    #[error("detection_confidence {0} must be within (0, 1]")]
    DetectionConfidence(f32),

    #[error("movement_speed {0} must be within [0.1, 2.0]")]
    MovementSpeed(f32),

    #[error("scroll_speed must be at least 1")]
    ScrollSpeed,

    #[error("smoothing_factor {0} must be within (0, 1]")]
    SmoothingFactor(f32),
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let home = env::var("HOME").map_err(|_| ConfigError::HomeNotSet)?;

        let file_path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                Path::new(&home)
                    .join(".config")
                    .join("gesture-control")
                    .join("config.json")
            });

        let file = if file_path.exists() {
            let text = fs::read_to_string(&file_path).map_err(|source| ConfigError::Read {
                path: file_path.clone(),
                source,
            })?;
            serde_json::from_str::<ConfigFile>(&text).map_err(|source| ConfigError::Parse {
                path: file_path.clone(),
                source,
            })?
        } else {
            ConfigFile::default()
        };

        let data_dir = Path::new(&home)
            .join(".local")
            .join("share")
            .join("gesture-control");

        let config = Self {
            tracker: file.tracker,
            gesture: file.gesture,
            pointer: file.pointer,
            default_mode: file.default_mode,
            frame_socket_path: data_dir.join("frames.sock"),
            ipc_socket_path: data_dir.join("daemon.sock"),
            calibration_path: data_dir.join("calibration.json"),
            data_dir,
        };

        config.validate()?;
        Ok(config)
    }

    /// Ensure the runtime data directory exists
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::CreateDirs {
            path: self.data_dir.clone(),
            source,
        })
    }

    /// Extractor thresholds derived from the gesture settings
    pub fn finger_thresholds(&self) -> FingerThresholds {
        FingerThresholds {
            extended_angle_deg: self.gesture.finger_extended_angle,
            curled_angle_deg: self.gesture.finger_curled_angle,
            thumb_extended_span: self.gesture.distance_threshold,
            thumb_curled_span: self.gesture.distance_threshold - self.gesture.distance_margin,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gesture;
        if !(0.0..180.0).contains(&g.finger_extended_angle) || g.finger_extended_angle <= 0.0 {
            return Err(ConfigError::ExtendedAngleRange(g.finger_extended_angle));
        }
        if g.finger_curled_angle <= 0.0 || g.finger_curled_angle >= g.finger_extended_angle {
            return Err(ConfigError::AngleOrder {
                curled: g.finger_curled_angle,
                extended: g.finger_extended_angle,
            });
        }
        if g.distance_margin <= 0.0 || g.distance_threshold <= g.distance_margin {
            return Err(ConfigError::DistanceBand {
                threshold: g.distance_threshold,
                margin: g.distance_margin,
            });
        }
        if !(0.0..=1.0).contains(&g.confidence_threshold) {
            return Err(ConfigError::ConfidenceRange {
                field: "confidence_threshold",
                value: g.confidence_threshold,
            });
        }

        let detection = self.tracker.detection_confidence;
        if detection <= 0.0 || detection > 1.0 {
            return Err(ConfigError::DetectionConfidence(detection));
        }

        let p = &self.pointer;
        if !(0.1..=2.0).contains(&p.movement_speed) {
            return Err(ConfigError::MovementSpeed(p.movement_speed));
        }
        if p.scroll_speed == 0 {
            return Err(ConfigError::ScrollSpeed);
        }
        if p.smoothing_factor <= 0.0 || p.smoothing_factor > 1.0 {
            return Err(ConfigError::SmoothingFactor(p.smoothing_factor));
        }

        Ok(())
    }
}
