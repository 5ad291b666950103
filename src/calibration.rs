//! Threshold calibration
//!
//! A calibration session collects finger measurements while the user
//! performs gestures, then re-derives the extractor thresholds from what
//! their hand actually does: the extended/curled angle boundary moves to
//! the midpoint of the observed means, the thumb distance boundary
//! likewise. Learned thresholds persist as a JSON profile and reload at
//! startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::hand::{FingerState, FingerThresholds, HandPose, FINGER_COUNT};

/// Samples collected before a session completes
pub const REQUIRED_SAMPLES: usize = 30;

/// Thresholds learned from a calibration session, in config units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnedThresholds {
    /// PIP angle boundary for Extended, degrees
    pub finger_extended_angle: f32,
    /// PIP angle boundary for Curled, degrees
    pub finger_curled_angle: f32,
    /// Thumb tip-to-palm boundary, hand spans
    pub distance_threshold: f32,
}

impl LearnedThresholds {
    /// Expand into extractor thresholds, applying the configured thumb
    /// hysteresis margin.
    pub fn to_finger_thresholds(&self, distance_margin: f32) -> FingerThresholds {
        FingerThresholds {
            extended_angle_deg: self.finger_extended_angle,
            curled_angle_deg: self.finger_curled_angle,
            thumb_extended_span: self.distance_threshold,
            thumb_curled_span: (self.distance_threshold - distance_margin).max(0.05),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("failed to read calibration profile {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("calibration profile {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write calibration profile {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    /// Thumb span ratio, then four PIP angles
    measurements: [f32; FINGER_COUNT],
    states: [FingerState; FINGER_COUNT],
}

/// Collects samples and derives threshold profiles
pub struct Calibrator {
    path: PathBuf,
    required: usize,
    session: Option<Vec<Sample>>,
}

impl Calibrator {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_owned(),
            required: REQUIRED_SAMPLES,
            session: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a session; any previous unfinished session is discarded.
    pub fn start(&mut self) {
        if self.session.is_some() {
            warn!("calibration restarted, discarding collected samples");
        }
        self.session = Some(Vec::with_capacity(self.required));
        info!(samples = self.required, "calibration started");
    }

    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            info!("calibration cancelled");
        }
    }

    /// Record one pose. Returns the learned thresholds when the sample
    /// quota is met; the session ends at that point.
    pub fn feed(
        &mut self,
        pose: &HandPose,
        current: &FingerThresholds,
    ) -> Option<LearnedThresholds> {
        let session = self.session.as_mut()?;
        session.push(Sample {
            measurements: pose.measurements,
            states: pose.states,
        });

        if session.len() < self.required {
            return None;
        }

        let samples = self.session.take().expect("session checked above");
        let learned = derive(&samples, current);
        info!(
            extended = learned.finger_extended_angle,
            curled = learned.finger_curled_angle,
            thumb = learned.distance_threshold,
            "calibration complete"
        );
        Some(learned)
    }

    /// Write a learned profile to disk.
    pub fn persist(&self, learned: &LearnedThresholds) -> Result<(), CalibrationError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CalibrationError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(learned).expect("profile serializes");
        fs::write(&self.path, json).map_err(|source| CalibrationError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "calibration profile saved");
        Ok(())
    }

    /// Load a previously saved profile; `Ok(None)` when none exists.
    pub fn load(path: &Path) -> Result<Option<LearnedThresholds>, CalibrationError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path).map_err(|source| CalibrationError::Read {
            path: path.to_owned(),
            source,
        })?;
        let learned =
            serde_json::from_str(&text).map_err(|source| CalibrationError::Parse {
                path: path.to_owned(),
                source,
            })?;
        Ok(Some(learned))
    }
}

/// Derive thresholds from collected samples. A measurement class that was
/// never observed keeps the current boundary.
fn derive(samples: &[Sample], current: &FingerThresholds) -> LearnedThresholds {
    let mut extended_angles = Vec::new();
    let mut curled_angles = Vec::new();
    let mut extended_ratios = Vec::new();
    let mut curled_ratios = Vec::new();

    for sample in samples {
        for slot in 0..FINGER_COUNT {
            let value = sample.measurements[slot];
            let (extended, curled) = if slot == 0 {
                (&mut extended_ratios, &mut curled_ratios)
            } else {
                (&mut extended_angles, &mut curled_angles)
            };
            match sample.states[slot] {
                FingerState::Extended => extended.push(value),
                FingerState::Curled => curled.push(value),
                FingerState::Neutral => {}
            }
        }
    }

    // Means must straddle a usable positive boundary; degenerate
    // observations (e.g. sentinel zero angles) keep the current values.
    let (finger_extended_angle, finger_curled_angle) =
        match (mean(&extended_angles), mean(&curled_angles)) {
            (Some(ext), Some(curl)) if curl > 0.0 && curl < ext => ((ext + curl) / 2.0, curl),
            _ => (current.extended_angle_deg, current.curled_angle_deg),
        };

    let distance_threshold = match (mean(&extended_ratios), mean(&curled_ratios)) {
        (Some(ext), Some(curl)) if curl > 0.0 && curl < ext => (ext + curl) / 2.0,
        _ => current.thumb_extended_span,
    };

    LearnedThresholds {
        finger_extended_angle,
        finger_curled_angle,
        distance_threshold,
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}
