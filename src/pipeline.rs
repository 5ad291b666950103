//! Per-frame classification pipeline
//!
//! One synchronous pass per frame: geometry, finger states, gesture
//! lookup, debounce, action mapping. The pipeline task exclusively owns
//! every piece of mutable state (debounce timestamps, active mode, cursor
//! position, statistics), so no locking is involved; frames and operator
//! commands arrive over channels and events leave over a broadcast.
//!
//! Failure containment: the worst outcome of any single bad frame is "no
//! action this frame". Rejected and empty frames never touch the debounce
//! map, the mode, or the cursor state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use crate::actions::{ActionMapper, ActionToken};
use crate::calibration::{Calibrator, LearnedThresholds};
use crate::config::Config;
use crate::control::ControlCommand;
use crate::events::PipelineEvent;
use crate::gesture::{Classifier, DebounceGate, GateVerdict, Gesture, GestureTable, TableError};
use crate::hand::FingerStateExtractor;
use crate::landmark::LandmarkFrame;
use crate::state::{ControlMode, ModeMachine};

/// Result of one pipeline pass; also the display data for the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// At most one action per frame
    pub action: Option<ActionToken>,
    /// Matched gesture, confirmed or not
    pub gesture: Option<Gesture>,
    pub confidence: f32,
    pub mode: ControlMode,
}

impl FrameOutput {
    fn idle(mode: ControlMode) -> Self {
        Self {
            action: None,
            gesture: None,
            confidence: 0.0,
            mode,
        }
    }
}

/// Process-lifetime counters, logged at shutdown
#[derive(Debug, Default)]
struct PipelineStats {
    frames: u64,
    rejected: u64,
    actions: u64,
    confirmed: HashMap<Gesture, u64>,
}

pub struct Pipeline {
    extractor: FingerStateExtractor,
    classifier: Classifier,
    gate: DebounceGate,
    modes: ModeMachine,
    mapper: ActionMapper,
    calibrator: Calibrator,
    /// Thumb hysteresis width, needed when applying learned thresholds
    distance_margin: f32,
    stats: PipelineStats,
    event_tx: broadcast::Sender<PipelineEvent>,
    /// Warn once per run of consecutive rejected frames
    rejection_logged: bool,
}

impl Pipeline {
    /// Build the pipeline. Validates the gesture table; an overlapping
    /// table is a configuration defect and refuses to start.
    pub fn new(
        config: &Config,
        learned: Option<LearnedThresholds>,
        event_tx: broadcast::Sender<PipelineEvent>,
    ) -> Result<Self, TableError> {
        let thresholds = match &learned {
            Some(profile) => {
                info!("calibration profile applied");
                profile.to_finger_thresholds(config.gesture.distance_margin)
            }
            None => config.finger_thresholds(),
        };

        Ok(Self {
            extractor: FingerStateExtractor::new(thresholds, config.tracker.detection_confidence),
            classifier: Classifier::new(GestureTable::standard())?,
            gate: DebounceGate::new(
                Duration::from_millis(config.gesture.debounce_time_ms),
                config.gesture.confidence_threshold,
            ),
            modes: ModeMachine::new(config.default_mode, event_tx.clone()),
            mapper: ActionMapper::new(&config.pointer),
            calibrator: Calibrator::new(&config.calibration_path),
            distance_margin: config.gesture.distance_margin,
            stats: PipelineStats::default(),
            event_tx,
            rejection_logged: false,
        })
    }

    pub fn mode(&self) -> ControlMode {
        self.modes.mode()
    }

    /// Run one frame through the pipeline at time `now`.
    pub fn process(&mut self, frame: &LandmarkFrame, now: Instant) -> FrameOutput {
        self.stats.frames += 1;
        let mode = self.modes.mode();

        if frame.is_empty() {
            trace!("no hand this frame");
            return FrameOutput::idle(mode);
        }

        if let Err(err) = frame.validate() {
            self.stats.rejected += 1;
            if self.rejection_logged {
                debug!(%err, "frame rejected");
            } else {
                warn!(%err, "rejecting malformed frames");
                self.rejection_logged = true;
            }
            return FrameOutput::idle(mode);
        }
        self.rejection_logged = false;

        let pose = self.extractor.extract(frame);

        if self.calibrator.is_active() {
            self.feed_calibration(&pose);
            return FrameOutput::idle(mode);
        }

        let Some(candidate) = self.classifier.classify(mode, &pose, now) else {
            return FrameOutput::idle(mode);
        };

        let _ = self.event_tx.send(PipelineEvent::GestureDetected {
            gesture: candidate.gesture,
            confidence: candidate.confidence,
            mode,
        });

        let action = match self.gate.evaluate(mode, &candidate) {
            GateVerdict::Confirmed => {
                let token = self
                    .mapper
                    .map(candidate.gesture, (pose.index_tip.x, pose.index_tip.y));

                self.stats.actions += 1;
                *self.stats.confirmed.entry(candidate.gesture).or_insert(0) += 1;
                if !candidate.gesture.is_continuous() {
                    info!(
                        gesture = %candidate.gesture,
                        confidence = candidate.confidence,
                        mode = %mode,
                        "action dispatched"
                    );
                }

                let _ = self.event_tx.send(PipelineEvent::ActionDispatched {
                    action: token,
                    mode,
                });
                Some(token)
            }
            GateVerdict::BelowConfidence => {
                trace!(gesture = %candidate.gesture, confidence = candidate.confidence, "unconfirmed");
                None
            }
            GateVerdict::Cooldown => None,
        };

        FrameOutput {
            action,
            gesture: Some(candidate.gesture),
            confidence: candidate.confidence,
            mode,
        }
    }

    fn feed_calibration(&mut self, pose: &crate::hand::HandPose) {
        let current = *self.extractor.thresholds();
        if let Some(learned) = self.calibrator.feed(pose, &current) {
            self.extractor
                .set_thresholds(learned.to_finger_thresholds(self.distance_margin));
            if let Err(err) = self.calibrator.persist(&learned) {
                warn!(%err, "could not save calibration profile");
            }
            let _ = self
                .event_tx
                .send(PipelineEvent::CalibrationCompleted { thresholds: learned });
        }
    }

    /// Apply one operator command. `Quit` is handled by the run loop.
    pub fn handle_command(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::CycleMode => self.modes.cycle(),
            ControlCommand::SetMode(mode) => self.modes.set(mode),
            ControlCommand::StartCalibration => {
                // The calibration key toggles: pressing it mid-session
                // abandons the collected samples
                if self.calibrator.is_active() {
                    self.calibrator.cancel();
                } else {
                    self.calibrator.start();
                    let _ = self.event_tx.send(PipelineEvent::CalibrationStarted);
                }
            }
            ControlCommand::ToggleSmoothing => {
                let enabled = self.mapper.toggle_smoothing();
                info!(enabled, "smoothing toggled");
            }
            ControlCommand::SpeedUp => {
                let speed = self.mapper.adjust_speed(0.1);
                info!(speed, "movement speed adjusted");
            }
            ControlCommand::SpeedDown => {
                let speed = self.mapper.adjust_speed(-0.1);
                info!(speed, "movement speed adjusted");
            }
            ControlCommand::Quit => {}
        }
    }

    /// Consume frames and commands until quit or both channels close.
    pub async fn run(
        mut self,
        mut frame_rx: mpsc::Receiver<LandmarkFrame>,
        mut control_rx: mpsc::Receiver<ControlCommand>,
    ) {
        info!(mode = %self.modes.mode(), "pipeline started");

        loop {
            tokio::select! {
                maybe_frame = frame_rx.recv() => match maybe_frame {
                    Some(frame) => {
                        let output = self.process(&frame, Instant::now());
                        trace!(
                            gesture = ?output.gesture,
                            action = ?output.action,
                            confidence = output.confidence,
                            mode = %output.mode,
                            "frame processed"
                        );
                    }
                    None => {
                        info!("frame channel closed");
                        break;
                    }
                },
                maybe_command = control_rx.recv() => match maybe_command {
                    Some(ControlCommand::Quit) => {
                        info!("quit requested");
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => {
                        info!("control channel closed");
                        break;
                    }
                },
            }
        }

        self.log_statistics();
    }

    fn log_statistics(&self) {
        info!(
            frames = self.stats.frames,
            rejected = self.stats.rejected,
            actions = self.stats.actions,
            "pipeline statistics"
        );
        for (gesture, count) in &self.stats.confirmed {
            info!(gesture = %gesture, count, "confirmed total");
        }
    }
}
