//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian
//! length. The dashboard queries status and switches modes; the action
//! executor subscribes and consumes dispatched action tokens as push
//! notifications.

use serde::{Deserialize, Serialize};

use crate::events::PipelineEvent;
use crate::gesture::Gesture;
use crate::state::ControlMode;

/// Requests from clients to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request the current daemon status
    GetStatus,

    /// Jump to a specific control mode
    SetMode { mode: ControlMode },

    /// Advance to the next control mode
    CycleMode,

    /// Ping to check connectivity
    Ping,

    /// Switch this connection to event push notifications
    Subscribe,
}

/// Responses from the daemon to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Command accepted; effects are announced as events
    Ack,

    /// Pong response to ping
    Pong,

    /// Subscription confirmed; notifications follow
    Subscribed,

    /// Request could not be served
    Error { message: String },
}

/// Push notification for subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Notification {
    Event(PipelineEvent),
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Active control mode
    pub mode: ControlMode,

    /// Most recently matched gesture, if any
    pub gesture: Option<Gesture>,

    /// Confidence of that gesture
    pub confidence: f32,

    /// Uptime in seconds
    pub uptime_secs: u64,

    /// Action tokens dispatched since startup
    pub actions_dispatched: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: ControlMode::default(),
            gesture: None,
            confidence: 0.0,
            uptime_secs: 0,
            actions_dispatched: 0,
        }
    }
}
