//! gesture-control-daemon: hand-gesture desktop control
//!
//! Turns a stream of 21-point hand-landmark frames into desktop control
//! actions (cursor movement, clicks, scrolling, slide navigation):
//! - Frame intake over a Unix socket from the external tracking provider
//! - Deterministic, rule-based gesture classification per frame
//! - Debounce gating, control modes, action mapping
//! - IPC for status queries and event push to the dashboard and executor
//!
//! The daemon performs no OS input injection itself; it emits action
//! tokens for the external executor.

mod actions;
mod calibration;
mod config;
mod control;
mod events;
mod gesture;
mod hand;
mod ipc;
mod landmark;
mod lifecycle;
mod pipeline;
mod state;
mod tracker;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::calibration::Calibrator;
use crate::config::Config;
use crate::control::CommandListener;
use crate::events::PipelineEvent;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::pipeline::Pipeline;
use crate::tracker::FrameListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "gesture-control-daemon starting"
    );

    // Load configuration
    let config = Config::load().context("loading configuration")?;
    config.ensure_dirs().context("creating data directory")?;
    info!(
        mode = %config.default_mode,
        ?config.ipc_socket_path,
        ?config.frame_socket_path,
        "configuration loaded"
    );

    // A saved calibration profile overrides the configured thresholds
    let learned = match Calibrator::load(&config.calibration_path) {
        Ok(profile) => {
            if profile.is_some() {
                info!(path = %config.calibration_path.display(), "calibration profile loaded");
            }
            profile
        }
        Err(e) => {
            warn!(%e, "ignoring unreadable calibration profile");
            None
        }
    };

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Channels for inter-component communication
    // Tracking provider -> pipeline
    let (frame_tx, frame_rx) = mpsc::channel(64);
    // Operator commands (keyboard + IPC) -> pipeline
    let (control_tx, control_rx) = mpsc::channel(32);
    // Pipeline -> IPC subscribers
    let (event_tx, _event_rx) = broadcast::channel::<PipelineEvent>(64);

    // Build the pipeline; an overlapping gesture table fails fast here
    let pipeline = Pipeline::new(&config, learned, event_tx.clone())
        .context("gesture table validation failed")?;

    // Frame intake socket
    let frame_listener = FrameListener::bind(&config.frame_socket_path, frame_tx)
        .context("binding frame socket")?;

    // Interactive keyboard commands (runs on dedicated thread)
    let command_listener = CommandListener::new(control_tx.clone());
    match command_listener.start() {
        Ok(()) => {
            info!("command listener started (m: mode, c: calibrate, s: smoothing, +/-: speed, q: quit)");
        }
        Err(e) => {
            error!(?e, "failed to start command listener");
            warn!("continuing without keyboard control - IPC commands still work");
        }
    }

    // IPC server with event subscriptions
    let server = Server::new(&config.ipc_socket_path, event_tx.clone(), control_tx.clone())?;

    // Fold pipeline events into the status snapshot served over IPC
    let mut status_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the pipeline (consumes frames and commands)
        _ = pipeline.run(frame_rx, control_rx) => {
            info!("pipeline exited");
        }

        // Accept tracking provider connections
        result = frame_listener.run() => {
            if let Err(e) = result {
                error!(?e, "frame listener error");
            }
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Keep the IPC status snapshot current
        _ = async {
            loop {
                match status_rx.recv().await {
                    Ok(event) => {
                        server_for_events.apply_event(&event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "status event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("status event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    command_listener.stop();
    frame_listener.cleanup();
    server.shutdown().await;

    info!("gesture-control-daemon stopped");

    Ok(())
}
