//! Interactive command listener
//!
//! Reads key presses from stdin on a dedicated thread and forwards mapped
//! commands to the pipeline task. Stdin is line-buffered by the terminal,
//! so commands apply when the operator presses Enter; unbound bytes and
//! the newline itself are ignored.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::keys::ControlCommand;

/// Errors that can occur starting the command listener
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("command listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

/// Stdin command listener feeding the pipeline's control channel
pub struct CommandListener {
    command_tx: mpsc::Sender<ControlCommand>,
    running: Arc<AtomicBool>,
}

impl CommandListener {
    pub fn new(command_tx: mpsc::Sender<ControlCommand>) -> Self {
        Self {
            command_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the listener thread. The thread runs until stdin closes, a
    /// quit command is read, or `stop()` is called.
    pub fn start(&self) -> Result<(), ControlError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ControlError::AlreadyRunning);
        }

        let command_tx = self.command_tx.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("command-listener".to_string())
            .spawn(move || {
                info!("command listener thread started");
                read_commands(command_tx, &running);
                running.store(false, Ordering::SeqCst);
                info!("command listener thread stopped");
            })
            .map_err(|e| ControlError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Request the listener to stop. The thread notices after its current
    /// blocking read returns.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn read_commands(command_tx: mpsc::Sender<ControlCommand>, running: &AtomicBool) {
    let mut stdin = std::io::stdin().lock();
    let mut buf = [0u8; 64];

    while running.load(Ordering::SeqCst) {
        let n = match stdin.read(&mut buf) {
            Ok(0) => {
                debug!("stdin closed");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                warn!(?e, "stdin read error");
                return;
            }
        };

        for &byte in &buf[..n] {
            let Some(command) = ControlCommand::from_key(byte) else {
                continue;
            };

            debug!(?command, "key command");
            if command_tx.blocking_send(command).is_err() {
                warn!("control channel closed, stopping listener");
                return;
            }
            if command == ControlCommand::Quit {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let listener = CommandListener::new(tx);
        assert!(!listener.is_running());
    }
}
