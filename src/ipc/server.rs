//! Unix domain socket server for IPC
//!
//! Request-response for status and mode control, plus push notifications:
//! a client that sends `Subscribe` switches its connection into a one-way
//! event stream and receives every pipeline event from that point on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::control::ControlCommand;
use crate::events::PipelineEvent;

use super::protocol::{DaemonStatus, Notification, Request, Response};

/// Upper bound on one request message
const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// IPC server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    /// Source of per-client event subscriptions
    event_tx: broadcast::Sender<PipelineEvent>,
    /// Forwarding channel for mode commands received over IPC
    control_tx: mpsc::Sender<ControlCommand>,
}

/// Shared server state
struct ServerState {
    status: DaemonStatus,
    start_time: Instant,
}

impl Server {
    /// Create a new IPC server
    pub fn new(
        socket_path: &Path,
        event_tx: broadcast::Sender<PipelineEvent>,
        control_tx: mpsc::Sender<ControlCommand>,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Socket is owner-only; any local client with access may control
        // the cursor.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::default(),
            start_time: Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            shutdown_tx,
            event_tx,
            control_tx,
        })
    }

    /// Fold one pipeline event into the status snapshot
    pub async fn apply_event(&self, event: &PipelineEvent) {
        let mut state = self.state.write().await;
        match event {
            PipelineEvent::GestureDetected {
                gesture,
                confidence,
                mode,
            } => {
                state.status.gesture = Some(*gesture);
                state.status.confidence = *confidence;
                state.status.mode = *mode;
            }
            PipelineEvent::ActionDispatched { .. } => {
                state.status.actions_dispatched += 1;
            }
            PipelineEvent::ModeChanged { to, .. } => {
                state.status.mode = *to;
            }
            PipelineEvent::CalibrationStarted | PipelineEvent::CalibrationCompleted { .. } => {}
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self
            .listener
            .as_ref()
            .context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let event_rx = self.event_tx.subscribe();
                    let control_tx = self.control_tx.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, event_rx, control_tx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle one client connection. Request-response until the client
    /// subscribes; then the connection becomes a one-way event stream.
    async fn handle_client(
        mut stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        event_rx: broadcast::Receiver<PipelineEvent>,
        control_tx: mpsc::Sender<ControlCommand>,
    ) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_REQUEST_BYTES {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            let request: Request =
                serde_json::from_slice(&msg_buf).context("failed to parse request")?;
            debug!(?request, "received request");

            let subscribe = matches!(request, Request::Subscribe);
            let response = Self::process_request(request, &state, &control_tx).await;
            Self::send_message(&mut stream, &response).await?;

            if subscribe {
                debug!("client subscribed to notifications");
                return Self::push_events(stream, event_rx).await;
            }
        }
    }

    /// Stream events to a subscribed client until either side closes
    async fn push_events(
        mut stream: UnixStream,
        mut event_rx: broadcast::Receiver<PipelineEvent>,
    ) -> Result<()> {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    Self::send_message(&mut stream, &Notification::Event(event)).await?;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Ok(());
                }
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
        control_tx: &mpsc::Sender<ControlCommand>,
    ) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => {
                let mut state = state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                Response::Status(state.status.clone())
            }

            Request::SetMode { mode } => {
                Self::forward_command(control_tx, ControlCommand::SetMode(mode)).await
            }

            Request::CycleMode => {
                Self::forward_command(control_tx, ControlCommand::CycleMode).await
            }

            Request::Subscribe => Response::Subscribed,
        }
    }

    async fn forward_command(
        control_tx: &mpsc::Sender<ControlCommand>,
        command: ControlCommand,
    ) -> Response {
        match control_tx.send(command).await {
            Ok(()) => Response::Ack,
            Err(_) => Response::Error {
                message: "pipeline unavailable".to_string(),
            },
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
