//! Unix-socket frame stream
//!
//! The tracking provider connects and pushes one `LandmarkFrame` message
//! per captured video frame: a 4-byte little-endian length followed by
//! JSON. A malformed message is dropped with a warning; the stream keeps
//! going. The provider's internals (camera, model) are its own business.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::landmark::LandmarkFrame;

/// Upper bound on one frame message
const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Accepts provider connections and feeds frames to the pipeline
pub struct FrameListener {
    socket_path: PathBuf,
    listener: UnixListener,
    frame_tx: mpsc::Sender<LandmarkFrame>,
}

impl FrameListener {
    /// Bind the frame socket, replacing any stale one.
    pub fn bind(socket_path: &Path, frame_tx: mpsc::Sender<LandmarkFrame>) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale frame socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind frame socket")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!(?socket_path, "frame socket listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            frame_tx,
        })
    }

    /// Accept provider connections; each connection streams frames until
    /// it disconnects.
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    info!("tracking provider connected");
                    let frame_tx = self.frame_tx.clone();
                    tokio::spawn(async move {
                        match read_frames(stream, frame_tx).await {
                            Ok(()) => info!("tracking provider disconnected"),
                            Err(e) => warn!(?e, "provider stream error"),
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "frame socket accept error");
                }
            }
        }
    }

    /// Remove the socket file on shutdown
    pub fn cleanup(&self) {
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove frame socket");
            }
        }
    }
}

async fn read_frames(
    mut stream: UnixStream,
    frame_tx: mpsc::Sender<LandmarkFrame>,
) -> Result<()> {
    let mut len_buf = [0u8; 4];

    loop {
        match stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_FRAME_BYTES {
            warn!(len, "frame message too large, dropping provider");
            return Ok(());
        }

        let mut msg_buf = vec![0u8; len];
        stream.read_exact(&mut msg_buf).await?;

        match serde_json::from_slice::<LandmarkFrame>(&msg_buf) {
            Ok(frame) => {
                if frame_tx.send(frame).await.is_err() {
                    debug!("pipeline gone, closing provider stream");
                    return Ok(());
                }
            }
            Err(e) => {
                warn!(%e, "dropping malformed frame message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn temp_socket(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gesture-frames-{tag}-{}.sock", std::process::id()))
    }

    async fn send_framed(stream: &mut UnixStream, payload: &[u8]) {
        stream
            .write_all(&(payload.len() as u32).to_le_bytes())
            .await
            .unwrap();
        stream.write_all(payload).await.unwrap();
    }

    #[tokio::test]
    async fn test_frames_flow_through() {
        let path = temp_socket("flow");
        let (tx, mut rx) = mpsc::channel(8);
        let listener = FrameListener::bind(&path, tx).unwrap();
        let _task = tokio::spawn(async move { listener.run().await });

        let mut client = UnixStream::connect(&path).await.unwrap();
        let frame = LandmarkFrame {
            points: vec![crate::landmark::Point::new(0.1, 0.2); 21],
            confidence: 0.8,
        };
        send_framed(&mut client, &serde_json::to_vec(&frame).unwrap()).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.points.len(), 21);
        assert!((received.confidence - 0.8).abs() < 1e-6);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_malformed_message_does_not_kill_stream() {
        let path = temp_socket("malformed");
        let (tx, mut rx) = mpsc::channel(8);
        let listener = FrameListener::bind(&path, tx).unwrap();
        let _task = tokio::spawn(async move { listener.run().await });

        let mut client = UnixStream::connect(&path).await.unwrap();
        send_framed(&mut client, b"{not json").await;
        send_framed(
            &mut client,
            &serde_json::to_vec(&LandmarkFrame::no_hand()).unwrap(),
        )
        .await;

        // The bad message was dropped, the good one still arrives
        let received = rx.recv().await.unwrap();
        assert!(received.is_empty());

        let _ = std::fs::remove_file(&path);
    }
}
