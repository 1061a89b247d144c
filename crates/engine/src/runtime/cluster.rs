//! Master to render node frame link.
//!
//! Plain TCP, each frame written as `[u32 LE length][frame bytes]`. The
//! master broadcasts every encoded frame. A render node that falls behind
//! skips frames rather than holding the master back, and asks for a resync
//! so the full player records it missed are sent again.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use protocol::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Largest frame a render node accepts.
pub const MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Frames buffered per render node before it starts skipping.
const FRAME_BACKLOG: usize = 8;

/// Pause after a failed accept.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

pub async fn write_frame<W: AsyncWrite + Unpin>(w: &mut W, frame: &[u8]) -> anyhow::Result<()> {
    if frame.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: frame.len(),
            limit: MAX_FRAME_SIZE,
        }
        .into());
    }
    w.write_u32_le(frame.len() as u32).await?;
    w.write_all(frame).await?;
    w.flush().await?;
    Ok(())
}

/// Read one frame. `Ok(None)` on a clean close between frames.
pub async fn read_frame<R: AsyncRead + Unpin>(r: &mut R) -> anyhow::Result<Option<Bytes>> {
    let len = match r.read_u32_le().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: len,
            limit: MAX_FRAME_SIZE,
        }
        .into());
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).await?;
    Ok(Some(Bytes::from(buf)))
}

/// Master side: accepts render nodes and fans frames out to them.
pub struct ClusterServer {
    frames: broadcast::Sender<Bytes>,
    resyncs: mpsc::UnboundedReceiver<SocketAddr>,
    local_addr: SocketAddr,
}

impl ClusterServer {
    pub async fn bind(addr: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (frames, _) = broadcast::channel(FRAME_BACKLOG);
        let (resync_tx, resyncs) = mpsc::unbounded_channel();
        info!("Serving sync frames on {}", local_addr);

        let tx = frames.clone();
        tokio::spawn(async move {
            loop {
                let (stream, peer) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Render node accept failed: {}", e);
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                        continue;
                    }
                };
                let _ = stream.set_nodelay(true);
                // Subscribe before announcing so the resync frame is not missed.
                let rx = tx.subscribe();
                if resync_tx.send(peer).is_err() {
                    return;
                }
                tokio::spawn(serve_render_node(stream, peer, rx, resync_tx.clone()));
            }
        });

        Ok(Self {
            frames,
            resyncs,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send a frame to every connected render node.
    pub fn publish(&self, frame: Bytes) {
        // No receivers just means no render node is connected.
        let _ = self.frames.send(frame);
    }

    /// Number of resync requests since the last call. A render node asks
    /// when it connects and whenever it had to skip frames.
    pub fn take_resyncs(&mut self) -> usize {
        let mut count = 0;
        while self.resyncs.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    /// Wait for the next resync request.
    pub async fn next_resync(&mut self) -> Option<SocketAddr> {
        self.resyncs.recv().await
    }
}

async fn serve_render_node(
    mut stream: TcpStream,
    peer: SocketAddr,
    mut rx: broadcast::Receiver<Bytes>,
    resync: mpsc::UnboundedSender<SocketAddr>,
) {
    info!("Render node {} connected", peer);
    loop {
        let frame = match rx.recv().await {
            Ok(frame) => frame,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Render node {} skipped {} frames, requesting resync", peer, skipped);
                if resync.send(peer).is_err() {
                    break;
                }
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        if let Err(e) = write_frame(&mut stream, &frame).await {
            debug!("Write to render node {} failed: {}", peer, e);
            break;
        }
    }
    info!("Render node {} disconnected", peer);
}

/// Render side: keeps a connection to the master and hands over every frame
/// received, in order.
pub fn spawn_cluster_client(
    master_addr: String,
    reconnect_delay: Duration,
) -> mpsc::UnboundedReceiver<Bytes> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            match TcpStream::connect(&master_addr).await {
                Ok(mut stream) => {
                    let _ = stream.set_nodelay(true);
                    info!("Connected to master {}", master_addr);
                    loop {
                        match read_frame(&mut stream).await {
                            Ok(Some(frame)) => {
                                if tx.send(frame).is_err() {
                                    return;
                                }
                            }
                            Ok(None) => {
                                info!("Master {} closed the connection", master_addr);
                                break;
                            }
                            Err(e) => {
                                warn!("Sync link to {} failed: {}", master_addr, e);
                                break;
                            }
                        }
                    }
                }
                Err(e) => debug!("Master {} unreachable: {}", master_addr, e),
            }
            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(reconnect_delay).await;
        }
    });
    rx
}
