//! Phone relay link (master only).
//!
//! The relay is a websocket server that multiplexes every phone into one
//! text stream. Inbound text goes to the master's inbox untouched; the
//! master parses it on its own thread during `pre_sync`.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;

/// First message on every connection, registers this process as the game.
pub const HANDSHAKE: &str = "game_connect";

/// How a relay session finished.
enum SessionEnd {
    /// Connection lost; try again.
    Disconnected,
    /// The master dropped its outbox.
    Shutdown,
}

/// Keep a relay connection up until the outbox closes.
pub async fn run_relay(
    config: RelayConfig,
    inbox: mpsc::UnboundedSender<String>,
    mut outbox: mpsc::UnboundedReceiver<String>,
) -> anyhow::Result<()> {
    let delay = Duration::from_millis(config.reconnect_delay_ms);
    loop {
        match relay_session(&config, &inbox, &mut outbox).await {
            Ok(SessionEnd::Shutdown) => return Ok(()),
            Ok(SessionEnd::Disconnected) => info!("Relay {} disconnected", config.url),
            Err(e) => warn!("Relay {} unavailable: {}", config.url, e),
        }
        if inbox.is_closed() {
            return Ok(());
        }
        tokio::time::sleep(delay).await;
    }
}

async fn relay_session(
    config: &RelayConfig,
    inbox: &mpsc::UnboundedSender<String>,
    outbox: &mut mpsc::UnboundedReceiver<String>,
) -> anyhow::Result<SessionEnd> {
    let mut request = config.url.as_str().into_client_request()?;
    request
        .headers_mut()
        .insert("Sec-WebSocket-Protocol", HeaderValue::from_str(&config.protocol)?);

    let (ws, _) = connect_async(request).await?;
    info!("Connected to relay {}", config.url);
    let (mut write, mut read) = ws.split();
    write.send(Message::Text(HANDSHAKE.into())).await?;

    loop {
        tokio::select! {
            incoming = read.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::Disconnected),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                };
                if text.len() > config.max_message_size {
                    warn!(
                        "Dropping {} byte relay message (limit {})",
                        text.len(),
                        config.max_message_size
                    );
                    continue;
                }
                if inbox.send(text.as_str().to_string()).is_err() {
                    return Ok(SessionEnd::Shutdown);
                }
            }
            outgoing = outbox.recv() => {
                let Some(text) = outgoing else {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                };
                debug!("Relay <- {}", text);
                write.send(Message::Text(text.into())).await?;
            }
        }
    }
}
