//! WebSocket transport pump
//!
//! The pump owns the socket; the client loop only ever sees
//! [`TransportEvent`]s arriving on its queue, in receive order.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, error, info, warn};

use crate::app::ClientEvent;

/// Connection-level events delivered to the client loop
#[derive(Debug)]
pub enum TransportEvent {
    /// Socket established; the join request should be sent
    Opened,
    /// One inbound text frame
    Inbound(String),
    /// Remote or local close; no reconnect is attempted
    Closed,
    /// Connection-level failure
    Failed(String),
}

/// Size of the outbound message queue
const OUTBOUND_QUEUE: usize = 64;

/// Connect to the world server and spawn the read/write pump tasks.
/// Returns the sender for encoded outbound messages.
pub async fn connect(
    url: &str,
    events: mpsc::Sender<ClientEvent>,
) -> anyhow::Result<mpsc::Sender<String>> {
    let (socket, _) = tokio_tungstenite::connect_async(url).await?;
    info!(url = %url, "Connected to world server");

    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);

    // Writer task: encoded client messages -> WebSocket
    tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = sink.send(Message::Text(text)).await {
                debug!(error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader task: WebSocket -> client event queue
    let reader_events = events.clone();
    tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let event = ClientEvent::Transport(TransportEvent::Inbound(text));
                    if reader_events.send(event).await.is_err() {
                        return;
                    }
                }
                Ok(Message::Binary(_)) => {
                    warn!("Received binary message, ignoring");
                }
                Ok(Message::Ping(_)) => {
                    debug!("Received ping");
                }
                Ok(Message::Pong(_)) => {
                    debug!("Received pong");
                }
                Ok(Message::Close(_)) => {
                    info!("Server initiated close");
                    break;
                }
                Ok(Message::Frame(_)) => {}
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    let event = ClientEvent::Transport(TransportEvent::Failed(e.to_string()));
                    let _ = reader_events.send(event).await;
                    break;
                }
            }
        }
        let _ = reader_events
            .send(ClientEvent::Transport(TransportEvent::Closed))
            .await;
    });

    let _ = events
        .send(ClientEvent::Transport(TransportEvent::Opened))
        .await;

    Ok(outbound_tx)
}
