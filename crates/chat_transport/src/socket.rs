//! Session WebSocket channel.
//!
//! Each connection attempt runs on its own task and reports through a shared
//! event sender. Every event carries the session id it was opened for so the
//! receiver can drop events from a connection it has already abandoned.

use chat_protocol::OutboundMessage;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::url::ws_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    Opened,
    /// Raw text frame; decoding is left to the receiver.
    Message(String),
    /// Always followed by [`TransportEventKind::Closed`].
    Errored(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub session_id: String,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn new(session_id: impl Into<String>, kind: TransportEventKind) -> Self {
        Self {
            session_id: session_id.into(),
            kind,
        }
    }
}

/// Handle to one connection attempt.
///
/// Dropping the handle (or calling [`ChatSocket::close`]) ends the outbound
/// side; the task then closes the socket and reports `Closed`.
#[derive(Debug)]
pub struct ChatSocket {
    session_id: String,
    outbound: mpsc::UnboundedSender<String>,
}

impl ChatSocket {
    /// Starts connecting to `<base_url>/ws/<session_id>` on the current
    /// runtime. Connection progress is reported on `events`.
    pub fn connect(
        base_url: &str,
        session_id: impl Into<String>,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let session_id = session_id.into();
        let url = ws_url(base_url, &session_id)?;
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(
            url.to_string(),
            session_id.clone(),
            outbound_rx,
            events,
        ));
        Ok(Self { session_id, outbound })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queues one outbound message on the open channel.
    pub fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let text = message.to_json()?;
        self.outbound
            .send(text)
            .map_err(|_| TransportError::ChannelClosed)
    }

    pub fn close(self) {
        drop(self.outbound);
    }
}

async fn run_connection(
    url: String,
    session_id: String,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let emit = |kind: TransportEventKind| {
        let _ = events.send(TransportEvent::new(session_id.clone(), kind));
    };

    let mut ws = match connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(err) => {
            warn!(session_id = %session_id, "connect_error: {err}");
            emit(TransportEventKind::Errored(err.to_string()));
            emit(TransportEventKind::Closed);
            return;
        }
    };
    debug!(session_id = %session_id, "channel open");
    emit(TransportEventKind::Opened);

    loop {
        tokio::select! {
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => emit(TransportEventKind::Message(text)),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(session_id = %session_id, "channel_error: {err}");
                    emit(TransportEventKind::Errored(err.to_string()));
                    break;
                }
            },
            command = outbound.recv() => match command {
                Some(text) => {
                    if let Err(err) = ws.send(Message::Text(text)).await {
                        warn!(session_id = %session_id, "send_error: {err}");
                        emit(TransportEventKind::Errored(err.to_string()));
                        break;
                    }
                }
                None => {
                    debug!(session_id = %session_id, "channel closed by client");
                    break;
                }
            },
        }
    }

    let _ = ws.close(None).await;
    emit(TransportEventKind::Closed);
}
