use crate::error::ClientError;
use crate::transport::SignalingTransport;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientEvent, Nickname, RoomId, ServerEvent};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connection to the relay.
///
/// Outgoing events are queued on an unbounded channel and written by a
/// background task; incoming frames are parsed into [`ServerEvent`]s and
/// handed back through the receiver returned by [`RelayClient::connect`].
#[derive(Clone)]
pub struct RelayClient {
    outgoing: mpsc::UnboundedSender<Message>,
}

impl RelayClient {
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), ClientError> {
        let (ws_stream, _) = connect_async(url).await?;
        info!("Connected to relay at {}", url);

        let (write, read) = ws_stream.split();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        tokio::spawn(write_loop(write, outgoing_rx));
        tokio::spawn(read_loop(read, incoming_tx));

        Ok((
            Self {
                outgoing: outgoing_tx,
            },
            incoming_rx,
        ))
    }

    pub fn join_room(&self, room_id: RoomId, nickname: Nickname) -> Result<(), ClientError> {
        self.send(ClientEvent::JoinRoom { room_id, nickname })
    }

    pub fn send_message(
        &self,
        room_id: RoomId,
        nickname: Nickname,
        content: impl Into<String>,
        font_family: Option<String>,
    ) -> Result<(), ClientError> {
        self.send(ClientEvent::SendMessage {
            room_id,
            nickname,
            content: content.into(),
            font_family,
        })
    }

    pub fn change_nickname(
        &self,
        room_id: RoomId,
        old_nickname: Nickname,
        new_nickname: Nickname,
    ) -> Result<(), ClientError> {
        self.send(ClientEvent::ChangeNickname {
            room_id,
            old_nickname,
            new_nickname,
        })
    }

    /// Sends a close frame; the background tasks end when the server answers.
    pub fn close(&self) {
        let _ = self.outgoing.send(Message::Close(None));
    }
}

impl SignalingTransport for RelayClient {
    fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        let json = serde_json::to_string(&event)?;
        self.outgoing
            .send(Message::Text(json.into()))
            .map_err(|_| ClientError::TransportClosed)
    }
}

async fn write_loop(
    mut write: SplitSink<WsStream, Message>,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = outgoing.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if let Err(e) = write.send(msg).await {
            warn!("Relay write failed: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
    debug!("Relay writer stopped");
}

async fn read_loop(mut read: SplitStream<WsStream>, incoming: mpsc::UnboundedSender<ServerEvent>) {
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                Ok(event) => {
                    if incoming.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Ignoring unreadable relay frame: {}", e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Relay read failed: {}", e);
                break;
            }
        }
    }
    info!("Relay connection closed");
}
