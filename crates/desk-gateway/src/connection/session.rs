//! Gateway session
//!
//! One WebSocket connection from HELLO to close. The session never resumes;
//! whoever runs it identifies again on a fresh connection.

use std::sync::Arc;
use std::time::Duration;

use desk_common::{AppError, AppResult};
use desk_core::DeskEvent;
use desk_service::{DeskContext, DeskEventService};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument, trace, warn};

use super::heartbeat::{first_beat_delay, HeartbeatState};
use crate::events::EventDecoder;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload, IdentifyPayload, OpCode};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 16;

/// How long the server has to send HELLO after the handshake
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

/// Map a close code to the error ending the session
pub fn close_error(code: u16, reason: &str) -> AppError {
    let known = CloseCode::from_u16(code);
    let reason = match known {
        Some(known) if reason.is_empty() => known.description().to_string(),
        _ => reason.to_string(),
    };

    if known.is_some_and(|c| !c.should_reconnect()) {
        AppError::FatalClose { code, reason }
    } else {
        AppError::GatewayClosed { code, reason }
    }
}

fn close_frame_error(frame: Option<CloseFrame<'_>>) -> AppError {
    match frame {
        Some(frame) => close_error(u16::from(frame.code), &frame.reason),
        None => AppError::gateway("connection closed without a close frame"),
    }
}

/// A single gateway connection
pub struct GatewaySession<'a> {
    url: &'a str,
    token: &'a str,
    ctx: &'a DeskContext,
    decoder: &'a EventDecoder,
}

impl<'a> GatewaySession<'a> {
    pub fn new(url: &'a str, token: &'a str, ctx: &'a DeskContext, decoder: &'a EventDecoder) -> Self {
        Self {
            url,
            token,
            ctx,
            decoder,
        }
    }

    /// Connect, identify and process dispatches until the connection ends
    ///
    /// `Ok(())` means the stream ended without a close frame.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn run(&self) -> AppResult<()> {
        let (ws_stream, _) = connect_async(self.url).await.map_err(AppError::gateway)?;
        info!("Connected to gateway");

        let (sink, mut stream) = ws_stream.split();
        let hello = timeout(HELLO_TIMEOUT, wait_for_hello(&mut stream))
            .await
            .map_err(|_| AppError::gateway("no Hello received"))??;
        let interval = Duration::from_millis(hello.heartbeat_interval);
        debug!(heartbeat_interval_ms = hello.heartbeat_interval, "Received Hello");

        let heartbeat = Arc::new(HeartbeatState::new());
        let (tx, rx) = mpsc::channel::<GatewayMessage>(MESSAGE_BUFFER_SIZE);

        let mut send_task = tokio::spawn(send_loop(sink, rx));
        let mut heartbeat_task = tokio::spawn(heartbeat_loop(interval, heartbeat.clone(), tx.clone()));

        let result = tokio::select! {
            result = self.receive(&mut stream, &tx, &heartbeat) => result,
            _ = &mut heartbeat_task => Err(AppError::gateway("heartbeat not acknowledged")),
            _ = &mut send_task => Err(AppError::gateway("connection lost while sending")),
        };

        heartbeat_task.abort();
        send_task.abort();
        result
    }

    async fn receive(
        &self,
        stream: &mut SplitStream<WsStream>,
        tx: &mpsc::Sender<GatewayMessage>,
        heartbeat: &HeartbeatState,
    ) -> AppResult<()> {
        let identify = GatewayMessage::identify(&IdentifyPayload::new(self.token)).map_err(AppError::internal)?;
        send(tx, identify).await?;
        debug!("Identify sent");

        while let Some(frame) = stream.next().await {
            match frame.map_err(AppError::gateway)? {
                Message::Text(text) => match GatewayMessage::from_json(&text) {
                    Ok(message) => self.on_message(message, tx, heartbeat).await?,
                    Err(e) => warn!(error = %e, "Undecodable gateway frame"),
                },
                Message::Close(frame) => return Err(close_frame_error(frame)),
                Message::Binary(_) => debug!("Ignoring binary frame"),
                _ => {}
            }
        }
        Ok(())
    }

    async fn on_message(
        &self,
        message: GatewayMessage,
        tx: &mpsc::Sender<GatewayMessage>,
        heartbeat: &HeartbeatState,
    ) -> AppResult<()> {
        trace!(message = %message, "Received message");

        match message.op {
            OpCode::Dispatch => {
                let GatewayMessage { t, s, d, .. } = message;
                if let Some(sequence) = s {
                    heartbeat.record_sequence(sequence);
                }
                let Some(event_type) = t else {
                    return Ok(());
                };
                match self.decoder.decode(&event_type, d) {
                    Ok(Some(event)) => self.dispatch(event),
                    Ok(None) => {}
                    Err(e) => warn!(event = %event_type, error = %e, "Failed to decode dispatch"),
                }
            }
            OpCode::Heartbeat => send(tx, GatewayMessage::heartbeat(heartbeat.last_sequence())).await?,
            OpCode::HeartbeatAck => heartbeat.ack(),
            OpCode::Reconnect => return Err(AppError::gateway("server requested a reconnect")),
            OpCode::InvalidSession => {
                return Err(AppError::gateway(format!(
                    "session invalidated (resumable: {})",
                    message.is_resumable()
                )));
            }
            other => debug!(op = %other, "Unexpected op code"),
        }
        Ok(())
    }

    /// Hand a decoded event to the service layer
    ///
    /// READY resets all shared state, so it runs inline before any later
    /// dispatch is spawned. Everything else runs on its own task.
    fn dispatch(&self, event: DeskEvent) {
        if let DeskEvent::Ready { bot_user } = &event {
            DeskEventService::new(self.ctx).on_ready(bot_user);
            return;
        }

        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            DeskEventService::new(&ctx).handle(event).await;
        });
    }
}

async fn wait_for_hello(stream: &mut SplitStream<WsStream>) -> AppResult<HelloPayload> {
    while let Some(frame) = stream.next().await {
        match frame.map_err(AppError::gateway)? {
            Message::Text(text) => {
                let message = GatewayMessage::from_json(&text).map_err(AppError::gateway)?;
                return message
                    .as_hello()
                    .ok_or_else(|| AppError::gateway(format!("expected Hello, got {message}")));
            }
            Message::Close(frame) => return Err(close_frame_error(frame)),
            _ => {}
        }
    }
    Err(AppError::gateway("connection closed before Hello"))
}

async fn send(tx: &mpsc::Sender<GatewayMessage>, message: GatewayMessage) -> AppResult<()> {
    tx.send(message)
        .await
        .map_err(|_| AppError::gateway("send task stopped"))
}

async fn send_loop(mut sink: SplitSink<WsStream, Message>, mut rx: mpsc::Receiver<GatewayMessage>) {
    while let Some(msg) = rx.recv().await {
        let json = match msg.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, op = %msg.op, "Failed to serialize message");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(json.into())).await {
            warn!(error = %e, "Failed to send message to gateway");
            break;
        }
    }

    let _ = sink.close().await;
}

/// Beat every `interval` until a beat goes unacknowledged
async fn heartbeat_loop(interval: Duration, state: Arc<HeartbeatState>, tx: mpsc::Sender<GatewayMessage>) {
    sleep(first_beat_delay(interval)).await;

    loop {
        if !state.take_ack() {
            warn!("Heartbeat not acknowledged, connection zombied");
            break;
        }
        if tx.send(GatewayMessage::heartbeat(state.last_sequence())).await.is_err() {
            break;
        }
        trace!(sequence = ?state.last_sequence(), "Heartbeat sent");
        sleep(interval).await;
    }
}
