//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::game::PlayerId;
use crate::util::rate_limit::SessionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Per-session connection faults. Each one ends that session only.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("malformed client message: {0}")]
    Malformed(serde_json::Error),

    #[error("failed to encode server message: {0}")]
    Encode(serde_json::Error),

    #[error("websocket transport error: {0}")]
    Transport(#[from] axum::Error),
}

/// A decoded inbound frame
#[derive(Debug, PartialEq)]
pub enum Inbound {
    Command(ClientMsg),
    /// Ping/pong, handled by the transport
    Control,
    Close,
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (ws_sink, ws_stream) = socket.split();
    let (outbox, outbox_rx) = mpsc::channel(state.game_config.outbox_capacity);

    let player_id = state.sessions.connect(outbox);
    let writer = tokio::spawn(run_writer(player_id, ws_sink, outbox_rx));

    serve_session(player_id, ws_stream, writer, &state).await;
}

/// Drive one session until either direction ends, then remove the player
async fn serve_session<S>(
    player_id: PlayerId,
    ws_stream: S,
    mut writer: JoinHandle<()>,
    state: &AppState,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    tokio::select! {
        result = run_reader(player_id, ws_stream, state) => {
            if let Err(e) = result {
                warn!(player_id, error = %e, "Session read loop ended with error");
            }
            writer.abort();
        }
        _ = &mut writer => {
            debug!(player_id, "Session writer finished first");
        }
    }

    state.sessions.disconnect(player_id);
    info!(player_id, "WebSocket connection closed");
}

/// Reader loop: inbound frames -> command processor.
/// A malformed frame ends the loop with an error.
async fn run_reader<S>(
    player_id: PlayerId,
    mut ws_stream: S,
    state: &AppState,
) -> Result<(), WsError>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let rate_limiter = SessionRateLimiter::new(state.config.input_rate_limit);

    while let Some(result) = ws_stream.next().await {
        match decode(result?)? {
            Inbound::Command(msg) => {
                if !rate_limiter.check() {
                    debug!(player_id, ?msg, "Command dropped by rate limit");
                    continue;
                }
                let outcome = state.commands.apply(player_id, msg);
                debug!(player_id, ?msg, ?outcome, "Command processed");
            }
            Inbound::Control => {}
            Inbound::Close => {
                info!(player_id, "Client initiated close");
                break;
            }
        }
    }

    Ok(())
}

/// Writer task: outbox -> WebSocket. Ends when the outbox closes
/// (player removed) or the socket fails.
async fn run_writer(
    player_id: PlayerId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut outbox_rx: mpsc::Receiver<ServerMsg>,
) {
    while let Some(msg) = outbox_rx.recv().await {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            debug!(player_id, error = %e, "WebSocket send failed");
            return;
        }
    }

    debug!(player_id, "Outbox closed");
    let _ = ws_sink.close().await;
}

/// Decode one inbound frame. Text and binary frames must hold a JSON command.
pub fn decode(message: Message) -> Result<Inbound, WsError> {
    match message {
        Message::Text(text) => serde_json::from_str(&text)
            .map(Inbound::Command)
            .map_err(WsError::Malformed),
        Message::Binary(bytes) => serde_json::from_slice(&bytes)
            .map(Inbound::Command)
            .map_err(WsError::Malformed),
        Message::Ping(_) | Message::Pong(_) => Ok(Inbound::Control),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), WsError> {
    let json = serde_json::to_string(msg).map_err(WsError::Encode)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}
