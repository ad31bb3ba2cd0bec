//! # Live Quote Handlers
//!
//! One countdown per connection. The client sends quote inputs, the server
//! prices them immediately, pushes the remaining seconds every tick and
//! re-quotes when the countdown reaches zero.
//!
//! # Message Format
//!
//! Incoming:
//!
//! ```json
//! {"type": "quote", "fromCurrency": "USD", "toCurrency": "USDT-BEP20", "fromAmount": "50", ...}
//! {"type": "refresh"}
//! {"type": "reset"}
//! ```
//!
//! Outgoing:
//!
//! ```json
//! {"type": "quote", "quote": { ... }}
//! {"type": "countdown", "remaining": 12}
//! {"type": "error", "code": "VALIDATION_ERROR", "message": "..."}
//! ```

use crate::api::rest::handlers::{ApiError, ErrorResponse};
use crate::api::state::AppState;
use crate::application::services::{CountdownHandle, spawn_countdown};
use crate::domain::entities::{Quote, QuoteRequest};
use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, Stream, StreamExt, future};
use serde::{Deserialize, Serialize};
use std::pin::pin;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Outgoing buffer per connection.
const OUTGOING_BUFFER: usize = 32;

// ============================================================================
// WebSocket Messages
// ============================================================================

/// Incoming client message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IncomingMessage {
    /// New quote inputs. Prices now and restarts the countdown.
    Quote(QuoteRequest),
    /// Re-quote now and restart the countdown.
    Refresh,
    /// Restart the countdown without re-quoting.
    Reset,
}

/// Outgoing server message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    /// Fresh quote.
    Quote {
        /// The priced quote.
        quote: Box<Quote>,
    },
    /// Seconds until the next re-quote.
    Countdown {
        /// Remaining seconds.
        remaining: u32,
    },
    /// Failed message or quote.
    Error {
        /// Error code.
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

impl OutgoingMessage {
    /// Creates an error message.
    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<ApiError> for OutgoingMessage {
    fn from((_, Json(body)): ApiError) -> Self {
        let ErrorResponse { code, message, .. } = body;
        Self::Error { code, message }
    }
}

// ============================================================================
// WebSocket Handler
// ============================================================================

/// Upgrades `GET /api/quotes/live`.
#[instrument(skip(state, ws))]
pub async fn live_quotes(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Prices the current inputs, if any, and pushes the result.
async fn push_quote(
    state: &AppState,
    inputs: &Mutex<Option<QuoteRequest>>,
    tx: &mpsc::Sender<OutgoingMessage>,
) {
    let Some(request) = inputs.lock().await.clone() else {
        return;
    };
    let message = match state.quotes.execute(&request).await {
        Ok(quote) => OutgoingMessage::Quote {
            quote: Box::new(quote),
        },
        Err(err) => ApiError::from(err).into(),
    };
    let _ = tx.send(message).await;
}

/// Running countdown plus the task forwarding its ticks to the client.
struct LiveCountdown {
    handle: CountdownHandle,
    forwarder: JoinHandle<()>,
}

impl LiveCountdown {
    fn start(
        state: &Arc<AppState>,
        inputs: &Arc<Mutex<Option<QuoteRequest>>>,
        tx: &mpsc::Sender<OutgoingMessage>,
    ) -> Self {
        let handle = {
            let fire_state = Arc::clone(state);
            let inputs = Arc::clone(inputs);
            let tx = tx.clone();
            spawn_countdown(state.quote_refresh_secs, &state.shutdown, move || {
                let state = Arc::clone(&fire_state);
                let inputs = Arc::clone(&inputs);
                let tx = tx.clone();
                async move { push_quote(&state, &inputs, &tx).await }
            })
        };

        // Ends when the countdown stops.
        let mut remaining = handle.subscribe();
        let tx = tx.clone();
        let forwarder = tokio::spawn(async move {
            while remaining.changed().await.is_ok() {
                let value = *remaining.borrow_and_update();
                if tx
                    .send(OutgoingMessage::Countdown { remaining: value })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        Self { handle, forwarder }
    }

    async fn stop(self) {
        self.handle.shutdown().await;
        self.forwarder.abort();
    }
}

/// Drives one live quote session until the client stream ends or the server
/// shuts down.
///
/// `Err` items are protocol errors already rendered for the client and are
/// forwarded as-is. The countdown starts with the first quote inputs.
async fn run_session<S>(state: Arc<AppState>, incoming: S, tx: mpsc::Sender<OutgoingMessage>)
where
    S: Stream<Item = Result<IncomingMessage, OutgoingMessage>>,
{
    let mut incoming = pin!(incoming);
    let inputs: Arc<Mutex<Option<QuoteRequest>>> = Arc::new(Mutex::new(None));
    let mut live: Option<LiveCountdown> = None;

    loop {
        let next = tokio::select! {
            () = state.shutdown.cancelled() => break,
            next = incoming.next() => next,
        };
        let Some(message) = next else { break };

        match message {
            Ok(IncomingMessage::Quote(request)) => {
                debug!(
                    from = %request.from_currency,
                    to = %request.to_currency,
                    "inputs changed"
                );
                *inputs.lock().await = Some(request);
                let countdown =
                    live.get_or_insert_with(|| LiveCountdown::start(&state, &inputs, &tx));
                countdown.handle.refresh().await;
            }
            Ok(IncomingMessage::Refresh) => match &live {
                Some(countdown) => {
                    countdown.handle.refresh().await;
                }
                None => debug!("refresh before any inputs"),
            },
            Ok(IncomingMessage::Reset) => match &live {
                Some(countdown) => {
                    countdown.handle.reset().await;
                }
                None => debug!("reset before any inputs"),
            },
            Err(reply) => {
                let _ = tx.send(reply).await;
            }
        }
    }

    if let Some(countdown) = live {
        countdown.stop().await;
    }
}

/// Decodes a socket frame. `None` skips the frame.
fn decode_frame(frame: Message) -> Option<Result<IncomingMessage, OutgoingMessage>> {
    match frame {
        Message::Text(text) => Some(serde_json::from_str(&text).map_err(|e| {
            OutgoingMessage::error("VALIDATION_ERROR", format!("invalid message: {e}"))
        })),
        Message::Binary(_) => Some(Err(OutgoingMessage::error(
            "VALIDATION_ERROR",
            "binary messages not supported",
        ))),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
    }
}

/// Returns false once the client has closed or the socket failed.
fn is_open(frame: &Result<Message, axum::Error>) -> bool {
    match frame {
        Ok(Message::Close(_)) => {
            debug!("client requested close");
            false
        }
        Ok(_) => true,
        Err(e) => {
            error!(error = %e, "live quote socket error");
            false
        }
    }
}

/// Handles an established connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("live quote connection opened");

    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<OutgoingMessage>(OUTGOING_BUFFER);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg)
                && sender.send(Message::Text(json.into())).await.is_err()
            {
                break;
            }
        }
    });

    let incoming = receiver
        .take_while(|frame| future::ready(is_open(frame)))
        .filter_map(|frame| future::ready(frame.ok().and_then(decode_frame)));
    run_session(state, incoming, tx).await;

    send_task.abort();
    info!("live quote connection closed");
}
