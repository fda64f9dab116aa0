//! Async client for the Word Rush game protocol.
//!
//! [`WordRushClient`] is a thin handle that communicates with a background
//! transport loop task via an unbounded MPSC channel. Events are emitted on a
//! bounded channel ([`tokio::sync::mpsc::Receiver<WordRushEvent>`]) returned
//! from [`WordRushClient::start`].
//!
//! The loop is the only place canonical state is mutated: every inbound push
//! runs through [`MatchState::apply`] to completion before the next message
//! is processed, so no locking discipline is needed beyond the state mutex.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = WordRushConfig::new().with_endpoint("ws://localhost:4560/ws");
//! let (client, mut events) = WordRushClient::establish(config).await?;
//!
//! let ack = client.create_room("Ann").await?;
//! if ack.ok {
//!     println!("room code: {:?}", client.match_state().await.room_code);
//! }
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         WordRushEvent::CountdownTick { remaining_ms, .. } => { /* … */ }
//!         WordRushEvent::Disconnected { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::clock::{self, Urgency, DEFAULT_COUNTDOWN_POLL_INTERVAL};
use crate::error::{Result, WordRushError};
use crate::event::WordRushEvent;
use crate::feedback::{GuessFeedback, TransientSlot, COPY_NOTICE_TTL, GUESS_FEEDBACK_TTL};
use crate::protocol::{
    ClientCommand, CommandAck, CommandEnvelope, GuessOutcome, PlayerId, PlayerInfo, RoomStatus,
    RoundInfo, ServerEvent,
};
use crate::state::MatchState;
use crate::transport::Transport;
use crate::views;

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// The one service-status value that keeps room creation and joining enabled.
/// Any other value puts the client into maintenance mode.
pub const SERVICE_STATUS_ONLINE: &str = "online";

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`WordRushClient`] connection.
///
/// Supplied at process start and never user-editable afterwards. All fields
/// have defaults; a missing `endpoint` is a fatal condition for
/// [`WordRushClient::establish`] — the connection is never attempted and
/// [`WordRushError::MissingEndpoint`] is returned for the UI to surface
/// permanently.
///
/// # Example
///
/// ```
/// use word_rush_client::client::WordRushConfig;
///
/// let config = WordRushConfig::new()
///     .with_endpoint("wss://play.wordrush.io/ws")
///     .with_invite_origin("https://play.wordrush.io");
/// assert!(!config.maintenance_mode());
/// ```
#[derive(Debug, Clone)]
pub struct WordRushConfig {
    /// Transport endpoint URL. `None` blocks all connection attempts.
    pub endpoint: Option<String>,
    /// Deployment status flag. Anything other than
    /// [`SERVICE_STATUS_ONLINE`] disables room creation and joining.
    pub service_status: String,
    /// Access origin used to build shareable invite links.
    pub invite_origin: String,
    /// Capacity of the bounded event channel.
    ///
    /// When the consumer cannot keep up with incoming server events, events
    /// are dropped (with a warning logged) to avoid blocking the transport
    /// loop. The `Disconnected` event is always delivered regardless of
    /// capacity.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Timeout for the graceful shutdown.
    ///
    /// When [`WordRushClient::shutdown`] is called, the background transport
    /// loop is given this much time to close the transport and emit a final
    /// `Disconnected` event. If the timeout expires the task is aborted.
    ///
    /// Defaults to **1 second**.
    pub shutdown_timeout: Duration,
    /// Polling cadence of the locally reconciled round countdown.
    ///
    /// Defaults to **250 ms**.
    pub countdown_poll_interval: Duration,
}

impl WordRushConfig {
    /// Create a configuration with default values and no endpoint.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            service_status: SERVICE_STATUS_ONLINE.to_string(),
            invite_origin: String::new(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            countdown_poll_interval: DEFAULT_COUNTDOWN_POLL_INTERVAL,
        }
    }

    /// Set the transport endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the deployment service-status flag.
    #[must_use]
    pub fn with_service_status(mut self, status: impl Into<String>) -> Self {
        self.service_status = status.into();
        self
    }

    /// Set the access origin used for invite links.
    #[must_use]
    pub fn with_invite_origin(mut self, origin: impl Into<String>) -> Self {
        self.invite_origin = origin.into();
        self
    }

    /// Set the capacity of the bounded event channel.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Set the polling cadence of the round countdown.
    #[must_use]
    pub fn with_countdown_poll_interval(mut self, interval: Duration) -> Self {
        self.countdown_poll_interval = interval;
        self
    }

    /// Whether the status flag disables room creation and joining.
    pub fn maintenance_mode(&self) -> bool {
        self.service_status != SERVICE_STATUS_ONLINE
    }
}

impl Default for WordRushConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── Shared state ────────────────────────────────────────────────────

/// Internal shared state between the client handle and the transport loop.
struct ClientShared {
    connected: AtomicBool,
    /// Single-flight guard for acknowledgement-requiring commands.
    busy: AtomicBool,
    joined: AtomicBool,
    player_id: Mutex<Option<PlayerId>>,
    /// Most recent dismissable error message (command rejection or server
    /// error push). Purely local; never part of the authoritative model.
    last_error: Mutex<Option<String>>,
    match_state: Mutex<MatchState>,
    guess_feedback: TransientSlot<GuessFeedback>,
    copy_notice: TransientSlot<String>,
}

impl ClientShared {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            busy: AtomicBool::new(false),
            joined: AtomicBool::new(false),
            player_id: Mutex::new(None),
            last_error: Mutex::new(None),
            match_state: Mutex::new(MatchState::default()),
            guess_feedback: TransientSlot::new(),
            copy_notice: TransientSlot::new(),
        }
    }
}

/// Commands from the handle to the transport loop.
enum LoopCommand {
    /// Fire-and-forget, no acknowledgement expected.
    Fire(ClientCommand),
    /// Acknowledgement-requiring; the loop assigns the `seq` and resolves
    /// the oneshot when the matching `command-ack` arrives.
    Request(ClientCommand, oneshot::Sender<CommandAck>),
}

/// The in-flight acknowledgement, if any. At most one exists at a time —
/// the handle-side busy guard enforces single flight.
struct PendingRequest {
    seq: u64,
    ack_tx: oneshot::Sender<CommandAck>,
}

// ── Client handle ───────────────────────────────────────────────────

/// Async client handle for the Word Rush game protocol.
///
/// Created via [`WordRushClient::start`] (any transport) or
/// [`WordRushClient::establish`] (WebSocket from the configured endpoint).
/// Both spawn a background transport loop and return this handle together
/// with an event receiver.
///
/// Acknowledgement-requiring commands are async and single-flight: while one
/// is outstanding, further ones fail fast with
/// [`WordRushError::CommandInFlight`]. [`submit_guess`](Self::submit_guess)
/// is fire-and-forget and exempt from the guard.
pub struct WordRushClient {
    /// Sender half of the command channel to the transport loop.
    cmd_tx: mpsc::UnboundedSender<LoopCommand>,
    /// Shared state updated by the transport loop.
    shared: Arc<ClientShared>,
    /// Snapshot of the config's maintenance flag.
    maintenance: bool,
    /// Access origin for invite links.
    invite_origin: String,
    /// Handle to the background transport loop task.
    task: Option<JoinHandle<()>>,
    /// Oneshot sender to signal the transport loop to shut down gracefully.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Timeout for the graceful shutdown.
    shutdown_timeout: Duration,
}

impl WordRushClient {
    /// Start the client transport loop and return a handle plus event receiver.
    ///
    /// # Arguments
    ///
    /// * `transport` — A connected [`Transport`] implementation.
    /// * `config` — Client configuration.
    ///
    /// # Returns
    ///
    /// A tuple of `(client_handle, event_receiver)`. The event receiver
    /// yields [`WordRushEvent`]s until the transport closes or the client
    /// shuts down.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start(
        transport: impl Transport,
        config: WordRushConfig,
    ) -> (Self, mpsc::Receiver<WordRushEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<LoopCommand>();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<WordRushEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let shared = Arc::new(ClientShared::new());
        let loop_shared = Arc::clone(&shared);

        let task = tokio::spawn(transport_loop(
            transport,
            cmd_rx,
            event_tx,
            loop_shared,
            shutdown_rx,
            config.countdown_poll_interval,
        ));

        let client = Self {
            cmd_tx,
            shared,
            maintenance: config.maintenance_mode(),
            invite_origin: config.invite_origin,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (client, event_rx)
    }

    /// Connect to the configured endpoint over WebSocket and start the client.
    ///
    /// # Errors
    ///
    /// Returns [`WordRushError::MissingEndpoint`] without attempting any
    /// connection when no endpoint is configured — a fatal deployment
    /// condition, not a retryable failure — or any error from
    /// [`WebSocketTransport::connect`](crate::transports::WebSocketTransport::connect).
    #[cfg(feature = "transport-websocket")]
    pub async fn establish(
        config: WordRushConfig,
    ) -> Result<(Self, mpsc::Receiver<WordRushEvent>)> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or(WordRushError::MissingEndpoint)?;
        let transport = crate::transports::WebSocketTransport::connect(&endpoint).await?;
        Ok(Self::start(transport, config))
    }

    // ── Command gateway ─────────────────────────────────────────────

    /// Create a new room and join it as host.
    ///
    /// On `ok: true` the acknowledgement carries the assigned player id and
    /// the client records it (`is_joined` becomes `true`).
    ///
    /// # Errors
    ///
    /// [`WordRushError::Maintenance`] when the service-status flag disables
    /// room creation; [`WordRushError::InvalidInput`] for an empty nickname.
    /// Both short-circuit before any transport call.
    pub async fn create_room(&self, nickname: &str) -> Result<CommandAck> {
        self.check_open_for_rooms().await?;
        let nickname = self.required(nickname, "Please enter a nickname.").await?;
        self.request(ClientCommand::CreateRoom { nickname }).await
    }

    /// Join an existing room by code.
    ///
    /// # Errors
    ///
    /// Same local preconditions as [`create_room`](Self::create_room), plus
    /// [`WordRushError::InvalidInput`] for an empty room code.
    pub async fn join_room(&self, room_code: &str, nickname: &str) -> Result<CommandAck> {
        self.check_open_for_rooms().await?;
        let room_code = self.required(room_code, "Please enter a room code.").await?;
        let nickname = self.required(nickname, "Please enter a nickname.").await?;
        self.request(ClientCommand::JoinRoom {
            room_code,
            nickname,
        })
        .await
    }

    /// Start the match. The server enforces that only the host may do this.
    ///
    /// # Errors
    ///
    /// Returns [`WordRushError::NotConnected`], [`WordRushError::CommandInFlight`],
    /// or [`WordRushError::CommandInterrupted`].
    pub async fn start_match(&self) -> Result<CommandAck> {
        self.request(ClientCommand::StartMatch).await
    }

    /// End the match early. The server enforces that only the host may do this.
    ///
    /// # Errors
    ///
    /// Same conditions as [`start_match`](Self::start_match).
    pub async fn end_match(&self) -> Result<CommandAck> {
        self.request(ClientCommand::EndMatch).await
    }

    /// Return a finished room to the lobby for a replay. The room leaves
    /// `finished` only when the subsequent lobby snapshot arrives.
    ///
    /// # Errors
    ///
    /// Same conditions as [`start_match`](Self::start_match).
    pub async fn reset_for_replay(&self) -> Result<CommandAck> {
        self.request(ClientCommand::ResetForReplay).await
    }

    /// Submit a guess for the current round.
    ///
    /// Fire-and-forget to keep guess latency minimal: no acknowledgement,
    /// and the single-flight guard does not apply. The outcome arrives as a
    /// `guess-result` push and lands in [`guess_feedback`](Self::guess_feedback).
    ///
    /// # Errors
    ///
    /// Returns [`WordRushError::NotConnected`] if the transport has closed,
    /// or [`WordRushError::InvalidInput`] for an empty guess.
    pub fn submit_guess(&self, guess: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(WordRushError::NotConnected);
        }
        let guess = guess.trim();
        if guess.is_empty() {
            return Err(WordRushError::InvalidInput(
                "Please type a guess.".to_string(),
            ));
        }
        self.cmd_tx
            .send(LoopCommand::Fire(ClientCommand::SubmitGuess {
                guess: guess.to_string(),
            }))
            .map_err(|_| WordRushError::NotConnected)
    }

    /// Shut down the client, closing the transport and stopping the
    /// background task. Idempotent.
    ///
    /// After calling this method, the event receiver will yield `None` once
    /// the transport loop exits. All outstanding timers (round countdown,
    /// feedback expiries) are cancelled.
    pub async fn shutdown(&mut self) {
        debug!("WordRushClient: shutdown requested");

        // Signal the transport loop to shut down gracefully.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the transport loop with a timeout. If it doesn't exit in
        // time, abort it so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("transport loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("transport loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("transport loop aborted: {join_err}");
                    }
                }
            }
        }

        self.shared.connected.store(false, Ordering::Release);
        self.shared.busy.store(false, Ordering::Release);
        self.shared.guess_feedback.clear();
        self.shared.copy_notice.clear();
    }

    // ── State accessors ─────────────────────────────────────────────

    /// Returns `true` if the transport is believed to be connected.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// Returns `true` while an acknowledgement-requiring command is in flight.
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    /// Returns `true` once a create/join acknowledgement assigned a player id.
    pub fn is_joined(&self) -> bool {
        self.shared.joined.load(Ordering::Acquire)
    }

    /// Whether the deployment's status flag disables room creation/joining.
    pub fn maintenance_mode(&self) -> bool {
        self.maintenance
    }

    /// This player's id, once assigned by the server.
    pub async fn player_id(&self) -> Option<PlayerId> {
        *self.shared.player_id.lock().await
    }

    /// Most recent dismissable error message, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.shared.last_error.lock().await.clone()
    }

    /// Dismiss the current error message.
    pub async fn clear_last_error(&self) {
        *self.shared.last_error.lock().await = None;
    }

    /// A clone of the canonical match state.
    pub async fn match_state(&self) -> MatchState {
        self.shared.match_state.lock().await.clone()
    }

    // ── Derived views ───────────────────────────────────────────────

    /// Players sorted by score descending, stable on ties. Recomputed from
    /// canonical state on every call.
    pub async fn leaderboard(&self) -> Vec<PlayerInfo> {
        let state = self.shared.match_state.lock().await;
        views::leaderboard(&state.players)
    }

    /// The masked display pattern with the locally typed guess overlaid, or
    /// `None` when no round is active. Cosmetic only — never transmitted.
    pub async fn guess_preview(&self, typed: &str) -> Option<String> {
        let state = self.shared.match_state.lock().await;
        state
            .round
            .as_ref()
            .map(|round| views::guess_preview(&round.display, typed))
    }

    /// Shareable invite link; empty until a room code is known.
    pub async fn invite_link(&self) -> String {
        let state = self.shared.match_state.lock().await;
        views::invite_link(&self.invite_origin, state.room_code.as_deref())
    }

    // ── Transient feedback ──────────────────────────────────────────

    /// The guess-result feedback slot. Values expire on their own; subscribe
    /// to re-render on transitions.
    pub fn guess_feedback(&self) -> TransientSlot<GuessFeedback> {
        self.shared.guess_feedback.clone()
    }

    /// The invite-copy confirmation slot.
    pub fn copy_notice(&self) -> TransientSlot<String> {
        self.shared.copy_notice.clone()
    }

    /// Record that the invite link was copied; shows a self-expiring notice.
    pub fn mark_invite_copied(&self) {
        self.shared
            .copy_notice
            .set("Invite link copied!".to_string(), COPY_NOTICE_TTL);
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Maintenance-mode gate for room creation/joining.
    async fn check_open_for_rooms(&self) -> Result<()> {
        if self.maintenance {
            let err = WordRushError::Maintenance;
            *self.shared.last_error.lock().await = Some(err.to_string());
            return Err(err);
        }
        Ok(())
    }

    /// Trim `value` and fail with a local validation error when empty.
    async fn required(&self, value: &str, message: &str) -> Result<String> {
        let value = value.trim();
        if value.is_empty() {
            *self.shared.last_error.lock().await = Some(message.to_string());
            return Err(WordRushError::InvalidInput(message.to_string()));
        }
        Ok(value.to_string())
    }

    /// Send an acknowledgement-requiring command and await its ack.
    ///
    /// # Errors
    ///
    /// [`WordRushError::NotConnected`] if the transport has closed,
    /// [`WordRushError::CommandInFlight`] while another request is
    /// outstanding, and [`WordRushError::CommandInterrupted`] when the guard
    /// was released before the ack arrived (server error push, disconnect).
    ///
    /// An `ok: false` acknowledgement is NOT an `Err` — it is returned as an
    /// inspectable value, with its message recorded as the last error.
    async fn request(&self, command: ClientCommand) -> Result<CommandAck> {
        if !self.is_connected() {
            return Err(WordRushError::NotConnected);
        }
        if self
            .shared
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WordRushError::CommandInFlight);
        }

        let (ack_tx, ack_rx) = oneshot::channel::<CommandAck>();
        if self
            .cmd_tx
            .send(LoopCommand::Request(command, ack_tx))
            .is_err()
        {
            self.shared.busy.store(false, Ordering::Release);
            return Err(WordRushError::NotConnected);
        }

        match ack_rx.await {
            Ok(ack) => {
                if !ack.ok {
                    let message = ack
                        .message
                        .clone()
                        .unwrap_or_else(|| "The request was rejected.".to_string());
                    *self.shared.last_error.lock().await = Some(message);
                }
                Ok(ack)
            }
            // The loop dropped the pending ack: server error push or
            // disconnect released the guard while we were waiting.
            Err(_) => Err(WordRushError::CommandInterrupted),
        }
    }
}

impl std::fmt::Debug for WordRushClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordRushClient")
            .field("connected", &self.is_connected())
            .field("busy", &self.is_busy())
            .field("joined", &self.is_joined())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for WordRushClient {
    fn drop(&mut self) {
        // `Drop` is synchronous so we cannot await a graceful shutdown.
        // The only safe action is to abort the spawned task, which causes
        // the transport loop future to be dropped immediately. The
        // `shutdown_tx` oneshot is intentionally *not* sent here: sending it
        // would trigger a graceful path that calls async `transport.close()`,
        // but there is no executor context to drive it inside `Drop`.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Transport loop ──────────────────────────────────────────────────

/// Background transport loop that multiplexes send/receive via `tokio::select!`.
///
/// Exits when:
/// - The command channel closes (client handle dropped or shutdown called)
/// - The transport returns `None` (server closed connection)
/// - A transport error occurs
async fn transport_loop(
    mut transport: impl Transport,
    mut cmd_rx: mpsc::UnboundedReceiver<LoopCommand>,
    event_tx: mpsc::Sender<WordRushEvent>,
    shared: Arc<ClientShared>,
    mut shutdown_rx: oneshot::Receiver<()>,
    poll_interval: Duration,
) {
    debug!("transport loop started");

    // Emit the synthetic Connected event before entering the select loop.
    emit_event(&event_tx, WordRushEvent::Connected).await;

    let mut next_seq: u64 = 0;
    let mut pending: Option<PendingRequest> = None;
    let mut countdown: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            // Branch 1: outgoing command from the client handle
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(LoopCommand::Fire(command)) => {
                        if let Err(e) = send_command(&mut transport, None, command).await {
                            error!("transport send error: {e}");
                            emit_disconnected(
                                &event_tx,
                                &shared,
                                Some(format!("transport send error: {e}")),
                            ).await;
                            break;
                        }
                    }
                    Some(LoopCommand::Request(command, ack_tx)) => {
                        next_seq += 1;
                        // The handle-side busy guard means at most one
                        // request is ever in flight; a stale entry here is a
                        // defect and its caller gets CommandInterrupted.
                        if pending.replace(PendingRequest { seq: next_seq, ack_tx }).is_some() {
                            warn!("replacing stale pending request");
                        }
                        if let Err(e) = send_command(&mut transport, Some(next_seq), command).await {
                            error!("transport send error: {e}");
                            pending = None;
                            emit_disconnected(
                                &event_tx,
                                &shared,
                                Some(format!("transport send error: {e}")),
                            ).await;
                            break;
                        }
                    }
                    // Command channel closed — client handle dropped.
                    None => {
                        debug!("command channel closed, shutting down transport loop");
                        let _ = transport.close().await;
                        emit_disconnected(&event_tx, &shared, Some("client shut down".into())).await;
                        break;
                    }
                }
            }

            // Branch 2: shutdown signal
            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                let _ = transport.close().await;
                emit_disconnected(&event_tx, &shared, Some("client shut down".into())).await;
                break;
            }

            // Branch 3: incoming event from the server
            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(server_event) => {
                                handle_server_event(
                                    server_event,
                                    &shared,
                                    &event_tx,
                                    &mut pending,
                                    &mut countdown,
                                    poll_interval,
                                ).await;
                            }
                            Err(e) => {
                                warn!("failed to deserialize server event: {e} — raw: {text}");
                            }
                        }
                    }
                    Some(Err(e)) => {
                        error!("transport receive error: {e}");
                        emit_disconnected(
                            &event_tx,
                            &shared,
                            Some(format!("transport receive error: {e}")),
                        ).await;
                        break;
                    }
                    // Transport closed cleanly.
                    None => {
                        debug!("transport closed by server");
                        emit_disconnected(&event_tx, &shared, None).await;
                        break;
                    }
                }
            }
        }
    }

    // Teardown: no timer may outlive the loop; dropping a dangling pending
    // ack resolves its caller with CommandInterrupted.
    cancel_countdown(&mut countdown);
    drop(pending);

    debug!("transport loop exited");
}

/// Serialize and send one command envelope.
async fn send_command(
    transport: &mut impl Transport,
    seq: Option<u64>,
    command: ClientCommand,
) -> Result<()> {
    debug!(
        "sending client command: {:?}",
        std::mem::discriminant(&command)
    );
    let envelope = CommandEnvelope { seq, command };
    match serde_json::to_string(&envelope) {
        Ok(json) => transport.send(json).await,
        Err(e) => {
            // Serialization errors are programming bugs; don't kill the loop.
            error!("failed to serialize ClientCommand: {e}");
            Ok(())
        }
    }
}

/// Apply one inbound server event: resolve acks, update canonical state,
/// manage the countdown task, route guess feedback, forward the event.
async fn handle_server_event(
    event: ServerEvent,
    shared: &Arc<ClientShared>,
    event_tx: &mpsc::Sender<WordRushEvent>,
    pending: &mut Option<PendingRequest>,
    countdown: &mut Option<JoinHandle<()>>,
    poll_interval: Duration,
) {
    match &event {
        ServerEvent::CommandAck {
            seq,
            ok,
            message,
            player_id,
        } => {
            // The ack ends the in-flight request, success or rejection alike.
            shared.busy.store(false, Ordering::Release);
            if *ok {
                if let Some(id) = player_id {
                    *shared.player_id.lock().await = Some(*id);
                    shared.joined.store(true, Ordering::Release);
                    debug!(player_id = %id, "state: joined");
                }
            }
            match pending.take() {
                Some(request) if request.seq == *seq => {
                    let _ = request.ack_tx.send(CommandAck {
                        ok: *ok,
                        message: message.clone(),
                        player_id: *player_id,
                    });
                }
                Some(request) => {
                    warn!(
                        expected = request.seq,
                        got = seq,
                        "acknowledgement for unexpected seq, dropping request"
                    );
                }
                None => {
                    debug!(seq, "acknowledgement with no request in flight");
                }
            }
        }
        ServerEvent::ServerError { message } => {
            // Defensive release: the error may be unrelated to the in-flight
            // command, but a wedged busy guard is worse than a spurious
            // CommandInterrupted.
            shared.busy.store(false, Ordering::Release);
            *pending = None;
            let message = message
                .clone()
                .unwrap_or_else(|| "Something went wrong.".to_string());
            *shared.last_error.lock().await = Some(message);
        }
        ServerEvent::GuessResult { status, points } => {
            let message = match (status, points) {
                (GuessOutcome::Correct, Some(points)) => format!("Correct! +{points}"),
                (GuessOutcome::Correct, None) => "Correct!".to_string(),
                (GuessOutcome::Incorrect, _) => "Not quite, keep guessing!".to_string(),
            };
            shared.guess_feedback.set(
                GuessFeedback {
                    status: *status,
                    message,
                },
                GUESS_FEEDBACK_TTL,
            );
        }
        _ => {}
    }

    // Canonical state update plus countdown ownership: the polling timer is
    // torn down and restarted whenever the Round value changes, so no timer
    // ever outlives its owning round.
    {
        let mut state = shared.match_state.lock().await;
        let round_before = state.round.clone();
        state.apply(&event);
        if round_before != state.round {
            cancel_countdown(countdown);
            if let Some(round) = state.round.clone() {
                *countdown = Some(spawn_countdown(event_tx.clone(), round, poll_interval));
            }
        }
    }

    // A lobby snapshot is the authoritative match reset; transient feedback
    // goes with the rest of the ephemeral state.
    if let ServerEvent::RoomSnapshot(payload) = &event {
        if payload.status == RoomStatus::Lobby {
            shared.guess_feedback.clear();
        }
    }

    emit_event(event_tx, WordRushEvent::from(event)).await;
}

/// Spawn the round countdown task.
///
/// Every tick recomputes remaining time from the round's absolute deadline —
/// never a decrementing counter — so the display self-corrects after delivery
/// delays or suspended timers. Ticks continue (clamped at zero) until the
/// server ends the round and the task is aborted.
fn spawn_countdown(
    event_tx: mpsc::Sender<WordRushEvent>,
    round: RoundInfo,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let remaining_ms = clock::remaining_ms(clock::now_ms(), round.round_ends_at);
            let progress = clock::progress(remaining_ms, round.round_duration_ms);
            let tick = WordRushEvent::CountdownTick {
                remaining_ms,
                progress,
                urgency: Urgency::for_progress(progress),
            };
            match event_tx.try_send(tick) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    // A missed tick is self-correcting by construction.
                }
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        }
    })
}

fn cancel_countdown(countdown: &mut Option<JoinHandle<()>>) {
    if let Some(task) = countdown.take() {
        task.abort();
    }
}

/// Emit an event to the event channel. If the channel is full, log a warning
/// and drop the event to avoid blocking the transport loop.
async fn emit_event(event_tx: &mpsc::Sender<WordRushEvent>, event: WordRushEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(
                "event channel full, dropping event: {:?}",
                std::mem::discriminant(&dropped)
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

/// Emit a [`Disconnected`](WordRushEvent::Disconnected) event and update state.
///
/// Uses `send().await` (blocking) instead of `try_send` because
/// `Disconnected` is always the last event on the channel and must never be
/// silently dropped. Canonical match state is deliberately retained — a brief
/// transport drop must not blank the UI.
async fn emit_disconnected(
    event_tx: &mpsc::Sender<WordRushEvent>,
    shared: &ClientShared,
    reason: Option<String>,
) {
    shared.connected.store(false, Ordering::Release);
    shared.busy.store(false, Ordering::Release);
    let event = WordRushEvent::Disconnected { reason };
    if event_tx.send(event).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::protocol::{RoomSnapshotPayload, RoundEndInfo, RoundEndReason};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    // ── Mock transport ──────────────────────────────────────────────

    /// A scripted mock transport. Each incoming item is gated on the number
    /// of messages the client must have sent before it is delivered, which
    /// makes ack ordering deterministic.
    struct MockTransport {
        script: VecDeque<(usize, Option<std::result::Result<String, WordRushError>>)>,
        sent: Arc<StdMutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
    }

    impl MockTransport {
        #[allow(clippy::type_complexity)]
        fn new(
            script: Vec<(usize, Option<std::result::Result<String, WordRushError>>)>,
        ) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
            let sent = Arc::new(StdMutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            let transport = Self {
                script: VecDeque::from(script),
                sent: Arc::clone(&sent),
                closed: Arc::clone(&closed),
            };
            (transport, sent, closed)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, message: String) -> std::result::Result<(), WordRushError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, WordRushError>> {
            loop {
                let gate = match self.script.front() {
                    Some((gate, _)) => *gate,
                    // All scripted messages delivered — hang forever so the
                    // transport loop stays alive until shutdown.
                    None => return std::future::pending().await,
                };
                if self.sent.lock().unwrap().len() >= gate {
                    // Checked front() above; pop cannot fail. The whole item
                    // is popped atomically so cancellation between polls
                    // never loses a message.
                    return self.script.pop_front().and_then(|(_, item)| item);
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        }

        async fn close(&mut self) -> std::result::Result<(), WordRushError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn ack_json(seq: u64, ok: bool, message: Option<&str>, player_id: Option<PlayerId>) -> String {
        serde_json::to_string(&ServerEvent::CommandAck {
            seq,
            ok,
            message: message.map(Into::into),
            player_id,
        })
        .unwrap()
    }

    fn snapshot_json(code: &str, status: RoomStatus, players: Vec<PlayerInfo>) -> String {
        serde_json::to_string(&ServerEvent::RoomSnapshot(Box::new(RoomSnapshotPayload {
            room_code: code.into(),
            status,
            players,
        })))
        .unwrap()
    }

    fn round_begins_json(ends_at: u64, duration: u64) -> String {
        serde_json::to_string(&ServerEvent::RoundBegins(RoundInfo {
            display: "_ _ _ _ _".into(),
            hint: "3 letters".into(),
            round_ends_at: ends_at,
            round_duration_ms: duration,
        }))
        .unwrap()
    }

    fn player(n: u128, nickname: &str, score: u32) -> PlayerInfo {
        PlayerInfo {
            id: uuid::Uuid::from_u128(n),
            nickname: nickname.into(),
            score,
            connected: true,
            is_host: n == 1,
        }
    }

    fn test_config() -> WordRushConfig {
        WordRushConfig::new().with_shutdown_timeout(Duration::from_millis(200))
    }

    /// Receive events until `pred` matches, panicking after `limit` events.
    async fn recv_until(
        events: &mut mpsc::Receiver<WordRushEvent>,
        limit: usize,
        pred: impl Fn(&WordRushEvent) -> bool,
    ) -> WordRushEvent {
        for _ in 0..limit {
            let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
                .await
                .expect("timed out waiting for event")
                .expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
        panic!("event not observed within {limit} events");
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn connected_is_first_event() {
        let (transport, _sent, _closed) = MockTransport::new(vec![]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());

        let first = events.recv().await.unwrap();
        assert!(
            matches!(first, WordRushEvent::Connected),
            "expected Connected as first event, got {first:?}"
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn create_room_ack_sets_joined_and_player_id() {
        let pid = uuid::Uuid::from_u128(0xA11CE);
        let (transport, sent, _closed) =
            MockTransport::new(vec![(1, Some(Ok(ack_json(1, true, None, Some(pid)))))]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        let ack = client.create_room("Ann").await.unwrap();
        assert!(ack.ok);
        assert_eq!(ack.player_id, Some(pid));
        assert!(client.is_joined());
        assert_eq!(client.player_id().await, Some(pid));
        assert!(!client.is_busy());

        // The wire carried a seq'd create-room envelope.
        {
            let messages = sent.lock().unwrap();
            let value: serde_json::Value = serde_json::from_str(&messages[0]).unwrap();
            assert_eq!(value["seq"], 1);
            assert_eq!(value["type"], "create-room");
            assert_eq!(value["data"]["nickname"], "Ann");
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn rejected_ack_surfaces_message_and_releases_guard() {
        let (transport, _sent, _closed) = MockTransport::new(vec![
            (1, Some(Ok(ack_json(1, false, Some("Room is full."), None)))),
            (2, Some(Ok(ack_json(2, true, None, None)))),
        ]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        let ack = client.join_room("AB12", "Ann").await.unwrap();
        assert!(!ack.ok);
        assert_eq!(client.last_error().await.as_deref(), Some("Room is full."));
        assert!(!client.is_joined());
        assert!(!client.is_busy());

        // The guard was released, so a retry goes straight through.
        let ack = client.join_room("AB12", "Ann").await.unwrap();
        assert!(ack.ok);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn busy_guard_rejects_second_request() {
        // No scripted ack: the first request stays in flight.
        let (transport, _sent, _closed) = MockTransport::new(vec![]);
        let (client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        let client = Arc::new(client);
        let first = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.start_match().await })
        };

        // Wait until the first request holds the guard.
        while !client.is_busy() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let second = client.end_match().await;
        assert!(matches!(second, Err(WordRushError::CommandInFlight)));

        first.abort();
        let _ = first.await;
        let mut client = match Arc::try_unwrap(client) {
            Ok(client) => client,
            Err(_) => panic!("aborted task should have released its handle"),
        };
        client.shutdown().await;
        drop(events);
    }

    #[tokio::test]
    async fn submit_guess_is_exempt_from_busy_guard() {
        let (transport, sent, _closed) = MockTransport::new(vec![]);
        let (client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        let client = Arc::new(client);
        let _pending = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.start_match().await })
        };
        while !client.is_busy() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        // Guess goes out while the request is still in flight.
        client.submit_guess("word").unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        loop {
            {
                let messages = sent.lock().unwrap();
                if messages.len() >= 2 {
                    let value: serde_json::Value =
                        serde_json::from_str(&messages[1]).unwrap();
                    assert_eq!(value["type"], "submit-guess");
                    assert_eq!(value["data"]["guess"], "word");
                    // Fire-and-forget: no seq on the wire.
                    assert!(value.get("seq").is_none());
                    break;
                }
            }
            assert!(std::time::Instant::now() < deadline, "guess never sent");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn maintenance_mode_blocks_create_without_transport_call() {
        let (transport, sent, _closed) = MockTransport::new(vec![]);
        let config = test_config().with_service_status("maintenance");
        let (mut client, mut events) = WordRushClient::start(transport, config);
        let _ = events.recv().await; // Connected

        let err = client.create_room("Ann").await.unwrap_err();
        assert!(matches!(err, WordRushError::Maintenance));
        assert_eq!(err.to_string(), "Game is in maintenance mode.");
        assert_eq!(
            client.last_error().await.as_deref(),
            Some("Game is in maintenance mode.")
        );
        assert!(sent.lock().unwrap().is_empty());

        let err = client.join_room("AB12", "Ann").await.unwrap_err();
        assert!(matches!(err, WordRushError::Maintenance));
        assert!(sent.lock().unwrap().is_empty());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn empty_inputs_short_circuit_locally() {
        let (transport, sent, _closed) = MockTransport::new(vec![]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        assert!(matches!(
            client.create_room("   ").await,
            Err(WordRushError::InvalidInput(_))
        ));
        assert!(matches!(
            client.join_room("", "Ann").await,
            Err(WordRushError::InvalidInput(_))
        ));
        assert!(matches!(
            client.submit_guess("  "),
            Err(WordRushError::InvalidInput(_))
        ));
        assert!(sent.lock().unwrap().is_empty());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn server_error_clears_busy_guard_defensively() {
        let error_json = serde_json::to_string(&ServerEvent::ServerError {
            message: Some("room expired".into()),
        })
        .unwrap();
        // The error is delivered after the request goes out.
        let (transport, _sent, _closed) = MockTransport::new(vec![(1, Some(Ok(error_json)))]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        let result = client.start_match().await;
        assert!(matches!(result, Err(WordRushError::CommandInterrupted)));
        assert!(!client.is_busy());
        assert_eq!(client.last_error().await.as_deref(), Some("room expired"));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn snapshot_updates_canonical_state_and_views() {
        let players = vec![player(1, "Ann", 3), player(2, "Bo", 9)];
        let (transport, _sent, _closed) = MockTransport::new(vec![(
            0,
            Some(Ok(snapshot_json("AB12", RoomStatus::Lobby, players))),
        )]);
        let config = test_config().with_invite_origin("https://play.wordrush.io");
        let (mut client, mut events) = WordRushClient::start(transport, config);

        recv_until(&mut events, 8, |e| {
            matches!(e, WordRushEvent::RoomSnapshot { .. })
        })
        .await;

        let state = client.match_state().await;
        assert_eq!(state.room_code.as_deref(), Some("AB12"));
        assert_eq!(state.players.len(), 2);

        let board = client.leaderboard().await;
        assert_eq!(board[0].nickname, "Bo");

        assert_eq!(
            client.invite_link().await,
            "https://play.wordrush.io/?room=AB12"
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn disconnect_preserves_canonical_state() {
        let (transport, _sent, _closed) = MockTransport::new(vec![
            (
                0,
                Some(Ok(snapshot_json(
                    "AB12",
                    RoomStatus::InGame,
                    vec![player(1, "Ann", 4)],
                ))),
            ),
            // Clean transport close.
            (0, None),
        ]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());

        let event = recv_until(&mut events, 8, |e| {
            matches!(e, WordRushEvent::Disconnected { .. })
        })
        .await;
        assert!(matches!(event, WordRushEvent::Disconnected { reason: None }));

        // Connectivity flag flipped, nothing else blanked.
        assert!(!client.is_connected());
        let state = client.match_state().await;
        assert_eq!(state.room_code.as_deref(), Some("AB12"));
        assert_eq!(state.players.len(), 1);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn countdown_ticks_come_from_the_deadline() {
        let ends_at = clock::now_ms() + 60_000;
        let (transport, _sent, _closed) =
            MockTransport::new(vec![(0, Some(Ok(round_begins_json(ends_at, 60_000))))]);
        let config = test_config().with_countdown_poll_interval(Duration::from_millis(10));
        let (mut client, mut events) = WordRushClient::start(transport, config);

        let tick = recv_until(&mut events, 32, |e| {
            matches!(e, WordRushEvent::CountdownTick { .. })
        })
        .await;

        if let WordRushEvent::CountdownTick {
            remaining_ms,
            progress,
            urgency,
        } = tick
        {
            assert!(remaining_ms > 0 && remaining_ms <= 60_000);
            assert!(progress > 0.9 && progress <= 1.0);
            assert_eq!(urgency, Urgency::Low);
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn countdown_clamps_at_zero_for_overdue_round() {
        // Deadline already in the past; the round itself is retained.
        let (transport, _sent, _closed) =
            MockTransport::new(vec![(0, Some(Ok(round_begins_json(1_000, 10_000))))]);
        let config = test_config().with_countdown_poll_interval(Duration::from_millis(10));
        let (mut client, mut events) = WordRushClient::start(transport, config);

        let tick = recv_until(&mut events, 32, |e| {
            matches!(e, WordRushEvent::CountdownTick { .. })
        })
        .await;
        if let WordRushEvent::CountdownTick {
            remaining_ms,
            progress,
            urgency,
        } = tick
        {
            assert_eq!(remaining_ms, 0);
            assert_eq!(progress, 0.0);
            assert_eq!(urgency, Urgency::High);
        }

        assert!(client.match_state().await.round.is_some());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn round_end_stops_countdown() {
        let ends_at = clock::now_ms() + 60_000;
        let round_ends = serde_json::to_string(&ServerEvent::RoundEnds(RoundEndInfo {
            reason: RoundEndReason::Guessed,
            word: "CAT".into(),
            winner_player_id: None,
            winner_nickname: None,
            points_awarded: 10,
        }))
        .unwrap();
        let (transport, _sent, _closed) = MockTransport::new(vec![
            (0, Some(Ok(round_begins_json(ends_at, 60_000)))),
            (0, Some(Ok(round_ends))),
        ]);
        let config = test_config().with_countdown_poll_interval(Duration::from_millis(10));
        let (mut client, mut events) = WordRushClient::start(transport, config);

        recv_until(&mut events, 64, |e| {
            matches!(e, WordRushEvent::RoundEnded { .. })
        })
        .await;

        // Drain anything the ticker emitted before it was aborted, then
        // verify silence.
        tokio::time::sleep(Duration::from_millis(50)).await;
        while events.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(events.try_recv().is_err(), "countdown outlived its round");

        let state = client.match_state().await;
        assert!(state.round.is_none());
        assert!(state.round_end.is_some());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn guess_result_populates_feedback_slot() {
        let guess_json = serde_json::to_string(&ServerEvent::GuessResult {
            status: GuessOutcome::Correct,
            points: Some(50),
        })
        .unwrap();
        let (transport, _sent, _closed) = MockTransport::new(vec![(0, Some(Ok(guess_json)))]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());

        recv_until(&mut events, 8, |e| {
            matches!(e, WordRushEvent::GuessResult { .. })
        })
        .await;

        let feedback = client.guess_feedback().get().unwrap();
        assert_eq!(feedback.status, GuessOutcome::Correct);
        assert_eq!(feedback.message, "Correct! +50");

        client.shutdown().await;
    }

    #[tokio::test]
    async fn lobby_snapshot_clears_feedback_slot() {
        let guess_json = serde_json::to_string(&ServerEvent::GuessResult {
            status: GuessOutcome::Incorrect,
            points: None,
        })
        .unwrap();
        let (transport, _sent, _closed) = MockTransport::new(vec![
            (0, Some(Ok(guess_json))),
            (0, Some(Ok(snapshot_json("AB12", RoomStatus::Lobby, vec![])))),
        ]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());

        recv_until(&mut events, 8, |e| {
            matches!(e, WordRushEvent::RoomSnapshot { .. })
        })
        .await;

        assert!(client.guess_feedback().get().is_none());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn guess_preview_requires_active_round() {
        let (transport, _sent, _closed) =
            MockTransport::new(vec![(0, Some(Ok(round_begins_json(u64::MAX, 60_000))))]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());

        assert_eq!(client.guess_preview("cat").await, None);

        recv_until(&mut events, 8, |e| {
            matches!(e, WordRushEvent::RoundBegan { .. })
        })
        .await;
        assert_eq!(
            client.guess_preview("cat").await.as_deref(),
            Some("_ C A T _")
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn not_connected_error_after_shutdown() {
        let (transport, _sent, _closed) = MockTransport::new(vec![]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        client.shutdown().await;

        assert!(matches!(
            client.submit_guess("cat"),
            Err(WordRushError::NotConnected)
        ));
        assert!(matches!(
            client.start_match().await,
            Err(WordRushError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn shutdown_emits_disconnected_and_closes_transport() {
        let (transport, _sent, closed) = MockTransport::new(vec![]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        client.shutdown().await;

        let event = events.recv().await.unwrap();
        assert!(matches!(event, WordRushEvent::Disconnected { .. }));
        if let WordRushEvent::Disconnected { reason } = event {
            assert_eq!(reason.as_deref(), Some("client shut down"));
        }
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn double_shutdown_does_not_panic() {
        let (transport, _sent, _closed) = MockTransport::new(vec![]);
        let (mut client, mut events) = WordRushClient::start(transport, test_config());
        let _ = events.recv().await; // Connected

        client.shutdown().await;
        client.shutdown().await;
    }

    #[tokio::test]
    async fn config_defaults() {
        let config = WordRushConfig::new();
        assert!(config.endpoint.is_none());
        assert_eq!(config.service_status, SERVICE_STATUS_ONLINE);
        assert!(!config.maintenance_mode());
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
        assert_eq!(
            config.countdown_poll_interval,
            DEFAULT_COUNTDOWN_POLL_INTERVAL
        );
    }

    #[tokio::test]
    async fn event_channel_capacity_is_clamped_to_one() {
        let config = WordRushConfig::new().with_event_channel_capacity(0);
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[cfg(feature = "transport-websocket")]
    #[tokio::test]
    async fn establish_without_endpoint_never_connects() {
        let result = WordRushClient::establish(WordRushConfig::new()).await;
        assert!(matches!(result, Err(WordRushError::MissingEndpoint)));
    }
}
