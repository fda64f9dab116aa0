//! Wire types for the Word Rush game protocol.
//!
//! Every type in this module produces identical JSON to the server's protocol
//! layer: tagged `{"type": ..., "data": ...}` messages with kebab-case type
//! tags and camelCase payload fields. Timestamps are absolute epoch
//! milliseconds — the round clock is always reconciled against
//! `round_ends_at`, never against a locally counted duration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Type aliases ────────────────────────────────────────────────────

/// Unique identifier for players.
pub type PlayerId = Uuid;

// ── Enums ───────────────────────────────────────────────────────────

/// Lifecycle status of a room, owned entirely by the server.
///
/// The client never transitions this on its own initiative; it only reflects
/// the status carried by the latest snapshot or lifecycle event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Players are gathering; no match in progress.
    #[default]
    Lobby,
    /// A match is running (rounds cycle inside this status).
    InGame,
    /// The match ended; final results are available until a replay reset.
    Finished,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    /// The round clock ran out with no correct guess.
    TimeUp,
    /// Someone guessed the word.
    Guessed,
    /// The host ended the match mid-round.
    HostEnded,
}

/// Outcome of a submitted guess.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuessOutcome {
    Correct,
    Incorrect,
}

// ── Structs ─────────────────────────────────────────────────────────

/// Information about a player in a room.
///
/// `is_host` is arbitrated remotely — at most one player is host at any time,
/// and the client trusts whatever the latest snapshot says.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub nickname: String,
    pub score: u32,
    pub connected: bool,
    pub is_host: bool,
}

/// An active round: masked word pattern plus deadline data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundInfo {
    /// Masked display pattern, whitespace-separated tokens. The first and
    /// last tokens delimit the pattern and are never letter slots.
    pub display: String,
    /// Hint text shown alongside the pattern.
    pub hint: String,
    /// Absolute round deadline, epoch milliseconds.
    pub round_ends_at: u64,
    /// Nominal round duration in milliseconds.
    pub round_duration_ms: u64,
}

/// The closing summary of a single round. Transient — replaced when the next
/// round begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundEndInfo {
    pub reason: RoundEndReason,
    /// The revealed word.
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_player_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_nickname: Option<String>,
    pub points_awarded: u32,
}

/// One row of the final standings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub player_id: PlayerId,
    pub nickname: String,
    pub score: u32,
}

/// One row of the post-match round review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRow {
    /// 1-based round number.
    pub round: u32,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_nickname: Option<String>,
    pub points_awarded: u32,
}

// ── Payload structs ─────────────────────────────────────────────────

/// Payload for the `room-snapshot` server event.
/// Boxed in `ServerEvent` to reduce enum size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotPayload {
    pub room_code: String,
    pub status: RoomStatus,
    pub players: Vec<PlayerInfo>,
}

/// Payload for the `match-ended` server event.
/// Boxed in `ServerEvent` to reduce enum size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    /// Final standings, best first.
    pub rankings: Vec<RankingRow>,
    /// Player ids sharing the top score.
    pub winners: Vec<PlayerId>,
    /// One row per round played, in play order.
    pub review_rows: Vec<ReviewRow>,
}

/// Acknowledgement for a single outbound command, correlated by `seq`.
///
/// Modeled as an inspectable value rather than an exception: `ok: false`
/// carries the rejection message and the caller decides how to surface it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Present on successful `create-room` / `join-room` acknowledgements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
}

// ── Messages ────────────────────────────────────────────────────────

/// Command types sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Create a new room and join it as host.
    #[serde(rename_all = "camelCase")]
    CreateRoom { nickname: String },
    /// Join an existing room by code.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_code: String, nickname: String },
    /// Start the match (host only; server enforces).
    StartMatch,
    /// Submit a guess for the current round. Fire-and-forget — no
    /// acknowledgement, to keep guess latency minimal.
    #[serde(rename_all = "camelCase")]
    SubmitGuess { guess: String },
    /// End the match early (host only; server enforces).
    EndMatch,
    /// Return a finished room to the lobby for a replay.
    ResetForReplay,
}

impl ClientCommand {
    /// Whether the server acknowledges this command.
    pub fn expects_ack(&self) -> bool {
        !matches!(self, Self::SubmitGuess { .. })
    }
}

/// Envelope for outbound commands. `seq` is present exactly when the command
/// expects an acknowledgement; the server echoes it in `command-ack`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub command: ClientCommand,
}

/// Event types pushed from server to client.
///
/// Delivery is ordered within the transport but carries no ordering guarantee
/// across distinct event types; `room-snapshot` application is idempotent so
/// re-delivery is harmless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Acknowledgement for the outbound command with the matching `seq`.
    #[serde(rename_all = "camelCase")]
    CommandAck {
        seq: u64,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    /// Unsolicited server-side error, not tied to a specific command.
    ServerError {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Full authoritative room state. Always a total replacement of the
    /// client's room/player state, never a merge.
    RoomSnapshot(Box<RoomSnapshotPayload>),
    /// The match moved from lobby into its first round cycle.
    MatchStarted,
    /// Server-side countdown heartbeat for the current round.
    #[serde(rename_all = "camelCase")]
    MatchTick { remaining_seconds: u64 },
    /// A new round begins; replaces any pending round-end summary.
    RoundBegins(RoundInfo),
    /// The current round ended; the round is cleared until the next begins.
    RoundEnds(RoundEndInfo),
    /// The match finished; final results attached.
    MatchEnded(Box<MatchSummary>),
    /// Outcome of this player's most recent guess.
    #[serde(rename_all = "camelCase")]
    GuessResult {
        status: GuessOutcome,
        #[serde(skip_serializing_if = "Option::is_none")]
        points: Option<u32>,
    },
}
