//! Consumer-facing events emitted by [`WordRushClient`](crate::WordRushClient).
//!
//! Most variants mirror a [`ServerEvent`] one-to-one. `Connected` and
//! `Disconnected` are synthetic transport-level events emitted by the
//! transport loop, and `CountdownTick` comes from the locally owned round
//! clock task, not from the wire.

use crate::clock::Urgency;
use crate::protocol::{
    GuessOutcome, MatchSummary, PlayerInfo, RoomStatus, RoundEndInfo, RoundInfo, ServerEvent,
};

/// Events delivered on the channel returned by
/// [`WordRushClient::start`](crate::WordRushClient::start).
#[derive(Debug, Clone, PartialEq)]
pub enum WordRushEvent {
    /// The transport session is up. Always the first event.
    Connected,
    /// The transport session ended. Always the last event; delivered even
    /// when the channel is saturated.
    Disconnected { reason: Option<String> },
    /// An in-flight command was acknowledged. The primary delivery path for
    /// acks is the command's own future; this event exists for observers
    /// (e.g. a debug overlay) and can be ignored.
    CommandAcknowledged {
        ok: bool,
        message: Option<String>,
    },
    /// Unsolicited server-side error.
    ServerError { message: String },
    /// Full authoritative room state was applied.
    RoomSnapshot {
        room_code: String,
        status: RoomStatus,
        players: Vec<PlayerInfo>,
    },
    /// The match left the lobby.
    MatchStarted,
    /// Server-side countdown heartbeat.
    MatchTick { remaining_seconds: u64 },
    /// A round began.
    RoundBegan { round: RoundInfo },
    /// The current round ended.
    RoundEnded { end: RoundEndInfo },
    /// The match finished.
    MatchEnded { summary: MatchSummary },
    /// Outcome of this player's most recent guess.
    GuessResult {
        status: GuessOutcome,
        points: Option<u32>,
    },
    /// Locally reconciled round countdown, recomputed from the absolute
    /// deadline on every poll.
    CountdownTick {
        remaining_ms: u64,
        progress: f64,
        urgency: Urgency,
    },
}

impl From<ServerEvent> for WordRushEvent {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::CommandAck { ok, message, .. } => {
                Self::CommandAcknowledged { ok, message }
            }
            ServerEvent::ServerError { message } => Self::ServerError {
                message: message.unwrap_or_else(|| "Something went wrong.".to_string()),
            },
            ServerEvent::RoomSnapshot(payload) => Self::RoomSnapshot {
                room_code: payload.room_code,
                status: payload.status,
                players: payload.players,
            },
            ServerEvent::MatchStarted => Self::MatchStarted,
            ServerEvent::MatchTick { remaining_seconds } => {
                Self::MatchTick { remaining_seconds }
            }
            ServerEvent::RoundBegins(round) => Self::RoundBegan { round },
            ServerEvent::RoundEnds(end) => Self::RoundEnded { end },
            ServerEvent::MatchEnded(summary) => Self::MatchEnded { summary: *summary },
            ServerEvent::GuessResult { status, points } => Self::GuessResult { status, points },
        }
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
    use crate::protocol::RoomSnapshotPayload;

    #[test]
    fn snapshot_event_converts_with_payload_fields() {
        let event = ServerEvent::RoomSnapshot(Box::new(RoomSnapshotPayload {
            room_code: "QUIZ42".into(),
            status: RoomStatus::Lobby,
            players: vec![],
        }));
        let converted = WordRushEvent::from(event);
        assert_eq!(
            converted,
            WordRushEvent::RoomSnapshot {
                room_code: "QUIZ42".into(),
                status: RoomStatus::Lobby,
                players: vec![],
            }
        );
    }

    #[test]
    fn server_error_without_message_gets_default() {
        let converted = WordRushEvent::from(ServerEvent::ServerError { message: None });
        assert_eq!(
            converted,
            WordRushEvent::ServerError {
                message: "Something went wrong.".into()
            }
        );
    }

    #[test]
    fn ack_converts_to_observer_variant() {
        let converted = WordRushEvent::from(ServerEvent::CommandAck {
            seq: 7,
            ok: false,
            message: Some("Room is full.".into()),
            player_id: None,
        });
        assert_eq!(
            converted,
            WordRushEvent::CommandAcknowledged {
                ok: false,
                message: Some("Room is full.".into()),
            }
        );
    }
}
