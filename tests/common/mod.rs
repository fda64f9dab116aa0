#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Shared test utilities for Word Rush Client integration tests.
//!
//! Provides a scripted [`MockTransport`] and helper functions for
//! constructing common server event JSON strings.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use word_rush_client::protocol::{
    MatchSummary, PlayerId, PlayerInfo, RankingRow, ReviewRow, RoomSnapshotPayload, RoomStatus,
    RoundEndInfo, RoundEndReason, RoundInfo, ServerEvent,
};
use word_rush_client::{GuessFeedback, Transport, WordRushError};

// ── MockTransport ───────────────────────────────────────────────────

/// A scripted mock transport for integration testing.
///
/// Each incoming item carries a gate: the number of messages the client must
/// have sent before the item is delivered. A gate of `0` delivers
/// immediately; gating an acknowledgement on `1` guarantees it arrives after
/// the command it answers. All messages sent by the client are recorded in
/// `sent`.
pub struct MockTransport {
    script: VecDeque<(usize, Option<Result<String, WordRushError>>)>,
    pub sent: Arc<StdMutex<Vec<String>>>,
    pub closed: Arc<AtomicBool>,
}

impl MockTransport {
    /// Create a new mock transport with the given scripted incoming items.
    ///
    /// Returns the transport plus shared handles for inspecting sent
    /// messages and whether close was called.
    #[allow(clippy::type_complexity)]
    pub fn new(
        script: Vec<(usize, Option<Result<String, WordRushError>>)>,
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
    async fn send(&mut self, message: String) -> Result<(), WordRushError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, WordRushError>> {
        loop {
            let gate = match self.script.front() {
                Some((gate, _)) => *gate,
                // No more scripted messages — hang forever so the transport
                // loop stays alive until shutdown is called.
                None => return std::future::pending().await,
            };
            if self.sent.lock().unwrap().len() >= gate {
                // The item is popped whole, so cancellation between polls
                // never loses a message.
                return self.script.pop_front().and_then(|(_, item)| item);
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    async fn close(&mut self) -> Result<(), WordRushError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

/// A connected, non-host player with the given id and score.
pub fn player(n: u128, nickname: &str, score: u32) -> PlayerInfo {
    PlayerInfo {
        id: uuid::Uuid::from_u128(n),
        nickname: nickname.into(),
        score,
        connected: true,
        is_host: n == 1,
    }
}

// ── JSON helper functions ───────────────────────────────────────────

/// Returns the JSON string for a `command-ack` server event.
pub fn ack_json(seq: u64, ok: bool, message: Option<&str>, player_id: Option<PlayerId>) -> String {
    serde_json::to_string(&ServerEvent::CommandAck {
        seq,
        ok,
        message: message.map(Into::into),
        player_id,
    })
    .expect("ack_json serialization")
}

/// Returns the JSON string for a `room-snapshot` server event.
pub fn snapshot_json(room_code: &str, status: RoomStatus, players: Vec<PlayerInfo>) -> String {
    serde_json::to_string(&ServerEvent::RoomSnapshot(Box::new(RoomSnapshotPayload {
        room_code: room_code.into(),
        status,
        players,
    })))
    .expect("snapshot_json serialization")
}

/// Returns the JSON string for a `match-started` server event.
pub fn match_started_json() -> String {
    serde_json::to_string(&ServerEvent::MatchStarted).expect("match_started_json serialization")
}

/// Returns the JSON string for a `match-tick` server event.
pub fn match_tick_json(remaining_seconds: u64) -> String {
    serde_json::to_string(&ServerEvent::MatchTick { remaining_seconds })
        .expect("match_tick_json serialization")
}

/// Returns the JSON string for a `round-begins` server event.
pub fn round_begins_json(display: &str, ends_at: u64, duration_ms: u64) -> String {
    serde_json::to_string(&ServerEvent::RoundBegins(RoundInfo {
        display: display.into(),
        hint: "animal".into(),
        round_ends_at: ends_at,
        round_duration_ms: duration_ms,
    }))
    .expect("round_begins_json serialization")
}

/// Returns the JSON string for a `round-ends` server event.
pub fn round_ends_json(reason: RoundEndReason, word: &str, points: u32) -> String {
    serde_json::to_string(&ServerEvent::RoundEnds(RoundEndInfo {
        reason,
        word: word.into(),
        winner_player_id: Some(uuid::Uuid::from_u128(2)),
        winner_nickname: Some("Bo".into()),
        points_awarded: points,
    }))
    .expect("round_ends_json serialization")
}

/// Returns the JSON string for a `match-ended` server event.
pub fn match_ended_json() -> String {
    serde_json::to_string(&ServerEvent::MatchEnded(Box::new(MatchSummary {
        rankings: vec![
            RankingRow {
                player_id: uuid::Uuid::from_u128(2),
                nickname: "Bo".into(),
                score: 30,
            },
            RankingRow {
                player_id: uuid::Uuid::from_u128(1),
                nickname: "Ann".into(),
                score: 20,
            },
        ],
        winners: vec![uuid::Uuid::from_u128(2)],
        review_rows: vec![ReviewRow {
            round: 1,
            word: "OTTER".into(),
            winner_nickname: Some("Bo".into()),
            points_awarded: 30,
        }],
    })))
    .expect("match_ended_json serialization")
}

/// Returns the JSON string for a `guess-result` server event.
pub fn guess_result_json(correct: bool, points: Option<u32>) -> String {
    serde_json::to_string(&ServerEvent::GuessResult {
        status: if correct {
            word_rush_client::protocol::GuessOutcome::Correct
        } else {
            word_rush_client::protocol::GuessOutcome::Incorrect
        },
        points,
    })
    .expect("guess_result_json serialization")
}

/// Returns the JSON string for a `server-error` event.
pub fn server_error_json(message: Option<&str>) -> String {
    serde_json::to_string(&ServerEvent::ServerError {
        message: message.map(Into::into),
    })
    .expect("server_error_json serialization")
}

/// Read the current guess feedback, if any — shorthand for slot access.
pub fn current_feedback(client: &word_rush_client::WordRushClient) -> Option<GuessFeedback> {
    client.guess_feedback().get()
}
