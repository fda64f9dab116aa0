//! Canonical match state and the event dispatch rules that maintain it.
//!
//! [`MatchState`] mirrors the most recently received authoritative data and
//! nothing else: the client never infers scores, host flags, or status
//! transitions on its own. [`MatchState::apply`] is the single entry point
//! for inbound pushes, so every rule about snapshots, the room status
//! machine, and round/round-end exclusivity lives in one place and is
//! testable without a transport.
//!
//! Re-delivery safety: a `room-snapshot` is a total replacement, so applying
//! the same snapshot twice is a no-op — the design's only ordering
//! assumption across event types.

use tracing::debug;

use crate::protocol::{
    MatchSummary, PlayerInfo, RoomStatus, RoundEndInfo, RoundInfo, ServerEvent,
};

/// The client's canonical view of the match, replaced piecewise by server
/// pushes and read on demand by the projection layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchState {
    /// Short join code of the current room, once known.
    pub room_code: Option<String>,
    /// Room lifecycle status as last reported by the server.
    pub status: RoomStatus,
    /// Authoritative player list; replaced wholesale by each snapshot.
    pub players: Vec<PlayerInfo>,
    /// The active round. Mutually exclusive with `round_end`.
    pub round: Option<RoundInfo>,
    /// Summary of the round that just ended, until the next round begins.
    pub round_end: Option<RoundEndInfo>,
    /// Final results; present only while `status` is `Finished`.
    pub match_result: Option<MatchSummary>,
    /// Last server-side countdown heartbeat, if any.
    pub server_remaining_seconds: Option<u64>,
}

impl MatchState {
    /// Apply one inbound server event.
    ///
    /// `command-ack` and `server-error` never touch canonical state — they
    /// are handled by the command gateway — and `guess-result` is routed to
    /// the transient feedback slot by the caller; all three are no-ops here.
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::RoomSnapshot(payload) => {
                // Total replacement, never a field-by-field merge.
                self.room_code = Some(payload.room_code.clone());
                self.status = payload.status;
                self.players = payload.players.clone();
                if payload.status == RoomStatus::Lobby {
                    // A lobby snapshot is the authoritative match-reset
                    // signal: all ephemeral match state goes.
                    self.round = None;
                    self.round_end = None;
                    self.match_result = None;
                    self.server_remaining_seconds = None;
                }
                debug!(
                    room = %payload.room_code,
                    players = payload.players.len(),
                    "state: snapshot applied"
                );
            }
            ServerEvent::MatchStarted => {
                self.status = RoomStatus::InGame;
                self.round_end = None;
                self.match_result = None;
                debug!("state: match started");
            }
            ServerEvent::MatchTick { remaining_seconds } => {
                self.server_remaining_seconds = Some(*remaining_seconds);
            }
            ServerEvent::RoundBegins(round) => {
                // Round and RoundEnd are mutually exclusive. Status is
                // untouched: round events never drive the status machine.
                self.round = Some(round.clone());
                self.round_end = None;
                debug!(ends_at = round.round_ends_at, "state: round began");
            }
            ServerEvent::RoundEnds(end) => {
                self.round = None;
                self.round_end = Some(end.clone());
                self.server_remaining_seconds = None;
                debug!(reason = ?end.reason, "state: round ended");
            }
            ServerEvent::MatchEnded(summary) => {
                self.status = RoomStatus::Finished;
                self.round = None;
                self.round_end = None;
                self.server_remaining_seconds = None;
                self.match_result = Some((**summary).clone());
                debug!(
                    rankings = summary.rankings.len(),
                    "state: match ended"
                );
            }
            ServerEvent::CommandAck { .. }
            | ServerEvent::ServerError { .. }
            | ServerEvent::GuessResult { .. } => {}
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
    use crate::protocol::{RankingRow, RoomSnapshotPayload, RoundEndReason};
    use uuid::Uuid;

    fn player(n: u128, nickname: &str, score: u32) -> PlayerInfo {
        PlayerInfo {
            id: Uuid::from_u128(n),
            nickname: nickname.into(),
            score,
            connected: true,
            is_host: n == 1,
        }
    }

    fn snapshot(code: &str, status: RoomStatus, players: Vec<PlayerInfo>) -> ServerEvent {
        ServerEvent::RoomSnapshot(Box::new(RoomSnapshotPayload {
            room_code: code.into(),
            status,
            players,
        }))
    }

    fn round(ends_at: u64, duration: u64) -> RoundInfo {
        RoundInfo {
            display: "_ W O R D _".into(),
            hint: "5 letters".into(),
            round_ends_at: ends_at,
            round_duration_ms: duration,
        }
    }

    fn round_end(reason: RoundEndReason) -> RoundEndInfo {
        RoundEndInfo {
            reason,
            word: "WORDS".into(),
            winner_player_id: Some(Uuid::from_u128(2)),
            winner_nickname: Some("Bo".into()),
            points_awarded: 10,
        }
    }

    fn summary() -> MatchSummary {
        MatchSummary {
            rankings: vec![RankingRow {
                player_id: Uuid::from_u128(2),
                nickname: "Bo".into(),
                score: 30,
            }],
            winners: vec![Uuid::from_u128(2)],
            review_rows: vec![],
        }
    }

    #[test]
    fn snapshot_replaces_player_list_wholesale() {
        let mut state = MatchState::default();
        state.apply(&snapshot(
            "AB12",
            RoomStatus::Lobby,
            vec![player(1, "Ann", 0), player(2, "Bo", 0)],
        ));
        assert_eq!(state.players.len(), 2);

        // A later snapshot with fewer players is not merged; Bo is gone.
        state.apply(&snapshot("AB12", RoomStatus::Lobby, vec![player(1, "Ann", 0)]));
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].nickname, "Ann");
    }

    #[test]
    fn snapshot_application_is_idempotent() {
        let event = snapshot(
            "AB12",
            RoomStatus::InGame,
            vec![player(1, "Ann", 5), player(2, "Bo", 3)],
        );

        let mut once = MatchState::default();
        once.apply(&event);
        let mut twice = once.clone();
        twice.apply(&event);

        assert_eq!(once, twice);
    }

    #[test]
    fn player_list_equals_latest_snapshot_for_any_sequence() {
        let sequences = vec![
            vec![player(1, "Ann", 0)],
            vec![player(1, "Ann", 2), player(2, "Bo", 1)],
            vec![player(2, "Bo", 9)],
            vec![],
        ];

        let mut state = MatchState::default();
        for players in sequences {
            state.apply(&snapshot("AB12", RoomStatus::Lobby, players.clone()));
            assert_eq!(state.players, players);
        }
    }

    #[test]
    fn lobby_snapshot_resets_all_ephemeral_match_state() {
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchStarted);
        state.apply(&ServerEvent::RoundBegins(round(10_000, 10_000)));
        state.apply(&ServerEvent::MatchTick {
            remaining_seconds: 7,
        });
        state.apply(&ServerEvent::RoundEnds(round_end(RoundEndReason::Guessed)));
        state.apply(&ServerEvent::MatchEnded(Box::new(summary())));
        assert_eq!(state.status, RoomStatus::Finished);
        assert!(state.match_result.is_some());

        state.apply(&snapshot("AB12", RoomStatus::Lobby, vec![player(1, "Ann", 0)]));

        assert_eq!(state.status, RoomStatus::Lobby);
        assert!(state.round.is_none());
        assert!(state.round_end.is_none());
        assert!(state.match_result.is_none());
        assert!(state.server_remaining_seconds.is_none());
    }

    #[test]
    fn in_game_snapshot_keeps_round_state() {
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchStarted);
        state.apply(&ServerEvent::RoundBegins(round(10_000, 10_000)));

        // Mid-round score refresh must not blank the round.
        state.apply(&snapshot(
            "AB12",
            RoomStatus::InGame,
            vec![player(1, "Ann", 10)],
        ));
        assert!(state.round.is_some());
        assert_eq!(state.players[0].score, 10);
    }

    #[test]
    fn match_started_moves_lobby_to_in_game() {
        let mut state = MatchState::default();
        assert_eq!(state.status, RoomStatus::Lobby);
        state.apply(&ServerEvent::MatchStarted);
        assert_eq!(state.status, RoomStatus::InGame);
    }

    #[test]
    fn round_cycle_swaps_round_and_round_end() {
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchStarted);

        state.apply(&ServerEvent::RoundBegins(round(10_000, 10_000)));
        assert!(state.round.is_some());
        assert!(state.round_end.is_none());

        state.apply(&ServerEvent::RoundEnds(round_end(RoundEndReason::TimeUp)));
        assert!(state.round.is_none());
        assert!(state.round_end.is_some());

        // Next round clears the pending end summary.
        state.apply(&ServerEvent::RoundBegins(round(20_000, 10_000)));
        assert!(state.round.is_some());
        assert!(state.round_end.is_none());
    }

    #[test]
    fn round_events_never_change_status() {
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchStarted);
        state.apply(&ServerEvent::RoundBegins(round(10_000, 10_000)));
        assert_eq!(state.status, RoomStatus::InGame);
        state.apply(&ServerEvent::RoundEnds(round_end(RoundEndReason::Guessed)));
        assert_eq!(state.status, RoomStatus::InGame);
    }

    #[test]
    fn match_ended_sets_finished_and_result() {
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchStarted);
        state.apply(&ServerEvent::RoundBegins(round(10_000, 10_000)));

        state.apply(&ServerEvent::MatchEnded(Box::new(summary())));

        assert_eq!(state.status, RoomStatus::Finished);
        assert!(state.round.is_none());
        assert!(state.round_end.is_none());
        assert_eq!(state.match_result, Some(summary()));
    }

    #[test]
    fn finished_returns_to_lobby_only_via_snapshot() {
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchEnded(Box::new(summary())));
        assert_eq!(state.status, RoomStatus::Finished);

        // Round traffic while finished does not resurrect the lobby.
        state.apply(&ServerEvent::MatchTick {
            remaining_seconds: 3,
        });
        assert_eq!(state.status, RoomStatus::Finished);

        state.apply(&snapshot("AB12", RoomStatus::Lobby, vec![]));
        assert_eq!(state.status, RoomStatus::Lobby);
        assert!(state.match_result.is_none());
    }

    #[test]
    fn round_is_retained_past_its_deadline() {
        // The deadline passing is a display concern; only the server clears
        // a round.
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchStarted);
        let r = round(1_000, 10_000);
        state.apply(&ServerEvent::RoundBegins(r.clone()));

        state.apply(&ServerEvent::MatchTick {
            remaining_seconds: 0,
        });
        assert_eq!(state.round, Some(r));
    }

    #[test]
    fn ack_error_and_guess_events_do_not_touch_state() {
        let mut state = MatchState::default();
        state.apply(&ServerEvent::MatchStarted);
        state.apply(&ServerEvent::RoundBegins(round(10_000, 10_000)));
        let before = state.clone();

        state.apply(&ServerEvent::CommandAck {
            seq: 1,
            ok: true,
            message: None,
            player_id: Some(Uuid::from_u128(9)),
        });
        state.apply(&ServerEvent::ServerError {
            message: Some("oops".into()),
        });
        state.apply(&ServerEvent::GuessResult {
            status: crate::protocol::GuessOutcome::Incorrect,
            points: None,
        });

        assert_eq!(state, before);
    }
}
