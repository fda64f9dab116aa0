#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Wire-format tests for the Word Rush protocol types.
//!
//! The server speaks tagged JSON (`{"type": ..., "data": ...}`) with
//! kebab-case type tags and camelCase payload fields. These tests pin the
//! exact JSON each type produces and accepts, so a client upgrade can never
//! silently drift from the server's format.

use serde_json::{json, Value};
use uuid::Uuid;
use word_rush_client::protocol::{
    ClientCommand, CommandEnvelope, GuessOutcome, MatchSummary, PlayerInfo, RoomSnapshotPayload,
    RoomStatus, RoundEndInfo, RoundEndReason, RoundInfo, ServerEvent,
};

// ════════════════════════════════════════════════════════════════════
// Outbound commands
// ════════════════════════════════════════════════════════════════════

#[test]
fn create_room_wire_format() {
    let envelope = CommandEnvelope {
        seq: Some(1),
        command: ClientCommand::CreateRoom {
            nickname: "Ann".into(),
        },
    };
    let value: Value = serde_json::to_value(&envelope).expect("serialize");
    assert_eq!(
        value,
        json!({
            "seq": 1,
            "type": "create-room",
            "data": { "nickname": "Ann" }
        })
    );
}

#[test]
fn join_room_uses_camel_case_fields() {
    let envelope = CommandEnvelope {
        seq: Some(2),
        command: ClientCommand::JoinRoom {
            room_code: "AB12".into(),
            nickname: "Bo".into(),
        },
    };
    let value: Value = serde_json::to_value(&envelope).expect("serialize");
    assert_eq!(value["type"], "join-room");
    assert_eq!(value["data"]["roomCode"], "AB12");
    assert_eq!(value["data"]["nickname"], "Bo");
}

#[test]
fn submit_guess_has_no_seq() {
    let envelope = CommandEnvelope {
        seq: None,
        command: ClientCommand::SubmitGuess {
            guess: "otter".into(),
        },
    };
    let value: Value = serde_json::to_value(&envelope).expect("serialize");
    assert!(value.get("seq").is_none());
    assert_eq!(value["type"], "submit-guess");
    assert_eq!(value["data"]["guess"], "otter");
}

#[test]
fn payloadless_commands_serialize_as_bare_tags() {
    for (command, tag) in [
        (ClientCommand::StartMatch, "start-match"),
        (ClientCommand::EndMatch, "end-match"),
        (ClientCommand::ResetForReplay, "reset-for-replay"),
    ] {
        let envelope = CommandEnvelope {
            seq: Some(9),
            command,
        };
        let value: Value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["type"], tag);
    }
}

#[test]
fn command_expects_ack_matrix() {
    assert!(ClientCommand::CreateRoom { nickname: "a".into() }.expects_ack());
    assert!(ClientCommand::JoinRoom {
        room_code: "b".into(),
        nickname: "a".into()
    }
    .expects_ack());
    assert!(ClientCommand::StartMatch.expects_ack());
    assert!(ClientCommand::EndMatch.expects_ack());
    assert!(ClientCommand::ResetForReplay.expects_ack());
    assert!(!ClientCommand::SubmitGuess { guess: "g".into() }.expects_ack());
}

#[test]
fn command_envelope_round_trips() {
    let envelope = CommandEnvelope {
        seq: Some(7),
        command: ClientCommand::JoinRoom {
            room_code: "XY99".into(),
            nickname: "Cy".into(),
        },
    };
    let json = serde_json::to_string(&envelope).expect("serialize");
    let back: CommandEnvelope = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, envelope);
}

// ════════════════════════════════════════════════════════════════════
// Inbound events
// ════════════════════════════════════════════════════════════════════

#[test]
fn command_ack_parses_from_server_json() {
    let raw = r#"{
        "type": "command-ack",
        "data": {
            "seq": 3,
            "ok": true,
            "playerId": "00000000-0000-0000-0000-000000000042"
        }
    }"#;
    let event: ServerEvent = serde_json::from_str(raw).expect("parse");
    assert_eq!(
        event,
        ServerEvent::CommandAck {
            seq: 3,
            ok: true,
            message: None,
            player_id: Some(Uuid::from_u128(0x42)),
        }
    );
}

#[test]
fn rejected_ack_carries_message() {
    let raw = r#"{"type":"command-ack","data":{"seq":4,"ok":false,"message":"Room is full."}}"#;
    let event: ServerEvent = serde_json::from_str(raw).expect("parse");
    assert_eq!(
        event,
        ServerEvent::CommandAck {
            seq: 4,
            ok: false,
            message: Some("Room is full.".into()),
            player_id: None,
        }
    );
}

#[test]
fn room_snapshot_parses_status_and_players() {
    let raw = r#"{
        "type": "room-snapshot",
        "data": {
            "roomCode": "AB12",
            "status": "in_game",
            "players": [
                {
                    "id": "00000000-0000-0000-0000-000000000001",
                    "nickname": "Ann",
                    "score": 12,
                    "connected": true,
                    "isHost": true
                }
            ]
        }
    }"#;
    let event: ServerEvent = serde_json::from_str(raw).expect("parse");
    let ServerEvent::RoomSnapshot(payload) = event else {
        panic!("expected RoomSnapshot");
    };
    assert_eq!(payload.room_code, "AB12");
    assert_eq!(payload.status, RoomStatus::InGame);
    assert_eq!(payload.players.len(), 1);
    assert!(payload.players[0].is_host);
    assert_eq!(payload.players[0].score, 12);
}

#[test]
fn room_status_values_are_snake_case() {
    assert_eq!(
        serde_json::to_string(&RoomStatus::Lobby).expect("serialize"),
        "\"lobby\""
    );
    assert_eq!(
        serde_json::to_string(&RoomStatus::InGame).expect("serialize"),
        "\"in_game\""
    );
    assert_eq!(
        serde_json::to_string(&RoomStatus::Finished).expect("serialize"),
        "\"finished\""
    );
}

#[test]
fn round_begins_parses_deadline_fields() {
    let raw = r#"{
        "type": "round-begins",
        "data": {
            "display": "_ W O R D _",
            "hint": "5 letters",
            "roundEndsAt": 1754500000000,
            "roundDurationMs": 60000
        }
    }"#;
    let event: ServerEvent = serde_json::from_str(raw).expect("parse");
    assert_eq!(
        event,
        ServerEvent::RoundBegins(RoundInfo {
            display: "_ W O R D _".into(),
            hint: "5 letters".into(),
            round_ends_at: 1_754_500_000_000,
            round_duration_ms: 60_000,
        })
    );
}

#[test]
fn round_ends_reason_values_are_snake_case() {
    for (reason, tag) in [
        (RoundEndReason::TimeUp, "time_up"),
        (RoundEndReason::Guessed, "guessed"),
        (RoundEndReason::HostEnded, "host_ended"),
    ] {
        let event = ServerEvent::RoundEnds(RoundEndInfo {
            reason,
            word: "OTTER".into(),
            winner_player_id: None,
            winner_nickname: None,
            points_awarded: 0,
        });
        let value: Value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["data"]["reason"], tag);
        // Absent winner fields are omitted, not null.
        assert!(value["data"].get("winnerPlayerId").is_none());
    }
}

#[test]
fn match_ended_parses_summary() {
    let raw = r#"{
        "type": "match-ended",
        "data": {
            "rankings": [
                {"playerId": "00000000-0000-0000-0000-000000000002", "nickname": "Bo", "score": 30}
            ],
            "winners": ["00000000-0000-0000-0000-000000000002"],
            "reviewRows": [
                {"round": 1, "word": "OTTER", "winnerNickname": "Bo", "pointsAwarded": 30}
            ]
        }
    }"#;
    let event: ServerEvent = serde_json::from_str(raw).expect("parse");
    let ServerEvent::MatchEnded(summary) = event else {
        panic!("expected MatchEnded");
    };
    assert_eq!(summary.rankings.len(), 1);
    assert_eq!(summary.winners, vec![Uuid::from_u128(2)]);
    assert_eq!(summary.review_rows[0].word, "OTTER");
}

#[test]
fn guess_result_parses_with_and_without_points() {
    let with: ServerEvent =
        serde_json::from_str(r#"{"type":"guess-result","data":{"status":"correct","points":25}}"#)
            .expect("parse");
    assert_eq!(
        with,
        ServerEvent::GuessResult {
            status: GuessOutcome::Correct,
            points: Some(25),
        }
    );

    let without: ServerEvent =
        serde_json::from_str(r#"{"type":"guess-result","data":{"status":"incorrect"}}"#)
            .expect("parse");
    assert_eq!(
        without,
        ServerEvent::GuessResult {
            status: GuessOutcome::Incorrect,
            points: None,
        }
    );
}

#[test]
fn server_error_message_is_optional() {
    let bare: ServerEvent =
        serde_json::from_str(r#"{"type":"server-error","data":{}}"#).expect("parse");
    assert_eq!(bare, ServerEvent::ServerError { message: None });
}

#[test]
fn match_lifecycle_events_round_trip() {
    let events = vec![
        ServerEvent::MatchStarted,
        ServerEvent::MatchTick {
            remaining_seconds: 17,
        },
        ServerEvent::MatchEnded(Box::new(MatchSummary::default())),
    ];
    for event in events {
        let json = serde_json::to_string(&event).expect("serialize");
        let back: ServerEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}

#[test]
fn player_info_wire_names_are_camel_case() {
    let player = PlayerInfo {
        id: Uuid::from_u128(1),
        nickname: "Ann".into(),
        score: 3,
        connected: false,
        is_host: true,
    };
    let value: Value = serde_json::to_value(&player).expect("serialize");
    assert_eq!(value["isHost"], true);
    assert_eq!(value["connected"], false);
    assert!(value.get("is_host").is_none());
}

#[test]
fn snapshot_payload_round_trips() {
    let payload = RoomSnapshotPayload {
        room_code: "ZZ09".into(),
        status: RoomStatus::Finished,
        players: vec![PlayerInfo {
            id: Uuid::from_u128(5),
            nickname: "Eve".into(),
            score: 0,
            connected: true,
            is_host: false,
        }],
    };
    let json = serde_json::to_string(&payload).expect("serialize");
    let back: RoomSnapshotPayload = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, payload);
}

#[test]
fn unknown_event_type_fails_to_parse() {
    let result = serde_json::from_str::<ServerEvent>(r#"{"type":"mystery","data":{}}"#);
    assert!(result.is_err());
}
