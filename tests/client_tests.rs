#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Integration-style client tests for the Word Rush Client.
//!
//! Uses the shared `MockTransport` from `tests/common` to script server
//! pushes and verify that `WordRushClient` processes them correctly:
//! canonical state transitions, command acknowledgement handling, derived
//! views, and event delivery.

mod common;

use std::time::Duration;

use word_rush_client::protocol::{RoomStatus, RoundEndReason};
use word_rush_client::{
    WordRushClient, WordRushConfig, WordRushError, WordRushEvent,
};

use common::{
    ack_json, guess_result_json, match_ended_json, match_started_json, match_tick_json, player,
    round_begins_json, round_ends_json, server_error_json, snapshot_json, MockTransport,
};

// ════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════

/// Start a client over a scripted transport with a short shutdown timeout.
#[allow(clippy::type_complexity)]
fn start_client(
    script: Vec<(usize, Option<Result<String, WordRushError>>)>,
) -> (
    WordRushClient,
    tokio::sync::mpsc::Receiver<WordRushEvent>,
    std::sync::Arc<std::sync::Mutex<Vec<String>>>,
) {
    let (transport, sent, _closed) = MockTransport::new(script);
    let config = WordRushConfig::new()
        .with_invite_origin("https://play.wordrush.io")
        .with_shutdown_timeout(Duration::from_millis(200));
    let (client, events) = WordRushClient::start(transport, config);
    (client, events, sent)
}

/// Receive events until `pred` matches, panicking after `limit` events.
async fn recv_until(
    events: &mut tokio::sync::mpsc::Receiver<WordRushEvent>,
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

// ════════════════════════════════════════════════════════════════════
// Full match lifecycle
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn full_match_lifecycle() {
    let far_deadline = u64::MAX;
    let (mut client, mut events, _sent) = start_client(vec![
        // create-room ack, then the authoritative lobby snapshot.
        (1, Some(Ok(ack_json(1, true, None, Some(uuid::Uuid::from_u128(1)))))),
        (
            1,
            Some(Ok(snapshot_json(
                "AB12",
                RoomStatus::Lobby,
                vec![player(1, "Ann", 0)],
            ))),
        ),
        // start-match ack and lifecycle events.
        (2, Some(Ok(ack_json(2, true, None, None)))),
        (2, Some(Ok(match_started_json()))),
        (2, Some(Ok(round_begins_json("_ _ _ _ _ _ _", far_deadline, 60_000)))),
        // A guess goes out (3rd send), then its result and the round end.
        (3, Some(Ok(guess_result_json(true, Some(30))))),
        (3, Some(Ok(round_ends_json(RoundEndReason::Guessed, "OTTER", 30)))),
        (3, Some(Ok(match_ended_json()))),
        // reset-for-replay ack and the lobby snapshot that completes it.
        (4, Some(Ok(ack_json(3, true, None, None)))),
        (
            4,
            Some(Ok(snapshot_json(
                "AB12",
                RoomStatus::Lobby,
                vec![player(1, "Ann", 0), player(2, "Bo", 0)],
            ))),
        ),
    ]);

    // Create the room.
    let ack = client.create_room("Ann").await.expect("create_room");
    assert!(ack.ok);
    assert!(client.is_joined());

    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoomSnapshot { .. })
    })
    .await;
    assert_eq!(client.match_state().await.status, RoomStatus::Lobby);
    assert_eq!(
        client.invite_link().await,
        "https://play.wordrush.io/?room=AB12"
    );

    // Start the match and play a round.
    let ack = client.start_match().await.expect("start_match");
    assert!(ack.ok);

    recv_until(&mut events, 16, |e| {
        matches!(e, WordRushEvent::RoundBegan { .. })
    })
    .await;
    let state = client.match_state().await;
    assert_eq!(state.status, RoomStatus::InGame);
    assert!(state.round.is_some());

    client.submit_guess("otter").expect("submit_guess");

    recv_until(&mut events, 32, |e| {
        matches!(e, WordRushEvent::RoundEnded { .. })
    })
    .await;
    let state = client.match_state().await;
    assert!(state.round.is_none());
    let end = state.round_end.expect("round end summary");
    assert_eq!(end.word, "OTTER");
    assert_eq!(end.reason, RoundEndReason::Guessed);

    recv_until(&mut events, 16, |e| {
        matches!(e, WordRushEvent::MatchEnded { .. })
    })
    .await;
    let state = client.match_state().await;
    assert_eq!(state.status, RoomStatus::Finished);
    let result = state.match_result.expect("match result");
    assert_eq!(result.rankings[0].nickname, "Bo");
    assert_eq!(result.review_rows.len(), 1);

    // Replay: the reset ack alone changes nothing. The lobby snapshot is
    // what returns the room to the lobby and clears the results.
    let ack = client.reset_for_replay().await.expect("reset_for_replay");
    assert!(ack.ok);

    recv_until(&mut events, 16, |e| {
        matches!(
            e,
            WordRushEvent::RoomSnapshot {
                status: RoomStatus::Lobby,
                ..
            }
        )
    })
    .await;
    let state = client.match_state().await;
    assert_eq!(state.status, RoomStatus::Lobby);
    assert!(state.match_result.is_none());
    assert!(state.round_end.is_none());
    assert_eq!(state.players.len(), 2);

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Snapshot semantics
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn redelivered_snapshot_is_idempotent() {
    let snapshot = snapshot_json(
        "AB12",
        RoomStatus::InGame,
        vec![player(1, "Ann", 5), player(2, "Bo", 3)],
    );
    let (mut client, mut events, _sent) = start_client(vec![
        (0, Some(Ok(snapshot.clone()))),
        (0, Some(Ok(snapshot))),
    ]);

    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoomSnapshot { .. })
    })
    .await;
    let first = client.match_state().await;

    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoomSnapshot { .. })
    })
    .await;
    let second = client.match_state().await;

    assert_eq!(first, second);

    client.shutdown().await;
}

#[tokio::test]
async fn snapshot_replaces_rather_than_merges_players() {
    let (mut client, mut events, _sent) = start_client(vec![
        (
            0,
            Some(Ok(snapshot_json(
                "AB12",
                RoomStatus::Lobby,
                vec![player(1, "Ann", 0), player(2, "Bo", 0), player(3, "Cy", 0)],
            ))),
        ),
        (
            0,
            Some(Ok(snapshot_json(
                "AB12",
                RoomStatus::Lobby,
                vec![player(2, "Bo", 0)],
            ))),
        ),
    ]);

    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoomSnapshot { players, .. } if players.len() == 1)
    })
    .await;

    let state = client.match_state().await;
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].nickname, "Bo");

    client.shutdown().await;
}

#[tokio::test]
async fn leaderboard_is_stable_under_ties() {
    let (mut client, mut events, _sent) = start_client(vec![(
        0,
        Some(Ok(snapshot_json(
            "AB12",
            RoomStatus::InGame,
            vec![
                player(1, "Ann", 5),
                player(2, "Bo", 8),
                player(3, "Cy", 5),
                player(4, "Di", 5),
            ],
        ))),
    )]);

    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoomSnapshot { .. })
    })
    .await;

    let board = client.leaderboard().await;
    let names: Vec<&str> = board.iter().map(|p| p.nickname.as_str()).collect();
    assert_eq!(names, vec!["Bo", "Ann", "Cy", "Di"]);

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Acknowledgement correlation
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn sequential_commands_get_their_own_acks() {
    let (mut client, mut events, sent) = start_client(vec![
        (1, Some(Ok(ack_json(1, true, None, Some(uuid::Uuid::from_u128(7)))))),
        (2, Some(Ok(ack_json(2, false, Some("Match already running."), None)))),
    ]);
    let _ = events.recv().await; // Connected

    let first = client.join_room("ab12", "Ann").await.expect("join_room");
    assert!(first.ok);
    assert_eq!(first.player_id, Some(uuid::Uuid::from_u128(7)));

    let second = client.start_match().await.expect("start_match");
    assert!(!second.ok);
    assert_eq!(
        client.last_error().await.as_deref(),
        Some("Match already running.")
    );

    // Both envelopes carried distinct seqs.
    {
        let messages = sent.lock().unwrap();
        let first: serde_json::Value = serde_json::from_str(&messages[0]).unwrap();
        let second: serde_json::Value = serde_json::from_str(&messages[1]).unwrap();
        assert_eq!(first["seq"], 1);
        assert_eq!(second["seq"], 2);
        assert_eq!(first["type"], "join-room");
        assert_eq!(second["type"], "start-match");
    }

    client.shutdown().await;
}

#[tokio::test]
async fn busy_flag_is_visible_while_request_is_in_flight() {
    // The ack never arrives; the request stays pending.
    let (client, mut events, _sent) = start_client(vec![]);
    let _ = events.recv().await; // Connected

    let client = std::sync::Arc::new(client);
    let pending = {
        let client = std::sync::Arc::clone(&client);
        tokio::spawn(async move { client.start_match().await })
    };

    while !client.is_busy() {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert!(client.is_busy());

    pending.abort();
    let _ = pending.await;
}

// ════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn unsolicited_server_error_is_surfaced_and_clears_guard() {
    let (mut client, mut events, _sent) =
        start_client(vec![(0, Some(Ok(server_error_json(Some("room expired")))))]);

    let event = recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::ServerError { .. })
    })
    .await;
    assert_eq!(
        event,
        WordRushEvent::ServerError {
            message: "room expired".into()
        }
    );
    assert!(!client.is_busy());
    assert_eq!(client.last_error().await.as_deref(), Some("room expired"));

    // Dismissable: clearing works and nothing else was touched.
    client.clear_last_error().await;
    assert!(client.last_error().await.is_none());

    client.shutdown().await;
}

#[tokio::test]
async fn malformed_json_is_skipped_without_killing_the_loop() {
    let (mut client, mut events, _sent) = start_client(vec![
        (0, Some(Ok("{not json".into()))),
        (0, Some(Ok("{\"type\":\"no-such-event\"}".into()))),
        (
            0,
            Some(Ok(snapshot_json(
                "AB12",
                RoomStatus::Lobby,
                vec![player(1, "Ann", 0)],
            ))),
        ),
    ]);

    // The valid snapshot after two bad frames still lands.
    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoomSnapshot { .. })
    })
    .await;
    assert_eq!(client.match_state().await.room_code.as_deref(), Some("AB12"));

    client.shutdown().await;
}

#[tokio::test]
async fn transport_error_emits_disconnected_with_reason() {
    let (mut client, mut events, _sent) = start_client(vec![(
        0,
        Some(Err(WordRushError::TransportReceive("boom".into()))),
    )]);

    let event = recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::Disconnected { .. })
    })
    .await;
    if let WordRushEvent::Disconnected { reason } = event {
        assert!(reason.unwrap().contains("boom"));
    }
    assert!(!client.is_connected());

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Round clock and server ticks
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn match_tick_is_recorded_and_cleared_with_the_round() {
    let (mut client, mut events, _sent) = start_client(vec![
        (0, Some(Ok(round_begins_json("_ _ _ _ _", u64::MAX, 60_000)))),
        (0, Some(Ok(match_tick_json(42)))),
        (0, Some(Ok(round_ends_json(RoundEndReason::TimeUp, "CAT", 0)))),
    ]);

    recv_until(&mut events, 16, |e| {
        matches!(e, WordRushEvent::MatchTick { .. })
    })
    .await;
    assert_eq!(client.match_state().await.server_remaining_seconds, Some(42));

    recv_until(&mut events, 16, |e| {
        matches!(e, WordRushEvent::RoundEnded { .. })
    })
    .await;
    assert_eq!(client.match_state().await.server_remaining_seconds, None);

    client.shutdown().await;
}

#[tokio::test]
async fn overdue_round_is_retained_until_server_says_otherwise() {
    // Deadline in the past, no round-ends scripted.
    let (mut client, mut events, _sent) =
        start_client(vec![(0, Some(Ok(round_begins_json("_ _ _ _ _", 5_000, 5_000))))]);

    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoundBegan { .. })
    })
    .await;

    // The countdown clamps at zero…
    let tick = recv_until(&mut events, 32, |e| {
        matches!(e, WordRushEvent::CountdownTick { .. })
    })
    .await;
    if let WordRushEvent::CountdownTick {
        remaining_ms,
        progress,
        ..
    } = tick
    {
        assert_eq!(remaining_ms, 0);
        assert_eq!(progress, 0.0);
    }

    // …but the round reference is untouched.
    let state = client.match_state().await;
    assert!(state.round.is_some());
    assert!(state.round_end.is_none());

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Guess preview and feedback
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn guess_preview_overlays_typed_letters() {
    let (mut client, mut events, _sent) = start_client(vec![(
        0,
        Some(Ok(round_begins_json("_ _ _ _ _", u64::MAX, 60_000))),
    )]);

    recv_until(&mut events, 8, |e| {
        matches!(e, WordRushEvent::RoundBegan { .. })
    })
    .await;

    assert_eq!(client.guess_preview("cat").await.as_deref(), Some("_ C A T _"));
    assert_eq!(client.guess_preview("c4t").await.as_deref(), Some("_ C _ T _"));
    // Never transmitted: previewing produced no outbound traffic.

    client.shutdown().await;
}

#[tokio::test]
async fn superseding_guess_feedback_yields_single_expiry() {
    let (mut client, mut events, _sent) = start_client(vec![
        (0, Some(Ok(guess_result_json(false, None)))),
        (0, Some(Ok(guess_result_json(true, Some(25))))),
    ]);
    let mut rx = client.guess_feedback().subscribe();

    recv_until(&mut events, 8, |e| {
        matches!(
            e,
            WordRushEvent::GuessResult {
                status: word_rush_client::protocol::GuessOutcome::Correct,
                ..
            }
        )
    })
    .await;

    // The second result superseded the first; only the newest is visible.
    let feedback = common::current_feedback(&client).expect("feedback value");
    assert_eq!(feedback.message, "Correct! +25");

    // The pending change is the newest value, not a stale null-transition
    // from the superseded value's timer. (Expiry timing itself is covered by
    // the feedback module's paused-clock tests.)
    let mut seen = Vec::new();
    while rx.has_changed().unwrap_or(false) {
        seen.push(rx.borrow_and_update().clone());
    }
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|v| v.is_some()));

    client.shutdown().await;
}

#[tokio::test]
async fn copy_notice_slot_is_set_and_cleared() {
    let (mut client, mut events, _sent) = start_client(vec![]);
    let _ = events.recv().await; // Connected

    assert!(client.copy_notice().get().is_none());
    client.mark_invite_copied();
    assert_eq!(
        client.copy_notice().get().as_deref(),
        Some("Invite link copied!")
    );

    client.shutdown().await;
    assert!(client.copy_notice().get().is_none());
}
