//! # Basic Match Example
//!
//! Demonstrates a complete Word Rush client lifecycle:
//!
//! 1. Connect to a game server via WebSocket
//! 2. Create a room and share the invite link
//! 3. React to match events (snapshots, rounds, countdown, results)
//! 4. Shut down gracefully on Ctrl+C or disconnect
//!
//! ## Running
//!
//! ```sh
//! # Start a Word Rush server on localhost:4560, then:
//! cargo run --example basic_match
//!
//! # Override the server URL:
//! WORD_RUSH_URL=ws://my-server:4560/ws cargo run --example basic_match
//! ```

use word_rush_client::{WordRushClient, WordRushConfig, WordRushEvent};

/// Default server URL when `WORD_RUSH_URL` is not set.
const DEFAULT_URL: &str = "ws://localhost:4560/ws";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Initialize tracing. Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    // Both values are deployment configuration, never user-editable: a
    // missing URL is fatal (establish never attempts a connection), and a
    // status flag other than "online" disables room creation.
    let url = std::env::var("WORD_RUSH_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let status =
        std::env::var("WORD_RUSH_STATUS").unwrap_or_else(|_| "online".to_string());
    tracing::info!("Connecting to {url}");

    let config = WordRushConfig::new()
        .with_endpoint(url)
        .with_service_status(status)
        .with_invite_origin("https://play.wordrush.io");

    // ── Connect ─────────────────────────────────────────────────────
    // Establish the WebSocket transport and spawn the background task that
    // drives it, emitting events on `event_rx`.
    let (mut client, mut event_rx) = WordRushClient::establish(config).await?;

    // ── Event loop ──────────────────────────────────────────────────
    // Use `tokio::select!` to listen for both server events and Ctrl+C.
    loop {
        tokio::select! {
            // Branch 1: Incoming event from the server (or transport layer).
            event = event_rx.recv() => {
                let Some(event) = event else {
                    // Channel closed — transport loop exited.
                    tracing::info!("Event channel closed, exiting");
                    break;
                };

                match event {
                    // ── Synthetic: transport connected ───────────────
                    WordRushEvent::Connected => {
                        tracing::info!("Transport connected, creating a room…");

                        let ack = client.create_room("RustPlayer").await?;
                        if ack.ok {
                            tracing::info!(
                                "Room created, invite: {}",
                                client.invite_link().await
                            );
                        } else {
                            tracing::error!(
                                "Create rejected: {}",
                                ack.message.as_deref().unwrap_or("no reason given")
                            );
                            break;
                        }
                    }

                    // ── Room lifecycle ───────────────────────────────
                    WordRushEvent::RoomSnapshot { room_code, status, players } => {
                        tracing::info!(
                            "Room {room_code} [{status:?}]: {} player(s)",
                            players.len()
                        );
                        for row in client.leaderboard().await {
                            tracing::info!("  {:>4}  {}", row.score, row.nickname);
                        }
                    }

                    WordRushEvent::MatchStarted => {
                        tracing::info!("Match started!");
                    }

                    WordRushEvent::RoundBegan { round } => {
                        tracing::info!("Round began: {}  (hint: {})", round.display, round.hint);
                    }

                    WordRushEvent::CountdownTick { remaining_ms, urgency, .. } => {
                        tracing::debug!("{}s left ({urgency:?})", remaining_ms / 1000);
                    }

                    WordRushEvent::RoundEnded { end } => {
                        tracing::info!(
                            "Round over ({:?}): the word was {}",
                            end.reason,
                            end.word
                        );
                    }

                    WordRushEvent::MatchEnded { summary } => {
                        tracing::info!("Match over! Final standings:");
                        for row in &summary.rankings {
                            tracing::info!("  {:>4}  {}", row.score, row.nickname);
                        }
                        break;
                    }

                    WordRushEvent::GuessResult { status, points } => {
                        tracing::info!("Guess result: {status:?} (+{} pts)", points.unwrap_or(0));
                    }

                    // ── Errors from the server ───────────────────────
                    WordRushEvent::ServerError { message } => {
                        tracing::error!("Server error: {message}");
                    }

                    // ── Disconnect ───────────────────────────────────
                    WordRushEvent::Disconnected { reason } => {
                        tracing::warn!("Disconnected: {}", reason.as_deref().unwrap_or("unknown"));
                        break;
                    }

                    // ── Catch-all ────────────────────────────────────
                    other => {
                        tracing::debug!("Event: {other:?}");
                    }
                }
            }

            // Branch 2: Ctrl+C — shut down gracefully.
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down…");
                break;
            }
        }
    }

    // ── Cleanup ─────────────────────────────────────────────────────
    client.shutdown().await;
    tracing::info!("Client shut down. Goodbye!");
    Ok(())
}
