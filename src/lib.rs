//! # Word Rush Client
//!
//! Transport-agnostic Rust client for the Word Rush multiplayer
//! word-guessing protocol.
//!
//! This crate is the client-side state synchronization engine: it ingests
//! push events from the authoritative game server over any bidirectional
//! text transport, maintains a canonical local [`MatchState`], derives
//! presentation-only projections (leaderboard, countdown, guess preview,
//! invite link), and gates outbound commands against in-flight requests.
//! Game rules — word selection, scoring, host arbitration — live on the
//! server and are only ever reflected here, never decided.
//!
//! ## Features
//!
//! - **Transport-agnostic** — implement the [`Transport`] trait for any backend
//! - **WebSocket built-in** — default `transport-websocket` feature provides
//!   [`WebSocketTransport`]
//! - **Event-driven** — receive typed [`WordRushEvent`]s via a channel
//! - **Deadline-reconciled countdown** — remaining time is recomputed from
//!   the round's absolute deadline on every poll, so the display
//!   self-corrects after delivery delays or suspended timers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let config = WordRushConfig::new().with_endpoint("wss://play.wordrush.io/ws");
//! let (client, mut events) = WordRushClient::establish(config).await?;
//!
//! let ack = client.create_room("Ann").await?;
//! if ack.ok {
//!     println!("invite: {}", client.invite_link().await);
//! }
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         WordRushEvent::RoundBegan { .. } => { /* … */ }
//!         WordRushEvent::Disconnected { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

pub mod client;
pub mod clock;
pub mod error;
pub mod event;
pub mod feedback;
pub mod protocol;
pub mod state;
pub mod transport;
pub mod transports;
pub mod views;

// Re-export primary types for ergonomic imports.
pub use client::{WordRushClient, WordRushConfig, SERVICE_STATUS_ONLINE};
pub use clock::Urgency;
pub use error::WordRushError;
pub use event::WordRushEvent;
pub use feedback::{GuessFeedback, TransientSlot};
pub use protocol::{ClientCommand, CommandAck, RoomStatus, ServerEvent};
pub use state::MatchState;
pub use transport::Transport;

#[cfg(feature = "transport-websocket")]
pub use transports::WebSocketTransport;
