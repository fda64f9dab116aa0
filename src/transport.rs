//! Transport abstraction for the Word Rush protocol.
//!
//! The [`Transport`] trait defines a bidirectional text message channel
//! between the client and the game server. The protocol uses JSON text
//! messages, so every transport implementation must handle message framing
//! internally (WebSocket frames, length-prefixed TCP, and so on).
//!
//! Connection setup is intentionally NOT part of this trait — different
//! transports have fundamentally different connection parameters. Construct a
//! connected transport externally, then pass it to
//! [`WordRushClient::start`](crate::WordRushClient::start), or let
//! [`WordRushClient::establish`](crate::WordRushClient::establish) build the
//! default WebSocket transport from the configured endpoint.

use async_trait::async_trait;

use crate::error::WordRushError;

/// A bidirectional text message transport for the Word Rush protocol.
///
/// Implementors shuttle serialized JSON strings between the client and
/// server. Each call to [`send`](Transport::send) transmits one complete JSON
/// message; each call to [`recv`](Transport::recv) returns one.
///
/// # Object Safety
///
/// The trait is object-safe, so `Box<dyn Transport>` works for dynamic
/// dispatch. `WordRushClient::start` accepts `impl Transport` (monomorphized)
/// for the common case.
///
/// # Cancel Safety
///
/// [`recv`](Transport::recv) **MUST** be cancel-safe because it is polled
/// inside `tokio::select!`. If `recv` is cancelled before completion, calling
/// it again must not lose data. Channel-based implementations are naturally
/// cancel-safe.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text message to the server.
    ///
    /// # Errors
    ///
    /// Returns [`WordRushError::TransportSend`] if the message could not be
    /// sent (connection broken, write buffer full).
    async fn send(&mut self, message: String) -> Result<(), WordRushError>;

    /// Receive the next JSON text message from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))` — a complete message was received
    /// - `Some(Err(e))` — a transport error occurred
    /// - `None` — the connection was closed cleanly by the server
    ///
    /// # Cancel Safety
    ///
    /// This method **MUST** be cancel-safe (see [trait documentation](Transport)).
    async fn recv(&mut self) -> Option<Result<String, WordRushError>>;

    /// Close the transport connection gracefully.
    ///
    /// After this call, subsequent `send`/`recv` calls may return errors or
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graceful shutdown fails. Implementations
    /// should still release resources even if the close handshake fails.
    async fn close(&mut self) -> Result<(), WordRushError>;
}
