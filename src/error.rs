//! Error types for the Word Rush client.

use thiserror::Error;

/// Errors that can occur when using the Word Rush client.
#[derive(Debug, Error)]
pub enum WordRushError {
    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed unexpectedly.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a protocol message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Attempted an operation that requires an active connection, but the client is not connected.
    #[error("not connected to server")]
    NotConnected,

    /// No server endpoint was configured. Fatal: the client never attempts a
    /// connection and there is nothing to retry until the deployment is fixed.
    #[error("no server endpoint configured")]
    MissingEndpoint,

    /// The service status flag disables room creation and joining.
    /// The message matches what the server-side maintenance page shows.
    #[error("Game is in maintenance mode.")]
    Maintenance,

    /// A local precondition check failed before any network call was made.
    #[error("{0}")]
    InvalidInput(String),

    /// An acknowledgement-requiring command is already in flight.
    #[error("another request is already in flight")]
    CommandInFlight,

    /// The in-flight command's acknowledgement was dropped before arriving
    /// (server error push or disconnect released the request guard).
    #[error("command interrupted before acknowledgement")]
    CommandInterrupted,

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for Word Rush client operations.
pub type Result<T> = std::result::Result<T, WordRushError>;
