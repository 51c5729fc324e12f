//! Unified error types for the E1.33 node.
//!
//! Every subsystem error converts into the crate-wide [`Error`], so callers
//! at the edge (node orchestration, embedding process) handle one type.
//! RDM protocol failures are not errors at this level: they become NACK
//! responses inside the root endpoint and never leave it as `Err`.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An RPC could not be issued or did not complete successfully.
    Rpc(RpcError),
    /// Node configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc(e) => write!(f, "rpc: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// RPC errors
// ---------------------------------------------------------------------------

/// Failures of the RPC correlation layer.
///
/// Connection-state variants are returned synchronously from `issue`;
/// the rest are delivered to the caller's continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// No channel is attached.
    NotConnected,
    /// A channel is already attached.
    AlreadyConnected,
    /// The request could not be serialised.
    Encode(String),
    /// The channel reported a failed call.
    Transport(String),
    /// The reply bytes did not decode into the expected message.
    Decode(String),
    /// The client disconnected while the call was in flight.
    ConnectionClosed,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::AlreadyConnected => write!(f, "already connected"),
            Self::Encode(msg) => write!(f, "request encode failed: {msg}"),
            Self::Transport(msg) if msg.is_empty() => write!(f, "transport failure"),
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
            Self::Decode(msg) => write!(f, "reply decode failed: {msg}"),
            Self::ConnectionClosed => write!(f, "connection closed before reply"),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<RpcError> for Error {
    fn from(e: RpcError) -> Self {
        Self::Rpc(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
