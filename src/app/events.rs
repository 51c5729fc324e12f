//! Outbound node events.
//!
//! [`E133Node`](super::node::E133Node) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters decide whether they
//! go to the log, a status page, or a test recorder.

use std::net::SocketAddrV4;

/// Structured events emitted by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// The discovery client attached to its channel.
    Connected,

    /// The discovery client detached; in-flight calls were drained.
    Disconnected { drained: usize },

    /// The SLP server answered a registration.
    Registered { url: String, error_code: u16 },

    /// The SLP server answered a deregistration.
    Deregistered { url: String, error_code: u16 },

    /// A register/deregister call did not complete.
    DiscoveryFailed {
        operation: &'static str,
        reason: String,
    },

    /// A controller search finished.
    ControllersFound {
        count: usize,
        selected: Option<SocketAddrV4>,
    },
}
