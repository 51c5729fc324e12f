//! Port traits at the hexagonal boundary between the node core and its collaborators.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RootEndpoint / E133Node
//! ```
//!
//! The endpoint registry is owned by the surrounding device; the root
//! endpoint only queries and mutates it through [`EndpointRegistry`]. The
//! registry is shared with whatever else drives the endpoints, so every
//! method takes `&self` and synchronization is the implementation's job.

use core::fmt;

use super::events::NodeEvent;

/// Maximum RDM label length in bytes.
pub const MAX_LABEL_LEN: usize = 32;

/// Fixed-capacity endpoint label.
pub type EndpointLabel = heapless::String<MAX_LABEL_LEN>;

/// E1.37-7 endpoint number.
pub type EndpointId = u16;

// ───────────────────────────────────────────────────────────────
// Endpoint registry port
// ───────────────────────────────────────────────────────────────

/// Read-mostly view of the device's endpoints.
pub trait EndpointRegistry {
    /// Endpoint numbers in registry order.
    fn endpoints(&self) -> Vec<EndpointId>;

    /// Bumped every time the endpoint list changes.
    fn list_change_number(&self) -> u32;

    fn is_valid_endpoint(&self, endpoint: EndpointId) -> bool;

    fn identify_mode(&self, endpoint: EndpointId) -> Result<bool, RegistryError>;

    fn set_identify_mode(&self, endpoint: EndpointId, on: bool) -> Result<(), RegistryError>;

    fn label(&self, endpoint: EndpointId) -> Result<EndpointLabel, RegistryError>;

    /// Replace the label. Labels longer than [`MAX_LABEL_LEN`] are rejected.
    fn set_label(&self, endpoint: EndpointId, label: &str) -> Result<(), RegistryError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port
// ───────────────────────────────────────────────────────────────

/// The node emits [`NodeEvent`]s here. Discovery outcomes arrive on the
/// channel's completion thread, so sinks are shared and take `&self`.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &NodeEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`EndpointRegistry`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No endpoint with that number.
    UnknownEndpoint,
    /// Label exceeds [`MAX_LABEL_LEN`].
    LabelTooLong,
    /// The backing store failed.
    Backend,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEndpoint => write!(f, "unknown endpoint"),
            Self::LabelTooLong => write!(f, "label longer than {MAX_LABEL_LEN} bytes"),
            Self::Backend => write!(f, "registry backend failure"),
        }
    }
}

impl std::error::Error for RegistryError {}
