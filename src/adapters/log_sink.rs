//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing node events through the `log`
//! facade. Whatever logger the embedding process installs decides where
//! they end up.

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;
use crate::slp::messages::error_code_name;

/// Adapter that logs every [`NodeEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &NodeEvent) {
        match event {
            NodeEvent::Connected => info!("SLP   | connected"),
            NodeEvent::Disconnected { drained } => {
                info!("SLP   | disconnected, {} call(s) drained", drained);
            }
            NodeEvent::Registered { url, error_code } => {
                info!("REG   | {} -> {}", url, error_code_name(*error_code));
            }
            NodeEvent::Deregistered { url, error_code } => {
                info!("DEREG | {} -> {}", url, error_code_name(*error_code));
            }
            NodeEvent::DiscoveryFailed { operation, reason } => {
                warn!("SLP   | {} failed: {}", operation, reason);
            }
            NodeEvent::ControllersFound { count, selected } => match selected {
                Some(addr) => info!("CTRL  | {} found, using {}", count, addr),
                None => info!("CTRL  | {} found, none usable", count),
            },
        }
    }
}
