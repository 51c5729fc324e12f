//! TCP connection statistics reported through TCP_COMMS_STATUS.
//!
//! Updated by whatever owns the controller connection, read by the root
//! endpoint. A snapshot is not atomic across fields.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};
use std::net::Ipv4Addr;

/// Point-in-time copy of [`TcpConnectionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpStatsSnapshot {
    pub controller: Ipv4Addr,
    pub unhealthy_events: u16,
    pub connection_events: u16,
}

impl TcpStatsSnapshot {
    /// TCP_COMMS_STATUS GET payload: IPv4, unhealthy events, connection events.
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&self.controller.octets());
        out[4..6].copy_from_slice(&self.unhealthy_events.to_be_bytes());
        out[6..].copy_from_slice(&self.connection_events.to_be_bytes());
        out
    }
}

#[derive(Debug, Default)]
pub struct TcpConnectionStats {
    controller: AtomicU32,
    unhealthy_events: AtomicU16,
    connection_events: AtomicU16,
}

impl TcpConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the controller currently connected, `0.0.0.0` if none.
    pub fn set_controller(&self, addr: Ipv4Addr) {
        self.controller.store(u32::from(addr), Ordering::Relaxed);
    }

    pub fn controller(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.controller.load(Ordering::Relaxed))
    }

    /// Counts saturate at `u16::MAX`.
    pub fn record_unhealthy_event(&self) {
        saturating_bump(&self.unhealthy_events);
    }

    pub fn record_connection(&self) {
        saturating_bump(&self.connection_events);
    }

    pub fn snapshot(&self) -> TcpStatsSnapshot {
        TcpStatsSnapshot {
            controller: self.controller(),
            unhealthy_events: self.unhealthy_events.load(Ordering::Relaxed),
            connection_events: self.connection_events.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.controller.store(0, Ordering::Relaxed);
        self.unhealthy_events.store(0, Ordering::Relaxed);
        self.connection_events.store(0, Ordering::Relaxed);
    }
}

fn saturating_bump(counter: &AtomicU16) {
    // fetch_update only errs when the closure returns None, i.e. at the cap.
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1));
}
