//! Discovery client: register, deregister and find on top of the correlator.

use log::{debug, info};

use super::messages::{
    DEREGISTER_SERVICE, FIND_SERVICE, REGISTER_SERVICE, ServiceAck, ServiceDeRegistration,
    ServiceRegistration, ServiceRequest,
};
use super::service::{normalize_scopes, services_from_reply};
use super::{FindCallback, RegistrationCallback};
use crate::error::RpcError;
use crate::rpc::{RpcChannel, RpcCorrelator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

fn ack_code(ack: ServiceAck) -> u16 {
    ack.error_code
}

/// SLP discovery client bound to at most one channel at a time.
///
/// Every operation returns as soon as the request is handed to the channel.
/// Its callback runs later with the server's answer. When an operation
/// returns `Err`, the callback has been dropped and will never run.
pub struct DiscoveryClient<C: RpcChannel> {
    rpc: RpcCorrelator<C>,
}

impl<C: RpcChannel> DiscoveryClient<C> {
    pub fn new() -> Self {
        Self {
            rpc: RpcCorrelator::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.rpc.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Calls still waiting for the server.
    pub fn outstanding(&self) -> usize {
        self.rpc.outstanding()
    }

    /// Attach `channel`. Fails with [`RpcError::AlreadyConnected`] if
    /// connected, dropping the offered channel.
    pub fn connect(&mut self, channel: C) -> Result<(), RpcError> {
        self.rpc.attach(channel)?;
        info!("slp: connected");
        Ok(())
    }

    /// Fail every outstanding call with [`RpcError::ConnectionClosed`] and
    /// close the channel. Safe to call when already disconnected. Returns
    /// how many calls were drained.
    pub fn disconnect(&mut self) -> usize {
        if !self.rpc.is_connected() {
            return 0;
        }
        let drained = self.rpc.detach();
        info!("slp: disconnected ({} call(s) drained)", drained);
        drained
    }

    /// Register a service that lives only as long as this connection.
    pub fn register_service<S: AsRef<str>>(
        &mut self,
        scopes: &[S],
        url: &str,
        lifetime: u16,
        callback: Option<RegistrationCallback>,
    ) -> Result<(), RpcError> {
        self.register(scopes, url, lifetime, false, callback)
    }

    /// Register a service the server keeps after this client goes away.
    pub fn register_persistent_service<S: AsRef<str>>(
        &mut self,
        scopes: &[S],
        url: &str,
        lifetime: u16,
        callback: Option<RegistrationCallback>,
    ) -> Result<(), RpcError> {
        self.register(scopes, url, lifetime, true, callback)
    }

    pub fn register<S: AsRef<str>>(
        &mut self,
        scopes: &[S],
        url: &str,
        lifetime: u16,
        persistent: bool,
        callback: Option<RegistrationCallback>,
    ) -> Result<(), RpcError> {
        let request = ServiceRegistration {
            url: url.to_owned(),
            scopes: normalize_scopes(scopes),
            lifetime,
            persistent,
        };
        debug!(
            "slp: register {} lifetime={} persistent={}",
            request.url, lifetime, persistent
        );
        self.rpc
            .issue(&REGISTER_SERVICE, &request, ack_code, callback)
            .map(|_| ())
    }

    pub fn deregister_service<S: AsRef<str>>(
        &mut self,
        scopes: &[S],
        url: &str,
        callback: Option<RegistrationCallback>,
    ) -> Result<(), RpcError> {
        let request = ServiceDeRegistration {
            url: url.to_owned(),
            scopes: normalize_scopes(scopes),
        };
        debug!("slp: deregister {}", request.url);
        self.rpc
            .issue(&DEREGISTER_SERVICE, &request, ack_code, callback)
            .map(|_| ())
    }

    /// Find services of `service_type`. Results keep the server's order.
    pub fn find_service<S: AsRef<str>>(
        &mut self,
        scopes: &[S],
        service_type: &str,
        callback: Option<FindCallback>,
    ) -> Result<(), RpcError> {
        let request = ServiceRequest {
            service_type: service_type.to_owned(),
            scopes: normalize_scopes(scopes),
        };
        debug!("slp: find {}", request.service_type);
        self.rpc
            .issue(&FIND_SERVICE, &request, services_from_reply, callback)
            .map(|_| ())
    }
}

impl<C: RpcChannel> Default for DiscoveryClient<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: RpcChannel> Drop for DiscoveryClient<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
