//! E1.33 node orchestration.
//!
//! ```text
//!  RpcChannel ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │           E133Node            │
//!  RDM receiver ─▶│ DiscoveryClient · RootEndpoint│ ◀── EndpointRegistry
//!                 └──────────────────────────────┘
//! ```
//!
//! Lifecycle: [`start`](E133Node::start) connects and registers the device
//! URL, [`withdraw`](E133Node::withdraw) deregisters it, and
//! [`stop`](E133Node::stop) deregisters whatever is left and disconnects.
//! Discovery results arrive later, on the channel's thread, as
//! [`NodeEvent`]s.

use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};

use crate::config::{NodeConfig, parse_service_address};
use crate::e133::{RootEndpoint, TcpConnectionStats};
use crate::error::{Result, RpcError};
use crate::rdm::{RdmCallback, RdmHandler, RdmRequest};
use crate::rpc::RpcChannel;
use crate::slp::messages::error_code_name;
use crate::slp::{ConnectionState, DiscoveryClient, RegistrationCallback, SlpService};

use super::events::NodeEvent;
use super::ports::{EndpointRegistry, EventSink};

pub struct E133Node<C: RpcChannel, R: EndpointRegistry> {
    config: NodeConfig,
    discovery: DiscoveryClient<C>,
    endpoint: RootEndpoint<R>,
    tcp_stats: Arc<TcpConnectionStats>,
    sink: Arc<dyn EventSink>,
    /// URL passed to the last successful register call.
    registered_url: Option<String>,
}

impl<C: RpcChannel, R: EndpointRegistry> E133Node<C, R> {
    /// Build a node from a validated config. Nothing is connected yet.
    pub fn new(config: NodeConfig, registry: Arc<R>, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        let tcp_stats = Arc::new(TcpConnectionStats::new());
        let endpoint = RootEndpoint::new(config.uid, registry, Arc::clone(&tcp_stats));
        info!("node: uid={} scopes={:?}", config.uid, config.scopes);
        Ok(Self {
            config,
            discovery: DiscoveryClient::new(),
            endpoint,
            tcp_stats,
            sink,
            registered_url: None,
        })
    }

    /// Parse a JSON [`NodeConfig`] and build the node.
    pub fn from_json(
        json: &str,
        registry: Arc<R>,
        sink: Arc<dyn EventSink>,
    ) -> anyhow::Result<Self> {
        let config: NodeConfig = serde_json::from_str(json).context("parsing node config")?;
        Self::new(config, registry, sink).context("building node")
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.discovery.state()
    }

    pub fn root_endpoint(&self) -> &RootEndpoint<R> {
        &self.endpoint
    }

    pub fn tcp_stats(&self) -> &Arc<TcpConnectionStats> {
        &self.tcp_stats
    }

    pub fn registered_url(&self) -> Option<&str> {
        self.registered_url.as_deref()
    }

    /// Connect to the SLP server over `channel` and register this device
    /// as reachable at `ip`.
    pub fn start(&mut self, channel: C, ip: Ipv4Addr) -> Result<()> {
        self.discovery.connect(channel)?;
        self.sink.emit(&NodeEvent::Connected);

        let url = self.config.service_url(ip);
        let callback = self.ack_callback("register", url.clone(), |url, error_code| {
            NodeEvent::Registered { url, error_code }
        });
        self.discovery.register(
            self.config.scopes.as_slice(),
            &url,
            self.config.lifetime,
            self.config.persistent,
            Some(callback),
        )?;
        self.registered_url = Some(url);
        Ok(())
    }

    /// Deregister the device URL. A no-op if nothing was registered.
    pub fn withdraw(&mut self) -> Result<()> {
        let Some(url) = self.registered_url.clone() else {
            return Ok(());
        };
        let callback = self.ack_callback("deregister", url.clone(), |url, error_code| {
            NodeEvent::Deregistered { url, error_code }
        });
        self.discovery
            .deregister_service(self.config.scopes.as_slice(), &url, Some(callback))?;
        self.registered_url = None;
        Ok(())
    }

    /// Deregister the device URL if still registered, then disconnect.
    ///
    /// The deregistration is sent without waiting for its answer. Calls
    /// still in flight, including that one, fail with `ConnectionClosed`.
    /// Use [`withdraw`](Self::withdraw) first to observe the server's reply.
    pub fn stop(&mut self) {
        if self.discovery.state() == ConnectionState::Disconnected {
            return;
        }
        if let Some(url) = self.registered_url.take() {
            let scopes = self.config.scopes.as_slice();
            if let Err(e) = self.discovery.deregister_service(scopes, &url, None) {
                warn!("node: deregister {} on stop failed: {}", url, e);
            }
        }
        let drained = self.discovery.disconnect();
        self.sink.emit(&NodeEvent::Disconnected { drained });
    }

    /// Search for controllers. The first one found becomes the controller
    /// reported through TCP_COMMS_STATUS.
    pub fn locate_controllers(&mut self) -> Result<()> {
        let sink = Arc::clone(&self.sink);
        let stats = Arc::clone(&self.tcp_stats);
        self.discovery.find_service(
            self.config.scopes.as_slice(),
            &self.config.controller_service_type,
            Some(Box::new(move |result| match result {
                Ok(services) => {
                    let selected = select_controller(&services);
                    if let Some(addr) = selected {
                        stats.set_controller(*addr.ip());
                    }
                    info!("node: {} controller(s), selected {:?}", services.len(), selected);
                    sink.emit(&NodeEvent::ControllersFound {
                        count: services.len(),
                        selected,
                    });
                }
                Err(e) => report_failure(sink.as_ref(), "find", &e),
            })),
        )?;
        Ok(())
    }

    /// Hand an inbound RDM request to the root endpoint.
    pub fn handle_rdm(&self, request: RdmRequest, on_complete: RdmCallback) {
        self.endpoint.send_rdm_request(request, on_complete);
    }

    fn ack_callback(
        &self,
        operation: &'static str,
        url: String,
        event: fn(String, u16) -> NodeEvent,
    ) -> RegistrationCallback {
        let sink = Arc::clone(&self.sink);
        Box::new(move |result| match result {
            Ok(code) => {
                if code == 0 {
                    info!("node: {} {} ok", operation, url);
                } else {
                    warn!("node: {} {} -> {}", operation, url, error_code_name(code));
                }
                sink.emit(&event(url, code));
            }
            Err(e) => report_failure(sink.as_ref(), operation, &e),
        })
    }
}

fn select_controller(services: &[SlpService]) -> Option<std::net::SocketAddrV4> {
    services.iter().find_map(|s| parse_service_address(&s.url))
}

fn report_failure(sink: &dyn EventSink, operation: &'static str, e: &RpcError) {
    warn!("node: {} failed: {}", operation, e);
    sink.emit(&NodeEvent::DiscoveryFailed {
        operation,
        reason: e.to_string(),
    });
}
