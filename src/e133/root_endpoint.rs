//! Root endpoint: answers the E1.33 and E1.37-7 PIDs addressed to the
//! device itself.
//!
//! ```text
//!   request ──▶ precondition ──▶ descriptor.check ──▶ handler ──▶ deliver
//!                   │                  │                              │
//!                   └── WasBroadcast / NACK (SubDeviceOutOfRange)     │
//!                                      └── NACK ─────────────────────▶│
//!                                                 broadcast? drop response
//! ```
//!
//! Every request produces exactly one callback. Protocol problems become
//! NACKs; only broadcasts go unanswered.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, error, warn};

use super::pid_table::{ParamDescriptor, build_param_table};
use super::tcp_stats::TcpConnectionStats;
use crate::app::ports::{EndpointId, EndpointRegistry, RegistryError};
use crate::rdm::{
    CommandClass, DeviceUid, NackReason, RdmCallback, RdmHandler, RdmReply, RdmRequest,
    RdmResponse,
};

pub struct RootEndpoint<R: EndpointRegistry> {
    uid: DeviceUid,
    registry: Arc<R>,
    tcp_stats: Arc<TcpConnectionStats>,
    params: [ParamDescriptor<R>; 5],
}

impl<R: EndpointRegistry> RootEndpoint<R> {
    pub fn new(uid: DeviceUid, registry: Arc<R>, tcp_stats: Arc<TcpConnectionStats>) -> Self {
        Self {
            uid,
            registry,
            tcp_stats,
            params: build_param_table(),
        }
    }

    fn lookup(&self, pid: u16) -> Option<&ParamDescriptor<R>> {
        self.params.iter().find(|d| d.pid == pid)
    }

    /// Checks that run before anything else looks at the request. `Some`
    /// means the request is finished.
    fn precondition(
        &self,
        request: &RdmRequest,
        descriptor: Option<&ParamDescriptor<R>>,
    ) -> Option<RdmReply> {
        if request.targets_all_sub_devices()
            && !descriptor.is_some_and(|d| d.allows_all_sub_devices(request))
        {
            warn!(
                "rdm: pid 0x{:04x} from {} rejected, all sub-devices not allowed",
                request.param_id, request.source
            );
            return Some(if request.is_broadcast() {
                RdmReply::was_broadcast()
            } else {
                RdmReply::completed(self.nack(request, NackReason::SubDeviceOutOfRange))
            });
        }

        if request.is_broadcast()
            && !request.param_data.is_empty()
            && descriptor.is_some_and(|d| d.shape(request.command_class).takes_no_data())
        {
            warn!(
                "rdm: broadcast pid 0x{:04x} carried {} unexpected byte(s)",
                request.param_id,
                request.param_data.len()
            );
            return Some(RdmReply::was_broadcast());
        }
        None
    }

    fn dispatch(&self, request: &RdmRequest) -> RdmResponse {
        let Some(descriptor) = self.lookup(request.param_id) else {
            return unknown_pid(self, request);
        };
        if let Err(reason) = descriptor.check(request) {
            debug!("rdm: {} rejected: {}", descriptor.name, reason);
            return self.nack(request, reason);
        }
        debug!("rdm: {} {:?}", descriptor.name, request.command_class);
        catch_unwind(AssertUnwindSafe(|| (descriptor.handler)(self, request))).unwrap_or_else(
            |_| {
                error!("rdm: {} handler panicked", descriptor.name);
                self.nack(request, NackReason::HardwareFault)
            },
        )
    }

    /// Single exit for dispatched requests.
    fn deliver(&self, request: &RdmRequest, response: RdmResponse, on_complete: RdmCallback) {
        if request.is_broadcast() {
            on_complete(RdmReply::was_broadcast());
        } else {
            on_complete(RdmReply::completed(response));
        }
    }

    fn ack(&self, request: &RdmRequest, data: Vec<u8>) -> RdmResponse {
        RdmResponse::ack(self.uid, request, data)
    }

    fn nack(&self, request: &RdmRequest, reason: NackReason) -> RdmResponse {
        RdmResponse::nack(self.uid, request, reason)
    }
}

impl<R: EndpointRegistry> RdmHandler for RootEndpoint<R> {
    fn send_rdm_request(&self, request: RdmRequest, on_complete: RdmCallback) {
        let descriptor = self.lookup(request.param_id);
        if let Some(reply) = self.precondition(&request, descriptor) {
            on_complete(reply);
            return;
        }
        let response = self.dispatch(&request);
        self.deliver(&request, response, on_complete);
    }
}

// ───────────────────────────────────────────────────────────────
// Handlers
// ───────────────────────────────────────────────────────────────

fn registry_nack(e: RegistryError) -> NackReason {
    match e {
        RegistryError::UnknownEndpoint => NackReason::DataOutOfRange,
        RegistryError::LabelTooLong => NackReason::FormatError,
        RegistryError::Backend => NackReason::HardwareFault,
    }
}

fn read_endpoint(data: &[u8]) -> Option<EndpointId> {
    let bytes: [u8; 2] = data.get(..2)?.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

/// Endpoint id from the request, if it names a known endpoint.
fn known_endpoint<R: EndpointRegistry>(
    ep: &RootEndpoint<R>,
    request: &RdmRequest,
) -> Result<EndpointId, NackReason> {
    let endpoint = read_endpoint(&request.param_data).ok_or(NackReason::FormatError)?;
    if ep.registry.is_valid_endpoint(endpoint) {
        Ok(endpoint)
    } else {
        warn!("rdm: unknown endpoint {}", endpoint);
        Err(NackReason::DataOutOfRange)
    }
}

pub(super) fn endpoint_list<R: EndpointRegistry>(
    ep: &RootEndpoint<R>,
    request: &RdmRequest,
) -> RdmResponse {
    let endpoints = ep.registry.endpoints();
    let mut data = Vec::with_capacity(4 + endpoints.len() * 2);
    data.extend_from_slice(&ep.registry.list_change_number().to_be_bytes());
    for endpoint in endpoints {
        data.extend_from_slice(&endpoint.to_be_bytes());
    }
    ep.ack(request, data)
}

pub(super) fn endpoint_list_change<R: EndpointRegistry>(
    ep: &RootEndpoint<R>,
    request: &RdmRequest,
) -> RdmResponse {
    let change = ep.registry.list_change_number();
    ep.ack(request, change.to_be_bytes().to_vec())
}

pub(super) fn identify_endpoint<R: EndpointRegistry>(
    ep: &RootEndpoint<R>,
    request: &RdmRequest,
) -> RdmResponse {
    let endpoint = match known_endpoint(ep, request) {
        Ok(endpoint) => endpoint,
        Err(reason) => return ep.nack(request, reason),
    };

    if request.command_class == CommandClass::Get {
        return match ep.registry.identify_mode(endpoint) {
            Ok(on) => {
                let mut data = endpoint.to_be_bytes().to_vec();
                data.push(u8::from(on));
                ep.ack(request, data)
            }
            Err(e) => ep.nack(request, registry_nack(e)),
        };
    }

    let on = match request.param_data.get(2) {
        Some(0) => false,
        Some(1) => true,
        _ => return ep.nack(request, NackReason::DataOutOfRange),
    };
    match ep.registry.set_identify_mode(endpoint, on) {
        Ok(()) => ep.ack(request, Vec::new()),
        Err(e) => ep.nack(request, registry_nack(e)),
    }
}

pub(super) fn endpoint_label<R: EndpointRegistry>(
    ep: &RootEndpoint<R>,
    request: &RdmRequest,
) -> RdmResponse {
    let endpoint = match known_endpoint(ep, request) {
        Ok(endpoint) => endpoint,
        Err(reason) => return ep.nack(request, reason),
    };

    if request.command_class == CommandClass::Get {
        return match ep.registry.label(endpoint) {
            Ok(label) => {
                let mut data = endpoint.to_be_bytes().to_vec();
                data.extend_from_slice(label.as_bytes());
                ep.ack(request, data)
            }
            Err(e) => ep.nack(request, registry_nack(e)),
        };
    }

    let Ok(label) = core::str::from_utf8(&request.param_data[2..]) else {
        return ep.nack(request, NackReason::FormatError);
    };
    match ep.registry.set_label(endpoint, label) {
        Ok(()) => ep.ack(request, Vec::new()),
        Err(e) => ep.nack(request, registry_nack(e)),
    }
}

pub(super) fn tcp_comms_status<R: EndpointRegistry>(
    ep: &RootEndpoint<R>,
    request: &RdmRequest,
) -> RdmResponse {
    ep.ack(request, ep.tcp_stats.snapshot().to_bytes().to_vec())
}

fn unknown_pid<R: EndpointRegistry>(ep: &RootEndpoint<R>, request: &RdmRequest) -> RdmResponse {
    debug!("rdm: unknown pid 0x{:04x}", request.param_id);
    ep.nack(request, NackReason::UnknownPid)
}
