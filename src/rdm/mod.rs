//! RDM (E1.20) message model.
//!
//! Only the pieces the root endpoint needs: UIDs, command classes, NACK
//! reasons, and the request/response pair. Packing these onto the wire is
//! the receiver's job.

pub mod pids;
pub mod uid;

use core::fmt;

pub use uid::{DeviceUid, UID_SIZE, UidParseError};

/// Sub-device index of the root device.
pub const ROOT_RDM_DEVICE: u16 = 0x0000;

/// Sub-device index meaning "every sub-device".
pub const ALL_RDM_SUBDEVICES: u16 = 0xFFFF;

// ---------------------------------------------------------------------------
// Command classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandClass {
    Discover = 0x10,
    DiscoverResponse = 0x11,
    Get = 0x20,
    GetResponse = 0x21,
    Set = 0x30,
    SetResponse = 0x31,
}

impl CommandClass {
    /// The response class matching a request class.
    pub const fn response(self) -> Self {
        match self {
            Self::Discover | Self::DiscoverResponse => Self::DiscoverResponse,
            Self::Get | Self::GetResponse => Self::GetResponse,
            Self::Set | Self::SetResponse => Self::SetResponse,
        }
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0x10 => Some(Self::Discover),
            0x11 => Some(Self::DiscoverResponse),
            0x20 => Some(Self::Get),
            0x21 => Some(Self::GetResponse),
            0x30 => Some(Self::Set),
            0x31 => Some(Self::SetResponse),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// NACK reasons
// ---------------------------------------------------------------------------

/// E1.20 NACK reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NackReason {
    UnknownPid = 0x0000,
    FormatError = 0x0001,
    HardwareFault = 0x0002,
    ProxyReject = 0x0003,
    WriteProtect = 0x0004,
    UnsupportedCommandClass = 0x0005,
    DataOutOfRange = 0x0006,
    BufferFull = 0x0007,
    PacketSizeUnsupported = 0x0008,
    SubDeviceOutOfRange = 0x0009,
}

impl NackReason {
    pub const fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for NackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPid => write!(f, "unknown PID"),
            Self::FormatError => write!(f, "format error"),
            Self::HardwareFault => write!(f, "hardware fault"),
            Self::ProxyReject => write!(f, "proxy reject"),
            Self::WriteProtect => write!(f, "write protect"),
            Self::UnsupportedCommandClass => write!(f, "unsupported command class"),
            Self::DataOutOfRange => write!(f, "data out of range"),
            Self::BufferFull => write!(f, "buffer full"),
            Self::PacketSizeUnsupported => write!(f, "packet size unsupported"),
            Self::SubDeviceOutOfRange => write!(f, "sub-device out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// An inbound RDM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdmRequest {
    pub source: DeviceUid,
    pub destination: DeviceUid,
    pub transaction_number: u8,
    pub port_id: u8,
    pub command_class: CommandClass,
    pub sub_device: u16,
    pub param_id: u16,
    pub param_data: Vec<u8>,
}

impl RdmRequest {
    pub fn get(
        source: DeviceUid,
        destination: DeviceUid,
        sub_device: u16,
        param_id: u16,
        param_data: Vec<u8>,
    ) -> Self {
        Self {
            source,
            destination,
            transaction_number: 0,
            port_id: 1,
            command_class: CommandClass::Get,
            sub_device,
            param_id,
            param_data,
        }
    }

    pub fn set(
        source: DeviceUid,
        destination: DeviceUid,
        sub_device: u16,
        param_id: u16,
        param_data: Vec<u8>,
    ) -> Self {
        Self {
            command_class: CommandClass::Set,
            ..Self::get(source, destination, sub_device, param_id, param_data)
        }
    }

    pub fn with_transaction(mut self, transaction_number: u8) -> Self {
        self.transaction_number = transaction_number;
        self
    }

    /// Sent to the broadcast or a manufacturer broadcast address.
    pub fn is_broadcast(&self) -> bool {
        self.destination.is_broadcast()
    }

    pub fn targets_all_sub_devices(&self) -> bool {
        self.sub_device == ALL_RDM_SUBDEVICES
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Ack,
    Nack(NackReason),
}

/// An outbound RDM response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdmResponse {
    pub source: DeviceUid,
    pub destination: DeviceUid,
    pub transaction_number: u8,
    pub response_type: ResponseType,
    pub command_class: CommandClass,
    pub sub_device: u16,
    pub param_id: u16,
    pub param_data: Vec<u8>,
}

impl RdmResponse {
    /// ACK carrying `data`, stamped with the responder's UID.
    pub fn ack(responder: DeviceUid, request: &RdmRequest, data: Vec<u8>) -> Self {
        Self {
            source: responder,
            destination: request.source,
            transaction_number: request.transaction_number,
            response_type: ResponseType::Ack,
            command_class: request.command_class.response(),
            sub_device: request.sub_device,
            param_id: request.param_id,
            param_data: data,
        }
    }

    /// NACK with the reason code as its two-byte payload.
    pub fn nack(responder: DeviceUid, request: &RdmRequest, reason: NackReason) -> Self {
        Self {
            response_type: ResponseType::Nack(reason),
            ..Self::ack(responder, request, reason.code().to_be_bytes().to_vec())
        }
    }

    pub fn is_ack(&self) -> bool {
        self.response_type == ResponseType::Ack
    }

    pub fn nack_reason(&self) -> Option<NackReason> {
        match self.response_type {
            ResponseType::Nack(reason) => Some(reason),
            ResponseType::Ack => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Status handed to an [`RdmCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdmStatus {
    /// A response is attached.
    CompletedOk,
    /// The request was broadcast; no response exists.
    WasBroadcast,
}

/// Result of handling one request: a response unless the request was broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdmReply {
    pub status: RdmStatus,
    pub response: Option<RdmResponse>,
}

impl RdmReply {
    pub fn completed(response: RdmResponse) -> Self {
        Self {
            status: RdmStatus::CompletedOk,
            response: Some(response),
        }
    }

    pub fn was_broadcast() -> Self {
        Self {
            status: RdmStatus::WasBroadcast,
            response: None,
        }
    }
}

/// Single-use completion for one RDM request.
pub type RdmCallback = Box<dyn FnOnce(RdmReply) + Send>;

/// Anything that accepts RDM requests addressed to an E1.33 endpoint.
pub trait RdmHandler {
    /// Handle `request`; `on_complete` runs exactly once.
    fn send_rdm_request(&self, request: RdmRequest, on_complete: RdmCallback);
}
