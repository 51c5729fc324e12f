//! Discovery RPC messages.
//!
//! Encoded with postcard by the correlator. Field order is the wire order.

use serde::{Deserialize, Serialize};

use crate::rpc::MethodDescriptor;

/// Service name every discovery method belongs to.
pub const SLP_SERVICE: &str = "ola.slp.SLPService";

pub static FIND_SERVICE: MethodDescriptor = MethodDescriptor {
    service: SLP_SERVICE,
    name: "FindService",
    index: 0,
};

pub static REGISTER_SERVICE: MethodDescriptor = MethodDescriptor {
    service: SLP_SERVICE,
    name: "RegisterService",
    index: 1,
};

pub static DEREGISTER_SERVICE: MethodDescriptor = MethodDescriptor {
    service: SLP_SERVICE,
    name: "DeRegisterService",
    index: 2,
};

// RFC 2608 §7 error codes carried in `ServiceAck::error_code`.
pub const SLP_OK: u16 = 0;
pub const LANGUAGE_NOT_SUPPORTED: u16 = 1;
pub const PARSE_ERROR: u16 = 2;
pub const INVALID_REGISTRATION: u16 = 3;
pub const SCOPE_NOT_SUPPORTED: u16 = 4;
pub const AUTHENTICATION_UNKNOWN: u16 = 5;
pub const AUTHENTICATION_ABSENT: u16 = 6;
pub const AUTHENTICATION_FAILED: u16 = 7;
pub const VER_NOT_SUPPORTED: u16 = 9;
pub const INTERNAL_ERROR: u16 = 10;
pub const DA_BUSY_NOW: u16 = 11;
pub const OPTION_NOT_UNDERSTOOD: u16 = 12;
pub const INVALID_UPDATE: u16 = 13;
pub const MSG_NOT_SUPPORTED: u16 = 14;
pub const REFRESH_REJECTED: u16 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    pub url: String,
    pub scopes: Vec<String>,
    pub lifetime: u16,
    pub persistent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDeRegistration {
    pub url: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAck {
    pub error_code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub service_type: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub url: String,
    pub lifetime: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceReply {
    pub url_entries: Vec<UrlEntry>,
}

/// Human-readable name for an SLP error code.
pub fn error_code_name(code: u16) -> &'static str {
    match code {
        SLP_OK => "ok",
        LANGUAGE_NOT_SUPPORTED => "language not supported",
        PARSE_ERROR => "parse error",
        INVALID_REGISTRATION => "invalid registration",
        SCOPE_NOT_SUPPORTED => "scope not supported",
        AUTHENTICATION_UNKNOWN => "authentication unknown",
        AUTHENTICATION_ABSENT => "authentication absent",
        AUTHENTICATION_FAILED => "authentication failed",
        VER_NOT_SUPPORTED => "version not supported",
        INTERNAL_ERROR => "internal error",
        DA_BUSY_NOW => "DA busy",
        OPTION_NOT_UNDERSTOOD => "option not understood",
        INVALID_UPDATE => "invalid update",
        MSG_NOT_SUPPORTED => "message not supported",
        REFRESH_REJECTED => "refresh rejected",
        _ => "unknown error",
    }
}
