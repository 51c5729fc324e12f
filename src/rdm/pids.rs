//! Parameter IDs handled by the root endpoint.
//!
//! E1.33 component PIDs and the E1.37-7 endpoint PIDs.

pub const PID_TCP_COMMS_STATUS: u16 = 0x0802;

pub const PID_ENDPOINT_LIST: u16 = 0x0900;
pub const PID_ENDPOINT_LIST_CHANGE: u16 = 0x0901;
pub const PID_IDENTIFY_ENDPOINT: u16 = 0x0902;
pub const PID_ENDPOINT_LABEL: u16 = 0x0905;

/// E1.20 identify; not served by the root endpoint.
pub const PID_IDENTIFY_DEVICE: u16 = 0x1000;
