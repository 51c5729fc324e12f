//! SLP-style service discovery over the RPC correlator.
//!
//! ```text
//!   DiscoveryClient ──▶ RpcCorrelator ──▶ RpcChannel ──▶ SLP server
//!        ▲                                     │
//!        └──── continuation(Result<..>) ◀──────┘
//! ```
//!
//! The client never talks SLP on the wire itself. It builds the messages in
//! [`messages`], hands them to the correlator, and maps the replies back to
//! error codes or [`SlpService`] lists.

pub mod client;
pub mod messages;
pub mod service;

pub use client::{ConnectionState, DiscoveryClient};
pub use service::{SlpService, normalize_scopes};

/// Callback for register and deregister: the server's SLP error code.
pub type RegistrationCallback = crate::rpc::Continuation<u16>;

/// Callback for find: matching services in reply order.
pub type FindCallback = crate::rpc::Continuation<Vec<SlpService>>;
