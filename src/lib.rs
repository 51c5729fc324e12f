//! E1.33 lighting-device node library.
//!
//! Two independent halves share this crate:
//!
//! ```text
//!  ┌───────────────────────────┐        ┌──────────────────────────┐
//!  │  SLP discovery (outbound) │        │  RDM dispatch (inbound)  │
//!  │                           │        │                          │
//!  │  DiscoveryClient          │        │  receiver ──▶ RootEndpoint│
//!  │      │                    │        │               │  PID table│
//!  │      ▼                    │        │               ▼          │
//!  │  RpcCorrelator ──▶ RpcChannel      │       EndpointRegistry   │
//!  │      ▲  (completion)  │   │        │                          │
//!  │      └────────────────┘   │        │                          │
//!  └───────────────────────────┘        └──────────────────────────┘
//! ```
//!
//! Transport plumbing, message framing and endpoint storage live outside
//! this crate and are reached through the traits in [`rpc::channel`] and
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod e133;
pub mod error;
pub mod rdm;
pub mod rpc;
pub mod slp;

pub use error::{Error, Result};
