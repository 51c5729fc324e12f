//! Application core: node orchestration behind port traits.
//!
//! [`node::E133Node`] ties configuration, the discovery client and the root
//! endpoint together. Everything it touches outside the crate goes through
//! the traits in [`ports`], so tests drive it with in-memory adapters.

pub mod events;
pub mod node;
pub mod ports;
