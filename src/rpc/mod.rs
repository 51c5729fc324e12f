//! Asynchronous RPC correlation.
//!
//! Turns "send a request" into "run this continuation once the reply is in".
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    RPC correlation                         │
//! │                                                            │
//! │  issue() ──▶ PendingTable.insert(PendingCall)              │
//! │     │                                                      │
//! │     └──▶ RpcChannel::issue_call(method, bytes, completion) │
//! │                                   │                        │
//! │          (later, any thread)      ▼                        │
//! │  completion ──▶ PendingTable.take(id) ──▶ decode ──▶ cb    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! A call leaves the table exactly once: by its completion, or by the
//! drain in [`RpcCorrelator::detach`]. Whichever comes second finds
//! nothing and is ignored.

pub mod channel;
pub mod correlator;
pub mod pending;

pub use channel::{CompletionFn, MethodDescriptor, RpcChannel};
pub use correlator::RpcCorrelator;
pub use pending::{CallId, Continuation, PendingCall, PendingTable};
