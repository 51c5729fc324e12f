//! Channel abstraction: whatever carries RPC requests to the server.
//!
//! Concrete implementations (stream socket, in-process loopback, test
//! mocks) live with the embedding process. The correlator only needs to
//! hand over encoded bytes and be told, once, how the call ended.

/// Identifies one method of a remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub service: &'static str,
    pub name: &'static str,
    /// Position of the method in the service definition.
    pub index: u32,
}

/// Completion handed to the channel with every call.
///
/// `Ok` carries the encoded reply; `Err` carries the channel's error text.
pub type CompletionFn = Box<dyn FnOnce(Result<Vec<u8>, String>) + Send>;

/// An RPC channel.
///
/// Implementations must run each `on_complete` at most once. They may run
/// it on any thread, in any order relative to other calls, and even from
/// inside `issue_call`.
pub trait RpcChannel {
    fn issue_call(
        &mut self,
        method: &'static MethodDescriptor,
        request: Vec<u8>,
        on_complete: CompletionFn,
    );

    /// Release the underlying connection. Called once on disconnect.
    fn close(&mut self) {}
}
