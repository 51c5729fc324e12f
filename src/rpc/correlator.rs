//! RPC correlator: attaches a [`PendingCall`] to every issued request.
//!
//! The correlator owns the channel only while connected. Attaching and
//! detaching are the only ways in and out of the connected state, and
//! detaching resolves every call still in the table before the channel is
//! dropped.

use std::sync::{Arc, Weak};

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::channel::{MethodDescriptor, RpcChannel};
use super::pending::{CallId, Continuation, PendingCall, PendingTable, ReplyDecoder};
use crate::error::RpcError;

pub struct RpcCorrelator<C: RpcChannel> {
    channel: Option<C>,
    pending: Arc<PendingTable>,
    next_call_id: CallId,
}

impl<C: RpcChannel> RpcCorrelator<C> {
    pub fn new() -> Self {
        Self {
            channel: None,
            pending: Arc::new(PendingTable::new()),
            next_call_id: 1,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Calls issued and not yet completed.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Take ownership of `channel`. Fails if one is already attached, in
    /// which case the offered channel is dropped unused.
    pub fn attach(&mut self, channel: C) -> Result<(), RpcError> {
        if self.channel.is_some() {
            return Err(RpcError::AlreadyConnected);
        }
        self.channel = Some(channel);
        Ok(())
    }

    /// Fail every outstanding call with [`RpcError::ConnectionClosed`], then
    /// close and drop the channel. Returns how many were drained.
    pub fn detach(&mut self) -> usize {
        let Some(mut channel) = self.channel.take() else {
            return 0;
        };
        let drained = self.pending.drain();
        let count = drained.len();
        for call in drained {
            debug!("rpc: draining {} (call {})", call.method(), call.id());
            call.complete(Err(RpcError::ConnectionClosed));
        }

        channel.close();
        count
    }

    /// Issue `request` on `method`.
    ///
    /// `Ok` means dispatched, not completed: the continuation runs later,
    /// exactly once, with the decoded reply or the failure. On `Err` the
    /// continuation has been dropped without running.
    pub fn issue<Q, P, T>(
        &mut self,
        method: &'static MethodDescriptor,
        request: &Q,
        decode: ReplyDecoder<P, T>,
        continuation: Option<Continuation<T>>,
    ) -> Result<CallId, RpcError>
    where
        Q: Serialize,
        P: DeserializeOwned + Send + 'static,
        T: 'static,
    {
        if self.channel.is_none() {
            debug!("rpc: {} not issued, not connected", method.name);
            return Err(RpcError::NotConnected);
        }

        let payload =
            postcard::to_allocvec(request).map_err(|e| RpcError::Encode(e.to_string()))?;

        let id = self.alloc_call_id();
        self.pending.insert(Box::new(PendingCall::new(
            id,
            method.name,
            decode,
            continuation,
        )));

        let table = Arc::downgrade(&self.pending);
        if let Some(channel) = self.channel.as_mut() {
            debug!("rpc: issuing {}.{} (call {})", method.service, method.name, id);
            channel.issue_call(
                method,
                payload,
                Box::new(move |outcome| complete_call(&table, id, outcome)),
            );
        }
        Ok(id)
    }

    /// Next id that is non-zero and not held by an outstanding call.
    fn alloc_call_id(&mut self) -> CallId {
        loop {
            let id = self.next_call_id;
            self.next_call_id = self.next_call_id.wrapping_add(1).max(1);
            if !self.pending.contains(id) {
                return id;
            }
            debug!("rpc: call id {} still outstanding, skipping", id);
        }
    }
}

impl<C: RpcChannel> Default for RpcCorrelator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: RpcChannel> Drop for RpcCorrelator<C> {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Completion path shared by every call: remove, then run.
fn complete_call(table: &Weak<PendingTable>, id: CallId, outcome: Result<Vec<u8>, String>) {
    let Some(call) = table.upgrade().and_then(|t| t.take(id)) else {
        debug!("rpc: late completion for call {} ignored", id);
        return;
    };
    if let Err(text) = &outcome {
        warn!("rpc: {} (call {}) failed: {}", call.method(), id, text);
    }
    call.complete(outcome.map_err(RpcError::Transport));
}
