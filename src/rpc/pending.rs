//! Outstanding calls awaiting their completion.

use core::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use log::debug;
use serde::de::DeserializeOwned;

use crate::error::RpcError;

/// Correlation key assigned by the correlator.
pub type CallId = u32;

/// Single-use callback receiving the outcome of one call.
pub type Continuation<T> = Box<dyn FnOnce(Result<T, RpcError>) + Send>;

/// Maps the protocol reply onto the caller's result type.
pub type ReplyDecoder<P, T> = fn(P) -> T;

/// One outstanding call: its decoded outcome once known, and the
/// continuation waiting for it.
pub struct PendingCall<P, T> {
    id: CallId,
    method: &'static str,
    outcome: Option<Result<P, RpcError>>,
    decode: ReplyDecoder<P, T>,
    continuation: Option<Continuation<T>>,
}

impl<P: DeserializeOwned, T> PendingCall<P, T> {
    pub fn new(
        id: CallId,
        method: &'static str,
        decode: ReplyDecoder<P, T>,
        continuation: Option<Continuation<T>>,
    ) -> Self {
        Self {
            id,
            method,
            outcome: None,
            decode,
            continuation,
        }
    }

    /// Record how the call ended, decoding the reply bytes on success.
    fn record(&mut self, outcome: Result<Vec<u8>, RpcError>) {
        self.outcome = Some(outcome.and_then(|bytes| {
            postcard::from_bytes::<P>(&bytes).map_err(|e| RpcError::Decode(e.to_string()))
        }));
    }

    /// Run the continuation, consuming the call.
    fn finish(self) {
        let Self {
            id,
            method,
            outcome,
            decode,
            continuation,
        } = self;

        let Some(continuation) = continuation else {
            debug!("rpc: {} (call {}) finished with no continuation", method, id);
            return;
        };

        let result = outcome
            .unwrap_or_else(|| Err(RpcError::Decode("no reply recorded".into())))
            .map(decode);
        continuation(result);
    }
}

/// Type-erased view of a [`PendingCall`] so calls with different reply
/// types share one table.
pub trait Completable: Send {
    fn id(&self) -> CallId;
    fn method(&self) -> &'static str;
    fn complete(self: Box<Self>, outcome: Result<Vec<u8>, RpcError>);
}

impl<P, T> Completable for PendingCall<P, T>
where
    P: DeserializeOwned + Send + 'static,
    T: 'static,
{
    fn id(&self) -> CallId {
        self.id
    }

    fn method(&self) -> &'static str {
        self.method
    }

    fn complete(mut self: Box<Self>, outcome: Result<Vec<u8>, RpcError>) {
        self.record(outcome);
        (*self).finish();
    }
}

// ── Table ────────────────────────────────────────────────────

/// Calls issued but not yet completed, keyed by [`CallId`].
///
/// Locked only to insert or remove. Continuations always run after the
/// entry is out of the table and the lock is released.
pub struct PendingTable {
    calls: CriticalSectionMutex<RefCell<BTreeMap<CallId, Box<dyn Completable>>>>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self {
            calls: CriticalSectionMutex::new(RefCell::new(BTreeMap::new())),
        }
    }

    /// Add a call under its id. The id must not be outstanding.
    pub fn insert(&self, call: Box<dyn Completable>) {
        self.calls.lock(|calls| {
            let mut calls = calls.borrow_mut();
            let slot = calls.entry(call.id());
            debug_assert!(
                matches!(slot, Entry::Vacant(_)),
                "call {} already outstanding",
                call.id()
            );
            slot.or_insert(call);
        });
    }

    pub fn contains(&self, id: CallId) -> bool {
        self.calls.lock(|calls| calls.borrow().contains_key(&id))
    }

    /// Remove a call. `None` if it already completed or was drained.
    pub fn take(&self, id: CallId) -> Option<Box<dyn Completable>> {
        self.calls.lock(|calls| calls.borrow_mut().remove(&id))
    }

    /// Remove every call, in id order.
    pub fn drain(&self) -> Vec<Box<dyn Completable>> {
        self.calls
            .lock(|calls| core::mem::take(&mut *calls.borrow_mut()))
            .into_values()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock(|calls| calls.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::new()
    }
}
