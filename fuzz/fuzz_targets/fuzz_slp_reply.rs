//! Fuzz target: find reply decoding through the discovery client.
//!
//! Arbitrary reply bytes must reach the callback exactly once, as either a
//! service list or a decode error.
//!
//! cargo fuzz run fuzz_slp_reply

#![no_main]

use std::sync::mpsc;

use e133node::rpc::{CompletionFn, MethodDescriptor, RpcChannel};
use e133node::slp::DiscoveryClient;
use libfuzzer_sys::fuzz_target;

/// Completes every call inline with the fuzzer's bytes.
struct Replay(Vec<u8>);

impl RpcChannel for Replay {
    fn issue_call(&mut self, _: &'static MethodDescriptor, _: Vec<u8>, done: CompletionFn) {
        done(Ok(self.0.clone()));
    }
}

fuzz_target!(|data: &[u8]| {
    let mut client = DiscoveryClient::new();
    client.connect(Replay(data.to_vec())).unwrap();

    let (tx, rx) = mpsc::channel();
    client
        .find_service(
            &["default"],
            "service:rdmnet-ctl",
            Some(Box::new(move |r| tx.send(r.is_ok()).unwrap())),
        )
        .unwrap();

    assert_eq!(rx.try_iter().count(), 1);
    assert_eq!(client.outstanding(), 0);
});
