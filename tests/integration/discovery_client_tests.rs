//! Discovery client against the mock channel.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use e133node::error::RpcError;
use e133node::slp::messages::{
    SCOPE_NOT_SUPPORTED, ServiceAck, ServiceDeRegistration, ServiceRegistration, ServiceReply,
    ServiceRequest, UrlEntry,
};
use e133node::slp::{ConnectionState, DiscoveryClient, SlpService};

use crate::mock_channel::{MockChannel, MockChannelHandle, mock_channel};

type Seen<T> = Arc<Mutex<Vec<Result<T, RpcError>>>>;

fn recorder<T: Send + 'static>() -> (Seen<T>, Box<dyn FnOnce(Result<T, RpcError>) + Send>) {
    let seen: Seen<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, Box::new(move |r| sink.lock().unwrap().push(r)))
}

fn connected() -> (DiscoveryClient<MockChannel>, MockChannelHandle) {
    let (channel, handle) = mock_channel();
    let mut client = DiscoveryClient::new();
    client.connect(channel).unwrap();
    (client, handle)
}

#[test]
fn register_dispatches_non_persistent_registration() {
    let (mut client, handle) = connected();
    let (seen, cb) = recorder();

    client
        .register_service(&["one", "two", "one"], "service:test://1.2.3.4", 300, Some(cb))
        .unwrap();

    assert_eq!(handle.call_count(), 1);
    assert_eq!(handle.method(0), "RegisterService");
    let req: ServiceRegistration = handle.request(0);
    assert_eq!(
        req,
        ServiceRegistration {
            url: "service:test://1.2.3.4".into(),
            scopes: vec!["one".into(), "two".into()],
            lifetime: 300,
            persistent: false,
        }
    );
    assert!(seen.lock().unwrap().is_empty(), "not completed yet");

    handle.reply(0, &ServiceAck { error_code: 0 });
    assert_eq!(*seen.lock().unwrap(), vec![Ok(0)]);
}

#[test]
fn persistent_registration_sets_flag() {
    let (mut client, handle) = connected();
    client
        .register_persistent_service(&["default"], "service:p", 60, None)
        .unwrap();
    let req: ServiceRegistration = handle.request(0);
    assert!(req.persistent);
    assert_eq!(req.lifetime, 60);
    assert!(handle.reply(0, &ServiceAck { error_code: 0 }));
    assert_eq!(client.outstanding(), 0);
}

#[test]
fn channel_failure_runs_callback_once_with_text() {
    let (mut client, handle) = connected();
    let (seen, cb) = recorder::<u16>();
    client
        .register_service(&["default"], "service:x", 300, Some(cb))
        .unwrap();

    handle.fail(0, "connection reset");
    assert!(!handle.fail(0, "again"), "completion must be single-use");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        Err(e @ RpcError::Transport(_)) => assert!(!e.to_string().is_empty()),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn error_code_is_passed_through() {
    let (mut client, handle) = connected();
    let (seen, cb) = recorder();
    client.deregister_service(&["s"], "service:x", Some(cb)).unwrap();

    let req: ServiceDeRegistration = handle.request(0);
    assert_eq!(req.url, "service:x");
    handle.reply(
        0,
        &ServiceAck {
            error_code: SCOPE_NOT_SUPPORTED,
        },
    );
    assert_eq!(*seen.lock().unwrap(), vec![Ok(SCOPE_NOT_SUPPORTED)]);
}

#[test]
fn find_preserves_reply_order() {
    let (mut client, handle) = connected();
    let (seen, cb) = recorder::<Vec<SlpService>>();
    client.find_service(&["s"], "service:rdmnet-ctl", Some(cb)).unwrap();

    let req: ServiceRequest = handle.request(0);
    assert_eq!(req.service_type, "service:rdmnet-ctl");

    let reply = ServiceReply {
        url_entries: vec![
            UrlEntry {
                url: "service:z".into(),
                lifetime: 10,
            },
            UrlEntry {
                url: "service:a".into(),
                lifetime: 300,
            },
            UrlEntry {
                url: "service:z".into(),
                lifetime: 10,
            },
        ],
    };
    handle.reply(0, &reply);

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0],
        Ok(vec![
            SlpService::new("service:z", 10),
            SlpService::new("service:a", 300),
            SlpService::new("service:z", 10),
        ])
    );
}

#[test]
fn garbage_reply_is_decode_error() {
    let (mut client, handle) = connected();
    let (seen, cb) = recorder::<Vec<SlpService>>();
    client.find_service(&["s"], "service:x", Some(cb)).unwrap();
    handle.complete_raw(0, Ok(vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff]));
    assert!(matches!(seen.lock().unwrap()[0], Err(RpcError::Decode(_))));
}

#[test]
fn out_of_order_completions_reach_their_own_callbacks() {
    let (mut client, handle) = connected();
    let (first, cb1) = recorder();
    let (second, cb2) = recorder();
    client.register_service(&["s"], "service:1", 1, Some(cb1)).unwrap();
    client.register_service(&["s"], "service:2", 1, Some(cb2)).unwrap();

    handle.reply(1, &ServiceAck { error_code: 2 });
    handle.reply(0, &ServiceAck { error_code: 1 });

    assert_eq!(*first.lock().unwrap(), vec![Ok(1)]);
    assert_eq!(*second.lock().unwrap(), vec![Ok(2)]);
}

#[test]
fn calls_while_disconnected_fail_without_callback() {
    let mut client: DiscoveryClient<MockChannel> = DiscoveryClient::new();
    let (seen, cb) = recorder::<u16>();
    assert_eq!(
        client.register_service(&["s"], "service:x", 300, Some(cb)),
        Err(RpcError::NotConnected)
    );
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(Arc::strong_count(&seen), 1, "callback dropped");
}

#[test]
fn second_connect_is_rejected() {
    let (mut client, _) = connected();
    let (other, other_handle) = mock_channel();
    assert_eq!(client.connect(other), Err(RpcError::AlreadyConnected));
    assert_eq!(other_handle.call_count(), 0);
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[test]
fn disconnect_twice_succeeds_and_drains() {
    let (mut client, handle) = connected();
    let (seen, cb) = recorder::<u16>();
    client.register_service(&["s"], "service:x", 300, Some(cb)).unwrap();

    assert_eq!(client.disconnect(), 1);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(client.disconnect(), 0);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(handle.close_count(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![Err(RpcError::ConnectionClosed)]);

    // The server answers after we hung up: nothing more happens.
    handle.reply(0, &ServiceAck { error_code: 0 });
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn reconnect_after_disconnect() {
    let (mut client, _) = connected();
    client.disconnect();
    let (channel, handle) = mock_channel();
    client.connect(channel).unwrap();
    client.find_service(&["s"], "service:x", None).unwrap();
    assert_eq!(handle.call_count(), 1);
}

#[test]
fn dropping_the_client_drains_outstanding_calls() {
    let (mut client, handle) = connected();
    let (seen, cb) = recorder::<u16>();
    client.register_service(&["s"], "service:x", 300, Some(cb)).unwrap();
    drop(client);
    assert_eq!(*seen.lock().unwrap(), vec![Err(RpcError::ConnectionClosed)]);
    assert_eq!(handle.close_count(), 1);
}

#[test]
fn completions_racing_disconnect_from_other_threads_run_once() {
    const CALLS: usize = 64;
    let (mut client, handle) = connected();

    let mut seen = Vec::with_capacity(CALLS);
    for i in 0..CALLS {
        let (s, cb) = recorder::<u16>();
        client
            .register_service(&["s"], &format!("service:x{i}"), 300, Some(cb))
            .unwrap();
        seen.push(s);
    }
    assert_eq!(client.outstanding(), CALLS);

    let start = Arc::new(Barrier::new(CALLS + 1));
    let workers: Vec<_> = (0..CALLS)
        .map(|i| {
            let handle = handle.clone();
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                handle.reply(i, &ServiceAck { error_code: 0 })
            })
        })
        .collect();

    start.wait();
    let drained = client.disconnect();
    for worker in workers {
        assert!(worker.join().unwrap(), "each completion fires once");
    }

    let mut closed = 0;
    for s in &seen {
        let s = s.lock().unwrap();
        assert_eq!(s.len(), 1, "callback must run exactly once");
        match &s[0] {
            Ok(0) => {}
            Err(RpcError::ConnectionClosed) => closed += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(closed, drained);
    assert_eq!(client.outstanding(), 0);
    assert_eq!(handle.close_count(), 1);
}
