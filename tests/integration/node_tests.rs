//! Node orchestration: config, discovery lifecycle and RDM forwarding.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::mpsc;

use e133node::adapters::EndpointTable;
use e133node::app::events::NodeEvent;
use e133node::app::node::E133Node;
use e133node::app::ports::EventSink;
use e133node::config::NodeConfig;
use e133node::rdm::pids::PID_ENDPOINT_LIST;
use e133node::rdm::{DeviceUid, RdmRequest};
use e133node::slp::ConnectionState;
use e133node::slp::messages::{
    ServiceAck, ServiceDeRegistration, ServiceRegistration, ServiceReply, UrlEntry,
};
use e133node::{Error, error::RpcError};

use crate::mock_channel::{MockChannel, MockChannelHandle, mock_channel};
use crate::mock_ports::RecordingSink;

const IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);

fn node_with(config: NodeConfig) -> (E133Node<MockChannel, EndpointTable>, Arc<RecordingSink>) {
    let table = Arc::new(EndpointTable::new("port").unwrap());
    table.add_endpoint(1);
    let sink = Arc::new(RecordingSink::default());
    let node = E133Node::new(config, table, Arc::clone(&sink) as Arc<dyn EventSink>).unwrap();
    (node, sink)
}

fn started() -> (E133Node<MockChannel, EndpointTable>, Arc<RecordingSink>, MockChannelHandle) {
    let (mut node, sink) = node_with(NodeConfig::default());
    let (channel, handle) = mock_channel();
    node.start(channel, IP).unwrap();
    (node, sink, handle)
}

#[test]
fn invalid_config_is_refused() {
    let config = NodeConfig {
        lifetime: 0,
        ..NodeConfig::default()
    };
    let table = Arc::new(EndpointTable::new("").unwrap());
    let result = E133Node::<MockChannel, _>::new(config, table, Arc::new(RecordingSink::default()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn from_json_reports_parse_errors() {
    let table = Arc::new(EndpointTable::new("").unwrap());
    let err = E133Node::<MockChannel, _>::from_json("{", table, Arc::new(RecordingSink::default()))
        .err()
        .unwrap();
    assert!(format!("{err:#}").contains("parsing node config"));
}

#[test]
fn start_registers_device_url() {
    let (node, sink, handle) = started();

    assert_eq!(node.state(), ConnectionState::Connected);
    let req: ServiceRegistration = handle.request(0);
    assert_eq!(req.url, "service:rdmnet-device://192.168.1.20:5569/7a7000000001");
    assert_eq!(req.lifetime, 300);
    assert!(!req.persistent);

    handle.reply(0, &ServiceAck { error_code: 0 });
    assert_eq!(
        sink.events(),
        vec![
            NodeEvent::Connected,
            NodeEvent::Registered {
                url: req.url,
                error_code: 0
            },
        ]
    );
}

#[test]
fn persistent_flag_comes_from_config() {
    let (mut node, _) = node_with(NodeConfig {
        persistent: true,
        ..NodeConfig::default()
    });
    let (channel, handle) = mock_channel();
    node.start(channel, IP).unwrap();
    let req: ServiceRegistration = handle.request(0);
    assert!(req.persistent);
}

#[test]
fn start_twice_is_already_connected() {
    let (mut node, _, _) = started();
    let (channel, _) = mock_channel();
    assert_eq!(
        node.start(channel, IP),
        Err(Error::Rpc(RpcError::AlreadyConnected))
    );
}

#[test]
fn withdraw_then_stop() {
    let (mut node, sink, handle) = started();
    handle.reply(0, &ServiceAck { error_code: 0 });

    node.withdraw().unwrap();
    let req: ServiceDeRegistration = handle.request(1);
    assert_eq!(req.url, "service:rdmnet-device://192.168.1.20:5569/7a7000000001");
    handle.reply(1, &ServiceAck { error_code: 0 });
    assert!(node.registered_url().is_none());

    node.stop();
    node.stop();
    assert_eq!(handle.call_count(), 2, "nothing left to deregister");
    assert_eq!(node.state(), ConnectionState::Disconnected);
    assert_eq!(
        sink.events().last(),
        Some(&NodeEvent::Disconnected { drained: 0 })
    );
}

#[test]
fn stop_with_registration_in_flight_reports_failure() {
    let (mut node, sink, handle) = started();
    node.stop();
    let events = sink.events();
    assert!(events.contains(&NodeEvent::DiscoveryFailed {
        operation: "register",
        reason: RpcError::ConnectionClosed.to_string(),
    }));
    // The registration plus the deregistration sent by stop.
    assert_eq!(handle.call_count(), 2);
    assert_eq!(events.last(), Some(&NodeEvent::Disconnected { drained: 2 }));
}

#[test]
fn stop_deregisters_persistent_registration() {
    let (mut node, sink) = node_with(NodeConfig {
        persistent: true,
        ..NodeConfig::default()
    });
    let (channel, handle) = mock_channel();
    node.start(channel, IP).unwrap();
    handle.reply(0, &ServiceAck { error_code: 0 });

    node.stop();

    assert_eq!(handle.call_count(), 2);
    assert_eq!(handle.method(1), "DeRegisterService");
    let req: ServiceDeRegistration = handle.request(1);
    assert_eq!(req.url, "service:rdmnet-device://192.168.1.20:5569/7a7000000001");
    assert_eq!(req.scopes, vec!["DEFAULT".to_owned()]);
    assert_eq!(handle.close_count(), 1);
    assert!(node.registered_url().is_none());
    assert_eq!(
        sink.events().last(),
        Some(&NodeEvent::Disconnected { drained: 1 })
    );
}

#[test]
fn located_controller_feeds_tcp_stats() {
    let (mut node, sink, handle) = started();
    node.locate_controllers().unwrap();
    handle.reply(
        1,
        &ServiceReply {
            url_entries: vec![
                UrlEntry {
                    url: "service:rdmnet-ctl".into(),
                    lifetime: 10,
                },
                UrlEntry {
                    url: "service:rdmnet-ctl://10.0.0.9:5569/7a7000000002".into(),
                    lifetime: 300,
                },
            ],
        },
    );
    assert_eq!(node.tcp_stats().controller(), Ipv4Addr::new(10, 0, 0, 9));
    assert_eq!(
        sink.events().last(),
        Some(&NodeEvent::ControllersFound {
            count: 2,
            selected: Some("10.0.0.9:5569".parse().unwrap()),
        })
    );
}

#[test]
fn locate_while_stopped_is_not_connected() {
    let (mut node, _) = node_with(NodeConfig::default());
    assert_eq!(
        node.locate_controllers(),
        Err(Error::Rpc(RpcError::NotConnected))
    );
}

#[test]
fn rdm_requests_are_answered_with_config_uid() {
    let (node, _) = node_with(NodeConfig::default());
    let (tx, rx) = mpsc::channel();
    let controller = DeviceUid::new(0x7a70, 0x99);
    node.handle_rdm(
        RdmRequest::get(controller, node.config().uid, 0, PID_ENDPOINT_LIST, vec![]),
        Box::new(move |reply| tx.send(reply).unwrap()),
    );
    let response = rx.try_recv().unwrap().response.unwrap();
    assert_eq!(response.source, node.config().uid);
    assert_eq!(response.param_data, vec![0, 0, 0, 1, 0, 1]);
}
