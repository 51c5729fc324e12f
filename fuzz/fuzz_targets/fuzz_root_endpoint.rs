//! Fuzz target: `RootEndpoint::send_rdm_request`
//!
//! Builds a request from raw bytes and asserts the callback runs exactly
//! once, and that broadcasts are never answered.
//!
//! cargo fuzz run fuzz_root_endpoint

#![no_main]

use std::sync::Arc;
use std::sync::mpsc;

use e133node::adapters::EndpointTable;
use e133node::e133::{RootEndpoint, TcpConnectionStats};
use e133node::rdm::{CommandClass, DeviceUid, RdmHandler, RdmRequest, RdmStatus, UID_SIZE};
use libfuzzer_sys::fuzz_target;

const DEVICE: DeviceUid = DeviceUid::new(0x7a70, 0x20);

fuzz_target!(|data: &[u8]| {
    // dest(6) | class(1) | sub_device(2) | pid(2) | payload..
    if data.len() < UID_SIZE + 5 {
        return;
    }
    let mut dest = [0u8; UID_SIZE];
    dest.copy_from_slice(&data[..UID_SIZE]);
    let rest = &data[UID_SIZE..];
    let command_class = if rest[0] & 1 == 0 {
        CommandClass::Get
    } else {
        CommandClass::Set
    };

    let request = RdmRequest {
        source: DeviceUid::new(0x7a70, 0x10),
        destination: DeviceUid::from_bytes(&dest),
        transaction_number: 0,
        port_id: 1,
        command_class,
        sub_device: u16::from_be_bytes([rest[1], rest[2]]),
        param_id: u16::from_be_bytes([rest[3], rest[4]]),
        param_data: rest[5..].to_vec(),
    };
    let broadcast = request.is_broadcast();

    let table = EndpointTable::new("fuzz").unwrap();
    table.add_endpoint(0);
    table.add_endpoint(1);
    let ep = RootEndpoint::new(DEVICE, Arc::new(table), Arc::new(TcpConnectionStats::new()));

    let (tx, rx) = mpsc::channel();
    ep.send_rdm_request(request, Box::new(move |reply| tx.send(reply).unwrap()));
    let replies: Vec<_> = rx.try_iter().collect();

    assert_eq!(replies.len(), 1, "callback must run exactly once");
    if broadcast {
        assert_eq!(replies[0].status, RdmStatus::WasBroadcast);
        assert!(replies[0].response.is_none());
    } else {
        assert!(replies[0].response.is_some());
    }
});
