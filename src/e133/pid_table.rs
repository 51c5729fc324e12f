//! Parameter descriptor table for the root endpoint.
//!
//! Each served PID gets one [`ParamDescriptor`]: the payload shape accepted
//! for GET and SET, whether SET may target every sub-device, and the
//! handler. Lookup is a linear scan; the table is tiny.

use crate::app::ports::{EndpointRegistry, MAX_LABEL_LEN};
use crate::rdm::pids::{
    PID_ENDPOINT_LABEL, PID_ENDPOINT_LIST, PID_ENDPOINT_LIST_CHANGE, PID_IDENTIFY_ENDPOINT,
    PID_TCP_COMMS_STATUS,
};
use crate::rdm::{
    ALL_RDM_SUBDEVICES, CommandClass, NackReason, ROOT_RDM_DEVICE, RdmRequest, RdmResponse,
};

use super::root_endpoint::{self as handlers, RootEndpoint};

/// Accepted parameter data for one command class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataShape {
    /// The command class is not served for this PID.
    Unsupported,
    /// No parameter data.
    Empty,
    /// Exactly this many bytes.
    Exact(usize),
    /// Inclusive length range.
    Between(usize, usize),
}

impl DataShape {
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Self::Unsupported => false,
            Self::Empty => len == 0,
            Self::Exact(n) => len == n,
            Self::Between(min, max) => (min..=max).contains(&len),
        }
    }

    pub fn takes_no_data(self) -> bool {
        matches!(self, Self::Empty)
    }
}

pub type ParamHandler<R> = fn(&RootEndpoint<R>, &RdmRequest) -> RdmResponse;

pub struct ParamDescriptor<R: EndpointRegistry> {
    pub pid: u16,
    pub name: &'static str,
    pub get: DataShape,
    pub set: DataShape,
    /// SET addressed to [`ALL_RDM_SUBDEVICES`] is legal.
    pub set_all_sub_devices: bool,
    pub handler: ParamHandler<R>,
}

impl<R: EndpointRegistry> ParamDescriptor<R> {
    pub fn shape(&self, class: CommandClass) -> DataShape {
        match class {
            CommandClass::Get => self.get,
            CommandClass::Set => self.set,
            _ => DataShape::Unsupported,
        }
    }

    /// Whether `request` may address every sub-device.
    pub fn allows_all_sub_devices(&self, request: &RdmRequest) -> bool {
        self.set_all_sub_devices && request.command_class == CommandClass::Set
    }

    /// Generic checks run before the handler: command class, sub-device and
    /// payload length, in that order.
    pub fn check(&self, request: &RdmRequest) -> Result<(), NackReason> {
        let shape = self.shape(request.command_class);
        if shape == DataShape::Unsupported {
            return Err(NackReason::UnsupportedCommandClass);
        }
        let sub_device_ok = request.sub_device == ROOT_RDM_DEVICE
            || (request.sub_device == ALL_RDM_SUBDEVICES && self.allows_all_sub_devices(request));
        if !sub_device_ok {
            return Err(NackReason::SubDeviceOutOfRange);
        }
        if !shape.accepts(request.param_data.len()) {
            return Err(NackReason::FormatError);
        }
        Ok(())
    }
}

/// Endpoint number plus a label of up to [`MAX_LABEL_LEN`] bytes.
const LABEL_SET: DataShape = DataShape::Between(2, 2 + MAX_LABEL_LEN);

pub fn build_param_table<R: EndpointRegistry>() -> [ParamDescriptor<R>; 5] {
    [
        ParamDescriptor {
            pid: PID_TCP_COMMS_STATUS,
            name: "TCP_COMMS_STATUS",
            get: DataShape::Empty,
            set: DataShape::Unsupported,
            set_all_sub_devices: false,
            handler: handlers::tcp_comms_status,
        },
        ParamDescriptor {
            pid: PID_ENDPOINT_LIST,
            name: "ENDPOINT_LIST",
            get: DataShape::Empty,
            set: DataShape::Unsupported,
            set_all_sub_devices: false,
            handler: handlers::endpoint_list,
        },
        ParamDescriptor {
            pid: PID_ENDPOINT_LIST_CHANGE,
            name: "ENDPOINT_LIST_CHANGE",
            get: DataShape::Empty,
            set: DataShape::Unsupported,
            set_all_sub_devices: false,
            handler: handlers::endpoint_list_change,
        },
        ParamDescriptor {
            pid: PID_IDENTIFY_ENDPOINT,
            name: "IDENTIFY_ENDPOINT",
            get: DataShape::Exact(2),
            set: DataShape::Exact(3),
            set_all_sub_devices: true,
            handler: handlers::identify_endpoint,
        },
        ParamDescriptor {
            pid: PID_ENDPOINT_LABEL,
            name: "ENDPOINT_LABEL",
            get: DataShape::Exact(2),
            set: LABEL_SET,
            set_all_sub_devices: true,
            handler: handlers::endpoint_label,
        },
    ]
}
