//! In-memory endpoint registry.
//!
//! Backs the [`EndpointRegistry`] port with a table behind a
//! critical-section mutex. Suitable for simulation, tests and devices that
//! keep endpoint state in RAM only.

use core::cell::RefCell;
use std::collections::BTreeMap;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use log::info;

use crate::app::ports::{
    EndpointId, EndpointLabel, EndpointRegistry, MAX_LABEL_LEN, RegistryError,
};
use crate::config::NodeConfig;

#[derive(Debug, Clone, Default)]
struct EndpointState {
    identify: bool,
    label: EndpointLabel,
}

#[derive(Default)]
struct Table {
    endpoints: BTreeMap<EndpointId, EndpointState>,
    list_change: u32,
}

pub struct EndpointTable {
    inner: CriticalSectionMutex<RefCell<Table>>,
    default_label: EndpointLabel,
}

fn to_label(text: &str) -> Result<EndpointLabel, RegistryError> {
    if text.len() > MAX_LABEL_LEN {
        return Err(RegistryError::LabelTooLong);
    }
    let mut label = EndpointLabel::new();
    label.push_str(text).map_err(|()| RegistryError::LabelTooLong)?;
    Ok(label)
}

impl EndpointTable {
    /// `default_label` is given to every endpoint added afterwards.
    pub fn new(default_label: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            inner: CriticalSectionMutex::new(RefCell::new(Table::default())),
            default_label: to_label(default_label)?,
        })
    }

    /// Empty table labelling new endpoints with the configured default.
    pub fn for_config(config: &NodeConfig) -> Result<Self, RegistryError> {
        Self::new(&config.default_endpoint_label)
    }

    /// Add an endpoint. Returns false if it already exists.
    pub fn add_endpoint(&self, endpoint: EndpointId) -> bool {
        let added = self.inner.lock(|t| {
            let mut t = t.borrow_mut();
            if t.endpoints.contains_key(&endpoint) {
                return false;
            }
            let state = EndpointState {
                identify: false,
                label: self.default_label.clone(),
            };
            t.endpoints.insert(endpoint, state);
            t.list_change = t.list_change.wrapping_add(1);
            true
        });
        if added {
            info!("endpoints: added {}", endpoint);
        }
        added
    }

    /// Remove an endpoint. Returns false if it did not exist.
    pub fn remove_endpoint(&self, endpoint: EndpointId) -> bool {
        let removed = self.inner.lock(|t| {
            let mut t = t.borrow_mut();
            let removed = t.endpoints.remove(&endpoint).is_some();
            if removed {
                t.list_change = t.list_change.wrapping_add(1);
            }
            removed
        });
        if removed {
            info!("endpoints: removed {}", endpoint);
        }
        removed
    }

    fn with_endpoint<T>(
        &self,
        endpoint: EndpointId,
        f: impl FnOnce(&mut EndpointState) -> T,
    ) -> Result<T, RegistryError> {
        self.inner.lock(|t| {
            t.borrow_mut()
                .endpoints
                .get_mut(&endpoint)
                .map(f)
                .ok_or(RegistryError::UnknownEndpoint)
        })
    }
}

impl EndpointRegistry for EndpointTable {
    fn endpoints(&self) -> Vec<EndpointId> {
        self.inner.lock(|t| t.borrow().endpoints.keys().copied().collect())
    }

    fn list_change_number(&self) -> u32 {
        self.inner.lock(|t| t.borrow().list_change)
    }

    fn is_valid_endpoint(&self, endpoint: EndpointId) -> bool {
        self.inner.lock(|t| t.borrow().endpoints.contains_key(&endpoint))
    }

    fn identify_mode(&self, endpoint: EndpointId) -> Result<bool, RegistryError> {
        self.with_endpoint(endpoint, |e| e.identify)
    }

    fn set_identify_mode(&self, endpoint: EndpointId, on: bool) -> Result<(), RegistryError> {
        self.with_endpoint(endpoint, |e| e.identify = on)
    }

    fn label(&self, endpoint: EndpointId) -> Result<EndpointLabel, RegistryError> {
        self.with_endpoint(endpoint, |e| e.label.clone())
    }

    fn set_label(&self, endpoint: EndpointId, label: &str) -> Result<(), RegistryError> {
        let label = to_label(label)?;
        self.with_endpoint(endpoint, |e| e.label = label)
    }
}
