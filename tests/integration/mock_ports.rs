//! Mock port adapters: a counting endpoint registry and a recording sink.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use e133node::app::events::NodeEvent;
use e133node::app::ports::{
    EndpointId, EndpointLabel, EndpointRegistry, EventSink, RegistryError,
};

/// Wraps a fixed endpoint set and counts every registry access.
pub struct CountingRegistry {
    endpoints: Vec<EndpointId>,
    labels: Mutex<Vec<(EndpointId, String)>>,
    identify: Mutex<Vec<(EndpointId, bool)>>,
    accesses: AtomicUsize,
    mutations: AtomicUsize,
}

#[allow(dead_code)]
impl CountingRegistry {
    pub fn new(endpoints: &[EndpointId]) -> Self {
        Self {
            endpoints: endpoints.to_vec(),
            labels: Mutex::new(Vec::new()),
            identify: Mutex::new(Vec::new()),
            accesses: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn label_of(&self, endpoint: EndpointId) -> Option<String> {
        self.labels
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| *e == endpoint)
            .map(|(_, l)| l.clone())
    }

    fn touch(&self) {
        self.accesses.fetch_add(1, Ordering::SeqCst);
    }

    fn check(&self, endpoint: EndpointId) -> Result<(), RegistryError> {
        if self.endpoints.contains(&endpoint) {
            Ok(())
        } else {
            Err(RegistryError::UnknownEndpoint)
        }
    }
}

impl EndpointRegistry for CountingRegistry {
    fn endpoints(&self) -> Vec<EndpointId> {
        self.touch();
        self.endpoints.clone()
    }

    fn list_change_number(&self) -> u32 {
        self.touch();
        3
    }

    fn is_valid_endpoint(&self, endpoint: EndpointId) -> bool {
        self.touch();
        self.endpoints.contains(&endpoint)
    }

    fn identify_mode(&self, endpoint: EndpointId) -> Result<bool, RegistryError> {
        self.touch();
        self.check(endpoint)?;
        Ok(self
            .identify
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| *e == endpoint)
            .is_some_and(|(_, on)| *on))
    }

    fn set_identify_mode(&self, endpoint: EndpointId, on: bool) -> Result<(), RegistryError> {
        self.touch();
        self.check(endpoint)?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.identify.lock().unwrap().push((endpoint, on));
        Ok(())
    }

    fn label(&self, endpoint: EndpointId) -> Result<EndpointLabel, RegistryError> {
        self.touch();
        self.check(endpoint)?;
        let mut label = EndpointLabel::new();
        if let Some(text) = self.label_of(endpoint) {
            label.push_str(&text).map_err(|()| RegistryError::LabelTooLong)?;
        }
        Ok(label)
    }

    fn set_label(&self, endpoint: EndpointId, label: &str) -> Result<(), RegistryError> {
        self.touch();
        self.check(endpoint)?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.labels.lock().unwrap().push((endpoint, label.to_owned()));
        Ok(())
    }
}

/// Records every emitted event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<NodeEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<NodeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &NodeEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
