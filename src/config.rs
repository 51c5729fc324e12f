//! Node configuration.
//!
//! Loaded from JSON by the embedding process (or postcard from flash) and
//! validated once before the node starts.

use core::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::app::ports::MAX_LABEL_LEN;
use crate::rdm::DeviceUid;

/// SLP service type devices register under.
pub const DEVICE_SERVICE_TYPE: &str = "service:rdmnet-device";

/// SLP service type controllers register under.
pub const CONTROLLER_SERVICE_TYPE: &str = "service:rdmnet-ctl";

/// Default E1.33 TCP port.
pub const DEFAULT_PORT: u16 = 5569;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// UID stamped on every RDM response.
    pub uid: DeviceUid,

    // --- Discovery ---
    /// SLP scopes to register and search in.
    pub scopes: Vec<String>,
    pub service_type: String,
    pub controller_service_type: String,
    /// Registration lifetime (seconds)
    pub lifetime: u16,
    /// Ask the SLP server to keep the registration after we disconnect.
    pub persistent: bool,

    // --- E1.33 ---
    pub port: u16,
    /// Label given to endpoints that have not been named.
    pub default_endpoint_label: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            uid: DeviceUid::new(0x7a70, 0x0000_0001),
            scopes: vec!["DEFAULT".into()],
            service_type: DEVICE_SERVICE_TYPE.into(),
            controller_service_type: CONTROLLER_SERVICE_TYPE.into(),
            lifetime: 300,
            persistent: false,
            port: DEFAULT_PORT,
            default_endpoint_label: String::new(),
        }
    }
}

impl NodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scopes.is_empty() || self.scopes.iter().any(String::is_empty) {
            return Err(ConfigError::NoScopes);
        }
        if self.lifetime == 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        for service_type in [&self.service_type, &self.controller_service_type] {
            if !service_type.starts_with("service:") {
                return Err(ConfigError::BadServiceType(service_type.clone()));
            }
        }
        if self.default_endpoint_label.len() > MAX_LABEL_LEN {
            return Err(ConfigError::LabelTooLong);
        }
        Ok(())
    }

    /// URL this device registers: `<service_type>://<ip>:<port>/<uid>`.
    pub fn service_url(&self, ip: Ipv4Addr) -> String {
        format!(
            "{}://{}:{}/{}",
            self.service_type,
            ip,
            self.port,
            self.uid.compact()
        )
    }
}

/// Pull `ip:port` out of a URL such as `service:rdmnet-ctl://10.0.0.1:5569`.
pub fn parse_service_address(url: &str) -> Option<std::net::SocketAddrV4> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split('/').next()?;
    authority.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoScopes,
    ZeroLifetime,
    ZeroPort,
    BadServiceType(String),
    LabelTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoScopes => write!(f, "at least one non-empty scope is required"),
            Self::ZeroLifetime => write!(f, "registration lifetime must be non-zero"),
            Self::ZeroPort => write!(f, "port must be non-zero"),
            Self::BadServiceType(t) => write!(f, "service type {t:?} lacks the service: prefix"),
            Self::LabelTooLong => {
                write!(f, "default endpoint label exceeds {MAX_LABEL_LEN} bytes")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
