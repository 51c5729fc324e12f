//! RDM unique identifiers.
//!
//! A UID is 48 bits: a 16-bit ESTA manufacturer ID followed by a 32-bit
//! device ID. Text form is `mmmm:dddddddd` in hex.
//!
//! ```text
//! ┌──────────────┬──────────────────────────┐
//! │ Manuf (2B)   │ Device (4B)              │
//! │ BE u16       │ BE u32                   │
//! └──────────────┴──────────────────────────┘
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wire size of a UID in bytes.
pub const UID_SIZE: usize = 6;

/// A 48-bit RDM device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceUid {
    manufacturer: u16,
    device: u32,
}

impl DeviceUid {
    /// Manufacturer ID meaning "every manufacturer".
    pub const ALL_MANUFACTURERS: u16 = 0xFFFF;

    /// Device ID meaning "every device of the manufacturer".
    pub const ALL_DEVICES: u32 = 0xFFFF_FFFF;

    pub const fn new(manufacturer: u16, device: u32) -> Self {
        Self {
            manufacturer,
            device,
        }
    }

    /// The all-devices broadcast address `ffff:ffffffff`.
    pub const fn broadcast() -> Self {
        Self::new(Self::ALL_MANUFACTURERS, Self::ALL_DEVICES)
    }

    /// Broadcast to every device of one manufacturer (`mmmm:ffffffff`).
    pub const fn vendorcast(manufacturer: u16) -> Self {
        Self::new(manufacturer, Self::ALL_DEVICES)
    }

    pub const fn manufacturer_id(&self) -> u16 {
        self.manufacturer
    }

    pub const fn device_id(&self) -> u32 {
        self.device
    }

    /// True for both the global broadcast and manufacturer broadcasts.
    pub const fn is_broadcast(&self) -> bool {
        self.device == Self::ALL_DEVICES
    }

    /// Whether a packet sent to `self` should be processed by `target`.
    pub fn directed_to(&self, target: &DeviceUid) -> bool {
        if self == target {
            return true;
        }
        self.is_broadcast()
            && (self.manufacturer == Self::ALL_MANUFACTURERS
                || self.manufacturer == target.manufacturer)
    }

    pub fn to_bytes(&self) -> [u8; UID_SIZE] {
        let m = self.manufacturer.to_be_bytes();
        let d = self.device.to_be_bytes();
        [m[0], m[1], d[0], d[1], d[2], d[3]]
    }

    pub fn from_bytes(bytes: &[u8; UID_SIZE]) -> Self {
        Self::new(
            u16::from_be_bytes([bytes[0], bytes[1]]),
            u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
        )
    }

    /// Compact form without the separator, as used in SLP service URLs.
    pub fn compact(&self) -> heapless::String<12> {
        let mut s = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(
            &mut s,
            format_args!("{:04x}{:08x}", self.manufacturer, self.device),
        );
        s
    }
}

impl fmt::Display for DeviceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:08x}", self.manufacturer, self.device)
    }
}

/// Error returned when a UID string is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UidParseError;

impl fmt::Display for UidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UID must look like mmmm:dddddddd (hex)")
    }
}

impl std::error::Error for UidParseError {}

impl FromStr for DeviceUid {
    type Err = UidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (m, d) = s.split_once(':').ok_or(UidParseError)?;
        if !hex_field(m, 4) || !hex_field(d, 8) {
            return Err(UidParseError);
        }
        let manufacturer = u16::from_str_radix(m, 16).map_err(|_| UidParseError)?;
        let device = u32::from_str_radix(d, 16).map_err(|_| UidParseError)?;
        Ok(Self::new(manufacturer, device))
    }
}

/// 1..=`max` hex digits and nothing else; `from_str_radix` alone lets a
/// leading sign through.
fn hex_field(s: &str, max: usize) -> bool {
    (1..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

impl TryFrom<String> for DeviceUid {
    type Error = UidParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceUid> for String {
    fn from(uid: DeviceUid) -> Self {
        uid.to_string()
    }
}
