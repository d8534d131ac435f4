// Copyright (c) 2025 - Cowboy AI, Inc.
//! Port Addressing
//!
//! Every link in the fabric is built from `device/port` identifiers. The
//! device half names a switch or server; the port half is the local port
//! name on that device and may itself contain `/` (breakout ports such as
//! `leaf-01/E1/1/2`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::errors::FabricError;

/// Separator between device and local port name
pub const PORT_SEPARATOR: char = '/';

/// Port name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("Port name is missing the device separator: {0}")]
    MissingSeparator(String),

    #[error("Port name has an empty device name: {0}")]
    EmptyDevice(String),

    #[error("Port name has an empty local port name: {0}")]
    EmptyPort(String),
}

impl From<PortError> for FabricError {
    fn from(err: PortError) -> Self {
        FabricError::structural_with_cause("invalid port name", err)
    }
}

/// A fully qualified port, `device/port`
///
/// # Examples
///
/// ```rust
/// use cim_fabric::domain::PortName;
///
/// let port = PortName::new("leaf-01/E1/1").unwrap();
/// assert_eq!(port.device(), "leaf-01");
/// assert_eq!(port.local_port(), "E1/1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortName {
    device: String,
    port: String,
}

impl PortName {
    /// Parse and validate a `device/port` identifier
    pub fn new(name: impl AsRef<str>) -> Result<Self, PortError> {
        let name = name.as_ref();
        let (device, port) = name
            .split_once(PORT_SEPARATOR)
            .ok_or_else(|| PortError::MissingSeparator(name.to_string()))?;

        if device.is_empty() {
            return Err(PortError::EmptyDevice(name.to_string()));
        }
        if port.is_empty() {
            return Err(PortError::EmptyPort(name.to_string()));
        }

        Ok(Self {
            device: device.to_string(),
            port: port.to_string(),
        })
    }

    /// Build a port from its parts
    pub fn from_parts(device: impl AsRef<str>, port: impl AsRef<str>) -> Result<Self, PortError> {
        Self::new(format!("{}{}{}", device.as_ref(), PORT_SEPARATOR, port.as_ref()))
    }

    /// Device (switch or server) name
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Port name local to the device
    pub fn local_port(&self) -> &str {
        &self.port
    }

    /// Whether this port belongs to `device`
    pub fn is_on(&self, device: &str) -> bool {
        self.device == device
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.device, PORT_SEPARATOR, self.port)
    }
}

impl FromStr for PortName {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PortName {
    type Error = PortError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PortName> for String {
    fn from(port: PortName) -> Self {
        port.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_name() {
        let port = PortName::new("server-1/enp2s1").unwrap();
        assert_eq!(port.device(), "server-1");
        assert_eq!(port.local_port(), "enp2s1");
        assert_eq!(port.to_string(), "server-1/enp2s1");
        assert!(port.is_on("server-1"));
        assert!(!port.is_on("server-2"));
    }

    #[test]
    fn test_breakout_port_keeps_remainder() {
        let port = PortName::new("leaf-01/E1/1/2").unwrap();
        assert_eq!(port.device(), "leaf-01");
        assert_eq!(port.local_port(), "E1/1/2");
    }

    #[test]
    fn test_invalid_port_names() {
        assert_eq!(
            PortName::new("leaf-01"),
            Err(PortError::MissingSeparator("leaf-01".to_string()))
        );
        assert_eq!(
            PortName::new("/E1/1"),
            Err(PortError::EmptyDevice("/E1/1".to_string()))
        );
        assert_eq!(
            PortName::new("leaf-01/"),
            Err(PortError::EmptyPort("leaf-01/".to_string()))
        );
        assert!(PortName::new("").is_err());
    }

    #[test]
    fn test_port_serde_is_plain_string() {
        let port: PortName = serde_json::from_str("\"spine-1/E1/8\"").unwrap();
        assert_eq!(port.device(), "spine-1");
        assert_eq!(serde_json::to_string(&port).unwrap(), "\"spine-1/E1/8\"");
        assert!(serde_json::from_str::<PortName>("\"spine-1\"").is_err());
    }
}
