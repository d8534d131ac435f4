// Copyright (c) 2025 - Cowboy AI, Inc.

//! Fabric configuration
//!
//! Defaults that would otherwise be global (store namespace, default VLAN and
//! IPv4 namespaces) live in [`FabricConfig`], which every service takes at
//! construction time.

use serde::{Deserialize, Serialize};

/// Namespace objects live in unless stated otherwise
pub const DEFAULT_NAMESPACE: &str = "default";

/// Name of the VLAN and IPv4 namespaces VPCs fall back to
pub const DEFAULT_ADDRESS_NAMESPACE: &str = "default";

/// Fabric configuration threaded through services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricConfig {
    /// Store namespace queried by services
    pub namespace: String,

    /// VLAN namespace used by VPCs that do not name one
    pub default_vlan_namespace: String,

    /// IPv4 namespace used by VPCs that do not name one
    pub default_ipv4_namespace: String,
}

impl FabricConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_default_vlan_namespace(mut self, name: impl Into<String>) -> Self {
        self.default_vlan_namespace = name.into();
        self
    }

    pub fn with_default_ipv4_namespace(mut self, name: impl Into<String>) -> Self {
        self.default_ipv4_namespace = name.into();
        self
    }

    /// VLAN namespace for a VPC, falling back to the default
    pub fn vlan_namespace_or_default<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.default_vlan_namespace)
    }

    /// IPv4 namespace for a VPC, falling back to the default
    pub fn ipv4_namespace_or_default<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.default_ipv4_namespace)
    }
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_vlan_namespace: DEFAULT_ADDRESS_NAMESPACE.to_string(),
            default_ipv4_namespace: DEFAULT_ADDRESS_NAMESPACE.to_string(),
        }
    }
}
