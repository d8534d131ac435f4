// Copyright (c) 2025 - Cowboy AI, Inc.
//! Wiring Objects
//!
//! Physical inventory of the fabric: servers, switches, switch groups, VLAN
//! namespaces and the connections (links) between devices.

pub mod connection;
pub mod server;
pub mod switch;

pub use connection::{
    ConnBundled, ConnEslag, ConnExternal, ConnFabric, ConnMclag, ConnMclagDomain,
    ConnStaticExternal, ConnUnbundled, ConnVpcLoopback, Connection, ConnectionSpec,
    ConnectionType, Endpoints, ExternalLink, FabricLink, ServerToSwitchLink, StaticExternalLink,
    SwitchToSwitchLink, Topology, INVALID_CONNECTION_NAME,
};
pub use server::{Server, ServerSpec, ServerType};
pub use switch::{
    Redundancy, RedundancyType, Switch, SwitchGroup, SwitchGroupSpec, SwitchRole, SwitchSpec,
    VlanNamespace, VlanNamespaceSpec,
};
