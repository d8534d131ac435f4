// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC policy objects: VPCs and their subnets, attachments, peerings and
//! externals

pub mod attachment;
pub mod external;
pub mod network;
pub mod peering;

pub use attachment::{SubnetKey, VpcAttachment, VpcAttachmentSpec};
pub use external::{
    External, ExternalAttachment, ExternalAttachmentNeighbor, ExternalAttachmentSpec,
    ExternalAttachmentSwitch, ExternalL2, ExternalPeering, ExternalPeeringExternal,
    ExternalPeeringPermit, ExternalPeeringSpec, ExternalPeeringVpc, ExternalSpec,
};
pub use network::{Ipv4Namespace, Ipv4NamespaceSpec, StaticRoute, Subnet, Vpc, VpcSpec};
pub use peering::{PermitEntry, VpcPeering, VpcPeeringSpec, VpcPeeringSubnets};
