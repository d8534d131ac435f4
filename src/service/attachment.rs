// Copyright (c) 2025 - Cowboy AI, Inc.
//! Attachment Index
//!
//! Resolves which VPC subnets a server is wired into by joining the
//! server's connections (found through the `server.<name>` label) with the
//! VPC attachments of each connection (found through `connection.<name>`).

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::FabricConfig;
use crate::errors::{FabricError, FabricResult};
use crate::labels::{LabelSelector, Relation};
use crate::store::{self, ObjectReader};
use crate::vpc::VpcAttachment;
use crate::wiring::{Connection, Server};

/// How a server reaches one VPC subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Connection carrying the subnet
    pub connection: String,
    /// Server-local port names on that connection
    pub interfaces: Vec<String>,
    pub native_vlan: bool,
}

/// Server to attached-subnet resolution over an [`ObjectReader`]
#[derive(Clone)]
pub struct AttachmentIndex {
    reader: Arc<dyn ObjectReader>,
    config: FabricConfig,
}

impl AttachmentIndex {
    pub fn new(reader: Arc<dyn ObjectReader>, config: FabricConfig) -> Self {
        Self { reader, config }
    }

    /// Subnets (`vpc/subnet` keys) the server is attached to
    ///
    /// Fails when the server does not exist, when it is a control node, or
    /// when one of its connections has invalid endpoints.
    pub async fn get_attached_subnets(
        &self,
        server: &str,
    ) -> FabricResult<BTreeMap<String, Attachment>> {
        let reader = self.reader.as_ref();
        let namespace = self.config.namespace.as_str();

        let node: Server = store::get(reader, namespace, server).await?;
        if node.is_control() {
            return Err(FabricError::structural(format!(
                "server {server} is a control node and cannot be attached"
            )));
        }

        let connections: Vec<Connection> = store::list(
            reader,
            namespace,
            &LabelSelector::related(Relation::Server, server),
        )
        .await?;

        let mut wired = Vec::with_capacity(connections.len());
        for conn in connections {
            let interfaces = conn.endpoints()?.server_interfaces(server);
            if interfaces.is_empty() {
                trace!("Connection {} does not touch server {}", conn.meta.name, server);
                continue;
            }
            wired.push((conn, interfaces));
        }

        let selectors: Vec<LabelSelector> = wired
            .iter()
            .map(|(conn, _)| LabelSelector::related(Relation::Connection, conn.meta.name.clone()))
            .collect();
        let attachments = try_join_all(
            selectors
                .iter()
                .map(|selector| store::list::<VpcAttachment>(reader, namespace, selector)),
        )
        .await?;

        let mut attached = BTreeMap::new();
        for ((conn, interfaces), attachments) in wired.into_iter().zip(attachments) {
            for attachment in attachments {
                if attachment.spec.connection != conn.meta.name {
                    continue;
                }
                attached.insert(
                    attachment.spec.subnet.clone(),
                    Attachment {
                        connection: conn.meta.name.clone(),
                        interfaces: interfaces.clone(),
                        native_vlan: attachment.spec.native_vlan,
                    },
                );
            }
        }

        debug!("Server {} is attached to {} subnet(s)", server, attached.len());
        Ok(attached)
    }
}
