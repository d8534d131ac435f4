// Copyright (c) 2025 - Cowboy AI, Inc.
//! Server objects

use serde::{Deserialize, Serialize};

use crate::labels::{LabelSet, Labels};
use crate::objects::ObjectMeta;

/// Server role in the fabric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerType {
    /// Fabric control node; never attached to VPCs
    Control,
    /// Regular workload server
    #[default]
    Worker,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSpec {
    #[serde(default)]
    pub server_type: ServerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub spec: ServerSpec,
}

impl Server {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: ServerSpec::default(),
        }
    }

    pub fn control(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: ServerSpec {
                server_type: ServerType::Control,
                description: None,
            },
        }
    }

    pub fn is_control(&self) -> bool {
        self.spec.server_type == ServerType::Control
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new().build()
    }
}
