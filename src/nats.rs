// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS-backed object reads
//!
//! [`NatsObjectReader`] implements [`ObjectReader`] with request/reply
//! against an external store service; [`ObjectReadResponder`] is the
//! serving side, answering the same subjects from any local reader.
//!
//! # Wire Format
//!
//! | Subject                      | Request body              | Reply data      |
//! |------------------------------|---------------------------|-----------------|
//! | `{root}.objects.{kind}.get`  | `{namespace, name}`       | one object      |
//! | `{root}.objects.{kind}.list` | `{namespace, selector}`   | list of objects |
//!
//! Replies are a [`ReadReply`] tagged by `status`: `ok` with `data`,
//! `not_found`, or `error` with `kind` and `message`. The reader rebuilds
//! the matching [`FabricError`] variant from `kind`.

use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{FabricError, FabricResult};
use crate::labels::LabelSelector;
use crate::objects::{Kind, Object};
use crate::store::ObjectReader;
use crate::subjects::{ObjectSubjects, ReadOperation, FABRIC_ROOT};

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Root of the object read subjects
    pub subject_root: String,
}

impl NatsConfig {
    pub fn with_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servers = servers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_subject_root(mut self, root: impl Into<String>) -> Self {
        self.subject_root = root.into();
        self
    }

    /// Open a client with this configuration
    pub async fn connect(&self) -> FabricResult<Client> {
        let connect_options = ConnectOptions::new()
            .name(&self.name)
            .connection_timeout(self.connect_timeout)
            .request_timeout(Some(self.request_timeout));

        let client = async_nats::connect_with_options(self.servers.join(","), connect_options)
            .await
            .map_err(|e| FabricError::unavailable(format!("NATS connection failed: {e}")))?;

        info!("Connected to NATS at {:?}", self.servers);
        Ok(client)
    }
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "cim-fabric".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            subject_root: FABRIC_ROOT.to_string(),
        }
    }
}

/// Body of a `get` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    pub namespace: String,
    pub name: String,
}

/// Body of a `list` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    pub namespace: String,
    #[serde(default)]
    pub selector: LabelSelector,
}

/// Category of an error carried in a [`ReadReply`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyErrorKind {
    Structural,
    RelationshipViolation,
    #[default]
    Unavailable,
}

/// Reply to a read request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadReply<T> {
    Ok {
        data: T,
    },
    NotFound,
    Error {
        #[serde(default)]
        kind: ReplyErrorKind,
        message: String,
    },
}

impl<T> ReadReply<T> {
    fn from_result(result: FabricResult<T>) -> Self {
        let error = match result {
            Ok(data) => return ReadReply::Ok { data },
            Err(FabricError::NotFound { .. }) => return ReadReply::NotFound,
            Err(e) => e,
        };

        let (kind, message) = match error {
            FabricError::Structural { message, cause } => (
                ReplyErrorKind::Structural,
                match cause {
                    Some(cause) => format!("{message}: {cause}"),
                    None => message,
                },
            ),
            FabricError::RelationshipViolation { message } => {
                (ReplyErrorKind::RelationshipViolation, message)
            }
            FabricError::Unavailable { message } => (ReplyErrorKind::Unavailable, message),
            not_found @ FabricError::NotFound { .. } => {
                (ReplyErrorKind::Unavailable, not_found.to_string())
            }
        };
        ReadReply::Error { kind, message }
    }
}

impl ReplyErrorKind {
    /// Rebuild the error the serving side reported
    fn into_error(self, message: String) -> FabricError {
        match self {
            ReplyErrorKind::Structural => FabricError::structural(message),
            ReplyErrorKind::RelationshipViolation => FabricError::relationship(message),
            ReplyErrorKind::Unavailable => FabricError::unavailable(message),
        }
    }
}

/// [`ObjectReader`] over NATS request/reply
#[derive(Clone)]
pub struct NatsObjectReader {
    client: Client,
    subjects: ObjectSubjects,
}

impl NatsObjectReader {
    /// Connect and build a reader from configuration
    pub async fn connect(config: &NatsConfig) -> FabricResult<Self> {
        let client = config.connect().await?;
        Ok(Self::new(client, ObjectSubjects::new(config.subject_root.clone())))
    }

    pub fn new(client: Client, subjects: ObjectSubjects) -> Self {
        Self { client, subjects }
    }

    async fn request<Q, T>(&self, subject: String, request: &Q) -> FabricResult<ReadReply<T>>
    where
        Q: Serialize,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(request)?;

        let response = self
            .client
            .request(subject.clone(), payload.into())
            .await?;

        debug!("Received reply on subject: {}", subject);
        serde_json::from_slice(&response.payload)
            .map_err(|e| FabricError::unavailable(format!("malformed reply on {subject}: {e}")))
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectReader for NatsObjectReader {
    async fn get(&self, kind: Kind, namespace: &str, name: &str) -> FabricResult<Object> {
        let subject = self.subjects.subject(kind, ReadOperation::Get);
        let request = GetRequest {
            namespace: namespace.to_string(),
            name: name.to_string(),
        };

        match self.request::<_, Object>(subject, &request).await? {
            ReadReply::Ok { data } if data.kind() == kind => Ok(data),
            ReadReply::Ok { data } => Err(FabricError::unavailable(format!(
                "store answered {} {} for a {} request",
                data.kind(),
                data.name(),
                kind
            ))),
            ReadReply::NotFound => Err(FabricError::not_found(kind, namespace, name)),
            ReadReply::Error {
                kind: error_kind,
                message,
            } => Err(error_kind.into_error(message)),
        }
    }

    async fn list(
        &self,
        kind: Kind,
        namespace: &str,
        selector: &LabelSelector,
    ) -> FabricResult<Vec<Object>> {
        let subject = self.subjects.subject(kind, ReadOperation::List);
        let request = ListRequest {
            namespace: namespace.to_string(),
            selector: selector.clone(),
        };

        match self.request::<_, Vec<Object>>(subject, &request).await? {
            ReadReply::Ok { mut data } => {
                data.retain(|object| object.kind() == kind);
                data.sort_by(|a, b| a.name().cmp(b.name()));
                Ok(data)
            }
            ReadReply::NotFound => Ok(Vec::new()),
            ReadReply::Error { kind, message } => Err(kind.into_error(message)),
        }
    }
}

/// Answers object read requests from a local [`ObjectReader`]
pub struct ObjectReadResponder {
    client: Client,
    subjects: ObjectSubjects,
    reader: Arc<dyn ObjectReader>,
}

impl ObjectReadResponder {
    pub fn new(client: Client, subjects: ObjectSubjects, reader: Arc<dyn ObjectReader>) -> Self {
        Self {
            client,
            subjects,
            reader,
        }
    }

    /// Subscribe to every read subject and answer requests until the
    /// subscription closes
    pub async fn run(self) -> FabricResult<JoinHandle<()>> {
        let subject = self.subjects.all();
        let mut subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .map_err(|e| FabricError::unavailable(format!("subscribe to {subject} failed: {e}")))?;

        info!("Subscribed to subject: {}", subject);

        Ok(tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let Some(reply) = msg.reply.clone() else {
                    warn!("Dropping read request without reply subject on {}", msg.subject);
                    continue;
                };

                let body = self.answer(&msg.subject.to_string(), &msg.payload).await;
                match body {
                    Ok(body) => {
                        if let Err(e) = self.client.publish(reply.to_string(), body.into()).await {
                            error!("Failed to publish reply for {}: {}", msg.subject, e);
                        }
                    }
                    Err(e) => error!("Failed to encode reply for {}: {}", msg.subject, e),
                }
            }
        }))
    }

    async fn answer(&self, subject: &str, payload: &[u8]) -> FabricResult<Vec<u8>> {
        let Some((kind, operation)) = self.subjects.parse(subject) else {
            let reply: ReadReply<()> = ReadReply::Error {
                kind: ReplyErrorKind::Structural,
                message: format!("unknown read subject {subject}"),
            };
            return Ok(serde_json::to_vec(&reply)?);
        };

        let body = match operation {
            ReadOperation::Get => {
                let result = match serde_json::from_slice::<GetRequest>(payload) {
                    Ok(request) => self.reader.get(kind, &request.namespace, &request.name).await,
                    Err(e) => Err(e.into()),
                };
                serde_json::to_vec(&ReadReply::from_result(result))?
            }
            ReadOperation::List => {
                let result = match serde_json::from_slice::<ListRequest>(payload) {
                    Ok(request) => {
                        self.reader
                            .list(kind, &request.namespace, &request.selector)
                            .await
                    }
                    Err(e) => Err(e.into()),
                };
                serde_json::to_vec(&ReadReply::from_result(result))?
            }
        };

        debug!("Answered {} {} request", kind, operation);
        Ok(body)
    }
}
