// src/progress/publisher.rs

//! Status bus publishers.
//!
//! Status messages are fire-and-forget notifications: callers log a failed
//! publish and move on. Implementations:
//! - [`HttpStatusPublisher`]: POSTs the message as JSON
//! - [`ChannelStatusPublisher`]: forwards to an in-process tokio channel
//! - [`LogStatusPublisher`]: only logs (no bus configured)

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::info;

use crate::errors::{Error, Result};
use crate::types::WorkflowStatus;

/// One message on the status bus, tagged with its workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub workflow_uuid: String,
    pub status: WorkflowStatus,
    pub logs: Option<String>,
    pub message: Option<Value>,
}

impl StatusMessage {
    pub fn new(workflow_uuid: impl Into<String>, status: WorkflowStatus) -> Self {
        Self {
            workflow_uuid: workflow_uuid.into(),
            status,
            logs: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: Value) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_logs(mut self, logs: impl Into<String>) -> Self {
        self.logs = Some(logs.into());
        self
    }

    /// Wire form: `{"workflow_uuid", "status": <code>, "logs", "message"}`.
    pub fn to_json(&self) -> Value {
        json!({
            "workflow_uuid": self.workflow_uuid,
            "status": self.status.code(),
            "logs": self.logs,
            "message": self.message,
        })
    }
}

pub type PublishFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Sink for workflow status messages.
pub trait StatusPublisher: Send + Sync {
    fn publish<'a>(&'a self, message: &'a StatusMessage) -> PublishFuture<'a>;
}

impl<T: StatusPublisher + ?Sized> StatusPublisher for Arc<T> {
    fn publish<'a>(&'a self, message: &'a StatusMessage) -> PublishFuture<'a> {
        (**self).publish(message)
    }
}

/// Publishes by POSTing the JSON message to a URL.
#[derive(Debug, Clone)]
pub struct HttpStatusPublisher {
    url: String,
    http: reqwest::Client,
}

impl HttpStatusPublisher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }
}

impl StatusPublisher for HttpStatusPublisher {
    fn publish<'a>(&'a self, message: &'a StatusMessage) -> PublishFuture<'a> {
        Box::pin(async move {
            self.http
                .post(&self.url)
                .json(&message.to_json())
                .send()
                .await
                .with_context(|| format!("posting status to {}", self.url))?
                .error_for_status()
                .with_context(|| format!("status bus at {} rejected message", self.url))?;
            Ok(())
        })
    }
}

/// Forwards every message to an in-process receiver.
#[derive(Debug, Clone)]
pub struct ChannelStatusPublisher {
    tx: mpsc::Sender<StatusMessage>,
}

impl ChannelStatusPublisher {
    pub fn new(tx: mpsc::Sender<StatusMessage>) -> Self {
        Self { tx }
    }

    /// Create a publisher together with the receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StatusMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl StatusPublisher for ChannelStatusPublisher {
    fn publish<'a>(&'a self, message: &'a StatusMessage) -> PublishFuture<'a> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();
        let message = message.clone();

        Box::pin(async move {
            tx.send(message)
                .await
                .map_err(|e| Error::msg(format!("status channel closed: {e}")))?;
            Ok(())
        })
    }
}

/// Writes status messages to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatusPublisher;

impl StatusPublisher for LogStatusPublisher {
    fn publish<'a>(&'a self, message: &'a StatusMessage) -> PublishFuture<'a> {
        Box::pin(async move {
            info!(
                workflow_uuid = %message.workflow_uuid,
                status = %message.status,
                payload = %message.to_json(),
                "workflow status"
            );
            Ok(())
        })
    }
}
