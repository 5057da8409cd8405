use std::sync::{Arc, Mutex};

use dagremote::errors::Error;
use dagremote::progress::{PublishFuture, StatusMessage, StatusPublisher};
use dagremote::types::WorkflowStatus;

/// A status publisher that keeps every message it is given.
///
/// With `failing()` every publish returns an error, but the message is
/// still recorded so tests can check what was attempted.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    messages: Arc<Mutex<Vec<StatusMessage>>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            messages: Arc::default(),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<StatusMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<WorkflowStatus> {
        self.messages().into_iter().map(|m| m.status).collect()
    }

    pub fn last(&self) -> Option<StatusMessage> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl StatusPublisher for RecordingPublisher {
    fn publish<'a>(&'a self, message: &'a StatusMessage) -> PublishFuture<'a> {
        Box::pin(async move {
            self.messages.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(Error::msg("status bus unreachable").into());
            }
            Ok(())
        })
    }
}
