//! Change-feed types

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::config::DeploymentConfig;

/// Kind of mutation signaled by a change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Patch,
    Delete,
}

/// One change event delivered by the document store.
///
/// A single event may signal several mutation kinds at once; consumers
/// apply every matching reconciliation independently.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Id of the affected document
    pub document_id: String,

    /// Mutation kinds signaled by this event
    pub mutations: Vec<MutationKind>,

    /// Full document state after the change, when delivered
    pub result: Option<DeploymentConfig>,
}

impl ChangeEvent {
    pub fn signals(&self, kind: MutationKind) -> bool {
        self.mutations.contains(&kind)
    }
}

/// A live change-feed subscription.
///
/// Holds the receiving end of the feed and the task producing it.
/// Dropping the subscription aborts the producer, so no events are
/// delivered after release.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
    feed_task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<ChangeEvent>, feed_task: JoinHandle<()>) -> Self {
        Self {
            rx,
            feed_task: Some(feed_task),
        }
    }

    /// Wait for the next change event; `None` once the feed has ended
    pub async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Release the subscription
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
        }
    }
}
