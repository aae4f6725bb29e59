//! In-memory document store
//!
//! Fake used by tests in place of the content-lake backend. Mutations made
//! through the trait, and the external `patch`/`delete` helpers, are
//! broadcast to every open subscription as change events.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::errors::PluginError;
use crate::models::config::DeploymentConfig;
use crate::store::changes::{ChangeEvent, MutationKind, Subscription};
use crate::store::documents::DocumentStore;

pub struct MemoryStore {
    documents: Arc<RwLock<Vec<DeploymentConfig>>>,
    events: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            events,
        }
    }

    /// Seed a document without emitting a change event
    pub async fn seed(&self, doc: DeploymentConfig) {
        self.documents.write().await.push(doc);
    }

    /// Apply an external patch and broadcast it
    pub async fn patch(&self, doc: DeploymentConfig) {
        {
            let mut documents = self.documents.write().await;
            if let Some(existing) = documents.iter_mut().find(|d| d.id == doc.id) {
                *existing = doc.clone();
            }
        }

        let _ = self.events.send(ChangeEvent {
            document_id: doc.id.clone(),
            mutations: vec![MutationKind::Patch],
            result: Some(doc),
        });
    }

    /// Emit an arbitrary change event without touching stored documents
    pub fn emit(&self, event: ChangeEvent) {
        let _ = self.events.send(event);
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self) -> Result<Vec<DeploymentConfig>, PluginError> {
        let mut documents = self.documents.read().await.clone();
        // Stable sort keeps seed order for documents without a timestamp
        documents.sort_by_key(|d| d.created_at);
        Ok(documents)
    }

    async fn create(&self, doc: &DeploymentConfig) -> Result<DeploymentConfig, PluginError> {
        let mut created = doc.clone();
        created.created_at = Some(Utc::now());

        self.documents.write().await.push(created.clone());

        let _ = self.events.send(ChangeEvent {
            document_id: created.id.clone(),
            mutations: vec![MutationKind::Create],
            result: Some(created.clone()),
        });

        Ok(created)
    }

    async fn delete(&self, id: &str) -> Result<(), PluginError> {
        {
            let mut documents = self.documents.write().await;
            let before = documents.len();
            documents.retain(|d| d.id != id);
            if documents.len() == before {
                return Err(PluginError::NotFound(format!("document {}", id)));
            }
        }

        let _ = self.events.send(ChangeEvent {
            document_id: id.to_string(),
            mutations: vec![MutationKind::Delete],
            result: None,
        });

        Ok(())
    }

    async fn listen(&self) -> Result<Subscription, PluginError> {
        let mut events = self.events.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();

        let feed_task = tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Ok(Subscription::new(rx, feed_task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::DraftConfig;

    fn doc(title: &str) -> DeploymentConfig {
        DraftConfig {
            title: title.to_string(),
            project: "my-site".to_string(),
            team: String::new(),
            url: "https://hooks.example.com/deploy/abc".to_string(),
            token: "tok_123".to_string(),
            disable_delete_action: false,
        }
        .into_document(None)
    }

    #[test]
    fn test_create_assigns_timestamp_and_fetch_orders_by_it() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let first = store.create(&doc("first")).await.unwrap();
            let second = store.create(&doc("second")).await.unwrap();

            assert!(first.created_at.is_some());
            assert!(second.created_at.is_some());

            let fetched = store.fetch().await.unwrap();
            assert_eq!(fetched.len(), 2);
            assert_eq!(fetched[0].name, "first");
            assert_eq!(fetched[1].name, "second");
        });
    }

    #[test]
    fn test_subscription_delivers_create_events() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let mut subscription = store.listen().await.unwrap();

            let created = store.create(&doc("first")).await.unwrap();

            let event = subscription.next_event().await.unwrap();
            assert_eq!(event.document_id, created.id);
            assert!(event.signals(MutationKind::Create));
            assert_eq!(event.result.unwrap().name, "first");
        });
    }

    #[test]
    fn test_delete_of_unknown_document_is_not_found() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let result = store.delete("pages-deploy.missing").await;
            assert!(matches!(result, Err(PluginError::NotFound(_))));
        });
    }
}
