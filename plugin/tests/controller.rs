//! Controller behavior tests against the in-memory store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use studio_pages_deploy::errors::PluginError;
use studio_pages_deploy::models::config::{DeploymentConfig, DraftConfig};
use studio_pages_deploy::models::deployment::Deployment;
use studio_pages_deploy::pages::{PagesApiExt, TeamInfo};
use studio_pages_deploy::store::changes::{ChangeEvent, MutationKind, Subscription};
use studio_pages_deploy::store::documents::DocumentStore;
use studio_pages_deploy::store::memory::MemoryStore;
use studio_pages_deploy::tool::controller::{ControllerState, DeployController, ListView};
use studio_pages_deploy::tool::notify::{Notifier, ToastStatus};

struct StubPagesApi {
    team: Option<TeamInfo>,
    team_calls: AtomicUsize,
}

impl StubPagesApi {
    fn with_team(id: &str, name: &str) -> Self {
        Self {
            team: Some(TeamInfo {
                id: id.to_string(),
                name: name.to_string(),
            }),
            team_calls: AtomicUsize::new(0),
        }
    }

    fn without_team() -> Self {
        Self {
            team: None,
            team_calls: AtomicUsize::new(0),
        }
    }

    fn team_calls(&self) -> usize {
        self.team_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PagesApiExt for StubPagesApi {
    async fn resolve_team(&self, _slug: &str, _token: &str) -> Result<TeamInfo, PluginError> {
        self.team_calls.fetch_add(1, Ordering::SeqCst);
        match &self.team {
            Some(info) => Ok(info.clone()),
            None => Err(PluginError::TeamError("no team id found".to_string())),
        }
    }

    async fn latest_deployment(
        &self,
        _project: &str,
        _team_id: Option<&str>,
        _token: &str,
    ) -> Result<Option<Deployment>, PluginError> {
        Ok(None)
    }

    async fn trigger_hook(&self, _hook_url: &str) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Store whose create call always fails
struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn fetch(&self) -> Result<Vec<DeploymentConfig>, PluginError> {
        Ok(Vec::new())
    }

    async fn create(&self, _doc: &DeploymentConfig) -> Result<DeploymentConfig, PluginError> {
        Err(PluginError::StoreError("insufficient permissions".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<(), PluginError> {
        Ok(())
    }

    async fn listen(&self) -> Result<Subscription, PluginError> {
        let (_tx, rx) = mpsc::unbounded_channel();
        Ok(Subscription::new(rx, tokio::spawn(async {})))
    }
}

fn draft(title: &str, team: &str) -> DraftConfig {
    DraftConfig {
        title: title.to_string(),
        project: "my-site".to_string(),
        team: team.to_string(),
        url: "https://hooks.example.com/deploy/abc".to_string(),
        token: "tok_123".to_string(),
        disable_delete_action: false,
    }
}

fn seeded_doc(id: &str, title: &str) -> DeploymentConfig {
    let mut doc = draft(title, "").into_document(None);
    doc.id = id.to_string();
    doc
}

async fn wait_for<F>(controller: &DeployController, predicate: F) -> ControllerState
where
    F: Fn(&ControllerState) -> bool,
{
    for _ in 0..200 {
        let state = controller.snapshot().await;
        if predicate(&state) {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("controller state never reached the expected condition");
}

#[tokio::test]
async fn test_mount_loads_documents_and_clears_loading() {
    let store = Arc::new(MemoryStore::new());
    store.seed(seeded_doc("pages-deploy.a", "Production")).await;
    store.seed(seeded_doc("pages-deploy.b", "Staging")).await;

    let (notifier, _toasts) = Notifier::channel();
    let controller =
        DeployController::new(store.clone(), Arc::new(StubPagesApi::without_team()), notifier);

    assert_eq!(controller.snapshot().await.list_view(), ListView::Loading);

    controller.mount().await.unwrap();

    let state = controller.snapshot().await;
    assert!(!state.is_loading);
    assert_eq!(state.deploys.len(), 2);
    assert!(matches!(state.list_view(), ListView::Rows(rows) if rows.len() == 2));
}

#[tokio::test]
async fn test_empty_list_renders_call_to_action() {
    let store = Arc::new(MemoryStore::new());
    let (notifier, _toasts) = Notifier::channel();
    let controller =
        DeployController::new(store, Arc::new(StubPagesApi::without_team()), notifier);

    controller.mount().await.unwrap();
    assert_eq!(controller.snapshot().await.list_view(), ListView::Empty);
}

#[tokio::test]
async fn test_external_changes_reconcile_into_state() {
    let store = Arc::new(MemoryStore::new());
    let (notifier, _toasts) = Notifier::channel();
    let controller =
        DeployController::new(store.clone(), Arc::new(StubPagesApi::without_team()), notifier);

    controller.mount().await.unwrap();

    // External create
    let created = store.create(&seeded_doc("pages-deploy.a", "Production")).await.unwrap();
    wait_for(&controller, |s| s.deploys.len() == 1).await;

    // External patch
    let mut patched = created.clone();
    patched.name = "Production EU".to_string();
    store.patch(patched).await;
    wait_for(&controller, |s| {
        s.deploys.first().is_some_and(|d| d.name == "Production EU")
    })
    .await;

    // External delete
    store.delete("pages-deploy.a").await.unwrap();
    wait_for(&controller, |s| s.deploys.is_empty()).await;
}

#[tokio::test]
async fn test_submit_with_team_caches_resolved_fields() {
    let store = Arc::new(MemoryStore::new());
    let pages = Arc::new(StubPagesApi::with_team("t1", "Acme"));
    let (notifier, mut toasts) = Notifier::channel();
    let controller = DeployController::new(store.clone(), pages.clone(), notifier);

    controller.mount().await.unwrap();
    controller.open_form().await;
    controller.edit_draft(|d| *d = draft("Production", "acme")).await;
    controller.submit().await.unwrap();

    assert_eq!(pages.team_calls(), 1);
    assert_eq!(store.len().await, 1);

    let documents = store.fetch().await.unwrap();
    let team = documents[0].team.as_ref().expect("team must be cached");
    assert_eq!(team.slug, "acme");
    assert_eq!(team.id, "t1");
    assert_eq!(team.name, "Acme");
    assert!(documents[0].id.starts_with("pages-deploy."));

    let toast = toasts.try_recv().unwrap();
    assert_eq!(toast.status, ToastStatus::Success);

    let state = controller.snapshot().await;
    assert!(!state.is_submitting);
    assert!(!state.is_form_open);
    assert_eq!(state.pending, DraftConfig::default());
}

#[tokio::test]
async fn test_submit_without_team_skips_resolution() {
    let store = Arc::new(MemoryStore::new());
    let pages = Arc::new(StubPagesApi::with_team("t1", "Acme"));
    let (notifier, _toasts) = Notifier::channel();
    let controller = DeployController::new(store.clone(), pages.clone(), notifier);

    controller.mount().await.unwrap();
    controller.edit_draft(|d| *d = draft("Production", "")).await;
    controller.submit().await.unwrap();

    assert_eq!(pages.team_calls(), 0);

    let documents = store.fetch().await.unwrap();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].team.is_none());
}

#[tokio::test]
async fn test_failed_team_lookup_aborts_submission() {
    let store = Arc::new(MemoryStore::new());
    let (notifier, mut toasts) = Notifier::channel();
    let controller = DeployController::new(
        store.clone(),
        Arc::new(StubPagesApi::without_team()),
        notifier,
    );

    controller.mount().await.unwrap();
    controller.open_form().await;
    controller.edit_draft(|d| *d = draft("Production", "acme")).await;
    controller.submit().await.unwrap();

    // No document created, submitting flag back to false
    assert_eq!(store.len().await, 0);
    let state = controller.snapshot().await;
    assert!(!state.is_submitting);
    assert!(state.is_form_open);

    // Exactly one error notification
    let toast = toasts.try_recv().unwrap();
    assert_eq!(toast.status, ToastStatus::Error);
    assert_eq!(toast.title, "No Team found!");
    assert!(toasts.try_recv().is_err());
}

#[tokio::test]
async fn test_submit_with_missing_required_field_never_creates() {
    let store = Arc::new(MemoryStore::new());
    let pages = Arc::new(StubPagesApi::with_team("t1", "Acme"));
    let (notifier, mut toasts) = Notifier::channel();
    let controller = DeployController::new(store.clone(), pages.clone(), notifier);

    controller.mount().await.unwrap();

    for missing in ["project", "url", "token"] {
        controller
            .edit_draft(|d| {
                *d = draft("Production", "");
                match missing {
                    "project" => d.project.clear(),
                    "url" => d.url.clear(),
                    _ => d.token.clear(),
                }
            })
            .await;

        assert!(!controller.snapshot().await.can_submit());
        let result = controller.submit().await;
        assert!(matches!(result, Err(PluginError::ValidationError(_))));
    }

    assert_eq!(store.len().await, 0);
    assert_eq!(pages.team_calls(), 0);
    assert!(toasts.try_recv().is_err());
}

#[tokio::test]
async fn test_create_failure_resets_submitting_and_toasts() {
    let (notifier, mut toasts) = Notifier::channel();
    let controller = DeployController::new(
        Arc::new(FailingStore),
        Arc::new(StubPagesApi::with_team("t1", "Acme")),
        notifier,
    );

    controller.mount().await.unwrap();
    controller.open_form().await;
    controller.edit_draft(|d| *d = draft("Production", "")).await;
    controller.submit().await.unwrap();

    let state = controller.snapshot().await;
    assert!(!state.is_submitting);
    // The form stays open and the draft is preserved for a manual retry
    assert!(state.is_form_open);
    assert_eq!(state.pending.title, "Production");

    let toast = toasts.try_recv().unwrap();
    assert_eq!(toast.status, ToastStatus::Error);
}

#[tokio::test]
async fn test_unmount_releases_the_subscription() {
    let store = Arc::new(MemoryStore::new());
    let (notifier, _toasts) = Notifier::channel();
    let controller =
        DeployController::new(store.clone(), Arc::new(StubPagesApi::without_team()), notifier);

    controller.mount().await.unwrap();

    store.create(&seeded_doc("pages-deploy.a", "Production")).await.unwrap();
    wait_for(&controller, |s| s.deploys.len() == 1).await;

    controller.unmount().await;

    // Events after release must not reach the controller state
    store.emit(ChangeEvent {
        document_id: "pages-deploy.b".to_string(),
        mutations: vec![MutationKind::Create],
        result: Some(seeded_doc("pages-deploy.b", "Staging")),
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = controller.snapshot().await;
    assert_eq!(state.deploys.len(), 1);
    assert_eq!(state.deploys[0].id, "pages-deploy.a");
}

#[tokio::test]
async fn test_can_submit_tracks_submitting_flag_and_draft() {
    let store = Arc::new(MemoryStore::new());
    let (notifier, _toasts) = Notifier::channel();
    let controller =
        DeployController::new(store, Arc::new(StubPagesApi::without_team()), notifier);

    assert!(!controller.snapshot().await.can_submit());

    controller.edit_draft(|d| *d = draft("Production", "")).await;
    assert!(controller.snapshot().await.can_submit());
}
