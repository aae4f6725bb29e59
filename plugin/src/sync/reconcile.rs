//! Reconciliation of change events into the local configuration list

use crate::models::config::DeploymentConfig;
use crate::store::changes::{ChangeEvent, MutationKind};

/// Apply one change event to the in-memory configuration list.
///
/// Creates append to the end of the list and require a result payload;
/// patches replace the entry matching the event's document id and leave
/// every other entry untouched; deletes remove the matching entry. Kinds
/// signaled together on one event are applied independently, not
/// mutually exclusively.
pub fn apply_change(deploys: &mut Vec<DeploymentConfig>, event: &ChangeEvent) {
    if event.signals(MutationKind::Create) {
        if let Some(result) = &event.result {
            deploys.push(result.clone());
        }
    }

    if event.signals(MutationKind::Patch) {
        if let Some(result) = &event.result {
            for deploy in deploys.iter_mut() {
                if deploy.id == event.document_id {
                    *deploy = result.clone();
                }
            }
        }
    }

    if event.signals(MutationKind::Delete) {
        deploys.retain(|deploy| deploy.id != event.document_id);
    }
}
