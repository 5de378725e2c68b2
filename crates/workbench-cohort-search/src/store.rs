//! Cohort persistence and participant counting seams
//!
//! The cohort persistence API and the participant count endpoint live in a
//! separate service. These traits describe what the editor needs from them;
//! `InMemoryCohortStore` backs tests and offline tools.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use workbench_cohort_diagnostics::CohortError;
use workbench_cohort_model::{Cohort, CohortDefinition};

/// Storage for cohort records
#[async_trait]
pub trait CohortStore: Send + Sync {
    /// Fetch a cohort by id
    async fn get_cohort(&self, workspace_id: &str, cohort_id: i64) -> Result<Cohort, CohortError>;

    /// Create a cohort; the returned record carries its id and etag
    async fn create_cohort(&self, workspace_id: &str, cohort: Cohort) -> Result<Cohort, CohortError>;

    /// Update a cohort. The etag must match the stored one.
    async fn update_cohort(&self, workspace_id: &str, cohort: Cohort) -> Result<Cohort, CohortError>;
}

/// Participant count for a definition
#[async_trait]
pub trait ParticipantCounter: Send + Sync {
    async fn count_participants(
        &self,
        workspace_id: &str,
        definition: &CohortDefinition,
    ) -> Result<u64, CohortError>;
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: i64,
    cohorts: HashMap<(String, i64), Cohort>,
}

/// Cohort store held in memory.
///
/// Names are unique per workspace and every update bumps the etag, so the
/// conflict paths of the real service can be exercised locally.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCohortStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryCohortStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cohorts across all workspaces
    pub fn len(&self) -> usize {
        self.state.read().cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn etag(version: u32) -> String {
    format!("\"{}\"", version)
}

fn etag_version(etag: &str) -> Option<u32> {
    etag.trim_matches('"').parse().ok()
}

fn name_taken(state: &StoreState, workspace_id: &str, name: &str, except: Option<i64>) -> bool {
    state
        .cohorts
        .iter()
        .any(|((ws, id), c)| ws == workspace_id && c.name == name && Some(*id) != except)
}

#[async_trait]
impl CohortStore for InMemoryCohortStore {
    async fn get_cohort(&self, workspace_id: &str, cohort_id: i64) -> Result<Cohort, CohortError> {
        self.state
            .read()
            .cohorts
            .get(&(workspace_id.to_string(), cohort_id))
            .cloned()
            .ok_or_else(|| CohortError::not_found(format!("Cohort {} not found", cohort_id)))
    }

    async fn create_cohort(&self, workspace_id: &str, mut cohort: Cohort) -> Result<Cohort, CohortError> {
        let mut state = self.state.write();
        if name_taken(&state, workspace_id, &cohort.name, None) {
            return Err(CohortError::name_conflict(&cohort.name));
        }
        state.next_id += 1;
        let id = state.next_id;
        cohort.id = Some(id);
        cohort.etag = Some(etag(1));
        state
            .cohorts
            .insert((workspace_id.to_string(), id), cohort.clone());
        debug!("created cohort {} '{}' in {}", id, cohort.name, workspace_id);
        Ok(cohort)
    }

    async fn update_cohort(&self, workspace_id: &str, mut cohort: Cohort) -> Result<Cohort, CohortError> {
        let id = cohort
            .id
            .ok_or_else(|| CohortError::not_found("Cohort has no id"))?;
        let mut state = self.state.write();
        let key = (workspace_id.to_string(), id);
        let stored_etag = match state.cohorts.get(&key) {
            Some(stored) => stored.etag.clone(),
            None => return Err(CohortError::not_found(format!("Cohort {} not found", id))),
        };
        if cohort.etag != stored_etag {
            return Err(CohortError::concurrent_modification(format!(
                "Cohort {} was modified since it was read",
                id
            )));
        }
        if name_taken(&state, workspace_id, &cohort.name, Some(id)) {
            return Err(CohortError::name_conflict(&cohort.name));
        }
        let version = stored_etag.as_deref().and_then(etag_version).unwrap_or(0);
        cohort.etag = Some(etag(version + 1));
        state.cohorts.insert(key, cohort.clone());
        debug!("updated cohort {} in {}", id, workspace_id);
        Ok(cohort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_cohort_diagnostics::{CB0300, CB0301, CB0302};

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryCohortStore::new();
        let created = store
            .create_cohort("ws", Cohort::new("Diabetics", "{}"))
            .await
            .unwrap();

        assert_eq!(created.id, Some(1));
        assert_eq!(created.etag.as_deref(), Some("\"1\""));
        assert_eq!(store.get_cohort("ws", 1).await.unwrap(), created);
        assert_eq!(store.get_cohort("other", 1).await.unwrap_err().code(), CB0300);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let store = InMemoryCohortStore::new();
        store.create_cohort("ws", Cohort::new("A", "{}")).await.unwrap();

        let err = store.create_cohort("ws", Cohort::new("A", "{}")).await.unwrap_err();
        assert_eq!(err.code(), CB0301);
        assert!(err.is_recoverable());

        // Names are scoped to the workspace
        assert!(store.create_cohort("ws2", Cohort::new("A", "{}")).await.is_ok());
    }

    #[tokio::test]
    async fn test_stale_etag() {
        let store = InMemoryCohortStore::new();
        let created = store.create_cohort("ws", Cohort::new("A", "{}")).await.unwrap();

        let mut first = created.clone();
        first.criteria = Some("{\"includes\":[]}".into());
        let updated = store.update_cohort("ws", first).await.unwrap();
        assert_eq!(updated.etag.as_deref(), Some("\"2\""));

        let err = store.update_cohort("ws", created).await.unwrap_err();
        assert_eq!(err.code(), CB0302);
    }
}
