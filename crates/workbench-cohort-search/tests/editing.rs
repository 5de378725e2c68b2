//! End-to-end editing tests
//!
//! Covers:
//! - Opening a stored cohort, editing it and saving it back
//! - Restoring mirrored edits after a reload, from memory and from disk
//! - Counting participants through the counter seam

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use workbench_cohort_diagnostics::CohortError;
use workbench_cohort_model::{
    Cohort, CohortDefinition, CriteriaType, Domain, Role, TemporalMention, TemporalTime,
};
use workbench_cohort_search::{
    Action, CohortStore, EditorSession, FileMirror, InMemoryCohortStore, ItemStatus, MIRROR_KEY,
    MemoryMirror, ParticipantCounter, Selection, SessionConfig, SessionMirror,
};

const STORED: &str = r#"{
    "includes": [{
        "id": "includes_aaaaaaaaa",
        "items": [{
            "id": "items_bbbbbbbbb",
            "type": "CONDITION",
            "searchParameters": [{
                "parameterId": "param201826",
                "name": "Type 2 diabetes mellitus",
                "domain": "CONDITION",
                "type": "SNOMED",
                "group": false,
                "attributes": [],
                "ancestorData": false,
                "standard": true,
                "conceptId": 201826
            }],
            "modifiers": []
        }],
        "temporal": false
    }],
    "excludes": [],
    "datafilters": ["HAS_EHR_DATA"]
}"#;

/// Counter that records every definition it was asked about
#[derive(Default)]
struct RecordingCounter {
    seen: Mutex<Vec<CohortDefinition>>,
}

#[async_trait]
impl ParticipantCounter for RecordingCounter {
    async fn count_participants(
        &self,
        _workspace_id: &str,
        definition: &CohortDefinition,
    ) -> Result<u64, CohortError> {
        self.seen.lock().push(definition.clone());
        Ok(definition.includes.len() as u64 * 100)
    }
}

async fn stored_cohort(store: &InMemoryCohortStore) -> Cohort {
    store
        .create_cohort("ws", Cohort::new("Diabetes", STORED))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_open_edit_save() {
    let store = InMemoryCohortStore::new();
    let cohort = stored_cohort(&store).await;
    let mut session = EditorSession::open("ws", cohort).unwrap();
    assert!(!session.is_changed());
    assert_eq!(session.request().data_filters, vec![json!("HAS_EHR_DATA")]);

    let age = Selection::new("param-age", "Age", Domain::Person).with_type(CriteriaType::Age);
    let (group_id, _) = session
        .add_criteria(Role::Excludes, None, 0, Domain::Person, vec![age])
        .unwrap();
    assert!(group_id.starts_with("excludes_"));
    assert!(session.is_changed());

    let saved = session.save(&store, None).await.unwrap();
    assert_eq!(saved.name, "Diabetes");
    assert!(!session.is_changed());

    let reloaded = store.get_cohort("ws", saved.id.unwrap()).await.unwrap();
    let criteria: serde_json::Value = serde_json::from_str(reloaded.criteria.as_deref().unwrap()).unwrap();
    assert_eq!(criteria["dataFilters"], json!(["HAS_EHR_DATA"]));
    assert!(criteria.get("datafilters").is_none());
    assert_eq!(criteria["excludes"][0]["id"], json!(group_id));
}

#[tokio::test]
async fn test_mirror_wins_for_same_cohort() {
    let store = InMemoryCohortStore::new();
    let cohort = stored_cohort(&store).await;
    let mirror = MemoryMirror::new();

    let mut session = EditorSession::open("ws", cohort.clone()).unwrap();
    session
        .dispatch(&Action::SetItemStatus {
            role: Role::Includes,
            group_id: "includes_aaaaaaaaa".into(),
            item_id: "items_bbbbbbbbb".into(),
            status: ItemStatus::Suppressed,
        })
        .unwrap();
    session.mirror_to(&mirror).unwrap();

    let restored =
        EditorSession::restore("ws", Some(cohort.clone()), &mirror, SessionConfig::default()).unwrap();
    assert_eq!(restored.request().includes[0].items[0].status, ItemStatus::Suppressed);
    assert!(restored.is_changed());

    let other_cohort = Cohort {
        id: Some(99),
        ..cohort
    };
    let fresh = EditorSession::restore("ws", Some(other_cohort), &mirror, SessionConfig::default()).unwrap();
    assert_eq!(fresh.request().includes[0].items[0].status, ItemStatus::Active);
}

#[test]
fn test_file_mirror_survives_reload() {
    let dir = TempDir::new().unwrap();
    let mirror = FileMirror::new(dir.path().join("mirror"));

    let mut session = EditorSession::new("ws");
    let (group_id, _) = session
        .add_criteria(
            Role::Includes,
            None,
            0,
            Domain::Condition,
            vec![Selection::new("p1", "Asthma", Domain::Condition)],
        )
        .unwrap();
    session
        .add_criteria(
            Role::Includes,
            Some(&group_id),
            1,
            Domain::Drug,
            vec![Selection::new("p2", "Albuterol", Domain::Drug)],
        )
        .unwrap();
    for action in [
        Action::SetTemporal {
            role: Role::Includes,
            group_id: group_id.clone(),
            temporal: true,
        },
        Action::SetMention {
            role: Role::Includes,
            group_id: group_id.clone(),
            mention: TemporalMention::FirstMention,
        },
        Action::SetTime {
            role: Role::Includes,
            group_id: group_id.clone(),
            time: TemporalTime::XDaysAfter,
        },
        Action::SetTimeValue {
            role: Role::Includes,
            group_id: group_id.clone(),
            value: "0".into(),
        },
    ] {
        session.dispatch(&action).unwrap();
    }
    session.mirror_to(&mirror).unwrap();
    assert!(dir.path().join("mirror").join(format!("{}.json", MIRROR_KEY)).exists());

    let restored = EditorSession::restore("ws", None, &mirror, SessionConfig::default()).unwrap();
    assert_eq!(restored.request(), session.request());
    assert!(restored.incomplete_temporal_groups().is_empty());

    let definition = restored.definition();
    assert_eq!(definition.includes[0].time_value, Some(0));
    assert_eq!(definition.includes[0].items[1].temporal_group, Some(1));

    restored.close(&mirror).unwrap();
    assert_eq!(mirror.load(MIRROR_KEY).unwrap(), None);
}

#[test]
fn test_corrupt_file_mirror_is_ignored() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", MIRROR_KEY)), "{not json").unwrap();
    let mirror = FileMirror::new(dir.path());

    assert_eq!(mirror.load(MIRROR_KEY).unwrap(), None);
    let session = EditorSession::restore("ws", None, &mirror, SessionConfig::default()).unwrap();
    assert!(session.request().is_empty());
}

#[tokio::test]
async fn test_count_uses_active_definition() {
    let counter = Arc::new(RecordingCounter::default());
    let mut session = EditorSession::new("ws");
    let (group_id, item_id) = session
        .add_criteria(
            Role::Includes,
            None,
            0,
            Domain::Condition,
            vec![Selection::new("p1", "<em>Asthma</em>", Domain::Condition)],
        )
        .unwrap();

    assert_eq!(session.count_participants(counter.as_ref()).await.unwrap(), 100);

    session
        .dispatch(&Action::RemoveItem {
            role: Role::Includes,
            group_id,
            item_id,
        })
        .unwrap();
    assert_eq!(session.count_participants(counter.as_ref()).await.unwrap(), 0);

    let seen = counter.seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].includes[0].items[0].search_parameters[0].name, "Asthma");
    assert!(seen[1].is_empty());
}
