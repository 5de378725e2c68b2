//! Editor sessions
//!
//! An `EditorSession` is one open cohort editor: the search request being
//! edited, the id registry for everything created while it is open, the
//! criteria last saved, and the workspace and cohort it belongs to. Closing
//! the session drops the registry and clears the mirror.

use log::{debug, info};
use workbench_cohort_diagnostics::{CB0100, CB0202, CohortError};
use workbench_cohort_model::serialize::{CriteriaSerializer, JsonSerializer};
use workbench_cohort_model::{Cohort, CohortDefinition, Domain, Role};

use crate::action::{Action, GroupTarget};
use crate::ids::IdRegistry;
use crate::mapper::map_request;
use crate::mirror::{MirrorSnapshot, SessionMirror};
use crate::parser::parse_cohort_definition;
use crate::request::{EditableItem, SearchRequest};
use crate::selection::Selection;
use crate::store::{CohortStore, ParticipantCounter};

/// Key the in-progress search request is mirrored under
pub const MIRROR_KEY: &str = "CURRENT_COHORT_SEARCH_REQUEST";

/// Session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Mirror key for the in-progress request
    pub mirror_key: String,
    /// Prefix for generated item ids
    pub item_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mirror_key: MIRROR_KEY.to_string(),
            item_prefix: "items".to_string(),
        }
    }
}

/// One open cohort editor
#[derive(Debug)]
pub struct EditorSession {
    workspace_id: String,
    cohort: Option<Cohort>,
    request: SearchRequest,
    ids: IdRegistry,
    saved_criteria: Option<String>,
    config: SessionConfig,
}

impl EditorSession {
    /// Start editing a new, unsaved cohort
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            cohort: None,
            request: SearchRequest::new(),
            ids: IdRegistry::new(),
            saved_criteria: None,
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Start editing a saved cohort from its stored criteria
    pub fn open(workspace_id: impl Into<String>, cohort: Cohort) -> Result<Self, CohortError> {
        let request = match cohort.criteria.as_deref() {
            Some(criteria) => parse_cohort_definition(criteria)?,
            None => SearchRequest::new(),
        };
        let mut session = Self::new(workspace_id);
        session.saved_criteria = cohort.criteria.clone();
        session.cohort = Some(cohort);
        session.replace_request(request);
        Ok(session)
    }

    /// Start a session, preferring a mirrored request when it belongs here.
    ///
    /// With a saved cohort, a snapshot for the same workspace and cohort id
    /// wins over the stored criteria. Without one, only a snapshot for the same
    /// workspace and no cohort is used; any other snapshot is cleared.
    pub fn restore(
        workspace_id: impl Into<String>,
        cohort: Option<Cohort>,
        mirror: &dyn SessionMirror,
        config: SessionConfig,
    ) -> Result<Self, CohortError> {
        let workspace_id = workspace_id.into();
        let snapshot = mirror.load(&config.mirror_key)?;
        let same_workspace = |s: &MirrorSnapshot| s.workspace_id == workspace_id;

        let session = match cohort {
            Some(cohort) => {
                let cohort_id = cohort.id;
                match snapshot {
                    Some(s) if same_workspace(&s) && cohort_id.is_some() && s.cohort_id == cohort_id => {
                        debug!("restoring mirrored edits for cohort {:?}", cohort_id);
                        let mut session = Self::open(workspace_id.clone(), cohort)?;
                        session.replace_request(s.search_request);
                        session
                    }
                    _ => Self::open(workspace_id.clone(), cohort)?,
                }
            }
            None => match snapshot {
                Some(s) if same_workspace(&s) && s.cohort_id.is_none() => {
                    debug!("restoring mirrored edits for unsaved cohort");
                    let mut session = Self::new(workspace_id.clone());
                    session.replace_request(s.search_request);
                    session
                }
                _ => {
                    mirror.clear(&config.mirror_key)?;
                    Self::new(workspace_id.clone())
                }
            },
        };
        Ok(session.with_config(config))
    }

    fn replace_request(&mut self, request: SearchRequest) {
        self.ids.clear();
        self.ids.extend(request.ids().map(str::to_string));
        self.request = request;
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn cohort(&self) -> Option<&Cohort> {
        self.cohort.as_ref()
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Apply an edit. On error the request is unchanged.
    pub fn dispatch(&mut self, action: &Action) -> Result<(), CohortError> {
        self.request = self.request.apply(action)?;
        self.ids.extend(self.request.ids().map(str::to_string));
        Ok(())
    }

    /// Generate an id unique within this session
    pub fn generate_id(&mut self, prefix: Option<&str>) -> String {
        self.ids.generate_id(prefix)
    }

    /// Save selections from the criteria picker as a new item.
    ///
    /// Without a `group_id` a new group is created for the item. Returns the
    /// ids of the group and the item.
    pub fn add_criteria(
        &mut self,
        role: Role,
        group_id: Option<&str>,
        temporal_group: i32,
        item_type: Domain,
        selections: Vec<Selection>,
    ) -> Result<(String, String), CohortError> {
        let item_prefix = self.config.item_prefix.clone();
        let item_id = self.ids.generate_id(Some(&item_prefix));
        let target = match group_id {
            Some(id) => GroupTarget::Existing(id.to_string()),
            None => GroupTarget::New(self.ids.generate_id(Some(role.as_str()))),
        };
        let group_id = match &target {
            GroupTarget::Existing(id) | GroupTarget::New(id) => id.clone(),
        };
        let item = EditableItem::new(item_id.clone(), item_type, temporal_group).with_parameters(selections);
        self.dispatch(&Action::SaveCriteria { role, target, item })?;
        Ok((group_id, item_id))
    }

    /// The definition that would be saved now
    pub fn definition(&self) -> CohortDefinition {
        map_request(&self.request)
    }

    /// The definition as criteria JSON
    pub fn criteria_json(&self) -> Result<String, CohortError> {
        Ok(JsonSerializer::new().serialize(&self.definition())?)
    }

    /// Whether the definition differs from what was last saved.
    ///
    /// Stored criteria are compared as definitions, so key order and the
    /// legacy `datafilters` casing do not count as changes. An unsaved cohort
    /// is changed once it has any active criteria.
    pub fn is_changed(&self) -> bool {
        let current = self.definition();
        match self.saved_criteria.as_deref() {
            Some(saved) => match JsonSerializer::new().deserialize(saved) {
                Ok(saved) => saved != current,
                Err(_) => true,
            },
            None => !current.is_empty(),
        }
    }

    /// Temporal groups that cannot be saved yet
    pub fn incomplete_temporal_groups(&self) -> Vec<&str> {
        Role::ALL
            .into_iter()
            .flat_map(|role| self.request.groups(role))
            .filter(|g| g.status.is_active() && g.temporal_error())
            .map(|g| g.id.as_str())
            .collect()
    }

    /// Record a cohort as the saved state
    pub fn mark_saved(&mut self, cohort: Cohort) {
        self.saved_criteria = cohort.criteria.clone();
        self.cohort = Some(cohort);
    }

    pub fn snapshot(&self) -> MirrorSnapshot {
        MirrorSnapshot {
            workspace_id: self.workspace_id.clone(),
            cohort_id: self.cohort.as_ref().and_then(|c| c.id),
            search_request: self.request.clone(),
        }
    }

    /// Mirror the current request
    pub fn mirror_to(&self, mirror: &dyn SessionMirror) -> Result<(), CohortError> {
        mirror.store(&self.config.mirror_key, &self.snapshot())
    }

    /// End the session, clearing its mirror
    pub fn close(self, mirror: &dyn SessionMirror) -> Result<(), CohortError> {
        debug!(
            "closing editor session for {} ({} ids released)",
            self.workspace_id,
            self.ids.len()
        );
        mirror.clear(&self.config.mirror_key)
    }

    /// Save the current definition.
    ///
    /// A saved cohort is updated in place; `name` renames it. An unsaved
    /// cohort is created and needs a `name`.
    pub async fn save(&mut self, store: &dyn CohortStore, name: Option<&str>) -> Result<Cohort, CohortError> {
        let incomplete = self.incomplete_temporal_groups();
        if !incomplete.is_empty() {
            return Err(CohortError::edit(
                CB0202,
                format!("temporal group(s) {} are incomplete", incomplete.join(", ")),
            ));
        }
        let criteria = self.criteria_json()?;

        let saved = match self.cohort.clone().filter(|c| c.id.is_some()) {
            Some(mut cohort) => {
                cohort.criteria = Some(criteria);
                if let Some(name) = name {
                    cohort.name = name.to_string();
                }
                store.update_cohort(&self.workspace_id, cohort).await?
            }
            None => {
                let name = name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
                    CohortError::validation(CB0100, "name", "a new cohort needs a name")
                })?;
                let mut cohort = self.cohort.clone().unwrap_or_default();
                cohort.name = name.to_string();
                cohort.criteria = Some(criteria);
                store.create_cohort(&self.workspace_id, cohort).await?
            }
        };
        info!("saved cohort {:?} '{}'", saved.id, saved.name);
        self.mark_saved(saved.clone());
        Ok(saved)
    }

    /// Count participants matching the current definition
    pub async fn count_participants(&self, counter: &dyn ParticipantCounter) -> Result<u64, CohortError> {
        counter
            .count_participants(&self.workspace_id, &self.definition())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::MemoryMirror;
    use crate::request::ItemStatus;
    use crate::store::InMemoryCohortStore;
    use workbench_cohort_diagnostics::CB0301;

    fn asthma() -> Selection {
        Selection::new("p1", "Asthma", Domain::Condition).with_concept_id(317009)
    }

    #[test]
    fn test_add_criteria_generates_ids() {
        let mut session = EditorSession::new("ws");
        let (group_id, item_id) = session
            .add_criteria(Role::Includes, None, 0, Domain::Condition, vec![asthma()])
            .unwrap();

        assert!(group_id.starts_with("includes_"));
        assert!(item_id.starts_with("items_"));
        assert!(session.ids().contains(&group_id));

        let (same_group, _) = session
            .add_criteria(Role::Includes, Some(&group_id), 0, Domain::Drug, vec![])
            .unwrap();
        assert_eq!(same_group, group_id);
        assert_eq!(session.request().includes[0].items.len(), 2);
    }

    #[test]
    fn test_open_reserves_loaded_ids() {
        let criteria = r#"{"includes":[{"id":"includes_abc","items":[{"id":"items_def","type":"CONDITION",
            "searchParameters":[],"modifiers":[]}],"temporal":false}],"excludes":[],"dataFilters":[]}"#;
        let cohort = Cohort {
            id: Some(4),
            ..Cohort::new("c", criteria)
        };
        let session = EditorSession::open("ws", cohort).unwrap();

        assert!(session.ids().contains("includes_abc"));
        assert!(session.ids().contains("items_def"));
        assert!(!session.is_changed());
    }

    #[test]
    fn test_is_changed_tracks_active_criteria() {
        let mut session = EditorSession::new("ws");
        assert!(!session.is_changed());

        let (group_id, item_id) = session
            .add_criteria(Role::Includes, None, 0, Domain::Condition, vec![asthma()])
            .unwrap();
        assert!(session.is_changed());

        session
            .dispatch(&Action::SetItemStatus {
                role: Role::Includes,
                group_id,
                item_id,
                status: ItemStatus::Suppressed,
            })
            .unwrap();
        assert!(!session.is_changed());
    }

    #[test]
    fn test_restore_unsaved_from_mirror() {
        let mirror = MemoryMirror::new();
        let mut session = EditorSession::new("ws");
        session
            .add_criteria(Role::Excludes, None, 0, Domain::Person, vec![])
            .unwrap();
        session.mirror_to(&mirror).unwrap();

        let restored = EditorSession::restore("ws", None, &mirror, SessionConfig::default()).unwrap();
        assert_eq!(restored.request(), session.request());

        let other = EditorSession::restore("ws-2", None, &mirror, SessionConfig::default()).unwrap();
        assert!(other.request().is_empty());
        assert_eq!(mirror.load(MIRROR_KEY).unwrap(), None);
    }

    #[test]
    fn test_close_clears_mirror() {
        let mirror = MemoryMirror::new();
        let session = EditorSession::new("ws");
        session.mirror_to(&mirror).unwrap();
        session.close(&mirror).unwrap();
        assert_eq!(mirror.load(MIRROR_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let store = InMemoryCohortStore::new();
        let mut session = EditorSession::new("ws");
        session
            .add_criteria(Role::Includes, None, 0, Domain::Condition, vec![asthma()])
            .unwrap();

        let err = session.save(&store, None).await.unwrap_err();
        assert_eq!(err.code(), CB0100);

        let created = session.save(&store, Some("Asthma")).await.unwrap();
        assert_eq!(created.id, Some(1));
        assert!(!session.is_changed());

        let updated = session.save(&store, None).await.unwrap();
        assert_eq!(updated.id, Some(1));
        assert_eq!(updated.etag.as_deref(), Some("\"2\""));

        let mut second = EditorSession::new("ws");
        let err = second.save(&store, Some("Asthma")).await.unwrap_err();
        assert_eq!(err.code(), CB0301);
    }

    #[tokio::test]
    async fn test_save_rejects_incomplete_temporal_group() {
        let store = InMemoryCohortStore::new();
        let mut session = EditorSession::new("ws");
        let (group_id, _) = session
            .add_criteria(Role::Includes, None, 0, Domain::Condition, vec![asthma()])
            .unwrap();
        session
            .dispatch(&Action::SetTemporal {
                role: Role::Includes,
                group_id: group_id.clone(),
                temporal: true,
            })
            .unwrap();

        assert_eq!(session.incomplete_temporal_groups(), vec![group_id.as_str()]);
        let err = session.save(&store, Some("T")).await.unwrap_err();
        assert_eq!(err.code(), CB0202);
        assert!(store.is_empty());
    }
}
