//! The editable search request tree
//!
//! This is the shape the editor works on: groups and items carry a status so
//! they can be suppressed or soft-removed without losing their contents, and
//! temporal settings are kept as the user typed them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workbench_cohort_model::{Domain, Modifier, Role, TemporalMention, TemporalTime};

use crate::mapper::parse_int;
use crate::selection::Selection;

/// Editing status of a group or item. Only `Active` is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Active,
    /// Temporarily disabled by the user
    #[serde(alias = "hidden")]
    Suppressed,
    /// Removed, but the removal can still be undone
    Pending,
}

impl ItemStatus {
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// One criteria row in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: Domain,
    #[serde(default)]
    pub search_parameters: Vec<Selection>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Side of the owning temporal group; 0 when the group is not temporal
    #[serde(default)]
    pub temporal_group: i32,
    #[serde(default)]
    pub status: ItemStatus,
}

impl EditableItem {
    /// Create an empty, active item
    pub fn new(id: impl Into<String>, item_type: Domain, temporal_group: i32) -> Self {
        Self {
            id: id.into(),
            item_type,
            search_parameters: Vec::new(),
            modifiers: Vec::new(),
            name: None,
            temporal_group,
            status: ItemStatus::Active,
        }
    }

    pub fn with_parameters(mut self, search_parameters: Vec<Selection>) -> Self {
        self.search_parameters = search_parameters;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A group of OR-ed criteria rows in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableGroup {
    pub id: String,
    #[serde(default)]
    pub items: Vec<EditableItem>,
    #[serde(default)]
    pub temporal: bool,
    #[serde(default)]
    pub mention: TemporalMention,
    #[serde(default)]
    pub time: TemporalTime,
    /// Day count as typed; parsed when the definition is built
    #[serde(default)]
    pub time_value: String,
    #[serde(default)]
    pub time_frame: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl EditableGroup {
    /// Create an active, non-temporal group holding one item
    pub fn new(id: impl Into<String>, item: EditableItem) -> Self {
        Self {
            id: id.into(),
            items: vec![item],
            temporal: false,
            mention: TemporalMention::AnyMention,
            time: TemporalTime::DuringSameEncounterAs,
            time_value: String::new(),
            time_frame: String::new(),
            name: None,
            status: ItemStatus::Active,
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&EditableItem> {
        self.items.iter().find(|it| it.id == item_id)
    }

    /// Active items on one side of a temporal group
    pub fn active_items_in(&self, temporal_group: i32) -> impl Iterator<Item = &EditableItem> {
        self.items
            .iter()
            .filter(move |it| it.status.is_active() && it.temporal_group == temporal_group)
    }

    /// Whether the temporal settings cannot produce a query.
    ///
    /// Both sides need at least one active item, and the "X days" times need
    /// a non-negative day count, read the same way `map_group` reads it. Non-temporal groups never report an error.
    pub fn temporal_error(&self) -> bool {
        if !self.temporal {
            return false;
        }
        let empty_side = (0..=1).any(|side| self.active_items_in(side).next().is_none());
        let bad_value = self.time.requires_value()
            && !matches!(parse_int(&self.time_value), Some(v) if v >= 0);
        empty_side || bad_value
    }
}

/// The whole editable cohort definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub includes: Vec<EditableGroup>,
    #[serde(default)]
    pub excludes: Vec<EditableGroup>,
    #[serde(default)]
    pub data_filters: Vec<Value>,
}

impl SearchRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self, role: Role) -> &[EditableGroup] {
        match role {
            Role::Includes => &self.includes,
            Role::Excludes => &self.excludes,
        }
    }

    pub fn groups_mut(&mut self, role: Role) -> &mut Vec<EditableGroup> {
        match role {
            Role::Includes => &mut self.includes,
            Role::Excludes => &mut self.excludes,
        }
    }

    pub fn group(&self, role: Role, group_id: &str) -> Option<&EditableGroup> {
        self.groups(role).iter().find(|g| g.id == group_id)
    }

    /// Ids of every group and item in the tree, in document order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        Role::ALL.into_iter().flat_map(move |role| {
            self.groups(role).iter().flat_map(|group| {
                std::iter::once(group.id.as_str()).chain(group.items.iter().map(|it| it.id.as_str()))
            })
        })
    }

    /// Whether there is anything on screen at all
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}
