//! Edits to the search request
//!
//! Every change the editor makes is an `Action`. Applying one never mutates
//! the request it was applied to; it returns the updated tree.

use serde_json::Value;
use workbench_cohort_diagnostics::{CB0200, CB0201, CohortError};
use workbench_cohort_model::{Role, TemporalMention, TemporalTime};

use crate::request::{EditableGroup, EditableItem, ItemStatus, SearchRequest};

/// Group an item is saved into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTarget {
    /// A group already in the request
    Existing(String),
    /// A new group with this id, appended to the role
    New(String),
}

/// A single edit to a search request
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Save an item from the criteria picker. An item with the same id in the
    /// target group is replaced in place, otherwise the item is appended.
    SaveCriteria {
        role: Role,
        target: GroupTarget,
        item: EditableItem,
    },
    SetItemStatus {
        role: Role,
        group_id: String,
        item_id: String,
        status: ItemStatus,
    },
    RemoveItem {
        role: Role,
        group_id: String,
        item_id: String,
    },
    RenameItem {
        role: Role,
        group_id: String,
        item_id: String,
        name: String,
    },
    SetGroupStatus {
        role: Role,
        group_id: String,
        status: ItemStatus,
    },
    RenameGroup {
        role: Role,
        group_id: String,
        name: String,
    },
    RemoveGroup {
        role: Role,
        group_id: String,
    },
    SetTemporal {
        role: Role,
        group_id: String,
        temporal: bool,
    },
    SetMention {
        role: Role,
        group_id: String,
        mention: TemporalMention,
    },
    SetTime {
        role: Role,
        group_id: String,
        time: TemporalTime,
    },
    /// Day count exactly as typed
    SetTimeValue {
        role: Role,
        group_id: String,
        value: String,
    },
    SetDataFilters(Vec<Value>),
}

impl SearchRequest {
    /// Apply an action, returning the updated request.
    ///
    /// Actions naming a group or item that is not in the request fail with
    /// an edit error and leave `self` untouched.
    pub fn apply(&self, action: &Action) -> Result<SearchRequest, CohortError> {
        let mut next = self.clone();
        match action {
            Action::SaveCriteria { role, target, item } => match target {
                GroupTarget::Existing(group_id) => {
                    let group = next.group_mut(*role, group_id)?;
                    match group.items.iter_mut().find(|it| it.id == item.id) {
                        Some(existing) => *existing = item.clone(),
                        None => group.items.push(item.clone()),
                    }
                }
                GroupTarget::New(group_id) => {
                    next.groups_mut(*role)
                        .push(EditableGroup::new(group_id.clone(), item.clone()));
                }
            },
            Action::SetItemStatus {
                role,
                group_id,
                item_id,
                status,
            } => next.item_mut(*role, group_id, item_id)?.status = *status,
            Action::RemoveItem {
                role,
                group_id,
                item_id,
            } => {
                let group = next.group_mut(*role, group_id)?;
                let before = group.items.len();
                group.items.retain(|it| &it.id != item_id);
                if group.items.len() == before {
                    return Err(missing_item(group_id, item_id));
                }
            }
            Action::RenameItem {
                role,
                group_id,
                item_id,
                name,
            } => next.item_mut(*role, group_id, item_id)?.name = Some(name.clone()),
            Action::SetGroupStatus {
                role,
                group_id,
                status,
            } => next.group_mut(*role, group_id)?.status = *status,
            Action::RenameGroup {
                role,
                group_id,
                name,
            } => next.group_mut(*role, group_id)?.name = Some(name.clone()),
            Action::RemoveGroup { role, group_id } => {
                let groups = next.groups_mut(*role);
                let index = groups
                    .iter()
                    .position(|g| &g.id == group_id)
                    .ok_or_else(|| missing_group(*role, group_id))?;
                groups.remove(index);
            }
            Action::SetTemporal {
                role,
                group_id,
                temporal,
            } => next.group_mut(*role, group_id)?.temporal = *temporal,
            Action::SetMention {
                role,
                group_id,
                mention,
            } => next.group_mut(*role, group_id)?.mention = *mention,
            Action::SetTime {
                role,
                group_id,
                time,
            } => next.group_mut(*role, group_id)?.time = *time,
            Action::SetTimeValue {
                role,
                group_id,
                value,
            } => next.group_mut(*role, group_id)?.time_value = value.clone(),
            Action::SetDataFilters(filters) => next.data_filters = filters.clone(),
        }
        Ok(next)
    }

    fn group_mut(&mut self, role: Role, group_id: &str) -> Result<&mut EditableGroup, CohortError> {
        self.groups_mut(role)
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| missing_group(role, group_id))
    }

    fn item_mut(
        &mut self,
        role: Role,
        group_id: &str,
        item_id: &str,
    ) -> Result<&mut EditableItem, CohortError> {
        self.group_mut(role, group_id)?
            .items
            .iter_mut()
            .find(|it| it.id == item_id)
            .ok_or_else(|| missing_item(group_id, item_id))
    }
}

fn missing_group(role: Role, group_id: &str) -> CohortError {
    CohortError::edit(CB0200, format!("no {} group with id '{}'", role, group_id))
}

fn missing_item(group_id: &str, item_id: &str) -> CohortError {
    CohortError::edit(
        CB0201,
        format!("group '{}' has no item with id '{}'", group_id, item_id),
    )
}
