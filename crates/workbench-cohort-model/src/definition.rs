//! Cohort definition structures as exchanged with the cohort-builder API
//!
//! Field names match the persisted JSON verbatim. Optional fields are omitted
//! from the output entirely when absent: presence and `null` are not the same
//! thing to consumers of stored definitions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::vocabulary::{
    AttrName, CriteriaSubType, CriteriaType, Domain, ModifierType, Operator, TemporalMention,
    TemporalTime,
};

/// Read an explicit `null` list the same as a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Definition Root
// ============================================================================

/// Root of a persisted cohort definition.
///
/// `includes` groups are AND-ed together; `excludes` groups are AND-ed and
/// then subtracted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortDefinition {
    /// Groups a participant must match
    #[serde(default)]
    pub includes: Vec<SearchGroup>,
    /// Groups that remove participants
    #[serde(default)]
    pub excludes: Vec<SearchGroup>,
    /// Opaque data filters, passed through untouched
    #[serde(default)]
    pub data_filters: Vec<Value>,
}

impl CohortDefinition {
    /// Create an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups for a role
    pub fn groups(&self, role: Role) -> &[SearchGroup] {
        match role {
            Role::Includes => &self.includes,
            Role::Excludes => &self.excludes,
        }
    }

    /// Whether the definition selects nothing at all
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

/// Which side of the definition a group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Includes,
    Excludes,
}

impl Role {
    /// Both roles, in output order
    pub const ALL: [Role; 2] = [Self::Includes, Self::Excludes];

    /// Key used for the role in JSON and as an id prefix
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Includes => "includes",
            Self::Excludes => "excludes",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Groups and Items
// ============================================================================

/// A boolean OR-group of criteria rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroup {
    /// Group identifier
    pub id: String,
    /// Criteria rows, OR-ed together
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<SearchGroupItem>,
    /// Whether the group relates two sets of items in time
    #[serde(default)]
    pub temporal: bool,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Occurrence used as the temporal anchor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention: Option<TemporalMention>,
    /// Time relationship between the two temporal sides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TemporalTime>,
    /// Day count for the "X days" times
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_value: Option<i64>,
}

impl SearchGroup {
    /// Create a non-temporal group
    pub fn new(id: impl Into<String>, items: Vec<SearchGroupItem>) -> Self {
        Self {
            id: id.into(),
            items,
            temporal: false,
            name: None,
            mention: None,
            time: None,
            time_value: None,
        }
    }
}

/// One criteria row inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroupItem {
    /// Item identifier
    pub id: String,
    /// Domain of the item's criteria
    #[serde(rename = "type")]
    pub item_type: Domain,
    /// Criteria, OR-ed together; order is significant for display
    #[serde(default, deserialize_with = "null_as_empty")]
    pub search_parameters: Vec<SearchParameter>,
    /// Temporal and attribute modifiers
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modifiers: Vec<Modifier>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Side of a temporal group (0 or 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_group: Option<i32>,
}

// ============================================================================
// Parameters
// ============================================================================

/// A single criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameter {
    /// Unique within the cohort definition
    pub parameter_id: String,
    /// Name of the generating criterion
    pub name: String,
    /// Domain of the generating criterion
    pub domain: Domain,
    /// Type of the generating criterion
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub criteria_type: Option<CriteriaType>,
    /// Whether the parameter stands for a group of concepts
    #[serde(default)]
    pub group: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Vec<Attribute>,
    /// Whether descendants are resolved through the ancestor table
    #[serde(default)]
    pub ancestor_data: bool,
    /// Whether the concept is from a standard vocabulary
    #[serde(default)]
    pub standard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// Only carried for survey criteria
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<CriteriaSubType>,
}

/// Attribute constraint on a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: AttrName,
    pub operator: Operator,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operands: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<i64>,
}

impl Attribute {
    /// Create an attribute without a concept
    pub fn new(name: AttrName, operator: Operator, operands: Vec<String>) -> Self {
        Self {
            name,
            operator,
            operands,
            concept_id: None,
        }
    }
}

/// Modifier applied to every parameter of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub name: ModifierType,
    pub operator: Operator,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operands: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parameter() -> SearchParameter {
        SearchParameter {
            parameter_id: "param_1".to_string(),
            name: "Type 2 diabetes".to_string(),
            domain: Domain::Condition,
            criteria_type: Some(CriteriaType::Icd10Cm),
            group: false,
            attributes: vec![],
            ancestor_data: false,
            standard: true,
            concept_id: None,
            variant_filter: None,
            variant_id: None,
            subtype: None,
        }
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let value = serde_json::to_value(parameter()).unwrap();
        let obj = value.as_object().unwrap();

        assert!(!obj.contains_key("conceptId"));
        assert!(!obj.contains_key("variantId"));
        assert!(!obj.contains_key("variantFilter"));
        assert!(!obj.contains_key("subtype"));
        assert_eq!(obj["type"], json!("ICD10CM"));
        assert_eq!(obj["parameterId"], json!("param_1"));
        assert_eq!(obj["ancestorData"], json!(false));
    }

    #[test]
    fn test_zero_concept_id_is_present() {
        let mut param = parameter();
        param.concept_id = Some(0);
        let value = serde_json::to_value(param).unwrap();
        assert_eq!(value["conceptId"], json!(0));
    }

    #[test]
    fn test_group_defaults() {
        let group: SearchGroup = serde_json::from_value(json!({
            "id": "includes_abc",
            "items": []
        }))
        .unwrap();

        assert!(!group.temporal);
        assert_eq!(group.mention, None);
        assert_eq!(group.time_value, None);
    }

    #[test]
    fn test_item_type_key() {
        let item = SearchGroupItem {
            id: "items_1".to_string(),
            item_type: Domain::Drug,
            search_parameters: vec![],
            modifiers: vec![],
            name: None,
            temporal_group: None,
        };
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value, json!({
            "id": "items_1",
            "type": "DRUG",
            "searchParameters": [],
            "modifiers": []
        }));
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let item: SearchGroupItem = serde_json::from_value(json!({
            "id": "items_1",
            "type": "PERSON",
            "searchParameters": [{
                "parameterId": "p1",
                "name": "Age",
                "domain": "PERSON",
                "attributes": null
            }],
            "modifiers": null
        }))
        .unwrap();

        assert!(item.modifiers.is_empty());
        assert!(item.search_parameters[0].attributes.is_empty());
    }

    #[test]
    fn test_role_keys() {
        assert_eq!(Role::Includes.as_str(), "includes");
        assert_eq!(serde_json::to_string(&Role::Excludes).unwrap(), "\"excludes\"");
    }
}
