//! Criteria selections as held by the editor
//!
//! A `Selection` is the editor-side form of a search parameter. Input coming
//! from the criteria pickers arrives as a `RawSelection` and is validated once
//! at that boundary, so the mapper only ever sees complete selections.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workbench_cohort_diagnostics::{CB0100, CB0101, CohortError};
use workbench_cohort_model::{Attribute, CriteriaSubType, CriteriaType, Domain};

/// A validated criterion selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub parameter_id: String,
    pub name: String,
    pub domain_id: Domain,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub criteria_type: Option<CriteriaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<CriteriaSubType>,
    #[serde(default)]
    pub group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<i64>,
    /// Source code shown next to the name; not part of the wire format
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub has_attributes: bool,
    #[serde(default)]
    pub has_ancestor_data: bool,
    #[serde(default)]
    pub standard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_filter: Option<Value>,
}

impl Selection {
    /// Create a plain concept selection
    pub fn new(parameter_id: impl Into<String>, name: impl Into<String>, domain_id: Domain) -> Self {
        Self {
            parameter_id: parameter_id.into(),
            name: name.into(),
            domain_id,
            criteria_type: None,
            subtype: None,
            group: false,
            concept_id: None,
            code: String::new(),
            attributes: Vec::new(),
            has_attributes: false,
            has_ancestor_data: false,
            standard: false,
            variant_id: None,
            variant_filter: None,
        }
    }

    pub fn with_type(mut self, criteria_type: CriteriaType) -> Self {
        self.criteria_type = Some(criteria_type);
        self
    }

    pub fn with_subtype(mut self, subtype: CriteriaSubType) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn with_concept_id(mut self, concept_id: i64) -> Self {
        self.concept_id = Some(concept_id);
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.has_attributes = !attributes.is_empty();
        self.attributes = attributes;
        self
    }
}

/// Selection as produced by the criteria pickers, before validation.
///
/// Every field is optional; `attributes` may be `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSelection {
    pub parameter_id: Option<String>,
    pub name: Option<String>,
    pub domain_id: Option<Domain>,
    #[serde(rename = "type")]
    pub criteria_type: Option<CriteriaType>,
    pub subtype: Option<CriteriaSubType>,
    pub group: Option<bool>,
    pub concept_id: Option<i64>,
    pub code: Option<String>,
    pub attributes: Option<Vec<Attribute>>,
    pub has_ancestor_data: Option<bool>,
    pub standard: Option<bool>,
    pub variant_id: Option<String>,
    pub variant_filter: Option<Value>,
}

fn required(value: Option<String>, field: &str) -> Result<String, CohortError> {
    match value {
        None => Err(CohortError::validation(
            CB0100,
            field,
            format!("selection is missing `{}`", field),
        )),
        Some(v) if v.trim().is_empty() => Err(CohortError::validation(
            CB0101,
            field,
            format!("selection has an empty `{}`", field),
        )),
        Some(v) => Ok(v),
    }
}

impl TryFrom<RawSelection> for Selection {
    type Error = CohortError;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        let parameter_id = required(raw.parameter_id, "parameterId")?;
        let name = raw.name.ok_or_else(|| {
            CohortError::validation(CB0100, "name", "selection is missing `name`")
        })?;
        let domain_id = raw.domain_id.ok_or_else(|| {
            CohortError::validation(CB0100, "domainId", "selection is missing `domainId`")
        })?;
        let attributes = raw.attributes.unwrap_or_default();

        Ok(Self {
            parameter_id,
            name,
            domain_id,
            criteria_type: raw.criteria_type,
            subtype: raw.subtype,
            group: raw.group.unwrap_or(false),
            concept_id: raw.concept_id,
            code: raw.code.unwrap_or_default(),
            has_attributes: !attributes.is_empty(),
            attributes,
            has_ancestor_data: raw.has_ancestor_data.unwrap_or(false),
            standard: raw.standard.unwrap_or(false),
            variant_id: raw.variant_id,
            variant_filter: raw.variant_filter,
        })
    }
}
