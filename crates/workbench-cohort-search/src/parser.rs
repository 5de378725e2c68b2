//! Stored criteria to editable tree
//!
//! Inflates the JSON held in a cohort's `criteria` field back into the tree
//! the editor works on. Everything loaded starts out active.

use log::debug;
use workbench_cohort_diagnostics::CohortError;
use workbench_cohort_model::serialize::{CriteriaSerializer, JsonSerializer};
use workbench_cohort_model::{CohortDefinition, SearchGroup, SearchGroupItem, SearchParameter};

use crate::request::{EditableGroup, EditableItem, ItemStatus, SearchRequest};
use crate::selection::Selection;

/// Parse stored criteria into an editable search request.
///
/// Malformed JSON, or JSON of the wrong shape, is a parse error carrying the
/// line and column where reading stopped. Both `dataFilters` and the legacy
/// `datafilters` key are accepted.
pub fn parse_cohort_definition(json: &str) -> Result<SearchRequest, CohortError> {
    let definition = JsonSerializer::new().deserialize(json)?;
    let request = inflate_definition(definition);
    debug!(
        "parsed cohort definition: {} include group(s), {} exclude group(s)",
        request.includes.len(),
        request.excludes.len()
    );
    Ok(request)
}

/// Inflate an already decoded definition
pub fn inflate_definition(definition: CohortDefinition) -> SearchRequest {
    SearchRequest {
        includes: definition.includes.into_iter().map(inflate_group).collect(),
        excludes: definition.excludes.into_iter().map(inflate_group).collect(),
        data_filters: definition.data_filters,
    }
}

fn inflate_group(group: SearchGroup) -> EditableGroup {
    let temporal = group.temporal;
    EditableGroup {
        id: group.id,
        items: group
            .items
            .into_iter()
            .map(|item| inflate_item(item, temporal))
            .collect(),
        temporal,
        mention: group.mention.unwrap_or_default(),
        time: group.time.unwrap_or_default(),
        time_value: group.time_value.map(|v| v.to_string()).unwrap_or_default(),
        time_frame: String::new(),
        name: group.name,
        status: ItemStatus::Active,
    }
}

fn inflate_item(item: SearchGroupItem, temporal: bool) -> EditableItem {
    EditableItem {
        id: item.id,
        item_type: item.item_type,
        search_parameters: item.search_parameters.into_iter().map(inflate_parameter).collect(),
        modifiers: item.modifiers,
        name: item.name,
        temporal_group: if temporal {
            item.temporal_group.unwrap_or(0)
        } else {
            0
        },
        status: ItemStatus::Active,
    }
}

fn inflate_parameter(param: SearchParameter) -> Selection {
    Selection {
        parameter_id: param.parameter_id,
        name: param.name,
        domain_id: param.domain,
        criteria_type: param.criteria_type,
        subtype: param.subtype,
        group: param.group,
        concept_id: param.concept_id,
        code: String::new(),
        has_attributes: !param.attributes.is_empty(),
        attributes: param.attributes,
        has_ancestor_data: param.ancestor_data,
        standard: param.standard,
        variant_id: param.variant_id,
        variant_filter: param.variant_filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use workbench_cohort_diagnostics::CB0001;
    use workbench_cohort_model::{Domain, TemporalMention, TemporalTime};

    fn group_json(extra: serde_json::Value) -> String {
        let mut group = json!({
            "id": "includes_1",
            "items": [{
                "id": "items_1",
                "type": "CONDITION",
                "searchParameters": [{
                    "parameterId": "p1",
                    "name": "Asthma",
                    "domain": "CONDITION",
                    "type": "SNOMED",
                    "group": false,
                    "attributes": [{"name": "NUM", "operator": "EQUAL", "operands": ["1"]}],
                    "ancestorData": true,
                    "standard": true,
                    "conceptId": 317009
                }],
                "modifiers": [],
                "temporalGroup": 1
            }]
        });
        if let (Some(target), Some(source)) = (group.as_object_mut(), extra.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        json!({ "includes": [group], "excludes": [], "dataFilters": [] }).to_string()
    }

    #[test]
    fn test_temporal_defaults() {
        let request = parse_cohort_definition(&group_json(json!({ "temporal": true }))).unwrap();
        let group = &request.includes[0];

        assert_eq!(group.mention, TemporalMention::AnyMention);
        assert_eq!(group.time, TemporalTime::DuringSameEncounterAs);
        assert_eq!(group.time_value, "");
        assert_eq!(group.time_frame, "");
        assert_eq!(group.status, ItemStatus::Active);
    }

    #[test]
    fn test_time_value_zero_kept() {
        let request = parse_cohort_definition(&group_json(json!({
            "temporal": true,
            "time": "X_DAYS_AFTER",
            "timeValue": 0
        })))
        .unwrap();
        assert_eq!(request.includes[0].time_value, "0");
    }

    #[test]
    fn test_non_temporal_forces_group_zero() {
        let request = parse_cohort_definition(&group_json(json!({ "temporal": false }))).unwrap();
        assert_eq!(request.includes[0].items[0].temporal_group, 0);

        let request = parse_cohort_definition(&group_json(json!({ "temporal": true }))).unwrap();
        assert_eq!(request.includes[0].items[0].temporal_group, 1);
    }

    #[test]
    fn test_parameter_renames() {
        let request = parse_cohort_definition(&group_json(json!({}))).unwrap();
        let selection = &request.includes[0].items[0].search_parameters[0];

        assert_eq!(selection.domain_id, Domain::Condition);
        assert!(selection.has_ancestor_data);
        assert!(selection.has_attributes);
        assert_eq!(selection.code, "");
        assert_eq!(selection.concept_id, Some(317009));
        assert_eq!(request.includes[0].items[0].status, ItemStatus::Active);
    }

    #[test]
    fn test_null_attributes_and_modifiers() {
        let criteria = json!({
            "includes": [{
                "id": "includes_1",
                "items": [{
                    "id": "items_1",
                    "type": "PERSON",
                    "searchParameters": [{
                        "parameterId": "p1",
                        "name": "Deceased",
                        "domain": "PERSON",
                        "type": "DECEASED",
                        "attributes": null
                    }],
                    "modifiers": null
                }]
            }],
            "excludes": []
        });
        let request = parse_cohort_definition(&criteria.to_string()).unwrap();
        let item = &request.includes[0].items[0];

        assert!(item.modifiers.is_empty());
        assert!(item.search_parameters[0].attributes.is_empty());
        assert!(!item.search_parameters[0].has_attributes);
    }

    #[test]
    fn test_missing_roles_default_empty() {
        let request = parse_cohort_definition("{}").unwrap();
        assert!(request.is_empty());
        assert!(request.data_filters.is_empty());
    }

    #[test]
    fn test_legacy_data_filters() {
        let request =
            parse_cohort_definition(r#"{"includes":[],"excludes":[],"datafilters":["HAS_EHR_DATA"]}"#)
                .unwrap();
        assert_eq!(request.data_filters, vec![json!("HAS_EHR_DATA")]);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_cohort_definition("{\n  \"includes\": [\n").unwrap_err();
        assert_eq!(err.code(), CB0001);
        assert!(!err.is_recoverable());
        assert_eq!(err.location().map(|loc| loc.line), Some(3));
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let err = parse_cohort_definition(r#"{"includes": 7}"#).unwrap_err();
        assert!(matches!(err, CohortError::Parse { .. }));
    }
}
