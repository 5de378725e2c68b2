//! Editable tree to cohort definition mapping
//!
//! Folds the editor's search request into the `CohortDefinition` persisted on
//! save and sent to the count endpoint. Suppressed and pending groups or items
//! never reach the output.

use workbench_cohort_model::{
    CohortDefinition, Domain, Role, SearchGroup, SearchGroupItem, SearchParameter,
};

use crate::display::strip_html;
use crate::request::{EditableGroup, EditableItem, SearchRequest};
use crate::selection::Selection;

/// Map one selection to a wire search parameter.
///
/// Absent `conceptId`, `variantId` and `variantFilter` stay absent; `0` and
/// empty strings are kept. `subtype` is only carried for survey criteria.
pub fn map_parameter(selection: &Selection) -> SearchParameter {
    SearchParameter {
        parameter_id: selection.parameter_id.clone(),
        name: strip_html(&selection.name),
        domain: selection.domain_id.clone(),
        criteria_type: selection.criteria_type.clone(),
        group: selection.group,
        attributes: selection.attributes.clone(),
        ancestor_data: selection.has_ancestor_data,
        standard: selection.standard,
        concept_id: selection.concept_id,
        variant_filter: selection.variant_filter.clone(),
        variant_id: selection.variant_id.clone(),
        subtype: if selection.domain_id == Domain::Survey {
            selection.subtype.clone()
        } else {
            None
        },
    }
}

/// Map one item. Every parameter is kept, in order.
pub fn map_group_item(item: &EditableItem, temporal: bool) -> SearchGroupItem {
    SearchGroupItem {
        id: item.id.clone(),
        item_type: item.item_type.clone(),
        search_parameters: item.search_parameters.iter().map(map_parameter).collect(),
        modifiers: item.modifiers.clone(),
        name: item.name.clone().filter(|name| !name.is_empty()),
        temporal_group: temporal.then_some(item.temporal_group),
    }
}

/// Map one group, keeping only its active items.
///
/// A group without active items still maps to a group with no items; dropping
/// such groups is left to `map_request`.
pub fn map_group(group: &EditableGroup) -> SearchGroup {
    let items = group
        .items
        .iter()
        .filter(|it| it.status.is_active())
        .map(|it| map_group_item(it, group.temporal))
        .collect();

    let mut search_group = SearchGroup::new(group.id.clone(), items);
    search_group.name = group.name.clone().filter(|name| !name.is_empty());
    if group.temporal {
        search_group.temporal = true;
        search_group.mention = Some(group.mention);
        search_group.time = Some(group.time);
        search_group.time_value = parse_int(&group.time_value);
    }
    search_group
}

/// Whether a group has at least one active item
pub fn has_active_items(group: &EditableGroup) -> bool {
    group.items.iter().any(|it| it.status.is_active())
}

/// Map the whole request.
///
/// Only active groups with at least one active item are kept; `dataFilters`
/// pass through untouched.
pub fn map_request(request: &SearchRequest) -> CohortDefinition {
    let groups_for = |role: Role| -> Vec<SearchGroup> {
        request
            .groups(role)
            .iter()
            .filter(|grp| grp.status.is_active() && has_active_items(grp))
            .map(map_group)
            .collect()
    };

    CohortDefinition {
        includes: groups_for(Role::Includes),
        excludes: groups_for(Role::Excludes),
        data_filters: request.data_filters.clone(),
    }
}

/// Leading base-10 integer of `input`, read the way form fields are read:
/// leading whitespace and one sign are allowed, trailing junk is ignored.
/// Values beyond the `i64` range saturate.
pub(crate) fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ItemStatus;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use workbench_cohort_model::{CriteriaSubType, TemporalMention, TemporalTime};

    fn item(id: &str, status: ItemStatus) -> EditableItem {
        let mut item = EditableItem::new(id, Domain::Condition, 0)
            .with_parameters(vec![Selection::new(format!("p_{}", id), id, Domain::Condition)]);
        item.status = status;
        item
    }

    #[test]
    fn test_absent_concept_id_has_no_key() {
        let selection = Selection::new("p1", "x", Domain::Condition);
        let value = serde_json::to_value(map_parameter(&selection)).unwrap();
        let obj = value.as_object().unwrap();

        assert!(!obj.contains_key("conceptId"));
        assert!(!obj.contains_key("variantId"));
        assert!(!obj.contains_key("variantFilter"));
        assert_eq!(obj["attributes"], json!([]));
    }

    #[test]
    fn test_empty_variant_id_is_kept() {
        let mut selection = Selection::new("p1", "x", Domain::WholeGenomeVariant).with_concept_id(0);
        selection.variant_id = Some(String::new());
        let param = map_parameter(&selection);

        assert_eq!(param.concept_id, Some(0));
        assert_eq!(param.variant_id, Some(String::new()));
    }

    #[test]
    fn test_subtype_only_for_survey() {
        let survey = Selection::new("p1", "x", Domain::Survey)
            .with_subtype(CriteriaSubType::Question);
        assert_eq!(map_parameter(&survey).subtype, Some(CriteriaSubType::Question));

        let mut condition = survey.clone();
        condition.domain_id = Domain::Condition;
        let value = serde_json::to_value(map_parameter(&condition)).unwrap();
        assert!(value.get("subtype").is_none());
    }

    #[test]
    fn test_name_is_stripped() {
        let selection = Selection::new("p1", "<b>Type 2</b> diabetes", Domain::Condition);
        assert_eq!(map_parameter(&selection).name, "Type 2 diabetes");
    }

    #[test]
    fn test_item_temporal_group_only_when_temporal() {
        let mut it = item("a", ItemStatus::Active);
        it.temporal_group = 1;
        assert_eq!(map_group_item(&it, false).temporal_group, None);
        assert_eq!(map_group_item(&it, true).temporal_group, Some(1));
    }

    #[test]
    fn test_item_empty_name_dropped() {
        let mut it = item("a", ItemStatus::Active);
        it.name = Some(String::new());
        assert_eq!(map_group_item(&it, false).name, None);
        it.name = Some("Renamed".into());
        assert_eq!(map_group_item(&it, false).name.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_group_keeps_order_and_filters() {
        let mut group = EditableGroup::new("g", item("A", ItemStatus::Active));
        group.items.push(item("X", ItemStatus::Suppressed));
        group.items.push(item("B", ItemStatus::Active));
        group.items.push(item("Y", ItemStatus::Pending));
        group.items.push(item("C", ItemStatus::Active));

        let mapped = map_group(&group);
        let ids: Vec<_> = mapped.items.iter().map(|it| it.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_group_without_active_items_still_maps() {
        let group = EditableGroup::new("g", item("A", ItemStatus::Suppressed));
        assert!(map_group(&group).items.is_empty());
        assert!(!has_active_items(&group));
    }

    #[test]
    fn test_temporal_group_settings() {
        let mut group = EditableGroup::new("g", item("A", ItemStatus::Active));
        group.temporal = true;
        group.mention = TemporalMention::LastMention;
        group.time = TemporalTime::XDaysBefore;
        group.time_value = "30".into();

        let mapped = map_group(&group);
        assert_eq!(mapped.mention, Some(TemporalMention::LastMention));
        assert_eq!(mapped.time, Some(TemporalTime::XDaysBefore));
        assert_eq!(mapped.time_value, Some(30));
        assert_eq!(mapped.items[0].temporal_group, Some(0));
    }

    #[test]
    fn test_non_temporal_group_has_no_temporal_keys() {
        let group = EditableGroup::new("g", item("A", ItemStatus::Active));
        let value = serde_json::to_value(map_group(&group)).unwrap();
        assert!(value.get("mention").is_none());
        assert!(value.get("time").is_none());
        assert!(value.get("timeValue").is_none());
        assert_eq!(value["temporal"], json!(false));
    }

    #[test]
    fn test_request_drops_inactive_groups() {
        let mut request = SearchRequest::new();
        request.includes.push(EditableGroup::new("keep", item("A", ItemStatus::Active)));
        request.includes.push(EditableGroup::new("empty", item("B", ItemStatus::Suppressed)));
        let mut hidden = EditableGroup::new("hidden", item("C", ItemStatus::Active));
        hidden.status = ItemStatus::Suppressed;
        request.includes.push(hidden);
        request.excludes.push(EditableGroup::new("ex", item("D", ItemStatus::Active)));
        request.data_filters = vec![json!("HAS_EHR_DATA")];

        let definition = map_request(&request);
        assert_eq!(definition.includes.len(), 1);
        assert_eq!(definition.includes[0].id, "keep");
        assert_eq!(definition.excludes.len(), 1);
        assert_eq!(definition.data_filters, vec![json!("HAS_EHR_DATA")]);
    }

    #[rstest]
    #[case("42", Some(42))]
    #[case("  7 days", Some(7))]
    #[case("-3", Some(-3))]
    #[case("+5", Some(5))]
    #[case("", None)]
    #[case("abc", None)]
    #[case("-", None)]
    #[case("3.9", Some(3))]
    #[case("99999999999999999999", Some(i64::MAX))]
    #[case("-99999999999999999999", Some(-i64::MAX))]
    fn test_parse_int(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_int(input), expected);
    }
}
