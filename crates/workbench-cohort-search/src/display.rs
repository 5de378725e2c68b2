//! Display helpers for criteria
//!
//! Pure string transforms used when listing criteria: titles for domains,
//! types and subtypes, names and attribute summaries for selections, and
//! search-term highlighting.

use std::sync::LazyLock;

use log::warn;
use regex::{Captures, Regex};
use workbench_cohort_model::{
    AgeType, CriteriaSubType, CriteriaType, Domain, GenderSexRaceOrEthType,
};

use crate::selection::Selection;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("html tag regex"));

/// Longest numeric input accepted from a form field
pub const MAX_NUMERICAL_INPUT: usize = 10;

/// Remove every `<...>` tag, including tags spanning lines
pub fn strip_html(input: &str) -> String {
    HTML_TAG.replace_all(input, "").into_owned()
}

/// Lower-case the input, then capitalise each word.
///
/// Words are runs of letters and digits; anything else separates them and
/// collapses to a single space.
pub fn to_title_case(input: &str) -> String {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Source code shown next to condition, procedure and measurement criteria
pub fn type_display(selection: &Selection) -> &str {
    match selection.domain_id {
        Domain::Condition | Domain::Procedure | Domain::Measurement => &selection.code,
        _ => "",
    }
}

/// Name shown for a selection in the criteria list
pub fn name_display(selection: &Selection) -> String {
    match (&selection.criteria_type, selection.variant_id.as_deref()) {
        (Some(CriteriaType::Deceased), _) => String::new(),
        (_, Some(variant_id)) if !variant_id.is_empty() => format!("Variant {}", variant_id),
        (Some(CriteriaType::Ethnicity | CriteriaType::Race), _) => {
            to_title_case(&strip_html(&selection.name))
        }
        _ => strip_html(&selection.name),
    }
}

/// Operator and operands of an age selection, e.g. `In Range 18, 65`
pub fn attribute_display(selection: &Selection) -> String {
    if selection.criteria_type != Some(CriteriaType::Age) {
        return String::new();
    }
    selection
        .attributes
        .iter()
        .map(|attr| format!("{} {}", attr.operator.label(), attr.operands.join(", ")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Section title for a domain; unknown domains show their wire value
pub fn domain_to_title(domain: &Domain) -> &str {
    match domain {
        Domain::Person => "Demographics",
        Domain::Measurement => "Labs and Measurements",
        Domain::PhysicalMeasurement | Domain::PhysicalMeasurementCss => "Physical Measurements",
        Domain::Visit => "Visits",
        Domain::Drug => "Drugs",
        Domain::Condition => "Conditions",
        Domain::Procedure => "Procedures",
        Domain::Observation => "Observations",
        Domain::Device => "Devices",
        Domain::Lab => "Labs",
        Domain::Vital => "Vitals",
        Domain::Survey => "Surveys",
        Domain::AllEvents => "All Events",
        Domain::Fitbit => "Fitbit",
        Domain::FitbitHeartRateSummary => "Fitbit Heart Rate Summary",
        Domain::FitbitActivity => "Fitbit Activity Summary",
        Domain::FitbitHeartRateLevel => "Fitbit Heart Rate Level",
        Domain::FitbitIntradaySteps => "Fitbit Intra Day Steps",
        Domain::FitbitSleepDailySummary => "Fitbit Sleep Daily Summary",
        Domain::FitbitSleepLevel => "Fitbit Sleep Level",
        Domain::WearConsent => "Wear Consent",
        Domain::WholeGenomeVariant => "Short Read WGS",
        Domain::LrWholeGenomeVariant => "Long Read WGS",
        Domain::ArrayData => "Global Diversity Array",
        Domain::StructuralVariantData => "Structural Variant Data",
        Domain::SnpIndelVariant => "SNP/Indel Variants",
        Domain::ZipCodeSocioeconomic => "Zip Code Socioeconomic Status",
        Domain::EtmDelayDiscounting => "EtM Now or Later",
        Domain::EtmDelayDiscountingMetadata => "EtM Now or Later Metadata",
        Domain::EtmDelayDiscountingOutcomes => "EtM Now or Later Outcomes",
        Domain::EtmDelayDiscountingTrialData => "EtM Now or Later Trial Data",
        Domain::EtmEmoRecog => "EtM Guess the Emotion",
        Domain::EtmEmoRecogMetadata => "EtM Guess the Emotion Metadata",
        Domain::EtmEmoRecogOutcomes => "EtM Guess the Emotion Outcomes",
        Domain::EtmEmoRecogTrialData => "EtM Guess the Emotion Trial Data",
        Domain::EtmFlanker => "EtM Left or Right",
        Domain::EtmFlankerMetadata => "EtM Left or Right Metadata",
        Domain::EtmFlankerOutcomes => "EtM Left or Right Outcomes",
        Domain::EtmFlankerTrialData => "EtM Left or Right Trial Data",
        Domain::EtmGradCpt => "EtM City or Mountain",
        Domain::EtmGradCptMetadata => "EtM City or Mountain Metadata",
        Domain::EtmGradCptOutcomes => "EtM City or Mountain Outcomes",
        Domain::EtmGradCptTrialData => "EtM City or Mountain Trial Data",
        Domain::Other(value) => value.as_str(),
    }
}

/// Title for demographic criteria types; other types show their wire value
pub fn type_to_title(criteria_type: &CriteriaType) -> &str {
    match criteria_type {
        CriteriaType::Age => "Age",
        CriteriaType::Deceased => "Deceased",
        CriteriaType::Ethnicity => "Ethnicity",
        CriteriaType::Gender => "Gender Identity",
        CriteriaType::Race => "Race",
        CriteriaType::Sex => "Sex Assigned at Birth",
        CriteriaType::HasEhrData => "Has EHR Data",
        CriteriaType::SelfReportedCategory => "Self Reported Category",
        other => other.as_str(),
    }
}

/// Title for physical measurement subtypes; others show their wire value
pub fn subtype_to_title(subtype: &CriteriaSubType) -> &str {
    match subtype {
        CriteriaSubType::Bp => "Blood Pressure",
        CriteriaSubType::Bmi => "BMI",
        CriteriaSubType::Hr => "Heart Rate",
        CriteriaSubType::Height => "Height",
        CriteriaSubType::Hc => "Hip Circumference",
        CriteriaSubType::Wc => "Waist Circumference",
        CriteriaSubType::Weight => "Weight",
        other => other.as_str(),
    }
}

pub const fn age_type_to_text(age_type: AgeType) -> &'static str {
    match age_type {
        AgeType::Age => "Current Age",
        AgeType::AgeAtCdr => "Age at CDR",
        AgeType::AgeAtConsent => "Age at Consent",
    }
}

pub const fn gender_sex_race_or_eth_type_to_text(kind: GenderSexRaceOrEthType) -> &'static str {
    match kind {
        GenderSexRaceOrEthType::Gender => "Gender Identity",
        GenderSexRaceOrEthType::SexAtBirth => "Sex at Birth",
        GenderSexRaceOrEthType::Race => "Race",
        GenderSexRaceOrEthType::Ethnicity => "Ethnicity",
        GenderSexRaceOrEthType::SelfReportedCategory => "Self Reported Category",
    }
}

/// Wrap every case-insensitive match of `terms` in `name` in a
/// `search-keyword` span.
///
/// With `full_text`, each term is split on commas and spaces and words of
/// three or more characters are matched as whole words, except the last one,
/// which may match a prefix. `id` adds a `match<id>` class to the span.
pub fn highlight_matches<S: AsRef<str>>(
    terms: &[S],
    name: &str,
    full_text: bool,
    id: Option<&str>,
) -> String {
    let class = match id.filter(|id| !id.is_empty()) {
        Some(id) => format!("match{} search-keyword", id),
        None => "search-keyword".to_string(),
    };
    let wrap = |caps: &Captures| format!("<span class=\"{}\">{}</span>", class, &caps[0]);

    let mut output = strip_html(name);
    for term in terms {
        for pattern in term_patterns(term.as_ref(), full_text) {
            match Regex::new(&pattern) {
                Ok(re) => output = re.replace_all(&output, &wrap).into_owned(),
                Err(e) => warn!("skipping highlight pattern {:?}: {}", pattern, e),
            }
        }
    }
    output
}

/// Full-text terms match whole words, except the last word kept after
/// dropping short ones, which also matches as a prefix
fn term_patterns(term: &str, full_text: bool) -> Vec<String> {
    if !full_text {
        return vec![format!("(?i){}", regex::escape(term))];
    }
    let words: Vec<&str> = term
        .trim()
        .split([',', ' '])
        .filter(|word| word.chars().count() > 2)
        .collect();
    let last = words.len().saturating_sub(1);
    words
        .iter()
        .enumerate()
        .map(|(index, word)| {
            if index == last {
                format!("(?i){}", regex::escape(word))
            } else {
                format!(r"(?i)\b{}\b", regex::escape(word))
            }
        })
        .collect()
}

/// Truncate numeric form input to `MAX_NUMERICAL_INPUT` characters
pub fn sanitize_numerical_input(input: &str) -> &str {
    match input.char_indices().nth(MAX_NUMERICAL_INPUT) {
        Some((end, _)) => &input[..end],
        None => input,
    }
}

/// Criteria type and standard flag implied by an item's parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAndStandard {
    pub criteria_type: Option<CriteriaType>,
    pub standard: Option<bool>,
}

/// Type and standard flag used when reopening an item in the criteria
/// picker. Only demographics, physical measurements, surveys and visits
/// carry one; a deceased criterion reopens as an age criterion.
pub fn type_and_standard(parameters: &[Selection], item_type: &Domain) -> TypeAndStandard {
    let first_type = parameters.first().and_then(|p| p.criteria_type.clone());
    match item_type {
        Domain::Person => TypeAndStandard {
            criteria_type: match first_type {
                Some(CriteriaType::Deceased) => Some(CriteriaType::Age),
                other => other,
            },
            standard: Some(false),
        },
        Domain::PhysicalMeasurement | Domain::Survey => TypeAndStandard {
            criteria_type: first_type,
            standard: Some(false),
        },
        Domain::Visit => TypeAndStandard {
            criteria_type: first_type,
            standard: Some(true),
        },
        _ => TypeAndStandard {
            criteria_type: None,
            standard: None,
        },
    }
}
