//! Vocabularies used by cohort definitions
//!
//! Open vocabularies (domains, criteria types, subtypes, attribute and
//! modifier names) grow on the backend independently of this crate, so values
//! this build does not know are kept verbatim in an `Other` variant and
//! written back unchanged. Closed vocabularies (operators, temporal settings)
//! reject unknown values.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Declares a string-backed vocabulary that keeps unknown values.
macro_rules! open_vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value not known to this build, kept as received
            Other(String),
        }

        impl $name {
            /// Every known value, in declaration order
            pub const KNOWN: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// The wire representation
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Other(value) => value,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $( $wire => Self::$variant, )+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_vocabulary! {
    /// OMOP domain a criterion belongs to
    pub enum Domain {
        Person => "PERSON",
        Measurement => "MEASUREMENT",
        PhysicalMeasurement => "PHYSICAL_MEASUREMENT",
        PhysicalMeasurementCss => "PHYSICAL_MEASUREMENT_CSS",
        Visit => "VISIT",
        Drug => "DRUG",
        Condition => "CONDITION",
        Procedure => "PROCEDURE",
        Observation => "OBSERVATION",
        Device => "DEVICE",
        Lab => "LAB",
        Vital => "VITAL",
        Survey => "SURVEY",
        AllEvents => "ALL_EVENTS",
        Fitbit => "FITBIT",
        FitbitHeartRateSummary => "FITBIT_HEART_RATE_SUMMARY",
        FitbitActivity => "FITBIT_ACTIVITY",
        FitbitHeartRateLevel => "FITBIT_HEART_RATE_LEVEL",
        FitbitIntradaySteps => "FITBIT_INTRADAY_STEPS",
        FitbitSleepDailySummary => "FITBIT_SLEEP_DAILY_SUMMARY",
        FitbitSleepLevel => "FITBIT_SLEEP_LEVEL",
        WearConsent => "WEAR_CONSENT",
        WholeGenomeVariant => "WHOLE_GENOME_VARIANT",
        LrWholeGenomeVariant => "LR_WHOLE_GENOME_VARIANT",
        ArrayData => "ARRAY_DATA",
        StructuralVariantData => "STRUCTURAL_VARIANT_DATA",
        SnpIndelVariant => "SNP_INDEL_VARIANT",
        ZipCodeSocioeconomic => "ZIP_CODE_SOCIOECONOMIC",
        EtmDelayDiscounting => "ETM_DELAYDISCOUNTING",
        EtmDelayDiscountingMetadata => "ETM_DELAYDISCOUNTING_METADATA",
        EtmDelayDiscountingOutcomes => "ETM_DELAYDISCOUNTING_OUTCOMES",
        EtmDelayDiscountingTrialData => "ETM_DELAYDISCOUNTING_TRIAL_DATA",
        EtmEmoRecog => "ETM_EMORECOG",
        EtmEmoRecogMetadata => "ETM_EMORECOG_METADATA",
        EtmEmoRecogOutcomes => "ETM_EMORECOG_OUTCOMES",
        EtmEmoRecogTrialData => "ETM_EMORECOG_TRIAL_DATA",
        EtmFlanker => "ETM_FLANKER",
        EtmFlankerMetadata => "ETM_FLANKER_METADATA",
        EtmFlankerOutcomes => "ETM_FLANKER_OUTCOMES",
        EtmFlankerTrialData => "ETM_FLANKER_TRIAL_DATA",
        EtmGradCpt => "ETM_GRADCPT",
        EtmGradCptMetadata => "ETM_GRADCPT_METADATA",
        EtmGradCptOutcomes => "ETM_GRADCPT_OUTCOMES",
        EtmGradCptTrialData => "ETM_GRADCPT_TRIAL_DATA",
    }
}

open_vocabulary! {
    /// Type of the criterion that generated a search parameter
    pub enum CriteriaType {
        Age => "AGE",
        Deceased => "DECEASED",
        Ethnicity => "ETHNICITY",
        Gender => "GENDER",
        Race => "RACE",
        Sex => "SEX",
        HasEhrData => "HAS_EHR_DATA",
        SelfReportedCategory => "SELF_REPORTED_CATEGORY",
        Atc => "ATC",
        Brand => "BRAND",
        Cpt4 => "CPT4",
        Icd9Cm => "ICD9CM",
        Icd10Cm => "ICD10CM",
        Loinc => "LOINC",
        Ppi => "PPI",
        RxNorm => "RXNORM",
        Snomed => "SNOMED",
        Visit => "VISIT",
    }
}

open_vocabulary! {
    /// Subtype of the criterion, only meaningful for some domains
    pub enum CriteriaSubType {
        Bp => "BP",
        Bmi => "BMI",
        Hr => "HR",
        HrDetail => "HR_DETAIL",
        HrIrr => "HRIRR",
        HrNoIrr => "HRNOIRR",
        Height => "HEIGHT",
        Hc => "HC",
        Wc => "WC",
        Weight => "WEIGHT",
        Preg => "PREG",
        Wheel => "WHEEL",
        Survey => "SURVEY",
        Question => "QUESTION",
        Answer => "ANSWER",
        Clin => "CLIN",
        Lab => "LAB",
    }
}

open_vocabulary! {
    /// Name of a search parameter attribute
    pub enum AttrName {
        Any => "ANY",
        Num => "NUM",
        Cat => "CAT",
        Age => "AGE",
        AgeAtCdr => "AGE_AT_CDR",
        AgeAtConsent => "AGE_AT_CONSENT",
        PersonalFamilyHealthHistory => "PERSONAL_FAMILY_HEALTH_HISTORY",
        SurveyVersionConceptId => "SURVEY_VERSION_CONCEPT_ID",
    }
}

open_vocabulary! {
    /// Name of a search group item modifier
    pub enum ModifierType {
        AgeAtEvent => "AGE_AT_EVENT",
        EventDate => "EVENT_DATE",
        NumOfOccurrences => "NUM_OF_OCCURRENCES",
        Encounters => "ENCOUNTERS",
        Cati => "CATI",
    }
}

/// Comparison operator for attributes and modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqualTo,
    GreaterThanOrEqualTo,
    Like,
    In,
    Between,
}

impl Operator {
    /// Label shown next to attribute operands
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Equal => "Equal To",
            Self::NotEqual => "Not Equal To",
            Self::LessThan => "Less Than",
            Self::GreaterThan => "Greater Than",
            Self::LessThanOrEqualTo => "Less Than or Equal To",
            Self::GreaterThanOrEqualTo => "Greater Than or Equal To",
            Self::Like => "Like",
            Self::In => "In",
            Self::Between => "In Range",
        }
    }
}

/// Which occurrence of a temporal criterion anchors the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporalMention {
    #[default]
    AnyMention,
    FirstMention,
    LastMention,
}

impl TemporalMention {
    /// All mentions in menu order
    pub const ALL: [TemporalMention; 3] = [Self::AnyMention, Self::FirstMention, Self::LastMention];

    /// Menu label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AnyMention => "Any Mention",
            Self::FirstMention => "First Mention",
            Self::LastMention => "Last Mention",
        }
    }
}

/// Time relationship between the two sides of a temporal group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporalTime {
    #[default]
    DuringSameEncounterAs,
    XDaysBefore,
    XDaysAfter,
    WithinXDaysOf,
}

impl TemporalTime {
    /// All times in menu order
    pub const ALL: [TemporalTime; 4] = [
        Self::DuringSameEncounterAs,
        Self::XDaysAfter,
        Self::XDaysBefore,
        Self::WithinXDaysOf,
    ];

    /// Menu label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DuringSameEncounterAs => "During same encounter as",
            Self::XDaysBefore => "X or more days before",
            Self::XDaysAfter => "X or more days after",
            Self::WithinXDaysOf => "On or within X days of",
        }
    }

    /// Whether this time needs a day count
    pub const fn requires_value(&self) -> bool {
        !matches!(self, Self::DuringSameEncounterAs)
    }
}

/// Kind of age used by age criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeType {
    Age,
    AgeAtCdr,
    AgeAtConsent,
}

/// Demographic breakdown category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderSexRaceOrEthType {
    Gender,
    SexAtBirth,
    Race,
    Ethnicity,
    SelfReportedCategory,
}
