//! Output records of the baseline resolver and the AKI stager
//!
//! One `BaselineRecord` and one `AkiStageResult` are produced per stageable
//! encounter; everything else becomes an `UnstageableEncounter` carrying the
//! reason, so exclusions can be counted instead of silently coerced.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::algorithm::staging::kdigo::KdigoStage;
use crate::models::encounter::EncounterKey;

/// Tier of the baseline resolver that produced a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    /// Prior measurement, possibly replaced by the Schwartz floor
    Prior,
    /// Height-based estimate
    HeightDependent,
    /// Age/sex polynomial estimate
    HeightIndependent,
}

impl BaselineSource {
    /// Label used in tabular output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prior => "prior",
            Self::HeightDependent => "height_dependent",
            Self::HeightIndependent => "height_independent",
        }
    }

    /// All sources in priority order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Prior, Self::HeightDependent, Self::HeightIndependent]
    }
}

impl fmt::Display for BaselineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reference creatinine for one encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRecord {
    /// Hospitalization identifier
    pub hospitalization_id: String,
    /// Encounter identifier
    pub encounter_id: String,
    /// Baseline serum creatinine in mg/dL
    pub baseline_scr: f64,
    /// Tier that produced the baseline
    pub baseline_source: BaselineSource,
    /// True when a prior value was replaced by the Schwartz floor
    pub floor_applied: bool,
    /// Days between the chosen prior value and ICU admission
    pub prior_days_before_admit: Option<f64>,
}

impl BaselineRecord {
    /// Key of the encounter this baseline belongs to
    #[must_use]
    pub fn key(&self) -> EncounterKey {
        EncounterKey::new(&self.hospitalization_id, &self.encounter_id)
    }
}

/// Staging window relative to ICU admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageWindow {
    /// `0 < t <= 12h`
    #[serde(rename = "0-12h")]
    Admission,
    /// `12h < t <= 72h`
    #[serde(rename = "12-72h")]
    FollowUp,
}

impl StageWindow {
    /// Label used in tabular output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admission => "0-12h",
            Self::FollowUp => "12-72h",
        }
    }
}

impl fmt::Display for StageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// AKI stage label for one encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AkiStageResult {
    /// Hospitalization identifier
    pub hospitalization_id: String,
    /// Encounter identifier
    pub encounter_id: String,
    /// Reported stage; `None` when the encounter is excluded on admission
    pub stage: Option<KdigoStage>,
    /// AKI already present in the first 12 hours
    pub excluded_on_admission: bool,
    /// Window in which the reported stage was determined
    pub stage_window: StageWindow,
}

impl AkiStageResult {
    /// Key of the staged encounter
    #[must_use]
    pub fn key(&self) -> EncounterKey {
        EncounterKey::new(&self.hospitalization_id, &self.encounter_id)
    }

    /// Whether the encounter contributes to AKI-incidence analysis
    #[must_use]
    pub const fn is_cohort_eligible(&self) -> bool {
        !self.excluded_on_admission
    }
}

/// Why an encounter could not be staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnstageableReason {
    /// Sex outside Male/Female
    InvalidSex,
    /// Age at admission missing
    MissingAge,
    /// Older than 18 years at admission
    NonPediatric,
    /// Staging requested without a baseline; only produced by
    /// [`stage_or_mark`](crate::algorithm::staging::stage_or_mark)
    NoBaseline,
}

impl UnstageableReason {
    /// Label used in tabular output and summaries
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidSex => "invalid_sex",
            Self::MissingAge => "missing_age",
            Self::NonPediatric => "non_pediatric",
            Self::NoBaseline => "no_baseline",
        }
    }

    /// All reasons, for stable reporting order
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [
            Self::InvalidSex,
            Self::MissingAge,
            Self::NonPediatric,
            Self::NoBaseline,
        ]
    }
}

impl fmt::Display for UnstageableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Explicit marker for an encounter without a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstageableEncounter {
    /// Hospitalization identifier
    pub hospitalization_id: String,
    /// Encounter identifier
    pub encounter_id: String,
    /// Why it could not be staged
    pub reason: UnstageableReason,
}

impl UnstageableEncounter {
    /// Create a marker for `key`
    #[must_use]
    pub fn new(key: EncounterKey, reason: UnstageableReason) -> Self {
        Self {
            hospitalization_id: key.hospitalization_id,
            encounter_id: key.encounter_id,
            reason,
        }
    }

    /// Key of the encounter
    #[must_use]
    pub fn key(&self) -> EncounterKey {
        EncounterKey::new(&self.hospitalization_id, &self.encounter_id)
    }
}

/// Final outcome of processing one encounter
#[derive(Debug, Clone, PartialEq)]
pub enum EncounterOutcome {
    /// Baseline resolved and stage computed
    Staged {
        /// Resolved baseline
        baseline: BaselineRecord,
        /// Stage label
        result: AkiStageResult,
    },
    /// No stage could be produced
    Unstageable(UnstageableEncounter),
}

impl EncounterOutcome {
    /// Key of the encounter
    #[must_use]
    pub fn key(&self) -> EncounterKey {
        match self {
            Self::Staged { result, .. } => result.key(),
            Self::Unstageable(marker) => marker.key(),
        }
    }
}
