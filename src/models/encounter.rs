//! ICU encounter model
//!
//! A `PatientEncounter` is one ICU stay within a hospitalization. Offsets are
//! relative to the start of the hospitalization; the patient-age clock
//! (`age_at_admission_days` plus offset) lets encounters be compared against
//! labs drawn during other hospitalizations of the same patient.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds in one day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds in one hour
pub const SECONDS_PER_HOUR: i64 = 3_600;

/// Days per year used for every age-in-years conversion
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Oldest age, in years, admitted to the pediatric cohort
pub const MAX_PEDIATRIC_AGE_YEARS: f64 = 18.0;

/// Sex as recorded at admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sex {
    /// Male sex
    Male,
    /// Female sex
    Female,
    /// Any label outside Male/Female
    Unknown,
}

impl Sex {
    /// Whether the baseline formulas have a branch for this value
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Male | Self::Female)
    }

    /// Label used in tabular output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<&str> for Sex {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "female" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Sex {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Sex> for String {
    fn from(sex: Sex) -> Self {
        sex.label().to_string()
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identity of an encounter: `(hospitalization_id, encounter_id)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EncounterKey {
    /// Hospitalization the encounter belongs to
    pub hospitalization_id: String,
    /// Encounter within the hospitalization
    pub encounter_id: String,
}

impl EncounterKey {
    /// Create a new key
    #[must_use]
    pub fn new(hospitalization_id: impl Into<String>, encounter_id: impl Into<String>) -> Self {
        Self {
            hospitalization_id: hospitalization_id.into(),
            encounter_id: encounter_id.into(),
        }
    }
}

impl fmt::Display for EncounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hospitalization_id, self.encounter_id)
    }
}

/// One ICU stay within a hospitalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientEncounter {
    /// Patient identifier
    pub patient_id: String,
    /// Hospitalization identifier
    pub hospitalization_id: String,
    /// Encounter identifier, unique within the hospitalization
    pub encounter_id: String,
    /// Sex as recorded at admission
    pub sex: Sex,
    /// Age in whole days at hospital admission
    pub age_at_admission_days: Option<u32>,
    /// ICU admission, seconds after hospitalization start
    pub icu_admit_offset_seconds: i64,
    /// ICU discharge, seconds after hospitalization start
    pub icu_discharge_offset_seconds: i64,
    /// Height in centimetres, when measured
    pub height_cm: Option<f64>,
    /// Start of renal replacement therapy, seconds after hospitalization start
    #[serde(default)]
    pub rrt_start_offset_seconds: Option<i64>,
}

impl PatientEncounter {
    /// Create an encounter with no height and no renal replacement therapy
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        hospitalization_id: impl Into<String>,
        encounter_id: impl Into<String>,
        sex: Sex,
        age_at_admission_days: Option<u32>,
        icu_admit_offset_seconds: i64,
        icu_discharge_offset_seconds: i64,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            hospitalization_id: hospitalization_id.into(),
            encounter_id: encounter_id.into(),
            sex,
            age_at_admission_days,
            icu_admit_offset_seconds,
            icu_discharge_offset_seconds,
            height_cm: None,
            rrt_start_offset_seconds: None,
        }
    }

    /// Set the measured height
    #[must_use]
    pub fn with_height(mut self, height_cm: f64) -> Self {
        self.height_cm = Some(height_cm);
        self
    }

    /// Set the renal replacement therapy start
    #[must_use]
    pub fn with_rrt_start(mut self, offset_seconds: i64) -> Self {
        self.rrt_start_offset_seconds = Some(offset_seconds);
        self
    }

    /// Key identifying this encounter
    #[must_use]
    pub fn key(&self) -> EncounterKey {
        EncounterKey::new(&self.hospitalization_id, &self.encounter_id)
    }

    /// Age at hospital admission in fractional years
    #[must_use]
    pub fn age_years(&self) -> Option<f64> {
        self.age_at_admission_days
            .map(|days| f64::from(days) / DAYS_PER_YEAR)
    }

    /// Whether the encounter belongs to the pediatric cohort
    ///
    /// Encounters with unknown age are not pediatric by this test.
    #[must_use]
    pub fn is_pediatric(&self) -> bool {
        self.age_years()
            .is_some_and(|age| age <= MAX_PEDIATRIC_AGE_YEARS)
    }

    /// ICU admission on the patient-age clock, in seconds since birth
    #[must_use]
    pub fn icu_admit_instant(&self) -> Option<i64> {
        self.age_at_admission_days
            .map(|days| i64::from(days) * SECONDS_PER_DAY + self.icu_admit_offset_seconds)
    }

    /// Usable height, ignoring missing, zero, negative or non-finite values
    #[must_use]
    pub fn usable_height_cm(&self) -> Option<f64> {
        self.height_cm.filter(|h| h.is_finite() && *h > 0.0)
    }

    /// Seconds from ICU admission to `offset_seconds` (hospitalization clock)
    #[must_use]
    pub const fn seconds_since_icu_admit(&self, offset_seconds: i64) -> i64 {
        offset_seconds - self.icu_admit_offset_seconds
    }

    /// Whether `offset_seconds` is at or before ICU discharge
    #[must_use]
    pub const fn is_before_icu_discharge(&self, offset_seconds: i64) -> bool {
        offset_seconds <= self.icu_discharge_offset_seconds
    }
}
