//! Serum creatinine observation model

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::models::encounter::SECONDS_PER_DAY;

/// One numeric serum creatinine result (mg/dL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabObservation {
    /// Patient identifier
    pub patient_id: String,
    /// Hospitalization the result was drawn in
    pub hospitalization_id: String,
    /// Patient age in whole days at the start of that hospitalization
    pub hospital_admit_age_days: u32,
    /// Result time, seconds after hospitalization start
    pub result_time_seconds: i64,
    /// Creatinine in mg/dL
    pub value: f64,
}

impl LabObservation {
    /// Create a new observation
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        hospitalization_id: impl Into<String>,
        hospital_admit_age_days: u32,
        result_time_seconds: i64,
        value: f64,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            hospitalization_id: hospitalization_id.into(),
            hospital_admit_age_days,
            result_time_seconds,
            value,
        }
    }

    /// Result time on the patient-age clock, in seconds since birth
    #[must_use]
    pub fn instant(&self) -> i64 {
        i64::from(self.hospital_admit_age_days) * SECONDS_PER_DAY + self.result_time_seconds
    }

    /// Whether the value is a usable creatinine measurement
    #[must_use]
    pub fn has_valid_value(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

/// Counts from [`dedup_observations`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupReport {
    /// Rows removed as exact duplicates
    pub duplicates: usize,
    /// Rows removed for a non-finite or non-positive value
    pub invalid_values: usize,
}

/// Drop invalid values and collapse duplicate
/// `(patient_id, hospitalization_id, result_time_seconds, value)` rows.
///
/// The first occurrence of each tuple is kept and input order is otherwise
/// preserved.
pub fn dedup_observations(observations: Vec<LabObservation>) -> (Vec<LabObservation>, DedupReport) {
    let total = observations.len();
    let (valid, invalid): (Vec<_>, Vec<_>) = observations
        .into_iter()
        .partition(LabObservation::has_valid_value);

    let kept: Vec<LabObservation> = valid
        .into_iter()
        .unique_by(|obs| {
            (
                obs.patient_id.clone(),
                obs.hospitalization_id.clone(),
                obs.result_time_seconds,
                obs.value.to_bits(),
            )
        })
        .collect();

    let report = DedupReport {
        duplicates: total - invalid.len() - kept.len(),
        invalid_values: invalid.len(),
    };
    (kept, report)
}
