//! Shared fixtures for the integration tests

use aki_baseline::models::encounter::SECONDS_PER_DAY;
use aki_baseline::{LabObservation, PatientEncounter, Sex};

/// ICU admission offset used by the fixtures: 6 hours into the hospitalization
pub const ICU_ADMIT_OFFSET: i64 = 6 * 3_600;

/// Age in days that converts to `years` (rounded to the nearest day)
#[must_use]
pub fn days_for_years(years: f64) -> u32 {
    (years * 365.25).round() as u32
}

/// Encounter for patient `patient_id` in hospitalization `h-{patient_id}`
#[must_use]
pub fn encounter(patient_id: &str, sex: Sex, age_days: u32) -> PatientEncounter {
    PatientEncounter::new(
        patient_id,
        format!("h-{patient_id}"),
        "icu-1",
        sex,
        Some(age_days),
        ICU_ADMIT_OFFSET,
        ICU_ADMIT_OFFSET + 5 * SECONDS_PER_DAY,
    )
}

/// Observation `seconds_before` ICU admission, in the encounter's hospitalization
#[must_use]
pub fn before_admit(encounter: &PatientEncounter, seconds_before: i64, value: f64) -> LabObservation {
    LabObservation::new(
        &encounter.patient_id,
        &encounter.hospitalization_id,
        encounter.age_at_admission_days.unwrap_or_default(),
        encounter.icu_admit_offset_seconds - seconds_before,
        value,
    )
}

/// Observation `hours` after ICU admission
#[must_use]
pub fn after_admit(encounter: &PatientEncounter, hours: f64, value: f64) -> LabObservation {
    LabObservation::new(
        &encounter.patient_id,
        &encounter.hospitalization_id,
        encounter.age_at_admission_days.unwrap_or_default(),
        encounter.icu_admit_offset_seconds + (hours * 3_600.0) as i64,
        value,
    )
}

/// Assert two floats agree within `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual} (tolerance {tolerance})"
    );
}
