//! Prior-value tier: the most recent creatinine drawn 12 hours to 180 days
//! before ICU admission.

use crate::models::encounter::SECONDS_PER_DAY;
use crate::models::observation::LabObservation;

/// Closest a prior value may be to ICU admission (inclusive): 12 hours
pub const PRIOR_WINDOW_MIN_SECONDS: i64 = SECONDS_PER_DAY / 2;

/// Furthest a prior value may be from ICU admission (exclusive): 180 days
pub const PRIOR_WINDOW_MAX_SECONDS: i64 = 180 * SECONDS_PER_DAY;

/// A qualifying prior creatinine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorCandidate {
    /// Creatinine in mg/dL
    pub value: f64,
    /// Seconds between the result and ICU admission
    pub seconds_before_admit: i64,
}

impl PriorCandidate {
    /// Offset in fractional days
    #[must_use]
    pub fn days_before_admit(&self) -> f64 {
        self.seconds_before_admit as f64 / SECONDS_PER_DAY as f64
    }
}

/// Whether an offset lies in `[12h, 180d)` before admission
#[must_use]
pub const fn in_prior_window(seconds_before_admit: i64) -> bool {
    seconds_before_admit >= PRIOR_WINDOW_MIN_SECONDS
        && seconds_before_admit < PRIOR_WINDOW_MAX_SECONDS
}

/// Pick the prior value closest to ICU admission
///
/// Offsets are computed on the patient-age clock so labs from earlier
/// hospitalizations are placed correctly. Ties at the same offset go to the
/// lower value, then to the earlier position in `observations`.
#[must_use]
pub fn select_prior_value(
    patient_id: &str,
    icu_admit_instant: i64,
    observations: &[LabObservation],
) -> Option<PriorCandidate> {
    observations
        .iter()
        .filter(|obs| obs.patient_id == patient_id && obs.has_valid_value())
        .map(|obs| PriorCandidate {
            value: obs.value,
            seconds_before_admit: icu_admit_instant - obs.instant(),
        })
        .filter(|candidate| in_prior_window(candidate.seconds_before_admit))
        .min_by(|a, b| {
            a.seconds_before_admit
                .cmp(&b.seconds_before_admit)
                .then_with(|| a.value.total_cmp(&b.value))
        })
}
