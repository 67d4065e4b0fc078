//! Baseline creatinine resolution
//!
//! Tiers, in strict priority order:
//!
//! 1. the prior value closest to ICU admission within `[12h, 180d)`,
//!    raised to the Schwartz floor `mean - 2·sd` when it falls below it;
//! 2. the height-dependent estimate, when a height is recorded;
//! 3. the height-independent estimate otherwise.
//!
//! A qualifying prior value always wins over the estimates.

pub mod estimate;
pub mod prior;

use log::debug;

use crate::models::encounter::{MAX_PEDIATRIC_AGE_YEARS, PatientEncounter};
use crate::models::observation::LabObservation;
use crate::models::results::{BaselineRecord, BaselineSource, UnstageableReason};
use crate::reference::{ReferenceTables, schwartz_age_year};
use estimate::{height_dependent_baseline, height_independent_baseline};
use prior::select_prior_value;

/// Result of resolving one encounter
#[derive(Debug, Clone, PartialEq)]
pub enum BaselineOutcome {
    /// A baseline was produced
    Resolved(BaselineRecord),
    /// The encounter cannot have a baseline
    Unresolved(UnstageableReason),
}

impl BaselineOutcome {
    /// The record, if resolved
    #[must_use]
    pub fn record(&self) -> Option<&BaselineRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            Self::Unresolved(_) => None,
        }
    }

    /// Consume into the record, if resolved
    #[must_use]
    pub fn into_record(self) -> Option<BaselineRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            Self::Unresolved(_) => None,
        }
    }
}

/// Resolve the baseline creatinine for an encounter
///
/// `prior_observations` may hold the patient's whole creatinine history;
/// only results inside the prior window are considered.
///
/// An unsupported sex is unresolved (`InvalidSex`) even when a prior value
/// or a height exists, since the Schwartz floor is sex-specific.
#[must_use]
pub fn resolve(
    encounter: &PatientEncounter,
    prior_observations: &[LabObservation],
    tables: &ReferenceTables,
) -> BaselineOutcome {
    if !encounter.sex.is_supported() {
        return BaselineOutcome::Unresolved(UnstageableReason::InvalidSex);
    }
    let (Some(age_years), Some(icu_admit_instant)) =
        (encounter.age_years(), encounter.icu_admit_instant())
    else {
        return BaselineOutcome::Unresolved(UnstageableReason::MissingAge);
    };
    if age_years > MAX_PEDIATRIC_AGE_YEARS {
        return BaselineOutcome::Unresolved(UnstageableReason::NonPediatric);
    }

    let record = |baseline_scr: f64,
                  baseline_source: BaselineSource,
                  floor_applied: bool,
                  prior_days_before_admit: Option<f64>| BaselineRecord {
        hospitalization_id: encounter.hospitalization_id.clone(),
        encounter_id: encounter.encounter_id.clone(),
        baseline_scr,
        baseline_source,
        floor_applied,
        prior_days_before_admit,
    };

    if let Some(candidate) =
        select_prior_value(&encounter.patient_id, icu_admit_instant, prior_observations)
    {
        let age_year = schwartz_age_year(age_years);
        let floor = tables.schwartz.min_value(age_year, encounter.sex);
        let (baseline, floor_applied) = match floor {
            Some(floor) if candidate.value < floor => (floor, true),
            _ => (candidate.value, false),
        };
        debug!(
            "{}: prior {:.3} mg/dL {:.2}d before admission, baseline {:.3}{}",
            encounter.key(),
            candidate.value,
            candidate.days_before_admit(),
            baseline,
            if floor_applied { " (Schwartz floor)" } else { "" }
        );
        return BaselineOutcome::Resolved(record(
            baseline,
            BaselineSource::Prior,
            floor_applied,
            Some(candidate.days_before_admit()),
        ));
    }

    let egfr = tables.egfr.lookup(age_years);
    if let Some(height_cm) = encounter.usable_height_cm() {
        let baseline = height_dependent_baseline(height_cm, egfr);
        debug!(
            "{}: height {height_cm} cm, eGFR {egfr}, baseline {baseline:.3}",
            encounter.key()
        );
        return BaselineOutcome::Resolved(record(
            baseline,
            BaselineSource::HeightDependent,
            false,
            None,
        ));
    }

    match height_independent_baseline(encounter.sex, age_years, egfr) {
        Some(baseline) => {
            debug!(
                "{}: age {age_years:.2}y, eGFR {egfr}, baseline {baseline:.3}",
                encounter.key()
            );
            BaselineOutcome::Resolved(record(
                baseline,
                BaselineSource::HeightIndependent,
                false,
                None,
            ))
        }
        None => BaselineOutcome::Unresolved(UnstageableReason::InvalidSex),
    }
}
