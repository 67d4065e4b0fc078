//! Tests for KDIGO staging over the first 72 hours

use aki_baseline::models::encounter::SECONDS_PER_DAY;
use aki_baseline::{
    BaselineRecord, BaselineSource, EncounterOutcome, KdigoCriteria, KdigoStage, LabObservation,
    Sex, StageWindow, UnstageableReason, kdigo_stage, stage, stage_or_mark, stage_with_trace,
};

use crate::utils::{after_admit, before_admit, days_for_years, encounter};

fn baseline_for(encounter: &aki_baseline::PatientEncounter, value: f64) -> BaselineRecord {
    BaselineRecord {
        hospitalization_id: encounter.hospitalization_id.clone(),
        encounter_id: encounter.encounter_id.clone(),
        baseline_scr: value,
        baseline_source: BaselineSource::Prior,
        floor_applied: false,
        prior_days_before_admit: Some(3.0),
    }
}

#[test]
fn test_follow_up_rise_gives_stage_two() {
    let enc = encounter("p1", Sex::Female, days_for_years(6.0));
    let observations = vec![after_admit(&enc, 6.0, 0.24), after_admit(&enc, 30.0, 0.46)];
    let result = stage(&enc, &baseline_for(&enc, 0.2), &observations, &KdigoCriteria::default());

    assert_eq!(result.stage, Some(KdigoStage::Stage2));
    assert_eq!(result.stage_window, StageWindow::FollowUp);
    assert!(!result.excluded_on_admission);
}

#[test]
fn test_admission_aki_excludes_despite_follow_up_stage() {
    let enc = encounter("p1", Sex::Male, days_for_years(3.0));
    let observations = vec![after_admit(&enc, 2.0, 0.31), after_admit(&enc, 48.0, 0.9)];
    let result = stage(&enc, &baseline_for(&enc, 0.2), &observations, &KdigoCriteria::default());

    assert!(result.excluded_on_admission);
    assert_eq!(result.stage, None);
    assert_eq!(result.stage_window, StageWindow::Admission);
    assert!(!result.is_cohort_eligible());
}

#[test]
fn test_no_observations_in_windows_is_stage_zero() {
    let enc = encounter("p1", Sex::Male, days_for_years(3.0));
    let observations = vec![
        before_admit(&enc, SECONDS_PER_DAY, 5.0),
        after_admit(&enc, 73.0, 5.0),
    ];
    let result = stage(&enc, &baseline_for(&enc, 0.3), &observations, &KdigoCriteria::default());
    assert_eq!(result.stage, Some(KdigoStage::Stage0));
    assert!(!result.excluded_on_admission);
}

#[test]
fn test_window_edges_are_inclusive_at_the_upper_end() {
    let enc = encounter("p1", Sex::Female, days_for_years(8.0));
    let criteria = KdigoCriteria::default();
    let baseline = baseline_for(&enc, 0.4);

    // Exactly 12h belongs to the admission window
    let at_twelve = vec![after_admit(&enc, 12.0, 0.9)];
    assert!(stage(&enc, &baseline, &at_twelve, &criteria).excluded_on_admission);

    // Exactly 72h still counts for follow-up
    let at_seventy_two = vec![after_admit(&enc, 72.0, 0.9)];
    let result = stage(&enc, &baseline, &at_seventy_two, &criteria);
    assert_eq!(result.stage, Some(KdigoStage::Stage2));
}

#[test]
fn test_other_hospitalization_is_ignored() {
    let enc = encounter("p1", Sex::Female, days_for_years(8.0));
    let stray = LabObservation::new(
        "p1",
        "another-stay",
        enc.age_at_admission_days.unwrap_or_default(),
        enc.icu_admit_offset_seconds + 20 * 3_600,
        3.0,
    );
    let result = stage(&enc, &baseline_for(&enc, 0.4), &[stray], &KdigoCriteria::default());
    assert_eq!(result.stage, Some(KdigoStage::Stage0));
}

#[test]
fn test_labs_after_icu_discharge_are_ignored() {
    let mut enc = encounter("p1", Sex::Female, days_for_years(8.0));
    enc.icu_discharge_offset_seconds = crate::utils::ICU_ADMIT_OFFSET + 24 * 3_600;
    let criteria = KdigoCriteria::default();
    let baseline = baseline_for(&enc, 0.4);

    let after_discharge = vec![after_admit(&enc, 30.0, 0.9)];
    let result = stage(&enc, &baseline, &after_discharge, &criteria);
    assert_eq!(result.stage, Some(KdigoStage::Stage0));

    // Discharge itself is still part of the stay
    let at_discharge = vec![after_admit(&enc, 24.0, 0.9)];
    let result = stage(&enc, &baseline, &at_discharge, &criteria);
    assert_eq!(result.stage, Some(KdigoStage::Stage2));

    let rrt_after_discharge = enc.with_rrt_start(crate::utils::ICU_ADMIT_OFFSET + 40 * 3_600);
    let result = stage(&rrt_after_discharge, &baseline, &[], &criteria);
    assert_eq!(result.stage, Some(KdigoStage::Stage0));
}

#[test]
fn test_rrt_in_follow_up_window_is_stage_three() {
    let enc = encounter("p1", Sex::Male, days_for_years(11.0))
        .with_rrt_start(crate::utils::ICU_ADMIT_OFFSET + 40 * 3_600);
    let observations = vec![after_admit(&enc, 20.0, 0.5)];
    let result = stage(&enc, &baseline_for(&enc, 0.45), &observations, &KdigoCriteria::default());
    assert_eq!(result.stage, Some(KdigoStage::Stage3));
}

#[test]
fn test_trace_is_sorted_by_time() {
    let enc = encounter("p1", Sex::Male, days_for_years(11.0));
    let observations = vec![
        after_admit(&enc, 50.0, 0.7),
        after_admit(&enc, 3.0, 0.5),
        after_admit(&enc, 20.0, 0.9),
    ];
    let (result, trace) =
        stage_with_trace(&enc, &baseline_for(&enc, 0.5), &observations, &KdigoCriteria::default());

    let hours: Vec<i64> = trace.iter().map(|s| s.seconds_since_admit / 3_600).collect();
    assert_eq!(hours, vec![3, 20, 50]);
    assert_eq!(trace[0].window, StageWindow::Admission);
    assert_eq!(trace[1].stage, KdigoStage::Stage1);
    assert_eq!(result.stage, Some(KdigoStage::Stage1));
}

#[test]
fn test_missing_baseline_is_marked() {
    let enc = encounter("p1", Sex::Male, days_for_years(11.0));
    let outcome = stage_or_mark(&enc, None, &[], &KdigoCriteria::default());
    match outcome {
        EncounterOutcome::Unstageable(marker) => {
            assert_eq!(marker.reason, UnstageableReason::NoBaseline);
            assert_eq!(marker.key(), enc.key());
        }
        EncounterOutcome::Staged { .. } => panic!("expected an unstageable marker"),
    }
}

#[test]
fn test_kdigo_stage_is_deterministic() {
    let criteria = KdigoCriteria::default();
    for baseline in [0.1, 0.2, 0.35, 0.8] {
        for step in 0..60 {
            let value = f64::from(step) * 0.1;
            let first = kdigo_stage(value, baseline, &criteria);
            assert_eq!(first, kdigo_stage(value, baseline, &criteria));
        }
    }
}

#[test]
fn test_kdigo_stage_is_monotonic_in_value() {
    let criteria = KdigoCriteria::default();
    for baseline in [0.15, 0.3, 0.6, 1.2] {
        let mut previous = KdigoStage::Stage0;
        for step in 0..500 {
            let value = f64::from(step) * 0.01;
            let current = kdigo_stage(value, baseline, &criteria);
            assert!(current >= previous, "stage dropped at {value} for baseline {baseline}");
            previous = current;
        }
    }
}
