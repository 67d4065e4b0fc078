//! End-to-end tests for the batch pipeline

use std::io::Write;

use aki_baseline::models::encounter::SECONDS_PER_DAY;
use aki_baseline::{
    AkiError, AkiPipeline, BaselineSource, CohortInput, KdigoStage, LabObservation,
    PatientEncounter, PipelineConfig, Sex, UnstageableReason,
};

use crate::utils::{after_admit, assert_close, before_admit, days_for_years, encounter};

fn single_threaded() -> PipelineConfig {
    PipelineConfig {
        num_threads: Some(1),
        ..PipelineConfig::default()
    }
}

/// Six encounters covering every outcome
fn mixed_cohort() -> CohortInput {
    let prior = encounter("p-prior", Sex::Male, days_for_years(5.0));
    let height = encounter("p-height", Sex::Female, days_for_years(1.2)).with_height(90.0);
    let unknown_sex = encounter("p-sex", Sex::Unknown, days_for_years(7.0));
    let no_age = PatientEncounter::new("p-age", "h-p-age", "icu-1", Sex::Female, None, 0, 3_600);
    let adult = encounter("p-adult", Sex::Male, days_for_years(30.0));
    let excluded = encounter("p-excl", Sex::Male, days_for_years(10.0));

    // Prior value from an earlier hospitalization, 30 days before this one
    let earlier_stay = LabObservation::new(
        "p-prior",
        "h-p-prior-old",
        prior.age_at_admission_days.unwrap_or_default() - 30,
        0,
        0.45,
    );
    let height_follow_up = after_admit(&height, 30.0, 0.85);

    let observations = vec![
        earlier_stay,
        after_admit(&prior, 20.0, 0.46),
        height_follow_up.clone(),
        height_follow_up,
        after_admit(&height, 40.0, 0.0),
        before_admit(&unknown_sex, 2 * SECONDS_PER_DAY, 0.5),
        after_admit(&excluded, 3.0, 1.0),
        after_admit(&excluded, 30.0, 0.5),
    ];

    CohortInput {
        encounters: vec![prior, height, unknown_sex, no_age, adult, excluded],
        observations,
    }
}

#[test]
fn test_mixed_cohort_outcomes() {
    let pipeline = AkiPipeline::new(single_threaded()).unwrap();
    let output = pipeline.run(mixed_cohort()).unwrap();

    let staged: Vec<&str> = output
        .stages
        .iter()
        .map(|s| s.hospitalization_id.as_str())
        .collect();
    assert_eq!(staged, vec!["h-p-excl", "h-p-height", "h-p-prior"]);

    let excluded = &output.stages[0];
    assert!(excluded.excluded_on_admission);
    assert_eq!(excluded.stage, None);

    let height = &output.stages[1];
    assert_eq!(height.stage, Some(KdigoStage::Stage2));
    assert_eq!(output.baselines[1].baseline_source, BaselineSource::HeightDependent);
    assert_close(output.baselines[1].baseline_scr, 0.41 * 90.0 / 91.0, 1e-9);

    let prior = &output.baselines[2];
    assert_eq!(prior.baseline_source, BaselineSource::Prior);
    assert_eq!(prior.baseline_scr, 0.45);
    assert!(!prior.floor_applied);
    assert_close(prior.prior_days_before_admit.unwrap(), 30.25, 1e-9);
    assert_eq!(output.stages[2].stage, Some(KdigoStage::Stage0));

    let reasons: Vec<(&str, UnstageableReason)> = output
        .unstageable
        .iter()
        .map(|m| (m.hospitalization_id.as_str(), m.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("h-p-adult", UnstageableReason::NonPediatric),
            ("h-p-age", UnstageableReason::MissingAge),
            ("h-p-sex", UnstageableReason::InvalidSex),
        ]
    );
}

#[test]
fn test_mixed_cohort_statistics() {
    let pipeline = AkiPipeline::new(single_threaded()).unwrap();
    let stats = pipeline.run(mixed_cohort()).unwrap().statistics;

    assert_eq!(stats.encounters, 6);
    assert_eq!(stats.staged, 3);
    assert_eq!(stats.excluded_on_admission, 1);
    assert_eq!(stats.cohort_eligible(), 2);
    assert_eq!(stats.aki_count(), 1);
    assert_eq!(stats.unstageable_count(), 3);
    assert_eq!(stats.by_source.get(&BaselineSource::Prior), Some(&1));
    assert_eq!(stats.by_source.get(&BaselineSource::HeightDependent), Some(&1));
    assert_eq!(stats.by_source.get(&BaselineSource::HeightIndependent), Some(&1));
    assert_eq!(stats.by_stage.get(&KdigoStage::Stage2), Some(&1));
    assert_eq!(stats.observations_received, 8);
    assert_eq!(stats.duplicate_observations, 1);
    assert_eq!(stats.invalid_observations, 1);

    let summary = stats.summary();
    assert!(summary.contains("Encounters: 6"));
}

#[test]
fn test_labs_count_only_for_the_icu_stay_they_fall_in() {
    const HOUR: i64 = 3_600;
    let age_days = days_for_years(6.0);
    let first = PatientEncounter::new("p1", "h1", "e1", Sex::Male, Some(age_days), 0, 20 * HOUR);
    let second =
        PatientEncounter::new("p1", "h1", "e2", Sex::Male, Some(age_days), 40 * HOUR, 200 * HOUR);
    let observations = vec![
        LabObservation::new("p1", "h1", age_days, 10 * HOUR, 0.36),
        LabObservation::new("p1", "h1", age_days, 50 * HOUR, 3.0),
    ];

    let pipeline = AkiPipeline::new(single_threaded()).unwrap();
    let output = pipeline
        .run(CohortInput {
            encounters: vec![second, first],
            observations,
        })
        .unwrap();

    // The 3.0 mg/dL lab falls 30h after e1's discharge
    let first_stage = &output.stages[0];
    assert_eq!(first_stage.encounter_id, "e1");
    assert!(!first_stage.excluded_on_admission);
    assert_eq!(first_stage.stage, Some(KdigoStage::Stage0));

    // For e2 the e1 lab is a prior value and the 3.0 lab is on admission
    let second_stage = &output.stages[1];
    assert_eq!(second_stage.encounter_id, "e2");
    assert!(second_stage.excluded_on_admission);
    assert_eq!(output.baselines[1].baseline_source, BaselineSource::Prior);
    assert_eq!(output.baselines[1].baseline_scr, 0.36);

    assert_eq!(output.statistics.aki_count(), 0);
    assert_eq!(output.statistics.excluded_on_admission, 1);
}

#[test]
fn test_results_do_not_depend_on_thread_count() {
    let serial = AkiPipeline::new(single_threaded()).unwrap();
    let parallel = AkiPipeline::new(PipelineConfig {
        num_threads: Some(4),
        ..PipelineConfig::default()
    })
    .unwrap();

    let a = serial.run(mixed_cohort()).unwrap();
    let b = parallel.run(mixed_cohort()).unwrap();
    assert_eq!(a.baselines, b.baselines);
    assert_eq!(a.stages, b.stages);
    assert_eq!(a.unstageable, b.unstageable);
    assert_eq!(a.statistics, b.statistics);
}

#[test]
fn test_config_file_changes_thresholds() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"kdigo": {{"stage2_ratio": 2.5}}, "num_threads": 1}}"#).unwrap();

    let config = PipelineConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.kdigo.stage1_ratio, 1.5);
    assert_eq!(config.kdigo.stage2_ratio, 2.5);

    let output = AkiPipeline::new(config).unwrap().run(mixed_cohort()).unwrap();
    assert_eq!(output.stages[1].stage, Some(KdigoStage::Stage1));
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"num_threads": 0}}"#).unwrap();
    assert!(matches!(
        PipelineConfig::from_json_file(file.path()),
        Err(AkiError::ConfigError(_))
    ));

    let mut broken = tempfile::NamedTempFile::new().unwrap();
    write!(broken, "{{ not json").unwrap();
    assert!(matches!(
        PipelineConfig::from_json_file(broken.path()),
        Err(AkiError::JsonError { .. })
    ));
}

#[test]
fn test_replacement_egfr_table() {
    let mut table = tempfile::NamedTempFile::new().unwrap();
    write!(
        table,
        r#"{{"version": "test", "citation": "flat", "bins": [{{"age_min": 0.0, "age_max": null, "egfr": 100.0}}]}}"#
    )
    .unwrap();

    let pipeline = AkiPipeline::new(PipelineConfig {
        egfr_table_path: Some(table.path().to_path_buf()),
        ..single_threaded()
    })
    .unwrap();
    assert_eq!(pipeline.tables().egfr.version(), "test");

    let output = pipeline.run(mixed_cohort()).unwrap();
    assert_close(output.baselines[1].baseline_scr, 0.41 * 90.0 / 100.0, 1e-9);
}

#[test]
fn test_gapped_egfr_table_is_rejected() {
    let mut table = tempfile::NamedTempFile::new().unwrap();
    write!(
        table,
        r#"{{"version": "bad", "citation": "gap", "bins": [
            {{"age_min": 0.0, "age_max": 1.0, "egfr": 80.0}},
            {{"age_min": 2.0, "age_max": null, "egfr": 120.0}}]}}"#
    )
    .unwrap();

    let result = AkiPipeline::new(PipelineConfig {
        egfr_table_path: Some(table.path().to_path_buf()),
        ..single_threaded()
    });
    assert!(matches!(result, Err(AkiError::ReferenceTableError { .. })));
}
