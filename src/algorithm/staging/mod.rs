//! AKI staging over the first 72 hours of an ICU encounter
//!
//! Observations are split by time since ICU admission into the admission
//! window `(0, 12h]` and the follow-up window `(12h, 72h]`. AKI already
//! present in the admission window excludes the encounter; otherwise the
//! worst stage in the follow-up window is reported.

pub mod kdigo;

use log::debug;

use crate::models::encounter::{PatientEncounter, SECONDS_PER_HOUR};
use crate::models::observation::LabObservation;
use crate::models::results::{
    AkiStageResult, BaselineRecord, EncounterOutcome, StageWindow, UnstageableEncounter,
    UnstageableReason,
};
use kdigo::{KdigoCriteria, KdigoStage, kdigo_stage};

/// End of the admission window, seconds after ICU admission
pub const ADMISSION_WINDOW_END_SECONDS: i64 = 12 * SECONDS_PER_HOUR;

/// End of the follow-up window, seconds after ICU admission
pub const FOLLOW_UP_WINDOW_END_SECONDS: i64 = 72 * SECONDS_PER_HOUR;

/// One observation with its window and stage, for audit output
#[derive(Debug, Clone, PartialEq)]
pub struct StagedObservation {
    /// Seconds after ICU admission
    pub seconds_since_admit: i64,
    /// Creatinine in mg/dL
    pub value: f64,
    /// Window the observation fell in
    pub window: StageWindow,
    /// Stage of this observation alone
    pub stage: KdigoStage,
}

/// Window for a time since ICU admission, `None` outside `(0, 72h]`
#[must_use]
pub const fn assign_window(seconds_since_admit: i64) -> Option<StageWindow> {
    if seconds_since_admit <= 0 {
        None
    } else if seconds_since_admit <= ADMISSION_WINDOW_END_SECONDS {
        Some(StageWindow::Admission)
    } else if seconds_since_admit <= FOLLOW_UP_WINDOW_END_SECONDS {
        Some(StageWindow::FollowUp)
    } else {
        None
    }
}

/// Stage an encounter against its baseline
///
/// Only observations from the encounter's own hospitalization inside
/// `(0, min(72h, discharge)]` are considered; the rest are ignored, so a
/// lab from a later ICU stay never counts toward an earlier one.
#[must_use]
pub fn stage(
    encounter: &PatientEncounter,
    baseline: &BaselineRecord,
    observations: &[LabObservation],
    criteria: &KdigoCriteria,
) -> AkiStageResult {
    stage_with_trace(encounter, baseline, observations, criteria).0
}

/// Stage an encounter and also return the per-observation stages
#[must_use]
pub fn stage_with_trace(
    encounter: &PatientEncounter,
    baseline: &BaselineRecord,
    observations: &[LabObservation],
    criteria: &KdigoCriteria,
) -> (AkiStageResult, Vec<StagedObservation>) {
    let mut trace: Vec<StagedObservation> = observations
        .iter()
        .filter(|obs| {
            obs.hospitalization_id == encounter.hospitalization_id
                && encounter.is_before_icu_discharge(obs.result_time_seconds)
        })
        .filter_map(|obs| {
            let seconds_since_admit = encounter.seconds_since_icu_admit(obs.result_time_seconds);
            assign_window(seconds_since_admit).map(|window| StagedObservation {
                seconds_since_admit,
                value: obs.value,
                window,
                stage: kdigo_stage(obs.value, baseline.baseline_scr, criteria),
            })
        })
        .collect();
    trace.sort_by_key(|staged| staged.seconds_since_admit);

    let rrt_window = encounter
        .rrt_start_offset_seconds
        .filter(|offset| encounter.is_before_icu_discharge(*offset))
        .and_then(|offset| assign_window(encounter.seconds_since_icu_admit(offset)));

    let window_max = |window: StageWindow| {
        let lab_max = trace
            .iter()
            .filter(|staged| staged.window == window)
            .map(|staged| staged.stage)
            .max()
            .unwrap_or(KdigoStage::Stage0);
        if rrt_window == Some(window) {
            KdigoStage::Stage3
        } else {
            lab_max
        }
    };

    let stage_admission = window_max(StageWindow::Admission);
    let result = if stage_admission.is_aki() {
        debug!(
            "{}: stage {stage_admission} within 12h of ICU admission, excluded",
            encounter.key()
        );
        AkiStageResult {
            hospitalization_id: encounter.hospitalization_id.clone(),
            encounter_id: encounter.encounter_id.clone(),
            stage: None,
            excluded_on_admission: true,
            stage_window: StageWindow::Admission,
        }
    } else {
        let stage_follow_up = window_max(StageWindow::FollowUp);
        AkiStageResult {
            hospitalization_id: encounter.hospitalization_id.clone(),
            encounter_id: encounter.encounter_id.clone(),
            stage: Some(stage_follow_up),
            excluded_on_admission: false,
            stage_window: StageWindow::FollowUp,
        }
    };

    (result, trace)
}

/// Stage an encounter, or mark it unstageable when there is no baseline
///
/// For callers that resolve baselines themselves. The batch pipeline marks
/// encounters from the resolver's own reason instead, so it never reports
/// `NoBaseline`.
#[must_use]
pub fn stage_or_mark(
    encounter: &PatientEncounter,
    baseline: Option<BaselineRecord>,
    observations: &[LabObservation],
    criteria: &KdigoCriteria,
) -> EncounterOutcome {
    match baseline {
        Some(baseline) => {
            let result = stage(encounter, &baseline, observations, criteria);
            EncounterOutcome::Staged { baseline, result }
        }
        None => EncounterOutcome::Unstageable(UnstageableEncounter::new(
            encounter.key(),
            UnstageableReason::NoBaseline,
        )),
    }
}
