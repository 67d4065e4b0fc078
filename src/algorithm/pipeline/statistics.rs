//! Run statistics for data-quality monitoring
//!
//! Counts per exclusion reason, baseline tier and stage, so regressions in
//! the input data show up without inspecting individual rows.

use std::collections::BTreeMap;

use crate::algorithm::staging::kdigo::KdigoStage;
use crate::models::observation::DedupReport;
use crate::models::results::{BaselineSource, EncounterOutcome, UnstageableReason};

/// Aggregate counts for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStatistics {
    /// Encounters received
    pub encounters: usize,
    /// Encounters with a baseline and a stage result
    pub staged: usize,
    /// Staged encounters excluded for AKI in the first 12 hours
    pub excluded_on_admission: usize,
    /// Baselines per resolver tier
    pub by_source: BTreeMap<BaselineSource, usize>,
    /// Prior values replaced by the Schwartz floor
    pub floor_applied: usize,
    /// Reported stages for cohort-eligible encounters
    pub by_stage: BTreeMap<KdigoStage, usize>,
    /// Unstageable encounters per reason
    pub unstageable: BTreeMap<UnstageableReason, usize>,
    /// Observation rows received
    pub observations_received: usize,
    /// Observation rows collapsed as duplicates
    pub duplicate_observations: usize,
    /// Observation rows dropped for invalid values
    pub invalid_observations: usize,
}

impl BatchStatistics {
    /// Start counting with the observation deduplication report
    #[must_use]
    pub fn new(observations_received: usize, dedup: DedupReport) -> Self {
        Self {
            observations_received,
            duplicate_observations: dedup.duplicates,
            invalid_observations: dedup.invalid_values,
            ..Self::default()
        }
    }

    /// Count one encounter outcome
    pub fn record(&mut self, outcome: &EncounterOutcome) {
        self.encounters += 1;
        match outcome {
            EncounterOutcome::Staged { baseline, result } => {
                self.staged += 1;
                *self.by_source.entry(baseline.baseline_source).or_insert(0) += 1;
                if baseline.floor_applied {
                    self.floor_applied += 1;
                }
                if result.excluded_on_admission {
                    self.excluded_on_admission += 1;
                } else if let Some(stage) = result.stage {
                    *self.by_stage.entry(stage).or_insert(0) += 1;
                }
            }
            EncounterOutcome::Unstageable(marker) => {
                *self.unstageable.entry(marker.reason).or_insert(0) += 1;
            }
        }
    }

    /// Total unstageable encounters
    #[must_use]
    pub fn unstageable_count(&self) -> usize {
        self.unstageable.values().sum()
    }

    /// Encounters usable for AKI-incidence analysis
    #[must_use]
    pub fn cohort_eligible(&self) -> usize {
        self.staged - self.excluded_on_admission
    }

    /// Encounters with stage 1 or higher among the cohort-eligible
    #[must_use]
    pub fn aki_count(&self) -> usize {
        self.by_stage
            .iter()
            .filter(|(stage, _)| stage.is_aki())
            .map(|(_, count)| count)
            .sum()
    }

    /// Human-readable summary of the run
    #[must_use]
    pub fn summary(&self) -> String {
        let percent = |count: usize, total: usize| {
            if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            }
        };

        let mut summary = String::new();
        summary.push_str("AKI Staging Summary:\n");
        summary.push_str(&format!("  Encounters: {}\n", self.encounters));
        summary.push_str(&format!("  Staged: {}\n", self.staged));
        summary.push_str(&format!(
            "  Excluded on Admission: {}\n",
            self.excluded_on_admission
        ));
        summary.push_str(&format!("  Cohort Eligible: {}\n", self.cohort_eligible()));

        summary.push_str("\nBaseline Sources:\n");
        for source in BaselineSource::all() {
            let count = self.by_source.get(&source).copied().unwrap_or(0);
            summary.push_str(&format!(
                "  {source}: {count} ({:.1}%)\n",
                percent(count, self.staged)
            ));
        }
        summary.push_str(&format!("  Schwartz floor applied: {}\n", self.floor_applied));

        summary.push_str("\nReported Stages:\n");
        let eligible = self.cohort_eligible();
        for stage in KdigoStage::all() {
            let count = self.by_stage.get(&stage).copied().unwrap_or(0);
            summary.push_str(&format!(
                "  Stage {stage}: {count} ({:.1}%)\n",
                percent(count, eligible)
            ));
        }

        summary.push_str("\nUnstageable:\n");
        for reason in UnstageableReason::all() {
            let count = self.unstageable.get(&reason).copied().unwrap_or(0);
            summary.push_str(&format!("  {reason}: {count}\n"));
        }

        summary.push_str("\nObservations:\n");
        summary.push_str(&format!("  Received: {}\n", self.observations_received));
        summary.push_str(&format!("  Duplicates: {}\n", self.duplicate_observations));
        summary.push_str(&format!("  Invalid Values: {}\n", self.invalid_observations));

        summary
    }
}
