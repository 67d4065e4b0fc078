//! Batch driver: baseline resolution and staging for a whole cohort
//!
//! Observations are grouped per patient once, then every encounter is
//! processed independently on a Rayon pool. The reference tables are the
//! only shared state and are read-only for the lifetime of the run.

pub mod statistics;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{debug, info, warn};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;

use crate::algorithm::baseline::{BaselineOutcome, resolve};
use crate::algorithm::staging::stage_with_trace;
use crate::config::PipelineConfig;
use crate::error::{AkiError, Result};
use crate::models::encounter::PatientEncounter;
use crate::models::observation::{LabObservation, dedup_observations};
use crate::models::results::{
    AkiStageResult, BaselineRecord, EncounterOutcome, UnstageableEncounter,
};
use crate::reference::ReferenceTables;
use crate::utils::logging::progress;
pub use statistics::BatchStatistics;

/// Observations of one patient, ordered on the patient-age clock
pub type PatientSeries = SmallVec<[LabObservation; 8]>;

/// Materialized input for one run
#[derive(Debug, Clone, Default)]
pub struct CohortInput {
    /// ICU encounters to stage
    pub encounters: Vec<PatientEncounter>,
    /// Creatinine history of the patients, including pre-admission labs
    pub observations: Vec<LabObservation>,
}

/// Output of one run, ordered by encounter key
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    /// One baseline per staged encounter
    pub baselines: Vec<BaselineRecord>,
    /// One stage result per staged encounter
    pub stages: Vec<AkiStageResult>,
    /// Encounters that could not be staged
    pub unstageable: Vec<UnstageableEncounter>,
    /// Aggregate counts
    pub statistics: BatchStatistics,
}

/// Group observations per patient, each series ordered by result instant
///
/// The sort is stable, so equal instants keep their input order.
#[must_use]
pub fn group_by_patient(observations: Vec<LabObservation>) -> FxHashMap<String, PatientSeries> {
    let mut groups: FxHashMap<String, PatientSeries> = FxHashMap::default();
    for obs in observations {
        groups.entry(obs.patient_id.clone()).or_default().push(obs);
    }
    for series in groups.values_mut() {
        series.sort_by_key(LabObservation::instant);
    }
    groups
}

/// Baseline resolution and staging with injected configuration
#[derive(Debug, Clone)]
pub struct AkiPipeline {
    config: PipelineConfig,
    tables: Arc<ReferenceTables>,
}

impl AkiPipeline {
    /// Validate the configuration and load the reference tables it names
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let tables = ReferenceTables::load(
            config.schwartz_table_path.as_deref(),
            config.egfr_table_path.as_deref(),
        )?;
        Ok(Self {
            config,
            tables: Arc::new(tables),
        })
    }

    /// Use already loaded tables
    pub fn with_tables(config: PipelineConfig, tables: Arc<ReferenceTables>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, tables })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reference tables in use
    #[must_use]
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Resolve and stage one encounter from the patient's observations
    #[must_use]
    pub fn process_encounter(
        &self,
        encounter: &PatientEncounter,
        patient_observations: &[LabObservation],
    ) -> EncounterOutcome {
        let baseline = match resolve(encounter, patient_observations, &self.tables) {
            BaselineOutcome::Resolved(record) => record,
            BaselineOutcome::Unresolved(reason) => {
                if self.config.reporting.log_unstageable {
                    warn!("{}: unstageable ({reason})", encounter.key());
                }
                return EncounterOutcome::Unstageable(UnstageableEncounter::new(
                    encounter.key(),
                    reason,
                ));
            }
        };

        let (result, trace) =
            stage_with_trace(encounter, &baseline, patient_observations, &self.config.kdigo);
        if self.config.reporting.trace_observations {
            for staged in &trace {
                debug!(
                    "{}: +{}s [{}] {:.3} mg/dL -> stage {}",
                    encounter.key(),
                    staged.seconds_since_admit,
                    staged.window,
                    staged.value,
                    staged.stage
                );
            }
        }

        EncounterOutcome::Staged { baseline, result }
    }

    /// Process every encounter in `input`
    pub fn run(&self, input: CohortInput) -> Result<BatchOutput> {
        let start = Instant::now();
        let CohortInput {
            encounters,
            observations,
        } = input;

        let received = observations.len();
        let (observations, dedup) = dedup_observations(observations);
        let series = group_by_patient(observations);
        info!(
            "Grouped {} observations for {} patients ({} duplicates, {} invalid dropped)",
            received - dedup.duplicates - dedup.invalid_values,
            series.len(),
            dedup.duplicates,
            dedup.invalid_values
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads())
            .build()
            .map_err(|e| AkiError::ConfigError(format!("failed to build worker pool: {e}")))?;
        info!(
            "Processing {} encounters with {} threads",
            encounters.len(),
            pool.current_num_threads()
        );

        let pb = if self.config.reporting.show_progress {
            progress::create_main_progress_bar(encounters.len() as u64, Some("Staging encounters"))
        } else {
            ProgressBar::hidden()
        };

        let empty = PatientSeries::new();
        let mut outcomes: Vec<EncounterOutcome> = pool.install(|| {
            encounters
                .par_iter()
                .progress_with(pb.clone())
                .map(|encounter| {
                    let history = series.get(&encounter.patient_id).unwrap_or(&empty);
                    self.process_encounter(encounter, history)
                })
                .collect()
        });
        progress::finish_progress_bar(&pb, Some("Staging complete"));

        outcomes.sort_by_key(EncounterOutcome::key);

        let mut output = BatchOutput {
            statistics: BatchStatistics::new(received, dedup),
            ..BatchOutput::default()
        };
        for outcome in outcomes {
            output.statistics.record(&outcome);
            match outcome {
                EncounterOutcome::Staged { baseline, result } => {
                    output.baselines.push(baseline);
                    output.stages.push(result);
                }
                EncounterOutcome::Unstageable(marker) => output.unstageable.push(marker),
            }
        }

        info!(
            "Staged {} of {} encounters in {:?}",
            output.statistics.staged,
            output.statistics.encounters,
            start.elapsed()
        );
        info!("\n{}", output.statistics.summary());
        Ok(output)
    }
}
