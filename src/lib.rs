//! Baseline serum creatinine resolution and KDIGO AKI staging for
//! pediatric ICU encounters.
//!
//! For each encounter the baseline resolver picks a reference creatinine
//! (a floored prior value, or a height-dependent / height-independent
//! estimate) and the stager assigns a KDIGO stage over the first 72 hours
//! of ICU admission. Both are pure per-encounter functions; the batch
//! pipeline runs them in parallel over a cohort.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod reference;
pub mod utils;

// Core types
pub use config::{PipelineConfig, ReportingConfig};
pub use error::{AkiError, Result};
pub use models::{
    AkiStageResult, BaselineRecord, BaselineSource, EncounterKey, EncounterOutcome,
    LabObservation, PatientEncounter, Sex, StageWindow, UnstageableEncounter, UnstageableReason,
};
pub use reference::ReferenceTables;

// Algorithms
pub use algorithm::baseline::{BaselineOutcome, resolve};
pub use algorithm::pipeline::{AkiPipeline, BatchOutput, BatchStatistics, CohortInput};
pub use algorithm::staging::kdigo::{KdigoCriteria, KdigoStage, kdigo_stage};
pub use algorithm::staging::{stage, stage_or_mark, stage_with_trace};

// Arrow types
pub use arrow::record_batch::RecordBatch;
