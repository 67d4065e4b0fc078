//! Domain models
//!
//! Encounters and creatinine observations come in from the ingestion side;
//! baseline records, stage results and unstageable markers go out.

pub mod encounter;
pub mod observation;
pub mod results;

// Re-export commonly used types
pub use encounter::{EncounterKey, PatientEncounter, Sex};
pub use observation::LabObservation;
pub use results::{
    AkiStageResult, BaselineRecord, BaselineSource, EncounterOutcome, StageWindow,
    UnstageableEncounter, UnstageableReason,
};
