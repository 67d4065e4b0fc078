//! Arrow record batch conversions for pipeline inputs and outputs

pub mod records;

pub use records::{
    BaselineRow, StageRow, UnstageableRow, baseline_rows_from_record_batch,
    baselines_to_record_batch, encounters_from_record_batches, encounters_to_record_batch,
    observations_from_record_batches, observations_to_record_batch, stage_rows_from_record_batch,
    stages_to_record_batch, unstageable_to_record_batch,
};
