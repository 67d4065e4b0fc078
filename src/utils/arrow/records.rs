//! Conversion between pipeline records and Arrow record batches
//!
//! Inputs decode straight into the model types through `serde_arrow`.
//! Outputs go through flat row types with enum labels as strings so the
//! written tables stay readable by any downstream tool.

use arrow::record_batch::RecordBatch;
use arrow_schema::FieldRef;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::Result;
use crate::models::encounter::PatientEncounter;
use crate::models::observation::LabObservation;
use crate::models::results::{AkiStageResult, BaselineRecord, UnstageableEncounter};

/// Tabular form of a [`BaselineRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRow {
    /// Hospitalization identifier
    pub hospitalization_id: String,
    /// Encounter identifier
    pub encounter_id: String,
    /// Baseline creatinine (mg/dL)
    pub baseline_scr: f64,
    /// `prior`, `height_dependent` or `height_independent`
    pub baseline_source: String,
    /// Prior value replaced by the Schwartz floor
    pub floor_applied: bool,
    /// Days between the prior value and ICU admission
    pub prior_days_before_admit: Option<f64>,
}

impl From<&BaselineRecord> for BaselineRow {
    fn from(record: &BaselineRecord) -> Self {
        Self {
            hospitalization_id: record.hospitalization_id.clone(),
            encounter_id: record.encounter_id.clone(),
            baseline_scr: record.baseline_scr,
            baseline_source: record.baseline_source.label().to_string(),
            floor_applied: record.floor_applied,
            prior_days_before_admit: record.prior_days_before_admit,
        }
    }
}

/// Tabular form of an [`AkiStageResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRow {
    /// Hospitalization identifier
    pub hospitalization_id: String,
    /// Encounter identifier
    pub encounter_id: String,
    /// Stage 0-3; null when excluded on admission
    pub stage: Option<u8>,
    /// AKI within 12 hours of ICU admission
    pub excluded_on_admission: bool,
    /// `0-12h` or `12-72h`
    pub stage_window: String,
}

impl From<&AkiStageResult> for StageRow {
    fn from(result: &AkiStageResult) -> Self {
        Self {
            hospitalization_id: result.hospitalization_id.clone(),
            encounter_id: result.encounter_id.clone(),
            stage: result.stage.map(|stage| stage.as_u8()),
            excluded_on_admission: result.excluded_on_admission,
            stage_window: result.stage_window.label().to_string(),
        }
    }
}

/// Tabular form of an [`UnstageableEncounter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstageableRow {
    /// Hospitalization identifier
    pub hospitalization_id: String,
    /// Encounter identifier
    pub encounter_id: String,
    /// Reason label
    pub reason: String,
}

impl From<&UnstageableEncounter> for UnstageableRow {
    fn from(marker: &UnstageableEncounter) -> Self {
        Self {
            hospitalization_id: marker.hospitalization_id.clone(),
            encounter_id: marker.encounter_id.clone(),
            reason: marker.reason.label().to_string(),
        }
    }
}

fn rows_to_batch<'de, T>(rows: &[T]) -> Result<RecordBatch>
where
    T: Serialize + Deserialize<'de>,
{
    let fields = Vec::<FieldRef>::from_type::<T>(TracingOptions::default())?;
    Ok(serde_arrow::to_record_batch(&fields, &rows)?)
}

/// Encode baselines as a record batch
pub fn baselines_to_record_batch(records: &[BaselineRecord]) -> Result<RecordBatch> {
    let rows: Vec<BaselineRow> = records.iter().map(BaselineRow::from).collect();
    rows_to_batch(&rows)
}

/// Encode stage results as a record batch
pub fn stages_to_record_batch(results: &[AkiStageResult]) -> Result<RecordBatch> {
    let rows: Vec<StageRow> = results.iter().map(StageRow::from).collect();
    rows_to_batch(&rows)
}

/// Encode unstageable markers as a record batch
pub fn unstageable_to_record_batch(markers: &[UnstageableEncounter]) -> Result<RecordBatch> {
    let rows: Vec<UnstageableRow> = markers.iter().map(UnstageableRow::from).collect();
    rows_to_batch(&rows)
}

/// Encode encounters as a record batch
pub fn encounters_to_record_batch(encounters: &[PatientEncounter]) -> Result<RecordBatch> {
    rows_to_batch(encounters)
}

/// Encode observations as a record batch
pub fn observations_to_record_batch(observations: &[LabObservation]) -> Result<RecordBatch> {
    rows_to_batch(observations)
}

/// Decode encounters from record batches
pub fn encounters_from_record_batches(batches: &[RecordBatch]) -> Result<Vec<PatientEncounter>> {
    let mut encounters = Vec::new();
    for batch in batches {
        let decoded: Vec<PatientEncounter> = serde_arrow::from_record_batch(batch)?;
        encounters.extend(decoded);
    }
    Ok(encounters)
}

/// Decode observations from record batches
pub fn observations_from_record_batches(batches: &[RecordBatch]) -> Result<Vec<LabObservation>> {
    let mut observations = Vec::new();
    for batch in batches {
        let decoded: Vec<LabObservation> = serde_arrow::from_record_batch(batch)?;
        observations.extend(decoded);
    }
    Ok(observations)
}

/// Decode stage rows, mainly for checking written output
pub fn stage_rows_from_record_batch(batch: &RecordBatch) -> Result<Vec<StageRow>> {
    Ok(serde_arrow::from_record_batch(batch)?)
}

/// Decode baseline rows, mainly for checking written output
pub fn baseline_rows_from_record_batch(batch: &RecordBatch) -> Result<Vec<BaselineRow>> {
    Ok(serde_arrow::from_record_batch(batch)?)
}
