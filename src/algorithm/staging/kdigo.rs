//! KDIGO serum creatinine staging
//!
//! Thresholds follow the KDIGO 2012 Clinical Practice Guideline for Acute
//! Kidney Injury, Table 2 (SCr criteria):
//!
//! | Stage | SCr criterion |
//! |---|---|
//! | 1 | 1.5–1.9 × baseline, or rise ≥ 0.3 mg/dL |
//! | 2 | 2.0–2.9 × baseline |
//! | 3 | ≥ 3.0 × baseline, or SCr ≥ 4.0 mg/dL, or renal replacement therapy |
//!
//! The 0.3 mg/dL rise is measured against the resolved baseline, not
//! against a rolling 48-hour minimum. Urine output criteria are not used.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AkiError, Result};

/// KDIGO AKI stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum KdigoStage {
    /// No AKI
    Stage0 = 0,
    /// Risk
    Stage1 = 1,
    /// Injury
    Stage2 = 2,
    /// Failure
    Stage3 = 3,
}

impl KdigoStage {
    /// Numeric stage, 0-3
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether this stage counts as AKI
    #[must_use]
    pub const fn is_aki(self) -> bool {
        !matches!(self, Self::Stage0)
    }

    /// All stages in ascending order
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Stage0, Self::Stage1, Self::Stage2, Self::Stage3]
    }
}

impl TryFrom<u8> for KdigoStage {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stage0),
            1 => Ok(Self::Stage1),
            2 => Ok(Self::Stage2),
            3 => Ok(Self::Stage3),
            other => Err(format!("invalid KDIGO stage {other}")),
        }
    }
}

impl From<KdigoStage> for u8 {
    fn from(stage: KdigoStage) -> Self {
        stage.as_u8()
    }
}

impl fmt::Display for KdigoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Serum creatinine thresholds for each stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdigoCriteria {
    /// Ratio to baseline for stage 1
    pub stage1_ratio: f64,
    /// Ratio to baseline for stage 2
    pub stage2_ratio: f64,
    /// Ratio to baseline for stage 3
    pub stage3_ratio: f64,
    /// Absolute rise over baseline (mg/dL) for stage 1
    pub stage1_absolute_rise: f64,
    /// Absolute value (mg/dL) for stage 3
    pub stage3_absolute_value: f64,
}

impl Default for KdigoCriteria {
    fn default() -> Self {
        Self {
            stage1_ratio: 1.5,
            stage2_ratio: 2.0,
            stage3_ratio: 3.0,
            stage1_absolute_rise: 0.3,
            stage3_absolute_value: 4.0,
        }
    }
}

impl KdigoCriteria {
    /// Ratios must be positive and strictly increasing
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.stage1_ratio,
            self.stage2_ratio,
            self.stage3_ratio,
            self.stage1_absolute_rise,
            self.stage3_absolute_value,
        ];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(AkiError::ConfigError(
                "KDIGO thresholds must be positive and finite".into(),
            ));
        }
        if !(self.stage1_ratio < self.stage2_ratio && self.stage2_ratio < self.stage3_ratio) {
            return Err(AkiError::ConfigError(
                "KDIGO ratios must increase from stage 1 to stage 3".into(),
            ));
        }
        Ok(())
    }
}

/// Slack on threshold comparisons so that e.g. 0.3 / 0.2 counts as 1.5x
const THRESHOLD_TOLERANCE: f64 = 1e-9;

fn at_least(value: f64, threshold: f64) -> bool {
    value + THRESHOLD_TOLERANCE >= threshold
}

/// Stage a single creatinine value against a baseline
///
/// Pure: the same `(value, baseline, criteria)` always gives the same stage.
/// A non-positive baseline disables the ratio criteria; the absolute
/// criteria still apply.
#[must_use]
pub fn kdigo_stage(value: f64, baseline: f64, criteria: &KdigoCriteria) -> KdigoStage {
    if !value.is_finite() {
        return KdigoStage::Stage0;
    }
    let ratio = if baseline.is_finite() && baseline > 0.0 {
        Some(value / baseline)
    } else {
        None
    };
    let meets_ratio = |threshold: f64| ratio.is_some_and(|r| at_least(r, threshold));

    if meets_ratio(criteria.stage3_ratio) || at_least(value, criteria.stage3_absolute_value) {
        KdigoStage::Stage3
    } else if meets_ratio(criteria.stage2_ratio) {
        KdigoStage::Stage2
    } else if meets_ratio(criteria.stage1_ratio)
        || (baseline.is_finite() && at_least(value - baseline, criteria.stage1_absolute_rise))
    {
        KdigoStage::Stage1
    } else {
        KdigoStage::Stage0
    }
}
