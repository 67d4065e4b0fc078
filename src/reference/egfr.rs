//! Age-normative eGFR bins (mL/min/1.73m²)
//!
//! Hessey E et al. *Evaluation of height-dependent and height-independent
//! methods of estimating baseline serum creatinine in critically ill
//! children.* J Pediatr 2017, supplementary table.
//!
//! Bins are half-open `[age_min, age_max)` in fractional years, contiguous
//! from zero, with an open-ended last bin.

use serde::Deserialize;
use std::path::Path;

use crate::error::{AkiError, Result};

const EMBEDDED: &str = include_str!("data/egfr_hessey_2017.json");

/// One age bin
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EgfrBin {
    /// Inclusive lower bound in years
    pub age_min: f64,
    /// Exclusive upper bound in years; `None` for the last bin
    pub age_max: Option<f64>,
    /// eGFR for the bin
    pub egfr: f64,
}

impl EgfrBin {
    /// Whether `age_years` falls in `[age_min, age_max)`
    #[must_use]
    pub fn contains(&self, age_years: f64) -> bool {
        age_years >= self.age_min && self.age_max.is_none_or(|max| age_years < max)
    }
}

#[derive(Debug, Deserialize)]
struct EgfrDocument {
    version: String,
    citation: String,
    bins: Vec<EgfrBin>,
}

/// Validated eGFR table
#[derive(Debug, Clone)]
pub struct EgfrTable {
    version: String,
    citation: String,
    bins: Vec<EgfrBin>,
}

impl EgfrTable {
    /// The table shipped with the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json("embedded:egfr_hessey_2017.json", EMBEDDED)
    }

    /// Load a replacement table from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(path, &text)
    }

    fn from_json(origin: impl AsRef<Path>, text: &str) -> Result<Self> {
        let document: EgfrDocument =
            serde_json::from_str(text).map_err(|e| AkiError::json(origin.as_ref(), e))?;
        Self::from_bins(document.version, document.citation, document.bins)
    }

    /// Build a table, checking the bins tile `[0, ∞)` without gaps or overlap
    pub fn from_bins(
        version: impl Into<String>,
        citation: impl Into<String>,
        mut bins: Vec<EgfrBin>,
    ) -> Result<Self> {
        if bins.is_empty() {
            return Err(AkiError::reference_table("egfr", "no bins"));
        }
        bins.sort_by(|a, b| a.age_min.total_cmp(&b.age_min));

        if bins[0].age_min != 0.0 {
            return Err(AkiError::reference_table(
                "egfr",
                format!("first bin starts at {} instead of 0", bins[0].age_min),
            ));
        }

        for (idx, bin) in bins.iter().enumerate() {
            if !(bin.egfr.is_finite() && bin.egfr > 0.0) {
                return Err(AkiError::reference_table(
                    "egfr",
                    format!("bin starting at {} has eGFR {}", bin.age_min, bin.egfr),
                ));
            }
            let is_last = idx + 1 == bins.len();
            match (bin.age_max, is_last) {
                (None, true) => {}
                (None, false) => {
                    return Err(AkiError::reference_table(
                        "egfr",
                        format!("open-ended bin at {} is not the last bin", bin.age_min),
                    ));
                }
                (Some(_), true) => {
                    return Err(AkiError::reference_table("egfr", "last bin must be open-ended"));
                }
                (Some(max), false) => {
                    if max <= bin.age_min {
                        return Err(AkiError::reference_table(
                            "egfr",
                            format!("empty bin [{}, {max})", bin.age_min),
                        ));
                    }
                    let next = bins[idx + 1].age_min;
                    if next != max {
                        return Err(AkiError::reference_table(
                            "egfr",
                            format!("bins not contiguous: {max} followed by {next}"),
                        ));
                    }
                }
            }
        }

        Ok(Self {
            version: version.into(),
            citation: citation.into(),
            bins,
        })
    }

    /// Table version string
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Literature citation
    #[must_use]
    pub fn citation(&self) -> &str {
        &self.citation
    }

    /// Bins in ascending age order
    #[must_use]
    pub fn bins(&self) -> &[EgfrBin] {
        &self.bins
    }

    /// eGFR for an age in years; negative or NaN ages use the first bin
    #[must_use]
    pub fn lookup(&self, age_years: f64) -> f64 {
        if !(age_years >= 0.0) {
            return self.bins[0].egfr;
        }
        self.bins
            .iter()
            .find(|bin| bin.contains(age_years))
            .map_or(self.bins[self.bins.len() - 1].egfr, |bin| bin.egfr)
    }
}
