//! Schwartz normal creatinine values by age and sex
//!
//! Schwartz GJ, Haycock GB, Spitzer A. *Plasma creatinine and urea
//! concentration in children: normal values for age and sex.*
//! J Pediatr 1976;88:828-830.
//!
//! `mean - 2·sd` for the patient's age year and sex is used as a floor on
//! prior creatinine values.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

use crate::error::{AkiError, Result};
use crate::models::encounter::Sex;

/// Youngest age year in the table
pub const MIN_AGE_YEAR: u8 = 1;

/// Oldest age year in the table
pub const MAX_AGE_YEAR: u8 = 18;

const EMBEDDED: &str = include_str!("data/schwartz_1976.json");

/// One `(age_year, sex)` row
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SchwartzRow {
    /// Age in whole years, 1 to 18
    pub age_year: u8,
    /// Male or Female
    pub sex: Sex,
    /// Mean creatinine (mg/dL)
    pub mean: f64,
    /// Standard deviation (mg/dL)
    pub sd: f64,
}

impl SchwartzRow {
    /// Lower normal limit, `mean - 2·sd`
    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.mean - 2.0 * self.sd
    }
}

#[derive(Debug, Deserialize)]
struct SchwartzDocument {
    version: String,
    citation: String,
    rows: Vec<SchwartzRow>,
}

/// Validated Schwartz table
#[derive(Debug, Clone)]
pub struct SchwartzTable {
    version: String,
    citation: String,
    rows: FxHashMap<(u8, Sex), SchwartzRow>,
}

impl SchwartzTable {
    /// The table shipped with the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json("embedded:schwartz_1976.json", EMBEDDED)
    }

    /// Load a replacement table from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(path, &text)
    }

    fn from_json(origin: impl AsRef<Path>, text: &str) -> Result<Self> {
        let document: SchwartzDocument =
            serde_json::from_str(text).map_err(|e| AkiError::json(origin.as_ref(), e))?;
        Self::from_rows(document.version, document.citation, document.rows)
    }

    /// Build a table, checking every `(age_year, sex)` appears exactly once
    pub fn from_rows(
        version: impl Into<String>,
        citation: impl Into<String>,
        rows: Vec<SchwartzRow>,
    ) -> Result<Self> {
        let mut by_key = FxHashMap::default();
        for row in rows {
            if !row.sex.is_supported() {
                return Err(AkiError::reference_table(
                    "schwartz",
                    format!("row for age {} has unsupported sex", row.age_year),
                ));
            }
            if !(MIN_AGE_YEAR..=MAX_AGE_YEAR).contains(&row.age_year) {
                return Err(AkiError::reference_table(
                    "schwartz",
                    format!("age year {} outside 1-18", row.age_year),
                ));
            }
            if !(row.mean.is_finite() && row.sd.is_finite() && row.mean > 0.0 && row.sd >= 0.0) {
                return Err(AkiError::reference_table(
                    "schwartz",
                    format!("invalid mean/sd for ({}, {})", row.age_year, row.sex),
                ));
            }
            if by_key.insert((row.age_year, row.sex), row).is_some() {
                return Err(AkiError::reference_table(
                    "schwartz",
                    format!("duplicate row for ({}, {})", row.age_year, row.sex),
                ));
            }
        }

        for age_year in MIN_AGE_YEAR..=MAX_AGE_YEAR {
            for sex in [Sex::Male, Sex::Female] {
                if !by_key.contains_key(&(age_year, sex)) {
                    return Err(AkiError::reference_table(
                        "schwartz",
                        format!("missing row for ({age_year}, {sex})"),
                    ));
                }
            }
        }

        Ok(Self {
            version: version.into(),
            citation: citation.into(),
            rows: by_key,
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

    /// Row for an age year (clamped to 1-18) and sex
    #[must_use]
    pub fn row(&self, age_year: u8, sex: Sex) -> Option<&SchwartzRow> {
        let age_year = age_year.clamp(MIN_AGE_YEAR, MAX_AGE_YEAR);
        self.rows.get(&(age_year, sex))
    }

    /// Floor value `mean - 2·sd`; `None` for unsupported sex
    #[must_use]
    pub fn min_value(&self, age_year: u8, sex: Sex) -> Option<f64> {
        self.row(age_year, sex).map(SchwartzRow::min_value)
    }
}

/// Integer age year for Schwartz lookups: rounded, clamped to 1-18
#[must_use]
pub fn schwartz_age_year(age_years: f64) -> u8 {
    let rounded = age_years.round();
    if rounded.is_nan() || rounded <= f64::from(MIN_AGE_YEAR) {
        MIN_AGE_YEAR
    } else if rounded >= f64::from(MAX_AGE_YEAR) {
        MAX_AGE_YEAR
    } else {
        rounded as u8
    }
}
