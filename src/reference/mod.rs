//! Static reference tables used by the baseline resolver
//!
//! Both tables are versioned JSON artifacts embedded in the crate so that
//! clinical reviewers can audit them independently of the code. A run loads
//! them once and shares them read-only across workers.

pub mod egfr;
pub mod schwartz;

use log::info;
use std::path::Path;

use crate::error::Result;

pub use egfr::{EgfrBin, EgfrTable};
pub use schwartz::{SchwartzRow, SchwartzTable, schwartz_age_year};

/// The pair of lookup tables consulted by the resolver
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    /// Schwartz normal values (floor for prior values)
    pub schwartz: SchwartzTable,
    /// Age-normative eGFR bins
    pub egfr: EgfrTable,
}

impl ReferenceTables {
    /// Tables shipped with the crate
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            schwartz: SchwartzTable::embedded()?,
            egfr: EgfrTable::embedded()?,
        })
    }

    /// Embedded tables, each optionally replaced by a file
    pub fn load(schwartz_path: Option<&Path>, egfr_path: Option<&Path>) -> Result<Self> {
        let schwartz = match schwartz_path {
            Some(path) => SchwartzTable::from_path(path)?,
            None => SchwartzTable::embedded()?,
        };
        let egfr = match egfr_path {
            Some(path) => EgfrTable::from_path(path)?,
            None => EgfrTable::embedded()?,
        };

        info!(
            "Loaded reference tables: Schwartz v{}, eGFR v{}",
            schwartz.version(),
            egfr.version()
        );
        Ok(Self { schwartz, egfr })
    }
}
