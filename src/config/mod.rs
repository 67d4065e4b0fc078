//! Configuration for an AKI pipeline run.
//!
//! Everything that changes output or side effects is injected through
//! `PipelineConfig`; there are no process-wide toggles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::algorithm::staging::kdigo::KdigoCriteria;
use crate::error::{AkiError, Result};

/// Reporting and diagnostics options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Show a progress bar while encounters are processed
    pub show_progress: bool,
    /// Log every staged observation at `debug` level
    pub trace_observations: bool,
    /// Log each unstageable encounter at `warn` level
    pub log_unstageable: bool,
}

/// Configuration for the baseline and staging pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// KDIGO serum creatinine thresholds
    pub kdigo: KdigoCriteria,
    /// Reporting options
    pub reporting: ReportingConfig,
    /// Worker threads; `None` uses one per CPU
    pub num_threads: Option<usize>,
    /// Replacement Schwartz table
    pub schwartz_table_path: Option<PathBuf>,
    /// Replacement eGFR table
    pub egfr_table_path: Option<PathBuf>,
}

impl PipelineConfig {
    /// Read a configuration from a JSON file; missing keys take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|e| AkiError::json(path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make staging meaningless
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == Some(0) {
            return Err(AkiError::ConfigError("num_threads must be at least 1".into()));
        }
        self.kdigo.validate()
    }

    /// Effective worker count
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Worker Threads: {}", self.worker_threads())?;
        writeln!(
            f,
            "  KDIGO Ratios: {:.1}x / {:.1}x / {:.1}x",
            self.kdigo.stage1_ratio, self.kdigo.stage2_ratio, self.kdigo.stage3_ratio
        )?;
        writeln!(
            f,
            "  KDIGO Absolute: rise >= {} mg/dL, value >= {} mg/dL",
            self.kdigo.stage1_absolute_rise, self.kdigo.stage3_absolute_value
        )?;
        if let Some(path) = &self.schwartz_table_path {
            writeln!(f, "  Schwartz Table: {}", path.display())?;
        }
        if let Some(path) = &self.egfr_table_path {
            writeln!(f, "  eGFR Table: {}", path.display())?;
        }
        writeln!(f, "  Show Progress: {}", self.reporting.show_progress)?;
        Ok(())
    }
}
