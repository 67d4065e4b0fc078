//! Log lines for table reads and writes

use std::path::Path;
use std::time::Duration;

/// Direction of a table transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOperation {
    /// Loading an input table
    Read,
    /// Writing an output table
    Write,
}

impl TableOperation {
    const fn progressive(self) -> &'static str {
        match self {
            Self::Read => "Reading",
            Self::Write => "Writing",
        }
    }

    const fn past(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Write => "Wrote",
        }
    }

    const fn preposition(self) -> &'static str {
        match self {
            Self::Read => "from",
            Self::Write => "to",
        }
    }
}

/// Log the start of a table operation
pub fn log_operation_start(operation: TableOperation, path: &Path) {
    log::info!("{} {}", operation.progressive(), path.display());
}

/// Log a finished table operation; an empty input table is a warning
pub fn log_operation_complete(
    operation: TableOperation,
    path: &Path,
    rows: usize,
    elapsed: Duration,
) {
    if rows == 0 && operation == TableOperation::Read {
        log::warn!("No rows in {}", path.display());
    }
    log::info!(
        "{} {rows} rows {} {} in {elapsed:?}",
        operation.past(),
        operation.preposition(),
        path.display()
    );
}
