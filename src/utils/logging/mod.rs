//! Logging utilities for table operations and progress tracking

pub mod log;
pub mod progress;

pub use self::log::{TableOperation, log_operation_complete, log_operation_start};
pub use self::progress::{create_main_progress_bar, finish_progress_bar};
