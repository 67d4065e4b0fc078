//! Supporting utilities: Arrow conversion, Parquet files and logging

pub mod arrow;
pub mod io;
pub mod logging;
