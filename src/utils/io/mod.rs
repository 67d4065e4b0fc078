//! File input/output for the command line tool

pub mod parquet;

pub use self::parquet::{read_parquet, write_parquet};
