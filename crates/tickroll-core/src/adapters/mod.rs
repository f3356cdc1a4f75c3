//! Trade source implementations.

pub mod csv_file;
pub mod databento;

pub use csv_file::CsvFileSource;
pub use databento::{DatabentoAdapter, DatabentoConfig};
