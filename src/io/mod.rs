//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, report serialization)
//! - `sync_reader` - Synchronous CSV reader with iterator interface

pub mod csv_format;
pub mod sync_reader;

pub use csv_format::{
    convert_csv_record, write_invoices_csv, write_payments_csv, write_profiles_csv, CsvRecord,
    ReplayRecord,
};
pub use sync_reader::SyncReader;
