//! avidin-io
//!
//! Tabular input for the affinity pipeline. Reads BindingDB-style CSV
//! exports into cleaned [`avidin_core::BindingRecord`]s, applying the row
//! filter at load time so malformed rows never reach the embedders.
pub mod bindingdb;

pub use bindingdb::{read_binding_records, records_from_frame, ColumnMap};
