//! accrue-ingest: ledger register ingestion (CSV) and provider parsers.

pub mod types;
pub mod parsers;

pub use types::{Cleared, RegisterRow, to_transactions};
pub use parsers::ynab_register::{parse_register, parse_register_csv};
