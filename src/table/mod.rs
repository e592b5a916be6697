//! Wide-table loading, schema checks, and reshaping.
//!
//! This module handles:
//! - Parsing CSV text into wide tables
//! - Validating identity/date column schemas
//! - Melting wide tables into normalized long records

pub mod loader;
pub mod reshape;
pub mod schema;

// Re-export main types
pub use loader::{is_remote, load_table, parse_csv};
pub use reshape::{reshape, reshape_events, sum_population};
pub use schema::{parse_date, LongRecord, ValueKind, WideTable};
