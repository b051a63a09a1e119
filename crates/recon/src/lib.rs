//! `bankrec-recon`: bank-vs-books reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded record sets, returns the three
//! partitions (matched, bank-only, books-only) plus summary counts.
//! Also stacks same-header record sets (`combine`).
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod combine;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod key;
pub mod matcher;
pub mod model;
pub mod normalize;

pub use aggregate::{ReconReport, Table};
pub use combine::{combine, CombineResult};
pub use config::{ColumnMapping, ReconConfig, SideColumns};
pub use engine::run;
pub use error::ReconError;
pub use gate::{MemoryGate, Unmetered, UsageGate};
pub use model::{Cell, ReconInput, ReconResult, ReconSummary, Record, RecordSet};
