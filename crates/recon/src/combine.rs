//! Stack record sets that share one header into a single `Combined` table.

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{padded, Table};
use crate::error::ReconError;
use crate::gate::{within_quota, UsageGate};
use crate::model::RecordSet;

pub const COMBINED_TABLE: &str = "Combined";

/// Rows of every input in input order, plus where each input's rows came from.
#[derive(Debug, Clone, Serialize)]
pub struct CombineResult {
    /// Row count contributed by each input, in input order.
    pub source_rows: Vec<usize>,
    pub table: Table,
}

impl CombineResult {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Concatenate `sets` under the first set's header.
///
/// Headers must match exactly, names and order. The gate is asked after the
/// header check and charged one unit on success, the same as a
/// reconciliation run.
pub fn combine(sets: Vec<RecordSet>, gate: &mut dyn UsageGate) -> Result<CombineResult, ReconError> {
    if sets.len() < 2 {
        return Err(ReconError::TooFewInputs { given: sets.len() });
    }

    let expected = &sets[0].columns;
    if let Some((index, set)) = sets
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, set)| &set.columns != expected)
    {
        return Err(ReconError::HeaderMismatch {
            index: index + 1,
            expected: expected.clone(),
            found: set.columns.clone(),
        });
    }

    let (used, limit) = gate.usage()?;
    if !within_quota(used, limit) {
        warn!(used, limit, "combine denied by usage gate");
        return Err(ReconError::QuotaExceeded { used, limit });
    }

    let columns = expected.clone();
    let width = columns.len();
    let source_rows: Vec<usize> = sets.iter().map(RecordSet::len).collect();
    let rows = sets
        .iter()
        .flat_map(|set| set.rows.iter())
        .map(|record| padded(&record.cells, width))
        .collect();

    gate.increment()?;

    let table = Table { name: COMBINED_TABLE.into(), columns, rows };
    info!(files = source_rows.len(), rows = table.len(), "combine complete");
    Ok(CombineResult { source_rows, table })
}
