use tracing::{debug, info, warn};

use crate::aggregate::compute_summary;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::gate::{within_quota, UsageGate};
use crate::key::build_keys;
use crate::matcher::match_keys;
use crate::model::{ReconInput, ReconMeta, ReconResult, Side};

/// Run one reconciliation.
///
/// Order is fixed: validate the mapping, ask the gate, then normalize, key,
/// match and summarize, and finally record one unit of usage. Any failure
/// returns an error and no partial result.
pub fn run(
    config: &ReconConfig,
    input: ReconInput,
    gate: &mut dyn UsageGate,
) -> Result<ReconResult, ReconError> {
    let mapping = &config.columns;
    mapping.validate()?;

    let active = mapping.active_fields();
    let bank_cols = mapping.resolve(Side::Bank, &input.bank, active)?;
    let books_cols = mapping.resolve(Side::Books, &input.books, active)?;

    let (used, limit) = gate.usage()?;
    if !within_quota(used, limit) {
        warn!(used, limit, "reconciliation denied by usage gate");
        return Err(ReconError::QuotaExceeded { used, limit });
    }

    debug!(
        bank_rows = input.bank.len(),
        books_rows = input.books.len(),
        date = active.date,
        narration = active.narration,
        "building keys"
    );
    let bank_keys = build_keys(&input.bank, &bank_cols, active);
    let books_keys = build_keys(&input.books, &books_cols, active);

    let partitions = match_keys(&bank_keys, &books_keys);
    let summary = compute_summary(&partitions, input.bank.len(), input.books.len());

    gate.increment()?;

    info!(
        matched = summary.matched,
        bank_only = summary.bank_only,
        books_only = summary.books_only,
        bank_unmatchable = summary.bank_unmatchable,
        books_unmatchable = summary.books_unmatchable,
        "reconciliation complete"
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            active_fields: active,
        },
        summary,
        partitions,
        bank: input.bank,
        books: input.books,
        bank_suffix: config.output.bank_suffix.clone(),
        books_suffix: config.output.books_suffix.clone(),
    })
}
