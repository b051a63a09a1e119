//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success (unmatched records included)     |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3       | Universal        | I/O error (unreadable input, bad output) |
//! | 60-69   | recon            | Reconciliation and combine run codes     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use bankrec_recon::ReconError;

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// I/O error - input file unreadable or unsupported, output not writable.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Recon (60-69)
// =============================================================================

/// Column mapping unusable: config parse error, amount not mapped on both
/// sides, mapped column missing from the data.
pub const EXIT_RECON_CONFIG: u8 = 60;

/// Usage limit reached; the run was refused before any work.
pub const EXIT_RECON_QUOTA: u8 = 61;

/// Usage ledger could not be read or updated.
pub const EXIT_RECON_GATE: u8 = 62;

/// Files given to `combine` do not share one header row.
pub const EXIT_RECON_HEADERS: u8 = 63;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        e if e.is_configuration() => EXIT_RECON_CONFIG,
        ReconError::QuotaExceeded { .. } => EXIT_RECON_QUOTA,
        ReconError::Gate(_) => EXIT_RECON_GATE,
        ReconError::HeaderMismatch { .. } => EXIT_RECON_HEADERS,
        ReconError::TooFewInputs { .. } => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankrec_recon::model::Side;

    #[test]
    fn recon_errors_map_to_codes() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), 60);
        assert_eq!(recon_exit_code(&ReconError::Configuration("x".into())), 60);
        let missing = ReconError::MissingColumn { side: Side::Books, column: "Debit".into() };
        assert_eq!(recon_exit_code(&missing), 60);
        assert_eq!(recon_exit_code(&ReconError::QuotaExceeded { used: 5, limit: 5 }), 61);
        assert_eq!(recon_exit_code(&ReconError::Gate("x".into())), 62);
        let amount = ReconError::AmountNotMapped { sides: vec![Side::Bank] };
        assert_eq!(recon_exit_code(&amount), 60);
        let mismatch = ReconError::HeaderMismatch { index: 1, expected: vec![], found: vec![] };
        assert_eq!(recon_exit_code(&mismatch), 63);
        assert_eq!(recon_exit_code(&ReconError::TooFewInputs { given: 1 }), 2);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_RECON_CONFIG,
            EXIT_RECON_QUOTA,
            EXIT_RECON_GATE,
            EXIT_RECON_HEADERS,
        ];
        let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
