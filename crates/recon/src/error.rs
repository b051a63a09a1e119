use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Column mapping is unusable for a reason other than the amount.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Amount is not mapped on these sides.
    #[error(
        "configuration error: amount column not mapped for {}",
        .sides.iter().map(ToString::to_string).collect::<Vec<_>>().join(" and ")
    )]
    AmountNotMapped { sides: Vec<Side> },
    /// A mapped column does not exist in that side's record set.
    #[error("{side}: mapped column '{column}' not found")]
    MissingColumn { side: Side, column: String },
    /// Combining needs at least two record sets.
    #[error("combine needs at least two files, got {given}")]
    TooFewInputs { given: usize },
    /// A record set to combine has a different header than the first one.
    #[error(
        "header mismatch in file {index}: expected [{}], found [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    HeaderMismatch { index: usize, expected: Vec<String>, found: Vec<String> },
    /// The usage gate denied the run.
    #[error("usage limit reached ({used}/{limit} runs)")]
    QuotaExceeded { used: u32, limit: u32 },
    /// The usage gate could not be consulted or updated.
    #[error("usage gate error: {0}")]
    Gate(String),
}

impl ReconError {
    /// True for the configuration class of errors (caller fixes the mapping).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse(_)
                | Self::Configuration(_)
                | Self::AmountNotMapped { .. }
                | Self::MissingColumn { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_not_mapped_names_sides() {
        let err = ReconError::AmountNotMapped { sides: vec![Side::Bank, Side::Books] };
        assert_eq!(
            err.to_string(),
            "configuration error: amount column not mapped for bank and books"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn header_mismatch_lists_both_headers() {
        let err = ReconError::HeaderMismatch {
            index: 2,
            expected: vec!["Date".into(), "Amount".into()],
            found: vec!["Amount".into()],
        };
        assert_eq!(
            err.to_string(),
            "header mismatch in file 2: expected [Date, Amount], found [Amount]"
        );
        assert!(!err.is_configuration());
    }
}
