use serde::Deserialize;

use crate::error::ReconError;
use crate::model::{RecordSet, Side};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Which column on one side supplies each key field.
///
/// An empty string counts as unmapped, the same as an absent entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SideColumns {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub narration: Option<String>,
}

impl SideColumns {
    pub fn amount(&self) -> Option<&str> {
        mapped(&self.amount)
    }

    pub fn date(&self) -> Option<&str> {
        mapped(&self.date)
    }

    pub fn narration(&self) -> Option<&str> {
        mapped(&self.narration)
    }
}

fn mapped(col: &Option<String>) -> Option<&str> {
    col.as_deref().map(str::trim).filter(|c| !c.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub bank: SideColumns,
    #[serde(default)]
    pub books: SideColumns,
}

/// Optional key fields participating in a run. Amount always participates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ActiveFields {
    pub date: bool,
    pub narration: bool,
}

impl ColumnMapping {
    pub fn side(&self, side: Side) -> &SideColumns {
        match side {
            Side::Bank => &self.bank,
            Side::Books => &self.books,
        }
    }

    /// Amount must be mapped on both sides.
    pub fn validate(&self) -> Result<(), ReconError> {
        let sides: Vec<Side> = [Side::Bank, Side::Books]
            .into_iter()
            .filter(|side| self.side(*side).amount().is_none())
            .collect();

        if !sides.is_empty() {
            return Err(ReconError::AmountNotMapped { sides });
        }
        Ok(())
    }

    /// Date / narration join the key only when mapped on both sides.
    pub fn active_fields(&self) -> ActiveFields {
        ActiveFields {
            date: self.bank.date().is_some() && self.books.date().is_some(),
            narration: self.bank.narration().is_some() && self.books.narration().is_some(),
        }
    }

    /// Resolve mapped column names to indices in `records`.
    pub fn resolve(
        &self,
        side: Side,
        records: &RecordSet,
        active: ActiveFields,
    ) -> Result<ResolvedColumns, ReconError> {
        let cols = self.side(side);
        let idx = |name: &str| -> Result<usize, ReconError> {
            records.column_index(name).ok_or_else(|| ReconError::MissingColumn {
                side,
                column: name.into(),
            })
        };

        let amount = match cols.amount() {
            Some(name) => idx(name)?,
            None => return Err(ReconError::AmountNotMapped { sides: vec![side] }),
        };
        let date = match cols.date() {
            Some(name) if active.date => Some(idx(name)?),
            _ => None,
        };
        let narration = match cols.narration() {
            Some(name) if active.narration => Some(idx(name)?),
            _ => None,
        };

        Ok(ResolvedColumns { amount, date, narration })
    }
}

/// Column indices for the active key fields of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub amount: usize,
    pub date: Option<usize>,
    pub narration: Option<usize>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_bank_suffix")]
    pub bank_suffix: String,
    #[serde(default = "default_books_suffix")]
    pub books_suffix: String,
}

fn default_preview_rows() -> usize {
    50
}

fn default_bank_suffix() -> String {
    "_bank".into()
}

fn default_books_suffix() -> String {
    "_books".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            bank_suffix: default_bank_suffix(),
            books_suffix: default_books_suffix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config = Self::parse(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Deserialize without validating, for callers that fill in columns
    /// (command-line overrides) before the run validates.
    pub fn parse(input: &str) -> Result<Self, ReconError> {
        toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.columns.validate()?;

        if self.output.bank_suffix == self.output.books_suffix {
            return Err(ReconError::Configuration(format!(
                "bank_suffix and books_suffix must differ (both '{}')",
                self.output.bank_suffix
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
