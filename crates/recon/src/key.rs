use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::config::{ActiveFields, ResolvedColumns};
use crate::model::{Record, RecordSet};
use crate::normalize::{normalize_amount, normalize_date, normalize_narration};

/// One normalized component of a composite match key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyComponent {
    Amount(Option<OrderedFloat<f64>>),
    Date(Option<NaiveDate>),
    Narration(String),
}

impl KeyComponent {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Amount(None) | Self::Date(None))
    }
}

/// Composite key, always ordered (amount, [date], [narration]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(Vec<KeyComponent>);

impl NormalizedKey {
    pub fn components(&self) -> &[KeyComponent] {
        &self.0
    }

    /// A key with a null component never equals another key for matching.
    pub fn is_matchable(&self) -> bool {
        !self.0.iter().any(KeyComponent::is_null)
    }
}

/// Build the key for one record from its side's resolved columns.
///
/// `active` decides which optional fields participate; a field the mapping
/// resolved but `active` disables is ignored.
pub fn build_key(record: &Record, columns: &ResolvedColumns, active: ActiveFields) -> NormalizedKey {
    let mut parts = Vec::with_capacity(3);

    let amount = normalize_amount(record.get(columns.amount)).map(OrderedFloat);
    parts.push(KeyComponent::Amount(amount));

    if active.date {
        let date = columns.date.and_then(|idx| normalize_date(record.get(idx)));
        parts.push(KeyComponent::Date(date));
    }

    if active.narration {
        let narration = columns
            .narration
            .map(|idx| normalize_narration(record.get(idx)))
            .unwrap_or_default();
        parts.push(KeyComponent::Narration(narration));
    }

    NormalizedKey(parts)
}

/// Keys for every row of `records`, in input order.
pub fn build_keys(records: &RecordSet, columns: &ResolvedColumns, active: ActiveFields) -> Vec<NormalizedKey> {
    records
        .rows
        .iter()
        .map(|row| build_key(row, columns, active))
        .collect()
}
