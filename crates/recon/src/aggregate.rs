//! Result aggregation: summary counts and the three partitions as tables.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Cell, PairMatchOutput, ReconMeta, ReconResult, ReconSummary, RecordSet};

pub const MATCHED_TABLE: &str = "Matched";
pub const BANK_ONLY_TABLE: &str = "Bank_Only";
pub const BOOKS_ONLY_TABLE: &str = "Books_Only";

/// Count the partitions. No recomputation, just a view over matcher output.
pub fn compute_summary(output: &PairMatchOutput, bank_total: usize, books_total: usize) -> ReconSummary {
    ReconSummary {
        matched: output.matched.len(),
        bank_only: output.bank_only.len(),
        books_only: output.books_only.len(),
        bank_total,
        books_total,
        bank_unmatchable: output.bank_unmatchable,
        books_unmatchable: output.books_unmatchable,
    }
}

/// A rendered partition: header plus rows of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// Serializable view of a run: meta, summary and all three tables.
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matched: Table,
    pub bank_only: Table,
    pub books_only: Table,
}

impl ReconResult {
    pub fn summary(&self) -> &ReconSummary {
        &self.summary
    }

    /// Matched pairs as (bank row, books row) references, bank input order.
    pub fn matched_rows(&self) -> impl Iterator<Item = (&[Cell], &[Cell])> + '_ {
        self.partitions.matched.iter().map(|p| {
            (
                self.bank.rows[p.bank].cells.as_slice(),
                self.books.rows[p.books].cells.as_slice(),
            )
        })
    }

    pub fn bank_only_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.partitions
            .bank_only
            .iter()
            .map(|&i| self.bank.rows[i].cells.as_slice())
    }

    pub fn books_only_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.partitions
            .books_only
            .iter()
            .map(|&i| self.books.rows[i].cells.as_slice())
    }

    /// Bank columns then books columns; names present on both sides get the
    /// configured suffixes.
    pub fn matched_table(&self) -> Table {
        let columns = merged_columns(
            &self.bank.columns,
            &self.books.columns,
            &self.bank_suffix,
            &self.books_suffix,
        );
        let bank_width = self.bank.columns.len();
        let books_width = self.books.columns.len();

        let rows = self
            .matched_rows()
            .map(|(bank, books)| {
                let mut row = padded(bank, bank_width);
                row.extend(padded(books, books_width));
                row
            })
            .collect();

        Table { name: MATCHED_TABLE.into(), columns, rows }
    }

    pub fn bank_only_table(&self) -> Table {
        only_table(BANK_ONLY_TABLE, &self.bank, self.bank_only_rows())
    }

    pub fn books_only_table(&self) -> Table {
        only_table(BOOKS_ONLY_TABLE, &self.books, self.books_only_rows())
    }

    /// All three partitions in export order.
    pub fn tables(&self) -> [Table; 3] {
        [self.matched_table(), self.bank_only_table(), self.books_only_table()]
    }

    pub fn report(&self) -> ReconReport {
        let [matched, bank_only, books_only] = self.tables();
        ReconReport {
            meta: self.meta.clone(),
            summary: self.summary,
            matched,
            bank_only,
            books_only,
        }
    }
}

fn only_table<'a>(name: &str, side: &RecordSet, rows: impl Iterator<Item = &'a [Cell]>) -> Table {
    let width = side.columns.len();
    Table {
        name: name.into(),
        columns: side.columns.clone(),
        rows: rows.map(|r| padded(r, width)).collect(),
    }
}

pub(crate) fn padded(cells: &[Cell], width: usize) -> Vec<Cell> {
    let mut row: Vec<Cell> = cells.iter().take(width).cloned().collect();
    row.resize(width, Cell::Empty);
    row
}

fn merged_columns(bank: &[String], books: &[String], bank_suffix: &str, books_suffix: &str) -> Vec<String> {
    let bank_set: HashSet<&str> = bank.iter().map(String::as_str).collect();
    let books_set: HashSet<&str> = books.iter().map(String::as_str).collect();

    let bank_cols = bank.iter().map(|c| {
        if books_set.contains(c.as_str()) {
            format!("{c}{bank_suffix}")
        } else {
            c.clone()
        }
    });
    let books_cols = books.iter().map(|c| {
        if bank_set.contains(c.as_str()) {
            format!("{c}{books_suffix}")
        } else {
            c.clone()
        }
    });
    unique_names(bank_cols.chain(books_cols))
}

/// Suffixing can land on a name that already exists (`Amount` suffixed to
/// `Amount_bank` next to a real `Amount_bank`). Later repeats get `.1`,
/// `.2`, ... the same way loaded headers are de-duplicated.
fn unique_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let names: Vec<String> = names.into_iter().collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());

    for base in names {
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
