// CSV/TSV import and partition export

use std::fs;
use std::io::Read;
use std::path::Path;

use bankrec_recon::model::{Cell, RecordSet};
use bankrec_recon::{ReconResult, Table};

use crate::error::IoError;
use crate::header::header_row;

pub const MATCHED_CSV: &str = "matched.csv";
pub const BANK_ONLY_CSV: &str = "bank_only.csv";
pub const BOOKS_ONLY_CSV: &str = "books_only.csv";

/// Load a delimited file; the delimiter is sniffed unless given.
pub fn import(path: &Path, delimiter: Option<u8>) -> Result<RecordSet, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    import_from_str(&content, delimiter)
}

/// Pick the candidate (tab, semicolon, comma, pipe) that splits the first
/// lines into the most consistent number of fields (>1).
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();

    let field_count = |line: &str, delim: u8| -> usize {
        csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes())
            .records()
            .next()
            .and_then(|r| r.ok())
            .map(|r| r.len())
            .unwrap_or(1)
    };

    let mut best = b',';
    let mut best_score = 0u64;
    for &delim in candidates {
        let counts: Vec<usize> = sample.iter().map(|line| field_count(line, delim)).collect();
        let first = counts.first().copied().unwrap_or(0);
        if first <= 1 {
            continue;
        }
        let consistent = counts.iter().filter(|&&c| c == first).count() as u64;
        let score = consistent * first as u64;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }
    best
}

/// Read file and convert to UTF-8 if needed (Windows-1252 fallback).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut bytes = Vec::new();
    fs::File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_str(content: &str, delimiter: u8) -> Result<RecordSet, IoError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Ok(RecordSet::default()),
    };
    let columns = header_row(header.iter().map(str::to_string));
    let width = columns.len();
    let mut set = RecordSet::new(columns);

    for record in records {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut cells: Vec<Cell> = record.iter().take(width).map(Cell::from).collect();
        cells.resize(width, Cell::Empty);
        set.push(cells);
    }

    Ok(set)
}

/// Write one table with its header row.
pub fn export_table(table: &Table, path: &Path) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    writer.flush().map_err(|source| IoError::Write { path: path.to_path_buf(), source })?;
    Ok(())
}

/// Write the three partitions as `matched.csv`, `bank_only.csv` and
/// `books_only.csv` inside `dir` (created if missing).
pub fn write_csv_dir(result: &ReconResult, dir: &Path) -> Result<(), IoError> {
    fs::create_dir_all(dir).map_err(|source| IoError::Write { path: dir.to_path_buf(), source })?;
    let [matched, bank_only, books_only] = result.tables();
    export_table(&matched, &dir.join(MATCHED_CSV))?;
    export_table(&bank_only, &dir.join(BANK_ONLY_CSV))?;
    export_table(&books_only, &dir.join(BOOKS_ONLY_CSV))?;
    Ok(())
}
