// File I/O: load record sets, export reconciliation partitions

pub mod csv;
mod error;
mod header;
pub mod xlsx;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use bankrec_recon::model::RecordSet;
use bankrec_recon::{ReconResult, Table};
use tracing::info;

pub use csv::write_csv_dir;
pub use error::IoError;
pub use xlsx::{write_tables, write_xlsx};

/// Supported input and output file kinds, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// csv, tsv, txt
    Delimited,
    /// xlsx, xlsm, xls, xlsb, ods
    Workbook,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Delimited),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Workbook sheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    /// Delimiter for text files; sniffed when unset (`.tsv` defaults to tab).
    pub delimiter: Option<u8>,
}

/// Load one side of a reconciliation from disk.
pub fn load_record_set(path: &Path, options: &LoadOptions) -> Result<RecordSet, IoError> {
    let format = FileFormat::from_path(path)
        .ok_or_else(|| IoError::UnsupportedFormat { path: path.to_path_buf() })?;

    let set = match format {
        FileFormat::Delimited => {
            let is_tsv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
            let delimiter = options.delimiter.or(is_tsv.then_some(b'\t'));
            csv::import(path, delimiter)?
        }
        FileFormat::Workbook => xlsx::import(path, options.sheet.as_deref())?,
    };

    info!(
        path = %path.display(),
        rows = set.len(),
        columns = set.columns.len(),
        "loaded record set"
    );
    Ok(set)
}

/// Export the partitions: a workbook when `target` ends in a workbook
/// extension, otherwise a directory of three CSV files.
pub fn export_result(result: &ReconResult, target: &Path) -> Result<(), IoError> {
    match FileFormat::from_path(target) {
        Some(FileFormat::Workbook) => write_xlsx(result, target),
        Some(FileFormat::Delimited) => Err(IoError::UnsupportedFormat { path: target.to_path_buf() }),
        None => write_csv_dir(result, target),
    }
}

/// Write a single table: a one-sheet workbook, or a CSV file for a
/// delimited extension.
pub fn export_table(table: &Table, target: &Path) -> Result<(), IoError> {
    match FileFormat::from_path(target) {
        Some(FileFormat::Workbook) => write_tables(std::slice::from_ref(table), target),
        Some(FileFormat::Delimited) => csv::export_table(table, target),
        None => Err(IoError::UnsupportedFormat { path: target.to_path_buf() }),
    }
}

/// Make sure an export to `target` can be written before any work is done.
///
/// A file target needs an existing parent directory and must not itself be
/// a directory; a target without an extension is a directory and is created.
pub fn prepare_output(target: &Path) -> Result<(), IoError> {
    let not_writable = |kind: ErrorKind, msg: &str| IoError::Write {
        path: target.to_path_buf(),
        source: std::io::Error::new(kind, msg.to_string()),
    };

    if FileFormat::from_path(target).is_none() {
        return fs::create_dir_all(target)
            .map_err(|source| IoError::Write { path: target.to_path_buf(), source });
    }

    if target.is_dir() {
        return Err(not_writable(ErrorKind::AlreadyExists, "a directory is in the way"));
    }
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(not_writable(ErrorKind::NotFound, "parent is not a directory"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")), Some(FileFormat::Delimited));
        assert_eq!(FileFormat::from_path(Path::new("a.tsv")), Some(FileFormat::Delimited));
        assert_eq!(FileFormat::from_path(Path::new("a.xlsx")), Some(FileFormat::Workbook));
        assert_eq!(FileFormat::from_path(Path::new("a.ods")), Some(FileFormat::Workbook));
        assert_eq!(FileFormat::from_path(Path::new("a.pdf")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_unsupported_input() {
        let err = load_record_set(Path::new("statement.pdf"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_tsv_defaults_to_tab() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bank.tsv");
        fs::write(&path, "Amount\tNarration\n10\trent, march\n").unwrap();
        let set = load_record_set(&path, &LoadOptions::default()).unwrap();
        assert_eq!(set.columns, vec!["Amount", "Narration"]);
        assert_eq!(set.len(), 1);
    }

    fn bank_vs_books(dir: &Path) -> ReconResult {
        let bank = dir.join("bank.csv");
        let books = dir.join("books.csv");
        fs::write(&bank, "Date,Amount,Narration\n2024-01-05,100,Rent\n2024-01-06,25,Fee\n").unwrap();
        fs::write(&books, "Posted;Debit\n05/01/2024;-100\n07/01/2024;40\n").unwrap();

        let config = bankrec_recon::ReconConfig::from_toml(
            "[bank]\namount = \"Amount\"\n[books]\namount = \"Debit\"\n",
        )
        .unwrap();
        let input = bankrec_recon::ReconInput {
            bank: load_record_set(&bank, &LoadOptions::default()).unwrap(),
            books: load_record_set(&books, &LoadOptions::default()).unwrap(),
        };
        bankrec_recon::run(&config, input, &mut bankrec_recon::Unmetered).unwrap()
    }

    #[test]
    fn test_export_csv_dir() {
        let dir = tempdir().unwrap();
        let result = bank_vs_books(dir.path());
        let out = dir.path().join("out");
        export_result(&result, &out).unwrap();

        let matched = fs::read_to_string(out.join(csv::MATCHED_CSV)).unwrap();
        assert_eq!(matched, "Date,Amount,Narration,Posted,Debit\n2024-01-05,100,Rent,05/01/2024,-100\n");
        let bank_only = fs::read_to_string(out.join(csv::BANK_ONLY_CSV)).unwrap();
        assert_eq!(bank_only, "Date,Amount,Narration\n2024-01-06,25,Fee\n");
        let books_only = fs::read_to_string(out.join(csv::BOOKS_ONLY_CSV)).unwrap();
        assert_eq!(books_only, "Posted,Debit\n07/01/2024,40\n");
    }

    #[test]
    fn test_export_rejects_csv_file_target() {
        let dir = tempdir().unwrap();
        let result = bank_vs_books(dir.path());
        let err = export_result(&result, &dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_prepare_output_creates_directory() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("runs").join("march");
        prepare_output(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_prepare_output_checks_file_parent() {
        let dir = tempdir().unwrap();
        prepare_output(&dir.path().join("result.xlsx")).unwrap();

        let blocker = dir.path().join("plain");
        fs::write(&blocker, "not a directory").unwrap();
        let err = prepare_output(&blocker.join("result.xlsx")).unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));

        let err = prepare_output(&dir.path().join("missing").join("combined.csv")).unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));
    }

    #[test]
    fn test_prepare_output_rejects_directory_named_like_a_file() {
        let dir = tempdir().unwrap();
        let taken = dir.path().join("result.xlsx");
        fs::create_dir(&taken).unwrap();
        assert!(prepare_output(&taken).is_err());
    }

    #[test]
    fn test_export_single_table() {
        let dir = tempdir().unwrap();
        let table = Table {
            name: "Combined".into(),
            columns: vec!["Amount".into()],
            rows: vec![vec![bankrec_recon::Cell::from("10")]],
        };
        let path = dir.path().join("combined.csv");
        export_table(&table, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Amount\n10\n");

        let err = export_table(&table, &dir.path().join("combined")).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_explicit_delimiter_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bank.txt");
        fs::write(&path, "Amount|Memo\n1|a\n").unwrap();
        let options = LoadOptions { delimiter: Some(b'|'), ..Default::default() };
        let set = load_record_set(&path, &options).unwrap();
        assert_eq!(set.columns, vec!["Amount", "Memo"]);
    }
}
