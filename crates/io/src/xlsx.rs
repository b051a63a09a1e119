// Workbook import (xlsx, xlsm, xls, xlsb, ods) and partition export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use tracing::debug;

use bankrec_recon::model::{Cell, RecordSet};
use bankrec_recon::normalize::serial_to_datetime;
use bankrec_recon::{ReconResult, Table};

use crate::error::IoError;
use crate::header::header_row;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Import one sheet as a record set: the named sheet, or the first one.
/// The first non-empty row of the sheet's used range is the header.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<RecordSet, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound {
                sheet: name.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names.first().cloned().ok_or_else(|| IoError::Workbook {
            path: path.to_path_buf(),
            message: "workbook contains no sheets".to_string(),
        })?,
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| IoError::Workbook {
        path: path.to_path_buf(),
        message: format!("failed to read sheet '{sheet_name}': {e}"),
    })?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect::<Vec<Cell>>())
        .skip_while(|cells| cells.iter().all(Cell::is_empty));

    let header = match rows.next() {
        Some(cells) => cells,
        None => return Ok(RecordSet::default()),
    };
    let columns = header_row(header.iter().map(|c| c.to_string()));
    let width = columns.len();
    let mut set = RecordSet::new(columns);

    for mut cells in rows {
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        cells.resize(width, Cell::Empty);
        set.push(cells);
    }

    debug!(sheet = %sheet_name, rows = set.len(), columns = width, "imported sheet");
    Ok(set)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        // TRUE/FALSE text, same as a spreadsheet shows it
        Data::Bool(b) => Cell::from(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(_) => Cell::Empty,
        // 1900 date system assumed
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match serial_to_datetime(serial) {
                Some(value) if value.time() == chrono::NaiveTime::MIN => Cell::Date(value.date()),
                Some(value) => Cell::DateTime(value),
                None => Cell::Number(serial),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
    }
}

/// Write the three partitions as sheets `Matched`, `Bank_Only` and
/// `Books_Only` of one workbook.
pub fn write_xlsx(result: &ReconResult, path: &Path) -> Result<(), IoError> {
    write_tables(&result.tables(), path)
}

/// One sheet per table, named after the table.
pub fn write_tables(tables: &[Table], path: &Path) -> Result<(), IoError> {
    let mut workbook = XlsxWorkbook::new();
    for table in tables {
        let worksheet = workbook.add_worksheet().set_name(&table.name)?;
        write_table(worksheet, table)?;
    }
    workbook.save(path)?;
    debug!(path = %path.display(), sheets = tables.len(), "wrote workbook");
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> Result<(), IoError> {
    let header = Format::new().set_bold();
    let date = Format::new().set_num_format(DATE_FORMAT);
    let datetime = Format::new().set_num_format(DATETIME_FORMAT);

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_num = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
                Cell::Number(n) if n.is_finite() => {
                    worksheet.write_number(row_num, col, *n)?;
                }
                Cell::Number(n) => {
                    worksheet.write_string(row_num, col, n.to_string())?;
                }
                Cell::Date(d) => {
                    worksheet.write_datetime_with_format(row_num, col, d, &date)?;
                }
                Cell::DateTime(dt) => {
                    worksheet.write_datetime_with_format(row_num, col, dt, &datetime)?;
                }
            }
        }
    }

    Ok(())
}
