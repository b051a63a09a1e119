//! Cell normalization: raw cell values into comparable key components.
//!
//! Every function here is total. A cell that cannot be read yields `None`
//! (or `""` for narration) rather than an error, so one malformed cell never
//! aborts a batch.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::model::Cell;

/// Spreadsheet serial day 0 (1900 date system).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y%m%d",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %b %y",
    "%d-%b-%y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Absolute numeric value of `cell`. Sign is dropped so a deposit recorded
/// as `100` on one side and `-100` on the other compare equal.
pub fn normalize_amount(cell: &Cell) -> Option<f64> {
    let n = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        Cell::Empty | Cell::Date(_) | Cell::DateTime(_) => return None,
    };
    n.is_finite().then(|| n.abs())
}

/// Calendar date of `cell`, time of day discarded.
pub fn normalize_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(n) => serial_to_datetime(*n).map(|dt| dt.date()),
        Cell::Text(s) => parse_date_text(s.trim()),
        Cell::Empty => None,
    }
}

/// Lowercased, trimmed narration. Blank cells collapse to `""`.
pub fn normalize_narration(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.to_lowercase().trim().to_string(),
        other => other.to_string().to_lowercase().trim().to_string(),
    }
}

/// Convert a spreadsheet serial (days since 1899-12-30, fraction = time).
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let millis = (serial.fract() * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    if let Some(d) = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(plausible_year)
    {
        return Some(d);
    }

    if let Some(d) = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .find(plausible_year)
    {
        return Some(d);
    }

    // Offsets keep the local calendar date as written.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    OFFSET_FORMATS
        .iter()
        .filter_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.naive_local().date())
        .find(plausible_year)
}

/// `%Y` accepts one to four digits, so `01/05/24` would otherwise read as
/// the year 24 under a four-digit-year format.
fn plausible_year(d: &NaiveDate) -> bool {
    (1000..=9999).contains(&d.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn amount_sign_invariant() {
        assert_eq!(normalize_amount(&Cell::Number(100.0)), Some(100.0));
        assert_eq!(normalize_amount(&Cell::Number(-100.0)), Some(100.0));
        assert_eq!(normalize_amount(&Cell::from("-100")), Some(100.0));
        assert_eq!(
            normalize_amount(&Cell::from("-100")),
            normalize_amount(&Cell::Number(100.0))
        );
    }

    #[test]
    fn amount_text_forms() {
        assert_eq!(normalize_amount(&Cell::from(" 500.00 ")), Some(500.0));
        assert_eq!(normalize_amount(&Cell::from("1e3")), Some(1000.0));
        assert_eq!(normalize_amount(&Cell::from("+12.5")), Some(12.5));
    }

    #[test]
    fn amount_failures_are_none() {
        assert_eq!(normalize_amount(&Cell::Empty), None);
        assert_eq!(normalize_amount(&Cell::from("abc")), None);
        assert_eq!(normalize_amount(&Cell::from("1,234.00")), None);
        assert_eq!(normalize_amount(&Cell::from("NaN")), None);
        assert_eq!(normalize_amount(&Cell::from("inf")), None);
        assert_eq!(normalize_amount(&Cell::Date(date(2024, 1, 5))), None);
    }

    #[test]
    fn negative_zero_is_zero() {
        let a = normalize_amount(&Cell::Number(-0.0)).unwrap();
        assert_eq!(a.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn date_truncates_time() {
        let dt = date(2024, 1, 5).and_hms_opt(17, 45, 0).unwrap();
        assert_eq!(normalize_date(&Cell::DateTime(dt)), Some(date(2024, 1, 5)));
        assert_eq!(
            normalize_date(&Cell::from("2024-01-05 23:59:59")),
            Some(date(2024, 1, 5))
        );
        assert_eq!(
            normalize_date(&Cell::from("2024-01-05T08:30:00.250")),
            Some(date(2024, 1, 5))
        );
    }

    #[test]
    fn date_text_forms() {
        let want = Some(date(2024, 1, 5));
        for s in [
            "2024-01-05",
            "2024/01/05",
            "01/05/2024",
            "1/5/2024",
            "01/05/24",
            "20240105",
            "05 Jan 2024",
            "05-Jan-2024",
            "5-Jan-24",
            "05 Jan 24",
            "Jan 05, 2024",
            "January 5, 2024",
            " 2024-01-05 ",
            "01/05/2024 3:15 PM",
        ] {
            assert_eq!(normalize_date(&Cell::from(s)), want, "input {s:?}");
        }
    }

    #[test]
    fn date_with_offset_keeps_local_date() {
        assert_eq!(
            normalize_date(&Cell::from("2024-01-05T23:30:00-05:00")),
            Some(date(2024, 1, 5))
        );
    }

    #[test]
    fn date_from_serial() {
        // 45296 = 2024-01-05
        assert_eq!(normalize_date(&Cell::Number(45296.0)), Some(date(2024, 1, 5)));
        assert_eq!(normalize_date(&Cell::Number(45296.75)), Some(date(2024, 1, 5)));
        assert_eq!(normalize_date(&Cell::Number(0.0)), None);
        assert_eq!(normalize_date(&Cell::Number(-3.0)), None);
        assert_eq!(normalize_date(&Cell::Number(f64::NAN)), None);
    }

    #[test]
    fn date_failures_are_none() {
        assert_eq!(normalize_date(&Cell::Empty), None);
        assert_eq!(normalize_date(&Cell::from("not a date")), None);
        assert_eq!(normalize_date(&Cell::from("2024-13-45")), None);
    }

    #[test]
    fn serial_time_of_day() {
        let dt = serial_to_datetime(45296.5).unwrap();
        assert_eq!(dt, date(2024, 1, 5).and_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn narration_case_and_whitespace() {
        assert_eq!(normalize_narration(&Cell::from("  Rent Payment  ")), "rent payment");
        assert_eq!(normalize_narration(&Cell::from("rent payment")), "rent payment");
        assert_eq!(normalize_narration(&Cell::from("salary ")), "salary");
    }

    #[test]
    fn narration_blank_is_empty_string() {
        assert_eq!(normalize_narration(&Cell::Empty), "");
        assert_eq!(normalize_narration(&Cell::from("   ")), "");
    }

    #[test]
    fn narration_of_number_uses_display() {
        assert_eq!(normalize_narration(&Cell::Number(42.0)), "42");
    }
}
