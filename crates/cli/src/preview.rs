//! Plain-text rendering of partition previews.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use bankrec_recon::Table;

/// Widest a preview column may get before cells are cut with "..".
const MAX_COLUMN_WIDTH: usize = 24;

/// Cut `s` to at most `width` display columns, ending in ".." when cut.
fn fit(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

fn pad(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(sw)))
}

/// Render the first `limit` rows of `table` under a `name (n rows)` title.
pub fn render_table(table: &Table, limit: usize) -> String {
    let shown = table.head(limit);
    let header: Vec<String> = shown.columns.iter().map(|c| fit(c, MAX_COLUMN_WIDTH)).collect();
    let rows: Vec<Vec<String>> = shown
        .rows
        .iter()
        .map(|row| row.iter().map(|c| fit(&c.to_string(), MAX_COLUMN_WIDTH)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| UnicodeWidthStr::width(h.as_str())).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = format!("{} ({} rows)\n", table.name, table.len());
    if table.is_empty() {
        return out;
    }
    out.push_str(&line(&header));
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    if table.len() > shown.len() {
        out.push_str(&format!("... {} more\n", table.len() - shown.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankrec_recon::Cell;

    fn table(rows: usize) -> Table {
        Table {
            name: "Bank_Only".into(),
            columns: vec!["Amount".into(), "Narration".into()],
            rows: (0..rows)
                .map(|i| vec![Cell::Number(i as f64), Cell::from(format!("row {i}"))])
                .collect(),
        }
    }

    #[test]
    fn fit_cuts_long_values() {
        assert_eq!(fit("abc", 5), "abc");
        assert_eq!(fit("abcdef", 5), "abc..");
        // "世界你好" is 8 display columns
        assert_eq!(fit("\u{4e16}\u{754c}\u{4f60}\u{597d}", 6), "\u{4e16}\u{754c}..");
    }

    #[test]
    fn renders_aligned_rows() {
        let out = render_table(&table(2), 50);
        assert_eq!(
            out,
            "Bank_Only (2 rows)\nAmount  Narration\n-----------------\n0       row 0\n1       row 1\n"
        );
    }

    #[test]
    fn truncates_to_limit() {
        let out = render_table(&table(5), 2);
        assert!(out.starts_with("Bank_Only (5 rows)\n"));
        assert!(out.contains("row 1"));
        assert!(!out.contains("row 2"));
        assert!(out.ends_with("... 3 more\n"));
    }

    #[test]
    fn empty_table_is_title_only() {
        assert_eq!(render_table(&table(0), 50), "Bank_Only (0 rows)\n");
    }
}
