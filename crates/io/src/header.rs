// Header row cleanup shared by the CSV and workbook loaders

use std::collections::HashSet;

/// Trim header names, name blanks `Unnamed: N` and make repeats unique by
/// appending `.1`, `.2`, ... so every mapped column resolves to one index.
pub(crate) fn header_row(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (idx, name) in raw.into_iter().enumerate() {
        let name = name.trim();
        let base = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_string()
        };

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
