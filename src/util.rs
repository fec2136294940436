// Small helpers for cell canonicalization and console formatting.
//
// The sheet is typed by hand, so statuses show up with stray spaces, mixed
// case and "nan" placeholders left by previous exports. Everything that
// turns such a cell into a comparable value lives here.
use crate::types::Cell;
use num_format::{Locale, ToFormattedString};

/// Canonical form of a textual cell: trimmed and upper-cased, or `None`
/// for blanks, error cells and the literal "nan" placeholder.
pub fn canonical_text(cell: &Cell) -> Option<String> {
    let raw = match cell {
        Cell::Empty | Cell::Error(_) => return None,
        other => other.to_string(),
    };
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(s.to_uppercase())
}

/// Header label for a cell of the promoted header row.
pub fn header_label(cell: &Cell) -> String {
    cell.to_string().trim().to_string()
}

/// Render an optional value for display, using a dash for missing ones.
pub fn or_dash(v: Option<&str>) -> String {
    v.unwrap_or("—").to_string()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate)
}
