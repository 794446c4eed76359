//! Human-readable text forms for the file backend.

use std::collections::BTreeSet;

use docsift_core::Table;

/// Cell separator within a table row.
pub const CELL_SEPARATOR: &str = " | ";

/// Text units, one per line.
pub fn render_text(units: &[String]) -> String {
    lines(units)
}

/// URLs in sorted order, one per line.
pub fn render_urls(urls: &BTreeSet<String>) -> String {
    lines(urls)
}

/// Tables with cells joined by `" | "`, separated by a blank line.
pub fn render_tables(tables: &[Table]) -> String {
    tables
        .iter()
        .map(|table| lines(table.rows.iter().map(|row| row.join(CELL_SEPARATOR))))
        .collect::<Vec<_>>()
        .join("\n")
}

fn lines<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(item.as_ref());
        out.push('\n');
    }
    out
}
