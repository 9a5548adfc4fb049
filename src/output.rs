use crate::error::Result;
use crate::types::CanonicalTable;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Writes the canonical table as CSV, header row first.
pub fn write_table_csv(path: &Path, table: &CanonicalTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in table.to_rows() {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)?;
    Ok(())
}

/// Markdown rendering of the header plus the first `max_rows` data rows.
pub fn render_table(table: &CanonicalTable, max_rows: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().cloned());
    for row in table.data_rows.iter().take(max_rows) {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_table(table: &CanonicalTable, max_rows: usize) {
    println!("{}", render_table(table, max_rows));
    if table.data_rows.len() > max_rows {
        println!("({} more rows)", table.data_rows.len() - max_rows);
    }
    println!();
}

/// Markdown rendering of the first `max_rows` typed rows; `None` when there
/// is nothing to show.
pub fn render_rows<T: Tabled + Clone>(rows: &[T], max_rows: usize) -> Option<String> {
    if rows.is_empty() || max_rows == 0 {
        return None;
    }
    let shown = rows.iter().take(max_rows).cloned();
    Some(Table::new(shown).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T: Tabled + Clone>(rows: &[T], max_rows: usize) {
    match render_rows(rows, max_rows) {
        Some(text) => println!("{}", text),
        None => println!("(no rows)"),
    }
    if rows.len() > max_rows {
        println!("({} more rows)", rows.len() - max_rows);
    }
    println!();
}
