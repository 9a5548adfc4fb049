// Canonical table -> named series.
use crate::types::{CanonicalTable, ParsedSeries, Series};
use crate::util::{extract_year, is_blank, is_pure_number};
use std::collections::BTreeSet;
use tracing::debug;

// Longer "names" are whole spreadsheet rows pasted into the first cell.
const MAX_SERIES_NAME_LEN: usize = 50;

/// How the first row and first column of a table are read.
///
/// The chart builder always treats cell (0, 0) as the axis corner and column
/// 0 as series names ([`TableShape::LABELED`]). The series parser decides per
/// table with [`TableShape::infer`], which tolerates tables that have no
/// label column at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub label_column: bool,
}

impl TableShape {
    pub const LABELED: TableShape = TableShape { label_column: true };

    /// Column 0 holds names when its header is blank or its first data cell
    /// is not a plain number.
    pub fn infer(table: &CanonicalTable) -> Self {
        let first_header_empty = table.headers.first().map_or(true, |h| is_blank(h));
        let first_cell = table
            .data_rows
            .first()
            .and_then(|row| row.first())
            .map(String::as_str)
            .unwrap_or("");
        Self {
            label_column: first_header_empty || !is_pure_number(first_cell),
        }
    }
}

/// Reads `table` as series. Needs a header row and at least one data row.
pub fn parse(table: &CanonicalTable) -> Option<ParsedSeries> {
    if table.data_rows.is_empty() {
        return None;
    }
    let shape = TableShape::infer(table);
    debug!(label_column = shape.label_column, "parsing series");

    let (headers, series) = if shape.label_column {
        let headers = table.headers.iter().skip(1).cloned().collect();
        let series = table
            .data_rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let name = row.first().map(|s| s.as_str()).unwrap_or("");
                let name = if name.is_empty() {
                    "Serie".to_string()
                } else if name.chars().count() > MAX_SERIES_NAME_LEN {
                    format!("Serie {}", i + 1)
                } else {
                    name.to_string()
                };
                Series {
                    name,
                    values: row.iter().skip(1).cloned().collect(),
                }
            })
            .collect();
        (headers, series)
    } else {
        let series = table
            .data_rows
            .iter()
            .enumerate()
            .map(|(i, row)| Series {
                name: format!("Serie {}", i + 1),
                values: row.clone(),
            })
            .collect();
        (table.headers.clone(), series)
    };

    let available_years = available_years(&headers);
    Some(ParsedSeries {
        headers,
        series,
        available_years,
    })
}

/// Distinct years mentioned in the labels, ascending.
pub fn available_years<S: AsRef<str>>(labels: &[S]) -> Vec<i32> {
    labels
        .iter()
        .filter_map(|l| extract_year(l.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> CanonicalTable {
        CanonicalTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            data_rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn needs_a_data_row() {
        assert!(parse(&table(&["", "2020"], &[])).is_none());
    }

    #[test]
    fn label_column_from_blank_corner() {
        let p = parse(&table(&["", "2020", "2021"], &[&["10", "1", "2"]])).unwrap();
        assert_eq!(p.headers, vec!["2020", "2021"]);
        assert_eq!(p.series[0].name, "10");
        assert_eq!(p.series[0].values, vec!["1", "2"]);
        assert_eq!(p.available_years, vec![2020, 2021]);
    }

    #[test]
    fn label_column_from_text_cell() {
        let p = parse(&table(
            &["Concepto", "Ene 2021", "Feb 2021"],
            &[&["Ventas", "1", "2"], &["", "3", "4"]],
        ))
        .unwrap();
        assert_eq!(p.series[0].name, "Ventas");
        assert_eq!(p.series[1].name, "Serie");
        assert_eq!(p.available_years, vec![2021]);
    }

    #[test]
    fn numeric_prefix_is_still_a_label() {
        let shape = TableShape::infer(&table(&["Edad", "2020"], &[&["3 years", "5"]]));
        assert!(shape.label_column);
    }

    #[test]
    fn no_label_column_for_numeric_first_cell() {
        let p = parse(&table(&["2019", "2020"], &[&["1,200", "7"], &["3", "4"]])).unwrap();
        assert_eq!(p.headers, vec!["2019", "2020"]);
        assert_eq!(p.series[0].name, "Serie 1");
        assert_eq!(p.series[1].name, "Serie 2");
        assert_eq!(p.series[0].values, vec!["1,200", "7"]);
    }

    #[test]
    fn long_names_are_replaced() {
        let long = "x".repeat(51);
        let p = parse(&table(&["", "2020"], &[&["ok", "1"], &[long.as_str(), "2"]])).unwrap();
        assert_eq!(p.series[0].name, "ok");
        assert_eq!(p.series[1].name, "Serie 2");
    }

    #[test]
    fn years_are_deduplicated_and_sorted() {
        assert_eq!(
            available_years(&["2021", "T1 2019", "2021", "Total"]),
            vec![2019, 2021]
        );
    }
}
