use crate::error::Result;
use crate::types::RawGrid;
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub max_cols: usize,
    pub blank_rows: usize,
    pub delimiter: u8,
}

/// Picks the delimiter that appears most often and most consistently in
/// the first lines.
pub fn detect_delimiter(content: &str) -> u8 {
    let lines: Vec<&str> = content.lines().take(SNIFF_LINES).collect();
    if lines.is_empty() {
        return b',';
    }
    let mut best = (b',', 0.0f64);
    for &delimiter in &DELIMITERS {
        let counts: Vec<f64> = lines
            .iter()
            .map(|l| l.bytes().filter(|&b| b == delimiter).count() as f64)
            .collect();
        let avg = crate::util::average(&counts);
        let score = avg / (1.0 + crate::util::std_dev(&counts));
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}

/// Reads CSV text into a grid. No row is treated as a header and ragged
/// rows are kept as they are; cell types are left alone.
pub fn read_grid(content: &str) -> Result<(RawGrid, LoadReport)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = detect_delimiter(content);
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut grid: RawGrid = Vec::new();
    let mut blank_rows = 0usize;
    for result in rdr.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if row.iter().all(|c| c.trim().is_empty()) {
            blank_rows += 1;
        }
        grid.push(row);
    }

    let report = LoadReport {
        total_rows: grid.len(),
        max_cols: grid.iter().map(|r| r.len()).max().unwrap_or(0),
        blank_rows,
        delimiter,
    };
    Ok((grid, report))
}

/// Decodes file bytes as UTF-8, falling back to Windows-1252 (a superset of
/// Latin-1, common in spreadsheet exports) when they are not valid UTF-8.
pub fn decode_bytes(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            debug!("input is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Loads a CSV file, decoded with [`decode_bytes`].
pub fn load_grid(path: &Path) -> Result<(RawGrid, LoadReport)> {
    let bytes = fs::read(path)?;
    let content = decode_bytes(bytes);
    let (grid, report) = read_grid(&content)?;
    info!(
        path = %path.display(),
        rows = report.total_rows,
        cols = report.max_cols,
        "loaded grid"
    );
    Ok((grid, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_delimiters() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\n1,5;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\n1\t2"), b'\t');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn keeps_ragged_rows_and_blank_lines() {
        let (grid, report) = read_grid("\u{feff}Indicador,2020,2021\nPIB,100\n,,\n").unwrap();
        assert_eq!(grid[0], vec!["Indicador", "2020", "2021"]);
        assert_eq!(grid[1], vec!["PIB", "100"]);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.max_cols, 3);
        assert_eq!(report.blank_rows, 1);
    }

    #[test]
    fn quoted_thousands_stay_in_one_cell() {
        let (grid, _) = read_grid("Municipio,Total\nLerdo,\"1,250\"\n").unwrap();
        assert_eq!(grid[1][1], "1,250");
    }

    #[test]
    fn latin1_export_keeps_accents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        std::fs::write(&path, b"Indicador;A\xf1o 2020\nPoblaci\xf3n;10\n").unwrap();
        let (grid, report) = load_grid(&path).unwrap();
        assert_eq!(report.delimiter, b';');
        assert_eq!(grid[0], vec!["Indicador", "Año 2020"]);
        assert_eq!(grid[1][0], "Población");
        assert_eq!(decode_bytes("Año".as_bytes().to_vec()), "Año");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_grid(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
