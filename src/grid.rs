// Raw grid -> canonical table.
//
// The importer lets an editor pick a header row, a data row window and a set
// of columns over whatever the spreadsheet contained. `normalize` applies that
// choice, `auto_detect` guesses one when nothing was picked yet, and the
// `CleaningConfig` setters keep the choice consistent while it is edited.
use crate::types::{CanonicalTable, CleaningConfig, RawGrid, Selection};
use crate::util::{is_blank, is_numeric_cell};
use tracing::debug;

// Pairwise detection only looks at the top of the sheet.
const DETECT_SCAN_ROWS: usize = 10;

fn cell(row: &[String], col: usize) -> String {
    row.get(col).cloned().unwrap_or_default()
}

fn max_cols(grid: &[Vec<String>]) -> usize {
    grid.iter().map(|r| r.len()).max().unwrap_or(0)
}

/// Applies `config` to `grid`.
///
/// Returns `None` when the header row or data start row is unset, or when
/// the result has no header cells at all.
pub fn normalize(grid: &[Vec<String>], config: &CleaningConfig) -> Option<CanonicalTable> {
    let header_row = config.header_row?;
    let data_start = config.data_start_row?;

    let cols: Vec<usize> = match &config.included_columns {
        Some(cols) => cols.clone(),
        None => (0..max_cols(grid)).collect(),
    };

    let headers: Vec<String> = match grid.get(header_row) {
        Some(row) => cols.iter().map(|&c| cell(row, c)).collect(),
        None => cols.iter().map(|_| String::new()).collect(),
    };

    let end_row = config
        .data_end_row
        .unwrap_or_else(|| grid.len().saturating_sub(1));
    let data_rows: Vec<Vec<String>> = grid
        .iter()
        .enumerate()
        .filter(|(i, _)| *i >= data_start && *i <= end_row)
        .map(|(_, row)| cols.iter().map(|&c| cell(row, c)).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !is_blank(c)))
        .collect();

    let table = if config.transpose {
        transpose_table(headers, data_rows)
    } else {
        CanonicalTable { headers, data_rows }
    };

    if table.headers.is_empty() {
        debug!("normalized table has no header cells");
        return None;
    }
    debug!(
        columns = table.headers.len(),
        rows = table.data_rows.len(),
        transpose = config.transpose,
        "normalized grid"
    );
    Some(table)
}

/// Swaps rows and columns. Short rows are padded with `""` first, so the
/// result is rectangular.
pub fn transpose(matrix: &[Vec<String>]) -> Vec<Vec<String>> {
    let width = max_cols(matrix);
    (0..width)
        .map(|col| matrix.iter().map(|row| cell(row, col)).collect())
        .collect()
}

fn transpose_table(headers: Vec<String>, data_rows: Vec<Vec<String>>) -> CanonicalTable {
    let mut all = Vec::with_capacity(data_rows.len() + 1);
    all.push(headers);
    all.extend(data_rows);
    let mut transposed = transpose(&all).into_iter();
    CanonicalTable {
        headers: transposed.next().unwrap_or_default(),
        data_rows: transposed.collect(),
    }
}

/// Guesses header and data rows with a pairwise scan.
///
/// Row `i` is the header when it holds at least one text cell and row `i + 1`
/// holds at least one numeric cell; the first such pair within the first ten
/// rows wins. Never fails: an empty grid yields an empty config. Without a
/// text-over-numbers pair (e.g. a blank corner cell over year headers) the
/// first row is taken as the header, the second as the data start, and every
/// column of the widest row is included.
pub fn auto_detect(grid: &[Vec<String>]) -> CleaningConfig {
    if grid.is_empty() {
        return CleaningConfig::default();
    }

    let scan = grid.len().saturating_sub(1).min(DETECT_SCAN_ROWS);
    let detected = (0..scan).find(|&i| {
        let has_text = grid[i]
            .iter()
            .any(|c| !is_blank(c) && !is_numeric_cell(c));
        let next_has_numbers = grid[i + 1].iter().any(|c| is_numeric_cell(c));
        has_text && next_has_numbers
    });

    let (header_row, columns) = match detected {
        Some(h) => (h, grid[h].len()),
        None => (0, max_cols(grid)),
    };
    debug!(?detected, header_row, columns, "auto-detected data range");

    CleaningConfig {
        header_row: Some(header_row),
        data_start_row: Some(header_row + 1),
        data_end_row: Some(grid.len() - 1),
        included_columns: Some((0..columns).collect()),
        ..CleaningConfig::default()
    }
}

impl CleaningConfig {
    /// Moves the header row. The data start is pushed below it when needed.
    /// Out-of-range rows are ignored; returns whether anything changed.
    pub fn set_header_row(&mut self, row: usize, total_rows: usize) -> bool {
        if row >= total_rows {
            return false;
        }
        self.header_row = Some(row);
        if matches!(self.data_start_row, Some(start) if start <= row) {
            self.data_start_row = Some(row + 1);
        }
        true
    }

    /// Moves the first data row; it must stay below the header. The data end
    /// is pulled down to it when it would otherwise precede it.
    pub fn set_data_start(&mut self, row: usize, total_rows: usize) -> bool {
        if row >= total_rows {
            return false;
        }
        if matches!(self.header_row, Some(header) if row <= header) {
            return false;
        }
        self.data_start_row = Some(row);
        if matches!(self.data_end_row, Some(end) if end < row) {
            self.data_end_row = Some(row);
        }
        true
    }

    pub fn set_data_end(&mut self, row: usize, total_rows: usize) -> bool {
        if row >= total_rows {
            return false;
        }
        if matches!(self.data_start_row, Some(start) if row < start) {
            return false;
        }
        self.data_end_row = Some(row);
        true
    }

    /// Includes or excludes a column. The list stays sorted; an unset list is
    /// expanded to every column of the grid first.
    pub fn toggle_column(&mut self, col: usize, total_cols: usize) {
        let cols = self
            .included_columns
            .get_or_insert_with(|| (0..total_cols).collect());
        match cols.iter().position(|&c| c == col) {
            Some(pos) => {
                cols.remove(pos);
            }
            None => {
                cols.push(col);
                cols.sort_unstable();
            }
        }
    }

    /// Applies a drag selection. A single cell does nothing, a horizontal drag
    /// only picks columns, and a multi-row drag sets the whole window with the
    /// top row as the header.
    pub fn apply_selection(&mut self, sel: Selection) {
        let cols: Vec<usize> = (sel.start_col..=sel.end_col).collect();
        if sel.start_row == sel.end_row {
            if sel.start_col != sel.end_col {
                self.included_columns = Some(cols);
            }
            return;
        }
        self.header_row = Some(sel.start_row);
        self.data_start_row = Some(sel.start_row + 1);
        self.data_end_row = Some(sel.end_row);
        self.included_columns = Some(cols);
    }

    pub fn is_ready(&self) -> bool {
        self.header_row.is_some() && self.data_start_row.is_some()
    }
}

/// Owns a grid and its cleaning config and keeps the normalized table
/// around until one of them changes.
#[derive(Debug, Default)]
pub struct DataCleaner {
    grid: RawGrid,
    config: CleaningConfig,
    cached: Option<Option<CanonicalTable>>,
}

impl DataCleaner {
    pub fn new(grid: RawGrid, config: CleaningConfig) -> Self {
        Self {
            grid,
            config,
            cached: None,
        }
    }

    /// Starts from the auto-detected range.
    pub fn detect(grid: RawGrid) -> Self {
        let config = auto_detect(&grid);
        Self::new(grid, config)
    }

    pub fn grid(&self) -> &RawGrid {
        &self.grid
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    pub fn total_rows(&self) -> usize {
        self.grid.len()
    }

    pub fn total_cols(&self) -> usize {
        max_cols(&self.grid)
    }

    pub fn set_grid(&mut self, grid: RawGrid) {
        self.grid = grid;
        self.cached = None;
    }

    pub fn set_config(&mut self, config: CleaningConfig) {
        if config != self.config {
            self.config = config;
            self.cached = None;
        }
    }

    /// Edits the config in place; the cache is dropped only when the edit
    /// actually changed something.
    pub fn update_config<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut CleaningConfig),
    {
        let mut next = self.config.clone();
        edit(&mut next);
        self.set_config(next);
    }

    pub fn table(&mut self) -> Option<&CanonicalTable> {
        if self.cached.is_none() {
            self.cached = Some(normalize(&self.grid, &self.config));
        }
        self.cached.as_ref().and_then(|t| t.as_ref())
    }
}
