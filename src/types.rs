use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Rows of untyped cells as they come out of a spreadsheet or CSV reader.
/// Rows may have different lengths; a missing cell reads as `""`.
pub type RawGrid = Vec<Vec<String>>;

/// Which part of a [`RawGrid`] becomes the table, as edited in the importer.
///
/// Row and column values are zero-based indices into the raw grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleaningConfig {
    pub header_row: Option<usize>,
    pub data_start_row: Option<usize>,
    /// Inclusive; `None` means "through the last row".
    pub data_end_row: Option<usize>,
    /// `None` means every column of the grid.
    pub included_columns: Option<Vec<usize>>,
    pub transpose: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
}

/// A rectangle dragged over the raw grid. Corners may come in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Selection {
    pub fn new(anchor: (usize, usize), cursor: (usize, usize)) -> Self {
        Self {
            start_row: anchor.0.min(cursor.0),
            start_col: anchor.1.min(cursor.1),
            end_row: anchor.0.max(cursor.0),
            end_col: anchor.1.max(cursor.1),
        }
    }
}

/// Header row plus aligned data rows, after row/column selection and the
/// optional transpose. Every data row has `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTable {
    pub headers: Vec<String>,
    pub data_rows: Vec<Vec<String>>,
}

impl CanonicalTable {
    /// Builds a table from stored rows (header row first), padding every row
    /// to the widest one. Returns `None` for an empty row list.
    pub fn from_rows(rows: &[Vec<String>]) -> Option<Self> {
        let (first, rest) = rows.split_first()?;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let pad = |row: &Vec<String>| {
            let mut row = row.clone();
            row.resize(width, String::new());
            row
        };
        Some(Self {
            headers: pad(first),
            data_rows: rest.iter().map(pad).collect(),
        })
    }

    /// Header row first, then data rows: the shape the CMS stores.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(self.headers.clone())
            .chain(self.data_rows.iter().cloned())
            .collect()
    }

    /// Header row included.
    pub fn row_count(&self) -> usize {
        self.data_rows.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<String>,
}

/// A table read as named series over shared category labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSeries {
    pub headers: Vec<String>,
    pub series: Vec<Series>,
    /// Distinct years found in `headers`, ascending.
    pub available_years: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Doughnut,
    Pie,
    HorizontalBar,
    Radar,
    #[serde(other)]
    Other,
}

impl ChartKind {
    pub fn is_segmented(&self) -> bool {
        matches!(self, ChartKind::Doughnut | ChartKind::Pie)
    }

    pub fn supports_combo(&self) -> bool {
        matches!(self, ChartKind::Bar | ChartKind::Line)
    }
}

impl FromStr for ChartKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "bar" => ChartKind::Bar,
            "line" => ChartKind::Line,
            "doughnut" => ChartKind::Doughnut,
            "pie" => ChartKind::Pie,
            "horizontalBar" => ChartKind::HorizontalBar,
            "radar" => ChartKind::Radar,
            _ => ChartKind::Other,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Line,
    #[default]
    Bar,
}

/// Per-series override for combo charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStyle {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "tipoSerie", default)]
    pub series_type: Option<SeriesType>,
    #[serde(default)]
    pub color: Option<String>,
}

/// One color for the whole dataset, or one per data point (pie segments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Solid(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub series_type: Option<SeriesType>,
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Fill,
    pub border_color: String,
    pub border_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_background_color: Option<String>,
    /// Draw order; lower values are drawn on top.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// Renderer-ready chart input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    /// No dataset survived the all-zero filter; callers show the
    /// "fill in the table" placeholder.
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

/// The five reference points used to brief the voice agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyDataPoints {
    #[serde(rename = "actual")]
    pub latest: Option<DataPoint>,
    #[serde(rename = "previo")]
    pub previous: Option<DataPoint>,
    #[serde(rename = "anioAnterior")]
    pub year_ago: Option<DataPoint>,
    #[serde(rename = "maximo")]
    pub max: Option<DataPoint>,
    #[serde(rename = "minimo")]
    pub min: Option<DataPoint>,
}

impl KeyDataPoints {
    pub fn is_empty(&self) -> bool {
        self.latest.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "creciente")]
    Rising,
    #[serde(rename = "decreciente")]
    Falling,
    #[serde(rename = "estable")]
    Stable,
    #[serde(rename = "variable")]
    Variable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "creciente",
            Trend::Falling => "decreciente",
            Trend::Stable => "estable",
            Trend::Variable => "variable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStats {
    pub max: f64,
    pub max_label: String,
    pub min: f64,
    pub min_label: String,
    pub avg: f64,
    pub trend: Trend,
    pub total_data_points: usize,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub stats: Option<ChartStats>,
    #[serde(rename = "keyDataPoints")]
    pub key_data_points: KeyDataPoints,
    #[serde(rename = "availableYears")]
    pub available_years: Vec<i32>,
}

#[derive(Debug, Tabled, Clone)]
pub struct KeyPointRow {
    #[tabled(rename = "Dato")]
    pub point: String,
    #[tabled(rename = "Etiqueta")]
    pub label: String,
    #[tabled(rename = "Valor")]
    pub value: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DatasetRow {
    #[tabled(rename = "Serie")]
    pub label: String,
    #[tabled(rename = "Tipo")]
    pub kind: String,
    #[tabled(rename = "Color")]
    pub color: String,
    #[tabled(rename = "Puntos")]
    pub points: usize,
    #[tabled(rename = "Total")]
    pub total: String,
}
