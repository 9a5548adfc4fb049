// Canonical table -> renderer-ready labels and datasets.
//
// Row 0 holds the categories with its first cell as the axis corner, and
// every later row is one dataset named by its first cell. Three styling modes
// exist: per-segment colors for pie/doughnut, per-series bar/line mixing for
// combo charts, and plain solid colors otherwise.
use crate::series::TableShape;
use crate::types::{
    CanonicalTable, ChartData, ChartDataset, ChartKind, Fill, SeriesStyle, SeriesType,
};
use crate::util::{coerce_number, is_blank};
use tracing::debug;

pub const PALETTE: [&str; 12] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#E7E9ED", "#7CB342",
    "#EA80FC", "#00BCD4", "#8BC34A", "#FF5722",
];

const SEGMENT_BORDER: &str = "#fff";
const BORDER_WIDTH: u32 = 2;
const LINE_TENSION: f64 = 0.1;

pub fn palette_color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

fn custom_or_palette(custom: &[String], i: usize) -> String {
    custom
        .get(i)
        .filter(|c| !c.is_empty())
        .cloned()
        .unwrap_or_else(|| palette_color(i).to_string())
}

/// Finds the style for a series: by name (case-insensitive) first, then by
/// position.
fn resolve_style<'a>(
    styles: &'a [SeriesStyle],
    label: &str,
    index: usize,
) -> Option<&'a SeriesStyle> {
    let label = label.to_lowercase();
    styles
        .iter()
        .find(|s| s.name.as_deref().map(str::to_lowercase).as_deref() == Some(label.as_str()))
        .or_else(|| styles.get(index))
}

/// Builds chart input from `table`.
///
/// Returns `None` when there is no data row or no non-blank category label.
/// Datasets whose values are all zero (blank and non-numeric cells read as
/// zero) are left out, so a legitimate all-zero series is not drawn either.
pub fn build(
    table: &CanonicalTable,
    kind: ChartKind,
    custom_colors: &[String],
    series_styles: &[SeriesStyle],
) -> Option<ChartData> {
    if table.data_rows.is_empty() {
        return None;
    }
    let shape = TableShape::LABELED;
    let skip = usize::from(shape.label_column);

    let labels: Vec<String> = table
        .headers
        .iter()
        .skip(skip)
        .filter(|c| !is_blank(c))
        .cloned()
        .collect();
    if labels.is_empty() {
        return None;
    }

    let combo = !series_styles.is_empty() && kind.supports_combo();

    let datasets: Vec<ChartDataset> = table
        .data_rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let label = match row.first() {
                Some(name) if !name.is_empty() => name.clone(),
                _ => format!("Serie {}", index + 1),
            };
            let data: Vec<f64> = (skip..skip + labels.len())
                .map(|c| row.get(c).map_or(0.0, |cell| coerce_number(cell)))
                .collect();

            if kind.is_segmented() {
                segment_dataset(label, data, custom_colors)
            } else if combo {
                let style = resolve_style(series_styles, &label, index);
                combo_dataset(label, data, style, index)
            } else {
                solid_dataset(label, data, custom_or_palette(custom_colors, index))
            }
        })
        .collect();

    let before = datasets.len();
    let datasets: Vec<ChartDataset> = datasets
        .into_iter()
        .filter(|ds| ds.data.iter().any(|v| *v != 0.0))
        .collect();
    if datasets.len() < before {
        debug!(dropped = before - datasets.len(), "dropped all-zero datasets");
    }

    Some(ChartData { labels, datasets })
}

fn segment_dataset(label: String, data: Vec<f64>, custom_colors: &[String]) -> ChartDataset {
    let colors = (0..data.len())
        .map(|i| custom_or_palette(custom_colors, i))
        .collect();
    ChartDataset {
        series_type: None,
        label,
        data,
        background_color: Fill::PerPoint(colors),
        border_color: SEGMENT_BORDER.to_string(),
        border_width: BORDER_WIDTH,
        fill: None,
        tension: None,
        point_radius: None,
        point_background_color: None,
        order: None,
    }
}

fn combo_dataset(
    label: String,
    data: Vec<f64>,
    style: Option<&SeriesStyle>,
    index: usize,
) -> ChartDataset {
    let color = style
        .and_then(|s| s.color.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| palette_color(index).to_string());
    let series_type = style.and_then(|s| s.series_type).unwrap_or_default();
    let is_line = series_type == SeriesType::Line;

    ChartDataset {
        series_type: Some(series_type),
        label,
        data,
        background_color: Fill::Solid(if is_line {
            "transparent".to_string()
        } else {
            color.clone()
        }),
        border_color: color.clone(),
        border_width: BORDER_WIDTH,
        fill: Some(false),
        tension: Some(LINE_TENSION),
        point_radius: Some(if is_line { 4 } else { 0 }),
        point_background_color: Some(color),
        // Lines are drawn over bars.
        order: Some(if is_line { 0 } else { 1 }),
    }
}

fn solid_dataset(label: String, data: Vec<f64>, color: String) -> ChartDataset {
    ChartDataset {
        series_type: None,
        label,
        data,
        background_color: Fill::Solid(color.clone()),
        border_color: color,
        border_width: BORDER_WIDTH,
        fill: Some(false),
        tension: None,
        point_radius: None,
        point_background_color: None,
        order: None,
    }
}
