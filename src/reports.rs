// One pass of the pipeline over a canonical table: chart input, statistics,
// key data points and the voice agent prompt, plus the rows the console
// previews print.
use crate::chart;
use crate::config::Settings;
use crate::prompt::{ChartContext, PromptComposer};
use crate::series;
use crate::stats;
use crate::types::{
    CanonicalTable, ChartData, ChartStats, DatasetRow, Fill, KeyDataPoints, KeyPointRow,
    ParsedSeries, Summary,
};
use crate::util::{format_plain, format_total};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ChartReport {
    pub chart: Option<ChartData>,
    pub parsed: Option<ParsedSeries>,
    pub stats: Option<ChartStats>,
    pub key_points: KeyDataPoints,
    pub prompt: String,
}

impl ChartReport {
    pub fn summary(&self) -> Summary {
        Summary {
            stats: self.stats.clone(),
            key_data_points: self.key_points.clone(),
            available_years: self
                .parsed
                .as_ref()
                .map(|p| p.available_years.clone())
                .unwrap_or_default(),
        }
    }
}

pub fn generate(table: &CanonicalTable, settings: &Settings, title: Option<&str>) -> ChartReport {
    let chart = chart::build(
        table,
        settings.chart.kind,
        &settings.chart.colors,
        &settings.chart.series,
    );
    let parsed = series::parse(table);
    let stats = parsed.as_ref().and_then(stats::compute_stats);
    let key_points = parsed
        .as_ref()
        .map(stats::extract_key_data_points)
        .unwrap_or_default();

    let period = parsed.as_ref().and_then(|p| {
        match (p.available_years.first(), p.available_years.last()) {
            (Some(first), Some(last)) if first != last => Some(format!("{} - {}", first, last)),
            (Some(first), _) => Some(first.to_string()),
            _ => None,
        }
    });
    let context = ChartContext {
        title: title.map(str::to_string),
        location: None,
        period,
    };
    let composer = PromptComposer::new(&settings.agent);
    let prompt = composer.compose(&key_points, None, None, &context, None);

    info!(
        datasets = chart.as_ref().map_or(0, |c| c.datasets.len()),
        series = parsed.as_ref().map_or(0, |p| p.series.len()),
        "generated chart report"
    );
    ChartReport {
        chart,
        parsed,
        stats,
        key_points,
        prompt,
    }
}

pub fn dataset_rows(chart: &ChartData) -> Vec<DatasetRow> {
    chart
        .datasets
        .iter()
        .map(|ds| DatasetRow {
            label: ds.label.clone(),
            kind: ds
                .series_type
                .map(|t| format!("{:?}", t).to_lowercase())
                .unwrap_or_else(|| "-".to_string()),
            color: match &ds.background_color {
                Fill::Solid(c) => c.clone(),
                Fill::PerPoint(colors) => format!("{} colores", colors.len()),
            },
            points: ds.data.len(),
            total: format_total(ds.data.iter().sum()),
        })
        .collect()
}

pub fn key_point_rows(key: &KeyDataPoints) -> Vec<KeyPointRow> {
    [
        ("Actual", &key.latest),
        ("Período Previo", &key.previous),
        ("Año Anterior", &key.year_ago),
        ("Récord Máximo", &key.max),
        ("Récord Mínimo", &key.min),
    ]
    .into_iter()
    .filter_map(|(name, point)| {
        point.as_ref().map(|p| KeyPointRow {
            point: name.to_string(),
            label: p.label.clone(),
            value: format_plain(p.value),
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CanonicalTable {
        CanonicalTable {
            headers: vec!["".into(), "2020".into(), "2021".into()],
            data_rows: vec![
                vec!["PIB".into(), "100".into(), "150".into()],
                vec!["Vacía".into(), "".into(), "".into()],
            ],
        }
    }

    #[test]
    fn report_covers_every_stage() {
        let report = generate(&table(), &Settings::default(), Some("Economía"));
        let chart = report.chart.as_ref().unwrap();
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(report.stats.as_ref().unwrap().max, 150.0);
        assert_eq!(report.key_points.latest.as_ref().unwrap().label, "2021");
        assert!(report.prompt.contains("- Título: Economía"));
        assert!(report.prompt.contains("- Periodo: 2020 - 2021"));
        assert_eq!(report.summary().available_years, vec![2020, 2021]);
    }

    #[test]
    fn preview_rows() {
        let report = generate(&table(), &Settings::default(), None);
        let rows = dataset_rows(report.chart.as_ref().unwrap());
        assert_eq!(rows[0].total, "250.00");
        assert_eq!(rows[0].kind, "-");
        let keys = key_point_rows(&report.key_points);
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0].value, "150");
    }
}
