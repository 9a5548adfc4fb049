use indicator_report::config::Settings;
use indicator_report::grid::{auto_detect, normalize, DataCleaner};
use indicator_report::metadata::{ChartMetadata, TableValue};
use indicator_report::prompt::{build_voice_prompt, PromptComposer};
use indicator_report::{chart, loader, reports, series, stats};
use indicator_report::{ChartKind, Trend};
use std::fs;

const EXPORT: &str = "\
Observatorio Metropolitano;;;
;;;
Indicador;Ene 2022;Ene 2023;Ene 2024
Tasa de desocupación;4.1;3.5;3.2
Personas ocupadas;\"1,200\";1300;1500
;;;
Notas: cifras preliminares;;;
";

fn load() -> DataCleaner {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empleo.csv");
    fs::write(&path, EXPORT).unwrap();
    let (grid, report) = loader::load_grid(&path).unwrap();
    assert_eq!(report.delimiter, b';');
    assert_eq!(report.total_rows, 7);
    DataCleaner::detect(grid)
}

#[test]
fn detects_range_and_builds_every_output() {
    let mut cleaner = load();
    assert_eq!(cleaner.config().header_row, Some(2));
    assert_eq!(cleaner.config().data_start_row, Some(3));

    // Trim the footnote row before charting.
    let total = cleaner.total_rows();
    cleaner.update_config(|c| {
        c.set_data_end(4, total);
    });
    let table = cleaner.table().unwrap().clone();
    assert_eq!(table.headers, vec!["Indicador", "Ene 2022", "Ene 2023", "Ene 2024"]);
    assert_eq!(table.data_rows.len(), 2);
    assert!(table.data_rows.iter().all(|r| r.len() == table.headers.len()));

    let chart = chart::build(&table, ChartKind::Line, &[], &[]).unwrap();
    assert_eq!(chart.labels, vec!["Ene 2022", "Ene 2023", "Ene 2024"]);
    assert_eq!(chart.datasets[0].data, vec![4.1, 3.5, 3.2]);
    // Lenient chart parsing reads "1,200" as 1.
    assert_eq!(chart.datasets[1].data, vec![1.0, 1300.0, 1500.0]);

    let parsed = series::parse(&table).unwrap();
    assert_eq!(parsed.available_years, vec![2022, 2023, 2024]);
    let s = stats::compute_stats(&parsed).unwrap();
    assert_eq!(s.max, 1500.0);
    assert_eq!(s.min, 3.2);
    assert_eq!(s.trend, Trend::Falling);

    let key = stats::extract_key_data_points(&parsed);
    assert_eq!(key.latest.as_ref().unwrap().label, "Ene 2024");
    assert_eq!(key.year_ago.as_ref().unwrap().label, "Ene 2023");

    let report = reports::generate(&table, &Settings::default(), Some("Empleo"));
    assert!(report.prompt.contains("- Actual (Ene 2024): 3.2"));
    assert!(report.prompt.contains("- Variación anual: -8.6%"));
}

#[test]
fn transposed_sheet_reads_the_same_series() {
    let grid: Vec<Vec<String>> = [
        ["Año", "Ventas"],
        ["2020", "10"],
        ["2021", "20"],
        ["2022", "30"],
    ]
    .iter()
    .map(|r| r.iter().map(|c| c.to_string()).collect())
    .collect();

    let mut cfg = auto_detect(&grid);
    assert_eq!(cfg.header_row, Some(0));
    cfg.transpose = true;
    let table = normalize(&grid, &cfg).unwrap();
    assert_eq!(table.headers, vec!["Año", "2020", "2021", "2022"]);

    let chart = chart::build(&table, ChartKind::Bar, &[], &[]).unwrap();
    assert_eq!(chart.datasets.len(), 1);
    assert_eq!(chart.datasets[0].label, "Ventas");
    assert_eq!(chart.datasets[0].data, vec![10.0, 20.0, 30.0]);

    let parsed = series::parse(&table).unwrap();
    assert_eq!(stats::compute_stats(&parsed).unwrap().trend, Trend::Rising);
}

#[test]
fn stored_widget_round_trip_to_prompt() {
    let mut cleaner = load();
    let total = cleaner.total_rows();
    cleaner.update_config(|c| {
        c.set_data_end(3, total);
    });
    let table = cleaner.table().unwrap().clone();

    let widget = ChartMetadata {
        title: Some("Desocupación".to_string()),
        location: Some("zona-metropolitana".to_string()),
        unit: Some("porcentaje".to_string()),
        source: Some("inegi".to_string()),
        table: Some(TableValue::from_table(&table)),
        cleaning: Some(cleaner.config().clone()),
        ..ChartMetadata::default()
    };
    let json = serde_json::to_string(&widget).unwrap();
    let stored: ChartMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(stored, widget);

    let composer = PromptComposer::new(&Settings::default().agent);
    let prompt = build_voice_prompt(&stored, None, &composer);
    assert!(prompt.contains("- Ubicación: Zona Metropolitana"));
    assert!(prompt.contains("- Fuente: INEGI"));
    assert!(prompt.contains("- Actual (Ene 2024): 3.2 Porcentaje (%)"));
    assert!(prompt.contains("- Récord Máximo (Ene 2022): 4.1"));
}
