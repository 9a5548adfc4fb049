// Chart widget metadata as edited in the CMS, plus the label lookups used
// to turn its stored keys into display text.
use crate::chart;
use crate::series;
use crate::types::{
    CanonicalTable, ChartData, ChartKind, CleaningConfig, ParsedSeries, SeriesStyle,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const LOCATIONS: &[(&str, &str)] = &[
    ("torreon", "Torreón"),
    ("gomez-palacio", "Gómez Palacio"),
    ("lerdo", "Lerdo"),
    ("matamoros", "Matamoros"),
    ("zona-metropolitana", "Zona Metropolitana"),
    ("estatal-coahuila", "Estatal (Coahuila)"),
    ("estatal-durango", "Estatal (Durango)"),
    ("nacional", "Nacional"),
    ("general", "General"),
];

const PERIODICITIES: &[(&str, &str)] = &[
    ("anual", "Anual"),
    ("mensual", "Mensual"),
    ("trimestral", "Trimestral"),
    ("quinquenal", "Quinquenal"),
    ("unico", "Único"),
];

const DISAGGREGATIONS: &[(&str, &str)] = &[
    ("municipal", "Municipal"),
    ("estatal", "Estatal"),
    ("nacional", "Nacional"),
];

const UNITS: &[(&str, &str)] = &[
    ("porcentaje", "Porcentaje (%)"),
    ("pesos", "Pesos (MXN)"),
    ("miles-pesos", "Miles de pesos"),
    ("millones-pesos", "Millones de pesos"),
    ("habitantes", "Habitantes"),
    ("miles-habitantes", "Miles de habitantes"),
    ("tasa-100mil", "Tasa por 100,000 hab."),
    ("indice", "Índice (0-100)"),
    ("unidades", "Unidades"),
    ("hectareas", "Hectáreas"),
    ("kilometros", "Kilómetros"),
    ("toneladas", "Toneladas"),
    ("litros", "Litros"),
    ("otro", "Otro"),
];

const SOURCES: &[(&str, &str)] = &[
    ("inegi", "INEGI"),
    ("coneval", "CONEVAL"),
    ("imco", "IMCO"),
    ("conapo", "CONAPO"),
    ("salud", "Secretaría de Salud"),
    ("economia", "Secretaría de Economía"),
    ("sesnsp", "SESNSP (Seguridad)"),
    ("banxico", "Banco de México"),
    ("shcp", "SHCP"),
    ("sep", "SEP"),
    ("conagua", "CONAGUA"),
    ("semarnat", "SEMARNAT"),
    ("municipal", "Gobierno Municipal"),
    ("estatal", "Gobierno Estatal"),
    ("otra", "Otra fuente"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> String {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| key.to_string())
}

// The "other" entry defers to the editor's free-text value when there is one.
fn lookup_with_custom(
    table: &[(&str, &'static str)],
    other_key: &str,
    key: &str,
    custom: Option<&str>,
) -> String {
    match custom.map(str::trim).filter(|c| !c.is_empty()) {
        Some(custom) if key == other_key => custom.to_string(),
        _ => lookup(table, key),
    }
}

pub fn location_label(key: &str) -> String {
    lookup(LOCATIONS, key)
}

pub fn periodicity_label(key: &str) -> String {
    lookup(PERIODICITIES, key)
}

pub fn disaggregation_label(key: &str) -> String {
    lookup(DISAGGREGATIONS, key)
}

pub fn unit_label(key: &str, custom: Option<&str>) -> String {
    lookup_with_custom(UNITS, "otro", key, custom)
}

pub fn source_label(key: &str, custom: Option<&str>) -> String {
    lookup_with_custom(SOURCES, "otra", key, custom)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<String>,
}

/// Table as stored by the CMS: header row first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableValue {
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

impl TableValue {
    pub fn from_table(table: &CanonicalTable) -> Self {
        Self {
            rows: table
                .to_rows()
                .into_iter()
                .map(|cells| TableRow { cells })
                .collect(),
        }
    }

    pub fn to_table(&self) -> Option<CanonicalTable> {
        let rows: Vec<Vec<String>> = self.rows.iter().map(|r| r.cells.clone()).collect();
        CanonicalTable::from_rows(&rows)
    }
}

/// A chart widget document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartMetadata {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "tipo")]
    pub kind: ChartKind,
    #[serde(rename = "ubicacion")]
    pub location: Option<String>,
    #[serde(rename = "anioInicio")]
    pub start_year: Option<i32>,
    #[serde(rename = "anioFin")]
    pub end_year: Option<i32>,
    #[serde(rename = "aniosDisponibles")]
    pub available_years: Vec<i32>,
    #[serde(rename = "periodoEspecifico")]
    pub specific_period: Option<String>,
    #[serde(rename = "unidadMedida")]
    pub unit: Option<String>,
    #[serde(rename = "unidadMedidaPersonalizada")]
    pub custom_unit: Option<String>,
    #[serde(rename = "fuente")]
    pub source: Option<String>,
    #[serde(rename = "fuentePersonalizada")]
    pub custom_source: Option<String>,
    #[serde(rename = "descripcionContexto")]
    pub description: Option<String>,
    #[serde(rename = "tablaDatos")]
    pub table: Option<TableValue>,
    #[serde(rename = "series")]
    pub series_styles: Vec<SeriesStyle>,
    #[serde(rename = "colores")]
    pub colors: Vec<String>,
    #[serde(rename = "configLimpieza")]
    pub cleaning: Option<CleaningConfig>,
}

impl ChartMetadata {
    /// Whether the chart covers `year`: an explicit range first, then a single
    /// start year, then the list of discontinuous years.
    pub fn year_available(&self, year: i32) -> bool {
        match (self.start_year, self.end_year) {
            (Some(start), Some(end)) => (start..=end).contains(&year),
            (Some(start), None) => year == start,
            _ => self.available_years.contains(&year),
        }
    }

    pub fn period_label(&self) -> String {
        match (self.start_year, self.end_year) {
            (Some(start), Some(end)) => format!("{} - {}", start, end),
            (Some(start), None) => start.to_string(),
            _ if !self.available_years.is_empty() => self
                .available_years
                .iter()
                .map(|y| y.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            _ => self.specific_period.clone().unwrap_or_default(),
        }
    }

    pub fn location_label(&self) -> Option<String> {
        self.location.as_deref().map(location_label)
    }

    pub fn unit_label(&self) -> Option<String> {
        self.unit
            .as_deref()
            .map(|u| unit_label(u, self.custom_unit.as_deref()))
    }

    pub fn source_label(&self) -> Option<String> {
        self.source
            .as_deref()
            .map(|s| source_label(s, self.custom_source.as_deref()))
    }

    pub fn canonical_table(&self) -> Option<CanonicalTable> {
        self.table.as_ref()?.to_table()
    }

    pub fn chart_data(&self) -> Option<ChartData> {
        let table = self.canonical_table()?;
        chart::build(&table, self.kind, &self.colors, &self.series_styles)
    }

    pub fn parsed_series(&self) -> Option<ParsedSeries> {
        series::parse(&self.canonical_table()?)
    }
}

/// Every year covered by a set of charts, newest first.
pub fn unique_years(ranges: &[(Option<i32>, Option<i32>)], specific: &[i32]) -> Vec<i32> {
    let mut years: BTreeSet<i32> = specific.iter().copied().collect();
    for range in ranges {
        match *range {
            (Some(start), Some(end)) => years.extend(start..=end),
            (Some(start), None) => {
                years.insert(start);
            }
            _ => {}
        }
    }
    years.into_iter().rev().collect()
}
