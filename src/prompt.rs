// Voice agent briefing: key data points and chart metadata rendered as the
// system prompt handed to the conversational agent at session start.
use crate::config::AgentSettings;
use crate::metadata::ChartMetadata;
use crate::series;
use crate::stats;
use crate::types::{DataPoint, KeyDataPoints};
use crate::util::{format_percent, format_plain};
use tracing::debug;

/// Descriptive fields of the chart being discussed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartContext {
    pub title: Option<String>,
    pub location: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PromptComposer {
    preamble: String,
    instructions: String,
    max_context_chars: usize,
}

impl PromptComposer {
    pub fn new(settings: &AgentSettings) -> Self {
        Self {
            preamble: settings.preamble.clone(),
            instructions: settings.instructions.clone(),
            max_context_chars: settings.max_context_chars,
        }
    }

    /// Renders the full prompt: preamble, metadata, key data, optional free
    /// text context and the closing instructions, separated by blank lines.
    /// Sections with nothing to say are left out.
    pub fn compose(
        &self,
        key: &KeyDataPoints,
        unit: Option<&str>,
        source: Option<&str>,
        chart: &ChartContext,
        context: Option<&str>,
    ) -> String {
        let sections = [
            self.preamble.trim().to_string(),
            metadata_block(chart, unit, source),
            key_data_block(key, unit),
            self.context_block(context),
            self.instructions.trim().to_string(),
        ];
        sections
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string()
    }

    fn context_block(&self, context: Option<&str>) -> String {
        let Some(text) = context.map(str::trim).filter(|t| !t.is_empty()) else {
            return String::new();
        };
        let mut body: String = text.chars().take(self.max_context_chars).collect();
        if body.len() < text.len() {
            body.push('…');
        }
        format!("## CONTEXTO ADICIONAL\n{}", body)
    }
}

fn metadata_block(chart: &ChartContext, unit: Option<&str>, source: Option<&str>) -> String {
    let fields = [
        ("Título", chart.title.as_deref()),
        ("Ubicación", chart.location.as_deref()),
        ("Periodo", chart.period.as_deref()),
        ("Unidad de medida", unit),
        ("Fuente", source),
    ];
    let lines: Vec<String> = fields
        .iter()
        .filter_map(|(name, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("- {}: {}", name, v))
        })
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!("## GRÁFICA\n{}", lines.join("\n"))
}

fn point_line(name: &str, point: &DataPoint, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!(
            "- {} ({}): {} {}",
            name,
            point.label,
            format_plain(point.value),
            unit
        ),
        None => format!("- {} ({}): {}", name, point.label, format_plain(point.value)),
    }
}

/// Percent change from `other` to `current`; `None` when `other` is zero.
fn variation(current: &DataPoint, other: &DataPoint) -> Option<f64> {
    if other.value == 0.0 {
        return None;
    }
    Some((current.value - other.value) / other.value * 100.0)
}

fn key_data_block(key: &KeyDataPoints, unit: Option<&str>) -> String {
    let unit = unit.map(str::trim).filter(|u| !u.is_empty());
    let mut lines = Vec::new();

    if let Some(p) = &key.latest {
        lines.push(point_line("Actual", p, unit));
    }
    let rest = [
        ("Período Previo", &key.previous),
        ("Año Anterior", &key.year_ago),
        ("Récord Máximo", &key.max),
        ("Récord Mínimo", &key.min),
    ];
    for (name, point) in rest {
        if let Some(p) = point {
            lines.push(point_line(name, p, None));
        }
    }

    if let Some(latest) = &key.latest {
        let changes = [
            ("Variación vs período previo", &key.previous),
            ("Variación anual", &key.year_ago),
        ];
        for (name, other) in changes {
            if let Some(pct) = other.as_ref().and_then(|o| variation(latest, o)) {
                lines.push(format!("- {}: {}", name, format_percent(pct)));
            }
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    format!("## DATOS CLAVE\n{}", lines.join("\n"))
}

/// Builds the prompt for one chart widget, optionally inside a named
/// indicator.
pub fn build_voice_prompt(
    widget: &ChartMetadata,
    indicator_title: Option<&str>,
    composer: &PromptComposer,
) -> String {
    let key = widget
        .parsed_series()
        .map(|parsed| stats::extract_key_data_points(&parsed))
        .unwrap_or_default();

    let title = match (indicator_title, widget.title.as_deref()) {
        (Some(indicator), Some(chart)) => Some(format!("{} - {}", indicator, chart)),
        (Some(indicator), None) => Some(indicator.to_string()),
        (None, chart) => chart.map(str::to_string),
    };
    let period = Some(widget.period_label()).filter(|p| !p.is_empty()).or_else(|| {
        // Fall back to the years found in the table itself.
        let years = widget
            .canonical_table()
            .map(|t| series::available_years(&t.headers))
            .unwrap_or_default();
        match (years.first(), years.last()) {
            (Some(first), Some(last)) if first != last => Some(format!("{} - {}", first, last)),
            (Some(first), _) => Some(first.to_string()),
            _ => None,
        }
    });
    let chart = ChartContext {
        title,
        location: widget.location_label(),
        period,
    };

    let unit = widget.unit_label();
    let source = widget.source_label();
    debug!(has_data = !key.is_empty(), "composing voice agent prompt");
    composer.compose(
        &key,
        unit.as_deref(),
        source.as_deref(),
        &chart,
        widget.description.as_deref(),
    )
}
