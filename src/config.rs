// Settings for the report binary and the voice agent prompt.
// Loaded from indicator_report.toml (or $INDICATOR_REPORT_CONFIG), with a
// couple of environment overrides on top.
use crate::error::{Error, Result};
use crate::types::{ChartKind, SeriesStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "indicator_report.toml";
pub const CONFIG_ENV: &str = "INDICATOR_REPORT_CONFIG";
pub const INPUT_ENV: &str = "INDICATOR_REPORT_INPUT";
pub const AGENT_ID_ENV: &str = "INDICATOR_REPORT_AGENT_ID";

const DEFAULT_PREAMBLE: &str = "Eres el asistente de voz de un observatorio de indicadores \
socioeconómicos. Explicas de forma breve y clara los datos de la gráfica que el usuario \
está consultando.";

const DEFAULT_INSTRUCTIONS: &str = "Responde siempre en español, con frases cortas. Usa solo \
los datos anteriores; si te preguntan algo que no está en ellos, dilo con claridad. \
Menciona la fuente cuando cites una cifra.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub agent_id: String,
    /// Persona and behaviour text placed at the top of every prompt.
    pub preamble: String,
    /// Closing instructions placed at the end of every prompt.
    pub instructions: String,
    /// Longest free-text context (in characters) copied into a prompt.
    pub max_context_chars: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            max_context_chars: 1200,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub kind: ChartKind,
    pub colors: Vec<String>,
    pub series: Vec<SeriesStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    /// Rows shown in console previews.
    pub preview_rows: usize,
    pub agent: AgentSettings,
    pub chart: ChartSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("datos.csv"),
            output_dir: PathBuf::from("."),
            preview_rows: 5,
            agent: AgentSettings::default(),
            chart: ChartSettings::default(),
        }
    }
}

impl Settings {
    /// Loads the config file named by `$INDICATOR_REPORT_CONFIG`, or
    /// `indicator_report.toml` in the working directory, then applies
    /// environment overrides. A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));
        let mut settings = Self::load_from(&path)?;
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Overrides from environment-style lookups; `lookup` returns the value
    /// for a variable name.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input) = lookup(INPUT_ENV).filter(|v| !v.is_empty()) {
            self.input_path = PathBuf::from(input);
        }
        if let Some(agent_id) = lookup(AGENT_ID_ENV).filter(|v| !v.is_empty()) {
            self.agent.agent_id = agent_id;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.preview_rows == 0 {
            return Err(Error::InvalidConfig(
                "preview_rows must be at least 1".to_string(),
            ));
        }
        if self.agent.max_context_chars == 0 {
            return Err(Error::InvalidConfig(
                "agent.max_context_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeriesType;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let s = Settings::from_toml_str("").unwrap();
        assert_eq!(s, Settings::default());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn parses_nested_tables() {
        let s = Settings::from_toml_str(
            r##"
            input_path = "empleo.csv"
            preview_rows = 3

            [agent]
            agent_id = "agent_123"
            max_context_chars = 200

            [chart]
            kind = "line"
            colors = ["#000000"]

            [[chart.series]]
            nombre = "Gastos"
            tipoSerie = "line"
            "##,
        )
        .unwrap();
        assert_eq!(s.input_path, PathBuf::from("empleo.csv"));
        assert_eq!(s.preview_rows, 3);
        assert_eq!(s.agent.agent_id, "agent_123");
        assert_eq!(s.agent.preamble, DEFAULT_PREAMBLE);
        assert_eq!(s.chart.kind, ChartKind::Line);
        assert_eq!(s.chart.series[0].series_type, Some(SeriesType::Line));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(
            Settings::from_toml_str("preview_rows = \"many\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn zero_preview_rows_is_rejected() {
        let s = Settings {
            preview_rows: 0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> =
            [(INPUT_ENV, "otro.csv"), (AGENT_ID_ENV, "")].into_iter().collect();
        let mut s = Settings::default();
        s.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(s.input_path, PathBuf::from("otro.csv"));
        assert_eq!(s.agent.agent_id, "");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }
}
