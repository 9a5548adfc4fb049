//! Tabular indicator data -> charts, statistics and voice agent briefings.
//!
//! A raw spreadsheet grid is cut down to a canonical table ([`grid`]), read
//! as named series ([`series`]), turned into renderer-ready datasets
//! ([`chart`]), summarized ([`stats`]) and finally rendered as a prompt for a
//! conversational agent ([`prompt`], [`session`]).
pub mod chart;
pub mod config;
pub mod error;
pub mod grid;
pub mod loader;
pub mod metadata;
pub mod output;
pub mod prompt;
pub mod reports;
pub mod series;
pub mod session;
pub mod stats;
pub mod types;
pub mod util;

pub use error::{Error, Result};
pub use types::{
    CanonicalTable, ChartData, ChartDataset, ChartKind, ChartStats, CleaningConfig, DataPoint,
    KeyDataPoints, ParsedSeries, RawGrid, Series, SeriesStyle, SeriesType, Trend,
};
