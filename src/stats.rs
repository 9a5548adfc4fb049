// Descriptive statistics and key data points over parsed series.
//
// A cell counts as data only when it parses to a non-zero number: blank,
// non-numeric and zero cells all read as "no value here".
use crate::types::{ChartStats, DataPoint, KeyDataPoints, ParsedSeries, Series, Trend};
use crate::util::{average, extract_year, is_blank, parse_cell, round2, std_dev, strip_year};
use tracing::debug;

// Percent change between half-means that counts as a direction.
const TREND_THRESHOLD: f64 = 10.0;
// Coefficient of variation (percent) above which a flat series is "variable".
const VARIATION_THRESHOLD: f64 = 20.0;

fn value_of(cell: &str) -> Option<f64> {
    parse_cell(cell).filter(|v| *v != 0.0)
}

fn values(series: &Series) -> Vec<f64> {
    series.values.iter().filter_map(|c| value_of(c)).collect()
}

/// Non-zero points of one series, with the header label at their position.
/// Points past the end of the header row or under a blank header are skipped.
fn labeled_points(headers: &[String], series: &Series) -> Vec<DataPoint> {
    series
        .values
        .iter()
        .zip(headers)
        .filter(|(_, label)| !is_blank(label))
        .filter_map(|(cell, label)| {
            value_of(cell).map(|value| DataPoint {
                label: label.clone(),
                value,
            })
        })
        .collect()
}

/// Max/min/avg over every series, trend over the first one.
///
/// Returns `None` when no series holds a single non-zero value.
pub fn compute_stats(parsed: &ParsedSeries) -> Option<ChartStats> {
    let mut max: Option<(f64, String)> = None;
    let mut min: Option<(f64, String)> = None;
    let mut all = Vec::new();

    for series in &parsed.series {
        for (i, cell) in series.values.iter().enumerate() {
            let Some(value) = value_of(cell) else { continue };
            let label = parsed.headers.get(i).cloned().unwrap_or_default();
            // Strict comparisons keep the first point on ties.
            if max.as_ref().map_or(true, |(m, _)| value > *m) {
                max = Some((value, label.clone()));
            }
            if min.as_ref().map_or(true, |(m, _)| value < *m) {
                min = Some((value, label));
            }
            all.push(value);
        }
    }

    let (max, max_label) = max?;
    let (min, min_label) = min?;
    let first = parsed.series.first().map(values).unwrap_or_default();
    let trend = trend(&first);
    debug!(points = all.len(), %trend, "computed chart stats");

    Some(ChartStats {
        max,
        max_label,
        min,
        min_label,
        avg: round2(average(&all)),
        trend,
        total_data_points: all.len(),
    })
}

/// Classifies a series by comparing the mean of its first half to the mean
/// of its second half (the first half takes the middle element).
pub fn trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::Stable;
    }
    let mid = (values.len() + 1) / 2;
    let first_mean = average(&values[..mid]);
    let second_mean = average(&values[mid..]);

    if first_mean != 0.0 {
        let change = (second_mean - first_mean) / first_mean * 100.0;
        if change > TREND_THRESHOLD {
            return Trend::Rising;
        }
        if change < -TREND_THRESHOLD {
            return Trend::Falling;
        }
    }

    let mean = average(values);
    if mean == 0.0 {
        return Trend::Variable;
    }
    let cv = std_dev(values) / mean.abs() * 100.0;
    if cv > VARIATION_THRESHOLD {
        Trend::Variable
    } else {
        Trend::Stable
    }
}

/// Latest, previous, same-period-last-year, max and min of the first series.
///
/// Every field is `None` when the first series has no labeled non-zero
/// value.
pub fn extract_key_data_points(parsed: &ParsedSeries) -> KeyDataPoints {
    let Some(series) = parsed.series.first() else {
        return KeyDataPoints::default();
    };
    let points = labeled_points(&parsed.headers, series);
    let Some(latest) = points.last().cloned() else {
        return KeyDataPoints::default();
    };

    let previous = points.len().checked_sub(2).map(|i| points[i].clone());
    let year_ago = same_period_last_year(&points, &latest.label);

    let mut max = &points[0];
    let mut min = &points[0];
    for p in &points[1..] {
        if p.value > max.value {
            max = p;
        }
        if p.value < min.value {
            min = p;
        }
    }

    KeyDataPoints {
        max: Some(max.clone()),
        min: Some(min.clone()),
        latest: Some(latest),
        previous,
        year_ago,
    }
}

fn same_period_last_year(points: &[DataPoint], label: &str) -> Option<DataPoint> {
    let year = extract_year(label)?;
    let period = strip_year(label);
    points
        .iter()
        .find(|p| extract_year(&p.label) == Some(year - 1) && strip_year(&p.label) == period)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(headers: &[&str], series: &[(&str, &[&str])]) -> ParsedSeries {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        ParsedSeries {
            available_years: crate::series::available_years(&headers),
            headers,
            series: series
                .iter()
                .map(|(name, values)| Series {
                    name: name.to_string(),
                    values: values.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    fn point(label: &str, value: f64) -> Option<DataPoint> {
        Some(DataPoint {
            label: label.to_string(),
            value,
        })
    }

    #[test]
    fn key_points_for_monthly_series() {
        let p = parsed(&["Ene 2019", "Ene 2020", "Ene 2021"], &[("S", &["10", "20", "30"])]);
        let k = extract_key_data_points(&p);
        assert_eq!(k.latest, point("Ene 2021", 30.0));
        assert_eq!(k.previous, point("Ene 2020", 20.0));
        assert_eq!(k.year_ago, point("Ene 2020", 20.0));
        assert_eq!(k.max, k.latest);
        assert_eq!(k.min, point("Ene 2019", 10.0));
    }

    #[test]
    fn year_ago_requires_same_period() {
        let p = parsed(
            &["Feb 2020", "Ene 2021", "Feb 2021", "Mar 2021"],
            &[("S", &["5", "6", "7", "8"])],
        );
        let k = extract_key_data_points(&p);
        assert_eq!(k.latest, point("Mar 2021", 8.0));
        assert_eq!(k.year_ago, None);

        let p = parsed(&["Trimestre", "2021"], &[("S", &["1", "2"])]);
        assert_eq!(extract_key_data_points(&p).year_ago, None);
    }

    #[test]
    fn key_points_skip_zero_and_blank_cells() {
        let p = parsed(&["2019", "2020", "2021"], &[("S", &["4", "", "0"])]);
        let k = extract_key_data_points(&p);
        assert_eq!(k.latest, point("2019", 4.0));
        assert_eq!(k.previous, None);
        assert_eq!(k.year_ago, None);
    }

    #[test]
    fn key_points_ties_keep_first() {
        let p = parsed(&["a", "b", "c"], &[("S", &["5", "5", "1"])]);
        let k = extract_key_data_points(&p);
        assert_eq!(k.max, point("a", 5.0));
    }

    #[test]
    fn stats_ties_keep_first_series_point() {
        // Ties across series resolve in series order, not header order.
        let p = parsed(&["a", "b"], &[("A", &["5", "1"]), ("B", &["1", "5"])]);
        let s = compute_stats(&p).unwrap();
        assert_eq!((s.max, s.max_label.as_str()), (5.0, "a"));
        assert_eq!((s.min, s.min_label.as_str()), (1.0, "b"));
        assert_eq!(s.total_data_points, 4);
    }

    #[test]
    fn key_points_without_data() {
        let p = parsed(&["2020"], &[("S", &["n/d"])]);
        assert!(extract_key_data_points(&p).is_empty());
        let p = parsed(&["2020"], &[]);
        assert_eq!(extract_key_data_points(&p), KeyDataPoints::default());
    }

    #[test]
    fn stats_across_all_series() {
        let p = parsed(
            &["2019", "2020", "2021"],
            &[("A", &["10", "1,000", "0"]), ("B", &["-5", "x", "1000"])],
        );
        let s = compute_stats(&p).unwrap();
        assert_eq!(s.max, 1000.0);
        assert_eq!(s.max_label, "2020");
        assert_eq!(s.min, -5.0);
        assert_eq!(s.min_label, "2019");
        assert_eq!(s.total_data_points, 4);
        assert_eq!(s.avg, 501.25);
        assert_eq!(s.trend, Trend::Rising);
    }

    #[test]
    fn stats_average_is_rounded() {
        let p = parsed(&["a", "b", "c"], &[("S", &["1", "1", "2"])]);
        assert_eq!(compute_stats(&p).unwrap().avg, 1.33);
    }

    #[test]
    fn stats_without_values() {
        let p = parsed(&["2020", "2021"], &[("S", &["0", ""])]);
        assert!(compute_stats(&p).is_none());
    }

    #[test]
    fn trend_classification() {
        assert_eq!(trend(&[10.0, 10.0, 10.0, 10.0]), Trend::Stable);
        assert_eq!(trend(&[10.0, 10.0, 30.0, 30.0]), Trend::Rising);
        assert_eq!(trend(&[30.0, 30.0, 10.0, 10.0]), Trend::Falling);
        assert_eq!(trend(&[10.0, 30.0, 20.0, 20.0, 30.0, 10.0]), Trend::Variable);
        assert_eq!(trend(&[42.0]), Trend::Stable);
    }

    #[test]
    fn odd_counts_put_middle_in_first_half() {
        // Halves [10, 30] and [25]: +25%.
        assert_eq!(trend(&[10.0, 30.0, 25.0]), Trend::Rising);
        assert_eq!(trend(&[10.0, 10.0, 10.5]), Trend::Stable);
    }
}
