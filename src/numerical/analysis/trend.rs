//! # Discrete-data trend analyzer
//!
//! Extrema and zero crossings of one data column, positions taken from an optional second
//! column or from the row index.
//!
//! Extrema: a running median over a window of `W` valid samples smooths the data; a reversal
//! of the median's direction marks the neighbourhood of an extremum, and the raw samples of
//! that neighbourhood give its exact position. The scan then jumps `W` samples past it.
//!
//! Zero crossings work on the raw values. Invalid (NaN) cells are skipped without breaking
//! the scan: the last valid sample is compared with the next valid one.
use crate::numerical::analysis::config::{CrossingMode, ExtremumMode, TrendConfig, TrendMode};
use crate::numerical::analysis::data_source::DataSource;
use crate::numerical::analysis::error::AnalysisError;
use crate::numerical::analysis::result::AnalysisResult;
use crate::numerical::analysis::sampler::linearize;
use log::{debug, info};

/// smallest usable median window
pub const MIN_WINDOW: usize = 3;

/// Window actually used for `n` samples: `min(max(W, 3), n/3)`, `None` when below 3.
pub fn effective_window(order: usize, n: usize) -> Option<usize> {
    let window = order.max(MIN_WINDOW).min(n / 3);
    if window < MIN_WINDOW { None } else { Some(window) }
}

/// median of a short slice, mean of the two middle values for even lengths
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Valid `(position, value)` samples in row order.
fn valid_samples<D: DataSource + ?Sized>(
    source: &D,
    column: usize,
    x_column: Option<usize>,
    rows: std::ops::Range<usize>,
) -> Vec<(f64, f64)> {
    rows.filter_map(|row| {
        let (value, valid) = source.cell(row, column);
        if !valid {
            return None;
        }
        match x_column {
            Some(xc) => {
                let (position, x_valid) = source.cell(row, xc);
                if x_valid { Some((position, value)) } else { None }
            }
            None => Some((row as f64, value)),
        }
    })
    .collect()
}

/// Positions of median-trend reversals, refined on the raw samples.
pub fn median_extrema(samples: &[(f64, f64)], window: usize, mode: ExtremumMode) -> Vec<f64> {
    let m = samples.len();
    if window == 0 || m < window {
        return Vec::new();
    }
    let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
    let window_median = |start: usize| median(&values[start..start + window]);

    let mut found = Vec::new();
    let mut previous = window_median(0);
    let mut direction: i8 = 0;
    let mut i = 1;
    while i + window <= m {
        let current = window_median(i);
        let trend = sign(current - previous);
        if trend != 0 && direction != 0 && trend != direction {
            let was_rising = direction > 0;
            let last = (i + window - 1).min(m - 1);
            let mut k = i - 1;
            for j in i..=last {
                let better = if was_rising {
                    values[j] > values[k]
                } else {
                    values[j] < values[k]
                };
                if better {
                    k = j;
                }
            }
            let accepted = match mode {
                ExtremumMode::Any => true,
                ExtremumMode::Max => was_rising,
                ExtremumMode::Min => !was_rising,
            };
            debug!(
                "median reversal at window {}: {} at sample {}",
                i,
                if was_rising { "maximum" } else { "minimum" },
                k
            );
            if accepted {
                found.push(samples[k].0);
            }
            direction = trend;
            let next = k + window;
            if next + window > m {
                break;
            }
            previous = window_median(next);
            i = next + 1;
            continue;
        }
        if trend != 0 {
            direction = trend;
        }
        previous = current;
        i += 1;
    }
    found
}

fn crossing_accepted(mode: CrossingMode, rising: bool) -> bool {
    match mode {
        CrossingMode::Any => true,
        CrossingMode::Up => rising,
        CrossingMode::Down => !rising,
    }
}

/// Zero crossings of the raw samples. Exact zeros are reported verbatim; a zero run between
/// opposite signs also yields the interpolated crossing of its two signed neighbours. Runs
/// touching zero without a sign change count only in `Any` mode.
pub fn zero_crossings(samples: &[(f64, f64)], mode: CrossingMode) -> Vec<f64> {
    let mut found = Vec::new();
    let mut last_signed: Option<(f64, f64)> = None;
    let mut zeros: Vec<f64> = Vec::new();
    for &(position, value) in samples {
        if value == 0.0 {
            zeros.push(position);
            continue;
        }
        match last_signed {
            None => {
                // leading zeros take the direction of the first signed sample
                if !zeros.is_empty() && crossing_accepted(mode, value > 0.0) {
                    found.extend(zeros.iter().copied());
                }
            }
            Some((p0, v0)) if v0 * value < 0.0 => {
                if crossing_accepted(mode, v0 < 0.0) {
                    let crossing = linearize(p0, v0, position, value);
                    let mut group = zeros.clone();
                    if !zeros.contains(&crossing) {
                        group.push(crossing);
                    }
                    group.sort_by(|a, b| a.total_cmp(b));
                    if position < p0 {
                        group.reverse();
                    }
                    found.extend(group);
                }
            }
            Some(_) => {
                if !zeros.is_empty() && mode == CrossingMode::Any {
                    found.extend(zeros.iter().copied());
                }
            }
        }
        zeros.clear();
        last_signed = Some((position, value));
    }
    if !zeros.is_empty() {
        // trailing zeros take the direction from the last signed sample
        let accepted = match last_signed {
            Some((_, v0)) => crossing_accepted(mode, v0 < 0.0),
            None => mode == CrossingMode::Any,
        };
        if accepted {
            found.extend(zeros);
        }
    }
    found
}

/// Extrema or zero crossings of `config.column`.
pub fn analyze_trend<D: DataSource + ?Sized>(
    source: &D,
    config: &TrendConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let columns = source.columns();
    if columns == 0 {
        return Err(AnalysisError::DataUnavailable("the data source is empty".to_string()));
    }
    if config.column >= columns {
        return Err(AnalysisError::InvalidIndex(format!(
            "column {} does not exist ({} columns)",
            config.column, columns
        )));
    }
    if let Some(xc) = config.x_column {
        if xc >= columns {
            return Err(AnalysisError::InvalidIndex(format!(
                "position column {} does not exist ({} columns)",
                xc, columns
            )));
        }
    }
    let total = source.rows(config.column);
    if total == 0 {
        return Err(AnalysisError::DataUnavailable(format!(
            "column {} has no rows",
            config.column
        )));
    }
    let (start, end) = config.rows.unwrap_or((0, total));
    if start >= end || end > total {
        return Err(AnalysisError::InvalidIndex(format!(
            "rows {}..{} are outside 0..{}",
            start, end, total
        )));
    }
    let (Some(low), Some(high)) = (
        source.min(config.column, start..end),
        source.max(config.column, start..end),
    ) else {
        return Err(AnalysisError::DataUnavailable(format!(
            "column {} has no valid value in rows {}..{}",
            config.column, start, end
        )));
    };
    debug!("column {} ranges over [{}, {}]", config.column, low, high);

    let Some(window) = effective_window(config.order, end - start) else {
        info!(
            "{} rows are too few for a median window of {}",
            end - start,
            config.order
        );
        return Ok(AnalysisResult::nothing());
    };
    let samples = valid_samples(source, config.column, config.x_column, start..end);
    let positions = match config.mode {
        TrendMode::Extrema(mode) => median_extrema(&samples, window, mode),
        TrendMode::Zeroes(mode) => zero_crossings(&samples, mode),
    };
    info!(
        "{} analysis of column {} (window {}): {} found",
        config.mode,
        config.column,
        window,
        positions.len()
    );
    Ok(AnalysisResult::found(positions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::analysis::data_source::DataTable;
    use approx::assert_relative_eq;

    fn indexed(values: &[f64]) -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }

    #[test]
    fn test_window_clamp() {
        assert_eq!(effective_window(1000, 30), Some(10));
        assert_eq!(effective_window(5, 30), Some(5));
        assert_eq!(effective_window(1, 30), Some(3));
        assert_eq!(effective_window(5, 8), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_zero_crossing_scenario_with_nan() {
        let samples = indexed(&[1.0, 2.0, f64::NAN, 0.0, -2.0, -3.0]);
        let crossings = zero_crossings(&samples, CrossingMode::Any);
        assert_eq!(crossings, vec![2.5, 3.0]);
    }

    #[test]
    fn test_directed_crossings() {
        let samples = indexed(&[-1.0, 1.0, 3.0, -1.0, 0.0, 0.0, 2.0]);
        let up = zero_crossings(&samples, CrossingMode::Up);
        assert_eq!(up, vec![0.5, 4.0, 5.0]);
        let down = zero_crossings(&samples, CrossingMode::Down);
        assert_eq!(down, vec![2.75]);
        // touching zero without a sign change
        let touch = indexed(&[1.0, 0.0, 1.0]);
        assert_eq!(zero_crossings(&touch, CrossingMode::Any), vec![1.0]);
        assert!(zero_crossings(&touch, CrossingMode::Up).is_empty());
    }

    #[test]
    fn test_median_extrema_of_noisy_sine() {
        // sin sampled at 0.1 with alternating spikes the median removes
        let values: Vec<f64> = (0..63)
            .map(|i| {
                let x = i as f64 * 0.1;
                let noise = if i % 7 == 3 { 0.5 } else { 0.0 };
                x.sin() + noise
            })
            .collect();
        let samples = indexed(&values);
        let maxima = median_extrema(&samples, 5, ExtremumMode::Max);
        assert_eq!(maxima.len(), 1);
        assert!((maxima[0] - 15.7).abs() <= 3.0, "maximum at sample {}", maxima[0]);
        let minima = median_extrema(&samples, 5, ExtremumMode::Min);
        assert_eq!(minima.len(), 1);
        assert!((minima[0] - 47.1).abs() <= 3.0, "minimum at sample {}", minima[0]);
    }

    #[test]
    fn test_extrema_skip_nan_cells_around_peak() {
        // parabola peaking at row 20, gaps on both sides of the peak
        let column: Vec<f64> = (0..41)
            .map(|i| {
                if [5, 19, 21].contains(&i) {
                    f64::NAN
                } else {
                    -((i as f64 - 20.0).powi(2))
                }
            })
            .collect();
        let table = DataTable::from_columns(vec![column]);
        let any = analyze_trend(&table, &TrendConfig::default()).unwrap();
        assert_eq!(any.values, Some(vec![20.0]));
        let max = TrendConfig {
            mode: TrendMode::Extrema(ExtremumMode::Max),
            ..Default::default()
        };
        assert_eq!(analyze_trend(&table, &max).unwrap().values, Some(vec![20.0]));
        let min = TrendConfig {
            mode: TrendMode::Extrema(ExtremumMode::Min),
            ..Default::default()
        };
        assert!(analyze_trend(&table, &min).unwrap().is_empty());
    }

    #[test]
    fn test_no_reversal_is_nan_sentinel() {
        let table = DataTable::from_columns(vec![(0..30).map(|i| i as f64).collect()]);
        let result = analyze_trend(&table, &TrendConfig::default()).unwrap();
        assert!(result.is_empty());
        assert!(result.to_vec()[0].is_nan());
    }

    #[test]
    fn test_too_few_rows() {
        let table = DataTable::from_columns(vec![vec![1.0, 3.0, 2.0, 5.0, 1.0, 0.0, 2.0, 1.0]]);
        let result = analyze_trend(&table, &TrendConfig::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_positions_from_x_column() {
        let table = DataTable::from_columns(vec![
            vec![1.0, 2.0, f64::NAN, 0.0, -2.0, -3.0, -4.0, -5.0, -6.0],
            (1..=9).map(|i| 10.0 * i as f64).collect(),
        ]);
        let config = TrendConfig {
            x_column: Some(1),
            mode: TrendMode::Zeroes(CrossingMode::Any),
            order: 1,
            ..Default::default()
        };
        let result = analyze_trend(&table, &config).unwrap().values.unwrap();
        assert_relative_eq!(result[0], 35.0);
        assert_relative_eq!(result[1], 40.0);
    }

    #[test]
    fn test_errors() {
        let table = DataTable::from_columns(vec![vec![f64::NAN; 12]]);
        assert!(matches!(
            analyze_trend(&table, &TrendConfig::default()),
            Err(AnalysisError::DataUnavailable(_))
        ));
        let config = TrendConfig {
            column: 3,
            ..Default::default()
        };
        assert!(matches!(
            analyze_trend(&table, &config),
            Err(AnalysisError::InvalidIndex(_))
        ));
        let rows = TrendConfig {
            rows: Some((5, 40)),
            ..Default::default()
        };
        assert!(matches!(
            analyze_trend(&table, &rows),
            Err(AnalysisError::InvalidIndex(_))
        ));
        assert!(matches!(
            analyze_trend(&DataTable::new(), &TrendConfig::default()),
            Err(AnalysisError::DataUnavailable(_))
        ));
    }
}
