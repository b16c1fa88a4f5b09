//! Cross-module behaviour of the analysis engine.
use crate::numerical::analysis::analyzer::Analyzer;
use crate::numerical::analysis::config::{
    AnalysisConfig, CrossingMode, ExtremumMode, Integration2DConfig, IntegrationConfig,
    IntegrationMethod, ScanConfig, TaylorConfig, TrendConfig, TrendMode,
};
use crate::numerical::analysis::context::AnalysisContext;
use crate::numerical::analysis::data_source::DataTable;
use crate::numerical::analysis::error::AnalysisError;
use crate::numerical::analysis::quadrature::{integrate, integrate_2d};
use crate::numerical::analysis::roots::{find_extrema, find_zeroes};
use crate::numerical::analysis::sampler::{TargetMode, find_brackets};
use crate::numerical::analysis::trend::{analyze_trend, effective_window, median_extrema};
use crate::symbolic::evaluator::{Evaluator, SymbolicEvaluator};
use approx::assert_relative_eq;
use std::f64::consts::PI;

fn quiet() -> AnalysisContext {
    let mut context = AnalysisContext::new();
    context.loglevel = Some("off".to_string());
    context
}

#[test]
fn single_sign_change_gives_accurate_root() {
    let mut ev = SymbolicEvaluator::new();
    let ctx = quiet();
    for (expression, a, b) in [
        ("x^3 - 2", 0.0, 3.0),
        ("exp(x) - 3", -1.0, 4.0),
        ("cos(x) - x", 0.0, 1.5),
    ] {
        let mut config = ScanConfig::new(expression, a, b);
        config.eps = 1e-10;
        let roots = find_zeroes(&mut ev, &config, &ctx).unwrap().values.unwrap();
        assert_eq!(roots.len(), 1, "{}", expression);
        ev.set_expression(expression).unwrap();
        let x = ev.lookup_variable("x").unwrap();
        ev.set_value(x, roots[0]);
        assert!(ev.eval().abs() < 1e-8, "{} at {}", expression, roots[0]);
    }
}

#[test]
fn monotonic_function_has_at_most_one_bracket() {
    let mut ev = SymbolicEvaluator::new();
    for expression in ["x^3 + x", "exp(x) - 2", "atan(x)", "x - 10"] {
        ev.set_expression(expression).unwrap();
        let x = ev.lookup_variable("x").unwrap();
        let brackets = find_brackets(&mut ev, x, -3.0, 3.0, 50, TargetMode::Zero(CrossingMode::Any));
        assert!(brackets.len() <= 1, "{}", expression);
    }
}

#[test]
fn constant_integrand_uses_closed_form() {
    let mut ev = SymbolicEvaluator::new();
    let mut ctx = quiet();
    for (c, a, b) in [(2.5, 0.0, 4.0), (-1.0, 3.0, -2.0), (7.0, 1e-3, 1e3)] {
        let config = IntegrationConfig::new(&c.to_string(), a, b);
        let before = ev.evaluations();
        let value = integrate(&mut ev, &config, &mut ctx).unwrap().to_vec()[0];
        assert_relative_eq!(value, c * (b - a), max_relative = 1e-12);
        // F(b) and F(a) only
        assert_eq!(ev.evaluations() - before, 2);
    }
}

#[test]
fn swapped_bounds_flip_the_sign() {
    let mut ev = SymbolicEvaluator::new();
    let mut ctx = quiet();
    for method in [IntegrationMethod::Trapezoidal, IntegrationMethod::Simpson] {
        let mut forward = IntegrationConfig::new("sin(x) * exp(-x/3)", 0.2, 2.7);
        forward.method = method;
        let mut backward = IntegrationConfig::new("sin(x) * exp(-x/3)", 2.7, 0.2);
        backward.method = method;
        let f = integrate(&mut ev, &forward, &mut ctx).unwrap().to_vec()[0];
        let g = integrate(&mut ev, &backward, &mut ctx).unwrap().to_vec()[0];
        assert_eq!(f, -g);
    }
}

#[test]
fn constant_over_rectangle_is_area_times_constant() {
    let mut ev = SymbolicEvaluator::new();
    let mut ctx = quiet();
    let config = Integration2DConfig::new("4", (0.0, 5.0), ("0", "4"));
    let value = integrate_2d(&mut ev, &config, &mut ctx).unwrap().to_vec()[0];
    assert_eq!(value, 80.0);
}

#[test]
fn trend_window_clamp() {
    assert_eq!(effective_window(1000, 30), Some(10));
    for n in 0..9 {
        assert_eq!(effective_window(5, n), None);
    }
    let values: Vec<f64> = (0..8).map(|i| ((i as f64) * 1.3).sin()).collect();
    let table = DataTable::from_columns(vec![values]);
    let result = analyze_trend(&table, &TrendConfig::default()).unwrap();
    assert!(result.to_vec()[0].is_nan());
}

#[test]
fn large_window_is_clamped_to_a_third_of_the_rows() {
    // a single peak at row 15, visible to a window of 10
    let values: Vec<f64> = (0..30).map(|i| -((i as f64 - 15.0).powi(2))).collect();
    let samples: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect();
    let direct = median_extrema(&samples, 10, ExtremumMode::Any);
    let table = DataTable::from_columns(vec![values]);
    let config = TrendConfig {
        order: 1000,
        ..Default::default()
    };
    let result = analyze_trend(&table, &config).unwrap();
    assert_eq!(result.values, Some(direct.clone()));
    assert_eq!(direct, vec![15.0]);
}

#[test]
fn parabola_and_sine_scenarios() {
    let mut ev = SymbolicEvaluator::new();
    let ctx = quiet();
    let mut config = ScanConfig::new("x^2-4", 0.0, 5.0);
    config.samples = 21;
    let zeroes = find_zeroes(&mut ev, &config, &ctx).unwrap().values.unwrap();
    assert_eq!(zeroes.len(), 1);
    assert_relative_eq!(zeroes[0], 2.0, epsilon = 1e-6);

    let mut sine = ScanConfig::new("sin(x)", 0.0, 2.0 * PI);
    sine.extremum = ExtremumMode::Max;
    let maxima = find_extrema(&mut ev, &sine, &ctx).unwrap().values.unwrap();
    assert_eq!(maxima.len(), 1);
    assert_relative_eq!(maxima[0], PI / 2.0, epsilon = 1e-6);
}

#[test]
fn data_crossing_scenario() {
    let table = DataTable::from_columns(vec![vec![
        1.0,
        2.0,
        f64::NAN,
        0.0,
        -2.0,
        -3.0,
        -2.5,
        -1.5,
        -1.0,
    ]]);
    let config = TrendConfig {
        mode: TrendMode::Zeroes(CrossingMode::Any),
        ..Default::default()
    };
    let crossings = analyze_trend(&table, &config).unwrap().values.unwrap();
    // the exact zero and the interpolated crossing between 2 and -2
    assert!(crossings.contains(&3.0));
    assert!(crossings.contains(&2.5));
    assert_eq!(crossings.len(), 2);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let mut analyzer = Analyzer::with_context(SymbolicEvaluator::new(), quiet());
    let table = DataTable::from_columns(vec![
        (0..60).map(|i| (i as f64 * 0.2).sin() + 0.1 * ((i * 7 % 5) as f64)).collect(),
    ]);
    let tasks = vec![
        AnalysisConfig::Zeroes(ScanConfig::new("sin(3*x) - 0.2", -2.0, 2.0)),
        AnalysisConfig::Extrema(ScanConfig::new("x^4 - 3*x^2", -2.0, 2.0)),
        AnalysisConfig::Integrate(IntegrationConfig::new("exp(-x^2)", -1.0, 1.5)),
        AnalysisConfig::Integrate2D(Integration2DConfig::new("x*y", (0.0, 1.0), ("0", "x"))),
        AnalysisConfig::Trend(TrendConfig::default()),
        AnalysisConfig::Taylor(TaylorConfig::new("cos(x)", 0.5, 4)),
    ];
    for task in &tasks {
        let first = analyzer.run(task, Some(&table)).unwrap();
        let second = analyzer.run(task, Some(&table)).unwrap();
        let bits = |r: &Vec<f64>| r.iter().map(|v| v.to_bits()).collect::<Vec<u64>>();
        assert_eq!(bits(&first.result.to_vec()), bits(&second.result.to_vec()));
        assert_eq!(first.summary, second.summary);
    }
}

#[test]
fn errors_leave_no_partial_result() {
    let mut ev = SymbolicEvaluator::new();
    let mut ctx = quiet();
    let mut config = IntegrationConfig::new("x^2", 0.0, 1e6);
    config.step = Some(1e-6);
    assert!(matches!(
        integrate(&mut ev, &config, &mut ctx),
        Err(AnalysisError::InvalidIntegrationPrecision(_))
    ));
    ctx.abort.request_abort();
    let mut long = IntegrationConfig::new("x", 0.0, 1.0);
    long.step = Some(1e-7);
    assert_eq!(
        integrate(&mut ev, &long, &mut ctx),
        Err(AnalysisError::ProcessAbortedByUser)
    );
}
