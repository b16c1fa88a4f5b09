use RustedAnalysis::numerical::analysis::config::{
    Integration2DConfig, IntegrationConfig, IntegrationMethod, ScanConfig,
};
use RustedAnalysis::numerical::analysis::context::AnalysisContext;
use RustedAnalysis::numerical::analysis::quadrature::{integrate, integrate_2d};
use RustedAnalysis::numerical::analysis::roots::{find_extrema, find_zeroes};
use RustedAnalysis::symbolic::evaluator::SymbolicEvaluator;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_zeroes(c: &mut Criterion) {
    let mut evaluator = SymbolicEvaluator::new();
    let context = AnalysisContext::new();
    let mut config = ScanConfig::new("sin(5*x) - 0.3*x", -3.0, 3.0);
    config.samples = 200;
    c.bench_function("zeroes of sin(5x) - 0.3x", |b| {
        b.iter(|| find_zeroes(&mut evaluator, black_box(&config), &context))
    });
}

fn bench_extrema(c: &mut Criterion) {
    let mut evaluator = SymbolicEvaluator::new();
    let context = AnalysisContext::new();
    let config = ScanConfig::new("x^4 - 3*x^2 + x", -2.0, 2.0);
    c.bench_function("extrema of a quartic", |b| {
        b.iter(|| find_extrema(&mut evaluator, black_box(&config), &context))
    });
}

fn bench_integrate(c: &mut Criterion) {
    let mut evaluator = SymbolicEvaluator::new();
    let mut context = AnalysisContext::new();
    let mut group = c.benchmark_group("1D integration");
    for method in [IntegrationMethod::Trapezoidal, IntegrationMethod::Simpson] {
        let mut config = IntegrationConfig::new("exp(-x^2) * cos(3*x)", -2.0, 2.0);
        config.step = Some(1e-4);
        config.method = method;
        group.bench_function(method.to_string(), |b| {
            b.iter(|| integrate(&mut evaluator, black_box(&config), &mut context))
        });
    }
    group.finish();
}

fn bench_integrate_2d(c: &mut Criterion) {
    let mut evaluator = SymbolicEvaluator::new();
    let mut context = AnalysisContext::new();
    let config = Integration2DConfig::new("x*y + sin(y)", (0.0, 1.0), ("0", "sqrt(x)"));
    c.bench_function("2D integration, curved domain", |b| {
        b.iter(|| integrate_2d(&mut evaluator, black_box(&config), &mut context))
    });
}

criterion_group!(benches, bench_zeroes, bench_extrema, bench_integrate, bench_integrate_2d);
criterion_main!(benches);
