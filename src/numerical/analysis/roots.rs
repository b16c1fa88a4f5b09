//! Zero and extremum search on a continuous interval: coarse bracket scan, then recursive
//! localization of every kept bracket.
use crate::numerical::analysis::config::ScanConfig;
use crate::numerical::analysis::context::AnalysisContext;
use crate::numerical::analysis::error::AnalysisError;
use crate::numerical::analysis::localizer::{ConvergenceBudget, localize};
use crate::numerical::analysis::result::AnalysisResult;
use crate::numerical::analysis::sampler::{
    TargetMode, checked_interval, checked_samples, find_brackets, resolve_variable,
};
use crate::symbolic::evaluator::{Evaluator, VariableScope};
use log::{info, warn};

/// default tolerance when the configured one is unusable
const DEFAULT_EPS: f64 = 1e-10;

/// Zeroes of the configured expression in its interval, filtered by `config.crossing`.
pub fn find_zeroes<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    config: &ScanConfig,
    context: &AnalysisContext,
) -> Result<AnalysisResult, AnalysisError> {
    scan(evaluator, config, TargetMode::Zero(config.crossing), context)
}

/// Extrema (zeroes of the derivative) filtered by `config.extremum`.
pub fn find_extrema<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    config: &ScanConfig,
    context: &AnalysisContext,
) -> Result<AnalysisResult, AnalysisError> {
    scan(evaluator, config, TargetMode::Extremum(config.extremum), context)
}

fn scan<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    config: &ScanConfig,
    mode: TargetMode,
    context: &AnalysisContext,
) -> Result<AnalysisResult, AnalysisError> {
    if config.expression.trim().is_empty() {
        return Err(AnalysisError::EmptyTarget);
    }
    let (a, b) = checked_interval(config.interval)?;
    if a == b {
        return Err(AnalysisError::InvalidOrMissingRange(format!(
            "interval [{}, {}] is empty",
            a, b
        )));
    }
    let samples = checked_samples(config.samples);
    let eps = if config.eps.is_finite() && config.eps > 0.0 {
        config.eps
    } else {
        warn!("tolerance {} is unusable, using {}", config.eps, DEFAULT_EPS);
        DEFAULT_EPS
    };
    let budget = ConvergenceBudget::new(eps);

    let mut scope = VariableScope::new(evaluator);
    scope.set_expression(&config.expression)?;
    let (name, var) = resolve_variable(&mut *scope, config.variable.as_deref(), true)?;
    scope.bind(var);

    let brackets = find_brackets(&mut *scope, var, a, b, samples, mode);
    // the extension probes sit outside [a, b]; endpoint results stay on the endpoint
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let mut positions = Vec::with_capacity(brackets.len());
    for bracket in &brackets {
        context.poll_abort()?;
        let position = localize(&mut *scope, var, bracket, mode.eval_kind(), &budget);
        positions.push(position.clamp(low, high));
    }
    info!(
        "{:?} search for '{}' in {} on [{}, {}]: {} found",
        mode,
        config.expression,
        name,
        a,
        b,
        positions.len()
    );
    Ok(AnalysisResult::found(positions))
}
