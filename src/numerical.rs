/// # Analysis engine
/// ```
/// use RustedAnalysis::numerical::analysis::config::ScanConfig;
/// use RustedAnalysis::numerical::analysis::context::AnalysisContext;
/// use RustedAnalysis::numerical::analysis::roots::find_extrema;
/// use RustedAnalysis::symbolic::evaluator::SymbolicEvaluator;
///
/// let mut evaluator = SymbolicEvaluator::new();
/// let config = ScanConfig::new("(x-1)^2", -2.0, 3.0);
/// let extrema = find_extrema(&mut evaluator, &config, &AnalysisContext::new()).unwrap();
/// assert!((extrema.to_vec()[0] - 1.0).abs() < 1e-6);
/// ```
pub mod analysis;
