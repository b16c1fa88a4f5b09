//! # Analyzer
//!
//! One evaluator and one [`AnalysisContext`] behind a single entry point. Each call runs one
//! algorithm and publishes its result vector in the evaluator under the configured name (or
//! the task's default name), so later expressions can refer to it.
//!
//! ```rust, ignore
//! use RustedAnalysis::numerical::analysis::analyzer::Analyzer;
//! use RustedAnalysis::numerical::analysis::config::{AnalysisConfig, ScanConfig};
//! use RustedAnalysis::symbolic::evaluator::SymbolicEvaluator;
//!
//! let mut analyzer = Analyzer::new(SymbolicEvaluator::new());
//! let report = analyzer
//!     .run(&AnalysisConfig::Zeroes(ScanConfig::new("x^2-4", 0.0, 5.0)), None)
//!     .unwrap();
//! println!("{}", report.summary);
//! ```
use crate::Utils::logger::{LoggerError, init_logger, parse_loglevel};
use crate::numerical::analysis::config::{
    AnalysisConfig, Integration2DConfig, IntegrationConfig, ScanConfig, TaylorConfig,
    TrendConfig,
};
use crate::numerical::analysis::context::AnalysisContext;
use crate::numerical::analysis::data_source::DataSource;
use crate::numerical::analysis::error::AnalysisError;
use crate::numerical::analysis::quadrature;
use crate::numerical::analysis::result::AnalysisResult;
use crate::numerical::analysis::roots;
use crate::numerical::analysis::taylor::{self, TaylorExpansion};
use crate::numerical::analysis::trend;
use crate::symbolic::evaluator::Evaluator;
use log::{error, info, warn};
use std::collections::HashMap;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// Outcome of [`Analyzer::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// publication name
    pub name: String,
    pub result: AnalysisResult,
    /// `name = {values}`, or the polynomial for Taylor tasks
    pub summary: String,
}

pub struct Analyzer<E: Evaluator> {
    pub evaluator: E,
    pub context: AnalysisContext,
}

impl<E: Evaluator> Analyzer<E> {
    pub fn new(evaluator: E) -> Self {
        Analyzer {
            evaluator,
            context: AnalysisContext::new(),
        }
    }

    pub fn with_context(evaluator: E, context: AnalysisContext) -> Self {
        Analyzer { evaluator, context }
    }

    fn publish(&mut self, name: &Option<String>, default: &str, result: &AnalysisResult) {
        let name = name.as_deref().unwrap_or(default);
        self.evaluator.publish_vector(name, result.to_vec());
    }

    pub fn find_zeroes(&mut self, config: &ScanConfig) -> Result<AnalysisResult, AnalysisError> {
        let result = roots::find_zeroes(&mut self.evaluator, config, &self.context)?;
        self.publish(&config.name, "zeroes", &result);
        Ok(result)
    }

    pub fn find_extrema(&mut self, config: &ScanConfig) -> Result<AnalysisResult, AnalysisError> {
        let result = roots::find_extrema(&mut self.evaluator, config, &self.context)?;
        self.publish(&config.name, "extrema", &result);
        Ok(result)
    }

    pub fn integrate(
        &mut self,
        config: &IntegrationConfig,
    ) -> Result<AnalysisResult, AnalysisError> {
        let result = quadrature::integrate(&mut self.evaluator, config, &mut self.context)?;
        self.publish(&config.name, "integrate", &result);
        Ok(result)
    }

    pub fn integrate_2d(
        &mut self,
        config: &Integration2DConfig,
    ) -> Result<AnalysisResult, AnalysisError> {
        let result = quadrature::integrate_2d(&mut self.evaluator, config, &mut self.context)?;
        self.publish(&config.name, "integrate2", &result);
        Ok(result)
    }

    pub fn analyze_trend(
        &mut self,
        config: &TrendConfig,
        source: &dyn DataSource,
    ) -> Result<AnalysisResult, AnalysisError> {
        let result = trend::analyze_trend(source, config)?;
        self.publish(&config.name, "trend", &result);
        Ok(result)
    }

    pub fn taylor(&mut self, config: &TaylorConfig) -> Result<TaylorExpansion, AnalysisError> {
        let expansion = taylor::taylor(&mut self.evaluator, config)?;
        let name = config.name.as_deref().unwrap_or("taylor");
        self.evaluator
            .publish_vector(name, expansion.coefficients.clone());
        Ok(expansion)
    }

    /// Runs one typed task with logging set up from the context, and logs its statistics.
    pub fn run(
        &mut self,
        config: &AnalysisConfig,
        data: Option<&dyn DataSource>,
    ) -> Result<AnalysisReport, AnalysisError> {
        if let Some(level) = parse_loglevel(self.context.loglevel.as_deref()) {
            match init_logger(level, self.context.log_file.as_deref()) {
                // a logger installed by an earlier run stays in place
                Ok(()) | Err(LoggerError::AlreadyInstalled(_)) => {}
                Err(e) => warn!("{}", e),
            }
        }
        let name = config.name();
        let begin = Instant::now();
        let evaluations_before = self.evaluator.evaluations();
        let mut stats: HashMap<String, String> = HashMap::new();

        let outcome = match config {
            AnalysisConfig::Zeroes(c) => self.find_zeroes(c).map(|r| (r, None)),
            AnalysisConfig::Extrema(c) => self.find_extrema(c).map(|r| (r, None)),
            AnalysisConfig::Integrate(c) => self.integrate(c).map(|r| (r, None)),
            AnalysisConfig::Integrate2D(c) => self.integrate_2d(c).map(|r| (r, None)),
            AnalysisConfig::Trend(c) => match data {
                Some(source) => {
                    let rows = source.rows(c.column);
                    let range = c.rows.map_or(0..rows, |(start, end)| start..end);
                    if let Some(low) = source.min(c.column, range.clone()) {
                        stats.insert("data min".to_string(), low.to_string());
                    }
                    if let Some(high) = source.max(c.column, range) {
                        stats.insert("data max".to_string(), high.to_string());
                    }
                    self.analyze_trend(c, source).map(|r| (r, None))
                }
                None => Err(AnalysisError::DataUnavailable(
                    "no data source for trend analysis".to_string(),
                )),
            },
            AnalysisConfig::Taylor(c) => self
                .taylor(c)
                .map(|t| (AnalysisResult::found(t.coefficients.clone()), Some(t.to_string()))),
        };
        let (result, text) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} failed: {}", name, e);
                return Err(e);
            }
        };

        let summary = match text {
            Some(polynomial) => format!("{} = {}", name, polynomial),
            None => format!("{} = {{{}}}", name, result),
        };
        stats.insert("task".to_string(), config.default_name().to_string());
        stats.insert("name".to_string(), name.clone());
        stats.insert(
            "evaluations".to_string(),
            (self.evaluator.evaluations() - evaluations_before).to_string(),
        );
        stats.insert("values found".to_string(), result.len().to_string());
        stats.insert(
            "elapsed, ms".to_string(),
            format!("{:.3}", begin.elapsed().as_secs_f64() * 1e3),
        );
        let mut table = Builder::from(stats).build();
        table.with(Style::modern_rounded());
        info!("\n \n ANALYSIS STATISTICS \n \n {}", table.to_string());
        info!("{}", summary);

        Ok(AnalysisReport {
            name,
            result,
            summary,
        })
    }
}
