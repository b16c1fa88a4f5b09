//! # Numerical analysis of expressions and data
//!
//! Zero and extremum search on an interval, 1D and 2D quadrature, trend analysis of sampled
//! columns and Taylor expansion. Every algorithm drives an [`Evaluator`](crate::symbolic::evaluator::Evaluator)
//! and leaves the variables it touches as it found them.
//!
//! # Example
//! ```
//! use RustedAnalysis::numerical::analysis::analyzer::Analyzer;
//! use RustedAnalysis::numerical::analysis::config::{IntegrationConfig, ScanConfig};
//! use RustedAnalysis::symbolic::evaluator::SymbolicEvaluator;
//!
//! let mut analyzer = Analyzer::new(SymbolicEvaluator::new());
//! analyzer.context.loglevel = Some("off".to_string());
//! let zeroes = analyzer.find_zeroes(&ScanConfig::new("x^2-4", 0.0, 5.0)).unwrap();
//! assert!((zeroes.to_vec()[0] - 2.0).abs() < 1e-6);
//! let area = analyzer.integrate(&IntegrationConfig::new("3", 1.0, 4.0)).unwrap();
//! assert_eq!(area.to_vec(), vec![9.0]);
//! ```
/// error kinds of every analysis
pub mod error;
/// typed task configurations and mode flags
pub mod config;
/// abort flag, progress reporting and logging options threaded through the calls
pub mod context;
/// ordered result values with the "nothing found" case
pub mod result;
/// coarse sampling of an interval and detection of sign-change brackets
pub mod sampler;
/// recursive bisection of a bracket down to the requested precision
pub mod localizer;
/// zeroes and extrema of an expression on an interval
pub mod roots;
/// trapezoidal and Simpson integration in one and two dimensions
pub mod quadrature;
/// tabular data access for the trend analyzer
pub mod data_source;
/// median-trend extrema and zero crossings of sampled data
pub mod trend;
/// Taylor coefficients from a divided-difference pyramid
pub mod taylor;
/// facade running typed tasks and publishing their results
pub mod analyzer;
#[cfg(test)]
mod analysis_tests;
