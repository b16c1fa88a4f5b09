use std::fmt;

/// Failures of the analysis algorithms. Every top-level operation either returns a complete
/// result or one of these, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// no expression (or no column) to analyse
    EmptyTarget,
    DataUnavailable(String),
    InvalidIndex(String),
    InvalidOrMissingRange(String),
    /// integration step is invalid or would need too many samples
    InvalidIntegrationPrecision(String),
    /// the named analysis variable does not occur in the expression
    VariableNotFound(String),
    ProcessAbortedByUser,
    /// the evaluator rejected an expression
    Expression(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::EmptyTarget => write!(f, "Nothing to analyse: the target is empty"),
            AnalysisError::DataUnavailable(msg) => write!(f, "Data unavailable: {}", msg),
            AnalysisError::InvalidIndex(msg) => write!(f, "Invalid index: {}", msg),
            AnalysisError::InvalidOrMissingRange(msg) => {
                write!(f, "Invalid or missing range: {}", msg)
            }
            AnalysisError::InvalidIntegrationPrecision(msg) => {
                write!(f, "Invalid integration precision: {}", msg)
            }
            AnalysisError::VariableNotFound(name) => {
                write!(f, "Variable '{}' does not occur in the expression", name)
            }
            AnalysisError::ProcessAbortedByUser => write!(f, "Process aborted by user"),
            AnalysisError::Expression(msg) => write!(f, "Expression error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<String> for AnalysisError {
    fn from(msg: String) -> Self {
        AnalysisError::Expression(msg)
    }
}
