//! Typed configuration of the analysis algorithms. The command layer (or the task-document
//! loader in `Utils::task_parser`) fills these in; the algorithms never parse strings.
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Which sign changes count as a zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CrossingMode {
    #[default]
    Any,
    /// negative to positive
    Up,
    /// positive to negative
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExtremumMode {
    #[default]
    Any,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum IntegrationMethod {
    #[default]
    Trapezoidal,
    Simpson,
}

/// What a 1D integration returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum IntegrationOutput {
    /// final sum per vector component
    #[default]
    #[strum(serialize = "value")]
    Value,
    /// cumulative partial sum after every step
    #[strum(serialize = "points")]
    Points,
    /// upper end of every step
    #[strum(serialize = "xvals")]
    XValues,
}

/// Discrete-data analysis mode: median-trend extrema or raw zero crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendMode {
    Extrema(ExtremumMode),
    Zeroes(CrossingMode),
}

impl Default for TrendMode {
    fn default() -> Self {
        TrendMode::Extrema(ExtremumMode::Any)
    }
}

impl fmt::Display for TrendMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrendMode::Extrema(mode) => write!(f, "extrema:{}", mode),
            TrendMode::Zeroes(mode) => write!(f, "zeroes:{}", mode),
        }
    }
}

/// `extrema`, `zeroes`, or either followed by `:` and a direction (`extrema:max`, `zeroes:up`)
impl FromStr for TrendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, direction) = match s.split_once(':') {
            Some((kind, direction)) => (kind.trim(), direction.trim()),
            None => (s.trim(), "any"),
        };
        match kind {
            "extrema" => ExtremumMode::from_str(direction)
                .map(TrendMode::Extrema)
                .map_err(|_| format!("unknown extremum direction '{}'", direction)),
            "zeroes" => CrossingMode::from_str(direction)
                .map(TrendMode::Zeroes)
                .map_err(|_| format!("unknown crossing direction '{}'", direction)),
            _ => Err(format!("unknown trend mode '{}'", s)),
        }
    }
}

/// Zero and extremum search over a continuous interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub expression: String,
    /// analysis variable; `None` picks the only variable of the expression, else `x`
    pub variable: Option<String>,
    pub interval: Option<(f64, f64)>,
    /// sample count of the coarse scan
    pub samples: usize,
    /// localization tolerance
    pub eps: f64,
    /// used by zero search
    pub crossing: CrossingMode,
    /// used by extremum search
    pub extremum: ExtremumMode,
    /// publication name of the result
    pub name: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            expression: String::new(),
            variable: None,
            interval: None,
            samples: 21,
            eps: 1e-10,
            crossing: CrossingMode::Any,
            extremum: ExtremumMode::Any,
            name: None,
        }
    }
}

impl ScanConfig {
    pub fn new(expression: &str, a: f64, b: f64) -> Self {
        ScanConfig {
            expression: expression.to_string(),
            interval: Some((a, b)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntegrationConfig {
    pub expression: String,
    pub variable: Option<String>,
    pub bounds: Option<(f64, f64)>,
    /// defaults to a thousandth of the interval
    pub step: Option<f64>,
    pub method: IntegrationMethod,
    pub output: IntegrationOutput,
    pub name: Option<String>,
}

impl IntegrationConfig {
    pub fn new(expression: &str, a: f64, b: f64) -> Self {
        IntegrationConfig {
            expression: expression.to_string(),
            bounds: Some((a, b)),
            ..Default::default()
        }
    }
}

/// Integral over `ax <= x <= bx`, `ay(x) <= y <= by(x)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Integration2DConfig {
    pub expression: String,
    pub x_variable: String,
    pub y_variable: String,
    pub x_bounds: Option<(f64, f64)>,
    /// inner bounds as expressions, possibly depending on the outer variable
    pub y_bounds: Option<(String, String)>,
    /// default: a hundredth of the outer span
    pub x_step: Option<f64>,
    /// default: a hundredth of the inner span
    pub y_step: Option<f64>,
    pub method: IntegrationMethod,
    pub name: Option<String>,
}

impl Default for Integration2DConfig {
    fn default() -> Self {
        Integration2DConfig {
            expression: String::new(),
            x_variable: "x".to_string(),
            y_variable: "y".to_string(),
            x_bounds: None,
            y_bounds: None,
            x_step: None,
            y_step: None,
            method: IntegrationMethod::Trapezoidal,
            name: None,
        }
    }
}

impl Integration2DConfig {
    pub fn new(expression: &str, x_bounds: (f64, f64), y_bounds: (&str, &str)) -> Self {
        Integration2DConfig {
            expression: expression.to_string(),
            x_bounds: Some(x_bounds),
            y_bounds: Some((y_bounds.0.to_string(), y_bounds.1.to_string())),
            ..Default::default()
        }
    }
}

/// Median-trend analysis of one data column.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    pub column: usize,
    /// optional position column; row indices are used otherwise
    pub x_column: Option<usize>,
    /// half-open row range, all rows by default
    pub rows: Option<(usize, usize)>,
    /// median window
    pub order: usize,
    pub mode: TrendMode,
    pub name: Option<String>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            column: 0,
            x_column: None,
            rows: None,
            order: 5,
            mode: TrendMode::default(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaylorConfig {
    pub expression: String,
    pub variable: Option<String>,
    pub center: f64,
    pub order: usize,
    /// spacing of the difference samples
    pub step: f64,
    pub name: Option<String>,
}

impl Default for TaylorConfig {
    fn default() -> Self {
        TaylorConfig {
            expression: String::new(),
            variable: None,
            center: 0.0,
            order: 6,
            step: 0.1,
            name: None,
        }
    }
}

impl TaylorConfig {
    pub fn new(expression: &str, center: f64, order: usize) -> Self {
        TaylorConfig {
            expression: expression.to_string(),
            center,
            order,
            ..Default::default()
        }
    }
}

/// One analysis task, as produced by the command layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisConfig {
    Zeroes(ScanConfig),
    Extrema(ScanConfig),
    Integrate(IntegrationConfig),
    Integrate2D(Integration2DConfig),
    Trend(TrendConfig),
    Taylor(TaylorConfig),
}

impl AnalysisConfig {
    /// default publication name of the task
    pub fn default_name(&self) -> &'static str {
        match self {
            AnalysisConfig::Zeroes(_) => "zeroes",
            AnalysisConfig::Extrema(_) => "extrema",
            AnalysisConfig::Integrate(_) => "integrate",
            AnalysisConfig::Integrate2D(_) => "integrate2",
            AnalysisConfig::Trend(_) => "trend",
            AnalysisConfig::Taylor(_) => "taylor",
        }
    }

    /// publication name: the configured one, else the default
    pub fn name(&self) -> String {
        let configured = match self {
            AnalysisConfig::Zeroes(c) | AnalysisConfig::Extrema(c) => &c.name,
            AnalysisConfig::Integrate(c) => &c.name,
            AnalysisConfig::Integrate2D(c) => &c.name,
            AnalysisConfig::Trend(c) => &c.name,
            AnalysisConfig::Taylor(c) => &c.name,
        };
        configured
            .clone()
            .unwrap_or_else(|| self.default_name().to_string())
    }
}
