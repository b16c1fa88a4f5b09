//! # Sampler and bracket detector
//!
//! Scans an interval at a fixed step and reports brackets: adjacent positions where the probe
//! (the expression value, or its derivative for extremum search) changes sign. Exact zeros are
//! absorbed into runs so a plateau or a tangent point gives one bracket, not two.
//!
//! The scan walks from `a` to `b` in the given order, even when `b < a`: bracket detection
//! compares each sample with the one before it.
use crate::numerical::analysis::config::{CrossingMode, ExtremumMode};
use crate::numerical::analysis::error::AnalysisError;
use crate::symbolic::evaluator::{Evaluator, VarId};
use log::{debug, warn};

/// distance of the extra probes placed just outside the interval
pub const BOUNDARY_EXTENSION: f64 = 1e-10;

/// What is sampled at every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalKind {
    Value,
    Derivative,
}

/// Sign change across a bracket, read in the direction of increasing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// negative to positive
    Rising,
    /// positive to negative
    Falling,
    /// zero run with the same sign on both sides (or no sign at all)
    Touching,
}

/// Target condition of a continuous scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Zero(CrossingMode),
    Extremum(ExtremumMode),
}

impl TargetMode {
    pub fn eval_kind(&self) -> EvalKind {
        match self {
            TargetMode::Zero(_) => EvalKind::Value,
            TargetMode::Extremum(_) => EvalKind::Derivative,
        }
    }

    /// A minimum is a rising zero of the derivative, a maximum a falling one.
    pub fn accepts(&self, transition: Transition) -> bool {
        match self {
            TargetMode::Zero(CrossingMode::Any) | TargetMode::Extremum(ExtremumMode::Any) => true,
            TargetMode::Zero(CrossingMode::Up) | TargetMode::Extremum(ExtremumMode::Min) => {
                transition == Transition::Rising
            }
            TargetMode::Zero(CrossingMode::Down) | TargetMode::Extremum(ExtremumMode::Max) => {
                transition == Transition::Falling
            }
        }
    }
}

/// Two sample positions enclosing a sign change, with their probe values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub left: f64,
    pub right: f64,
    pub left_value: f64,
    pub right_value: f64,
    /// first and last position of an exact-zero run inside the bracket
    pub zero_run: Option<(f64, f64)>,
}

impl Bracket {
    pub fn width(&self) -> f64 {
        (self.right - self.left).abs()
    }

    pub fn transition(&self) -> Transition {
        let (low, high) = if self.left <= self.right {
            (self.left_value, self.right_value)
        } else {
            (self.right_value, self.left_value)
        };
        let rising = low < 0.0 || high > 0.0;
        let falling = low > 0.0 || high < 0.0;
        match (rising, falling) {
            (true, false) => Transition::Rising,
            (false, true) => Transition::Falling,
            _ => Transition::Touching,
        }
    }

    /// Best single position inside the bracket: the middle of a zero run, else the linear
    /// interpolation of the two boundary samples.
    pub fn interpolate(&self) -> f64 {
        if let Some((first, last)) = self.zero_run {
            return 0.5 * (first + last);
        }
        let x = linearize(self.left, self.left_value, self.right, self.right_value);
        if x.is_finite() {
            x
        } else {
            0.5 * (self.left + self.right)
        }
    }
}

/// zero of the straight line through (x0, y0) and (x1, y1)
pub fn linearize(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    x0 - y0 * (x1 - x0) / (y1 - y0)
}

/// Finds all brackets in an ordered series. NaN samples never open a bracket.
pub fn detect_brackets(positions: &[f64], values: &[f64]) -> Vec<Bracket> {
    let n = values.len().min(positions.len());
    let mut brackets = Vec::new();
    let mut i = 0;
    while i < n {
        if values[i] == 0.0 {
            let run_start = i;
            let mut j = i;
            while j < n && values[j] == 0.0 {
                j += 1;
            }
            let run_end = j - 1;
            let left = if run_start > 0 && !values[run_start - 1].is_nan() {
                run_start - 1
            } else {
                run_start
            };
            let right = if j < n && !values[j].is_nan() { j } else { run_end };
            brackets.push(Bracket {
                left: positions[left],
                right: positions[right],
                left_value: values[left],
                right_value: values[right],
                zero_run: Some((positions[run_start], positions[run_end])),
            });
            i = j;
            continue;
        }
        if i + 1 < n && values[i] * values[i + 1] < 0.0 {
            brackets.push(Bracket {
                left: positions[i],
                right: positions[i + 1],
                left_value: values[i],
                right_value: values[i + 1],
                zero_run: None,
            });
        }
        i += 1;
    }
    brackets
}

/// Sample positions from `a` to `b` (end points hit exactly) plus one probe just outside each
/// end point.
pub fn scan_positions(a: f64, b: f64, samples: usize) -> Vec<f64> {
    let samples = samples.max(2);
    let direction = if b >= a { 1.0 } else { -1.0 };
    let step = (b - a) / (samples as f64 - 1.0);
    let mut positions = Vec::with_capacity(samples + 2);
    let before = a - direction * BOUNDARY_EXTENSION;
    if before != a {
        positions.push(before);
    }
    positions.extend((0..samples).map(|i| {
        if i + 1 == samples {
            b
        } else {
            a + i as f64 * step
        }
    }));
    let after = b + direction * BOUNDARY_EXTENSION;
    if after != b {
        positions.push(after);
    }
    positions
}

/// Probe at one position. The derivative probe leaves the variable untouched.
pub fn probe<E: Evaluator + ?Sized>(evaluator: &mut E, var: VarId, x: f64, kind: EvalKind) -> f64 {
    match kind {
        EvalKind::Value => {
            evaluator.set_value(var, x);
            evaluator.eval()
        }
        EvalKind::Derivative => evaluator.derivative(var, x, 0.0),
    }
}

pub fn sample_series<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    var: VarId,
    positions: &[f64],
    kind: EvalKind,
) -> Vec<f64> {
    positions
        .iter()
        .map(|x| probe(evaluator, var, *x, kind))
        .collect()
}

/// Coarse scan of `[a, b]` with `samples` points: brackets matching `mode`, in scan order.
pub fn find_brackets<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    var: VarId,
    a: f64,
    b: f64,
    samples: usize,
    mode: TargetMode,
) -> Vec<Bracket> {
    let positions = scan_positions(a, b, samples);
    let values = sample_series(evaluator, var, &positions, mode.eval_kind());
    let all = detect_brackets(&positions, &values);
    let brackets: Vec<Bracket> = all
        .iter()
        .copied()
        .filter(|bracket| mode.accepts(bracket.transition()))
        .collect();
    debug!(
        "scan of [{}, {}] with {} samples: {} bracket(s), {} kept for {:?}",
        a,
        b,
        samples,
        all.len(),
        brackets.len(),
        mode
    );
    brackets
}

/// Interval check shared by the continuous algorithms.
pub fn checked_interval(interval: Option<(f64, f64)>) -> Result<(f64, f64), AnalysisError> {
    let (a, b) = interval.ok_or_else(|| {
        AnalysisError::InvalidOrMissingRange("no interval given".to_string())
    })?;
    if !a.is_finite() || !b.is_finite() {
        return Err(AnalysisError::InvalidOrMissingRange(format!(
            "interval [{}, {}] is not finite",
            a, b
        )));
    }
    Ok((a, b))
}

/// Resolves the analysis variable of the current expression.
///
/// With a name: `strict` demands that it occurs in the expression, otherwise it is looked up
/// (or declared) in the evaluator. Without a name: the only variable of the expression, else `x`.
pub fn resolve_variable<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    name: Option<&str>,
    strict: bool,
) -> Result<(String, VarId), AnalysisError> {
    let used = evaluator.used_variables();
    let name = match name {
        Some(name) => {
            if let Some(id) = used.get(name) {
                return Ok((name.to_string(), *id));
            }
            if strict {
                return Err(AnalysisError::VariableNotFound(name.to_string()));
            }
            name.to_string()
        }
        None => {
            if used.len() == 1 {
                if let Some((name, id)) = used.iter().next() {
                    return Ok((name.clone(), *id));
                }
            }
            "x".to_string()
        }
    };
    let id = match evaluator.lookup_variable(&name) {
        Some(id) => id,
        None => evaluator.declare_variable(&name, 0.0),
    };
    Ok((name, id))
}

/// Sample count of a scan, at least two.
pub fn checked_samples(samples: usize) -> usize {
    if samples < 2 {
        warn!("{} samples cannot bracket anything, using 2", samples);
        2
    } else {
        samples
    }
}
