//! # Quadrature
//!
//! 1D and 2D definite integrals of (vector) expressions with the trapezoidal or Simpson rule on
//! a fixed step.
//!
//! Before sampling anything the integrator looks for cheaper paths:
//! - an integrand that does not reference the integration variable is integrated in closed
//!   form (`F = x*f`, result `F(b) - F(a)`);
//! - in 2D, a constant integrand over constant bounds is `c * area`, and integrands depending
//!   on one axis only (with constant inner bounds) collapse to one 1D sweep.
//!
//! Cost guard: more than `1e10` steps are refused up front; from `9.9e6` steps on the sweep
//! reports progress and polls the abort flag of the [`AnalysisContext`] after every step.
use crate::numerical::analysis::config::{
    Integration2DConfig, IntegrationConfig, IntegrationMethod, IntegrationOutput,
};
use crate::numerical::analysis::context::AnalysisContext;
use crate::numerical::analysis::error::AnalysisError;
use crate::numerical::analysis::result::AnalysisResult;
use crate::numerical::analysis::sampler::{checked_interval, resolve_variable};
use crate::symbolic::evaluator::{Evaluator, VarId, VariableScope};
use crate::symbolic::utils::{split_additive_terms, split_top_level};
use log::{debug, info, warn};

/// raw step counts from this size on report progress and can be aborted
pub const PROGRESS_THRESHOLD: f64 = 9.9e6;
/// raw step counts above this are refused
pub const MAX_STEPS: f64 = 1e10;
/// default number of steps of a 1D integral
pub const DEFAULT_STEPS_1D: f64 = 1000.0;
/// default number of steps per axis of a 2D integral
pub const DEFAULT_STEPS_2D: f64 = 100.0;

/// Step rule of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisStep {
    /// fixed width, shortened to the span when larger
    Fixed(f64),
    /// the span divided into this many steps
    Divisions(f64),
}

impl AxisStep {
    /// Validates an optional configured step.
    pub fn from_config(step: Option<f64>, divisions: f64) -> Result<Self, AnalysisError> {
        match step {
            None => Ok(AxisStep::Divisions(divisions)),
            Some(h) if h.is_finite() && h > 0.0 => Ok(AxisStep::Fixed(h)),
            Some(h) => Err(AnalysisError::InvalidIntegrationPrecision(format!(
                "step {} must be positive and finite",
                h
            ))),
        }
    }

    pub fn resolve(&self, span: f64) -> f64 {
        match self {
            AxisStep::Fixed(h) => h.min(span),
            AxisStep::Divisions(n) => span / n,
        }
    }
}

/// Number of sweep steps: a raw count within rounding of an integer is taken as is, otherwise
/// the last step is shortened.
pub fn step_count(span: f64, step: f64) -> usize {
    let raw = span / step;
    let nearest = raw.round();
    let steps = if (raw - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest
    } else {
        raw.ceil()
    };
    (steps as usize).max(1)
}

/// `Ok(true)` when the sweep is long enough to report progress.
fn cost_guard(raw_steps: f64) -> Result<bool, AnalysisError> {
    if !(raw_steps <= MAX_STEPS) {
        return Err(AnalysisError::InvalidIntegrationPrecision(format!(
            "{:e} steps requested, at most {:e} are allowed",
            raw_steps, MAX_STEPS
        )));
    }
    Ok(raw_steps >= PROGRESS_THRESHOLD)
}

/// ascending bounds and the sign correcting for a swap
fn oriented(a: f64, b: f64) -> (f64, f64, f64) {
    if b < a { (b, a, -1.0) } else { (a, b, 1.0) }
}

fn clamp_nan(values: &mut [f64]) {
    for v in values.iter_mut().filter(|v| v.is_nan()) {
        *v = 0.0;
    }
}

/// Fixed-step sweep from `lower` to `upper`; the last step ends exactly on `upper` and NaN
/// produced by its samples is clamped to 0.
///
/// Returns the sums per component (`Value`), the first component's running sum after every
/// step (`Points`) or the upper end of every step (`XValues`).
pub fn sweep<F>(
    lower: f64,
    upper: f64,
    step: f64,
    method: IntegrationMethod,
    output: IntegrationOutput,
    mut context: Option<&mut AnalysisContext>,
    mut sample: F,
) -> Result<Vec<f64>, AnalysisError>
where
    F: FnMut(f64) -> Result<Vec<f64>, AnalysisError>,
{
    let steps = step_count(upper - lower, step);
    let mut f0 = sample(lower)?;
    let mut sums = vec![0.0; f0.len()];
    let mut collected = Vec::new();
    if let Some(ctx) = context.as_mut() {
        ctx.progress.start("integration");
    }
    for i in 0..steps {
        let last = i + 1 == steps;
        let x0 = lower + i as f64 * step;
        let x1 = if last {
            upper
        } else {
            lower + (i + 1) as f64 * step
        };
        let dx = x1 - x0;
        let mut f1 = sample(x1)?;
        let mut midpoint = match method {
            IntegrationMethod::Simpson => Some(sample(0.5 * (x0 + x1))?),
            IntegrationMethod::Trapezoidal => None,
        };
        if last {
            clamp_nan(&mut f1);
            if let Some(fm) = midpoint.as_mut() {
                clamp_nan(fm);
            }
        }
        match &midpoint {
            Some(fm) => {
                for (((sum, a), m), b) in sums.iter_mut().zip(&f0).zip(fm).zip(&f1) {
                    *sum += dx / 6.0 * (a + 4.0 * m + b);
                }
            }
            None => {
                for ((sum, a), b) in sums.iter_mut().zip(&f0).zip(&f1) {
                    *sum += 0.5 * dx * (a + b);
                }
            }
        }
        match output {
            IntegrationOutput::Value => {}
            IntegrationOutput::Points => collected.push(sums.first().copied().unwrap_or(f64::NAN)),
            IntegrationOutput::XValues => collected.push(x1),
        }
        f0 = f1;
        if let Some(ctx) = context.as_mut() {
            ctx.poll_abort()?;
            ctx.progress.report("integration", i + 1, steps);
        }
    }
    Ok(match output {
        IntegrationOutput::Value => sums,
        _ => collected,
    })
}

/// Closed-form integral of an expression that does not reference `name`: every additive term
/// `t` becomes `name*(t)`, the result is `F(upper) - F(lower)` per component.
fn closed_form<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    name: &str,
    var: VarId,
    lower: f64,
    upper: f64,
) -> Result<Vec<f64>, AnalysisError> {
    let integrand = evaluator.expression().to_string();
    let antiderivative = split_top_level(&integrand, ',')
        .iter()
        .map(|component| {
            split_additive_terms(component)
                .iter()
                .map(|(sign, term)| format!("{}{}*({})", sign, name, term))
                .collect::<String>()
        })
        .collect::<Vec<String>>()
        .join(", ");
    debug!("antiderivative of '{}': '{}'", integrand, antiderivative);
    evaluator.set_expression(&antiderivative)?;
    evaluator.set_value(var, upper);
    let at_upper = evaluator.eval_vector();
    evaluator.set_value(var, lower);
    let at_lower = evaluator.eval_vector();
    evaluator.set_expression(&integrand)?;
    Ok(at_upper
        .iter()
        .zip(&at_lower)
        .map(|(fb, fa)| fb - fa)
        .collect())
}

/// Integral of the current expression over one axis. Bounds may come in any order.
fn integrate_axis<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    var: VarId,
    a: f64,
    b: f64,
    step: AxisStep,
    method: IntegrationMethod,
    context: Option<&mut AnalysisContext>,
) -> Result<Vec<f64>, AnalysisError> {
    let (lower, upper, sign) = oriented(a, b);
    let span = upper - lower;
    if span == 0.0 || !span.is_finite() {
        evaluator.set_value(var, a);
        let fill = if span == 0.0 { 0.0 } else { f64::NAN };
        return Ok(vec![fill; evaluator.eval_vector().len()]);
    }
    let h = step.resolve(span);
    let progress = cost_guard(span / h)?;
    let sums = sweep(
        lower,
        upper,
        h,
        method,
        IntegrationOutput::Value,
        if progress { context } else { None },
        |x| {
            evaluator.set_value(var, x);
            Ok(evaluator.eval_vector())
        },
    )?;
    Ok(sums.into_iter().map(|s| s * sign).collect())
}

fn lookup_or_declare<E: Evaluator + ?Sized>(evaluator: &mut E, name: &str) -> VarId {
    match evaluator.lookup_variable(name) {
        Some(id) => id,
        None => evaluator.declare_variable(name, 0.0),
    }
}

/// Definite integral of `config.expression` over `config.bounds`.
pub fn integrate<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    config: &IntegrationConfig,
    context: &mut AnalysisContext,
) -> Result<AnalysisResult, AnalysisError> {
    if config.expression.trim().is_empty() {
        return Err(AnalysisError::EmptyTarget);
    }
    let (a, b) = checked_interval(config.bounds)?;
    let mut scope = VariableScope::new(evaluator);
    scope.set_expression(&config.expression)?;
    // the integration variable is `x` unless named otherwise
    let named = config.variable.as_deref().unwrap_or("x");
    let (name, var) = resolve_variable(&mut *scope, Some(named), false)?;
    scope.bind(var);

    let (lower, upper, sign) = oriented(a, b);
    let span = upper - lower;
    if span == 0.0 {
        scope.set_value(var, a);
        let components = scope.eval_vector().len();
        return Ok(AnalysisResult::found(match config.output {
            IntegrationOutput::Value => vec![0.0; components],
            IntegrationOutput::Points => vec![0.0],
            IntegrationOutput::XValues => vec![a],
        }));
    }
    let step = config.step.unwrap_or(span / DEFAULT_STEPS_1D);
    if !step.is_finite() || step <= 0.0 {
        return Err(AnalysisError::InvalidIntegrationPrecision(format!(
            "step {} must be positive and finite",
            step
        )));
    }
    let step = if step > span {
        warn!("step {} exceeds the interval width {}, using {}", step, span, span);
        span
    } else {
        step
    };

    // refused steps fail even when the closed form needs none
    let raw_steps = span / step;
    let progress = cost_guard(raw_steps)?;

    if config.output == IntegrationOutput::Value && !scope.used_variables().contains_key(&name) {
        let values = closed_form(&mut *scope, &name, var, lower, upper)?;
        info!(
            "'{}' does not depend on {}: integrated in closed form",
            config.expression, name
        );
        return Ok(AnalysisResult::found(
            values.into_iter().map(|v| v * sign).collect(),
        ));
    }

    if progress {
        info!("{:e} integration steps: reporting progress", raw_steps);
    }
    let values = sweep(
        lower,
        upper,
        step,
        config.method,
        config.output,
        if progress { Some(context) } else { None },
        |x| {
            scope.set_value(var, x);
            Ok(scope.eval_vector())
        },
    )?;
    let values = match config.output {
        IntegrationOutput::XValues => values,
        _ => values.into_iter().map(|v| v * sign).collect(),
    };
    info!(
        "{} integration of '{}' over [{}, {}] done",
        config.method, config.expression, a, b
    );
    Ok(AnalysisResult::found(values))
}

/// Integral over `x` in `x_bounds` and `y` between the two inner bound expressions, which
/// may depend on `x`.
pub fn integrate_2d<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    config: &Integration2DConfig,
    context: &mut AnalysisContext,
) -> Result<AnalysisResult, AnalysisError> {
    if config.expression.trim().is_empty() {
        return Err(AnalysisError::EmptyTarget);
    }
    let (ax, bx) = checked_interval(config.x_bounds)?;
    let (lo_text, hi_text) = match &config.y_bounds {
        Some((lo, hi)) if !lo.trim().is_empty() && !hi.trim().is_empty() => {
            (lo.trim().to_string(), hi.trim().to_string())
        }
        _ => {
            return Err(AnalysisError::InvalidOrMissingRange(
                "inner bounds are missing".to_string(),
            ));
        }
    };
    if config.x_variable == config.y_variable {
        return Err(AnalysisError::InvalidOrMissingRange(format!(
            "both axes use the variable '{}'",
            config.x_variable
        )));
    }
    let x_step = AxisStep::from_config(config.x_step, DEFAULT_STEPS_2D)?;
    let y_step = AxisStep::from_config(config.y_step, DEFAULT_STEPS_2D)?;

    let mut scope = VariableScope::new(evaluator);
    let x = lookup_or_declare(&mut *scope, &config.x_variable);
    let y = lookup_or_declare(&mut *scope, &config.y_variable);
    scope.bind(x);
    scope.bind(y);

    let bounds_text = format!("{}, {}", lo_text, hi_text);
    scope.set_expression(&bounds_text)?;
    let bounds_depend_on_x = scope.used_variables().contains_key(&config.x_variable);
    scope.set_value(x, ax);
    let first_bounds = scope.eval_vector();
    if first_bounds.len() != 2 {
        return Err(AnalysisError::InvalidOrMissingRange(format!(
            "inner bounds '{}' are not two expressions",
            bounds_text
        )));
    }
    let (ay, by) = (first_bounds[0], first_bounds[1]);
    if !bounds_depend_on_x && !(ay.is_finite() && by.is_finite()) {
        return Err(AnalysisError::InvalidOrMissingRange(format!(
            "inner bounds [{}, {}] are not finite",
            ay, by
        )));
    }

    let expression = config.expression.trim().to_string();
    scope.set_expression(&expression)?;
    let used = scope.used_variables();
    let depends_on_x = used.contains_key(&config.x_variable);
    let depends_on_y = used.contains_key(&config.y_variable);

    if ax == bx {
        let components = scope.eval_vector().len();
        return Ok(AnalysisResult::found(vec![0.0; components]));
    }

    let (lower, upper, sign) = oriented(ax, bx);
    let hx = x_step.resolve(upper - lower);
    let inner_span = (by - ay).abs();
    let inner_steps = if inner_span > 0.0 && inner_span.is_finite() {
        (inner_span / y_step.resolve(inner_span)).max(1.0)
    } else {
        1.0
    };
    let raw_steps = (upper - lower) / hx * inner_steps;
    let progress = cost_guard(raw_steps)?;

    if !bounds_depend_on_x {
        if !depends_on_x && !depends_on_y {
            info!("constant integrand over a rectangle: value times area");
            let area = (bx - ax) * (by - ay);
            let values = scope.eval_vector();
            return Ok(AnalysisResult::found(
                values.into_iter().map(|c| c * area).collect(),
            ));
        }
        if !depends_on_x {
            debug!("integrand depends on {} only", config.y_variable);
            let inner = integrate_axis(&mut *scope, y, ay, by, y_step, config.method, Some(context))?;
            return Ok(AnalysisResult::found(
                inner.into_iter().map(|v| v * (bx - ax)).collect(),
            ));
        }
        if !depends_on_y {
            debug!("integrand depends on {} only", config.x_variable);
            let outer = integrate_axis(&mut *scope, x, ax, bx, x_step, config.method, Some(context))?;
            return Ok(AnalysisResult::found(
                outer.into_iter().map(|v| v * (by - ay)).collect(),
            ));
        }
    }

    if progress {
        info!("about {:e} integrand evaluations: reporting progress", raw_steps);
    }
    let values = sweep(
        lower,
        upper,
        hx,
        config.method,
        IntegrationOutput::Value,
        if progress { Some(context) } else { None },
        |xv| {
            scope.set_value(x, xv);
            let (lo, hi) = if bounds_depend_on_x {
                scope.set_expression(&bounds_text)?;
                let bounds = scope.eval_vector();
                scope.set_expression(&expression)?;
                (bounds[0], bounds[1])
            } else {
                (ay, by)
            };
            if !depends_on_y {
                let values = scope.eval_vector();
                return Ok(values.into_iter().map(|f| f * (hi - lo)).collect());
            }
            integrate_axis(&mut *scope, y, lo, hi, y_step, config.method, None)
        },
    )?;
    info!(
        "2D {} integration of '{}' done",
        config.method, config.expression
    );
    Ok(AnalysisResult::found(
        values.into_iter().map(|v| v * sign).collect(),
    ))
}
