use crate::numerical::analysis::config::TaylorConfig;
use crate::numerical::analysis::error::AnalysisError;
use crate::numerical::analysis::sampler::resolve_variable;
use crate::symbolic::evaluator::{Evaluator, VariableScope};
use log::{debug, info, warn};
use std::fmt;

/// default spacing of the difference samples
pub const DEFAULT_STEP: f64 = 0.1;
/// relative resolution of the difference scheme, scaled contributions below it are zero
const ROUNDOFF: f64 = 1e-12;

/// Taylor polynomial `sum c_k (x - center)^k`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaylorExpansion {
    pub center: f64,
    pub variable: String,
    pub coefficients: Vec<f64>,
}

impl TaylorExpansion {
    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation of the polynomial
    pub fn evaluate(&self, x: f64) -> f64 {
        let dx = x - self.center;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * dx + c)
    }

    fn shifted_variable(&self) -> String {
        if self.center == 0.0 {
            self.variable.clone()
        } else if self.center < 0.0 {
            format!("({}+{})", self.variable, -self.center)
        } else {
            format!("({}-{})", self.variable, self.center)
        }
    }
}

impl fmt::Display for TaylorExpansion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let base = self.shifted_variable();
        let mut terms: Vec<(bool, String)> = Vec::new();
        for (k, c) in self.coefficients.iter().enumerate() {
            if *c == 0.0 {
                continue;
            }
            let magnitude = c.abs();
            let power = match k {
                0 => String::new(),
                1 => base.clone(),
                _ => format!("{}^{}", base, k),
            };
            let term = if k == 0 {
                format!("{}", magnitude)
            } else if magnitude == 1.0 {
                power
            } else {
                format!("{}*{}", magnitude, power)
            };
            terms.push((*c < 0.0, term));
        }
        if terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (negative, term)) in terms.iter().enumerate() {
            match (i, negative) {
                (0, true) => write!(f, "-{}", term)?,
                (0, false) => write!(f, "{}", term)?,
                (_, true) => write!(f, " - {}", term)?,
                (_, false) => write!(f, " + {}", term)?,
            }
        }
        Ok(())
    }
}

/// Derivatives `f^(k)(x0)`, `k = 0..=order`, from samples spaced `h` apart and centred on `x0`
/// (`samples[len / 2] = f(x0)`, at least `2 order + 1` of them).
///
/// Level `k` holds forward differences of level `k-1` divided by `h`; its element `i` sits at
/// `x0 + (i - len/2 + k/2) h`. Even levels are read at `x0`, odd levels as the mean of the
/// two elements at `x0 -+ h/2`.
pub fn difference_pyramid(samples: &[f64], order: usize, h: f64) -> Vec<f64> {
    let centre = samples.len() / 2;
    let mut level = samples.to_vec();
    let mut derivatives = Vec::with_capacity(order + 1);
    derivatives.push(level[centre]);
    for k in 1..=order {
        level = level.windows(2).map(|w| (w[1] - w[0]) / h).collect();
        let value = if k % 2 == 0 {
            level[centre - k / 2]
        } else {
            0.5 * (level[centre - (k + 1) / 2] + level[centre - (k - 1) / 2])
        };
        derivatives.push(value);
    }
    derivatives
}

/// Derivatives from `samples[j] = f(x0 + (j - 2 order) h)`. The odd levels are improved by one
/// Richardson step against the pyramid of every second sample, which cancels their `h^2` term.
pub fn centred_derivatives(samples: &[f64], order: usize, h: f64) -> Vec<f64> {
    let fine = difference_pyramid(samples, order, h);
    let every_second: Vec<f64> = samples.iter().step_by(2).copied().collect();
    let coarse = difference_pyramid(&every_second, order, 2.0 * h);
    fine.iter()
        .zip(&coarse)
        .enumerate()
        .map(|(k, (f, c))| if k % 2 == 1 { (4.0 * f - c) / 3.0 } else { *f })
        .collect()
}

/// Taylor coefficients of the configured expression around `config.center`.
pub fn taylor<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    config: &TaylorConfig,
) -> Result<TaylorExpansion, AnalysisError> {
    if config.expression.trim().is_empty() {
        return Err(AnalysisError::EmptyTarget);
    }
    if !config.center.is_finite() {
        return Err(AnalysisError::InvalidOrMissingRange(format!(
            "expansion point {} is not finite",
            config.center
        )));
    }
    let h = if config.step.is_finite() && config.step > 0.0 {
        config.step
    } else {
        warn!("difference step {} is unusable, using {}", config.step, DEFAULT_STEP);
        DEFAULT_STEP
    };
    let n = config.order;

    let mut scope = VariableScope::new(evaluator);
    scope.set_expression(&config.expression)?;
    let (name, var) = resolve_variable(&mut *scope, config.variable.as_deref(), true)?;
    scope.bind(var);

    let samples: Vec<f64> = (0..=4 * n)
        .map(|j| {
            scope.set_value(var, config.center + (j as f64 - 2.0 * n as f64) * h);
            scope.eval()
        })
        .collect();
    let scale = samples
        .iter()
        .filter(|v| v.is_finite())
        .fold(1.0_f64, |m, v| m.max(v.abs()));

    let mut factorial = 1.0;
    let mut h_power = 1.0;
    let coefficients: Vec<f64> = centred_derivatives(&samples, n, h)
        .into_iter()
        .enumerate()
        .map(|(k, d)| {
            if k > 0 {
                factorial *= k as f64;
                h_power *= h;
            }
            let c = d / factorial;
            if (c * h_power).abs() <= ROUNDOFF * scale {
                debug!("coefficient {} ({:e}) is below the difference resolution", k, c);
                0.0
            } else {
                c
            }
        })
        .collect();

    let expansion = TaylorExpansion {
        center: config.center,
        variable: name,
        coefficients,
    };
    info!(
        "order {} expansion of '{}' around {}: {}",
        n, config.expression, config.center, expansion
    );
    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::evaluator::SymbolicEvaluator;
    use approx::assert_relative_eq;

    #[test]
    fn test_pyramid_of_cubic() {
        let h = 0.1;
        let order = 3;
        let samples: Vec<f64> = (0..=4 * order)
            .map(|j| {
                let x = 1.0 + (j as f64 - 2.0 * order as f64) * h;
                x * x * x
            })
            .collect();
        let d = difference_pyramid(&samples, order, h);
        assert_eq!(d.len(), 4);
        assert_relative_eq!(d[0], 1.0);
        // the odd levels carry the O(h^2) error of a centred difference
        assert_relative_eq!(d[1], 3.0, epsilon = 2e-2);
        assert_relative_eq!(d[2], 6.0, epsilon = 1e-8);
        assert_relative_eq!(d[3], 6.0, epsilon = 1e-6);

        // one Richardson step makes every level of a cubic exact
        let exact = centred_derivatives(&samples, order, h);
        assert_relative_eq!(exact[1], 3.0, epsilon = 1e-9);
        assert_relative_eq!(exact[2], 6.0, epsilon = 1e-8);
        assert_relative_eq!(exact[3], 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cubic_coefficients_are_exact() {
        let mut ev = SymbolicEvaluator::new();
        let cubic = taylor(&mut ev, &TaylorConfig::new("x^3 - 2*x + 1", 0.0, 3)).unwrap();
        let c = &cubic.coefficients;
        assert_relative_eq!(c[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(c[1], -2.0, epsilon = 1e-9);
        assert_relative_eq!(c[2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(c[3], 1.0, epsilon = 1e-6);

        let shifted = taylor(&mut ev, &TaylorConfig::new("x^3", 1.0, 3)).unwrap();
        assert_relative_eq!(shifted.coefficients[1], 3.0, epsilon = 1e-9);
        assert_relative_eq!(shifted.coefficients[2], 3.0, epsilon = 1e-8);
        assert_relative_eq!(shifted.coefficients[3], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sine_expansion() {
        let mut ev = SymbolicEvaluator::new();
        let expansion = taylor(&mut ev, &TaylorConfig::new("sin(x)", 0.0, 5)).unwrap();
        let c = &expansion.coefficients;
        assert_eq!(c.len(), 6);
        assert_eq!(c[0], 0.0);
        assert_eq!(c[2], 0.0);
        assert_eq!(c[4], 0.0);
        assert_relative_eq!(c[1], 1.0, epsilon = 1e-2);
        assert_relative_eq!(c[3], -1.0 / 6.0, epsilon = 1e-2);
        assert_relative_eq!(c[5], 1.0 / 120.0, epsilon = 1e-3);
        assert_relative_eq!(expansion.evaluate(0.3), 0.3_f64.sin(), epsilon = 1e-2);
        assert_eq!(expansion.variable, "x");
    }

    #[test]
    fn test_exp_around_one() {
        let mut ev = SymbolicEvaluator::new();
        let expansion = taylor(&mut ev, &TaylorConfig::new("exp(t)", 1.0, 3)).unwrap();
        let e = 1.0_f64.exp();
        assert_relative_eq!(expansion.coefficients[0], e, epsilon = 1e-12);
        assert_relative_eq!(expansion.coefficients[2], e / 2.0, epsilon = 1e-2);
        assert_eq!(expansion.variable, "t");
    }

    #[test]
    fn test_display() {
        let expansion = TaylorExpansion {
            center: 2.0,
            variable: "x".to_string(),
            coefficients: vec![1.0, 0.0, -3.5, 1.0],
        };
        assert_eq!(expansion.to_string(), "1 - 3.5*(x-2)^2 + (x-2)^3");
        let negative = TaylorExpansion {
            center: -1.5,
            variable: "y".to_string(),
            coefficients: vec![0.0, -2.0],
        };
        assert_eq!(negative.to_string(), "-2*(y+1.5)");
        let zero = TaylorExpansion {
            center: 0.0,
            variable: "x".to_string(),
            coefficients: vec![0.0, 0.0],
        };
        assert_eq!(zero.to_string(), "0");
    }

    #[test]
    fn test_errors_and_restoration() {
        let mut ev = SymbolicEvaluator::new();
        let x = ev.declare_variable("x", 7.0);
        assert_eq!(
            taylor(&mut ev, &TaylorConfig::new("", 0.0, 3)),
            Err(AnalysisError::EmptyTarget)
        );
        let mut named = TaylorConfig::new("y^2", 0.0, 2);
        named.variable = Some("x".to_string());
        assert_eq!(
            taylor(&mut ev, &named),
            Err(AnalysisError::VariableNotFound("x".to_string()))
        );
        assert!(matches!(
            taylor(&mut ev, &TaylorConfig::new("x", f64::NAN, 2)),
            Err(AnalysisError::InvalidOrMissingRange(_))
        ));
        taylor(&mut ev, &TaylorConfig::new("x^2", 3.0, 2)).unwrap();
        assert_eq!(ev.value(x), 7.0);
    }
}
