//! Recursive bisection localizer: refines a bracket by rescanning it at 100 sub-steps and
//! descending into the matching sub-bracket until it is narrower than `eps` or the depth cap is
//! hit. Serves zero search (`EvalKind::Value`) and extremum search (`EvalKind::Derivative`).
use crate::numerical::analysis::sampler::{Bracket, EvalKind, detect_brackets, sample_series};
use crate::symbolic::evaluator::{Evaluator, VarId};
use crate::symbolic::utils::linspace;
use log::debug;

/// sub-steps per refinement level
pub const REFINEMENT_STEPS: usize = 100;

/// Tolerance and recursion depth cap of one localization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceBudget {
    pub eps: f64,
    pub max_depth: usize,
}

impl ConvergenceBudget {
    /// depth cap is `floor(|log10(eps)|) + 1`
    pub fn new(eps: f64) -> Self {
        // nudged so that exact powers of ten are not floored one level short
        let max_depth = (eps.abs().log10().abs() + 1e-9).floor() as usize + 1;
        ConvergenceBudget { eps, max_depth }
    }
}

/// Refined position of the sign change inside `bracket`.
pub fn localize<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    var: VarId,
    bracket: &Bracket,
    kind: EvalKind,
    budget: &ConvergenceBudget,
) -> f64 {
    refine(evaluator, var, bracket, kind, budget, 0)
}

fn refine<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    var: VarId,
    bracket: &Bracket,
    kind: EvalKind,
    budget: &ConvergenceBudget,
    depth: usize,
) -> f64 {
    if bracket.zero_run.is_some() {
        return bracket.interpolate();
    }
    let positions = linspace(bracket.left, bracket.right, REFINEMENT_STEPS + 1);
    let values = sample_series(evaluator, var, &positions, kind);
    let candidates = detect_brackets(&positions, &values);
    let parent = bracket.transition();
    let Some(sub) = candidates
        .iter()
        .find(|candidate| candidate.transition() == parent)
        .or(candidates.first())
    else {
        // tangent or flat inside: the coarse bracket is all there is
        debug!(
            "no sign change inside [{}, {}] at depth {}",
            bracket.left, bracket.right, depth
        );
        return bracket.interpolate();
    };
    if sub.zero_run.is_some() || sub.width() <= budget.eps || depth + 1 >= budget.max_depth {
        return sub.interpolate();
    }
    refine(evaluator, var, sub, kind, budget, depth + 1)
}
