//! # Evaluator adapter
//!
//! The analysis engine never touches expressions directly: it drives an [`Evaluator`], which
//! holds a "current expression" and an arena of named scalars. Algorithms mutate a scalar
//! through its [`VarId`] handle and re-evaluate.
//!
//! [`SymbolicEvaluator`] is the shipped implementation: expression text is parsed with
//! `parse_expr`, compiled with `symbolic_lambdify` and cached by text. Top-level commas make
//! vector expressions: `"x^2, sin(x)"` has two outputs.
//!
//! [`VariableScope`] is the scoped-mutation guard: every variable bound through it gets its
//! prior value back when the scope is dropped, on every exit path.
//!
//!# Example
//! ```
//! use RustedAnalysis::symbolic::evaluator::{Evaluator, SymbolicEvaluator};
//! let mut evaluator = SymbolicEvaluator::new();
//! evaluator.set_expression("x^2 - 4, 2*x").unwrap();
//! let x = evaluator.lookup_variable("x").unwrap();
//! evaluator.set_value(x, 3.0);
//! assert_eq!(evaluator.eval_vector(), vec![5.0, 6.0]);
//! ```
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::Lambda;
use crate::symbolic::utils::split_top_level;
use log::debug;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// handle of a named scalar inside a [`VariableArena`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

/// Named scalars owned by the evaluator. Handles stay valid for the arena's lifetime.
#[derive(Clone, Debug, Default)]
pub struct VariableArena {
    names: Vec<String>,
    values: Vec<f64>,
}

impl VariableArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` with `value`. An existing name keeps its handle and takes the new value.
    pub fn declare(&mut self, name: &str, value: f64) -> VarId {
        if let Some(id) = self.lookup(name) {
            self.values[id.0] = value;
            return id;
        }
        self.names.push(name.to_string());
        self.values.push(value);
        VarId(self.names.len() - 1)
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.names.iter().position(|n| n == name).map(VarId)
    }

    pub fn get(&self, id: VarId) -> f64 {
        self.values[id.0]
    }

    pub fn set(&mut self, id: VarId, value: f64) {
        self.values[id.0] = value;
    }

    pub fn name(&self, id: VarId) -> &str {
        &self.names[id.0]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Contract of the compiled-expression engine consumed by the analysis algorithms.
pub trait Evaluator {
    /// Makes `text` the current expression. Errors carry a readable parser message.
    fn set_expression(&mut self, text: &str) -> Result<(), String>;

    /// text of the current expression, empty if none was set
    fn expression(&self) -> &str;

    /// First output of the current expression.
    fn eval(&mut self) -> f64 {
        self.eval_vector().first().copied().unwrap_or(f64::NAN)
    }

    /// All outputs of the current expression.
    fn eval_vector(&mut self) -> Vec<f64>;

    /// Numerical derivative of the current expression's first output with respect to `var`
    /// at `at`, by the 4-point central stencil. A zero `step` picks `1e-7*|at|`, but not less
    /// than `1e-10`. The variable keeps its previous value afterwards.
    fn derivative(&mut self, var: VarId, at: f64, step: f64) -> f64 {
        let e = if step != 0.0 {
            step.abs()
        } else {
            (1e-7 * at.abs()).max(1e-10)
        };
        let saved = self.value(var);
        let mut f = |shift: f64| {
            self.set_value(var, at + shift * e);
            self.eval()
        };
        let (f2, f1, fm1, fm2) = (f(2.0), f(1.0), f(-1.0), f(-2.0));
        self.set_value(var, saved);
        (-f2 + 8.0 * f1 - 8.0 * fm1 + fm2) / (12.0 * e)
    }

    /// variables referenced by the current expression
    fn used_variables(&self) -> HashMap<String, VarId>;

    fn lookup_variable(&self, name: &str) -> Option<VarId>;

    fn declare_variable(&mut self, name: &str, value: f64) -> VarId;

    fn value(&self, var: VarId) -> f64;

    fn set_value(&mut self, var: VarId, value: f64);

    /// Hands a named result vector back for later reference.
    fn publish_vector(&mut self, name: &str, values: Vec<f64>);

    /// number of expression evaluations performed so far
    fn evaluations(&self) -> usize {
        0
    }
}

/// Components of one vector expression, compiled against the arena slots they read.
#[derive(Clone, Debug)]
struct CompiledExpression {
    components: Vec<Lambda>,
    variables: Vec<VarId>,
}

/// Evaluator backed by the symbolic parser and the lambdified evaluation tree.
#[derive(Clone, Debug, Default)]
pub struct SymbolicEvaluator {
    arena: VariableArena,
    current: String,
    cache: HashMap<String, CompiledExpression>,
    args: Vec<f64>,
    published: HashMap<String, Vec<f64>>,
    evaluations: usize,
}

impl SymbolicEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// vector published under `name`, if any
    pub fn published(&self, name: &str) -> Option<&Vec<f64>> {
        self.published.get(name)
    }

    pub fn arena(&self) -> &VariableArena {
        &self.arena
    }

    fn compile(&mut self, text: &str) -> Result<CompiledExpression, String> {
        let parts = split_top_level(text, ',');
        let exprs = Expr::parse_vector_expression(parts.iter().map(|s| s.as_str()).collect())?;
        let mut names: Vec<String> = Vec::new();
        for expr in &exprs {
            for name in expr.all_arguments_are_variables() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        let variables: Vec<VarId> = names
            .iter()
            .map(|name| match self.arena.lookup(name) {
                Some(id) => id,
                None => self.arena.declare(name, 0.0),
            })
            .collect();
        let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let components = exprs
            .iter()
            .map(|expr| expr.compile(&name_refs))
            .collect::<Result<Vec<Lambda>, String>>()?;
        Ok(CompiledExpression {
            components,
            variables,
        })
    }
}

impl Evaluator for SymbolicEvaluator {
    fn set_expression(&mut self, text: &str) -> Result<(), String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty expression".to_string());
        }
        if !self.cache.contains_key(text) {
            let compiled = self.compile(text)?;
            debug!(
                "compiled '{}' into {} component(s)",
                text,
                compiled.components.len()
            );
            self.cache.insert(text.to_string(), compiled);
        }
        self.current = text.to_string();
        Ok(())
    }

    fn expression(&self) -> &str {
        &self.current
    }

    fn eval_vector(&mut self) -> Vec<f64> {
        let Some(compiled) = self.cache.get(&self.current) else {
            return vec![f64::NAN];
        };
        self.args.clear();
        self.args
            .extend(compiled.variables.iter().map(|id| self.arena.get(*id)));
        self.evaluations += 1;
        compiled
            .components
            .iter()
            .map(|component| component.eval(&self.args))
            .collect()
    }

    fn used_variables(&self) -> HashMap<String, VarId> {
        self.cache
            .get(&self.current)
            .map(|compiled| {
                compiled
                    .variables
                    .iter()
                    .map(|id| (self.arena.name(*id).to_string(), *id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lookup_variable(&self, name: &str) -> Option<VarId> {
        self.arena.lookup(name)
    }

    fn declare_variable(&mut self, name: &str, value: f64) -> VarId {
        self.arena.declare(name, value)
    }

    fn value(&self, var: VarId) -> f64 {
        self.arena.get(var)
    }

    fn set_value(&mut self, var: VarId, value: f64) {
        self.arena.set(var, value);
    }

    fn publish_vector(&mut self, name: &str, values: Vec<f64>) {
        self.published.insert(name.to_string(), values);
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// Exclusive borrow of an evaluator for the duration of one analysis. Bound variables and the
/// current expression text get their previous state back on drop.
pub struct VariableScope<'e, E: Evaluator + ?Sized> {
    evaluator: &'e mut E,
    saved: Vec<(VarId, f64)>,
    expression: String,
}

impl<'e, E: Evaluator + ?Sized> VariableScope<'e, E> {
    pub fn new(evaluator: &'e mut E) -> Self {
        let expression = evaluator.expression().to_string();
        VariableScope {
            evaluator,
            saved: Vec::new(),
            expression,
        }
    }

    /// Records the current value of `var` so it is restored when the scope ends.
    pub fn bind(&mut self, var: VarId) -> VarId {
        if !self.saved.iter().any(|(id, _)| *id == var) {
            let value = self.evaluator.value(var);
            self.saved.push((var, value));
        }
        var
    }
}

impl<E: Evaluator + ?Sized> Deref for VariableScope<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.evaluator
    }
}

impl<E: Evaluator + ?Sized> DerefMut for VariableScope<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.evaluator
    }
}

impl<E: Evaluator + ?Sized> Drop for VariableScope<'_, E> {
    fn drop(&mut self) {
        for (var, value) in self.saved.iter().rev() {
            self.evaluator.set_value(*var, *value);
        }
        if !self.expression.is_empty() && self.evaluator.expression() != self.expression {
            // the text compiled before, so switching back cannot fail
            let _ = self.evaluator.set_expression(&self.expression);
        }
    }
}
