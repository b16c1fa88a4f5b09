use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::PI;

/// Flat evaluation tree: variables are resolved once to argument slots so that evaluation
/// is a plain recursive walk with no name lookups.
#[derive(Clone, Debug)]
pub enum Lambda {
    Var(usize),
    Const(f64),
    Add(Box<Lambda>, Box<Lambda>),
    Sub(Box<Lambda>, Box<Lambda>),
    Mul(Box<Lambda>, Box<Lambda>),
    Div(Box<Lambda>, Box<Lambda>),
    Pow(Box<Lambda>, Box<Lambda>),
    Exp(Box<Lambda>),
    Ln(Box<Lambda>),
    Abs(Box<Lambda>),
    Sin(Box<Lambda>),
    Cos(Box<Lambda>),
    Tg(Box<Lambda>),
    Ctg(Box<Lambda>),
    ArcSin(Box<Lambda>),
    ArcCos(Box<Lambda>),
    ArcTg(Box<Lambda>),
    ArcCtg(Box<Lambda>),
}

fn boxed(vars: &[&str], expr: &Expr) -> Result<Box<Lambda>, String> {
    expr.compile(vars).map(Box::new)
}

impl Expr {
    /// Compiles the expression against an ordered list of argument names. Every variable of the
    /// expression must be present in `vars`.
    pub fn compile(&self, vars: &[&str]) -> Result<Lambda, String> {
        let lambda = match self {
            Expr::Var(name) => {
                let idx = vars
                    .iter()
                    .position(|v| *v == name.as_str())
                    .ok_or_else(|| format!("variable '{}' is not an argument", name))?;
                Lambda::Var(idx)
            }
            Expr::Const(v) => Lambda::Const(*v),
            Expr::Add(a, b) => Lambda::Add(boxed(vars, a)?, boxed(vars, b)?),
            Expr::Sub(a, b) => Lambda::Sub(boxed(vars, a)?, boxed(vars, b)?),
            Expr::Mul(a, b) => Lambda::Mul(boxed(vars, a)?, boxed(vars, b)?),
            Expr::Div(a, b) => Lambda::Div(boxed(vars, a)?, boxed(vars, b)?),
            Expr::Pow(a, b) => Lambda::Pow(boxed(vars, a)?, boxed(vars, b)?),
            Expr::Exp(e) => Lambda::Exp(boxed(vars, e)?),
            Expr::Ln(e) => Lambda::Ln(boxed(vars, e)?),
            Expr::Abs(e) => Lambda::Abs(boxed(vars, e)?),
            Expr::sin(e) => Lambda::Sin(boxed(vars, e)?),
            Expr::cos(e) => Lambda::Cos(boxed(vars, e)?),
            Expr::tg(e) => Lambda::Tg(boxed(vars, e)?),
            Expr::ctg(e) => Lambda::Ctg(boxed(vars, e)?),
            Expr::arcsin(e) => Lambda::ArcSin(boxed(vars, e)?),
            Expr::arccos(e) => Lambda::ArcCos(boxed(vars, e)?),
            Expr::arctg(e) => Lambda::ArcTg(boxed(vars, e)?),
            Expr::arcctg(e) => Lambda::ArcCtg(boxed(vars, e)?),
        };
        Ok(lambda)
    }
}

impl Lambda {
    #[inline(always)]
    pub fn eval(&self, args: &[f64]) -> f64 {
        match self {
            Lambda::Var(i) => args[*i],
            Lambda::Const(v) => *v,
            Lambda::Add(a, b) => a.eval(args) + b.eval(args),
            Lambda::Sub(a, b) => a.eval(args) - b.eval(args),
            Lambda::Mul(a, b) => a.eval(args) * b.eval(args),
            Lambda::Div(a, b) => a.eval(args) / b.eval(args),
            Lambda::Pow(a, b) => a.eval(args).powf(b.eval(args)),
            Lambda::Exp(e) => e.eval(args).exp(),
            Lambda::Ln(e) => e.eval(args).ln(),
            Lambda::Abs(e) => e.eval(args).abs(),
            Lambda::Sin(e) => e.eval(args).sin(),
            Lambda::Cos(e) => e.eval(args).cos(),
            Lambda::Tg(e) => e.eval(args).tan(),
            Lambda::Ctg(e) => 1.0 / e.eval(args).tan(),
            Lambda::ArcSin(e) => e.eval(args).asin(),
            Lambda::ArcCos(e) => e.eval(args).acos(),
            Lambda::ArcTg(e) => e.eval(args).atan(),
            Lambda::ArcCtg(e) => (PI / 2.0) - e.eval(args).atan(),
        }
    }
}
