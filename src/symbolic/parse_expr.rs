use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{
    find_operator_outside_brackets, find_pair_to_this_bracket, has_balanced_brackets,
    is_wrapped_in_brackets,
};
use std::f64::consts::{E, PI};
/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use RustedAnalysis::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("x^2.3* ln(x+y+y^2.6)").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
//                  search recursion diagram
//                "y^2+exp(x)+ln(x)/y-x^2.3"        |
//                |       left          | right     |
//                |_________________________________|
//                |   rightmost binary  -           |
//                |_________________________________|
//                | y^2+exp(x)+ln(x)/y  |  x^2.3    |
//                |       |             |     |     |
//                |_____ \|/            |    \|/    |
//                |   rightmost +       |   ^       |
//                |_____________________|___________|
//                | y^2+exp(x) | ln(x)/y| x   | 2.3 |
//                  etc...
// precedence, loosest first: binary + -, binary * /, unary sign, ^ (right associative),
// function calls and brackets, literals and variables
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    let input: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !has_balanced_brackets(&input) {
        return Err(format!("unbalanced brackets in '{}'", input));
    }
    parse_node(&input)
}

fn parse_node(input: &str) -> Result<Expr, String> {
    if input.is_empty() {
        return Err("empty expression".to_string());
    }
    if is_wrapped_in_brackets(input) {
        return parse_node(&input[1..input.len() - 1]);
    }
    // left associative: split at the rightmost operator of the loosest level
    if let Some((pos, op)) = find_operator_outside_brackets(input, &['+', '-'], true) {
        let left = parse_node(&input[..pos])?;
        let right = parse_node(&input[pos + 1..])?;
        return Ok(match op {
            '+' => left + right,
            _ => left - right,
        });
    }
    if let Some((pos, op)) = find_operator_outside_brackets(input, &['*', '/'], true) {
        let left = parse_node(&input[..pos])?;
        let right = parse_node(&input[pos + 1..])?;
        return Ok(match op {
            '*' => left * right,
            _ => left / right,
        });
    }
    // unary signs bind looser than ^: -x^2 == -(x^2)
    if let Some(rest) = input.strip_prefix('-') {
        return Ok(-parse_node(rest)?);
    }
    if let Some(rest) = input.strip_prefix('+') {
        return parse_node(rest);
    }
    // right associative: 2^3^2 == 2^(3^2)
    if let Some((pos, _)) = find_operator_outside_brackets(input, &['^'], false) {
        let base = parse_node(&input[..pos])?;
        let exponent = parse_node(&input[pos + 1..])?;
        return Ok(base.pow(exponent));
    }
    if let Some(open) = input.find('(') {
        return parse_function(input, open);
    }
    parse_atom(input)
}

fn parse_function(input: &str, open: usize) -> Result<Expr, String> {
    let close = find_pair_to_this_bracket(input, open)
        .ok_or_else(|| format!("unclosed bracket in '{}'", input))?;
    if close != input.len() - 1 {
        return Err(format!("unexpected '{}' after '{}'", &input[close + 1..], &input[..=close]));
    }
    let name = &input[..open];
    let argument = parse_node(&input[open + 1..close])?;
    let expr = match name {
        "exp" => argument.exp(),
        "ln" | "log" => argument.ln(),
        "log10" => argument.log10(),
        "sqrt" => argument.pow(Expr::Const(0.5)),
        "abs" => Expr::Abs(argument.boxed()),
        "sin" => Expr::sin(argument.boxed()),
        "cos" => Expr::cos(argument.boxed()),
        "tan" | "tg" => Expr::tg(argument.boxed()),
        "cot" | "ctg" => Expr::ctg(argument.boxed()),
        "asin" | "arcsin" => Expr::arcsin(argument.boxed()),
        "acos" | "arccos" => Expr::arccos(argument.boxed()),
        "atan" | "arctan" | "arctg" => Expr::arctg(argument.boxed()),
        "acot" | "arccot" | "arcctg" => Expr::arcctg(argument.boxed()),
        "" => return Err(format!("missing operator before '{}'", input)),
        _ => return Err(format!("unknown function '{}'", name)),
    };
    Ok(expr)
}

fn parse_atom(input: &str) -> Result<Expr, String> {
    let first = input.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() || first == '.' {
        return input
            .parse::<f64>()
            .map(Expr::Const)
            .map_err(|_| format!("invalid number '{}'", input));
    }
    let is_identifier = (first.is_alphabetic() || first == '_')
        && input.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !is_identifier {
        return Err(format!("cannot parse '{}'", input));
    }
    Ok(match input {
        "pi" | "_pi" => Expr::Const(PI),
        "_e" => Expr::Const(E),
        "nan" => Expr::Const(f64::NAN),
        "inf" => Expr::Const(f64::INFINITY),
        _ => Expr::Var(input.to_string()),
    })
}

impl Expr {
    /// parse a single (scalar) expression
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        parse_expression_func(input)
    }

    /// parse a list of expressions
    pub fn parse_vector_expression(input: Vec<&str>) -> Result<Vec<Expr>, String> {
        input.into_iter().map(parse_expression_func).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_at(input: &str, x: f64) -> f64 {
        let expr = Expr::parse_expression(input).unwrap();
        let vars = expr.all_arguments_are_variables();
        let names: Vec<&str> = vars.iter().map(|s| s.as_str()).collect();
        let values = vec![x; names.len()];
        expr.compile(&names).unwrap().eval(&values)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval_at("1+2*3", 0.0), 7.0);
        assert_eq!(eval_at("(1+2)*3", 0.0), 9.0);
        assert_eq!(eval_at("8/4/2", 0.0), 1.0);
        assert_eq!(eval_at("8-4-2", 0.0), 2.0);
        assert_eq!(eval_at("2^3^2", 0.0), 512.0);
        assert_eq!(eval_at("-2^2", 0.0), -4.0);
        assert_eq!(eval_at("2*-3", 0.0), -6.0);
        assert_eq!(eval_at("2^-1", 0.0), 0.5);
    }

    #[test]
    fn test_variables_and_functions() {
        assert_eq!(eval_at("x^2-4", 2.0), 0.0);
        assert_eq!(eval_at("x * x - 3*x", 3.0), 0.0);
        assert!((eval_at("sin(pi/2)", 0.0) - 1.0).abs() < 1e-15);
        assert!((eval_at("sqrt(abs(x))", -4.0) - 2.0).abs() < 1e-15);
        assert!((eval_at("log10(x)", 1000.0) - 3.0).abs() < 1e-12);
        assert_eq!(eval_at("1.5e-3*x", 2.0), 3e-3);
    }

    #[test]
    fn test_errors() {
        assert!(Expr::parse_expression("").is_err());
        assert!(Expr::parse_expression("(x+1").is_err());
        assert!(Expr::parse_expression("foo(x)").is_err());
        assert!(Expr::parse_expression("2(x)").is_err());
        assert!(Expr::parse_expression("x+").is_err());
        assert!(Expr::parse_expression("sin(x)y").is_err());
    }
}
