#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedAnalysis::symbolic::symbolic_engine::Expr;
/// let input = "x^2.3* log(x+y+y^2.6)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let f = parsed_expression.compile(&["x", "y"]).unwrap();
/// println!("{}, value: {}  \n", input, f.eval(&[1.0, 2.0]));
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// expression tree: variables, constants, arithmetic and elementary functions
///# Example
/// ```
/// use RustedAnalysis::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("exp(x)+ln(y)").unwrap();
/// // return vec of all arguments
/// let all = parsed_expression.all_arguments_are_variables();
/// assert_eq!(all, vec!["x", "y"]);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// turns a symbolic expression into a fast evaluation tree or a Rust closure
pub mod symbolic_lambdify;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions mainly for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
///______________________________________________________________________________________________________________________________________________
/// evaluator with current expression, variable arena and scoped variable binding
/// consumed by the numerical analysis engine
pub mod evaluator;
