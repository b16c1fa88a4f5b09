#![allow(non_snake_case)]
use RustedAnalysis::Utils::logger::default_log_file_name;
use RustedAnalysis::Utils::task_parser::{Task, load_tasks, load_tasks_from_file};
use RustedAnalysis::numerical::analysis::analyzer::Analyzer;
use RustedAnalysis::numerical::analysis::data_source::DataSource;
use RustedAnalysis::symbolic::evaluator::SymbolicEvaluator;
use std::env;

const DEMO_TASKS: &str = "
// zero of a parabola and maximum of a sine
zeroes
expression: x^2-4
interval: 0, 5
samples: 21

extrema
expression: sin(x)
interval: 0, 2*pi
mode: max

// area under a Gaussian and over a quarter disc
integrate
expression: exp(-x^2)
interval: -3, 3
method: simpson

integrate2
expression: 1
xinterval: 0, 1
yinterval: 0, sqrt(1-x^2)
xstep: 1e-3

// sampled data with a gap
trend
data: 1, 2, nan, 0, -2, -3, -4, -5, -6
mode: zeroes

taylor
expression: exp(x)
center: 0
order: 4
";

fn main() {
    let tasks: Result<Vec<Task>, String> = match env::args().nth(1) {
        Some(path) => load_tasks_from_file(&path),
        None => load_tasks(DEMO_TASKS),
    };
    let tasks = match tasks {
        Ok(tasks) => tasks,
        Err(e) => {
            eprintln!("cannot load tasks: {}", e);
            std::process::exit(1);
        }
    };
    let mut analyzer = Analyzer::new(SymbolicEvaluator::new());
    if let Ok(level) = env::var("ANALYSIS_LOG") {
        analyzer.context.loglevel = Some(level);
    }
    // an empty value asks for a timestamped file name
    if let Ok(file) = env::var("ANALYSIS_LOG_FILE") {
        analyzer.context.log_file = Some(if file.trim().is_empty() {
            default_log_file_name()
        } else {
            file
        });
    }
    for task in &tasks {
        let data = task.data.as_ref().map(|table| table as &dyn DataSource);
        match analyzer.run(&task.config, data) {
            Ok(report) => println!("{}", report.summary),
            Err(e) => println!("{}: {}", task.config.name(), e),
        }
    }
}
