//! Loads analysis tasks from a plain-text document made of sections: a title line naming
//! the task, followed by `key: value` lines. Values run to the end of the line, so they may
//! hold expressions and comma-separated pairs.
//!
//! ```text
//! // comments start with //, #, % or ;
//! zeroes
//! expression: x^2-4
//! interval: 0, 5
//!
//! trend
//! data: 1, 2, nan, 0, -2, -3, -4, -5, -6
//! mode: zeroes
//! ```
use crate::numerical::analysis::config::{
    AnalysisConfig, CrossingMode, ExtremumMode, Integration2DConfig, IntegrationConfig,
    IntegrationMethod, IntegrationOutput, ScanConfig, TaylorConfig, TrendConfig, TrendMode,
};
use crate::numerical::analysis::data_source::DataTable;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::split_top_level;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, line_ending, multispace0, not_line_ending, space0},
    combinator::{eof, map, recognize},
    multi::{many0, many1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::str::FromStr;

pub type SectionMap = HashMap<String, String>;
/// sections in document order
pub type Document = Vec<(String, SectionMap)>;

/// One loaded task: its configuration and, for trend sections, the inline data.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub config: AnalysisConfig,
    pub data: Option<DataTable>,
}

/// Parses an identifier (letters, digits and underscores, not starting with a digit)
pub(crate) fn parse_key(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

/// Parses a title: an identifier alone on its line
pub(crate) fn parse_title(input: &str) -> IResult<&str, String> {
    let mut parser = delimited(space0, parse_key, (space0, alt((line_ending, eof))));
    parser.parse(input)
}

/// Parses the rest of the line as a trimmed value
pub(crate) fn parse_value(input: &str) -> IResult<&str, String> {
    let mut parser = map(not_line_ending, |s: &str| s.trim().to_string());
    parser.parse(input)
}

/// Parses `key: value` up to and including the line ending
pub(crate) fn parse_key_value_pair(input: &str) -> IResult<&str, (String, String)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = terminated(
        delimited(space0, separated_pair(parse_key, colon_separator, parse_value), space0),
        alt((line_ending, eof)),
    );
    parser.parse(input)
}

/// Parses a section with a title and its key-value pairs
pub(crate) fn parse_section(input: &str) -> IResult<&str, (String, Vec<(String, String)>)> {
    let mut parser = pair(parse_title, many0(parse_key_value_pair));
    parser.parse(input)
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the whole document. Keys may appear once per section.
pub fn parse_document(input: &str) -> Result<Document, String> {
    let filtered = filter_comments(input);
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    let (remaining, sections) = parser
        .parse(filtered.as_str())
        .map_err(|e| format!("Parsing error: {:?}", e))?;
    if !remaining.trim().is_empty() {
        return Err(format!(
            "Failed to parse entire document. Remaining: '{}'",
            remaining
        ));
    }
    let mut document = Vec::with_capacity(sections.len());
    for (title, pairs) in sections {
        let mut section = HashMap::new();
        for (key, value) in pairs {
            if section.insert(key.clone(), value).is_some() {
                return Err(format!("key '{}' repeated in section '{}'", key, title));
            }
        }
        document.push((title, section));
    }
    Ok(document)
}

/// Number or constant expression such as `2*pi`
fn constant(key: &str, text: &str) -> Result<f64, String> {
    if let Ok(value) = text.trim().parse::<f64>() {
        return Ok(value);
    }
    let expr = Expr::parse_expression(text).map_err(|e| format!("{}: {}", key, e))?;
    let compiled = expr
        .compile(&[])
        .map_err(|e| format!("{} must be a constant: {}", key, e))?;
    Ok(compiled.eval(&[]))
}

fn constant_pair(key: &str, text: &str) -> Result<(f64, f64), String> {
    match split_top_level(text, ',').as_slice() {
        [a, b] => Ok((constant(key, a)?, constant(key, b)?)),
        _ => Err(format!("{} needs two comma-separated values, got '{}'", key, text)),
    }
}

fn count(key: &str, text: &str) -> Result<usize, String> {
    text.trim()
        .parse::<usize>()
        .map_err(|e| format!("{}: '{}' is not a count ({})", key, text, e))
}

fn flag<T: FromStr>(key: &str, text: &str) -> Result<T, String>
where
    T::Err: Debug,
{
    T::from_str(&text.trim().to_lowercase())
        .map_err(|e| format!("{}: unknown value '{}' ({:?})", key, text, e))
}

fn numbers(key: &str, text: &str) -> Result<Vec<f64>, String> {
    text.split(',')
        .map(|item| {
            item.trim()
                .parse::<f64>()
                .map_err(|e| format!("{}: '{}' is not a number ({})", key, item.trim(), e))
        })
        .collect()
}

fn required<'a>(section: &'a SectionMap, title: &str, key: &str) -> Result<&'a str, String> {
    section
        .get(key)
        .map(|v| v.as_str())
        .ok_or_else(|| format!("section '{}' needs '{}'", title, key))
}

fn scan_config(title: &str, section: &SectionMap) -> Result<ScanConfig, String> {
    let mut config = ScanConfig {
        expression: required(section, title, "expression")?.to_string(),
        ..Default::default()
    };
    for (key, value) in section {
        match key.as_str() {
            "expression" => {}
            "variable" => config.variable = Some(value.clone()),
            "interval" => config.interval = Some(constant_pair(key, value)?),
            "samples" => config.samples = count(key, value)?,
            "eps" => config.eps = constant(key, value)?,
            "mode" if title == "zeroes" => config.crossing = flag::<CrossingMode>(key, value)?,
            "mode" => config.extremum = flag::<ExtremumMode>(key, value)?,
            "name" => config.name = Some(value.clone()),
            _ => return Err(format!("unknown key '{}' in section '{}'", key, title)),
        }
    }
    Ok(config)
}

fn integration_config(title: &str, section: &SectionMap) -> Result<IntegrationConfig, String> {
    let mut config = IntegrationConfig {
        expression: required(section, title, "expression")?.to_string(),
        ..Default::default()
    };
    for (key, value) in section {
        match key.as_str() {
            "expression" => {}
            "variable" => config.variable = Some(value.clone()),
            "interval" => config.bounds = Some(constant_pair(key, value)?),
            "step" => config.step = Some(constant(key, value)?),
            "method" => config.method = flag::<IntegrationMethod>(key, value)?,
            "output" => config.output = flag::<IntegrationOutput>(key, value)?,
            "name" => config.name = Some(value.clone()),
            _ => return Err(format!("unknown key '{}' in section '{}'", key, title)),
        }
    }
    Ok(config)
}

fn integration_2d_config(title: &str, section: &SectionMap) -> Result<Integration2DConfig, String> {
    let mut config = Integration2DConfig {
        expression: required(section, title, "expression")?.to_string(),
        ..Default::default()
    };
    for (key, value) in section {
        match key.as_str() {
            "expression" => {}
            "x" => config.x_variable = value.clone(),
            "y" => config.y_variable = value.clone(),
            "xinterval" => config.x_bounds = Some(constant_pair(key, value)?),
            "yinterval" => match split_top_level(value, ',').as_slice() {
                [lo, hi] => config.y_bounds = Some((lo.clone(), hi.clone())),
                _ => return Err(format!("{} needs two comma-separated bounds", key)),
            },
            "xstep" => config.x_step = Some(constant(key, value)?),
            "ystep" => config.y_step = Some(constant(key, value)?),
            "method" => config.method = flag::<IntegrationMethod>(key, value)?,
            "name" => config.name = Some(value.clone()),
            _ => return Err(format!("unknown key '{}' in section '{}'", key, title)),
        }
    }
    Ok(config)
}

fn trend_task(title: &str, section: &SectionMap) -> Result<Task, String> {
    let mut table = DataTable::new();
    table.push_column("data", numbers("data", required(section, title, "data")?)?);
    let mut config = TrendConfig::default();
    for (key, value) in section {
        match key.as_str() {
            "data" => {}
            "xdata" => config.x_column = Some(table.push_column("xdata", numbers(key, value)?)),
            "order" => config.order = count(key, value)?,
            "mode" => config.mode = flag::<TrendMode>(key, value)?,
            "rows" => match split_top_level(value, ',').as_slice() {
                [start, end] => config.rows = Some((count(key, start)?, count(key, end)?)),
                _ => return Err(format!("{} needs two comma-separated indices", key)),
            },
            "name" => config.name = Some(value.clone()),
            _ => return Err(format!("unknown key '{}' in section '{}'", key, title)),
        }
    }
    Ok(Task {
        config: AnalysisConfig::Trend(config),
        data: Some(table),
    })
}

fn taylor_config(title: &str, section: &SectionMap) -> Result<TaylorConfig, String> {
    let mut config = TaylorConfig {
        expression: required(section, title, "expression")?.to_string(),
        ..Default::default()
    };
    for (key, value) in section {
        match key.as_str() {
            "expression" => {}
            "variable" => config.variable = Some(value.clone()),
            "center" => config.center = constant(key, value)?,
            "order" => config.order = count(key, value)?,
            "step" => config.step = constant(key, value)?,
            "name" => config.name = Some(value.clone()),
            _ => return Err(format!("unknown key '{}' in section '{}'", key, title)),
        }
    }
    Ok(config)
}

/// Typed task of one section
pub fn task_from_section(title: &str, section: &SectionMap) -> Result<Task, String> {
    let config = match title {
        "zeroes" => AnalysisConfig::Zeroes(scan_config(title, section)?),
        "extrema" => AnalysisConfig::Extrema(scan_config(title, section)?),
        "integrate" => AnalysisConfig::Integrate(integration_config(title, section)?),
        "integrate2" => AnalysisConfig::Integrate2D(integration_2d_config(title, section)?),
        "trend" => return trend_task(title, section),
        "taylor" => AnalysisConfig::Taylor(taylor_config(title, section)?),
        _ => return Err(format!("unknown task '{}'", title)),
    };
    Ok(Task { config, data: None })
}

/// Tasks of a document, in document order
pub fn load_tasks(input: &str) -> Result<Vec<Task>, String> {
    parse_document(input)?
        .iter()
        .map(|(title, section)| task_from_section(title, section))
        .collect()
}

pub fn load_tasks_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Task>, String> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    load_tasks(&content)
}
