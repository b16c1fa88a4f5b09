//! simplelog set-up shared by the analyzer and the demo binary
use chrono::Local;
use simplelog::*;
use std::fmt;
use std::fs::File;

/// Log level from its text form. `"off"`/`"none"` disable logging; unknown names fall back
/// to `Info`.
pub fn parse_loglevel(loglevel: Option<&str>) -> Option<LevelFilter> {
    match loglevel.map(|l| l.trim().to_lowercase()) {
        None => Some(LevelFilter::Info),
        Some(level) => match level.as_str() {
            "off" | "none" => None,
            "debug" => Some(LevelFilter::Debug),
            "info" => Some(LevelFilter::Info),
            "warn" => Some(LevelFilter::Warn),
            "error" => Some(LevelFilter::Error),
            _ => Some(LevelFilter::Info),
        },
    }
}

/// `log_<date>_<time>.txt`
pub fn default_log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoggerError {
    /// the copy file could not be created; the terminal logger is still installed
    LogFile(String),
    /// a global logger was set up before
    AlreadyInstalled(String),
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoggerError::LogFile(msg) => write!(f, "Log file error: {}", msg),
            LoggerError::AlreadyInstalled(msg) => write!(f, "Logger already installed: {}", msg),
        }
    }
}

impl std::error::Error for LoggerError {}

/// Terminal logger plus an optional file copy. A file that cannot be created is reported
/// even when the terminal logger was installed.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), LoggerError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    let mut file_error = None;
    if let Some(filename) = log_file {
        match File::create(filename) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(e) => {
                file_error = Some(LoggerError::LogFile(format!(
                    "cannot create {}: {}",
                    filename, e
                )))
            }
        }
    }
    let installed = CombinedLogger::init(loggers);
    if let Some(e) = file_error {
        return Err(e);
    }
    installed.map_err(|e| LoggerError::AlreadyInstalled(e.to_string()))
}
