//! different utility modules used throughout the project
/// simplelog set-up: terminal logger with an optional file copy
pub mod logger;
/// parse documents with structure like "title \n key1: value1 \n key2: value2" into typed analysis tasks
pub mod task_parser;
///
mod task_parser_tests;
