//! Output of analysis results: console summary and report files.

pub mod console;
pub mod generator;

pub use console::print_summary;
pub use generator::{generate_json_report, generate_markdown_report};
