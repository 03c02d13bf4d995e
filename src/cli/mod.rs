//! CLI module for restock.
//!
//! All CLI logic lives here rather than in main.rs so argument parsing,
//! command dispatch, and rendering are fully testable. The entry point
//! `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::run_cli;
pub use output::{example_scenario, print_help, print_version, render_json, render_text};
