//! CLI argument parsing.
//!
//! Hand-rolled parser over an iterator of strings so every path is
//! testable without touching the process environment.

use std::path::PathBuf;

use crate::solver::BackendKind;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a planning scenario.
    Plan {
        /// Path to the scenario YAML file.
        scenario_path: PathBuf,
        /// Emit the report as JSON instead of text.
        json: bool,
        /// Override the synthetic demand seed.
        seed_override: Option<u64>,
        /// Override the configured solver backend.
        backend_override: Option<BackendKind>,
    },
    /// Print a starter scenario to stdout.
    Example,
    /// Show help.
    Help,
    /// Show version.
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "plan" => Self::parse_plan_command(args),
            "example" => Command::Example,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    fn parse_plan_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'plan' command requires a scenario path");
            return Command::Help;
        }

        let mut json = false;
        let mut seed_override = None;
        let mut backend_override = None;

        let mut i = 3;
        while i < args.len() {
            match args[i].as_str() {
                "--json" => {
                    json = true;
                    i += 1;
                }
                "--seed" => {
                    if i + 1 < args.len() {
                        if let Ok(seed) = args[i + 1].parse() {
                            seed_override = Some(seed);
                        } else {
                            eprintln!("Warning: invalid seed '{}', ignored", args[i + 1]);
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "--backend" => {
                    if i + 1 < args.len() {
                        match parse_backend(&args[i + 1]) {
                            Some(kind) => backend_override = Some(kind),
                            None => {
                                eprintln!(
                                    "Warning: unknown backend '{}', ignored",
                                    args[i + 1]
                                );
                            }
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                other => {
                    eprintln!("Warning: unknown option '{other}', ignored");
                    i += 1;
                }
            }
        }

        Command::Plan {
            scenario_path: PathBuf::from(&args[2]),
            json,
            seed_override,
            backend_override,
        }
    }
}

fn parse_backend(name: &str) -> Option<BackendKind> {
    match name {
        "augmented-lagrangian" => Some(BackendKind::AugmentedLagrangian),
        "simplex" => Some(BackendKind::Simplex),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_shows_help() {
        let args = Args::parse_from(["restock"]);
        assert_eq!(args.command, Command::Help);
    }

    #[test]
    fn test_plan_command_basic() {
        let args = Args::parse_from(["restock", "plan", "scenario.yaml"]);
        assert_eq!(
            args.command,
            Command::Plan {
                scenario_path: PathBuf::from("scenario.yaml"),
                json: false,
                seed_override: None,
                backend_override: None,
            }
        );
    }

    #[test]
    fn test_plan_command_all_options() {
        let args = Args::parse_from([
            "restock",
            "plan",
            "scenario.yaml",
            "--json",
            "--seed",
            "7",
            "--backend",
            "simplex",
        ]);
        assert_eq!(
            args.command,
            Command::Plan {
                scenario_path: PathBuf::from("scenario.yaml"),
                json: true,
                seed_override: Some(7),
                backend_override: Some(BackendKind::Simplex),
            }
        );
    }

    #[test]
    fn test_plan_without_path_is_help() {
        let args = Args::parse_from(["restock", "plan"]);
        assert_eq!(args.command, Command::Help);
    }

    #[test]
    fn test_invalid_seed_ignored() {
        let args = Args::parse_from(["restock", "plan", "s.yaml", "--seed", "abc"]);
        assert_eq!(
            args.command,
            Command::Plan {
                scenario_path: PathBuf::from("s.yaml"),
                json: false,
                seed_override: None,
                backend_override: None,
            }
        );
    }

    #[test]
    fn test_unknown_backend_ignored() {
        let args = Args::parse_from(["restock", "plan", "s.yaml", "--backend", "gurobi"]);
        assert_eq!(
            args.command,
            Command::Plan {
                scenario_path: PathBuf::from("s.yaml"),
                json: false,
                seed_override: None,
                backend_override: None,
            }
        );
    }

    #[test]
    fn test_example_command() {
        let args = Args::parse_from(["restock", "example"]);
        assert_eq!(args.command, Command::Example);
    }

    #[test]
    fn test_help_aliases() {
        for alias in ["help", "-h", "--help"] {
            let args = Args::parse_from(["restock", alias]);
            assert_eq!(args.command, Command::Help);
        }
    }

    #[test]
    fn test_version_aliases() {
        for alias in ["version", "-V", "--version"] {
            let args = Args::parse_from(["restock", alias]);
            assert_eq!(args.command, Command::Version);
        }
    }

    #[test]
    fn test_unknown_command_is_help() {
        let args = Args::parse_from(["restock", "optimize"]);
        assert_eq!(args.command, Command::Help);
    }
}
