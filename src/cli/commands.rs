//! CLI command handlers.
//!
//! Execution logic for each command, returning `ExitCode` so `main` stays
//! a thin shell.

use std::path::Path;
use std::process::ExitCode;

use crate::config::{DemandSource, PlannerConfig};
use crate::planner::Planner;
use crate::solver::BackendKind;

use super::output::{example_scenario, print_help, print_version, render_json, render_text};
use super::{Args, Command};

/// Main CLI entry point: dispatch on the parsed command.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Plan {
            scenario_path,
            json,
            seed_override,
            backend_override,
        } => plan(&scenario_path, json, seed_override, backend_override),
        Command::Example => {
            print!("{}", example_scenario());
            ExitCode::SUCCESS
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

fn plan(
    path: &Path,
    json: bool,
    seed_override: Option<u64>,
    backend_override: Option<BackendKind>,
) -> ExitCode {
    let mut config = match PlannerConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading scenario: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(seed) = seed_override {
        match &mut config.demand {
            DemandSource::Synthetic(synthetic) => synthetic.seed = seed,
            DemandSource::Inline(_) => {
                eprintln!("Warning: --seed has no effect on inline demand");
            }
        }
    }
    if let Some(backend) = backend_override {
        config.solver.backend = backend;
    }

    let planner = match Planner::new(config) {
        Ok(planner) => planner,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match planner.run() {
        Ok(report) => {
            if json {
                match render_json(&report) {
                    Ok(body) => println!("{body}"),
                    Err(err) => {
                        eprintln!("Error rendering report: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{}", render_text(&report));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn scenario_file(content: &str) -> tempfile_path::TempPath {
        tempfile_path::write(content)
    }

    // Minimal temp-file helper; avoids a dev-dependency for two tests.
    mod tempfile_path {
        use std::io::Write;
        use std::path::PathBuf;

        pub struct TempPath(pub PathBuf);

        impl Drop for TempPath {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }

        pub fn write(content: &str) -> TempPath {
            let mut path = std::env::temp_dir();
            let unique = format!(
                "restock-test-{}-{:?}.yaml",
                std::process::id(),
                std::thread::current().id()
            );
            path.push(unique);
            let mut file = std::fs::File::create(&path).expect("create temp scenario");
            file.write_all(content.as_bytes()).expect("write scenario");
            TempPath(path)
        }
    }

    #[test]
    fn test_plan_with_valid_scenario_succeeds() {
        let file = scenario_file(example_scenario());
        let code = plan(&file.0, false, None, None);
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_plan_with_missing_file_fails() {
        let code = plan(Path::new("/nonexistent/scenario.yaml"), false, None, None);
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn test_plan_with_invalid_yaml_fails() {
        let file = scenario_file("demand:\n  inline: {}\n");
        let code = plan(&file.0, false, None, None);
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn test_plan_json_output_succeeds() {
        let file = scenario_file(example_scenario());
        let code = plan(&file.0, true, Some(7), None);
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_run_cli_help() {
        let code = run_cli(Args {
            command: Command::Help,
        });
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_run_cli_example() {
        let code = run_cli(Args {
            command: Command::Example,
        });
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_backend_override_applies() {
        let file = scenario_file(example_scenario());
        let code = plan(&file.0, false, None, Some(BackendKind::AugmentedLagrangian));
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
