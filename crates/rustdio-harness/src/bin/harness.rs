//! CLI entrypoint for the rustdio conformance harness.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rustdio_harness::{RunReport, run_all, scenarios};

/// Conformance tooling for rustdio.
#[derive(Debug, Parser)]
#[command(name = "rustdio-harness")]
#[command(about = "Conformance harness for rustdio buffered streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run all scenarios against a work directory.
    Run {
        /// Directory for scenario files (created if absent).
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// Emit the report as JSON instead of plain text.
        #[arg(long)]
        json: bool,
        /// Write the report to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List scenario names.
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            workdir,
            json,
            output,
        } => {
            let workdir = workdir.unwrap_or_else(|| {
                std::env::temp_dir().join(format!("rustdio-harness-{}", std::process::id()))
            });
            let reports = match run_all(&workdir) {
                Ok(reports) => reports,
                Err(err) => {
                    eprintln!("harness aborted: {err}");
                    return ExitCode::FAILURE;
                }
            };
            let report = RunReport::new(reports);

            let rendered = if json {
                match report.to_json() {
                    Ok(text) => text,
                    Err(err) => {
                        eprintln!("report serialization failed: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                render_text(&report)
            };

            match output {
                Some(path) => {
                    if let Err(err) = std::fs::write(&path, rendered) {
                        eprintln!("cannot write {}: {err}", path.display());
                        return ExitCode::FAILURE;
                    }
                }
                None => println!("{rendered}"),
            }

            if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::List => {
            for name in scenarios::SCENARIOS {
                println!("{name}");
            }
            ExitCode::SUCCESS
        }
    }
}

fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    for scenario in &report.scenarios {
        let mark = if scenario.passed { "PASS" } else { "FAIL" };
        out.push_str(&format!("{mark}  {:24} {}\n", scenario.scenario, scenario.detail));
    }
    out.push_str(&format!("{}/{} scenarios passed\n", report.passed, report.total));
    out
}
