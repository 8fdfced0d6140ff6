//! Cadence scheduling model CLI
//!
//! Entry point for the demo runner. Parses CLI arguments and delegates to
//! the DemoRunner for execution.

use clap::Parser as ClapParser;
use sim_cli::{Cli, CliError, DemoRunner, DEMO_NAMES};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list {
        println!("Available demos:");
        for name in DEMO_NAMES {
            println!("  {}", name);
        }
        return Ok(());
    }

    if let Some(name) = cli.demo {
        let runner = DemoRunner::new(cli.trace || cli.json);
        match runner.run(&name) {
            Ok(report) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    for line in &report.lines {
                        println!("{}", line);
                    }
                    if cli.trace {
                        println!();
                        println!("Trace ({} events):", report.trace.len());
                        for event in &report.trace {
                            println!("  {:?}", event);
                        }
                    }
                    for failure in &report.task_failures {
                        eprintln!("task failure: {}", failure);
                    }
                    for rejection in &report.unhandled_rejections {
                        eprintln!("unhandled rejection: {}", rejection);
                    }
                }
            }
            Err(CliError::UnknownDemo(name)) => {
                eprintln!("Error: unknown demo '{}'", name);
                eprintln!("Run 'cadence-sim --list' to see available demos.");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        // Default: show usage
        println!("Cadence scheduling model v0.1.0");
        println!();
        println!("Usage:");
        println!("  cadence-sim --demo <NAME>   Run a demo scenario");
        println!("  cadence-sim --list          List available demos");
        println!("  cadence-sim --demo <NAME> --trace   Include the execution trace");
        println!("  cadence-sim --demo <NAME> --json    Emit the report as JSON");
        println!();
        println!("Run 'cadence-sim --help' for all options.");
    }

    Ok(())
}
