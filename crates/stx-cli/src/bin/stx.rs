#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use stx_cli::args::{CliArgs, Command, OutputFormat};
use stx_cli::commands::{check_all_holes, check_fixture, complete_fixture};
use stx_cli::fixture::Fixture;
use stx_cli::report::Reporter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_CHECK_FAILED: i32 = 1;

fn main() -> Result<()> {
    // Only installs a subscriber when STX_LOG or RUST_LOG is set.
    stx_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let reporter = Reporter::new(!args.no_color && std::io::stdout().is_terminal());

    let status = match &args.command {
        Command::Complete { fixture, var } => {
            let fixture = Fixture::load(fixture)?;
            let results = complete_fixture(&fixture, var.as_deref())?;
            match args.format {
                OutputFormat::Text => print!("{}", reporter.render_proposals(&results)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&results).context("failed to serialize proposals")?
                ),
            }
            EXIT_SUCCESS
        }
        Command::Check {
            fixtures,
            all_holes,
            overrides,
        } => {
            let mut reports = Vec::with_capacity(fixtures.len());
            for path in fixtures {
                let fixture = Fixture::load(path)?;
                if *all_holes {
                    reports.extend(check_all_holes(&fixture, overrides)?);
                } else {
                    reports.push(check_fixture(&fixture, overrides)?);
                }
            }
            match args.format {
                OutputFormat::Text => print!("{}", reporter.render_check(&reports)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&reports).context("failed to serialize reports")?
                ),
            }
            if reports.iter().all(|report| report.passed) {
                EXIT_SUCCESS
            } else {
                eprintln!("some fixtures failed");
                EXIT_CHECK_FAILED
            }
        }
    };
    std::process::exit(status);
}
