use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the stx binary.
#[derive(Parser, Debug)]
#[command(name = "stx", version, about = "Code completion by constraint solving")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Disable colored text output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the proposals for every placeholder of a fixture's input.
    Complete {
        /// Fixture file.
        fixture: PathBuf,

        /// Only complete this placeholder variable (e.g. `plhdr0`).
        #[arg(long)]
        var: Option<String>,
    },
    /// Complete each fixture's input towards its expected program.
    Check {
        /// Fixture files.
        #[arg(required = true)]
        fixtures: Vec<PathBuf>,

        /// Check one case per node of the expected program, with that node
        /// cut out, instead of the fixture's input.
        #[arg(long = "all-holes")]
        all_holes: bool,

        #[command(flatten)]
        overrides: DriverOverrides,
    },
}

/// Driver options that override the fixture's own.
#[derive(Args, Debug, Default, Clone)]
pub struct DriverOverrides {
    /// Maximum number of completion rounds.
    #[arg(long = "max-rounds")]
    pub max_rounds: Option<u32>,

    /// Fail instead of inserting expected literals.
    #[arg(long = "no-literal-fallback")]
    pub no_literal_fallback: bool,

    /// Tolerate errors the input program already has.
    #[arg(long = "allow-input-errors")]
    pub allow_input_errors: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod tests;
