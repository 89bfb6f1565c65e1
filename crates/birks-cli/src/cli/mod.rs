mod commands;
mod helpers;
mod report;

use birks_core::domain::BirksError;
use clap::Parser;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();

    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_birks_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            if let Some(summary_line) = diagnostic.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            diagnostic.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_tracing(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "birks",
    version,
    about = "Birks-law quenching for scintillators"
)]
struct Cli {
    /// Log solver and loader details to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Quenched visible energy for a given Birks constant
    Forward(commands::ForwardArgs),
    /// Birks constant that reproduces an observed visible energy
    Inverse(commands::InverseArgs),
    /// Show a parsed stopping-power table
    Table(commands::TableArgs),
    /// List the presets of a catalog
    Presets(commands::PresetsArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Forward(args) => commands::run_forward_command(args),
        CliCommand::Inverse(args) => commands::run_inverse_command(args),
        CliCommand::Table(args) => commands::run_table_command(args),
        CliCommand::Presets(args) => commands::run_presets_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(BirksError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_birks_error(&self) -> BirksError {
        match self {
            Self::Usage(message) => {
                BirksError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => BirksError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
