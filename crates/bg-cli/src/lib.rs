use std::ffi::OsString;

use bg_core::BgError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod commands;
mod error_map;
mod output;

pub(crate) use cli_args::{
    Cli, Command, ImporterArgs, RequirementArgs, ResolveArgs, TestCaseArgs, TestResultsArgs,
    TestRunArgs,
};
pub(crate) use error_map::{emit_error, map_cli_json, map_cli_junit_read, map_cli_output_write};
pub(crate) use output::{emit_output, title_case, CommandOutput};

/// Environment variable holding the log filter; defaults to `warn`.
pub const LOG_ENV: &str = "BETELGEUSE_LOG";

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_logging();
    match run(cli) {
        Ok(output) => emit_output(output),
        Err(error) => emit_error(error),
    }
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<CommandOutput, BgError> {
    let config = || commands::load_engine_config(cli.config.as_deref());
    match cli.command {
        Command::TestCase(args) => commands::run_test_case(args, &config()?),
        Command::Requirement(args) => commands::run_requirement(args, &config()?),
        Command::TestRun(args) => commands::run_test_run(args, &config()?),
        Command::TestResults(args) => commands::run_test_results(args),
        Command::Resolve(args) => commands::run_resolve(args, &config()?),
    }
}

#[cfg(test)]
mod tests;
