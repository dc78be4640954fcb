//! The `kyaro` binary.
//!
//! With no arguments it starts the REPL; with a single file argument it
//! executes the file in batch mode.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kyaro_drv::{run_file, Repl};

/// The Kyaro scripting language.
#[derive(Parser, Debug)]
#[command(name = "kyaro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for the Kyaro scripting language", long_about = None)]
struct Cli {
    /// Source file to execute; omit to start the REPL
    script: Option<PathBuf>,

    /// Enable verbose logging (to stderr)
    #[arg(short, long, env = "KYARO_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.script {
        Some(path) => ExitCode::from(run_file(&path) as u8),
        None => match Repl::new().run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Initialize the logging system.
///
/// Diagnostics go to stderr so program output on stdout stays clean.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_means_repl() {
        let cli = Cli::parse_from(["kyaro"]);
        assert!(cli.script.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_script_path() {
        let cli = Cli::parse_from(["kyaro", "program.kyaro"]);
        assert_eq!(cli.script, Some(PathBuf::from("program.kyaro")));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["kyaro", "--verbose", "program.kyaro"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["kyaro", "a.kyaro", "b.kyaro"]).is_err());
    }
}
