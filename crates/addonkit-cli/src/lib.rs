//! Addonkit CLI - the command surface embedded into hook binaries
//!
//! A module author's binary hands its registry to [`run`]:
//!
//! ```no_run
//! use addonkit_hooks::Registry;
//!
//! fn main() -> std::process::ExitCode {
//!     let mut registry = Registry::new();
//!     // registry.add(...);
//!     addonkit_cli::run(&registry)
//! }
//! ```
//!
//! The orchestrator then drives the binary with `hook list`, `hook config`
//! and `hook run <index>`.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use addonkit_hooks::Registry;

pub mod commands;
mod error;
mod exit_codes;

pub use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "addonkit")]
#[command(version)]
#[command(about = "Addon-operator hook binary", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and run registered hooks
    Hook {
        #[command(subcommand)]
        command: HookCommands,
    },
}

#[derive(Subcommand)]
enum HookCommands {
    /// Enumerate registered hooks
    List,

    /// Emit all hook configs as JSON
    #[command(alias = "dump")]
    Config,

    /// Execute one registered hook by its registry index
    Run {
        /// Position of the hook in the registry (see `hook list`)
        index: usize,
    },
}

/// Parse `std::env::args` and dispatch; returns the process exit code
///
/// Every execution failure exits with code 1.
pub fn run(registry: &Registry) -> ExitCode {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: We're the only thread at this point (start of main)
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", CliError::internal(e.to_string()));
            return ExitCode::from(exit_codes::ERROR as u8);
        }
    };

    match runtime.block_on(dispatch(cli, registry)) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {:?}", miette::Report::new(e));
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Parse the given arguments and dispatch (used by tests)
pub async fn run_from<I, T>(registry: &Registry, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| CliError::internal(e.to_string()))?;
    dispatch(cli, registry).await
}

async fn dispatch(cli: Cli, registry: &Registry) -> Result<()> {
    match cli.command {
        Commands::Hook { command } => match command {
            HookCommands::List => commands::list::run(registry),
            HookCommands::Config => commands::config::run(registry),
            HookCommands::Run { index } => commands::run::run(registry, index).await,
        },
    }
}
