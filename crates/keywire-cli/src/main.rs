mod error;
mod route;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, ErrorCode};

#[derive(Parser)]
#[command(name = "keywire", version, about = "Wire routing and keymaps for hand-wired keyboards")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Route every wire of a project and write keymaps and diagrams
    Route(RouteArgs),
    /// List the built-in mainboards
    Mainboards,
}

#[derive(Args)]
pub struct RouteArgs {
    /// Project file (YAML or JSON)
    #[arg(value_name = "PROJECT")]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Solver budget per wire, in seconds
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<f64>,

    /// Solver worker threads
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Draw diagrams as seen from the switch side
    #[arg(long)]
    pub no_mirror: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "keywire=debug" } else { "keywire=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Route(args) => route::run_route(&args),
        Command::Mainboards => {
            route::list_mainboards();
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ErrorCode::Usage.into()
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.code.into()
        }
    }
}
