mod commands;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pathfinder_lib::{Coordinate, Error as LibError};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::route::RouteCommandArgs;
use commands::stations::StationsCommandArgs;
use commands::AppContext;
use pathfinder_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fuel-optimised driving route planner")]
struct Cli {
    /// SQLite database holding fuel stations and saved routes.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the cheapest refuelling plan between two points.
    Route {
        /// Start as `lon,lat` or an address.
        #[arg(long = "from", allow_hyphen_values = true)]
        from: String,
        /// Destination as `lon,lat` or an address.
        #[arg(long = "to", allow_hyphen_values = true)]
        to: String,
        /// Do not save the plan to the route history.
        #[arg(long)]
        no_save: bool,
    },
    /// Resolve an address to `lon,lat`.
    Geocode {
        /// Free-form address.
        address: String,
    },
    /// List stations within the corridor of the straight segment between two points.
    Stations {
        /// Start as `lon,lat`.
        #[arg(long = "from", allow_hyphen_values = true)]
        from: Coordinate,
        /// End as `lon,lat`.
        #[arg(long = "to", allow_hyphen_values = true)]
        to: Coordinate,
        /// Corridor width in miles.
        #[arg(long)]
        corridor: Option<f64>,
    },
    /// Show recently saved routes.
    History {
        /// Maximum number of routes to show.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

/// Exit status for conditions the user can act on (unreachable destination,
/// unknown address, bad coordinate), as opposed to system faults.
const EXIT_USER_ERROR: u8 = 2;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::load(cli.db.as_deref(), cli.format)?;

    match cli.command {
        Command::Route { from, to, no_save } => {
            commands::route::handle_route(&ctx, &RouteCommandArgs { from, to, no_save })
        }
        Command::Geocode { address } => commands::geocode::handle_geocode(&ctx, &address),
        Command::Stations { from, to, corridor } => commands::stations::handle_stations(
            &ctx,
            &StationsCommandArgs { from, to, corridor },
        ),
        Command::History { limit } => commands::history::handle_history(&ctx, limit),
    }
}

/// User-facing library errors print their message alone; anything else
/// prints the full context chain.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<LibError>() {
        Some(lib_err) if lib_err.is_user_facing() => {
            eprintln!("{lib_err}");
            ExitCode::from(EXIT_USER_ERROR)
        }
        _ => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays parseable; `LOG_FORMAT=json` switches
/// to structured output.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let json = env::var("LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let _ = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
}
