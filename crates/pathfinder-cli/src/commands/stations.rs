//! `stations`: list stations near the straight segment between two points.

use std::io;

use anyhow::{Context, Result};
use pathfinder_lib::{find_corridor_stations, Coordinate, SqliteStationStore};

use pathfinder_cli::output::write_stations;

use super::AppContext;

/// Arguments for the stations command.
#[derive(Debug, Clone)]
pub struct StationsCommandArgs {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Corridor width in miles; the configured default when absent.
    pub corridor: Option<f64>,
}

pub fn handle_stations(ctx: &AppContext, args: &StationsCommandArgs) -> Result<()> {
    let store = SqliteStationStore::open(&ctx.db_path).with_context(|| {
        format!(
            "failed to open station database {}",
            ctx.db_path.display()
        )
    })?;
    let corridor = args.corridor.unwrap_or(ctx.config.corridor_miles);
    let stations = find_corridor_stations(&store, &[args.from, args.to], corridor)?;

    let mut stdout = io::stdout().lock();
    write_stations(&mut stdout, ctx.format, &ctx.palette, &stations)?;
    Ok(())
}
