//! `route`: compute a fuel-optimised plan between two points.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use pathfinder_lib::{
    build_client, directions_from_config, Coordinate, RoutePlanner, SqliteRouteStore,
    SqliteStationStore,
};
use tracing::debug;

use pathfinder_cli::output::write_route;

use super::{locate, AppContext};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Start as `lon,lat` or a free-form address.
    pub from: String,
    /// Destination as `lon,lat` or a free-form address.
    pub to: String,
    /// Skip writing the plan to the route history.
    pub no_save: bool,
}

pub fn handle_route(ctx: &AppContext, args: &RouteCommandArgs) -> Result<()> {
    let client = build_client(ctx.config.http_timeout).context("failed to build HTTP client")?;
    let directions = directions_from_config(&ctx.config, &client)?;

    let (start, end) = match (
        args.from.parse::<Coordinate>(),
        args.to.parse::<Coordinate>(),
    ) {
        (Ok(start), Ok(end)) => (start, end),
        _ => {
            let resolver = ctx.resolver(&client)?;
            (locate(&resolver, &args.from)?, locate(&resolver, &args.to)?)
        }
    };
    debug!(%start, %end, "resolved route endpoints");

    let stations = SqliteStationStore::open(&ctx.db_path).with_context(|| {
        format!(
            "failed to open station database {}",
            ctx.db_path.display()
        )
    })?;
    let mut planner = RoutePlanner::from_config(&ctx.config, directions, Arc::new(stations));
    if !args.no_save {
        let routes = SqliteRouteStore::open(&ctx.db_path).with_context(|| {
            format!("failed to open route history {}", ctx.db_path.display())
        })?;
        planner = planner.with_route_store(Arc::new(routes));
    }

    let plan = planner.compute_route(start, end)?;

    let mut stdout = io::stdout().lock();
    write_route(&mut stdout, ctx.format, &ctx.palette, start, end, &plan)?;
    Ok(())
}
