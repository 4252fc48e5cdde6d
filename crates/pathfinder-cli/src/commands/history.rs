//! `history`: show recently saved route plans.

use std::io;

use anyhow::{Context, Result};
use pathfinder_lib::SqliteRouteStore;

use pathfinder_cli::output::write_history;

use super::AppContext;

pub fn handle_history(ctx: &AppContext, limit: usize) -> Result<()> {
    let store = SqliteRouteStore::open(&ctx.db_path)
        .with_context(|| format!("failed to open route history {}", ctx.db_path.display()))?;
    let routes = store.recent_routes(limit)?;

    let mut stdout = io::stdout().lock();
    write_history(&mut stdout, ctx.format, &routes)?;
    Ok(())
}
