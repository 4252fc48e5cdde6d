//! `geocode`: resolve an address through the cached provider chain.

use std::io;

use anyhow::{Context, Result};
use pathfinder_lib::{build_client, Error as LibError};

use pathfinder_cli::output::write_geocode;

use super::AppContext;

pub fn handle_geocode(ctx: &AppContext, address: &str) -> Result<()> {
    let client = build_client(ctx.config.http_timeout).context("failed to build HTTP client")?;
    let resolver = ctx.resolver(&client)?;
    let coordinate = resolver
        .resolve(address)
        .ok_or_else(|| LibError::AddressNotFound {
            address: address.to_string(),
        })?;

    let mut stdout = io::stdout().lock();
    write_geocode(&mut stdout, ctx.format, address, coordinate)?;
    Ok(())
}
