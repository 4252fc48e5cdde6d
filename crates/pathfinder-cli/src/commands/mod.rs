//! Subcommand handlers.
//!
//! `main.rs` parses arguments and dispatches here; each module owns one
//! subcommand.

pub mod geocode;
pub mod history;
pub mod route;
pub mod stations;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use pathfinder_lib::{
    Config, Coordinate, Error as LibError, GeocodeCache, GeocodeResolver, HttpClient,
    JsonFileGeocodeCache, MemoryGeocodeCache,
};
use tracing::{debug, warn};

use pathfinder_cli::output::OutputFormat;
use pathfinder_cli::terminal::ColorPalette;

const DB_FILE_NAME: &str = "pathfinder.db";

/// State shared by every subcommand.
pub struct AppContext {
    pub config: Config,
    pub db_path: PathBuf,
    pub format: OutputFormat,
    pub palette: ColorPalette,
}

impl AppContext {
    pub fn load(db: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let config = Config::from_env().context("failed to read configuration from environment")?;
        let db_path = match db {
            Some(path) => path.to_path_buf(),
            None => default_db_path()?,
        };
        Ok(Self {
            config,
            db_path,
            format,
            palette: ColorPalette::detect(),
        })
    }

    /// Geocode resolver backed by the on-disk cache.
    ///
    /// A cache file that cannot be read is replaced by an in-memory cache for
    /// this run rather than failing the command.
    pub fn resolver(&self, client: &HttpClient) -> Result<GeocodeResolver> {
        let cache: Arc<dyn GeocodeCache> =
            match JsonFileGeocodeCache::open_default(self.config.cache_dir.as_deref()) {
                Ok(cache) => {
                    debug!(path = %cache.path().display(), "using geocode cache file");
                    Arc::new(cache)
                }
                Err(err) => {
                    warn!(error = %err, "geocode cache unavailable; using in-memory cache");
                    Arc::new(MemoryGeocodeCache::new())
                }
            };
        GeocodeResolver::from_config(&self.config, client, cache)
            .context("failed to configure geocoding providers")
    }
}

/// Interpret `input` as `lon,lat`, falling back to geocoding it as an address.
pub fn locate(resolver: &GeocodeResolver, input: &str) -> Result<Coordinate> {
    if let Ok(coordinate) = input.parse::<Coordinate>() {
        return Ok(coordinate);
    }
    resolver.resolve(input).ok_or_else(|| {
        LibError::AddressNotFound {
            address: input.to_string(),
        }
        .into()
    })
}

fn default_db_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "pathfinder", "pathfinder")
        .context("failed to resolve a data directory for the station database")?;
    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    Ok(data_dir.join(DB_FILE_NAME))
}
