use clap::{Parser, Subcommand};
use roadspan_core::config::{parse_nominal_length, parse_srid, CliConfigOverrides};
use std::path::PathBuf;

/// Roadspan - Highway work-location geometry resolution
#[derive(Parser, Debug)]
#[command(name = "roadspan")]
#[command(about = "Resolve highway work locations to geometries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Resolver settings file (TOML)
    #[arg(long, global = true, env = "ROADSPAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storage backend to use (memory or postgres)
    #[arg(long, global = true, default_value = "memory")]
    pub storage: StorageBackend,

    /// Reference data file (JSON) for the memory backend
    #[arg(long, global = true, env = "ROADSPAN_REFERENCE_FILE")]
    pub reference: Option<PathBuf>,

    /// Target CRS for output geometries (e.g. 4326 or EPSG:4326)
    #[arg(long, global = true, value_parser = srid_arg)]
    pub target_srid: Option<u32>,

    /// CRS assumed for geometries mis-tagged as EPSG:4326
    #[arg(long, global = true, value_parser = srid_arg)]
    pub assumed_source_srid: Option<u32>,

    /// Nominal federal road length in km for the approximate tier, or "none"
    #[arg(long, global = true, value_parser = length_arg)]
    pub federal_nominal_km: Option<NominalLength>,

    /// Nominal state road length in km for the approximate tier, or "none"
    #[arg(long, global = true, value_parser = length_arg)]
    pub state_nominal_km: Option<NominalLength>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            target_srid: self.target_srid,
            assumed_source_srid: self.assumed_source_srid,
            federal_nominal_km: self.federal_nominal_km.map(|l| l.0),
            state_nominal_km: self.state_nominal_km.map(|l| l.0),
        }
    }
}

fn srid_arg(s: &str) -> Result<u32, String> {
    parse_srid(s).map_err(|e| e.to_string())
}

/// A nominal length argument; `None` disables the approximate tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NominalLength(pub Option<f64>);

fn length_arg(s: &str) -> Result<NominalLength, String> {
    parse_nominal_length(s).map(NominalLength).map_err(|e| e.to_string())
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StorageBackend {
    /// Reference data loaded from a JSON file (default)
    Memory,
    /// PostgreSQL/PostGIS reference tables (DATABASE_URL)
    Postgres,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a file of work-location requests
    Resolve(ResolveArgs),

    /// Check a km range against a highway's reference data
    ValidateKm(ValidateKmArgs),

    /// Show the effective resolver configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// JSON file holding an array of requests, or an object with a
    /// "requests" array
    pub requests: PathBuf,

    /// Resolve requests concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Also write created geometries as a GeoJSON FeatureCollection
    #[arg(long, value_name = "PATH")]
    pub geojson: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ValidateKmArgs {
    /// Highway record id
    pub highway_id: u64,

    /// First kilometer of the range
    pub km_start: f64,

    /// Last kilometer of the range
    pub km_end: f64,
}
