pub mod cli;
pub mod toml_config;

use crate::core::source::DEFAULT_VEHICLES_ENDPOINT;
use crate::core::{BoardCommand, ConfigProvider, MapView, OutputFormat};
use crate::domain::model::{
    DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, DEFAULT_TILE_URL, LATITUDE_BOUNDS, LONGITUDE_BOUNDS,
};
use crate::utils::error::{BoardError, Result};
use crate::utils::validation::{self, Validate};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "vehicle-board"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Fetch vehicles, sort/edit/delete them and render cards and a map overlay")
)]
#[derive(Debug, Clone)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_VEHICLES_ENDPOINT))]
    pub api_endpoint: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    /// sort:<year|price>, edit:<id>:<field>=<value>[,...] or delete:<id>; applied in order
    #[cfg_attr(feature = "cli", arg(long = "command", value_name = "COMMAND"))]
    pub commands: Vec<BoardCommand>,

    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', default_values_t = [OutputFormat::Cards, OutputFormat::Geojson])
    )]
    pub formats: Vec<OutputFormat>,

    #[cfg_attr(feature = "cli", arg(long, help = "Pack all outputs into one zip file"))]
    pub bundle: bool,

    #[cfg_attr(feature = "cli", arg(long))]
    pub timeout_seconds: Option<u64>,

    #[cfg_attr(
        feature = "cli",
        arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_MAP_CENTER[0])
    )]
    pub map_center_lat: f64,

    #[cfg_attr(
        feature = "cli",
        arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_MAP_CENTER[1])
    )]
    pub map_center_lon: f64,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_MAP_ZOOM))]
    pub map_zoom: u8,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_TILE_URL))]
    pub tile_url: String,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub log_json: bool,
}

impl CliConfig {
    /// Defaults matching the command line, pointed at `api_endpoint`.
    pub fn for_endpoint(api_endpoint: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            output_path: output_path.into(),
            commands: Vec::new(),
            formats: vec![OutputFormat::Cards, OutputFormat::Geojson],
            bundle: false,
            timeout_seconds: None,
            map_center_lat: DEFAULT_MAP_CENTER[0],
            map_center_lon: DEFAULT_MAP_CENTER[1],
            map_zoom: DEFAULT_MAP_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
            verbose: false,
            log_json: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    fn commands(&self) -> &[BoardCommand] {
        &self.commands
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn bundle(&self) -> bool {
        self.bundle
    }

    fn map_view(&self) -> MapView {
        MapView {
            center: [self.map_center_lat, self.map_center_lon],
            zoom: self.map_zoom,
            tile_url: self.tile_url.clone(),
        }
    }
}

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_url("api_endpoint", config.api_endpoint())?;
    validation::validate_path("output_path", config.output_path())?;

    if let Some(timeout) = config.timeout_seconds() {
        validation::validate_positive_number("timeout_seconds", timeout, 1)?;
    }

    if config.output_formats().is_empty() {
        return Err(BoardError::MissingConfigError {
            field: "output_formats".to_string(),
        });
    }

    let view = config.map_view();
    let (lat_min, lat_max) = LATITUDE_BOUNDS;
    let (lon_min, lon_max) = LONGITUDE_BOUNDS;
    validation::validate_range("map.center.latitude", view.center[0], lat_min, lat_max)?;
    validation::validate_range("map.center.longitude", view.center[1], lon_min, lon_max)?;
    validation::validate_range("map.zoom", view.zoom, 0, 19)?;
    validation::validate_tile_template("map.tile_url", &view.tile_url)?;

    Ok(())
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
