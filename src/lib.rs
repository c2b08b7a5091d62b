pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, CliConfig};
pub use self::core::{
    board::VehicleBoard, engine::BoardEngine, pipeline::BoardPipeline,
    source::HttpVehicleSource,
};
pub use domain::model::{BoardCommand, MapView, OutputFormat, SortField, Vehicle, VehiclePatch};
pub use utils::error::{BoardError, Result};
