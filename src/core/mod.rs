pub mod board;
pub mod engine;
pub mod pipeline;
pub mod render;
pub mod source;

pub use crate::domain::model::{
    BoardCommand, MapView, OutputFormat, SortField, Vehicle, VehiclePatch,
};
pub use crate::domain::ports::{
    ConfigProvider, Pipeline, RenderedBoard, RenderedFile, Storage, VehicleSource,
};
pub use crate::utils::error::Result;
