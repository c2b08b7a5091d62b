use crate::domain::model::{BoardCommand, MapView, OutputFormat, SortField, Vehicle};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where the vehicle list comes from.
#[async_trait]
pub trait VehicleSource: Send + Sync {
    async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
    fn commands(&self) -> &[BoardCommand];
    fn output_formats(&self) -> &[OutputFormat];
    fn bundle(&self) -> bool;
    fn map_view(&self) -> MapView;
}

/// Rendered board, ready to be written out.
#[derive(Debug, Clone)]
pub struct RenderedBoard {
    pub vehicles: Vec<Vehicle>,
    pub sorted_by: Option<SortField>,
    pub files: Vec<RenderedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Vehicle>>;
    async fn transform(&self, vehicles: Vec<Vehicle>) -> Result<RenderedBoard>;
    async fn load(&self, board: RenderedBoard) -> Result<String>;
}
