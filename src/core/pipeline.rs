use crate::core::board::VehicleBoard;
use crate::core::render::render_all;
use crate::core::source::HttpVehicleSource;
use crate::core::{ConfigProvider, Pipeline, RenderedBoard, Storage, Vehicle, VehicleSource};
use crate::utils::error::Result;
use chrono::Utc;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const BUNDLE_FILE_NAME: &str = "vehicle_board.zip";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Fetches the vehicle list, replays the configured board commands and writes the renderings.
pub struct BoardPipeline<S: Storage, C: ConfigProvider, V: VehicleSource = HttpVehicleSource> {
    storage: S,
    config: C,
    source: V,
}

impl<S: Storage, C: ConfigProvider> BoardPipeline<S, C, HttpVehicleSource> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let source =
            HttpVehicleSource::with_timeout(config.api_endpoint(), config.timeout_seconds())?;
        Ok(Self::with_source(storage, config, source))
    }
}

impl<S: Storage, C: ConfigProvider, V: VehicleSource> BoardPipeline<S, C, V> {
    pub fn with_source(storage: S, config: C, source: V) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }

    fn bundle(&self, board: &RenderedBoard) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for file in &board.files {
            zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
            zip.write_all(&file.contents)?;
        }

        let manifest = serde_json::json!({
            "generated_at": Utc::now().to_rfc3339(),
            "source": self.config.api_endpoint(),
            "vehicle_count": board.vehicles.len(),
            "sorted_by": board.sorted_by,
            "files": board.files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        });
        zip.start_file::<_, ()>(MANIFEST_FILE_NAME, FileOptions::default())?;
        zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, V: VehicleSource> Pipeline for BoardPipeline<S, C, V> {
    async fn extract(&self) -> Result<Vec<Vehicle>> {
        // 抓取失敗只記錄，畫面照樣以空清單呈現
        let board = VehicleBoard::load(&self.source).await;
        Ok(board.into_vehicles())
    }

    async fn transform(&self, vehicles: Vec<Vehicle>) -> Result<RenderedBoard> {
        let mut board = VehicleBoard::new(vehicles);
        board.apply_all(self.config.commands());

        let files = render_all(
            board.vehicles(),
            self.config.output_formats(),
            &self.config.map_view(),
        )?;

        Ok(RenderedBoard {
            sorted_by: board.sorted_by(),
            vehicles: board.into_vehicles(),
            files,
        })
    }

    async fn load(&self, board: RenderedBoard) -> Result<String> {
        let output_dir = self.config.output_path().trim_end_matches('/');

        if self.config.bundle() {
            let data = self.bundle(&board)?;
            tracing::debug!("Writing bundle ({} bytes) to storage", data.len());
            self.storage.write_file(BUNDLE_FILE_NAME, &data).await?;
            return Ok(format!("{}/{}", output_dir, BUNDLE_FILE_NAME));
        }

        for file in &board.files {
            tracing::debug!("Writing {} ({} bytes)", file.name, file.contents.len());
            self.storage.write_file(&file.name, &file.contents).await?;
        }
        Ok(output_dir.to_string())
    }
}
