use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct BoardEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BoardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting vehicle board run");

        // Fetch
        let vehicles = self.pipeline.extract().await?;
        tracing::info!("Loaded {} vehicles", vehicles.len());

        // Apply commands and render
        let board = self.pipeline.transform(vehicles).await?;
        tracing::info!(
            "Rendered {} vehicles into {} file(s)",
            board.vehicles.len(),
            board.files.len()
        );

        // Write
        let output_path = self.pipeline.load(board).await?;
        tracing::info!(
            "Output saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
