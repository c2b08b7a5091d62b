use crate::core::{Vehicle, VehicleSource};
use crate::utils::error::{BoardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_VEHICLES_ENDPOINT: &str = "https://test.tspb.su/test-task/vehicles";

/// Reads the vehicle list with a plain GET against a JSON endpoint.
pub struct HttpVehicleSource {
    client: Client,
    endpoint: String,
}

impl HttpVehicleSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl VehicleSource for HttpVehicleSource {
    async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>> {
        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(BoardError::UpstreamStatusError {
                status: status.as_u16(),
            });
        }

        // 先取原始內容，解析失敗時才能回報 JSON 錯誤
        let body = response.bytes().await?;
        let vehicles: Vec<Vehicle> = serde_json::from_slice(&body)?;
        Ok(vehicles)
    }
}
