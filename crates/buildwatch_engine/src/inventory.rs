use buildwatch_core::BuildRecord;
use reqwest::Url;
use watch_logging::watch_debug;

use crate::http;
use crate::wire::WireInventory;
use crate::{EngineConfig, FailureKind, FetchError};

/// Where the build list comes from.
#[async_trait::async_trait]
pub trait InventorySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<BuildRecord>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpInventorySource {
    client: reqwest::Client,
    url: Url,
    max_bytes: u64,
}

impl HttpInventorySource {
    pub fn new(config: &EngineConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: http::build_client(config)?,
            url: config.endpoint(&config.inventory_path)?,
            max_bytes: config.max_inventory_bytes,
        })
    }
}

#[async_trait::async_trait]
impl InventorySource for HttpInventorySource {
    async fn fetch(&self) -> Result<Vec<BuildRecord>, FetchError> {
        let response = http::get(&self.client, &self.url).await?;
        let bytes = http::read_limited(response, self.max_bytes).await?;
        let wire: WireInventory = http::decode(&bytes)?;
        let records = wire
            .into_records()
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        watch_debug!("Fetched {} builds from {}", records.len(), self.url);
        Ok(records)
    }
}
