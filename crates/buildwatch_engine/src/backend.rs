use buildwatch_core::BuildId;
use reqwest::Url;

use crate::http;
use crate::wire::{SelectionPayload, WireSelection};
use crate::{EngineConfig, FetchError};

// Selection documents are tiny; anything bigger is not one.
const MAX_SELECTION_BYTES: u64 = 1024 * 1024;

/// Remote store of the selection, read once at startup and overwritten wholesale.
#[async_trait::async_trait]
pub trait SelectionBackend: Send + Sync {
    async fn load(&self) -> Result<Vec<BuildId>, FetchError>;
    async fn save(&self, ids: &[BuildId]) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpSelectionBackend {
    client: reqwest::Client,
    read_url: Url,
    write_url: Url,
}

impl HttpSelectionBackend {
    pub fn new(config: &EngineConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: http::build_client(config)?,
            read_url: config.endpoint(&config.selection_read_path)?,
            write_url: config.endpoint(&config.selection_write_path)?,
        })
    }
}

#[async_trait::async_trait]
impl SelectionBackend for HttpSelectionBackend {
    async fn load(&self) -> Result<Vec<BuildId>, FetchError> {
        let response = http::get(&self.client, &self.read_url).await?;
        let bytes = http::read_limited(response, MAX_SELECTION_BYTES).await?;
        let wire: WireSelection = http::decode(&bytes)?;
        Ok(wire.into_ids())
    }

    async fn save(&self, ids: &[BuildId]) -> Result<(), FetchError> {
        let response = self
            .client
            .post(self.write_url.clone())
            .json(&SelectionPayload { selected_builds: ids })
            .send()
            .await
            .map_err(http::map_reqwest_error)?;
        http::ensure_success(response)?;
        Ok(())
    }
}
