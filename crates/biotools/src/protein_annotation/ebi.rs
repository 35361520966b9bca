//! EBI Proteins API and PDBe client

use async_trait::async_trait;
use biotools_common::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::trace;

use super::{FetchFailure, ProteinSource};
use crate::config::EndpointConfig;
use crate::http::{build_client, join_url};

/// Fetches `GET {uniprot_url}/{id}` and `GET {pdbe_url}/{id}`
#[derive(Debug, Clone)]
pub struct EbiProteinClient {
    client: Client,
    uniprot_url: String,
    pdbe_url: String,
}

impl EbiProteinClient {
    pub fn new(
        uniprot_url: impl Into<String>,
        pdbe_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            uniprot_url: uniprot_url.into(),
            pdbe_url: pdbe_url.into(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        Self::new(
            config.uniprot_url.clone(),
            config.pdbe_url.clone(),
            config.timeout(),
        )
    }

    async fn get_text(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        trace!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))
    }
}

#[async_trait]
impl ProteinSource for EbiProteinClient {
    async fn fetch_entry(&self, uniprot_id: &str) -> std::result::Result<String, FetchFailure> {
        self.get_text(&join_url(&self.uniprot_url, uniprot_id)).await
    }

    async fn fetch_structures(
        &self,
        uniprot_id: &str,
    ) -> std::result::Result<String, FetchFailure> {
        self.get_text(&join_url(&self.pdbe_url, uniprot_id)).await
    }
}
