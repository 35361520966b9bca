//! mygene.info gene query client

use async_trait::async_trait;
use biotools_common::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{GeneLookup, LookupFailure};
use crate::config::EndpointConfig;
use crate::http::{build_client, join_url};

/// Resolves gene symbols through `GET {base}/query`
#[derive(Debug, Clone)]
pub struct MyGeneClient {
    client: Client,
    base_url: String,
}

impl MyGeneClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout)?, base_url))
    }

    /// Reuse an existing client (and its connection pool)
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        Self::new(config.mygene_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GeneLookup for MyGeneClient {
    async fn lookup(&self, symbol: &str, taxid: u32) -> std::result::Result<String, LookupFailure> {
        let url = join_url(&self.base_url, "query");
        let taxid = taxid.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", symbol),
                ("species_facet_filter", taxid.as_str()),
                ("fields", "uniprot"),
                ("species", taxid.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::Status(status.as_u16()));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| LookupFailure::Malformed(e.to_string()))?;

        body.first_accession().ok_or(LookupFailure::NotFound)
    }
}

/// The subset of a mygene query response that is read
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    uniprot: Option<UniProtXrefs>,
}

#[derive(Debug, Deserialize)]
struct UniProtXrefs {
    #[serde(rename = "Swiss-Prot")]
    swiss_prot: Option<OneOrMany>,
    #[serde(rename = "TrEMBL")]
    trembl: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn first(&self) -> Option<&str> {
        let first = match self {
            OneOrMany::One(value) => Some(value.as_str()),
            OneOrMany::Many(values) => values.first().map(String::as_str),
        };
        first.filter(|value| !value.is_empty())
    }
}

impl QueryResponse {
    /// Swiss-Prot accession of the top hit, else its first TrEMBL accession
    fn first_accession(&self) -> Option<String> {
        let xrefs = self.hits.first()?.uniprot.as_ref()?;
        xrefs
            .swiss_prot
            .as_ref()
            .and_then(OneOrMany::first)
            .or_else(|| xrefs.trembl.as_ref().and_then(OneOrMany::first))
            .map(str::to_string)
    }
}
