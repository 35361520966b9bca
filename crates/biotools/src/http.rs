//! Shared HTTP client construction

use biotools_common::{BioToolsError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

const CLIENT_USER_AGENT: &str = concat!("biotools/", env!("CARGO_PKG_VERSION"));

/// Build a JSON client with the given per-request timeout.
///
/// One client is shared by every request of a batch so that connections
/// are pooled.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| BioToolsError::network(format!("Failed to build HTTP client: {}", e)))
}

/// Join a base URL and one path segment without doubling slashes
pub fn join_url(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment.trim_start_matches('/'))
}
