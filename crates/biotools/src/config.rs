//! Configuration management
//!
//! Remote endpoints and fan-out limits are read from the environment (and a
//! `.env` file, if present) with the defaults below.

use biotools_common::{BioToolsError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Remote Service Constants
// ============================================================================

/// mygene.info API root
pub const DEFAULT_MYGENE_URL: &str = "http://mygene.info/v3";

/// EBI Proteins API, one UniProt entry per path segment
pub const DEFAULT_UNIPROT_URL: &str = "https://www.ebi.ac.uk/proteins/api/proteins";

/// PDBe best structures for a UniProt accession
pub const DEFAULT_PDBE_URL: &str = "https://www.ebi.ac.uk/pdbe/api/mappings/best_structures";

/// Default per-request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Resolver / Fetcher Constants
// ============================================================================

/// Homo sapiens
pub const DEFAULT_TAXID: u32 = 9606;

/// Default number of resolution passes.
pub const DEFAULT_RESOLVE_CYCLES: u32 = 2;

/// Default pause between resolution passes in seconds.
pub const DEFAULT_RESOLVE_COOLDOWN_SECS: u64 = 5;

/// Default cap on concurrent gene queries.
pub const DEFAULT_RESOLVE_MAX_CONCURRENT: usize = 32;

/// Default cap on concurrent protein fetches.
pub const DEFAULT_FETCH_MAX_CONCURRENT: usize = 10;

/// Full runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoints: EndpointConfig,
    pub resolver: ResolverSettings,
    pub fetcher: FetcherSettings,
}

/// Remote service locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub mygene_url: String,
    pub uniprot_url: String,
    pub pdbe_url: String,
    pub timeout_secs: u64,
}

/// Gene symbol resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    pub taxid: u32,
    pub cycles: u32,
    pub cooldown_secs: u64,
    pub max_concurrent: usize,
}

/// Protein annotation fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherSettings {
    pub max_concurrent: usize,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ResolverSettings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            endpoints: EndpointConfig {
                mygene_url: env_or("BIOTOOLS_MYGENE_URL", DEFAULT_MYGENE_URL),
                uniprot_url: env_or("BIOTOOLS_UNIPROT_URL", DEFAULT_UNIPROT_URL),
                pdbe_url: env_or("BIOTOOLS_PDBE_URL", DEFAULT_PDBE_URL),
                timeout_secs: env_parse("BIOTOOLS_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            },
            resolver: ResolverSettings {
                taxid: env_parse("BIOTOOLS_TAXID", DEFAULT_TAXID)?,
                cycles: env_parse("BIOTOOLS_RESOLVE_CYCLES", DEFAULT_RESOLVE_CYCLES)?,
                cooldown_secs: env_parse(
                    "BIOTOOLS_RESOLVE_COOLDOWN_SECS",
                    DEFAULT_RESOLVE_COOLDOWN_SECS,
                )?,
                max_concurrent: env_parse(
                    "BIOTOOLS_RESOLVE_MAX_CONCURRENT",
                    DEFAULT_RESOLVE_MAX_CONCURRENT,
                )?,
            },
            fetcher: FetcherSettings {
                max_concurrent: env_parse(
                    "BIOTOOLS_FETCH_MAX_CONCURRENT",
                    DEFAULT_FETCH_MAX_CONCURRENT,
                )?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("mygene", &self.endpoints.mygene_url),
            ("uniprot", &self.endpoints.uniprot_url),
            ("pdbe", &self.endpoints.pdbe_url),
        ] {
            if url.trim().is_empty() {
                return Err(BioToolsError::config(format!("{} URL cannot be empty", name)));
            }
        }

        if self.endpoints.timeout_secs == 0 {
            return Err(BioToolsError::config("HTTP timeout must be greater than 0"));
        }

        if self.resolver.cycles < 1 {
            return Err(BioToolsError::config("Number of cycles must be at least 1"));
        }

        if self.resolver.max_concurrent == 0 || self.fetcher.max_concurrent == 0 {
            return Err(BioToolsError::config(
                "Concurrency limits must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig {
                mygene_url: DEFAULT_MYGENE_URL.to_string(),
                uniprot_url: DEFAULT_UNIPROT_URL.to_string(),
                pdbe_url: DEFAULT_PDBE_URL.to_string(),
                timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            },
            resolver: ResolverSettings {
                taxid: DEFAULT_TAXID,
                cycles: DEFAULT_RESOLVE_CYCLES,
                cooldown_secs: DEFAULT_RESOLVE_COOLDOWN_SECS,
                max_concurrent: DEFAULT_RESOLVE_MAX_CONCURRENT,
            },
            fetcher: FetcherSettings {
                max_concurrent: DEFAULT_FETCH_MAX_CONCURRENT,
            },
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Unset variables fall back to `default`; set but unparsable ones are errors.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BioToolsError::config(format!("{} has an invalid value '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver.cooldown(), Duration::from_secs(5));
        assert_eq!(config.endpoints.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_cycles_rejected() {
        let mut config = Config::default();
        config.resolver.cycles = 0;
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = Config::default();
        config.fetcher.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_url_rejected() {
        let mut config = Config::default();
        config.endpoints.pdbe_url = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pdbe URL"));
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("BIOTOOLS_TEST_ENV_PARSE", "ten");
        let result: Result<u32> = env_parse("BIOTOOLS_TEST_ENV_PARSE", 1);
        assert!(result.unwrap_err().is_config());
        std::env::remove_var("BIOTOOLS_TEST_ENV_PARSE");

        let fallback: u32 = env_parse("BIOTOOLS_TEST_ENV_UNSET", 7).unwrap();
        assert_eq!(fallback, 7);
    }
}
