//! Gene symbol to UniProt accession resolution
//!
//! Every symbol is looked up independently. A pass fans the lookups out
//! (at most `max_concurrent` in flight) and joins them; symbols that did not
//! resolve are retried in the next pass after a fixed cooldown. Passes stop
//! once nothing is left to resolve or `cycles` passes have run.
//!
//! # Example
//!
//! ```no_run
//! use biotools::gene2uniprot::{ConcurrentResolver, MyGeneClient, ResolverConfig};
//! use std::time::Duration;
//!
//! # async fn run() -> biotools_common::Result<()> {
//! let client = MyGeneClient::new("http://mygene.info/v3", Duration::from_secs(30))?;
//! let resolver = ConcurrentResolver::new(client, ResolverConfig::default())?;
//!
//! let resolution = resolver.resolve(&["TP53", "MDM2", "NOTAGENE"]).await;
//! println!("{:?} / {:?}", resolution.resolved, resolution.unresolved);
//! # Ok(())
//! # }
//! ```

pub mod mygene;

use async_trait::async_trait;
use biotools_common::{BioToolsError, Result};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{
    Config, ResolverSettings, DEFAULT_RESOLVE_COOLDOWN_SECS, DEFAULT_RESOLVE_CYCLES,
    DEFAULT_RESOLVE_MAX_CONCURRENT, DEFAULT_TAXID,
};

pub use mygene::MyGeneClient;

/// Why a single lookup did not produce an accession.
///
/// The resolver reports all of these as "unresolved"; the cause is only
/// logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The service answered but had no accession for the symbol
    NotFound,
    Status(u16),
    Transport(String),
    Malformed(String),
}

impl std::fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupFailure::NotFound => write!(f, "no UniProt accession found"),
            LookupFailure::Status(code) => write!(f, "service returned status {}", code),
            LookupFailure::Transport(e) => write!(f, "request failed: {}", e),
            LookupFailure::Malformed(e) => write!(f, "malformed response: {}", e),
        }
    }
}

/// A remote service mapping a gene symbol to a UniProt accession
#[async_trait]
pub trait GeneLookup: Send + Sync {
    async fn lookup(&self, symbol: &str, taxid: u32) -> std::result::Result<String, LookupFailure>;
}

/// Resolver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Species context for every lookup
    pub taxid: u32,
    /// Number of passes, at least 1
    pub cycles: u32,
    /// Pause before each pass after the first
    pub cooldown: Duration,
    /// In-flight lookups per pass
    pub max_concurrent: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            taxid: DEFAULT_TAXID,
            cycles: DEFAULT_RESOLVE_CYCLES,
            cooldown: Duration::from_secs(DEFAULT_RESOLVE_COOLDOWN_SECS),
            max_concurrent: DEFAULT_RESOLVE_MAX_CONCURRENT,
        }
    }
}

impl From<&ResolverSettings> for ResolverConfig {
    fn from(settings: &ResolverSettings) -> Self {
        Self {
            taxid: settings.taxid,
            cycles: settings.cycles,
            cooldown: settings.cooldown(),
            max_concurrent: settings.max_concurrent,
        }
    }
}

impl ResolverConfig {
    pub fn with_taxid(mut self, taxid: u32) -> Self {
        self.taxid = taxid;
        self
    }

    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycles < 1 {
            return Err(BioToolsError::config("Number of cycles must be at least 1"));
        }
        if self.max_concurrent == 0 {
            return Err(BioToolsError::config(
                "max_concurrent must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Outcome of a resolution run.
///
/// Every distinct input symbol is in exactly one of the two fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Symbol -> UniProt accession
    pub resolved: BTreeMap<String, String>,
    /// Symbols left unresolved after the last pass, in input order
    pub unresolved: Vec<String>,
}

/// Retrying, bounded fan-out resolver over a [`GeneLookup`]
pub struct ConcurrentResolver<L> {
    lookup: L,
    config: ResolverConfig,
}

impl<L: GeneLookup> ConcurrentResolver<L> {
    /// Fails with a configuration error if `config` is invalid
    pub fn new(lookup: L, config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { lookup, config })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `symbols`; duplicates are looked up once.
    ///
    /// Individual lookup failures never fail the run. Symbols are trimmed;
    /// a blank symbol is never sent and is reported once as `""` in
    /// `unresolved`, so every distinct input lands in exactly one field.
    pub async fn resolve<S: AsRef<str>>(&self, symbols: &[S]) -> Resolution {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_string();
            let next = first_seen.len();
            first_seen.entry(symbol).or_insert(next);
        }

        let mut distinct: Vec<(&String, &usize)> = first_seen.iter().collect();
        distinct.sort_by_key(|(_, position)| **position);
        let mut pending: Vec<String> = distinct
            .into_iter()
            .map(|(symbol, _)| symbol.clone())
            .filter(|symbol| !symbol.is_empty())
            .collect();

        let mut resolution = Resolution::default();

        for pass in 1..=self.config.cycles {
            if pending.is_empty() {
                break;
            }
            if pass > 1 {
                debug!(
                    pass,
                    cooldown_ms = self.config.cooldown.as_millis() as u64,
                    "Cooling down before retry"
                );
                tokio::time::sleep(self.config.cooldown).await;
            }

            let (resolved, unresolved) = self.run_pass(&pending).await;
            info!(
                pass,
                requested = pending.len(),
                resolved = resolved.len(),
                unresolved = unresolved.len(),
                "Resolution pass finished"
            );

            resolution.resolved.extend(resolved);
            pending = unresolved;
        }

        if first_seen.contains_key("") {
            debug!("Blank gene symbol reported as unresolved");
            pending.push(String::new());
            pending.sort_by_key(|symbol| first_seen.get(symbol).copied());
        }
        resolution.unresolved = pending;

        info!(
            "{} genes successfully converted to UniProt IDs",
            resolution.resolved.len()
        );
        info!("{} genes not converted", resolution.unresolved.len());

        resolution
    }

    /// One fan-out/fan-in round. Results are matched back to their symbol
    /// by index, so completion order does not matter.
    async fn run_pass(&self, pending: &[String]) -> (Vec<(String, String)>, Vec<String>) {
        let lookup = &self.lookup;
        let taxid = self.config.taxid;

        let mut outcomes: Vec<(usize, std::result::Result<String, LookupFailure>)> =
            stream::iter(pending.iter().enumerate())
                .map(|(index, symbol)| async move {
                    (index, lookup.lookup(symbol, taxid).await)
                })
                .buffer_unordered(self.config.max_concurrent)
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for (index, outcome) in outcomes {
            let symbol = &pending[index];
            match outcome {
                Ok(accession) => {
                    debug!(gene = %symbol, uniprot_id = %accession, "Resolved");
                    resolved.push((symbol.clone(), accession));
                },
                Err(failure) => {
                    debug!(gene = %symbol, cause = %failure, "Unresolved");
                    unresolved.push(symbol.clone());
                },
            }
        }

        (resolved, unresolved)
    }
}

/// Resolve gene symbols against mygene.info using the environment's
/// endpoint and the given species and pass count.
pub async fn gene2uniprot<S: AsRef<str>>(
    symbols: &[S],
    taxid: u32,
    cycles: u32,
) -> Result<Resolution> {
    let config = Config::load()?;
    let resolver_config = ResolverConfig::from(&config.resolver)
        .with_taxid(taxid)
        .with_cycles(cycles);

    let resolver = ConcurrentResolver::new(
        MyGeneClient::from_config(&config.endpoints)?,
        resolver_config,
    )?;
    Ok(resolver.resolve(symbols).await)
}
