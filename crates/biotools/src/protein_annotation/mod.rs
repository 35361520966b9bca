//! Protein annotation fetching
//!
//! For every UniProt accession two lookups run back to back: the primary
//! Proteins API entry, then the PDBe structure mapping. At most
//! `max_concurrent` accessions are in flight at once, so no more than that
//! many requests are outstanding.
//!
//! Failures are bucketed per [`FailureCategory`]; an accession may land in
//! several buckets (e.g. no GO terms *and* no structures). Only a failed
//! or empty primary lookup, or an undecodable entry, drops the accession
//! from [`FetchReport::records`].

pub mod ebi;
pub mod models;

use async_trait::async_trait;
use biotools_common::{BioToolsError, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::config::Config;

pub use ebi::EbiProteinClient;
pub use models::{is_empty_entry, parse_entry, parse_structures, FailureCategory, ProteinRecord};

/// Why a remote request produced no body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Status(u16),
    Transport(String),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Status(code) => write!(f, "status {}", code),
            FetchFailure::Transport(e) => write!(f, "request failed: {}", e),
        }
    }
}

/// Remote source of protein entries and structure mappings.
///
/// Both methods return the raw response body; decoding happens in the
/// fetcher so that undecodable bodies can be told apart from failed
/// requests.
#[async_trait]
pub trait ProteinSource: Send + Sync {
    async fn fetch_entry(&self, uniprot_id: &str) -> std::result::Result<String, FetchFailure>;

    async fn fetch_structures(
        &self,
        uniprot_id: &str,
    ) -> std::result::Result<String, FetchFailure>;
}

/// Records plus failure buckets for one fetch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    /// Successfully decoded entries, in input order
    pub records: Vec<ProteinRecord>,
    /// Every category is present, possibly with an empty list
    pub failures: BTreeMap<FailureCategory, Vec<String>>,
}

impl Default for FetchReport {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            failures: FailureCategory::ALL
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
        }
    }
}

impl FetchReport {
    /// Accessions that fell into `category`
    pub fn failed(&self, category: FailureCategory) -> &[String] {
        self.failures
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn record(&self, uniprot_id: &str) -> Option<&ProteinRecord> {
        self.records
            .iter()
            .find(|record| record.uniprot_id == uniprot_id)
    }

    fn absorb(&mut self, outcome: ProteinOutcome) {
        for category in outcome.failures {
            self.failures
                .entry(category)
                .or_default()
                .push(outcome.uniprot_id.clone());
        }
        if let Some(record) = outcome.record {
            self.records.push(record);
        }
    }
}

/// What a single unit of work produced; merged after the fan-in
#[derive(Debug)]
struct ProteinOutcome {
    index: usize,
    uniprot_id: String,
    record: Option<ProteinRecord>,
    failures: Vec<FailureCategory>,
}

/// Bounded-concurrency two-stage annotation fetcher
pub struct AnnotationFetcher<S> {
    source: S,
    max_concurrent: usize,
    show_progress: bool,
}

impl<S: ProteinSource> AnnotationFetcher<S> {
    /// Fails with a configuration error if `max_concurrent` is 0
    pub fn new(source: S, max_concurrent: usize) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(BioToolsError::config(
                "max_concurrent must be greater than 0",
            ));
        }
        Ok(Self {
            source,
            max_concurrent,
            show_progress: false,
        })
    }

    /// Draw a progress bar on stderr while fetching
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetch every distinct accession in `uniprot_ids`
    pub async fn fetch<I: AsRef<str>>(&self, uniprot_ids: &[I]) -> FetchReport {
        let mut seen = HashSet::new();
        let ids: Vec<String> = uniprot_ids
            .iter()
            .map(|id| id.as_ref().trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();

        let progress = self.progress_bar(ids.len() as u64);

        let mut outcomes: Vec<ProteinOutcome> = stream::iter(ids.iter().enumerate())
            .map(|(index, id)| self.fetch_one(index, id))
            .buffer_unordered(self.max_concurrent)
            .inspect(|_| progress.inc(1))
            .collect()
            .await;
        progress.finish_and_clear();

        outcomes.sort_by_key(|outcome| outcome.index);

        let mut report = FetchReport::default();
        for outcome in outcomes {
            report.absorb(outcome);
        }

        info!(
            "{} UniProt IDs were successfully processed",
            report.records.len()
        );
        info!(
            "{} UniProt IDs not found",
            report.failed(FailureCategory::UniProtId).len()
        );

        report
    }

    async fn fetch_one(&self, index: usize, uniprot_id: &str) -> ProteinOutcome {
        let mut outcome = ProteinOutcome {
            index,
            uniprot_id: uniprot_id.to_string(),
            record: None,
            failures: Vec::new(),
        };

        let body = match self.source.fetch_entry(uniprot_id).await {
            Ok(body) => body,
            Err(failure) => {
                debug!(uniprot_id = %uniprot_id, cause = %failure, "Entry lookup failed");
                outcome.failures.push(FailureCategory::UniProtId);
                return outcome;
            },
        };

        if is_empty_entry(&body) {
            debug!(uniprot_id = %uniprot_id, "Entry lookup returned an empty body");
            outcome.failures.push(FailureCategory::UniProtId);
            return outcome;
        }

        let mut record = match parse_entry(uniprot_id, &body) {
            Ok(record) => record,
            Err(e) => {
                debug!(uniprot_id = %uniprot_id, error = %e, "Entry could not be decoded");
                outcome.failures.push(FailureCategory::ParseError);
                return outcome;
            },
        };
        outcome.failures.extend(record.missing_fields());

        match self.source.fetch_structures(uniprot_id).await {
            Ok(body) => match parse_structures(uniprot_id, &body) {
                Ok(pdb) => record.pdb = pdb,
                Err(e) => {
                    debug!(uniprot_id = %uniprot_id, error = %e, "Structure mapping could not be decoded");
                    outcome.failures.push(FailureCategory::Pdb);
                },
            },
            Err(failure) => {
                debug!(uniprot_id = %uniprot_id, cause = %failure, "Structure lookup failed");
                outcome.failures.push(FailureCategory::Pdb);
            },
        }

        outcome.record = Some(record);
        outcome
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} proteins ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message("Fetching protein data");
        bar
    }
}

/// Fetch annotations for `uniprot_ids` from the EBI services configured in
/// the environment.
pub async fn get_proteins_info<I: AsRef<str>>(
    uniprot_ids: &[I],
    max_concurrent: usize,
) -> Result<FetchReport> {
    let config = Config::load()?;
    let fetcher = AnnotationFetcher::new(
        EbiProteinClient::from_config(&config.endpoints)?,
        max_concurrent,
    )?;
    Ok(fetcher.fetch(uniprot_ids).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct StubSource {
        entries: HashMap<String, String>,
        structures: HashMap<String, String>,
        structure_calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubSource {
        fn entry(mut self, id: &str, body: serde_json::Value) -> Self {
            self.entries.insert(id.to_string(), body.to_string());
            self
        }

        fn raw_entry(mut self, id: &str, body: &str) -> Self {
            self.entries.insert(id.to_string(), body.to_string());
            self
        }

        fn structures(mut self, id: &str, pdb_ids: &[&str]) -> Self {
            let entries: Vec<_> = pdb_ids.iter().map(|p| json!({"pdb_id": p})).collect();
            self.structures
                .insert(id.to_string(), json!({ id: entries }).to_string());
            self
        }

        async fn hold(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ProteinSource for StubSource {
        async fn fetch_entry(&self, id: &str) -> std::result::Result<String, FetchFailure> {
            self.hold().await;
            self.entries.get(id).cloned().ok_or(FetchFailure::Status(404))
        }

        async fn fetch_structures(&self, id: &str) -> std::result::Result<String, FetchFailure> {
            self.structure_calls.lock().unwrap().push(id.to_string());
            self.hold().await;
            self.structures.get(id).cloned().ok_or(FetchFailure::Status(404))
        }
    }

    fn full_entry(gene: &str) -> serde_json::Value {
        json!({
            "gene": [{"name": {"value": gene}}],
            "organism": {"taxonomy": 9606},
            "comments": [{"type": "FUNCTION", "text": [{"value": "Does things."}]}],
            "dbReferences": [{"type": "GO", "id": "GO:0005634", "properties": {"term": "C:nucleus"}}],
            "sequence": {"sequence": "MEEP"}
        })
    }

    #[tokio::test]
    async fn test_failed_entry_skips_structure_lookup() {
        let source = StubSource::default();
        let fetcher = AnnotationFetcher::new(source, 4).unwrap();

        let report = fetcher.fetch(&["P99999"]).await;

        assert!(report.records.is_empty());
        assert_eq!(report.failed(FailureCategory::UniProtId), ["P99999"]);
        assert!(fetcher.source.structure_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_structure_lookup_keeps_record() {
        let source = StubSource::default().entry("P04637", full_entry("TP53"));
        let fetcher = AnnotationFetcher::new(source, 4).unwrap();

        let report = fetcher.fetch(&["P04637"]).await;

        let record = report.record("P04637").unwrap();
        assert!(record.pdb.is_empty());
        assert_eq!(report.failed(FailureCategory::Pdb), ["P04637"]);
        assert!(report.failed(FailureCategory::UniProtId).is_empty());
    }

    #[tokio::test]
    async fn test_field_gaps_land_in_their_own_buckets() {
        let source = StubSource::default()
            .entry("Q00987", json!({"gene": [{"name": {"value": "MDM2"}}], "organism": {"taxonomy": 9606}}))
            .structures("Q00987", &["1ycr", "1ycr", "4hg7"]);
        let fetcher = AnnotationFetcher::new(source, 4).unwrap();

        let report = fetcher.fetch(&["Q00987"]).await;

        let record = report.record("Q00987").unwrap();
        assert_eq!(record.pdb, vec!["1ycr", "4hg7"]);
        assert_eq!(report.failed(FailureCategory::Annotation), ["Q00987"]);
        assert_eq!(report.failed(FailureCategory::GoTerms), ["Q00987"]);
        assert_eq!(report.failed(FailureCategory::Sequence), ["Q00987"]);
        assert!(report.failed(FailureCategory::Gene).is_empty());
        assert!(report.failed(FailureCategory::Pdb).is_empty());
    }

    #[tokio::test]
    async fn test_empty_entry_counts_as_not_found() {
        let source = StubSource::default()
            .raw_entry("A0A000", "{}")
            .structures("A0A000", &["1abc"]);
        let fetcher = AnnotationFetcher::new(source, 4).unwrap();

        let report = fetcher.fetch(&["A0A000"]).await;

        assert!(report.records.is_empty());
        assert_eq!(report.failed(FailureCategory::UniProtId), ["A0A000"]);
        assert!(report.failed(FailureCategory::Gene).is_empty());
        assert!(fetcher.source.structure_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_parse_error() {
        let source = StubSource::default().raw_entry("P38398", "<html>oops</html>");
        let fetcher = AnnotationFetcher::new(source, 4).unwrap();

        let report = fetcher.fetch(&["P38398"]).await;

        assert!(report.records.is_empty());
        assert_eq!(report.failed(FailureCategory::ParseError), ["P38398"]);
        assert!(report.failed(FailureCategory::UniProtId).is_empty());
    }

    #[tokio::test]
    async fn test_records_keep_input_order_and_concurrency_is_bounded() {
        let ids: Vec<String> = (0..12).map(|i| format!("P{:05}", i)).collect();
        let mut source = StubSource::default();
        for id in &ids {
            source = source.entry(id, full_entry("GENE")).structures(id, &["1abc"]);
        }
        let fetcher = AnnotationFetcher::new(source, 3).unwrap();

        let report = fetcher.fetch(&ids).await;

        let order: Vec<&str> = report.records.iter().map(|r| r.uniprot_id.as_str()).collect();
        assert_eq!(order, ids.iter().map(String::as_str).collect::<Vec<_>>());
        let peak = fetcher.source.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight was {}", peak);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = AnnotationFetcher::new(StubSource::default(), 0).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_default_report_lists_every_category() {
        let report = FetchReport::default();
        assert_eq!(report.failures.len(), FailureCategory::ALL.len());
        assert!(report.failed(FailureCategory::Sequence).is_empty());
    }
}
