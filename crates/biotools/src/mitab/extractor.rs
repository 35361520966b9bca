//! Typed field extraction from MITAB tables
//!
//! Three extraction kinds are supported, each reading a fixed set of
//! columns for interactor A and interactor B:
//!
//! | Kind | Columns |
//! |------|---------|
//! | [`ExtractionKind::ProteinId`] | `#ID(s) interactor A`, `ID(s) interactor B`, `Alias(es) interactor A/B` |
//! | [`ExtractionKind::Taxid`] | `Taxid interactor A/B` |
//! | [`ExtractionKind::Publications`] | `Publication Identifier(s)` |
//!
//! A field with no acceptable entry is `None`; extraction never fails on
//! cell content.

use biotools_common::{BioToolsError, Result};
use regex::Regex;
use serde::Serialize;
use indexmap::IndexMap;
use std::str::FromStr;
use tracing::{debug, warn};

use super::column;
use super::compound::{parse_entries, CompoundEntry};
use super::table::RecordTable;

/// Only this database contributes UniProt accessions
pub const UNIPROT_DATABASE: &str = "uniprotkb";

/// Databases searched for gene symbols, highest priority first
pub const GENE_DATABASE_PRIORITY: [&str; 3] = ["uniprotkb", "psi-mi", "entrez gene/locuslink"];

pub const TAXID_DATABASE: &str = "taxid";

/// Publication source tag -> identifiers, tags in first-seen order,
/// repeated tags accumulate
pub type PublicationMap = IndexMap<String, Vec<String>>;

/// What to extract from a MITAB table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionKind {
    /// UniProt accessions and gene symbols
    ProteinId,
    Taxid,
    Publications,
}

impl ExtractionKind {
    pub const ALL: [ExtractionKind; 3] = [
        ExtractionKind::ProteinId,
        ExtractionKind::Taxid,
        ExtractionKind::Publications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionKind::ProteinId => "protein_id",
            ExtractionKind::Taxid => "taxid",
            ExtractionKind::Publications => "publications",
        }
    }

    /// Source columns for interactor A and interactor B
    pub fn required_columns(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            ExtractionKind::ProteinId => (
                &[column::ID_A, column::ALIAS_A],
                &[column::ID_B, column::ALIAS_B],
            ),
            ExtractionKind::Taxid => (&[column::TAXID_A], &[column::TAXID_B]),
            ExtractionKind::Publications => (&[column::PUBLICATIONS], &[]),
        }
    }
}

impl FromStr for ExtractionKind {
    type Err = BioToolsError;

    fn from_str(s: &str) -> Result<Self> {
        ExtractionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| {
                BioToolsError::config(format!(
                    "Unknown extraction kind '{}'. Valid kinds are: protein_id, taxid, publications",
                    s
                ))
            })
    }
}

impl std::fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of a `taxid:` entry to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxidMode {
    /// `taxid:9606(human)` -> `9606`
    #[default]
    Digits,
    /// `taxid:9606(human)` -> `human`
    Text,
    /// `taxid:9606(human)` -> `taxid:9606(human)`
    Full,
}

impl FromStr for TaxidMode {
    type Err = BioToolsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "digits" => Ok(TaxidMode::Digits),
            "text" => Ok(TaxidMode::Text),
            "full" => Ok(TaxidMode::Full),
            other => Err(BioToolsError::config(format!(
                "Unknown taxid mode '{}'. Valid modes are: digits, text, full",
                other
            ))),
        }
    }
}

/// UniProt accessions and gene symbols of both interactors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractorIds {
    pub uniprot_id_a: Option<String>,
    pub uniprot_id_b: Option<String>,
    pub gene_a: Option<String>,
    pub gene_b: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractorTaxids {
    pub taxid_a: Option<String>,
    pub taxid_b: Option<String>,
}

/// Result of one extraction kind, one element per table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum Extraction {
    ProteinId(Vec<InteractorIds>),
    Taxid(Vec<InteractorTaxids>),
    Publications(Vec<PublicationMap>),
}

struct Patterns {
    uniprot: Regex,
    gene: Regex,
    taxid: Regex,
}

impl Patterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            // 6-10 characters, leading letter
            uniprot: Regex::new(r"^[A-Z][A-Z0-9]{5,9}$")?,
            gene: Regex::new(r"^[A-Za-z][A-Za-z0-9\-]*$")?,
            taxid: Regex::new(r"^\d+$")?,
        })
    }
}

/// Extracts typed fields from a validated [`RecordTable`]
pub struct FieldExtractor<'a> {
    table: &'a RecordTable,
    kinds: Vec<ExtractionKind>,
    patterns: Patterns,
}

impl<'a> FieldExtractor<'a> {
    /// Validate `kinds` against the table's columns.
    ///
    /// Fails with a configuration error if any column required by a
    /// requested kind is missing.
    pub fn new(table: &'a RecordTable, kinds: &[ExtractionKind]) -> Result<Self> {
        let mut requested: Vec<ExtractionKind> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !requested.contains(kind) {
                requested.push(*kind);
            }
        }

        let required: Vec<&str> = requested
            .iter()
            .flat_map(|kind| {
                let (side_a, side_b) = kind.required_columns();
                side_a.iter().chain(side_b.iter()).copied()
            })
            .collect();
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !table.has_column(name))
            .collect();

        if !missing.is_empty() {
            return Err(BioToolsError::config(format!(
                "MITAB table is missing column(s) {:?}; the requested extraction needs {:?}",
                missing, required
            )));
        }

        let non_standard = table.non_standard_columns();
        if !non_standard.is_empty() {
            warn!(columns = ?non_standard, "MITAB table has non-standard columns");
        }

        Ok(Self {
            table,
            kinds: requested,
            patterns: Patterns::compile()?,
        })
    }

    /// Like [`FieldExtractor::new`], with kinds given by name
    pub fn from_names<S: AsRef<str>>(table: &'a RecordTable, names: &[S]) -> Result<Self> {
        let kinds = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<ExtractionKind>>>()?;
        Self::new(table, &kinds)
    }

    pub fn kinds(&self) -> &[ExtractionKind] {
        &self.kinds
    }

    /// Run one extraction kind
    pub fn extract(&self, kind: ExtractionKind, taxid_mode: TaxidMode) -> Result<Extraction> {
        match kind {
            ExtractionKind::ProteinId => self.extract_identifiers().map(Extraction::ProteinId),
            ExtractionKind::Taxid => self.extract_taxids(taxid_mode).map(Extraction::Taxid),
            ExtractionKind::Publications => {
                self.extract_publications().map(Extraction::Publications)
            },
        }
    }

    /// Run every requested kind, in request order
    pub fn extract_all(&self, taxid_mode: TaxidMode) -> Result<Vec<Extraction>> {
        self.kinds
            .iter()
            .map(|kind| self.extract(*kind, taxid_mode))
            .collect()
    }

    /// UniProt accession and gene symbol for both interactors.
    ///
    /// The ID column is searched before the alias column; the alias column
    /// is only consulted when the ID column has no acceptable entry.
    pub fn extract_identifiers(&self) -> Result<Vec<InteractorIds>> {
        self.ensure_requested(ExtractionKind::ProteinId)?;
        let id_a = self.position(column::ID_A)?;
        let id_b = self.position(column::ID_B)?;
        let alias_a = self.position(column::ALIAS_A)?;
        let alias_b = self.position(column::ALIAS_B)?;

        let rows = self
            .table
            .rows()
            .map(|row| {
                let (primary_a, fallback_a) = (row[id_a].as_str(), row[alias_a].as_str());
                let (primary_b, fallback_b) = (row[id_b].as_str(), row[alias_b].as_str());
                InteractorIds {
                    uniprot_id_a: self
                        .find_uniprot(primary_a)
                        .or_else(|| self.find_uniprot(fallback_a)),
                    uniprot_id_b: self
                        .find_uniprot(primary_b)
                        .or_else(|| self.find_uniprot(fallback_b)),
                    gene_a: self.find_gene(primary_a).or_else(|| self.find_gene(fallback_a)),
                    gene_b: self.find_gene(primary_b).or_else(|| self.find_gene(fallback_b)),
                }
            })
            .collect();

        Ok(rows)
    }

    /// Taxonomy of both interactors in the requested mode
    pub fn extract_taxids(&self, mode: TaxidMode) -> Result<Vec<InteractorTaxids>> {
        self.ensure_requested(ExtractionKind::Taxid)?;
        let taxid_a = self.position(column::TAXID_A)?;
        let taxid_b = self.position(column::TAXID_B)?;

        let rows = self
            .table
            .rows()
            .map(|row| InteractorTaxids {
                taxid_a: self.find_taxid(&row[taxid_a], mode),
                taxid_b: self.find_taxid(&row[taxid_b], mode),
            })
            .collect();

        Ok(rows)
    }

    /// Publication identifiers grouped by source tag.
    ///
    /// `pubmed:1|doi:10.1/x|pubmed:2` gives `{pubmed: [1, 2], doi: [10.1/x]}`.
    /// Entries without a `source:` prefix are skipped.
    pub fn extract_publications(&self) -> Result<Vec<PublicationMap>> {
        self.ensure_requested(ExtractionKind::Publications)?;
        let publications = self.position(column::PUBLICATIONS)?;

        let rows = self
            .table
            .rows()
            .map(|row| {
                let mut map = PublicationMap::new();
                for entry in parse_entries(&row[publications]) {
                    map.entry(entry.database.to_string())
                        .or_default()
                        .push(entry.raw_value.to_string());
                }
                map
            })
            .collect();

        Ok(rows)
    }

    fn ensure_requested(&self, kind: ExtractionKind) -> Result<()> {
        if self.kinds.contains(&kind) {
            Ok(())
        } else {
            Err(BioToolsError::config(format!(
                "Extraction '{}' was not requested when the extractor was built",
                kind
            )))
        }
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.table
            .column_index(name)
            .ok_or_else(|| BioToolsError::config(format!("MITAB table has no column '{}'", name)))
    }

    /// The accession shape is checked against the value with its qualifier,
    /// so `uniprotkb:PIK3CA(gene name)` aliases never qualify.
    fn find_uniprot(&self, cell: &str) -> Option<String> {
        parse_entries(cell)
            .into_iter()
            .find(|entry| {
                entry.is_database(UNIPROT_DATABASE)
                    && self.patterns.uniprot.is_match(entry.raw_value)
            })
            .map(|entry| entry.raw_value.to_string())
    }

    fn find_gene(&self, cell: &str) -> Option<String> {
        let entries = parse_entries(cell);
        GENE_DATABASE_PRIORITY.iter().find_map(|database| {
            entries
                .iter()
                .find(|entry| entry.is_database(database) && self.patterns.gene.is_match(entry.value))
                .map(|entry| entry.value.to_string())
        })
    }

    fn find_taxid(&self, cell: &str, mode: TaxidMode) -> Option<String> {
        let found = parse_entries(cell)
            .into_iter()
            .filter(|entry| entry.is_database(TAXID_DATABASE))
            .find_map(|entry| self.taxid_value(&entry, mode));

        if found.is_none() {
            debug!(cell = %cell, ?mode, "No taxid match");
        }
        found
    }

    fn taxid_value(&self, entry: &CompoundEntry<'_>, mode: TaxidMode) -> Option<String> {
        let numeric = self.patterns.taxid.is_match(entry.value);
        match mode {
            TaxidMode::Digits => numeric.then(|| entry.value.to_string()),
            TaxidMode::Text => {
                if !numeric {
                    return None;
                }
                let text = entry.qualifier?.trim().trim_matches('"').trim();
                (!text.is_empty()).then(|| text.to_string())
            },
            TaxidMode::Full => Some(entry.text.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> RecordTable {
        RecordTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn id_table(rows: &[&[&str]]) -> RecordTable {
        table(
            &[column::ID_A, column::ID_B, column::ALIAS_A, column::ALIAS_B],
            rows,
        )
    }

    fn taxid_table(a: &str, b: &str) -> RecordTable {
        table(&[column::TAXID_A, column::TAXID_B], &[&[a, b]])
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("protein_id".parse::<ExtractionKind>().unwrap(), ExtractionKind::ProteinId);
        assert_eq!("taxid".parse::<ExtractionKind>().unwrap(), ExtractionKind::Taxid);
        let err = "GO_terms".parse::<ExtractionKind>().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_taxid_mode_from_str() {
        assert_eq!("text".parse::<TaxidMode>().unwrap(), TaxidMode::Text);
        assert!("name".parse::<TaxidMode>().unwrap_err().is_config());
    }

    #[test]
    fn test_missing_column_is_config_error() {
        let t = table(&[column::ID_A, column::ID_B, column::ALIAS_A], &[]);
        let err = FieldExtractor::new(&t, &[ExtractionKind::ProteinId]).err().unwrap();
        assert!(err.is_config());
        assert!(err.to_string().contains(column::ALIAS_B));
    }

    #[test]
    fn test_unknown_name_is_config_error() {
        let t = id_table(&[]);
        let err = FieldExtractor::from_names(&t, &["protein_id", "UniProtID"]).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_unrequested_kind_is_config_error() {
        let t = id_table(&[]);
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::ProteinId]).unwrap();
        assert!(extractor.extract_publications().unwrap_err().is_config());
    }

    #[test]
    fn test_identifier_from_primary_and_alias_columns() {
        let t = id_table(&[&[
            "uniprotkb:P04637",
            "intact:EBI-366083",
            "psi-mi:p53_human(display_long)|uniprotkb:TP53(gene name)",
            "uniprotkb:Q00987|uniprotkb:MDM2(gene name)",
        ]]);
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::ProteinId]).unwrap();
        let rows = extractor.extract_identifiers().unwrap();

        assert_eq!(
            rows[0],
            InteractorIds {
                uniprot_id_a: Some("P04637".to_string()),
                uniprot_id_b: Some("Q00987".to_string()),
                // P04637 is itself a valid gene-shaped uniprotkb value
                gene_a: Some("P04637".to_string()),
                gene_b: Some("Q00987".to_string()),
            }
        );
    }

    #[test]
    fn test_uniprot_shape_rule() {
        let t = id_table(&[&[
            "uniprotkb:p04637|uniprotkb:P0463|uniprotkb:A0A024R1R8",
            "uniprotkb:P12345-2",
            "-",
            "-",
        ]]);
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::ProteinId]).unwrap();
        let row = &extractor.extract_identifiers().unwrap()[0];

        assert_eq!(row.uniprot_id_a.as_deref(), Some("A0A024R1R8"));
        // isoform suffix breaks the shape
        assert_eq!(row.uniprot_id_b, None);
    }

    #[test]
    fn test_gene_name_aliases_are_not_accessions() {
        let t = id_table(&[&[
            "intact:EBI-1",
            "intact:EBI-2",
            "uniprotkb:SMARCA4(gene name)",
            "uniprotkb:PIK3CA(gene name)|uniprotkb:P42336",
        ]]);
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::ProteinId]).unwrap();
        let row = &extractor.extract_identifiers().unwrap()[0];

        assert_eq!(row.uniprot_id_a, None);
        assert_eq!(row.uniprot_id_b.as_deref(), Some("P42336"));
        assert_eq!(row.gene_a.as_deref(), Some("SMARCA4"));
        assert_eq!(row.gene_b.as_deref(), Some("PIK3CA"));
    }

    #[test]
    fn test_gene_priority_beats_entry_order() {
        let t = id_table(&[&[
            "entrez gene/locuslink:7157|psi-mi:tp53-human|uniprotkb:TP53",
            "entrez gene/locuslink:MDM2|psi-mi:mdm2",
            "-",
            "-",
        ]]);
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::ProteinId]).unwrap();
        let row = &extractor.extract_identifiers().unwrap()[0];

        assert_eq!(row.gene_a.as_deref(), Some("TP53"));
        assert_eq!(row.gene_b.as_deref(), Some("mdm2"));
    }

    #[test]
    fn test_non_matching_databases_give_none() {
        let t = id_table(&[&["intact:EBI-1", "chebi:\"CHEBI:15377\"", "-", "ensembl:ENSG1"]]);
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::ProteinId]).unwrap();
        assert_eq!(extractor.extract_identifiers().unwrap()[0], InteractorIds::default());
    }

    #[test]
    fn test_taxid_modes() {
        let t = taxid_table(
            "taxid:9606",
            r#"taxid:333284("Hepatitis C virus genotype 1b")"#,
        );
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::Taxid]).unwrap();

        let digits = &extractor.extract_taxids(TaxidMode::Digits).unwrap()[0];
        assert_eq!(digits.taxid_a.as_deref(), Some("9606"));
        assert_eq!(digits.taxid_b.as_deref(), Some("333284"));

        let text = &extractor.extract_taxids(TaxidMode::Text).unwrap()[0];
        assert_eq!(text.taxid_a, None);
        assert_eq!(text.taxid_b.as_deref(), Some("Hepatitis C virus genotype 1b"));

        let full = &extractor.extract_taxids(TaxidMode::Full).unwrap()[0];
        assert_eq!(full.taxid_a.as_deref(), Some("taxid:9606"));
        assert_eq!(
            full.taxid_b.as_deref(),
            Some(r#"taxid:333284("Hepatitis C virus genotype 1b")"#)
        );
    }

    #[test]
    fn test_taxid_skips_non_numeric_entries() {
        let t = taxid_table("taxid:-1(in vitro)|taxid:9606(human)", "-");
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::Taxid]).unwrap();
        let row = &extractor.extract_taxids(TaxidMode::Digits).unwrap()[0];
        assert_eq!(row.taxid_a.as_deref(), Some("9606"));
        assert_eq!(row.taxid_b, None);
    }

    #[test]
    fn test_publications_accumulate_repeated_tags() {
        let t = table(
            &[column::PUBLICATIONS],
            &[&["pubmed:12345|doi:10.1/x|pubmed:67890"], &["-"]],
        );
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::Publications]).unwrap();
        let rows = extractor.extract_publications().unwrap();

        assert_eq!(rows[0]["pubmed"], vec!["12345", "67890"]);
        assert_eq!(rows[0]["doi"], vec!["10.1/x"]);
        assert!(rows[1].is_empty());
    }

    #[test]
    fn test_publication_tags_keep_first_seen_order() {
        let t = table(
            &[column::PUBLICATIONS],
            &[&["pubmed:12345|doi:10.1/x|pubmed:67890|imex:IM-1"]],
        );
        let extractor = FieldExtractor::new(&t, &[ExtractionKind::Publications]).unwrap();
        let rows = extractor.extract_publications().unwrap();

        let tags: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(tags, vec!["pubmed", "doi", "imex"]);
        assert_eq!(
            serde_json::to_string(&rows[0]).unwrap(),
            r#"{"pubmed":["12345","67890"],"doi":["10.1/x"],"imex":["IM-1"]}"#
        );
    }

    #[test]
    fn test_extract_all_follows_request_order() {
        let t = table(
            &[column::PUBLICATIONS, column::TAXID_A, column::TAXID_B],
            &[&["pubmed:1", "taxid:9606", "taxid:10090"]],
        );
        let extractor = FieldExtractor::new(
            &t,
            &[ExtractionKind::Taxid, ExtractionKind::Publications, ExtractionKind::Taxid],
        )
        .unwrap();
        assert_eq!(extractor.kinds(), &[ExtractionKind::Taxid, ExtractionKind::Publications]);

        let results = extractor.extract_all(TaxidMode::Digits).unwrap();
        assert!(matches!(results[0], Extraction::Taxid(_)));
        assert!(matches!(results[1], Extraction::Publications(_)));
    }
}
