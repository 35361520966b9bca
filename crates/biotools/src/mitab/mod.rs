//! PSI-MI TAB (MITAB) parsing
//!
//! MITAB is a tab-separated molecular interaction exchange format. Each row
//! describes one binary interaction between interactor A and interactor B,
//! and most cells hold pipe-separated `database:value(description)` entries.
//!
//! - [`RecordTable`]: an in-memory MITAB table with named columns
//! - [`compound`]: splitting and parsing of compound cell values
//! - [`FieldExtractor`]: typed extraction of identifiers, taxids and
//!   publication references
//!
//! # Example
//!
//! ```no_run
//! use biotools::mitab::{ExtractionKind, FieldExtractor, HeaderMode, RecordTable, TaxidMode};
//!
//! # fn main() -> biotools_common::Result<()> {
//! let table = RecordTable::from_path("interactions.mitab", HeaderMode::FromFile)?;
//! let extractor =
//!     FieldExtractor::new(&table, &[ExtractionKind::ProteinId, ExtractionKind::Taxid])?;
//!
//! let ids = extractor.extract_identifiers()?;
//! let taxids = extractor.extract_taxids(TaxidMode::Digits)?;
//! assert_eq!(ids.len(), taxids.len());
//! # Ok(())
//! # }
//! ```

pub mod compound;
pub mod extractor;
pub mod table;

pub use compound::CompoundEntry;
pub use extractor::{
    Extraction, ExtractionKind, FieldExtractor, InteractorIds, InteractorTaxids, PublicationMap,
    TaxidMode,
};
pub use table::{HeaderMode, RecordTable};

/// Column names used by the extractors
pub mod column {
    pub const ID_A: &str = "#ID(s) interactor A";
    pub const ID_B: &str = "ID(s) interactor B";
    pub const ALIAS_A: &str = "Alias(es) interactor A";
    pub const ALIAS_B: &str = "Alias(es) interactor B";
    pub const TAXID_A: &str = "Taxid interactor A";
    pub const TAXID_B: &str = "Taxid interactor B";
    pub const PUBLICATIONS: &str = "Publication Identifier(s)";
}

/// The 46 MITAB 2.7 column headers, in file order.
///
/// MITAB 2.5 files carry the first 15 columns and MITAB 2.6 the first 36
/// (later extended to 42); the order never changes between versions.
pub const MITAB_COLUMNS: [&str; 46] = [
    "#ID(s) interactor A",
    "ID(s) interactor B",
    "Alt. ID(s) interactor A",
    "Alt. ID(s) interactor B",
    "Alias(es) interactor A",
    "Alias(es) interactor B",
    "Interaction detection method(s)",
    "Publication 1st author(s)",
    "Publication Identifier(s)",
    "Taxid interactor A",
    "Taxid interactor B",
    "Interaction type(s)",
    "Source database(s)",
    "Interaction identifier(s)",
    "Confidence value(s)",
    "Expansion method(s)",
    "Biological role(s) interactor A",
    "Biological role(s) interactor B",
    "Experimental role(s) interactor A",
    "Experimental role(s) interactor B",
    "Type(s) interactor A",
    "Type(s) interactor B",
    "Xref(s) interactor A",
    "Xref(s) interactor B",
    "Interaction Xref(s)",
    "Annotation(s) interactor A",
    "Annotation(s) interactor B",
    "Interaction annotation(s)",
    "Host organism(s)",
    "Interaction parameter(s)",
    "Creation date",
    "Update date",
    "Checksum(s) interactor A",
    "Checksum(s) interactor B",
    "Interaction Checksum(s)",
    "Negative",
    "Feature(s) interactor A",
    "Feature(s) interactor B",
    "Stoichiometry(s) interactor A",
    "Stoichiometry(s) interactor B",
    "Identification method participant A",
    "Identification method participant B",
    "Biological effect(s) interactor A",
    "Biological effect(s) interactor B",
    "Causal regulatory mechanism",
    "Causal statement",
];

/// Whether `name` is one of the standard MITAB headers
pub fn is_standard_column(name: &str) -> bool {
    MITAB_COLUMNS.contains(&name)
}
