//! Biotools Library
//!
//! Utilities for working with molecular-interaction data.
//!
//! # Modules
//!
//! - **mitab**: Field extraction from PSI-MITAB 2.7 interaction tables
//! - **gene2uniprot**: Gene symbol to UniProt accession resolution via mygene.info
//! - **protein_annotation**: Protein annotation from the EBI Proteins API and PDBe
//!
//! # Example
//!
//! ```no_run
//! use biotools::gene2uniprot::gene2uniprot;
//! use biotools::protein_annotation::get_proteins_info;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolution = gene2uniprot(&["TP53", "MDM2"], 9606, 2).await?;
//!     let ids: Vec<&String> = resolution.resolved.values().collect();
//!
//!     let report = get_proteins_info(&ids, 10).await?;
//!     println!("{} proteins annotated", report.records.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod gene2uniprot;
pub mod http;
pub mod mitab;
pub mod protein_annotation;
