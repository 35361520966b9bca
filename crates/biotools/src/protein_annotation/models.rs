//! Protein annotation records and the remote JSON they are built from

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Comment type holding the free-text function description
pub const FUNCTION_COMMENT: &str = "FUNCTION";

/// Cross-reference type for Gene Ontology terms
pub const GO_REFERENCE: &str = "GO";

/// Why an identifier ended up in a failure bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureCategory {
    /// Primary entry lookup failed; nothing else was attempted
    #[serde(rename = "UniProtID")]
    UniProtId,
    /// Structure mapping lookup failed
    #[serde(rename = "PDB")]
    Pdb,
    /// Primary entry body could not be decoded
    #[serde(rename = "ParseError")]
    ParseError,
    #[serde(rename = "Gene")]
    Gene,
    #[serde(rename = "TaxID")]
    TaxId,
    #[serde(rename = "Annotation")]
    Annotation,
    #[serde(rename = "GO_terms")]
    GoTerms,
    #[serde(rename = "Sequence")]
    Sequence,
}

impl FailureCategory {
    pub const ALL: [FailureCategory; 8] = [
        FailureCategory::UniProtId,
        FailureCategory::Pdb,
        FailureCategory::ParseError,
        FailureCategory::Gene,
        FailureCategory::TaxId,
        FailureCategory::Annotation,
        FailureCategory::GoTerms,
        FailureCategory::Sequence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::UniProtId => "UniProtID",
            FailureCategory::Pdb => "PDB",
            FailureCategory::ParseError => "ParseError",
            FailureCategory::Gene => "Gene",
            FailureCategory::TaxId => "TaxID",
            FailureCategory::Annotation => "Annotation",
            FailureCategory::GoTerms => "GO_terms",
            FailureCategory::Sequence => "Sequence",
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotation assembled for one UniProt accession.
///
/// `None` (or an empty collection) marks a field the remote entry did not
/// provide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProteinRecord {
    pub uniprot_id: String,
    pub gene: Option<String>,
    pub taxid: Option<u64>,
    /// First FUNCTION comment text
    pub annotation: Option<String>,
    /// GO term id -> term description
    pub go_terms: BTreeMap<String, Option<String>>,
    pub sequence: Option<String>,
    /// PDB identifiers, first-seen order, no duplicates
    pub pdb: Vec<String>,
}

impl ProteinRecord {
    /// Field categories that are not available on this record
    pub fn missing_fields(&self) -> Vec<FailureCategory> {
        let mut missing = Vec::new();
        if self.gene.is_none() {
            missing.push(FailureCategory::Gene);
        }
        if self.taxid.is_none() {
            missing.push(FailureCategory::TaxId);
        }
        if self.annotation.is_none() {
            missing.push(FailureCategory::Annotation);
        }
        if self.go_terms.is_empty() {
            missing.push(FailureCategory::GoTerms);
        }
        if self.sequence.is_none() {
            missing.push(FailureCategory::Sequence);
        }
        missing
    }
}

// ============================================================================
// Proteins API entry
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProteinEntry {
    #[serde(default)]
    gene: Vec<GeneEntry>,
    organism: Option<Organism>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default, rename = "dbReferences")]
    db_references: Vec<DbReference>,
    sequence: Option<SequenceInfo>,
}

#[derive(Debug, Deserialize)]
struct GeneEntry {
    name: Option<EvidencedValue>,
}

#[derive(Debug, Deserialize)]
struct EvidencedValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct Organism {
    taxonomy: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Comment {
    #[serde(rename = "type")]
    kind: Option<String>,
    // shape differs between comment types
    text: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DbReference {
    #[serde(rename = "type")]
    kind: Option<String>,
    id: Option<String>,
    properties: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct SequenceInfo {
    sequence: Option<String>,
}

impl Comment {
    fn first_text(&self) -> Option<&str> {
        self.text
            .as_ref()?
            .as_array()?
            .first()?
            .get("value")?
            .as_str()
    }
}

/// Whether a Proteins API body decodes to nothing (`{}`, `[]` or `null`).
///
/// The service answers some unknown accessions this way instead of 404.
pub fn is_empty_entry(body: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => true,
        Ok(Value::Object(map)) => map.is_empty(),
        Ok(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

/// Build a record from a Proteins API entry body.
///
/// The structure list is left empty; it comes from a separate lookup.
pub fn parse_entry(uniprot_id: &str, body: &str) -> serde_json::Result<ProteinRecord> {
    let entry: ProteinEntry = serde_json::from_str(body)?;

    let gene = entry
        .gene
        .first()
        .and_then(|gene| gene.name.as_ref())
        .map(|name| name.value.clone());

    let annotation = entry
        .comments
        .iter()
        .filter(|comment| comment.kind.as_deref() == Some(FUNCTION_COMMENT))
        .find_map(Comment::first_text)
        .map(str::to_string);

    let go_terms = entry
        .db_references
        .iter()
        .filter(|reference| reference.kind.as_deref() == Some(GO_REFERENCE))
        .filter_map(|reference| {
            let id = reference.id.clone()?;
            let term = reference
                .properties
                .as_ref()
                .and_then(|properties| properties.get("term"))
                .and_then(Value::as_str)
                .map(str::to_string);
            Some((id, term))
        })
        .collect();

    Ok(ProteinRecord {
        uniprot_id: uniprot_id.to_string(),
        gene,
        taxid: entry.organism.and_then(|organism| organism.taxonomy),
        annotation,
        go_terms,
        sequence: entry
            .sequence
            .and_then(|info| info.sequence)
            .filter(|sequence| !sequence.is_empty()),
        pdb: Vec::new(),
    })
}

// ============================================================================
// PDBe best structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct StructureEntry {
    pdb_id: Option<String>,
}

/// PDB identifiers mapped to `uniprot_id`; an accession absent from the
/// response simply has no structures.
pub fn parse_structures(uniprot_id: &str, body: &str) -> serde_json::Result<Vec<String>> {
    let mappings: HashMap<String, Vec<StructureEntry>> = serde_json::from_str(body)?;

    let mut pdb_ids: Vec<String> = Vec::new();
    for entry in mappings.get(uniprot_id).into_iter().flatten() {
        if let Some(pdb_id) = &entry.pdb_id {
            if !pdb_ids.contains(pdb_id) {
                pdb_ids.push(pdb_id.clone());
            }
        }
    }
    Ok(pdb_ids)
}
