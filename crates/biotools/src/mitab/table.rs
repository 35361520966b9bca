//! In-memory MITAB record table

use biotools_common::{BioToolsError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::{is_standard_column, MITAB_COLUMNS};

/// Where column names come from when reading MITAB text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// The first line is the header row
    #[default]
    FromFile,
    /// No header row; columns take the standard MITAB names by position
    Standard,
}

/// An ordered table of interaction rows with a fixed set of named columns
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Build a table from a header and its rows.
    ///
    /// Fails on duplicate column names or on a row whose width differs
    /// from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(BioToolsError::parse(format!(
                    "Duplicate column '{}' in MITAB header",
                    name
                )));
            }
        }

        if let Some((row_number, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(BioToolsError::parse(format!(
                "Row {} has {} fields, expected {}",
                row_number + 1,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    /// Read tab-separated MITAB text.
    ///
    /// Quoting is disabled: MITAB cells carry literal double quotes
    /// (`psi-mi:"MI:0018"(two hybrid)`).
    pub fn from_reader<R: Read>(reader: R, header: HeaderMode) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| {
                BioToolsError::parse(format!("Failed to read MITAB line {}: {}", line + 1, e))
            })?;
            records.push(record.iter().map(str::to_string).collect::<Vec<String>>());
        }

        let (columns, rows) = match header {
            HeaderMode::FromFile => {
                if records.is_empty() {
                    return Err(BioToolsError::parse("MITAB input has no header row"));
                }
                let columns = records.remove(0);
                (columns, records)
            },
            HeaderMode::Standard => {
                let width = records.first().map_or(MITAB_COLUMNS.len(), Vec::len);
                if width > MITAB_COLUMNS.len() {
                    return Err(BioToolsError::parse(format!(
                        "Row has {} fields but MITAB defines at most {} columns",
                        width,
                        MITAB_COLUMNS.len()
                    )));
                }
                let columns = MITAB_COLUMNS[..width]
                    .iter()
                    .map(|name| name.to_string())
                    .collect();
                (columns, records)
            },
        };

        let table = Self::new(columns, rows)?;
        debug!(
            rows = table.len(),
            columns = table.columns.len(),
            "Loaded MITAB table"
        );
        Ok(table)
    }

    /// Read a MITAB file from disk
    pub fn from_path(path: impl AsRef<Path>, header: HeaderMode) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading MITAB file {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file), header)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows (the header is not a row)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Cell values of one column, in row order
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let position = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[position].as_str()))
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Header names that are not part of the MITAB standard
    pub fn non_standard_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|name| !is_standard_column(name))
            .collect()
    }
}
