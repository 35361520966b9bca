//! Compound cell values
//!
//! A compound cell joins zero or more `database:value(description)` entries
//! with `|`. Values may themselves contain `:` (only the first colon separates
//! the database from the value) and quoted or parenthesised text may contain
//! `|`, which must not split the entry.
//!
//! ```
//! use biotools::mitab::compound::parse_entries;
//!
//! let entries = parse_entries(r#"psi-mi:"MI:0326"(protein)|uniprotkb:TP53(gene name)"#);
//! assert_eq!(entries[0].database, "psi-mi");
//! assert_eq!(entries[0].value, r#""MI:0326""#);
//! assert_eq!(entries[1].value, "TP53");
//! assert_eq!(entries[1].qualifier, Some("gene name"));
//! ```

use tracing::debug;

/// Separates entries within a cell
pub const ENTRY_DELIMITER: char = '|';

/// Separates the database tag from the value
pub const FIELD_SEPARATOR: char = ':';

/// MITAB marker for an empty cell
pub const EMPTY_MARKER: &str = "-";

/// One `database:value(qualifier)` entry borrowed from a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundEntry<'a> {
    /// Full entry text, e.g. `taxid:9606(human)`
    pub text: &'a str,
    pub database: &'a str,
    /// Everything after the first `:`, qualifier included
    pub raw_value: &'a str,
    /// Value with any trailing `(qualifier)` removed
    pub value: &'a str,
    pub qualifier: Option<&'a str>,
}

impl<'a> CompoundEntry<'a> {
    /// Parse a single entry; `None` if it has no `database:` prefix.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        let (database, raw_value) = text.split_once(FIELD_SEPARATOR)?;
        let database = database.trim();
        if database.is_empty() {
            return None;
        }
        let raw_value = raw_value.trim();
        let (value, qualifier) = split_qualifier(raw_value);

        Some(Self {
            text,
            database,
            raw_value,
            value,
            qualifier,
        })
    }

    /// Case-insensitive database tag comparison
    pub fn is_database(&self, database: &str) -> bool {
        self.database.eq_ignore_ascii_case(database)
    }
}

/// Split a cell on `|`, ignoring delimiters inside quotes or parentheses.
///
/// A cell whose quotes or parentheses never balance is split on every `|`
/// instead. Blank pieces are dropped; every returned piece is trimmed.
pub fn split_entries(cell: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in cell.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.saturating_sub(1),
            ENTRY_DELIMITER if !in_quotes && depth == 0 => {
                entries.push(&cell[start..i]);
                start = i + c.len_utf8();
            },
            _ => {},
        }
    }
    entries.push(&cell[start..]);

    if in_quotes || depth > 0 {
        debug!(cell = %cell, "Unbalanced quotes or parentheses, splitting on every delimiter");
        entries = cell.split(ENTRY_DELIMITER).collect();
    }

    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Parse every well-formed entry of a cell.
///
/// Empty cells and the `-` marker yield nothing. Entries without a
/// `database:` prefix are skipped.
pub fn parse_entries(cell: &str) -> Vec<CompoundEntry<'_>> {
    let cell = cell.trim();
    if cell.is_empty() || cell == EMPTY_MARKER {
        return Vec::new();
    }

    split_entries(cell)
        .into_iter()
        .filter_map(|entry| {
            let parsed = CompoundEntry::parse(entry);
            if parsed.is_none() {
                debug!(entry = %entry, "Skipping compound entry without database prefix");
            }
            parsed
        })
        .collect()
}

/// Split `value(qualifier)` into its parts, honouring nested parentheses
/// and quotes inside the qualifier.
fn split_qualifier(raw: &str) -> (&str, Option<&str>) {
    if !raw.ends_with(')') {
        return (raw, None);
    }

    let mut depth = 0usize;
    let mut in_quotes = false;
    for (i, c) in raw.char_indices().rev() {
        match c {
            '"' => in_quotes = !in_quotes,
            ')' if !in_quotes => depth += 1,
            '(' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    let value = raw[..i].trim_end();
                    if value.is_empty() {
                        return (raw, None);
                    }
                    let qualifier = raw[i + 1..raw.len() - 1].trim();
                    return (value, Some(qualifier));
                }
            },
            _ => {},
        }
    }

    // unbalanced parentheses
    (raw, None)
}
