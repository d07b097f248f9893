//! Reference table of known gesture signatures.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

/// Error type for reference table construction and loading.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("table must have at least one channel")]
    NoChannels,
    #[error("entry {entry} has {actual} channels, table has {expected}")]
    EntryLength {
        entry: usize,
        expected: usize,
        actual: usize,
    },
    #[error("dataset needs {needed} columns ({channels} features + label), row {row} has {actual}")]
    MissingColumns {
        row: usize,
        channels: usize,
        needed: usize,
        actual: usize,
    },
    #[error("row {row}, column {column}: not a number: {value:?}")]
    InvalidValue {
        row: usize,
        column: usize,
        value: String,
    },
    #[error("row {row} has an empty gesture label")]
    EmptyLabel { row: usize },
}

/// One known gesture: a channel vector and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    values: Vec<f64>,
    label: String,
}

impl ReferenceEntry {
    /// Creates an entry.
    pub fn new(values: Vec<f64>, label: impl Into<String>) -> Self {
        Self {
            values,
            label: label.into(),
        }
    }

    /// Returns the reference channel values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the gesture label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// An immutable, ordered collection of reference entries.
///
/// Table order is significant: classification returns the first entry whose
/// bands all contain the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    channels: usize,
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    /// Creates a table, checking every entry has `channels` values.
    pub fn new(channels: usize, entries: Vec<ReferenceEntry>) -> Result<Self, TableError> {
        if channels == 0 {
            return Err(TableError::NoChannels);
        }
        if let Some((entry, e)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.values.len() != channels)
        {
            return Err(TableError::EntryLength {
                entry,
                expected: channels,
                actual: e.values.len(),
            });
        }
        Ok(Self { channels, entries })
    }

    /// Loads a table from a CSV file with a header row.
    ///
    /// The first `channels` columns are features and the last column is the
    /// label. Columns in between are ignored.
    pub fn from_csv_path(path: impl AsRef<Path>, channels: usize) -> Result<Self, TableError> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_csv_reader(file, channels)?;
        debug!(
            path = %path.as_ref().display(),
            entries = table.len(),
            channels,
            "reference table loaded"
        );
        Ok(table)
    }

    /// Loads a table from CSV data with a header row.
    pub fn from_csv_reader<R: Read>(reader: R, channels: usize) -> Result<Self, TableError> {
        if channels == 0 {
            return Err(TableError::NoChannels);
        }
        let needed = channels + 1;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // Row numbers count the header as row 1.
            let row = idx + 2;
            if record.len() < needed {
                return Err(TableError::MissingColumns {
                    row,
                    channels,
                    needed,
                    actual: record.len(),
                });
            }

            let values = record
                .iter()
                .take(channels)
                .enumerate()
                .map(|(column, value)| {
                    value.parse::<f64>().map_err(|_| TableError::InvalidValue {
                        row,
                        column,
                        value: value.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let label = &record[record.len() - 1];
            if label.is_empty() {
                return Err(TableError::EmptyLabel { row });
            }
            entries.push(ReferenceEntry::new(values, label));
        }

        Self::new(channels, entries)
    }

    /// Returns the channel count every frame must match.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the entries in table order.
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
