//! Reading the reading-list CSV and turning rows into indexable documents.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::document::{DocumentMetadata, NormalizedDocument, SourceRecord};
use crate::error::{RagError, Result};

/// Header names the ingestion file must carry, in [`SourceRecord`] field order.
///
/// Matching is exact and case-sensitive.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "name",
    "authors",
    "favorite_quote",
    "One_line_review",
    "why_should_read",
];

/// Build the labelled text and display metadata for a record.
///
/// Empty fields are kept as empty text so every label is always present.
pub fn normalize(record: &SourceRecord) -> NormalizedDocument {
    let content = format!(
        "Title: {}\nAuthor: {}\nQuote: {}\nReview: {}\nWhy Read: {}",
        record.name,
        record.authors,
        record.favorite_quote,
        record.one_line_review,
        record.why_should_read,
    );

    NormalizedDocument {
        content,
        metadata: DocumentMetadata {
            title: record.name.clone(),
            author: record.authors.clone(),
        },
    }
}

/// A CSV reader that yields [`SourceRecord`]s.
///
/// The header is validated when the reader is created, so a schema mismatch
/// fails before any row is read.
pub struct RecordReader<R> {
    reader: csv::Reader<R>,
    positions: [usize; 5],
}

impl RecordReader<std::fs::File> {
    /// Open a CSV file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening records file");
        let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        Self::with_reader(reader)
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap any byte source containing CSV with a header row.
    pub fn from_reader(source: R) -> Result<Self> {
        let reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
        Self::with_reader(reader)
    }

    fn with_reader(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let mut positions = [0usize; 5];
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| RagError::MissingColumn {
                    column: column.to_string(),
                })?;
        }
        Ok(Self { reader, positions })
    }

    /// Read every remaining row.
    pub fn read_all(&mut self) -> Result<Vec<SourceRecord>> {
        let positions = self.positions;
        let mut records = Vec::new();
        for row in self.reader.records() {
            let row = row?;
            let field = |idx: usize| row.get(positions[idx]).unwrap_or_default().to_string();
            records.push(SourceRecord {
                name: field(0),
                authors: field(1),
                favorite_quote: field(2),
                one_line_review: field(3),
                why_should_read: field(4),
            });
        }
        Ok(records)
    }
}

/// Read all records from a CSV file.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<SourceRecord>> {
    RecordReader::from_path(path)?.read_all()
}

/// Read a CSV file and normalize each row.
pub fn read_documents(path: impl AsRef<Path>) -> Result<Vec<NormalizedDocument>> {
    let documents: Vec<NormalizedDocument> = read_records(path)?.iter().map(normalize).collect();
    info!(document_count = documents.len(), "normalized records");
    Ok(documents)
}
