//! In-memory tabular dataset loaded from CSV

use crate::encoding::{decode, detect_delimiter, TextEncoding};
use crate::relabel::Relabeler;
use crate::{DatasetError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Options for reading a CSV file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    pub encoding: TextEncoding,
    /// Field delimiter; detected from the header line when `None`
    pub delimiter: Option<u8>,
}

/// Header row plus string cells, every row as wide as the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset from already-split rows
    ///
    /// Short rows are padded with empty cells; rows wider than the header
    /// are rejected.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(DatasetError::Empty);
        }
        let width = headers.len();
        let mut rows = rows;
        for (i, row) in rows.iter_mut().enumerate() {
            if row.len() > width {
                return Err(DatasetError::RaggedRow {
                    // Header is line 1
                    line: i as u64 + 2,
                    expected: width,
                    found: row.len(),
                });
            }
            row.resize(width, String::new());
        }
        Ok(Self { headers, rows })
    }

    /// Parse CSV file contents
    pub fn from_bytes(bytes: &[u8], options: &CsvOptions) -> Result<Self> {
        let text = decode(bytes, options.encoding)?;
        let delimiter = options
            .delimiter
            .unwrap_or_else(|| detect_delimiter(&text));
        tracing::debug!(delimiter = %(delimiter as char).escape_default(), "parsing CSV");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(DatasetError::Empty);
        }
        let width = headers.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > width {
                return Err(DatasetError::RaggedRow {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: width,
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        tracing::debug!(columns = width, rows = rows.len(), "loaded dataset");
        Ok(Self { headers, rows })
    }

    /// Read and parse a CSV file from disk
    pub fn from_path<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Self> {
        Self::from_reader(File::open(path)?, options)
    }

    /// Read and parse CSV from any reader
    pub fn from_reader<R: Read>(mut reader: R, options: &CsvOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes, options)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of the first column with this exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Replace the header row; cells are untouched
    pub fn relabel_headers(&mut self, relabeler: &Relabeler) -> Result<()> {
        self.headers = relabeler.relabel(&self.headers)?;
        Ok(())
    }

    /// Map column names to indices in the order given
    ///
    /// Each name takes the first matching column not already taken, so a
    /// label that appears twice can be selected twice.
    pub fn resolve_columns(&self, names: &[String]) -> Result<Vec<usize>> {
        let mut taken = vec![false; self.headers.len()];
        names
            .iter()
            .map(|name| {
                let index = self
                    .headers
                    .iter()
                    .enumerate()
                    .position(|(i, h)| !taken[i] && h == name)
                    .ok_or_else(|| DatasetError::UnknownColumn(name.clone()))?;
                taken[index] = true;
                Ok(index)
            })
            .collect()
    }

    /// New dataset with only the given columns, in the given order
    pub fn project(&self, columns: &[usize]) -> Result<Self> {
        if let Some(&bad) = columns.iter().find(|&&c| c >= self.headers.len()) {
            return Err(DatasetError::UnknownColumn(format!("#{bad}")));
        }
        let headers = columns.iter().map(|&c| self.headers[c].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| columns.iter().map(|&c| row[c].clone()).collect())
            .collect();
        Ok(Self { headers, rows })
    }
}
