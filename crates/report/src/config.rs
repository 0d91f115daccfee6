//! Report configuration
//!
//! Deserialized from camelCase JSON; every field has a default so a partial
//! document (or `{}`) is a valid configuration.

use crate::cover::CoverTemplate;
use crate::geometry::{Orientation, PageGeometry};
use crate::{ReportError, Result};
use herd_data::{CsvOptions, Relabeler, TextEncoding};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest accepted table font size, in whole points
pub const MIN_FONT_SIZE: u32 = 6;
/// Largest accepted table font size, in whole points
pub const MAX_FONT_SIZE: u32 = 16;
/// Rows per page used when none is configured, capped by the page capacity
pub const DEFAULT_ROWS_PER_PAGE: usize = 30;

/// User-chosen options for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub client_name: String,
    pub header_left_text: String,
    /// `None` shows the generation date
    pub header_right_text: Option<String>,
    /// Whole points; JSON such as `10.5` is rejected when parsing
    pub font_size: u32,
    /// `None` uses `min(30, capacity)`
    pub rows_per_page: Option<usize>,
    pub orientation: Orientation,
    pub cover_template: CoverTemplate,
    /// Column labels to show, in order; `None` shows every column
    pub selected_columns: Option<Vec<String>>,
    pub logo_image_path: Option<PathBuf>,
    /// Small logo drawn in the corner of every page
    pub brand_logo_path: Option<PathBuf>,
    pub watermark_text: Option<String>,
    pub responsible_name: String,
    pub contact_phone: String,
    pub pad_last_page: bool,
    pub zebra_rows: bool,
    /// Labels applied by position instead of the header heuristic
    pub column_labels: Option<Vec<String>>,
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub encoding: TextEncoding,
    pub delimiter: Option<char>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            client_name: "Fazenda Exemplo".to_string(),
            header_left_text: "Relatório de Acasalamento".to_string(),
            header_right_text: None,
            font_size: 10,
            rows_per_page: None,
            orientation: Orientation::default(),
            cover_template: CoverTemplate::default(),
            selected_columns: None,
            logo_image_path: None,
            brand_logo_path: None,
            watermark_text: None,
            responsible_name: String::new(),
            contact_phone: String::new(),
            pad_last_page: true,
            zebra_rows: true,
            column_labels: None,
            font_path: None,
            bold_font_path: None,
            encoding: TextEncoding::default(),
            delimiter: None,
        }
    }
}

impl ReportConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Page geometry for the configured orientation and font size
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.orientation, self.font_size as f64)
    }

    /// Check the options that do not depend on the dataset
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(ReportError::InvalidConfig(format!(
                "font size {} is outside {MIN_FONT_SIZE}..={MAX_FONT_SIZE}",
                self.font_size
            )));
        }

        if let Some(rows) = self.rows_per_page {
            let capacity = self.geometry().max_rows_per_page();
            let min = crate::planner::MIN_ROWS_PER_PAGE;
            if rows < min || rows > capacity {
                return Err(ReportError::InvalidConfig(format!(
                    "rows per page {rows} is outside {min}..={capacity} for font size {} ({})",
                    self.font_size, self.orientation
                )));
            }
        }

        if self.selected_columns.as_ref().is_some_and(|c| c.is_empty()) {
            return Err(ReportError::InvalidConfig(
                "at least one column must be selected".to_string(),
            ));
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err(ReportError::InvalidConfig(format!(
                    "delimiter '{delimiter}' is not an ASCII character"
                )));
            }
        }

        Ok(())
    }

    /// Configured rows per page, or the default capped by capacity
    pub fn effective_rows_per_page(&self) -> usize {
        self.rows_per_page.unwrap_or_else(|| {
            DEFAULT_ROWS_PER_PAGE.min(self.geometry().max_rows_per_page())
        })
    }

    pub fn relabeler(&self) -> Relabeler {
        match &self.column_labels {
            Some(labels) => Relabeler::Positional(labels.clone()),
            None => Relabeler::Heuristic,
        }
    }

    /// CSV reading options; a non-ASCII delimiter falls back to detection
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            encoding: self.encoding,
            delimiter: self
                .delimiter
                .filter(char::is_ascii)
                .map(|c| c as u8),
        }
    }
}
