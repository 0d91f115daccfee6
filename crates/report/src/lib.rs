//! Report - paginated PDF reports for breeding (acasalamento) plans
//!
//! This crate provides:
//! - [`ReportConfig`], the JSON-backed set of user options
//! - Page capacity and pagination planning ([`max_rows_per_page`], [`plan`])
//! - Cover page templates and the data table layout
//! - [`generate_report`], which turns a [`Dataset`] into PDF bytes
//!
//! # Example
//!
//! ```ignore
//! use herd_data::Dataset;
//! use report::{generate_report, ReportAssets, ReportConfig};
//!
//! let config = ReportConfig::from_json(&std::fs::read_to_string("config.json")?)?;
//! let dataset = Dataset::from_path("acasalamento.csv", &config.csv_options())?;
//! let assets = ReportAssets::load(&config)?;
//! let pdf = generate_report(&dataset, &config, &assets)?;
//! std::fs::write("relatorio.pdf", pdf)?;
//! ```

mod config;
mod cover;
mod geometry;
mod planner;
mod render;
mod table;

pub use config::{ReportConfig, DEFAULT_ROWS_PER_PAGE, MAX_FONT_SIZE, MIN_FONT_SIZE};
pub use cover::{draw_cover, CoverContent, CoverTemplate};
pub use geometry::{Orientation, PageGeometry, DATA_ROW_PADDING, HEADER_ROW_PADDING};
pub use planner::{
    capacity_table, max_rows_per_page, plan, PageSlice, PaginationPlan, MIN_ROWS_PER_PAGE,
};
pub use render::{compose, page_label, PageBlock, ReportAssets, Renderer, FONT_FAMILY};
pub use table::{TableLayout, TableStyle};

use chrono::{Local, NaiveDate, NaiveDateTime};
use herd_data::{Dataset, DatasetError};
use pdf_core::PdfError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Build the report PDF dated today
pub fn generate_report(
    dataset: &Dataset,
    config: &ReportConfig,
    assets: &ReportAssets,
) -> Result<Vec<u8>> {
    generate_report_on(dataset, config, assets, Local::now().date_naive())
}

/// Build the report PDF with an explicit cover and header date
///
/// Headers are relabeled with the configured relabeler before the selected
/// columns are looked up, so selections always use the friendly labels.
pub fn generate_report_on(
    dataset: &Dataset,
    config: &ReportConfig,
    assets: &ReportAssets,
    date: NaiveDate,
) -> Result<Vec<u8>> {
    config.validate()?;

    let mut table = dataset.clone();
    table.relabel_headers(&config.relabeler())?;
    let table = match &config.selected_columns {
        Some(names) => {
            let columns = table.resolve_columns(names).map_err(|e| match e {
                DatasetError::UnknownColumn(name) => {
                    ReportError::InvalidConfig(format!("unknown column '{name}'"))
                }
                other => other.into(),
            })?;
            table.project(&columns)?
        }
        None => table,
    };

    let rows_per_page = config.effective_rows_per_page();
    let pagination = plan(table.len(), rows_per_page, config.pad_last_page)?;
    tracing::debug!(
        rows_per_page,
        pages = pagination.page_count(),
        padded = pagination.is_padded(),
        "planned pagination"
    );

    let blocks = compose(&pagination);
    let renderer = Renderer {
        dataset: &table,
        config,
        assets,
        geometry: config.geometry(),
        date: date.format("%d/%m/%Y").to_string(),
    };
    let doc = renderer.render(&blocks)?;
    let bytes = doc.to_bytes()?;

    tracing::info!(
        client = %config.client_name,
        rows = table.len(),
        columns = table.column_count(),
        pages = doc.page_count(),
        bytes = bytes.len(),
        "report generated"
    );
    Ok(bytes)
}

/// `acasalamento_<client>_<YYYYmmdd_HHMM>.pdf`, spaces in the client name
/// replaced by underscores
pub fn suggested_file_name(client_name: &str, at: NaiveDateTime) -> String {
    format!(
        "acasalamento_{}_{}.pdf",
        client_name.trim().replace(' ', "_"),
        at.format("%Y%m%d_%H%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_suggested_file_name() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(14, 5, 0))
            .unwrap();
        assert_eq!(
            suggested_file_name("Fazenda Boa Vista", at),
            "acasalamento_Fazenda_Boa_Vista_20240307_1405.pdf"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ReportError::InvalidConfig("at least one column must be selected".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: at least one column must be selected"
        );
    }
}
