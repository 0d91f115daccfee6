//! PDF Core - Low-level PDF building
//!
//! This crate provides functionality for:
//! - Creating PDF documents page by page
//! - Using the built-in Helvetica fonts or embedding subset TrueType fonts
//! - Inserting text at specific coordinates (plain or rotated)
//! - Drawing filled/stroked rectangles and lines
//! - Inserting images (JPEG, PNG)
//!
//! Coordinates passed to [`PdfDocument`] are in points with the origin at the
//! top-left corner of the page; conversion to PDF bottom-left coordinates
//! happens inside the document.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontFamily, PageSize, PdfDocument};
//!
//! let mut doc = PdfDocument::new();
//! doc.register_font_family("helvetica", FontFamily::helvetica())?;
//! let page = doc.add_page(PageSize::A4.landscape());
//! doc.set_font("helvetica", 12.0)?;
//! doc.insert_text("Olá, mundo!", page, 100.0, 100.0, Align::Left)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod graphics;
mod image;
mod standard;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::{FontData, FontFace, FontFamily, FontFamilyBuilder, FontWeight};
pub use graphics::{fill_rect_operators, line_operators, stroke_rect_operators};
pub use crate::image::{
    calculate_scaled_dimensions, get_dimensions, ImageDimensions, ImageScaleMode,
};
pub use standard::StandardFont;
pub use text::{
    fit_text, generate_rotated_text_operators, generate_text_operators, TextRenderContext,
};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Font subset error: {0}")]
    FontSubsetError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Points per centimetre
pub const CM: f64 = 72.0 / 2.54;
