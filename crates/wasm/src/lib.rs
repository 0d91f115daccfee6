//! WASM bindings for the acasalamento report generator
//!
//! This crate provides JavaScript-friendly API for:
//! - Loading an uploaded CSV once per session
//! - Showing the friendly column labels and page capacity
//! - Generating the report PDF from a form configuration
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { ReportSession, maxRowsPerPage } from 'acasalamento-wasm';
//!
//! await init();
//!
//! const session = ReportSession.fromCsv(csvBytes, 'auto');
//! console.log(session.headers(), session.rowCount());
//! console.log(session.headers(['Vaca', 'Sêmen'])); // same as columnLabels
//! console.log(maxRowsPerPage(10, 'landscape')); // 26
//!
//! session.setCoverLogo(logoBytes);
//! const pdf = session.generate({ clientName: 'Fazenda Boa Vista', fontSize: 10 });
//! ```

use chrono::NaiveDate;
use herd_data::{CsvOptions, Dataset, Relabeler, TextEncoding};
use report::{Orientation, PageGeometry, ReportAssets, ReportConfig};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One uploaded dataset plus the logos chosen for it
#[wasm_bindgen]
pub struct ReportSession {
    dataset: Dataset,
    assets: ReportAssets,
}

#[wasm_bindgen]
impl ReportSession {
    /// Load a CSV upload
    ///
    /// @param data - CSV file bytes (Uint8Array)
    /// @param encoding - "utf8", "latin1" or "auto" (default)
    /// @returns ReportSession instance
    #[wasm_bindgen(js_name = fromCsv)]
    pub fn from_csv(data: &[u8], encoding: Option<String>) -> Result<ReportSession, JsValue> {
        let encoding = match encoding.as_deref() {
            Some(name) => name.parse::<TextEncoding>().map_err(js_error)?,
            None => TextEncoding::Auto,
        };
        let options = CsvOptions {
            encoding,
            delimiter: None,
        };
        let dataset = Dataset::from_bytes(data, &options).map_err(js_error)?;
        Ok(ReportSession {
            dataset,
            assets: ReportAssets::default(),
        })
    }

    /// Column labels as the report will show them
    ///
    /// Pass the form's `columnLabels` so the preview matches the names
    /// `selectedColumns` is resolved against.
    ///
    /// @param labels - Explicit labels by position (optional)
    pub fn headers(&self, labels: Option<Vec<String>>) -> Result<Vec<String>, JsValue> {
        let relabeler = labels.map_or(Relabeler::Heuristic, Relabeler::Positional);
        relabeler.relabel(self.dataset.headers()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = rowCount)]
    pub fn row_count(&self) -> usize {
        self.dataset.len()
    }

    /// @param data - PNG or JPEG bytes, or undefined to remove the logo
    #[wasm_bindgen(js_name = setCoverLogo)]
    pub fn set_cover_logo(&mut self, data: Option<Vec<u8>>) {
        self.assets.cover_logo = data;
    }

    /// Small logo repeated in the corner of every page
    #[wasm_bindgen(js_name = setBrandLogo)]
    pub fn set_brand_logo(&mut self, data: Option<Vec<u8>>) {
        self.assets.brand_logo = data;
    }

    /// Replace Helvetica with TrueType fonts
    ///
    /// @param regular - TTF bytes for the regular face
    /// @param bold - TTF bytes for the bold face (optional)
    #[wasm_bindgen(js_name = setFonts)]
    pub fn set_fonts(&mut self, regular: Vec<u8>, bold: Option<Vec<u8>>) {
        self.assets.regular_font = Some(regular);
        self.assets.bold_font = bold;
    }

    /// Generate the report PDF
    ///
    /// File paths in the configuration are ignored; logos and fonts come
    /// from the setters above.
    ///
    /// @param config - Report configuration object (camelCase keys)
    /// @returns PDF bytes (Uint8Array)
    pub fn generate(&self, config: JsValue) -> Result<Vec<u8>, JsValue> {
        let config: ReportConfig = if config.is_undefined() || config.is_null() {
            ReportConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        report::generate_report_on(&self.dataset, &config, &self.assets, today()?)
            .map_err(js_error)
    }
}

/// Browser-local date; the system clock is not available in wasm32
fn today() -> Result<NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("invalid browser date"))
}

/// Rows that fit on one page
///
/// @param fontSize - Table font size in points
/// @param orientation - "landscape" or "portrait"
#[wasm_bindgen(js_name = maxRowsPerPage)]
pub fn max_rows_per_page(font_size: u32, orientation: &str) -> Result<usize, JsValue> {
    let orientation: Orientation = orientation.parse().map_err(js_error)?;
    Ok(PageGeometry::new(orientation, font_size as f64).max_rows_per_page())
}

/// Friendly labels for raw export headers
///
/// @param headers - Raw header names
/// @param labels - Explicit labels by position (optional)
#[wasm_bindgen(js_name = relabelHeaders)]
pub fn relabel_headers(
    headers: Vec<String>,
    labels: Option<Vec<String>>,
) -> Result<Vec<String>, JsValue> {
    let relabeler = labels.map_or(Relabeler::Heuristic, Relabeler::Positional);
    relabeler.relabel(&headers).map_err(js_error)
}
