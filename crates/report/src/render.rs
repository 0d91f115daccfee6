//! Two-phase report rendering
//!
//! [`compose`] turns a pagination plan into an ordered list of page blocks.
//! [`Renderer::render`] then draws them once the total page count is known,
//! so every footer can say "Página X de Y".

use crate::config::ReportConfig;
use crate::cover::{draw_cover, CoverContent};
use crate::geometry::PageGeometry;
use crate::planner::{PageSlice, PaginationPlan};
use crate::table::{draw_table_page, TableLayout, TablePage, TableStyle};
use crate::{ReportError, Result};
use herd_data::Dataset;
use pdf_core::{
    Align, Color, FontFamily, FontFamilyBuilder, FontWeight, ImageScaleMode, PdfDocument, CM,
};
use std::path::Path;

/// Font family name registered on every report document
pub const FONT_FAMILY: &str = "report";

const HEADER_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 9.0;
const WATERMARK_SIZE: f32 = 60.0;
const WATERMARK_ANGLE: f64 = 45.0;
const BRAND_LOGO_BOX: f64 = 1.5 * CM;

/// One output page, before page numbers are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBlock {
    Cover,
    Table { slice: PageSlice },
}

/// Cover first, then one table page per plan slice
pub fn compose(plan: &PaginationPlan) -> Vec<PageBlock> {
    std::iter::once(PageBlock::Cover)
        .chain(
            plan.pages
                .iter()
                .cloned()
                .map(|slice| PageBlock::Table { slice }),
        )
        .collect()
}

/// Binary inputs of a report, already read into memory
#[derive(Debug, Clone, Default)]
pub struct ReportAssets {
    pub cover_logo: Option<Vec<u8>>,
    pub brand_logo: Option<Vec<u8>>,
    /// TrueType replacement for Helvetica
    pub regular_font: Option<Vec<u8>>,
    pub bold_font: Option<Vec<u8>>,
}

impl ReportAssets {
    /// Read the files named in the configuration
    ///
    /// A logo that cannot be read is logged and left out. Font files are
    /// required once configured.
    pub fn load(config: &ReportConfig) -> Result<Self> {
        Ok(Self {
            cover_logo: config.logo_image_path.as_deref().and_then(read_optional),
            brand_logo: config.brand_logo_path.as_deref().and_then(read_optional),
            regular_font: config.font_path.as_deref().map(read_required).transpose()?,
            bold_font: config.bold_font_path.as_deref().map(read_required).transpose()?,
        })
    }

    /// Helvetica unless a TrueType regular face was supplied
    pub fn font_family(&self) -> Result<FontFamily> {
        match &self.regular_font {
            Some(regular) => {
                let mut builder = FontFamilyBuilder::new().regular(regular.clone());
                if let Some(bold) = &self.bold_font {
                    builder = builder.bold(bold.clone());
                }
                Ok(builder.build(FONT_FAMILY)?)
            }
            None => Ok(FontFamily::helvetica()),
        }
    }
}

fn read_optional(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "logo not found, continuing without it"
            );
            None
        }
    }
}

fn read_required(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| ReportError::Asset {
        path: path.to_path_buf(),
        source,
    })
}

/// Draws composed page blocks for one (already projected) dataset
pub struct Renderer<'a> {
    pub dataset: &'a Dataset,
    pub config: &'a ReportConfig,
    pub assets: &'a ReportAssets,
    pub geometry: PageGeometry,
    /// Generation date as `dd/mm/yyyy`
    pub date: String,
}

impl Renderer<'_> {
    pub fn render(&self, blocks: &[PageBlock]) -> Result<PdfDocument> {
        let family = self.assets.font_family()?;
        let layout = TableLayout::compute(
            self.dataset.headers(),
            self.dataset.rows(),
            family.get_variant(FontWeight::Regular),
            family.get_variant(FontWeight::Bold),
            &self.geometry,
        );
        let style = TableStyle::new(self.config.zebra_rows);

        let mut doc = PdfDocument::new();
        doc.register_font_family(FONT_FAMILY, family)?;

        let data_pages = blocks
            .iter()
            .filter(|b| matches!(b, PageBlock::Table { .. }))
            .count();
        let mut brand_logo = self.assets.brand_logo.as_deref();
        let mut data_page = 0;

        for block in blocks {
            let page = doc.add_page(self.geometry.page_size());
            self.draw_watermark(&mut doc, page)?;

            match block {
                PageBlock::Cover => {
                    let content = CoverContent {
                        client_name: &self.config.client_name,
                        responsible_name: &self.config.responsible_name,
                        contact_phone: &self.config.contact_phone,
                        date: &self.date,
                    };
                    draw_cover(
                        &mut doc,
                        page,
                        &self.geometry,
                        self.config.cover_template,
                        &content,
                        self.assets.cover_logo.as_deref(),
                        FONT_FAMILY,
                    )?;
                }
                PageBlock::Table { slice } => {
                    data_page += 1;
                    let table = TablePage {
                        headers: self.dataset.headers(),
                        rows: &self.dataset.rows()[slice.rows.clone()],
                        blank_rows: slice.blank_rows,
                    };
                    draw_table_page(
                        &mut doc,
                        page,
                        &self.geometry,
                        &layout,
                        &style,
                        &table,
                        FONT_FAMILY,
                    )?;
                    self.draw_running_header(&mut doc, page)?;
                    self.draw_footer(&mut doc, page, data_page, data_pages)?;
                }
            }

            if let Some(logo) = brand_logo {
                if let Err(e) = doc.insert_image_scaled(
                    logo,
                    page,
                    2.0 * CM,
                    1.0 * CM,
                    BRAND_LOGO_BOX,
                    BRAND_LOGO_BOX,
                    ImageScaleMode::FitBox,
                ) {
                    tracing::warn!(error = %e, "brand logo could not be embedded, skipping it");
                    brand_logo = None;
                }
            }
        }

        Ok(doc)
    }

    fn draw_watermark(&self, doc: &mut PdfDocument, page: usize) -> Result<()> {
        let Some(text) = self.config.watermark_text.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        doc.set_font(FONT_FAMILY, WATERMARK_SIZE)?;
        doc.set_font_weight(FontWeight::Bold);
        doc.set_text_color(Color::gray(0.85));
        doc.insert_rotated_text(
            text,
            page,
            self.geometry.page_width / 2.0,
            self.geometry.page_height / 2.0,
            WATERMARK_ANGLE,
        )?;
        Ok(())
    }

    fn draw_running_header(&self, doc: &mut PdfDocument, page: usize) -> Result<()> {
        let g = &self.geometry;
        doc.set_font(FONT_FAMILY, HEADER_SIZE)?;
        doc.set_font_weight(FontWeight::Regular);
        doc.set_text_color(Color::black());

        doc.insert_text(&self.config.header_left_text, page, 4.0 * CM, 2.0 * CM, Align::Left)?;
        let right = self
            .config
            .header_right_text
            .as_deref()
            .unwrap_or(self.date.as_str());
        doc.insert_text(right, page, g.page_width - 2.0 * CM, 2.0 * CM, Align::Right)?;

        doc.draw_line(
            page,
            g.left_margin,
            2.7 * CM,
            g.page_width - g.right_margin,
            2.7 * CM,
            Color::gray(0.5),
            0.5,
        )?;
        Ok(())
    }

    fn draw_footer(
        &self,
        doc: &mut PdfDocument,
        page: usize,
        number: usize,
        total: usize,
    ) -> Result<()> {
        doc.set_font(FONT_FAMILY, FOOTER_SIZE)?;
        doc.set_font_weight(FontWeight::Regular);
        doc.set_text_color(Color::black());
        doc.insert_text(
            &page_label(number, total),
            page,
            self.geometry.page_width / 2.0,
            self.geometry.page_height - 1.5 * CM,
            Align::Center,
        )?;
        Ok(())
    }
}

/// Footer text for data page `number` of `total`
pub fn page_label(number: usize, total: usize) -> String {
    format!("Página {number} de {total}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compose_puts_cover_first() {
        let blocks = compose(&plan(95, 30, true).unwrap());
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0], PageBlock::Cover);
        assert_eq!(
            blocks[4],
            PageBlock::Table {
                slice: PageSlice {
                    rows: 90..95,
                    blank_rows: 25
                }
            }
        );
    }

    #[test]
    fn test_compose_empty_plan_is_cover_only() {
        assert_eq!(compose(&plan(0, 30, true).unwrap()), vec![PageBlock::Cover]);
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(1, 4), "Página 1 de 4");
    }

    #[test]
    fn test_default_assets_use_helvetica() {
        let family = ReportAssets::default().font_family().unwrap();
        assert_eq!(family.get_variant(FontWeight::Bold).name(), "Helvetica-Bold");
    }

    #[test]
    fn test_missing_logo_is_skipped_but_missing_font_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            logo_image_path: Some(dir.path().join("logo.png")),
            ..Default::default()
        };
        let assets = ReportAssets::load(&config).unwrap();
        assert!(assets.cover_logo.is_none());

        let config = ReportConfig {
            font_path: Some(dir.path().join("font.ttf")),
            ..Default::default()
        };
        assert!(matches!(
            ReportAssets::load(&config),
            Err(ReportError::Asset { .. })
        ));
    }
}
