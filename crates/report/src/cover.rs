//! Cover page

use crate::geometry::PageGeometry;
use crate::{ReportError, Result};
use pdf_core::{
    calculate_scaled_dimensions, get_dimensions, Align, Color, FontWeight, ImageScaleMode,
    PdfDocument, CM,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cover page design
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverTemplate {
    #[default]
    Empresarial,
    #[serde(rename = "Técnico", alias = "Tecnico")]
    Tecnico,
    Executivo,
}

impl CoverTemplate {
    pub fn title_lines(self) -> &'static [&'static str] {
        match self {
            CoverTemplate::Empresarial => &["RELATÓRIO DE ACASALAMENTO"],
            CoverTemplate::Tecnico => &["RELATÓRIO TÉCNICO", "ACASALAMENTO DE ANIMAIS"],
            CoverTemplate::Executivo => &["RELATÓRIO EXECUTIVO", "ACASALAMENTO"],
        }
    }

    pub fn title_size(self) -> f32 {
        match self {
            CoverTemplate::Empresarial => 36.0,
            CoverTemplate::Tecnico => 32.0,
            CoverTemplate::Executivo => 34.0,
        }
    }

    pub fn title_color(self) -> Color {
        match self {
            CoverTemplate::Empresarial => Color::from_rgb(0x1f, 0x77, 0xb4),
            CoverTemplate::Tecnico => Color::from_rgb(0x2c, 0x3e, 0x50),
            CoverTemplate::Executivo => Color::from_rgb(0x27, 0xae, 0x60),
        }
    }
}

impl fmt::Display for CoverTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CoverTemplate::Empresarial => "Empresarial",
            CoverTemplate::Tecnico => "Técnico",
            CoverTemplate::Executivo => "Executivo",
        })
    }
}

impl FromStr for CoverTemplate {
    type Err = ReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empresarial" => Ok(CoverTemplate::Empresarial),
            "técnico" | "tecnico" => Ok(CoverTemplate::Tecnico),
            "executivo" => Ok(CoverTemplate::Executivo),
            other => Err(ReportError::InvalidConfig(format!(
                "unknown cover template '{other}'"
            ))),
        }
    }
}

/// Text shown on the cover
#[derive(Debug, Clone, Default)]
pub struct CoverContent<'a> {
    pub client_name: &'a str,
    pub responsible_name: &'a str,
    pub contact_phone: &'a str,
    /// Already formatted as `dd/mm/yyyy`
    pub date: &'a str,
}

const CLIENT_SIZE: f32 = 26.0;
const INFO_SIZE: f32 = 14.0;
const DATE_SIZE: f32 = 16.0;
const LEADING: f64 = 1.2;
const LOGO_BOX: f64 = 8.0 * CM;

fn client_color() -> Color {
    Color::from_rgb(0x34, 0x49, 0x5e)
}

fn info_color() -> Color {
    Color::from_rgb(0x2c, 0x3e, 0x50)
}

/// Draw the cover on `page`, top to bottom and centred horizontally
///
/// The logo box shrinks when the full 8 cm would push the text past the
/// bottom margin.
pub fn draw_cover(
    doc: &mut PdfDocument,
    page: usize,
    geometry: &PageGeometry,
    template: CoverTemplate,
    content: &CoverContent<'_>,
    logo: Option<&[u8]>,
    family: &str,
) -> Result<()> {
    let center_x = geometry.page_width / 2.0;
    let info_lines = [
        ("Responsável pelo Acasalamento:", content.responsible_name),
        ("Telefone para Contato:", content.contact_phone),
    ];
    let info_count = info_lines.iter().filter(|(_, v)| !v.is_empty()).count();

    let title_size = template.title_size() as f64;
    let text_height = template.title_lines().len() as f64 * title_size * LEADING
        + 1.5 * CM
        + CLIENT_SIZE as f64 * LEADING
        + 1.0 * CM
        + info_count as f64 * INFO_SIZE as f64 * LEADING
        + 1.5 * CM
        + DATE_SIZE as f64 * LEADING;

    let mut y = geometry.top_margin + 3.0 * CM;

    if let Some(logo) = logo {
        let space = geometry.page_height - geometry.bottom_margin - y - text_height - 2.0 * CM;
        let box_size = LOGO_BOX.min(space);
        match get_dimensions(logo) {
            Ok(dims) if box_size > 0.0 => {
                let (w, h) = calculate_scaled_dimensions(
                    dims.width,
                    dims.height,
                    box_size,
                    box_size,
                    ImageScaleMode::FitBox,
                );
                match doc.insert_image(logo, page, center_x - w / 2.0, y, w, h) {
                    Ok(()) => y += h + 2.0 * CM,
                    Err(e) => {
                        tracing::warn!(error = %e, "cover logo could not be embedded, skipping it")
                    }
                }
            }
            Ok(_) => tracing::warn!("no room for the cover logo, skipping it"),
            Err(e) => {
                tracing::warn!(error = %e, "cover logo is not a JPEG or PNG image, skipping it")
            }
        }
    }

    doc.set_font(family, template.title_size())?;
    doc.set_font_weight(FontWeight::Bold);
    doc.set_text_color(template.title_color());
    for line in template.title_lines() {
        y += title_size;
        doc.insert_text(line, page, center_x, y, Align::Center)?;
        y += title_size * (LEADING - 1.0);
    }
    y += 1.5 * CM;

    doc.set_font_size(CLIENT_SIZE);
    doc.set_text_color(client_color());
    y += CLIENT_SIZE as f64;
    doc.insert_text(content.client_name, page, center_x, y, Align::Center)?;
    y += CLIENT_SIZE as f64 * (LEADING - 1.0) + 1.0 * CM;

    doc.set_font_size(INFO_SIZE);
    doc.set_text_color(info_color());
    for (label, value) in info_lines.iter().filter(|(_, v)| !v.is_empty()) {
        y += INFO_SIZE as f64;
        draw_label_value(doc, page, center_x, y, label, value)?;
        y += INFO_SIZE as f64 * (LEADING - 1.0);
    }
    y += 1.5 * CM;

    doc.set_font_weight(FontWeight::Regular);
    doc.set_font_size(DATE_SIZE);
    doc.set_text_color(Color::gray(0.5));
    y += DATE_SIZE as f64;
    doc.insert_text(&format!("Data: {}", content.date), page, center_x, y, Align::Center)?;

    Ok(())
}

/// Bold label followed by a regular value, centred as one line
fn draw_label_value(
    doc: &mut PdfDocument,
    page: usize,
    center_x: f64,
    y: f64,
    label: &str,
    value: &str,
) -> Result<()> {
    let value = format!(" {value}");
    doc.set_font_weight(FontWeight::Bold);
    let label_width = doc.text_width(label)?;
    doc.set_font_weight(FontWeight::Regular);
    let value_width = doc.text_width(&value)?;

    let start_x = center_x - (label_width + value_width) / 2.0;
    doc.set_font_weight(FontWeight::Bold);
    doc.insert_text(label, page, start_x, y, Align::Left)?;
    doc.set_font_weight(FontWeight::Regular);
    doc.insert_text(&value, page, start_x + label_width, y, Align::Left)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_titles() {
        assert_eq!(CoverTemplate::Empresarial.title_lines(), &["RELATÓRIO DE ACASALAMENTO"]);
        assert_eq!(CoverTemplate::Tecnico.title_lines().len(), 2);
        assert_eq!(CoverTemplate::Executivo.title_size(), 34.0);
        assert_eq!(CoverTemplate::Tecnico.title_color(), Color::from_hex("#2c3e50").unwrap());
    }

    #[test]
    fn test_template_serde_names() {
        let parsed: CoverTemplate = serde_json::from_str("\"Técnico\"").unwrap();
        assert_eq!(parsed, CoverTemplate::Tecnico);
        let parsed: CoverTemplate = serde_json::from_str("\"Tecnico\"").unwrap();
        assert_eq!(parsed, CoverTemplate::Tecnico);
        assert_eq!(serde_json::to_string(&CoverTemplate::Tecnico).unwrap(), "\"Técnico\"");
    }

    #[test]
    fn test_template_from_str() {
        assert_eq!("executivo".parse::<CoverTemplate>().unwrap(), CoverTemplate::Executivo);
        assert_eq!("TÉCNICO".parse::<CoverTemplate>().unwrap(), CoverTemplate::Tecnico);
        assert!("Moderno".parse::<CoverTemplate>().is_err());
        assert_eq!(CoverTemplate::Tecnico.to_string(), "Técnico");
    }
}
