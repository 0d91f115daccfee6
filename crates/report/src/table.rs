//! Data table layout and drawing

use crate::geometry::PageGeometry;
use crate::Result;
use pdf_core::{fit_text, Align, Color, FontFace, FontWeight, PdfDocument};

/// Horizontal padding on each side of a cell
pub const CELL_PADDING: f64 = 4.0;

const GRID_WIDTH: f64 = 0.5;

/// Colours used for the table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub header_background: Color,
    pub header_text: Color,
    pub body_text: Color,
    pub grid: Color,
    /// Background of every other data row, starting with the second
    pub zebra: Option<Color>,
}

impl TableStyle {
    pub fn new(zebra_rows: bool) -> Self {
        Self {
            header_background: Color::from_rgb(0x1f, 0x77, 0xb4),
            // whitesmoke
            header_text: Color::from_rgb(0xf5, 0xf5, 0xf5),
            body_text: Color::black(),
            grid: Color::gray(0.5),
            zebra: zebra_rows.then(|| Color::from_rgb(0xf0, 0xf0, 0xf0)),
        }
    }
}

impl Default for TableStyle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Column positions shared by every page of the table
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    /// Left edge of the table
    pub x: f64,
    pub column_widths: Vec<f64>,
}

impl TableLayout {
    /// Size columns to their widest cell, scaled down to the usable width
    ///
    /// Widths are measured over all rows so that every page lines up.
    pub fn compute(
        headers: &[String],
        rows: &[Vec<String>],
        regular: &FontFace,
        bold: &FontFace,
        geometry: &PageGeometry,
    ) -> Self {
        let font_size = geometry.font_size as f32;
        let mut widths: Vec<f64> = headers
            .iter()
            .map(|h| bold.text_width_points(h, font_size) as f64)
            .collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = width.max(regular.text_width_points(cell, font_size) as f64);
            }
        }
        for width in &mut widths {
            *width += 2.0 * CELL_PADDING;
        }

        let total: f64 = widths.iter().sum();
        let usable = geometry.usable_width();
        if total > usable {
            let scale = usable / total;
            for width in &mut widths {
                *width *= scale;
            }
            Self {
                x: geometry.left_margin,
                column_widths: widths,
            }
        } else {
            Self {
                x: geometry.left_margin + (usable - total) / 2.0,
                column_widths: widths,
            }
        }
    }

    pub fn total_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    /// Left edge of each column
    fn column_lefts(&self) -> impl Iterator<Item = f64> + '_ {
        self.column_widths.iter().scan(self.x, |left, width| {
            let current = *left;
            *left += width;
            Some(current)
        })
    }
}

/// Everything needed to draw one page of the table
pub struct TablePage<'a> {
    pub headers: &'a [String],
    pub rows: &'a [Vec<String>],
    pub blank_rows: usize,
}

/// Draw the header row and data rows starting at the top margin
pub fn draw_table_page(
    doc: &mut PdfDocument,
    page: usize,
    geometry: &PageGeometry,
    layout: &TableLayout,
    style: &TableStyle,
    table: &TablePage<'_>,
    family: &str,
) -> Result<()> {
    let font_size = geometry.font_size as f32;
    let header_height = geometry.header_row_height();
    let row_height = geometry.data_row_height();
    let top = geometry.top_margin;
    let total_rows = table.rows.len() + table.blank_rows;

    // Backgrounds first so text and grid sit on top
    doc.fill_rect(
        page,
        layout.x,
        top,
        layout.total_width(),
        header_height,
        style.header_background,
    )?;
    if let Some(zebra) = style.zebra {
        for i in (1..total_rows).step_by(2) {
            let y = top + header_height + i as f64 * row_height;
            doc.fill_rect(page, layout.x, y, layout.total_width(), row_height, zebra)?;
        }
    }

    doc.set_font(family, font_size)?;
    doc.set_font_weight(FontWeight::Bold);
    doc.set_text_color(style.header_text);
    draw_row(doc, page, layout, table.headers, top, header_height, font_size)?;

    doc.set_font_weight(FontWeight::Regular);
    doc.set_text_color(style.body_text);
    for (i, row) in table.rows.iter().enumerate() {
        let y = top + header_height + i as f64 * row_height;
        draw_row(doc, page, layout, row, y, row_height, font_size)?;
    }

    // Grid over every cell, blank rows included
    for (i, left) in layout.column_lefts().enumerate() {
        let width = layout.column_widths[i];
        doc.stroke_rect(page, left, top, width, header_height, style.grid, GRID_WIDTH)?;
        for r in 0..total_rows {
            let y = top + header_height + r as f64 * row_height;
            doc.stroke_rect(page, left, y, width, row_height, style.grid, GRID_WIDTH)?;
        }
    }

    Ok(())
}

/// Centred cell text, truncated to the column width
fn draw_row(
    doc: &mut PdfDocument,
    page: usize,
    layout: &TableLayout,
    cells: &[String],
    top: f64,
    height: f64,
    font_size: f32,
) -> Result<()> {
    // Baseline that centres cap-height text vertically
    let baseline = top + height / 2.0 + font_size as f64 * 0.35;
    let lefts: Vec<f64> = layout.column_lefts().collect();
    for ((cell, left), width) in cells.iter().zip(lefts).zip(&layout.column_widths) {
        let available = width - 2.0 * CELL_PADDING;
        let text = fit_text(doc.current_face()?, cell.trim(), font_size, available);
        doc.insert_text(&text, page, left + width / 2.0, baseline, Align::Center)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;
    use pdf_core::{FontFamily, StandardFont};
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn faces() -> (FontFace, FontFace) {
        (
            FontFace::Standard(StandardFont::Helvetica),
            FontFace::Standard(StandardFont::HelveticaBold),
        )
    }

    #[test]
    fn test_narrow_table_is_centred() {
        let geometry = PageGeometry::new(Orientation::Landscape, 10.0);
        let (regular, bold) = faces();
        let headers = strings(&["ID", "NAAB"]);
        let rows = vec![strings(&["1021", "7HO12345"])];
        let layout = TableLayout::compute(&headers, &rows, &regular, &bold, &geometry);

        let id_width = regular.text_width_points("1021", 10.0) as f64 + 8.0;
        assert!((layout.column_widths[0] - id_width).abs() < 1e-6);
        let centred_x =
            geometry.left_margin + (geometry.usable_width() - layout.total_width()) / 2.0;
        assert!((layout.x - centred_x).abs() < 1e-6);
    }

    #[test]
    fn test_wide_table_scales_to_usable_width() {
        let geometry = PageGeometry::new(Orientation::Portrait, 10.0);
        let (regular, bold) = faces();
        let long = "X".repeat(60);
        let headers = strings(&["A", "B", "C"]);
        let rows = vec![vec![long.clone(), long.clone(), "curto".to_string()]];
        let layout = TableLayout::compute(&headers, &rows, &regular, &bold, &geometry);

        assert!((layout.total_width() - geometry.usable_width()).abs() < 1e-6);
        assert_eq!(layout.x, geometry.left_margin);
        assert!((layout.column_widths[0] - layout.column_widths[1]).abs() < 1e-9);
        assert!(layout.column_widths[2] < layout.column_widths[0]);
    }

    #[test]
    fn test_column_lefts_accumulate() {
        let layout = TableLayout {
            x: 10.0,
            column_widths: vec![5.0, 7.0, 3.0],
        };
        assert_eq!(layout.column_lefts().collect::<Vec<_>>(), vec![10.0, 15.0, 22.0]);
        assert_eq!(layout.total_width(), 15.0);
    }

    #[test]
    fn test_style_zebra_toggle() {
        assert!(TableStyle::new(true).zebra.is_some());
        assert!(TableStyle::new(false).zebra.is_none());
    }

    #[test]
    fn test_draw_table_page_with_blank_rows() {
        let geometry = PageGeometry::new(Orientation::Landscape, 10.0);
        let mut doc = PdfDocument::new();
        doc.register_font_family("report", FontFamily::helvetica()).unwrap();
        let page = doc.add_page(geometry.page_size());

        let headers = strings(&["ID animal", "Tipo sêmen"]);
        let rows = vec![strings(&["1021", "C"])];
        let (regular, bold) = faces();
        let layout = TableLayout::compute(&headers, &rows, &regular, &bold, &geometry);
        let table = TablePage {
            headers: &headers,
            rows: &rows,
            blank_rows: 3,
        };
        draw_table_page(
            &mut doc,
            page,
            &geometry,
            &layout,
            &TableStyle::default(),
            &table,
            "report",
        )
        .unwrap();

        assert_eq!(doc.page_count(), 1);
        assert!(doc.to_bytes().is_ok());
    }
}
