//! Text rendering utilities

use crate::document::Color;
use crate::font::FontFace;
use crate::Align;

const ELLIPSIS: char = '…';

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators for text insertion
///
/// Creates the text operators (BT, rg, Tf, Td, Tj, ET) to render text at a
/// position in PDF coordinates. `x` is the anchor point: the left edge,
/// centre or right edge of the text depending on `align`.
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let x_offset = match align {
        Align::Left => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };
    let final_x = x + x_offset;

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");
    ops.into_bytes()
}

/// Generate operators for text rotated counter-clockwise around its centre
///
/// `(cx, cy)` is the centre of the text in PDF coordinates.
pub fn generate_rotated_text_operators(
    text_hex: &str,
    cx: f64,
    cy: f64,
    angle_degrees: f64,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    // Shift the origin back by half the text width along the baseline
    let half = ctx.text_width / 2.0;
    let x = cx - half * cos;
    let y = cy - half * sin;

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!(
        "{cos:.4} {sin:.4} {:.4} {cos:.4} {x:.2} {y:.2} Tm\n",
        -sin
    ));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");
    ops.into_bytes()
}

/// Shorten `text` with a trailing ellipsis so it fits in `max_width` points
///
/// Text that already fits is returned unchanged. If not even the ellipsis
/// fits, the result is empty.
pub fn fit_text(face: &FontFace, text: &str, font_size: f32, max_width: f64) -> String {
    if face.text_width_points(text, font_size) as f64 <= max_width {
        return text.to_string();
    }

    let ellipsis_width = face.text_width_points(&ELLIPSIS.to_string(), font_size) as f64;
    if ellipsis_width > max_width {
        return String::new();
    }

    let mut fitted = String::new();
    let mut width = ellipsis_width;
    for c in text.chars() {
        let char_width = face.text_width_points(c.encode_utf8(&mut [0; 4]), font_size) as f64;
        if width + char_width > max_width {
            break;
        }
        width += char_width;
        fitted.push(c);
    }

    let mut fitted = fitted.trim_end().to_string();
    fitted.push(ELLIPSIS);
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::StandardFont;
    use pretty_assertions::assert_eq;

    fn ctx(font_name: &str, font_size: f32, text_width: f64) -> TextRenderContext {
        TextRenderContext {
            font_name: font_name.to_string(),
            font_size,
            text_width,
            color: Color::black(),
        }
    }

    #[test]
    fn test_generate_text_operators_left() {
        let context = ctx("F1", 12.0, 100.0);
        let ops = generate_text_operators("<48656C6C6F>", 100.0, 700.0, Align::Left, &context);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("<48656C6C6F> Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_generate_text_operators_center() {
        let context = ctx("F2", 14.0, 100.0);
        let ops = generate_text_operators("<54657374>", 200.0, 600.0, Align::Center, &context);
        let ops_str = String::from_utf8(ops).unwrap();
        assert!(ops_str.contains("/F2 14 Tf"));
        assert!(ops_str.contains("150 600 Td")); // 200 - 50
    }

    #[test]
    fn test_generate_text_operators_right() {
        let context = ctx("F3", 16.0, 80.0);
        let ops = generate_text_operators("<5269676874>", 300.0, 500.0, Align::Right, &context);
        let ops_str = String::from_utf8(ops).unwrap();
        assert!(ops_str.contains("220 500 Td")); // 300 - 80
    }

    #[test]
    fn test_generate_text_operators_with_color() {
        let mut context = ctx("F1", 12.0, 10.0);
        context.color = Color::from_hex("#1f77b4").unwrap();
        let ops = generate_text_operators("<41>", 0.0, 0.0, Align::Left, &context);
        let ops = String::from_utf8(ops).unwrap();
        let expected = format!("{} {} {} rg", 31.0f32 / 255.0, 119.0f32 / 255.0, 180.0f32 / 255.0);
        assert!(ops.contains(&expected));
    }

    #[test]
    fn test_rotated_text_uses_text_matrix() {
        let context = ctx("F1", 60.0, 0.0);
        let ops = generate_rotated_text_operators("<41>", 100.0, 100.0, 45.0, &context);
        let ops_str = String::from_utf8(ops).unwrap();
        assert!(ops_str.contains("0.7071 0.7071 -0.7071 0.7071 100.00 100.00 Tm"));
        assert!(!ops_str.contains(" Td"));
    }

    #[test]
    fn test_rotated_text_is_centred() {
        let ops = generate_rotated_text_operators("<41>", 100.0, 50.0, 0.0, &ctx("F1", 10.0, 40.0));
        let ops_str = String::from_utf8(ops).unwrap();
        assert!(ops_str.contains("80.00 50.00 Tm"));
    }

    #[test]
    fn test_fit_text_unchanged_when_it_fits() {
        let face = FontFace::Standard(StandardFont::Helvetica);
        assert_eq!(fit_text(&face, "Nelore", 10.0, 100.0), "Nelore");
    }

    #[test]
    fn test_fit_text_truncates_with_ellipsis() {
        let face = FontFace::Standard(StandardFont::Helvetica);
        let text = "Fazenda Santa Maria do Rio Verde";
        let fitted = fit_text(&face, text, 10.0, 60.0);

        assert!(fitted.ends_with('…'));
        assert!(fitted.len() < text.len());
        assert!(face.text_width_points(&fitted, 10.0) as f64 <= 60.0);
    }

    #[test]
    fn test_fit_text_too_narrow_for_ellipsis() {
        let face = FontFace::Standard(StandardFont::Helvetica);
        assert_eq!(fit_text(&face, "ABC", 10.0, 1.0), "");
    }
}
