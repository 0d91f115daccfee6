//! Vector drawing operators (rectangles and lines)
//!
//! All coordinates here are PDF coordinates: origin at the bottom-left.

use crate::document::Color;

/// Filled rectangle with no stroke
pub fn fill_rect_operators(x: f64, y: f64, width: f64, height: f64, color: Color) -> Vec<u8> {
    format!(
        "q\n{} {} {} rg\n{x} {y} {width} {height} re\nf\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

/// Rectangle outline
pub fn stroke_rect_operators(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: Color,
    line_width: f64,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{line_width} w\n{x} {y} {width} {height} re\nS\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

/// Straight line segment
pub fn line_operators(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    color: Color,
    line_width: f64,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{line_width} w\n{x1} {y1} m\n{x2} {y2} l\nS\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}
