//! Splitting dataset rows into fixed-size pages
//!
//! The planner works on row counts only; it never looks at cell contents.

use crate::geometry::{Orientation, PageGeometry};
use crate::{ReportError, Result};
use std::ops::Range;

/// Capacity never drops below this many rows, whatever the font size
pub const MIN_ROWS_PER_PAGE: usize = 10;

/// Number of data rows that fit under the header row
///
/// `floor((available - header_height) / row_height)` where `available` is
/// the page height between the margins, floored at [`MIN_ROWS_PER_PAGE`].
pub fn max_rows_per_page(
    font_size: f64,
    page_height: f64,
    top_margin: f64,
    bottom_margin: f64,
    header_pad: f64,
    row_pad: f64,
) -> usize {
    let available = page_height - top_margin - bottom_margin;
    let header_height = font_size + header_pad;
    let row_height = font_size + row_pad;
    if row_height <= 0.0 {
        return MIN_ROWS_PER_PAGE;
    }

    let rows = ((available - header_height) / row_height).floor();
    if rows.is_finite() && rows > 0.0 {
        (rows as usize).max(MIN_ROWS_PER_PAGE)
    } else {
        MIN_ROWS_PER_PAGE
    }
}

/// `(font_size, max_rows)` pairs for a range of font sizes
pub fn capacity_table<I>(font_sizes: I, orientation: Orientation) -> Vec<(u32, usize)>
where
    I: IntoIterator<Item = u32>,
{
    font_sizes
        .into_iter()
        .map(|size| {
            let geometry = PageGeometry::new(orientation, size as f64);
            (size, geometry.max_rows_per_page())
        })
        .collect()
}

/// Rows shown on one output page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice {
    /// Dataset row indices `[start, end)`
    pub rows: Range<usize>,
    /// Empty rows appended after the real ones
    pub blank_rows: usize,
}

impl PageSlice {
    pub fn real_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Ordered page slices covering every dataset row exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationPlan {
    pub total_rows: usize,
    pub rows_per_page: usize,
    pub pages: Vec<PageSlice>,
}

impl PaginationPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether the last page was topped up with blank rows
    pub fn is_padded(&self) -> bool {
        self.pages.last().is_some_and(|p| p.blank_rows > 0)
    }
}

/// Split `total_rows` rows into pages of `rows_per_page`
///
/// With `pad_last_page` a short final page records how many blank rows bring
/// it up to `rows_per_page`. Zero rows gives zero pages.
pub fn plan(
    total_rows: usize,
    rows_per_page: usize,
    pad_last_page: bool,
) -> Result<PaginationPlan> {
    if rows_per_page == 0 {
        return Err(ReportError::InvalidConfig(
            "rows per page must be at least 1".to_string(),
        ));
    }

    let page_count = total_rows.div_ceil(rows_per_page);
    let pages = (0..page_count)
        .map(|p| {
            let start = p * rows_per_page;
            let end = (start + rows_per_page).min(total_rows);
            let blank_rows = if pad_last_page {
                rows_per_page - (end - start)
            } else {
                0
            };
            PageSlice {
                rows: start..end,
                blank_rows,
            }
        })
        .collect();

    Ok(PaginationPlan {
        total_rows,
        rows_per_page,
        pages,
    })
}
