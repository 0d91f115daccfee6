//! Page geometry for report pages

use crate::planner::max_rows_per_page;
use crate::ReportError;
use pdf_core::{PageSize, CM};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Padding added to the font size for the table header row
pub const HEADER_ROW_PADDING: f64 = 12.0;

/// Padding added to the font size for each data row
pub const DATA_ROW_PADDING: f64 = 6.0;

/// Page orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    /// A4 in this orientation
    pub fn page_size(self) -> PageSize {
        match self {
            Orientation::Landscape => PageSize::A4.landscape(),
            Orientation::Portrait => PageSize::A4.portrait(),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Landscape => f.write_str("landscape"),
            Orientation::Portrait => f.write_str("portrait"),
        }
    }
}

impl FromStr for Orientation {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landscape" | "paisagem" => Ok(Orientation::Landscape),
            "portrait" | "retrato" => Ok(Orientation::Portrait),
            other => Err(ReportError::InvalidConfig(format!(
                "unknown orientation '{other}'"
            ))),
        }
    }
}

/// Page and table metrics derived from orientation and font size
///
/// All lengths are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    pub header_pad: f64,
    pub row_pad: f64,
    pub font_size: f64,
}

impl PageGeometry {
    /// A4 with the report margins: 3 cm top, 2.5 cm bottom, 2 cm sides
    pub fn new(orientation: Orientation, font_size: f64) -> Self {
        let size = orientation.page_size();
        Self {
            page_width: size.width,
            page_height: size.height,
            top_margin: 3.0 * CM,
            bottom_margin: 2.5 * CM,
            left_margin: 2.0 * CM,
            right_margin: 2.0 * CM,
            header_pad: HEADER_ROW_PADDING,
            row_pad: DATA_ROW_PADDING,
            font_size,
        }
    }

    pub fn page_size(&self) -> PageSize {
        PageSize {
            width: self.page_width,
            height: self.page_height,
        }
    }

    pub fn header_row_height(&self) -> f64 {
        self.font_size + self.header_pad
    }

    pub fn data_row_height(&self) -> f64 {
        self.font_size + self.row_pad
    }

    /// Width between the left and right margins
    pub fn usable_width(&self) -> f64 {
        self.page_width - self.left_margin - self.right_margin
    }

    /// How many data rows fit under the header row on one page
    pub fn max_rows_per_page(&self) -> usize {
        max_rows_per_page(
            self.font_size,
            self.page_height,
            self.top_margin,
            self.bottom_margin,
            self.header_pad,
            self.row_pad,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_landscape_a4_metrics() {
        let geometry = PageGeometry::new(Orientation::Landscape, 10.0);
        assert!((geometry.page_width - 841.8898).abs() < 1e-3);
        assert!((geometry.page_height - 595.2756).abs() < 1e-3);
        assert!((geometry.top_margin - 85.0394).abs() < 1e-3);
        assert!((geometry.bottom_margin - 70.8661).abs() < 1e-3);
        assert_eq!(geometry.header_row_height(), 22.0);
        assert_eq!(geometry.data_row_height(), 16.0);
    }

    #[test]
    fn test_capacity_at_font_10() {
        assert_eq!(PageGeometry::new(Orientation::Landscape, 10.0).max_rows_per_page(), 26);
        assert_eq!(PageGeometry::new(Orientation::Portrait, 10.0).max_rows_per_page(), 41);
    }

    #[test]
    fn test_usable_width() {
        let geometry = PageGeometry::new(Orientation::Portrait, 10.0);
        assert!((geometry.usable_width() - (595.2756 - 4.0 * CM)).abs() < 1e-3);
    }

    #[test]
    fn test_orientation_parsing() {
        assert_eq!("Landscape".parse::<Orientation>().unwrap(), Orientation::Landscape);
        assert_eq!("retrato".parse::<Orientation>().unwrap(), Orientation::Portrait);
        assert!("sideways".parse::<Orientation>().is_err());
        assert_eq!(Orientation::Portrait.to_string(), "portrait");
    }
}
