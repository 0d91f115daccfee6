//! Font handling for PDF documents
//!
//! A [`FontFamily`] holds a regular face and an optional bold face. Each face
//! is either one of the built-in standard fonts or an embedded TrueType font.

use crate::standard::StandardFont;
use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::{BTreeMap, HashMap};

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font data structure for embedded TrueType fonts
///
/// Only the glyphs that were actually encoded end up in the PDF. Glyph ids
/// are renumbered as text is encoded (`.notdef` stays 0, then first use
/// order), so content streams already carry subset ids when the font is
/// written.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier, also used as `BaseFont`
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters shown with this font and their subset glyph id
    used_chars: BTreeMap<char, u16>,
    /// Original glyph id of each subset glyph, indexed by subset id
    glyph_order: Vec<u16>,
    /// Original glyph id -> subset glyph id
    glyph_map: HashMap<u16, u16>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (subset TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes, validating that the face parses
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            used_chars: BTreeMap::new(),
            glyph_order: vec![0],
            glyph_map: HashMap::from([(0, 0)]),
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Number of glyphs the subset will hold, `.notdef` included
    pub fn subset_glyph_count(&self) -> usize {
        self.glyph_order.len()
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.face().map(|face| face.units_per_em()).unwrap_or(1000)
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        let Some(face) = self.face() else {
            return 0;
        };
        text.chars()
            .filter_map(|c| face.glyph_index(c).and_then(|id| face.glyph_hor_advance(id)))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let width = self.text_width(text);
        let units_per_em = self.units_per_em() as f32;
        (width as f32 / units_per_em) * font_size
    }

    /// Encode text as subset glyph ids in a hex string for the PDF `Tj`
    /// operator, recording every character for the subset
    ///
    /// Characters the face has no glyph for are written as `.notdef`.
    pub fn encode_text_hex(&mut self, text: &str) -> String {
        let face = ttf_parser::Face::parse(&self.ttf_data, 0).ok();
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            let gid = match self.used_chars.get(&c) {
                Some(&gid) => gid,
                None => {
                    let original = face
                        .as_ref()
                        .and_then(|f| f.glyph_index(c))
                        .map(|id| id.0)
                        .unwrap_or(0);
                    let order = &mut self.glyph_order;
                    let gid = *self.glyph_map.entry(original).or_insert_with(|| {
                        order.push(original);
                        (order.len() - 1) as u16
                    });
                    self.used_chars.insert(c, gid);
                    gid
                }
            };
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// Subset the TTF down to the glyphs encoded so far
    fn subset(&self) -> Result<Vec<u8>> {
        let remapper = subsetter::GlyphRemapper::new_from_glyphs(&self.glyph_order);
        subsetter::subset(&self.ttf_data, 0, &remapper)
            .map_err(|e| PdfError::FontSubsetError(format!("{}: {e:?}", self.name)))
    }

    /// Generate all PDF objects needed to embed this font
    ///
    /// Object references are left as placeholders; the document wires them up
    /// once the objects have ids.
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let face = self
            .face()
            .ok_or_else(|| PdfError::FontParseError(self.name.clone()))?;
        let font_name = Object::Name(self.name.clone().into_bytes());
        let scale = 1000.0 / face.units_per_em() as f32;
        let to_pdf_units = |v: i16| (v as f32 * scale).round() as i64;

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(Dictionary::new(), tounicode_content.into_bytes());

        let subset = self.subset()?;
        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (subset.len() as i64).into())]),
            subset,
        );

        let bbox = face.global_bounding_box();
        let font_bbox: Vec<Object> = vec![
            to_pdf_units(bbox.x_min).into(),
            to_pdf_units(bbox.y_min).into(),
            to_pdf_units(bbox.x_max).into(),
            to_pdf_units(bbox.y_max).into(),
        ];
        let ascent = to_pdf_units(face.ascender());
        let descent = to_pdf_units(face.descender());
        let cap_height = face.capital_height().map(to_pdf_units).unwrap_or(ascent);

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 32.into()), // Nonsymbolic
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", cap_height.into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference((0, 0))),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference((0, 0))),
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array(&face, scale).into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
            ("DescendantFonts", vec![Object::Reference((0, 0))].into()),
            ("ToUnicode", Object::Reference((0, 0))),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// /W array in the individual format: `[gid [w] gid [w] ...]`, keyed by
    /// subset glyph id
    fn generate_widths_array(&self, face: &ttf_parser::Face<'_>, scale: f32) -> Vec<Object> {
        let mut widths: Vec<Object> = Vec::with_capacity(self.glyph_order.len() * 2);
        for (gid, &original) in self.glyph_order.iter().enumerate().skip(1) {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(original))
                .unwrap_or(0);
            widths.push((gid as i64).into());
            widths.push(vec![Object::Integer((advance as f32 * scale).round() as i64)].into());
        }
        widths
    }

    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        // One character per glyph; the first one recorded wins
        let mut mapped: BTreeMap<u16, char> = BTreeMap::new();
        for (&c, &gid) in &self.used_chars {
            if gid != 0 {
                mapped.entry(gid).or_insert(c);
            }
        }
        let mapped: Vec<(u16, char)> = mapped.into_iter().collect();

        // At most 100 entries per bfchar block
        for chunk in mapped.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let hex: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap
    }
}

/// A single font face usable for drawing text
#[derive(Debug, Clone)]
pub enum FontFace {
    Standard(StandardFont),
    Embedded(FontData),
}

impl FontFace {
    /// Identifier used to deduplicate font resources
    pub fn name(&self) -> &str {
        match self {
            FontFace::Standard(font) => font.base_font(),
            FontFace::Embedded(data) => &data.name,
        }
    }

    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        match self {
            FontFace::Standard(font) => font.text_width_points(text, font_size),
            FontFace::Embedded(data) => data.text_width_points(text, font_size),
        }
    }

    /// Encode text for `Tj`; embedded faces record the glyphs they use
    pub fn encode_text_hex(&mut self, text: &str) -> String {
        match self {
            FontFace::Standard(font) => font.encode_text_hex(text),
            FontFace::Embedded(data) => data.encode_text_hex(text),
        }
    }
}

/// Font family with a regular and an optional bold variant
#[derive(Debug, Clone)]
pub struct FontFamily {
    pub regular: FontFace,
    pub bold: Option<FontFace>,
}

impl FontFamily {
    /// Helvetica and Helvetica-Bold, always available
    pub fn helvetica() -> Self {
        Self {
            regular: FontFace::Standard(StandardFont::Helvetica),
            bold: Some(FontFace::Standard(StandardFont::HelveticaBold)),
        }
    }

    /// Get the face for the specified weight, falling back to regular
    pub fn get_variant(&self, weight: FontWeight) -> &FontFace {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    pub fn get_variant_mut(&mut self, weight: FontWeight) -> &mut FontFace {
        match (weight, self.bold.is_some()) {
            (FontWeight::Bold, true) => self.bold.as_mut().unwrap_or(&mut self.regular),
            _ => &mut self.regular,
        }
    }
}

/// Builder for font families backed by TrueType files
#[derive(Default)]
pub struct FontFamilyBuilder {
    regular: Option<Vec<u8>>,
    bold: Option<Vec<u8>>,
}

impl FontFamilyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular(mut self, ttf_data: Vec<u8>) -> Self {
        self.regular = Some(ttf_data);
        self
    }

    pub fn bold(mut self, ttf_data: Vec<u8>) -> Self {
        self.bold = Some(ttf_data);
        self
    }

    /// Build the FontFamily from the provided TTF data
    pub fn build(self, family_name: &str) -> Result<FontFamily> {
        let Some(regular) = self.regular else {
            return Err(PdfError::FontParseError(
                "FontFamily must have at least a regular variant".to_string(),
            ));
        };
        let regular = FontData::from_ttf(&format!("{family_name}-Regular"), &regular)?;

        let bold = self
            .bold
            .map(|data| FontData::from_ttf(&format!("{family_name}-Bold"), &data))
            .transpose()?;

        Ok(FontFamily {
            regular: FontFace::Embedded(regular),
            bold: bold.map(FontFace::Embedded),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dejavu() -> FontData {
        let data =
            std::fs::read("../../fonts/DejaVuSans.ttf").expect("Failed to read test font file");
        FontData::from_ttf("report-Regular", &data).unwrap()
    }

    fn unparsed_font() -> FontData {
        FontData {
            name: "test".to_string(),
            ttf_data: vec![0u8; 100],
            used_chars: BTreeMap::new(),
            glyph_order: vec![0],
            glyph_map: HashMap::from([(0, 0)]),
        }
    }

    #[test]
    fn test_from_ttf_rejects_garbage() {
        let result = FontData::from_ttf("broken", &[0u8; 100]);
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_builder_requires_regular() {
        let result = FontFamilyBuilder::new().build("Empty");
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_renumbers_glyphs_in_first_use_order() {
        let mut font = dejavu();
        assert_eq!(font.encode_text_hex("aba"), "<000100020001>");
        // Repeated and new characters keep extending the same numbering
        assert_eq!(font.encode_text_hex("bção"), "<0002000300040005>");
        assert_eq!(font.subset_glyph_count(), 6);
    }

    #[test]
    fn test_missing_glyph_encodes_as_notdef() {
        let mut font = dejavu();
        // Private use area, not covered by DejaVu Sans
        assert_eq!(font.encode_text_hex("a\u{E000}"), "<00010000>");
        assert_eq!(font.subset_glyph_count(), 2);
    }

    #[test]
    fn test_text_width_uses_font_metrics() {
        let font = dejavu();
        assert_eq!(font.units_per_em(), 2048);
        let width = font.text_width_points("Página 1", 10.0);
        assert!(width > 30.0 && width < 60.0, "{width}");
        assert_eq!(font.text_width_points("", 10.0), 0.0);
    }

    #[test]
    fn test_subset_is_smaller_than_source() {
        let mut font = dejavu();
        font.encode_text_hex("Fazenda Boa Vista 1021");
        let objects = font.to_pdf_objects().unwrap();
        let subset = &objects.font_file_stream.content;
        assert!(subset.len() < font.ttf_data.len() / 10, "{}", subset.len());
        assert_eq!(
            objects.font_file_stream.dict.get(b"Length1").unwrap().as_i64().unwrap(),
            subset.len() as i64
        );
        // Still a TrueType font; composite components may add glyphs at the end
        let face = ttf_parser::Face::parse(subset, 0).unwrap();
        assert!(face.number_of_glyphs() as usize >= font.subset_glyph_count());
    }

    #[test]
    fn test_widths_and_tounicode_use_subset_ids() {
        let mut font = dejavu();
        font.encode_text_hex("Aé");
        let objects = font.to_pdf_objects().unwrap();

        let widths = objects.cid_font.get(b"W").unwrap().as_array().unwrap();
        assert_eq!(widths.len(), 4);
        assert_eq!(widths[0].as_i64().unwrap(), 1);
        assert_eq!(widths[2].as_i64().unwrap(), 2);
        // DejaVu Sans "A" advance is 1401/2048 em
        let a_width = widths[1].as_array().unwrap()[0].as_i64().unwrap();
        assert_eq!(a_width, 684);

        let cmap = String::from_utf8(objects.tounicode_stream.content).unwrap();
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0001> <0041>"));
        assert!(cmap.contains("<0002> <00E9>"));
    }

    #[test]
    fn test_font_dictionaries_use_face_name() {
        let mut font = dejavu();
        font.encode_text_hex("x");
        let objects = font.to_pdf_objects().unwrap();
        assert_eq!(
            objects.type0_font.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"report-Regular"
        );
        assert_eq!(
            objects.type0_font.get(b"Encoding").unwrap().as_name().unwrap(),
            b"Identity-H"
        );
        assert_eq!(
            objects.cid_font.get(b"CIDToGIDMap").unwrap().as_name().unwrap(),
            b"Identity"
        );
    }

    #[test]
    fn test_unparsed_font_defaults() {
        let mut font = unparsed_font();
        assert_eq!(font.units_per_em(), 1000);
        assert_eq!(font.text_width("Hello"), 0);
        assert_eq!(font.encode_text_hex(""), "<>");
        assert_eq!(font.encode_text_hex("AB"), "<00000000>");
        assert!(font.to_pdf_objects().is_err());
    }

    #[test]
    fn test_helvetica_family_variants() {
        let family = FontFamily::helvetica();
        assert_eq!(family.get_variant(FontWeight::Regular).name(), "Helvetica");
        assert_eq!(family.get_variant(FontWeight::Bold).name(), "Helvetica-Bold");
    }

    #[test]
    fn test_bold_falls_back_to_regular() {
        let mut family = FontFamily {
            regular: FontFace::Standard(StandardFont::Helvetica),
            bold: None,
        };
        assert_eq!(family.get_variant(FontWeight::Bold).name(), "Helvetica");
        assert_eq!(family.get_variant_mut(FontWeight::Bold).name(), "Helvetica");
    }

    #[test]
    fn test_builder_names_faces_after_family() {
        let regular = std::fs::read("../../fonts/DejaVuSans.ttf").unwrap();
        let bold = std::fs::read("../../fonts/DejaVuSans-Bold.ttf").unwrap();
        let family = FontFamilyBuilder::new()
            .regular(regular)
            .bold(bold)
            .build("report")
            .unwrap();
        assert_eq!(family.get_variant(FontWeight::Regular).name(), "report-Regular");
        assert_eq!(family.get_variant(FontWeight::Bold).name(), "report-Bold");
    }

    #[test]
    fn test_face_delegates_to_standard_font() {
        let mut face = FontFace::Standard(StandardFont::Helvetica);
        assert_eq!(face.encode_text_hex("A"), "<41>");
        assert!((face.text_width_points("A", 10.0) - 6.67).abs() < 1e-4);
    }
}
