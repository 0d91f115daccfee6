//! PDF document builder

use crate::font::{FontFace, FontFamily, FontWeight};
use crate::graphics::{fill_rect_operators, line_operators, stroke_rect_operators};
use crate::image::{
    calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject,
};
use crate::text::{generate_rotated_text_operators, generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::io::Write;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Gray level (0.0 black - 1.0 white)
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4 in portrait orientation (210 x 297 mm)
    pub const A4: PageSize = PageSize {
        width: 595.275_590_551_181_1,
        height: 841.889_763_779_527_6,
    };

    /// Same size with the long side horizontal
    pub fn landscape(self) -> Self {
        Self {
            width: self.width.max(self.height),
            height: self.width.min(self.height),
        }
    }

    /// Same size with the long side vertical
    pub fn portrait(self) -> Self {
        Self {
            width: self.width.min(self.height),
            height: self.width.max(self.height),
        }
    }
}

/// A page under construction
struct Page {
    size: PageSize,
    /// Content stream operators, compressed at save time
    content: Vec<u8>,
}

/// An image registered with the document
struct EmbeddedImage {
    resource_name: String,
    xobject: ImageXObject,
}

/// PDF document builder
///
/// Pages are appended with [`PdfDocument::add_page`] and drawn on with the
/// insert/draw methods. Y coordinates are measured from the top of the page.
/// Nothing is assembled into PDF objects until [`PdfDocument::to_bytes`].
pub struct PdfDocument {
    pages: Vec<Page>,
    /// Registered font families
    font_families: HashMap<String, FontFamily>,
    /// Current font family name
    current_family: Option<String>,
    current_weight: FontWeight,
    current_font_size: f32,
    current_text_color: Color,
    /// Font resources in use (face name -> resource name, e.g. "F1")
    font_resources: BTreeMap<String, String>,
    /// Embedded images, deduplicated by a hash of their bytes
    images: Vec<EmbeddedImage>,
    image_index: HashMap<u64, usize>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            font_families: HashMap::new(),
            current_family: None,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_resources: BTreeMap::new(),
            images: Vec::new(),
            image_index: HashMap::new(),
        }
    }

    /// Append a blank page and return its number (1-indexed)
    pub fn add_page(&mut self, size: PageSize) -> usize {
        self.pages.push(Page {
            size,
            content: Vec::new(),
        });
        self.pages.len()
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get the size of a page (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        Ok(self.page(page)?.size)
    }

    fn page(&self, page: usize) -> Result<&Page> {
        let count = self.pages.len();
        if page == 0 || page > count {
            return Err(PdfError::InvalidPage(page, count));
        }
        Ok(&self.pages[page - 1])
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut Page> {
        let count = self.pages.len();
        if page == 0 || page > count {
            return Err(PdfError::InvalidPage(page, count));
        }
        Ok(&mut self.pages[page - 1])
    }

    /// Register a font family under a name
    pub fn register_font_family(&mut self, name: &str, family: FontFamily) -> Result<()> {
        if self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }
        self.font_families.insert(name.to_string(), family);
        Ok(())
    }

    /// Set current font family and size
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.font_families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }
        self.current_family = Some(family.to_string());
        self.current_font_size = size;
        Ok(())
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.current_font_size = size;
    }

    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.current_weight = weight;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// The face selected by the current family and weight
    pub fn current_face(&self) -> Result<&FontFace> {
        let family = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        self.font_families
            .get(family)
            .map(|f| f.get_variant(self.current_weight))
            .ok_or_else(|| PdfError::FontNotFound(family.clone()))
    }

    fn current_face_mut(&mut self) -> Result<&mut FontFace> {
        let family = self
            .current_family
            .clone()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        let weight = self.current_weight;
        self.font_families
            .get_mut(&family)
            .map(|f| f.get_variant_mut(weight))
            .ok_or(PdfError::FontNotFound(family))
    }

    /// Width of `text` in points with the current font and size
    pub fn text_width(&self, text: &str) -> Result<f64> {
        Ok(self
            .current_face()?
            .text_width_points(text, self.current_font_size) as f64)
    }

    /// Record the text on the current face and return its render context
    fn prepare_text(&mut self, text: &str) -> Result<(String, TextRenderContext)> {
        let font_size = self.current_font_size;
        let color = self.current_text_color;
        let face = self.current_face_mut()?;
        let face_name = face.name().to_string();
        let text_hex = face.encode_text_hex(text);
        let text_width = face.text_width_points(text, font_size) as f64;

        let next = self.font_resources.len() + 1;
        let font_name = self
            .font_resources
            .entry(face_name)
            .or_insert_with(|| format!("F{next}"))
            .clone();

        Ok((
            text_hex,
            TextRenderContext {
                font_name,
                font_size,
                text_width,
                color,
            },
        ))
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (anchor for `align`)
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Text alignment
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let page_height = self.page(page)?.size.height;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let (text_hex, ctx) = self.prepare_text(text)?;
        let operators = generate_text_operators(&text_hex, x, page_height - y, align, &ctx);
        self.page_mut(page)?.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Insert text centred on `(cx, cy)` and rotated counter-clockwise
    pub fn insert_rotated_text(
        &mut self,
        text: &str,
        page: usize,
        cx: f64,
        cy: f64,
        angle_degrees: f64,
    ) -> Result<()> {
        let page_height = self.page(page)?.size.height;
        if text.is_empty() {
            return Ok(());
        }

        let (text_hex, ctx) = self.prepare_text(text)?;
        let operators =
            generate_rotated_text_operators(&text_hex, cx, page_height - cy, angle_degrees, &ctx);
        self.page_mut(page)?.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Fill a rectangle whose top-left corner is at `(x, y)`
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        let page = self.page_mut(page)?;
        let pdf_y = page.size.height - y - height;
        page.content
            .extend_from_slice(&fill_rect_operators(x, pdf_y, width, height, color));
        Ok(())
    }

    /// Stroke a rectangle whose top-left corner is at `(x, y)`
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        let page = self.page_mut(page)?;
        let pdf_y = page.size.height - y - height;
        page.content.extend_from_slice(&stroke_rect_operators(
            x, pdf_y, width, height, color, line_width,
        ));
        Ok(())
    }

    /// Draw a line between two points
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        page: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        let page = self.page_mut(page)?;
        let height = page.size.height;
        page.content.extend_from_slice(&line_operators(
            x1,
            height - y1,
            x2,
            height - y2,
            color,
            line_width,
        ));
        Ok(())
    }

    /// Insert an image stretched to the given box
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from top)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.insert_image_scaled(data, page, x, y, width, height, ImageScaleMode::Stretch)
            .map(|_| ())
    }

    /// Insert an image with scaling mode
    ///
    /// Returns the size the image was actually drawn at.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<(f64, f64)> {
        let page_height = self.page(page)?.size.height;

        let index = self.get_or_create_image(data)?;
        let image = &self.images[index];
        let (actual_width, actual_height) = calculate_scaled_dimensions(
            image.xobject.width,
            image.xobject.height,
            width,
            height,
            mode,
        );

        // Convert Y coordinate from top-origin to PDF bottom-origin
        let pdf_y = page_height - y - actual_height;
        let operators =
            generate_image_operators(&image.resource_name, x, pdf_y, actual_width, actual_height);
        self.page_mut(page)?.content.extend_from_slice(&operators);

        Ok((actual_width, actual_height))
    }

    fn get_or_create_image(&mut self, data: &[u8]) -> Result<usize> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(&index) = self.image_index.get(&data_hash) {
            return Ok(index);
        }

        let xobject = ImageXObject::from_bytes(data)?;
        let index = self.images.len();
        self.images.push(EmbeddedImage {
            resource_name: format!("Im{}", index + 1),
            xobject,
        });
        self.image_index.insert(data_hash, index);
        Ok(index)
    }

    /// Save the document to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.build()?;
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Assemble pages, fonts and images into a lopdf document
    fn build(&self) -> Result<Document> {
        if self.pages.is_empty() {
            return Err(PdfError::SaveError("Document has no pages".to_string()));
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        // Resources are shared by every page
        let mut fonts = Dictionary::new();
        for (face_name, resource_name) in &self.font_resources {
            let face = self.find_face(face_name)?;
            let font_id = embed_face(&mut doc, face)?;
            fonts.set(resource_name.as_bytes(), Object::Reference(font_id));
        }

        let mut xobjects = Dictionary::new();
        for image in &self.images {
            let image_id = doc.add_object(image.xobject.to_pdf_stream());
            xobjects.set(image.resource_name.as_bytes(), Object::Reference(image_id));
        }

        let mut resources = dictionary! { "Font" => fonts };
        if !self.images.is_empty() {
            resources.set("XObject", xobjects);
        }
        let resources_id = doc.add_object(resources);

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let contents = Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                compress(&page.content)?,
            )
            .with_compression(false);
            let contents_id = doc.add_object(contents);

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(page.size.width as f32),
                    Object::Real(page.size.height as f32),
                ],
                "Contents" => contents_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => self.pages.len() as i64,
                "Kids" => kids,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }

    fn find_face(&self, face_name: &str) -> Result<&FontFace> {
        self.font_families
            .values()
            .flat_map(|family| std::iter::once(&family.regular).chain(family.bold.as_ref()))
            .find(|face| face.name() == face_name)
            .ok_or_else(|| PdfError::FontNotFound(face_name.to_string()))
    }
}

/// Add the font objects for a face and return the font dictionary id
fn embed_face(doc: &mut Document, face: &FontFace) -> Result<ObjectId> {
    let data = match face {
        FontFace::Standard(font) => return Ok(doc.add_object(font.to_pdf_dictionary())),
        FontFace::Embedded(data) => data,
    };

    let font_objects = data.to_pdf_objects()?;

    let font_file_id = doc.add_object(font_objects.font_file_stream);

    let mut font_descriptor = font_objects.font_descriptor;
    font_descriptor.set("FontFile2", Object::Reference(font_file_id));
    let font_descriptor_id = doc.add_object(font_descriptor);

    let mut cid_font = font_objects.cid_font;
    cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
    let cid_font_id = doc.add_object(cid_font);

    let tounicode_id = doc.add_object(font_objects.tounicode_stream);

    let mut type0_font = font_objects.type0_font;
    type0_font.set(
        "DescendantFonts",
        Object::Array(vec![Object::Reference(cid_font_id)]),
    );
    type0_font.set("ToUnicode", Object::Reference(tounicode_id));

    Ok(doc.add_object(type0_font))
}

fn compress(content: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(content)?;
    Ok(encoder.finish()?)
}
