//! Image handling for PDF documents
//!
//! JPEG data is embedded as-is with `DCTDecode`. PNG data is decoded, any
//! alpha channel is blended onto white, and the pixels are re-compressed with
//! `FlateDecode`.

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Image scaling mode for insert_image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageScaleMode {
    /// Stretch to exact dimensions
    #[default]
    Stretch,
    /// Fit within bounding box, preserving aspect ratio
    FitBox,
}

/// Calculate display dimensions based on scaling mode
///
/// Returns `(width, height)` in points.
pub fn calculate_scaled_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: f64,
    target_height: f64,
    mode: ImageScaleMode,
) -> (f64, f64) {
    if original_width == 0 || original_height == 0 {
        return (target_width, target_height);
    }
    let (ow, oh) = (original_width as f64, original_height as f64);
    match mode {
        ImageScaleMode::Stretch => (target_width, target_height),
        ImageScaleMode::FitBox => {
            let scale = (target_width / ow).min(target_height / oh);
            (ow * scale, oh * scale)
        }
    }
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Ok(ImageFormat::Png),
        _ if data.len() < 8 => Err(PdfError::ImageError("Image data too short".to_string())),
        _ => Err(PdfError::ImageError(
            "Unsupported image format (expected JPEG or PNG)".to_string(),
        )),
    }
}

/// Image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Get image dimensions without fully decoding
pub fn get_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    match detect_format(data)? {
        ImageFormat::Jpeg => {
            let (width, height, _) = jpeg_frame_info(data)?;
            Ok(ImageDimensions { width, height })
        }
        ImageFormat::Png => {
            // IHDR is always the first chunk: length(4) "IHDR"(4) width(4) height(4)
            if data.len() < 24 || &data[12..16] != b"IHDR" {
                return Err(PdfError::ImageError("Invalid PNG header".to_string()));
            }
            let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
            let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
            Ok(ImageDimensions { width, height })
        }
    }
}

/// Width, height and component count from the first SOF marker
fn jpeg_frame_info(data: &[u8]) -> Result<(u32, u32, u8)> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        // SOF0..SOF15 except DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Ok((width, height, data[i + 9]));
        }
        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }
    Err(PdfError::ImageError("Could not parse JPEG header".to_string()))
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB" or "DeviceGray"
    pub color_space: &'static str,
    /// "DCTDecode" for JPEG, "FlateDecode" for decoded pixels
    pub filter: &'static str,
    /// Compressed image data
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Create an XObject from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_decoded(data),
        }
    }

    /// JPEG images with one or three components are embedded directly
    fn from_jpeg(data: &[u8]) -> Result<Self> {
        let (width, height, components) = jpeg_frame_info(data)?;
        let color_space = match components {
            1 => "DeviceGray",
            3 => "DeviceRGB",
            // CMYK and friends go through the decoder
            _ => return Self::from_decoded(data),
        };
        Ok(Self {
            width,
            height,
            color_space,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    /// Decode pixels, blend alpha onto white and compress with zlib
    fn from_decoded(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let blend = |value: u8, alpha: u8| -> u8 {
            let a = alpha as f32 / 255.0;
            (value as f32 * a + 255.0 * (1.0 - a)).round() as u8
        };

        let (raw, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let gray: Vec<u8> = image
                    .to_luma_alpha8()
                    .pixels()
                    .map(|p| blend(p[0], p[1]))
                    .collect();
                (gray, "DeviceGray")
            }
            c if c.has_alpha() => {
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                for p in image.to_rgba8().pixels() {
                    rgb.extend_from_slice(&[
                        blend(p[0], p[3]),
                        blend(p[1], p[3]),
                        blend(p[2], p[3]),
                    ]);
                }
                (rgb, "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
        };

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let dict = Dictionary::from_iter(vec![
            ("Type", Object::from("XObject")),
            ("Subtype", "Image".into()),
            ("Width", (self.width as i64).into()),
            ("Height", (self.height as i64).into()),
            ("ColorSpace", self.color_space.into()),
            ("BitsPerComponent", 8.into()),
            ("Filter", self.filter.into()),
        ]);
        // Data is already compressed; keep lopdf from compressing it again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

/// Generate operators to draw an image at a PDF (bottom-left origin) position
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat as Encoding, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, pixel);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, Encoding::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_detect_format() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        assert_eq!(detect_format(&png).unwrap(), ImageFormat::Png);
        assert!(detect_format(&[0u8; 8]).is_err());
        assert!(detect_format(&[0x89, 0x50]).is_err());
    }

    #[test]
    fn test_get_dimensions_jpeg() {
        let jpeg = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, // SOF0
            0x00, 0x11, // Length
            0x08, // Precision
            0x00, 0x64, // Height (100)
            0x00, 0xC8, // Width (200)
            0x03, // Components
            0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9,
        ];
        let dims = get_dimensions(&jpeg).unwrap();
        assert_eq!(dims, ImageDimensions { width: 200, height: 100 });
    }

    #[test]
    fn test_get_dimensions_png() {
        let png = png_bytes(150, 75, Rgba([0, 0, 0, 255]));
        let dims = get_dimensions(&png).unwrap();
        assert_eq!(dims, ImageDimensions { width: 150, height: 75 });
    }

    #[test]
    fn test_png_alpha_is_blended_on_white() {
        let png = png_bytes(2, 2, Rgba([0, 0, 0, 0]));
        let xobject = ImageXObject::from_bytes(&png).unwrap();
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert_eq!(xobject.filter, "FlateDecode");

        let mut decoder = flate2::read::ZlibDecoder::new(xobject.data.as_slice());
        let mut raw = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut raw).unwrap();
        assert_eq!(raw, vec![255u8; 12]);
    }

    #[test]
    fn test_xobject_stream_dictionary() {
        let xobject = ImageXObject {
            width: 100,
            height: 50,
            color_space: "DeviceGray",
            filter: "DCTDecode",
            data: vec![1, 2, 3],
        };
        let stream = xobject.to_pdf_stream();
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 100);
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
        assert_eq!(stream.content, vec![1, 2, 3]);
    }

    #[test]
    fn test_generate_image_operators() {
        let ops = generate_image_operators("Im1", 100.0, 200.0, 50.0, 75.0);
        let ops = String::from_utf8(ops).unwrap();
        assert_eq!(ops, "q\n50 0 0 75 100 200 cm\n/Im1 Do\nQ\n");
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(
            calculate_scaled_dimensions(200, 100, 50.0, 50.0, ImageScaleMode::Stretch),
            (50.0, 50.0)
        );
        // Width-limited box
        assert_eq!(
            calculate_scaled_dimensions(200, 100, 100.0, 100.0, ImageScaleMode::FitBox),
            (100.0, 50.0)
        );
        // Height-limited box
        assert_eq!(
            calculate_scaled_dimensions(100, 200, 100.0, 100.0, ImageScaleMode::FitBox),
            (50.0, 100.0)
        );
    }

    #[test]
    fn test_scaled_dimensions_zero_sized_image() {
        assert_eq!(
            calculate_scaled_dimensions(0, 0, 40.0, 20.0, ImageScaleMode::FitBox),
            (40.0, 20.0)
        );
    }
}
