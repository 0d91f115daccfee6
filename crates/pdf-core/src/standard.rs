//! Built-in PDF standard fonts (no embedding required)
//!
//! Text is encoded with WinAnsiEncoding, which covers the Latin-1 range used
//! by Portuguese. Characters outside that range render as `?`.

use encoding_rs::WINDOWS_1252;
use lopdf::Dictionary;

/// Helvetica advance widths for ASCII 32..=126 (from the Adobe AFM files)
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// One of the standard 14 fonts every PDF reader provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// PostScript name used as `BaseFont`
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn ascii_widths(self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica => &HELVETICA_ASCII,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_ASCII,
        }
    }

    fn bold(self) -> bool {
        matches!(self, StandardFont::HelveticaBold)
    }

    /// Advance width of a character in 1/1000 em
    pub fn char_width(self, c: char) -> u16 {
        let code = c as u32;
        if (32..=126).contains(&code) {
            return self.ascii_widths()[(code - 32) as usize];
        }

        // Accented Latin letters share the advance of their base letter
        if let Some(base) = base_letter(c) {
            return self.char_width(base);
        }

        match c {
            '\u{00A0}' => 278,
            'ì' | 'í' | 'î' | 'ï' => 278,
            'º' => 365,
            'ª' => 370,
            '°' => 400,
            '§' => 556,
            '×' | '÷' | '±' => 584,
            'Æ' => 1000,
            'æ' => 889,
            'ß' => 611,
            '€' => 556,
            '…' | '—' | '‰' => 1000,
            '–' => 556,
            '‘' | '’' | '‚' => {
                if self.bold() {
                    278
                } else {
                    222
                }
            }
            '“' | '”' | '„' => {
                if self.bold() {
                    500
                } else {
                    333
                }
            }
            '•' => 350,
            _ => 556,
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| self.char_width(encodable_or_question(c)) as u32)
            .sum();
        units as f32 / 1000.0 * font_size
    }

    /// Encode text as a hex string for the PDF `Tj` operator
    pub fn encode_text_hex(self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2 + 2);
        result.push('<');
        for c in text.chars() {
            let byte = encode_char(c).unwrap_or(b'?');
            result.push_str(&format!("{byte:02X}"));
        }
        result.push('>');
        result
    }

    /// Font dictionary for a Type1 standard font
    pub fn to_pdf_dictionary(self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", self.base_font().into()),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// Encode a single character to its WinAnsi byte
fn encode_char(c: char) -> Option<u8> {
    let mut buf = [0u8; 4];
    let (bytes, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    if unmappable || bytes.len() != 1 {
        return None;
    }
    Some(bytes[0])
}

fn encodable_or_question(c: char) -> char {
    if encode_char(c).is_some() {
        c
    } else {
        '?'
    }
}

fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'Ç' => 'C',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ð' => 'D',
        'Ñ' => 'N',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Þ' => 'P',
        'Š' => 'S',
        'Ž' => 'Z',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ð' => 'o',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'þ' => 'p',
        'š' => 's',
        'ž' => 'z',
        _ => return None,
    };
    Some(base)
}
