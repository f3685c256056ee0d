//! The built-in PDF Type1 fonts.
//!
//! Only the standard fonts every PDF reader ships are used, so nothing is
//! embedded. Text is encoded as WinAnsi (windows-1252) and measured with the
//! advance widths from the Adobe core font metrics, in thousandths of an em.
//!
//! ## Families
//!
//! - `Arial` / `Helvetica` map to Helvetica
//! - `Times` / `Times New Roman` map to Times
//! - `Courier` / `Courier New` map to Courier (monospaced, 600 units per glyph)

use crate::layout::FontStyle;
use encoding_rs::WINDOWS_1252;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    pub fn from_name(name: &str) -> Option<FontFamily> {
        match name.trim().to_ascii_lowercase().as_str() {
            "arial" | "helvetica" => Some(FontFamily::Helvetica),
            "times" | "times-roman" | "times new roman" => Some(FontFamily::Times),
            "courier" | "courier new" => Some(FontFamily::Courier),
            _ => None,
        }
    }
}

/// Whether `name` is a family the document can set text in.
pub fn is_builtin_family(name: &str) -> bool {
    FontFamily::from_name(name).is_some()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuiltinFont {
    pub family: FontFamily,
    pub style: FontStyle,
}

impl BuiltinFont {
    pub const HELVETICA: BuiltinFont = BuiltinFont {
        family: FontFamily::Helvetica,
        style: FontStyle::Normal,
    };

    pub fn new(family: FontFamily, style: FontStyle) -> BuiltinFont {
        BuiltinFont { family, style }
    }

    pub fn resolve(name: &str, style: FontStyle) -> Option<BuiltinFont> {
        FontFamily::from_name(name).map(|family| BuiltinFont::new(family, style))
    }

    /// Stable index used for resource names and for ordering in the output.
    pub fn index(&self) -> usize {
        let family = match self.family {
            FontFamily::Helvetica => 0,
            FontFamily::Times => 1,
            FontFamily::Courier => 2,
        };
        let style = match self.style {
            FontStyle::Normal => 0,
            FontStyle::Bold => 1,
            FontStyle::Italic => 2,
            FontStyle::BoldItalic => 3,
        };
        family * 4 + style
    }

    pub fn resource_name(&self) -> String {
        format!("F{}", self.index() + 1)
    }

    pub fn base_font(&self) -> &'static str {
        use FontFamily::*;
        use FontStyle::*;
        match (self.family, self.style) {
            (Helvetica, Normal) => "Helvetica",
            (Helvetica, Bold) => "Helvetica-Bold",
            (Helvetica, Italic) => "Helvetica-Oblique",
            (Helvetica, BoldItalic) => "Helvetica-BoldOblique",
            (Times, Normal) => "Times-Roman",
            (Times, Bold) => "Times-Bold",
            (Times, Italic) => "Times-Italic",
            (Times, BoldItalic) => "Times-BoldItalic",
            (Courier, Normal) => "Courier",
            (Courier, Bold) => "Courier-Bold",
            (Courier, Italic) => "Courier-Oblique",
            (Courier, BoldItalic) => "Courier-BoldOblique",
        }
    }

    /// Advance width of one WinAnsi byte, in thousandths of an em.
    pub fn glyph_width(&self, byte: u8) -> u16 {
        let table = match (self.family, self.style.is_bold(), self.style.is_italic()) {
            (FontFamily::Courier, _, _) => return 600,
            (FontFamily::Helvetica, false, _) => &HELVETICA,
            (FontFamily::Helvetica, true, _) => &HELVETICA_BOLD,
            (FontFamily::Times, false, false) => &TIMES_ROMAN,
            (FontFamily::Times, true, false) => &TIMES_BOLD,
            (FontFamily::Times, false, true) => &TIMES_ITALIC,
            (FontFamily::Times, true, true) => &TIMES_BOLD_ITALIC,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            // bullet
            0x95 => 350,
            // no-break space
            0xA0 => table[0],
            _ => table[(b'o' - 32) as usize],
        }
    }

    /// Width of already-encoded text, in thousandths of an em.
    pub fn text_width(&self, bytes: &[u8]) -> u32 {
        bytes.iter().map(|&b| self.glyph_width(b) as u32).sum()
    }
}

/// Encode text for a WinAnsi font. Characters windows-1252 cannot represent
/// become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch as u8);
            continue;
        }
        let (bytes, _, had_errors) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        match bytes.as_ref() {
            [byte] if !had_errors => out.push(*byte),
            _ => out.push(b'?'),
        }
    }
    out
}

// advance widths for characters 32..=126
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];
