//! Page geometry, spacing constants and text styles shared by every renderer.
//!
//! All lengths are millimetres measured from the top-left corner of the page;
//! font sizes are points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

pub const A4_WIDTH: f64 = 210.0;
pub const A4_HEIGHT: f64 = 297.0;
pub const MARGIN: f64 = 20.0;

pub const DEFAULT_LINE_HEIGHT: f64 = 5.0;
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const INDENT_WIDTH: f64 = 10.0;
/// Length of a horizontal rule.
pub const PAGE_CONTENT_WIDTH: f64 = 190.0;

pub const TABLE_WIDTH: f64 = 170.0;
pub const TABLE_LINE_HEIGHT: f64 = 6.0;
pub const TABLE_FONT_SIZE: f64 = 10.0;

pub const IMAGE_WIDTH: f64 = 100.0;
pub const CAPTION_FONT_SIZE: f64 = 10.0;

pub const BLOCKQUOTE_INDENT: f64 = 20.0;
pub const BLOCK_TRAILING_SPACE: f64 = 8.0;
pub const CODE_FONT_FAMILY: &str = "Courier";
pub const CODE_FONT_SIZE: f64 = 10.0;

/// Headings start on a fresh page once the cursor is this close to the bottom.
pub const HEADING_BREAK_DISTANCE: f64 = 100.0;
/// Paragraphs, quotes and code blocks start on a fresh page once the cursor is this close to the bottom.
pub const BLOCK_BREAK_DISTANCE: f64 = 50.0;
/// Images that would end closer than this to the bottom go on the next page.
pub const IMAGE_BREAK_DISTANCE: f64 = 30.0;

pub const CHAPTER_TITLE_SIZE: f64 = 24.0;
pub const CHAPTER_TITLE_HEIGHT: f64 = 10.0;
pub const CHAPTER_TOP_SPACE: f64 = 20.0;
pub const FILE_SEPARATION: f64 = 10.0;

/// Size of the printed page and its margins.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub const fn a4() -> PageGeometry {
        PageGeometry {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: MARGIN,
        }
    }

    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::a4()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn new(r: u8, g: u8, b: u8) -> Colour {
        Colour { r, g, b }
    }

    pub const fn grey(level: u8) -> Colour {
        Colour::new(level, level, level)
    }

    /// Components scaled to the 0..=1 range PDF colour operators expect.
    pub fn components(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

pub mod colours {
    use super::Colour;

    pub const BLACK: Colour = Colour::new(0, 0, 0);
    pub const BLUE: Colour = Colour::new(0, 0, 255);
    pub const TABLE_HEADER: Colour = Colour::grey(240);
    pub const LEADER: Colour = Colour::grey(191);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> FontStyle {
        match (bold, italic) {
            (false, false) => FontStyle::Normal,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    pub fn with_bold(self) -> FontStyle {
        FontStyle::from_flags(true, self.is_italic())
    }

    pub fn with_italic(self) -> FontStyle {
        FontStyle::from_flags(self.is_bold(), true)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "C")]
    Centre,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "J")]
    Justify,
}

/// A snapshot of how text is set: which font, which face, how large.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    #[serde(default)]
    pub style: FontStyle,
    pub size_pt: f64,
    #[serde(default)]
    pub alignment: Align,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, style: FontStyle, size_pt: f64) -> TextStyle {
        TextStyle {
            font_family: font_family.into(),
            style,
            size_pt,
            alignment: Align::Left,
        }
    }

    pub fn with_style(mut self, style: FontStyle) -> TextStyle {
        self.style = style;
        self
    }

    pub fn with_size(mut self, size_pt: f64) -> TextStyle {
        self.size_pt = size_pt;
        self
    }

    pub fn bolded(self) -> TextStyle {
        let style = self.style.with_bold();
        self.with_style(style)
    }

    pub fn italicized(self) -> TextStyle {
        let style = self.style.with_italic();
        self.with_style(style)
    }
}

impl fmt::Display for TextStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {}pt", self.font_family, self.style, self.size_pt)
    }
}
