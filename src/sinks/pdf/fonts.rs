use crate::canvas::fonts::is_builtin_family;
use crate::error::BookError;
use crate::layout::{FontStyle, TextStyle, CODE_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::sinks::pdf::config::PDF;
use anyhow::Result;

/// The font families the book is set in.
///
/// Only the built-in PDF families can be used:
/// - "Arial" / "Helvetica"
/// - "Times" / "Times New Roman"
/// - "Courier" / "Courier New"
#[derive(Debug, Clone, PartialEq)]
pub struct BookFonts {
    pub chapter: String,
    pub text: String,
}

impl BookFonts {
    pub fn load(config: &PDF) -> Result<BookFonts> {
        Ok(BookFonts {
            chapter: Self::check(&config.chapter_font)?,
            text: Self::check(&config.text_font)?,
        })
    }

    fn check(family: &str) -> Result<String> {
        if family.trim().is_empty() {
            return Err(BookError::InvalidConfig("font family not provided".to_string()).into());
        }
        if !is_builtin_family(family) {
            return Err(BookError::InvalidConfig(format!("unsupported font family '{family}'")).into());
        }
        Ok(family.to_string())
    }

    pub fn chapter(&self, style: FontStyle, size_pt: f64) -> TextStyle {
        TextStyle::new(&self.chapter, style, size_pt)
    }

    pub fn text(&self, style: FontStyle, size_pt: f64) -> TextStyle {
        TextStyle::new(&self.text, style, size_pt)
    }

    /// Normal body text, where every file starts.
    pub fn body(&self) -> TextStyle {
        self.text(FontStyle::Normal, DEFAULT_FONT_SIZE)
    }

    pub fn code(&self, size_pt: f64) -> TextStyle {
        TextStyle::new(CODE_FONT_FAMILY, FontStyle::Normal, size_pt)
    }
}
