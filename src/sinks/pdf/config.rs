use crate::canvas::fonts::is_builtin_family;
use crate::error::BookError;
use crate::layout::{FontStyle, TextStyle};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// How one heading level is listed in the table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocLevel {
    /// Heading level, 1 (`h1`) to 6 (`h6`)
    pub level: u8,
    /// Font family; the book's text font when not given
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub style: FontStyle,
    pub size_pt: f64,
}

impl TocLevel {
    pub fn new(level: u8, style: FontStyle, size_pt: f64) -> TocLevel {
        TocLevel {
            level,
            font_family: None,
            style,
            size_pt,
        }
    }

    pub fn text_style(&self, text_font: &str) -> TextStyle {
        let family = self.font_family.as_deref().unwrap_or(text_font);
        TextStyle::new(family, self.style, self.size_pt)
    }
}

/// PDF output configuration.
///
/// Page geometry is fixed to A4 portrait with 20 mm margins; everything the
/// reader sees beyond that is set here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PDF {
    /// Heading of the table of contents
    #[serde(default = "default_toc_title")]
    pub toc_title: String,
    /// Whether every page gets a footer with its number
    #[serde(default = "default_page_numbers")]
    pub page_numbers: bool,
    /// Footer text; `{n}` is replaced with the page number
    #[serde(default = "default_footer")]
    pub footer: String,
    /// Family for chapter titles and headings
    #[serde(default = "default_chapter_font")]
    pub chapter_font: String,
    /// Family for body text
    #[serde(default = "default_text_font")]
    pub text_font: String,
    /// Which heading levels appear in the table of contents. Empty means no
    /// table of contents at all.
    #[serde(default = "default_toc_levels")]
    pub toc_levels: Vec<TocLevel>,
    /// Document title stored in the PDF metadata
    #[serde(default)]
    pub title: Option<String>,
}

fn default_toc_title() -> String {
    "Contents".to_string()
}
fn default_page_numbers() -> bool {
    true
}
fn default_footer() -> String {
    "Page {n}".to_string()
}
fn default_chapter_font() -> String {
    "Arial".to_string()
}
fn default_text_font() -> String {
    "Times".to_string()
}
fn default_toc_levels() -> Vec<TocLevel> {
    vec![
        TocLevel::new(1, FontStyle::Bold, 12.0),
        TocLevel::new(2, FontStyle::Normal, 11.0),
        TocLevel::new(3, FontStyle::Italic, 10.0),
    ]
}

impl Default for PDF {
    fn default() -> Self {
        PDF {
            toc_title: default_toc_title(),
            page_numbers: default_page_numbers(),
            footer: default_footer(),
            chapter_font: default_chapter_font(),
            text_font: default_text_font(),
            toc_levels: default_toc_levels(),
            title: None,
        }
    }
}

impl PDF {
    /// The listing style for a heading level, if that level is listed.
    pub fn toc_level(&self, level: u8) -> Option<&TocLevel> {
        self.toc_levels.iter().find(|l| l.level == level)
    }

    /// Add or replace the listing style for a heading level.
    pub fn set_toc_level(&mut self, level: TocLevel) {
        match self.toc_levels.iter_mut().find(|l| l.level == level.level) {
            Some(existing) => *existing = level,
            None => {
                self.toc_levels.push(level);
                self.toc_levels.sort_by_key(|l| l.level);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (what, family) in [
            ("chapter font", &self.chapter_font),
            ("text font", &self.text_font),
        ] {
            if !is_builtin_family(family) {
                return Err(BookError::InvalidConfig(format!(
                    "{what} '{family}' is not one of Arial, Helvetica, Times or Courier"
                ))
                .into());
            }
        }

        for level in self.toc_levels.iter() {
            if !(1..=6).contains(&level.level) {
                return Err(BookError::InvalidConfig(format!(
                    "table of contents level {} is not a heading level",
                    level.level
                ))
                .into());
            }
            if let Some(family) = &level.font_family {
                if !is_builtin_family(family) {
                    return Err(BookError::InvalidConfig(format!(
                        "table of contents font '{family}' is not one of Arial, Helvetica, Times or Courier"
                    ))
                    .into());
                }
            }
            if level.size_pt <= 0.0 {
                return Err(BookError::InvalidConfig(format!(
                    "table of contents level {} has no size",
                    level.level
                ))
                .into());
            }
        }

        Ok(())
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookConfig {
    #[serde(default)]
    pub pdf: PDF,
}

impl BookConfig {
    pub fn from_toml(contents: &str) -> Result<BookConfig> {
        toml::from_str(contents)
            .map_err(|e| BookError::InvalidConfig(format!("failed to parse TOML: {e}")).into())
    }
}

/// Statistics from rendering a PDF, used for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub page_count: usize,
    pub chapter_count: usize,
    pub heading_count: usize,
    /// How many layout runs it took for page numbers to settle
    pub layout_runs: usize,
}
