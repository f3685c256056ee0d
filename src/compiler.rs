//! Compiling a directory of episodes into a PDF.
//!
//! [`BookCompiler`] ties discovery and rendering together: it finds the
//! chapters under a root directory, lays the book out with its [`PDF`]
//! configuration, and writes the document to disk only once everything has
//! rendered. A failed compilation never leaves a partial file behind.

use crate::error::BookError;
use crate::sinks::pdf::{BookConfig, BookLayout, CancellationToken, RenderStats, TocLevel, PDF};
use crate::source::{discover_chapters, validate_root};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BookCompiler {
    root_dir: PathBuf,
    output_path: PathBuf,
    config: PDF,
    cancel: Option<CancellationToken>,
}

impl BookCompiler {
    pub fn new(root_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> BookCompiler {
        BookCompiler {
            root_dir: root_dir.into(),
            output_path: output_path.into(),
            config: PDF::default(),
            cancel: None,
        }
    }

    pub fn with_config(mut self, config: BookConfig) -> Self {
        self.config = config.pdf;
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn config(&self) -> &PDF {
        &self.config
    }

    pub fn set_toc_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.config.toc_title = title.into();
        self
    }

    pub fn set_page_numbers(&mut self, enabled: bool) -> &mut Self {
        self.config.page_numbers = enabled;
        self
    }

    pub fn set_chapter_font(&mut self, family: impl Into<String>) -> &mut Self {
        self.config.chapter_font = family.into();
        self
    }

    pub fn set_text_font(&mut self, family: impl Into<String>) -> &mut Self {
        self.config.text_font = family.into();
        self
    }

    pub fn set_toc_level(&mut self, level: TocLevel) -> &mut Self {
        self.config.set_toc_level(level);
        self
    }

    /// Leave the table of contents out entirely.
    pub fn clear_toc_levels(&mut self) -> &mut Self {
        self.config.toc_levels.clear();
        self
    }

    pub fn set_cancellation_token(&mut self, token: CancellationToken) -> &mut Self {
        self.cancel = Some(token);
        self
    }

    /// Check the input directory and output path without rendering anything.
    pub fn validate(&self) -> Result<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(BookError::InvalidConfig("output path not provided".to_string()).into());
        }
        validate_root(&self.root_dir)?;
        self.config.validate()
    }

    /// Lay the book out without serializing it.
    pub fn layout(&self) -> Result<BookLayout> {
        self.layout_with_progress(&ProgressBar::hidden())
    }

    pub fn layout_with_progress(&self, progress: &ProgressBar) -> Result<BookLayout> {
        let chapters = discover_chapters(&self.root_dir)?;
        log::info!(
            "found {} chapter(s) in {}",
            chapters.len(),
            self.root_dir.display()
        );
        self.config
            .render(&self.root_dir, &chapters, progress, self.cancel.as_ref())
    }

    /// The finished PDF, in memory.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>> {
        let mut layout = self.layout()?;
        layout
            .document
            .to_pdf_bytes()
            .with_context(|| "Failed to serialize PDF")
    }

    pub fn compile(&self) -> Result<RenderStats> {
        self.compile_with_progress(&ProgressBar::hidden())
    }

    pub fn compile_with_progress(&self, progress: &ProgressBar) -> Result<RenderStats> {
        self.validate()?;

        let mut layout = self.layout_with_progress(progress)?;
        let bytes = layout
            .document
            .to_pdf_bytes()
            .with_context(|| "Failed to serialize PDF")?;
        std::fs::write(&self.output_path, bytes)
            .map_err(|e| BookError::io(&self.output_path, e))?;

        log::debug!(
            "wrote {} page(s) to {}",
            layout.stats.page_count,
            self.output_path.display()
        );
        Ok(layout.stats)
    }
}

/// Compile `dir` with the default configuration and return the PDF bytes.
pub fn directory_to_pdf(dir: impl AsRef<Path>) -> Result<Vec<u8>> {
    BookCompiler::new(dir.as_ref(), PathBuf::new()).to_pdf_bytes()
}

/// Compile `dir` with the default configuration into the file at `path`.
pub fn directory_to_pdf_file(dir: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<()> {
    BookCompiler::new(dir.as_ref(), path.as_ref())
        .compile()
        .map(|_| ())
}
