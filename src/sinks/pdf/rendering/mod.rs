//! Laying out the book.
//!
//! A book is laid out by rendering every chapter onto a fresh [`Canvas`]. The
//! table of contents at the front needs the page number of every heading, and
//! its own length moves those headings, so layout runs repeatedly: each run
//! prints the contents recorded by the run before it, and records the heading
//! positions it produced. Once a run records exactly what it printed, the page
//! numbers have settled and a final content pass produces the document.
//!
//! ## Style discipline
//!
//! Every change a renderer makes to the text style, text colour or left
//! margin goes through [`Renderer::with_style`], [`Renderer::with_text_colour`]
//! or [`Renderer::with_left_margin`]. Each restores the previous value when its
//! closure returns, whether it succeeded or not, so a subtree can never leak
//! its styling into its siblings.
//!
//! ## Progress
//!
//! The content pass accepts a progress bar from the caller, updating it with
//! the current file name and incrementing it after each file.

mod chapter_title;
mod elements;
mod header_footer;
mod images;
mod table_of_contents;
mod tables;

pub use header_footer::expand_template;
pub use images::resolve_image;
pub use table_of_contents::ellipsize;
pub use tables::{column_count, parse_table, Table};

use crate::canvas::{Canvas, DocumentInfo, LinkId};
use crate::error::BookError;
use crate::layout::{Colour, PageGeometry, TextStyle, FILE_SEPARATION, MARGIN};
use crate::markdown::parse_markdown;
use crate::sinks::pdf::config::{RenderStats, PDF};
use crate::sinks::pdf::fonts::BookFonts;
use crate::source::Chapter;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Upper bound on layout runs spent waiting for page numbers to settle.
pub const MAX_LAYOUT_RUNS: usize = 4;

/// A heading, and where it landed.
#[derive(Clone, Debug)]
pub struct TocEntry {
    pub title: String,
    /// 1 for `h1` through 6 for `h6`
    pub level: u8,
    /// 1-based
    pub page_num: usize,
    /// Only meaningful on the canvas that recorded the entry
    pub link: LinkId,
}

impl TocEntry {
    /// Same heading on the same page; links are ignored.
    pub fn same_place(&self, other: &TocEntry) -> bool {
        self.title == other.title && self.level == other.level && self.page_num == other.page_num
    }
}

fn settled(recorded: &[TocEntry], printed: &[TocEntry]) -> bool {
    recorded.len() == printed.len()
        && recorded
            .iter()
            .zip(printed.iter())
            .all(|(a, b)| a.same_place(b))
}

/// Stops a compilation between two files once triggered. Clones share the
/// same flag, so one can be handed to another thread.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The laid out book, before serialization.
#[derive(Debug)]
pub struct BookLayout {
    pub document: Canvas,
    /// Every heading in document order; links point into `document`
    pub toc: Vec<TocEntry>,
    pub stats: RenderStats,
}

/// Where in the input the renderer currently is.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub root_dir: &'a Path,
    pub chapter: &'a Chapter,
    pub current_file: &'a Path,
}

impl PDF {
    pub fn render(
        &self,
        root_dir: &Path,
        chapters: &[Chapter],
        progress: &ProgressBar,
        cancel: Option<&CancellationToken>,
    ) -> Result<BookLayout> {
        self.validate()?;
        let fonts = BookFonts::load(self)?;

        let mut toc: Vec<TocEntry> = Vec::new();
        let mut runs = 0;
        loop {
            runs += 1;
            let mut renderer = Renderer::new(self, &fonts);
            renderer
                .render_book(root_dir, chapters, &toc, None, cancel)
                .with_context(|| format!("Failed to lay out the book (run {runs})"))?;
            let recorded = renderer.finish().1;

            let done = settled(&recorded, &toc);
            toc = recorded;
            if done {
                break;
            }
            if runs == MAX_LAYOUT_RUNS {
                log::warn!(
                    "page numbers did not settle after {runs} layout runs; the table of contents may be off"
                );
                break;
            }
        }
        log::info!(
            "laid out {} heading(s) across {} chapter(s) in {runs} run(s)",
            toc.len(),
            chapters.len()
        );

        let total_files: usize = chapters.iter().map(|c| c.files().len()).sum();
        progress.set_length(total_files as u64);

        let mut renderer = Renderer::new(self, &fonts);
        renderer.render_book(root_dir, chapters, &toc, Some(progress), cancel)?;
        let (document, toc) = renderer.finish();

        let stats = RenderStats {
            page_count: document.page_no(),
            chapter_count: chapters.len(),
            heading_count: toc.len(),
            layout_runs: runs,
        };
        Ok(BookLayout {
            document,
            toc,
            stats,
        })
    }
}

/// Lays out one run of the book onto its own canvas.
pub(crate) struct Renderer<'a> {
    config: &'a PDF,
    fonts: &'a BookFonts,
    canvas: Canvas,
    style: TextStyle,
    /// Left edge of the innermost block; list items indent from here
    block_left: f64,
    toc: Vec<TocEntry>,
    /// Links the table of contents points at, one per heading
    toc_links: Vec<LinkId>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(config: &'a PDF, fonts: &'a BookFonts) -> Renderer<'a> {
        let mut canvas = Canvas::new(PageGeometry::a4());
        canvas.set_auto_page_break(true, MARGIN);
        canvas.set_footer(header_footer::footer(config));
        canvas.set_info(DocumentInfo {
            title: config.title.clone(),
            creator: Some(concat!("episode-book v", env!("CARGO_PKG_VERSION")).to_string()),
        });

        let style = fonts.body();
        canvas.set_text_style(&style);

        Renderer {
            config,
            fonts,
            canvas,
            style,
            block_left: MARGIN,
            toc: Vec::new(),
            toc_links: Vec::new(),
        }
    }

    pub(crate) fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub(crate) fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Close the document and hand back the canvas and recorded headings.
    pub(crate) fn finish(mut self) -> (Canvas, Vec<TocEntry>) {
        if self.canvas.page_no() == 0 {
            self.canvas.add_page();
        }
        self.canvas.finish();
        (self.canvas, self.toc)
    }

    fn page_height(&self) -> f64 {
        self.canvas.geometry().height
    }

    /// Set `style` for the duration of `f`.
    pub(crate) fn with_style<R>(&mut self, style: TextStyle, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.style, style);
        self.canvas.set_text_style(&self.style);
        let result = f(self);
        self.style = previous;
        self.canvas.set_text_style(&self.style);
        result
    }

    pub(crate) fn with_text_colour<R>(
        &mut self,
        colour: Colour,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = self.canvas.text_colour();
        self.canvas.set_text_colour(colour);
        let result = f(self);
        self.canvas.set_text_colour(previous);
        result
    }

    pub(crate) fn with_left_margin<R>(&mut self, margin: f64, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.canvas.left_margin();
        self.canvas.set_left_margin(margin);
        let result = f(self);
        self.canvas.set_left_margin(previous);
        result
    }

    /// Like [`Renderer::with_left_margin`], also making `margin` the edge list
    /// items indent from.
    pub(crate) fn with_block_left<R>(&mut self, margin: f64, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.block_left, margin);
        let result = self.with_left_margin(margin, f);
        self.block_left = previous;
        result
    }

    /// Move to a new page unless `h` more millimetres fit on this one.
    fn ensure_room(&mut self, h: f64) {
        if self.canvas.y() + h > self.canvas.page_break_trigger() {
            self.canvas.add_page();
        }
    }

    /// Record a heading at the cursor: a contents entry, a link destination
    /// and an outline bookmark.
    fn record_heading(&mut self, title: String, level: u8) {
        let link = match self.toc_links.get(self.toc.len()) {
            Some(link) => *link,
            None => self.canvas.add_link(),
        };
        let y = self.canvas.y();
        self.canvas.set_link(link, y);
        self.canvas.add_bookmark(title.clone(), level);
        self.toc.push(TocEntry {
            title,
            level,
            page_num: self.canvas.page_no(),
            link,
        });
    }

    pub(crate) fn render_book(
        &mut self,
        root_dir: &Path,
        chapters: &[Chapter],
        toc: &[TocEntry],
        progress: Option<&ProgressBar>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        if !toc.is_empty() && !self.config.toc_levels.is_empty() {
            self.toc_links = table_of_contents::render(self, toc)
                .with_context(|| "Failed to render table of contents")?;
        }

        for (i, chapter) in chapters.iter().enumerate() {
            self.render_chapter(root_dir, chapter, progress, cancel)
                .with_context(|| format!("failed to process chapter {}", chapter.path().display()))?;

            // the next chapter opens on an odd page
            if i + 1 < chapters.len() && self.canvas.page_no() % 2 == 1 {
                self.canvas.add_page();
            }
        }
        Ok(())
    }

    fn render_chapter(
        &mut self,
        root_dir: &Path,
        chapter: &Chapter,
        progress: Option<&ProgressBar>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        if chapter.files().is_empty() {
            return Err(BookError::EmptyChapter(chapter.path().to_path_buf()).into());
        }

        chapter_title::render(self, chapter);

        let files = chapter.files();
        for (i, file) in files.iter().enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(BookError::Cancelled.into());
            }

            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            if let Some(progress) = progress {
                progress.set_message(file_name);
            }

            let ctx = RenderContext {
                root_dir,
                chapter,
                current_file: file,
            };
            self.render_file(&ctx)
                .with_context(|| format!("failed to process file {}", file.display()))?;

            if let Some(progress) = progress {
                progress.inc(1);
            }
            if i + 1 < files.len() {
                self.canvas.ln(FILE_SEPARATION);
            }
        }
        self.canvas.ln(FILE_SEPARATION);

        Ok(())
    }

    fn render_file(&mut self, ctx: &RenderContext) -> Result<()> {
        log::debug!("rendering {}", ctx.current_file.display());
        let bytes =
            std::fs::read(ctx.current_file).map_err(|e| BookError::io(ctx.current_file, e))?;
        let dom = parse_markdown(&bytes)?;
        let body = dom.body().ok_or(BookError::NoBody)?;

        let body_style = self.fonts.body();
        self.with_style(body_style, |r| r.render_children(&dom, body, ctx))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::html::parse_html;
    use crate::source::ChapterBuilder;
    use tempfile::TempDir;

    /// A one-file chapter on disk, for renderers that need a context.
    pub struct Fixture {
        pub root: TempDir,
        pub chapter: Chapter,
        pub file: std::path::PathBuf,
    }

    impl Fixture {
        pub fn new() -> Fixture {
            let root = tempfile::tempdir().expect("can create temp dir");
            let dir = root.path().join("Episode 1");
            std::fs::create_dir_all(&dir).expect("can create chapter dir");
            let file = dir.join("a.md");
            std::fs::write(&file, "# A\n").expect("can write file");
            let chapter = ChapterBuilder::default()
                .path(&dir)
                .build()
                .expect("can build chapter");
            Fixture {
                root,
                chapter,
                file,
            }
        }

        pub fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                root_dir: self.root.path(),
                chapter: &self.chapter,
                current_file: &self.file,
            }
        }
    }

    /// A renderer with the default configuration, leaked so tests can hold
    /// it without juggling lifetimes.
    pub fn renderer() -> Renderer<'static> {
        let config: &'static PDF = Box::leak(Box::new(PDF::default()));
        let fonts: &'static BookFonts =
            Box::leak(Box::new(BookFonts::load(config).expect("default fonts")));
        Renderer::new(config, fonts)
    }

    /// Render an HTML fragment's body onto a fresh page.
    pub fn render_html<'a>(
        renderer: &mut Renderer<'a>,
        fixture: &Fixture,
        html: &str,
    ) -> Result<()> {
        let dom = parse_html(html);
        let body = dom.body().expect("body is always synthesized");
        if renderer.canvas.page_no() == 0 {
            renderer.canvas.add_page();
        }
        let style = renderer.fonts.body();
        renderer.with_style(style, |r| r.render_children(&dom, body, &fixture.ctx()))
    }
}
