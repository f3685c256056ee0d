//! Compile directories of Markdown episodes into a printable PDF book.
//!
//! A book lives in a root directory holding one `Episode*` directory per
//! chapter. Each chapter's Markdown files are rendered in name order after a
//! centred `Episode <N>` title page; chapters are ordered by the number in
//! their name. The PDF opens with a linked table of contents and every page
//! carries its number in the footer.
//!
//! ```no_run
//! use episode_book::BookCompiler;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut compiler = BookCompiler::new("season-one", "season-one.pdf");
//! compiler.set_toc_title("Episodes");
//! let stats = compiler.compile()?;
//! println!("{} pages", stats.page_count);
//! # Ok(())
//! # }
//! ```

pub mod canvas;
mod compiler;
pub mod error;
pub mod html;
pub mod layout;
pub mod markdown;
pub mod sinks {
    pub mod pdf;
}
pub mod source;
pub mod wrap;

pub use compiler::{directory_to_pdf, directory_to_pdf_file, BookCompiler};
pub use error::BookError;
pub use sinks::pdf::{
    BookConfig, BookLayout, CancellationToken, RenderStats, TocEntry, TocLevel, PDF,
};
