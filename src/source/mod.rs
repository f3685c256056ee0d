//! The book's input: a root directory of `Episode*` chapter directories.

mod chapter;
pub mod classify;
mod discovery;

pub use chapter::{Chapter, ChapterBuilder};
pub use discovery::{discover_chapters, validate_root};
