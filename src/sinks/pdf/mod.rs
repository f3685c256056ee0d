//! The PDF sink: configuration, fonts, and laying out the book.

pub mod config;
pub mod fonts;
mod rendering;

pub use config::{BookConfig, RenderStats, TocLevel, PDF};
pub use rendering::{
    column_count, ellipsize, expand_template, parse_table, resolve_image, BookLayout,
    CancellationToken, RenderContext, Table, TocEntry, MAX_LAYOUT_RUNS,
};
