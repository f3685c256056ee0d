//! Markdown front end: CommonMark plus the common GitHub extensions,
//! rendered to HTML by comrak and parsed back into a [`Dom`].

use crate::error::BookError;
use crate::html::{parse_html, Dom};
use anyhow::Result;
use comrak::Options;

/// Tables, strikethrough, autolinks, task lists and footnotes. Raw HTML in
/// the source is not passed through.
pub fn markdown_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options
}

pub fn markdown_to_html(markdown: &str) -> String {
    comrak::markdown_to_html(markdown, &markdown_options())
}

/// Decode a Markdown file's bytes and parse it all the way to a DOM.
pub fn parse_markdown(bytes: &[u8]) -> Result<Dom> {
    let markdown = std::str::from_utf8(bytes)
        .map_err(|e| BookError::Parse(format!("markdown is not valid UTF-8: {e}")))?;
    let html = markdown_to_html(markdown);
    Ok(parse_html(&html))
}
