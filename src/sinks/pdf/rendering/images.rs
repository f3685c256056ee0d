//! Inline images.
//!
//! Images are placed at the left of the text column at a fixed width, keeping
//! their aspect ratio, with the `alt` text underneath as a caption. Only JPEGs
//! can be embedded.

use super::{RenderContext, Renderer};
use crate::error::BookError;
use crate::html::{Dom, NodeId};
use crate::layout::{
    FontStyle, CAPTION_FONT_SIZE, DEFAULT_LINE_HEIGHT, IMAGE_BREAK_DISTANCE, IMAGE_WIDTH,
};
use crate::source::classify;
use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Find the file an `<img src>` refers to.
///
/// In order, the first existing candidate wins:
/// 1. the chapter's image index, by `src` as written
/// 2. `src` as a path
/// 3. `src` under the book's root directory
/// 4. `src` next to the Markdown file being rendered
pub fn resolve_image(src: &str, ctx: &RenderContext) -> Result<PathBuf> {
    if let Some(indexed) = ctx.chapter.image(src) {
        return Ok(indexed.to_path_buf());
    }

    let file_dir = ctx.current_file.parent().unwrap_or(Path::new(""));
    [
        PathBuf::from(src),
        ctx.root_dir.join(src),
        file_dir.join(src),
    ]
    .into_iter()
    .find(|candidate| candidate.exists())
    .ok_or_else(|| BookError::ImageNotFound(src.to_string()).into())
}

/// The file name an `<img src>` was written with. Markdown output
/// percent-encodes spaces and non-ASCII characters in URLs.
fn image_source(src: &str) -> Cow<'_, str> {
    percent_decode_str(src)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(src))
}

pub(super) fn render(
    renderer: &mut Renderer,
    dom: &Dom,
    id: NodeId,
    ctx: &RenderContext,
) -> Result<()> {
    let src = dom.attr(id, "src").unwrap_or_default().trim();
    if src.is_empty() {
        return Ok(());
    }

    let path = resolve_image(&image_source(src), ctx)?;
    if !classify::is_jpeg(&path) {
        return Err(BookError::UnsupportedImageFormat(path).into());
    }

    renderer.canvas.ln(DEFAULT_LINE_HEIGHT);
    let image = renderer
        .canvas
        .register_image(&path)
        .with_context(|| format!("failed to load image {}", path.display()))?;
    let height = image.height_px as f64 * IMAGE_WIDTH / image.width_px as f64;

    if renderer.canvas.y() + height > renderer.page_height() - IMAGE_BREAK_DISTANCE {
        renderer.canvas.add_page();
    }
    let (x, y) = (renderer.canvas.x(), renderer.canvas.y());
    renderer.canvas.image(&image, x, y, IMAGE_WIDTH, height);
    renderer.canvas.set_y(y + height + DEFAULT_LINE_HEIGHT);

    let alt = dom.attr(id, "alt").unwrap_or_default().trim();
    if !alt.is_empty() {
        let style = renderer.fonts.text(FontStyle::Italic, CAPTION_FONT_SIZE);
        renderer.with_style(style, |r| r.canvas.write(DEFAULT_LINE_HEIGHT, alt));
        renderer.canvas.ln(DEFAULT_LINE_HEIGHT);
    }
    renderer.canvas.ln(DEFAULT_LINE_HEIGHT);
    Ok(())
}
