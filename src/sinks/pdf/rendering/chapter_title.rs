use super::Renderer;
use crate::canvas::Canvas;
use crate::layout::{
    Align, FontStyle, CHAPTER_TITLE_HEIGHT, CHAPTER_TITLE_SIZE, CHAPTER_TOP_SPACE,
};
use crate::source::Chapter;

/// Centre `text` on the page in a single cell at the current height.
pub(super) fn centred_cell(canvas: &mut Canvas, h: f64, text: &str) {
    let width = canvas.string_width(text);
    canvas.set_x((canvas.geometry().width - width) / 2.0);
    canvas.cell(width, h, text, Align::Left, false);
}

/// Open a chapter: a fresh page with the chapter's title centred near the
/// top, which is also the chapter's outline entry.
pub(super) fn render(renderer: &mut Renderer, chapter: &Chapter) {
    let title = chapter.title();

    renderer.canvas.add_page();
    renderer.canvas.ln(CHAPTER_TOP_SPACE);
    renderer.canvas.add_bookmark(title.clone(), 0);

    let style = renderer.fonts.chapter(FontStyle::Bold, CHAPTER_TITLE_SIZE);
    renderer.with_style(style, |r| {
        centred_cell(&mut r.canvas, CHAPTER_TITLE_HEIGHT, &title)
    });
    renderer.canvas.ln(CHAPTER_TOP_SPACE);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::canvas::Op;

    #[test]
    fn can_centre_the_title() {
        let fixture = Fixture::new();
        let mut renderer = renderer();
        render(&mut renderer, &fixture.chapter);

        let canvas = renderer.canvas();
        assert_eq!(canvas.page_no(), 1);
        let (x, text, font, size) = canvas.pages()[0]
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Text {
                    x,
                    text,
                    font,
                    size_pt,
                    ..
                } => Some((*x, text.clone(), font.base_font(), *size_pt)),
                _ => None,
            })
            .expect("title is drawn");
        assert_eq!(text, "Episode 1");
        assert_eq!(font, "Helvetica-Bold");
        assert_eq!(size, 24.0);

        // centred, allowing for the cell's inner margin
        let width = {
            let mut probe = Canvas::new(canvas.geometry());
            probe.set_font("Arial", FontStyle::Bold, 24.0);
            probe.string_width("Episode 1")
        };
        let expected = (canvas.geometry().width - width) / 2.0 + 1.0;
        assert!((x - expected).abs() < 1e-9, "{x} vs {expected}");

        assert_eq!(canvas.y(), 20.0 + 20.0 + 20.0);
        assert_eq!(canvas.bookmarks()[0].title, "Episode 1");
        assert_eq!(canvas.bookmarks()[0].level, 0);
        assert_eq!(renderer.style(), &renderer.fonts.body());
    }
}
