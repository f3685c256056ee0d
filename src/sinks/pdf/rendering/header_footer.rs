//! Page footers with a customisable template.
//!
//! Templates support placeholders:
//! - `{n}` - page number
//! - `{title}` - book title, empty when none is configured

use crate::canvas::{Canvas, FooterFn};
use crate::layout::{colours, Align, FontStyle};
use crate::sinks::pdf::config::PDF;

const FOOTER_FONT: &str = "Arial";
const FOOTER_FONT_SIZE: f64 = 8.0;
/// Distance of the footer cell from the bottom edge
const FOOTER_OFFSET: f64 = 15.0;
const FOOTER_HEIGHT: f64 = 10.0;

pub fn expand_template(template: &str, page: usize, title: Option<&str>) -> String {
    template
        .replace("{n}", &page.to_string())
        .replace("{title}", title.unwrap_or(""))
}

/// The footer drawn on every page as it is closed, if page numbers are on.
pub fn footer(config: &PDF) -> Option<FooterFn> {
    if !config.page_numbers {
        return None;
    }

    let template = config.footer.clone();
    let title = config.title.clone();
    Some(Box::new(move |canvas: &mut Canvas| {
        let label = expand_template(&template, canvas.page_no(), title.as_deref());
        let geometry = canvas.geometry();

        canvas.set_y(-FOOTER_OFFSET);
        canvas.set_font(FOOTER_FONT, FontStyle::Italic, FOOTER_FONT_SIZE);
        canvas.set_text_colour(colours::BLACK);
        canvas.set_x(geometry.margin);
        canvas.cell(
            geometry.content_width(),
            FOOTER_HEIGHT,
            &label,
            Align::Centre,
            false,
        );
    }))
}
