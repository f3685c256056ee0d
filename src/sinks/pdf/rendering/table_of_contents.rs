//! Table of contents with clickable links.
//!
//! Lists every heading whose level has a configured style, indented by level,
//! with a grey leader out to its page number. Each line links to its
//! heading within the document.

use super::{Renderer, TocEntry};
use crate::canvas::{LinkId, LinkTarget};
use crate::layout::{
    colours, Align, FontStyle, CHAPTER_TITLE_HEIGHT, CHAPTER_TITLE_SIZE, CHAPTER_TOP_SPACE,
    INDENT_WIDTH,
};
use anyhow::Result;

const ENTRY_HEIGHT: f64 = 7.0;
const ELLIPSIS: &str = "...";
/// Room kept free between a title, its leader and its page number.
const LEADER_GAP: f64 = 2.0;

/// Shorten `text` with a trailing ellipsis until it is no wider than
/// `max_width`.
pub fn ellipsize<F>(text: &str, max_width: f64, measure: F) -> String
where
    F: Fn(&str) -> f64,
{
    if measure(text) <= max_width {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{ELLIPSIS}", chars.iter().collect::<String>().trim_end());
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Render the table of contents for `entries` starting on a new page.
///
/// Returns one link per entry, in order, for the headings to point at once
/// they are laid out. The section is padded to an even number of pages.
pub(super) fn render(renderer: &mut Renderer, entries: &[TocEntry]) -> Result<Vec<LinkId>> {
    let links: Vec<LinkId> = entries.iter().map(|_| renderer.canvas.add_link()).collect();

    renderer.canvas.add_page();
    let toc_title = renderer.config.toc_title.clone();
    renderer.canvas.add_bookmark(toc_title.clone(), 0);

    let style = renderer.fonts.chapter(FontStyle::Bold, CHAPTER_TITLE_SIZE);
    renderer.with_style(style, |r| {
        r.canvas
            .cell(0.0, CHAPTER_TITLE_HEIGHT, &toc_title, Align::Centre, false)
    });
    renderer.canvas.ln(CHAPTER_TOP_SPACE);

    let mut listed = 0;
    for (entry, link) in entries.iter().zip(links.iter()) {
        let Some(level) = renderer.config.toc_level(entry.level) else {
            continue;
        };
        let style = level.text_style(&renderer.fonts.text);
        renderer.with_style(style, |r| render_entry(r, entry, *link));
        listed += 1;
    }
    log::debug!(
        "table of contents: {listed} of {} heading(s) listed",
        entries.len()
    );

    if renderer.canvas.page_no() % 2 == 1 {
        renderer.canvas.add_page();
    }
    Ok(links)
}

fn render_entry(renderer: &mut Renderer, entry: &TocEntry, link: LinkId) {
    renderer.ensure_room(ENTRY_HEIGHT);

    let canvas = &mut renderer.canvas;
    let x = canvas.left_margin() + (entry.level.saturating_sub(1)) as f64 * INDENT_WIDTH;
    let y = canvas.y();
    let right = canvas.right_edge();

    let page_num = entry.page_num.to_string();
    let num_width = canvas.string_width(&page_num) + LEADER_GAP;
    let title_room = right - x - num_width - 2.0 * LEADER_GAP;
    let title = ellipsize(&entry.title, title_room, |s| canvas.string_width(s));
    let title_width = canvas.string_width(&title) + LEADER_GAP;

    canvas.set_x(x);
    canvas.cell(title_width, ENTRY_HEIGHT, &title, Align::Left, false);

    let leader_start = x + title_width + LEADER_GAP;
    let leader_end = right - num_width - LEADER_GAP;
    if leader_end > leader_start {
        let leader_y = y + 0.7 * ENTRY_HEIGHT;
        canvas.set_draw_colour(colours::LEADER);
        canvas.line(leader_start, leader_y, leader_end, leader_y);
        canvas.set_draw_colour(colours::BLACK);
    }

    canvas.set_x(right - num_width);
    canvas.cell(num_width, ENTRY_HEIGHT, &page_num, Align::Right, false);

    canvas.link(x, y, right - x, ENTRY_HEIGHT, LinkTarget::Internal(link));
    canvas.ln(ENTRY_HEIGHT);
}
