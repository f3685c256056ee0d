//! Rendering of the HTML tree produced from a Markdown file.

use super::{images, tables, RenderContext, Renderer};
use crate::html::{Dom, NodeData, NodeId};
use crate::layout::{
    colours, FontStyle, TextStyle, BLOCKQUOTE_INDENT, BLOCK_BREAK_DISTANCE, BLOCK_TRAILING_SPACE,
    CODE_FONT_FAMILY, CODE_FONT_SIZE, DEFAULT_LINE_HEIGHT, HEADING_BREAK_DISTANCE, INDENT_WIDTH,
    PAGE_CONTENT_WIDTH,
};
use anyhow::Result;

/// Elements preceded by one blank line.
const SPACED_ELEMENTS: &[&str] = &["h1", "h2", "h3", "p", "ul", "ol", "table", "blockquote"];

const PARAGRAPH_LEADING: f64 = 2.5;
const UNDERLINE_OFFSET: f64 = 3.0;
const STRIKE_OFFSET: f64 = 2.5;

/// Space above a heading, and its size in points.
fn heading_metrics(level: u8) -> (f64, f64) {
    match level {
        1 => (20.0, 24.0),
        2 => (15.0, 20.0),
        3 => (10.0, 16.0),
        _ => (8.0, 14.0),
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Collapse every whitespace run to a single space, keeping a space at
/// either end if there was whitespace there.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

impl Renderer<'_> {
    pub(crate) fn render_children(
        &mut self,
        dom: &Dom,
        parent: NodeId,
        ctx: &RenderContext,
    ) -> Result<()> {
        for child in dom.children(parent) {
            if dom
                .tag(child)
                .is_some_and(|tag| SPACED_ELEMENTS.contains(&tag))
            {
                self.canvas.ln(DEFAULT_LINE_HEIGHT);
            }
            self.render_node(dom, child, ctx)?;
        }
        Ok(())
    }

    fn render_node(&mut self, dom: &Dom, id: NodeId, ctx: &RenderContext) -> Result<()> {
        let Some(node) = dom.get(id) else {
            return Ok(());
        };
        match &node.data {
            NodeData::Document => self.render_children(dom, id, ctx),
            NodeData::Text(text) => {
                self.render_text(dom, id, text);
                Ok(())
            }
            NodeData::Comment(_) | NodeData::Doctype { .. } => Ok(()),
            NodeData::Element { name, .. } => self.render_element(dom, id, name.local.as_ref(), ctx),
        }
    }

    fn render_element(
        &mut self,
        dom: &Dom,
        id: NodeId,
        tag: &str,
        ctx: &RenderContext,
    ) -> Result<()> {
        if let Some(level) = heading_level(tag) {
            return self.render_heading(dom, id, level, ctx);
        }

        match tag {
            "p" => self.render_paragraph(dom, id, ctx),
            "blockquote" => self.render_blockquote(dom, id, ctx),
            "pre" => self.render_pre(dom, id, ctx),
            "code" => {
                let style = if dom.find_ancestor(id, "pre").is_some() {
                    TextStyle {
                        font_family: CODE_FONT_FAMILY.to_string(),
                        ..self.style.clone()
                    }
                } else {
                    self.fonts.code(CODE_FONT_SIZE)
                };
                self.with_style(style, |r| r.render_children(dom, id, ctx))
            }
            "ul" | "ol" => {
                self.canvas.ln(DEFAULT_LINE_HEIGHT);
                self.render_children(dom, id, ctx)?;
                self.canvas.ln(DEFAULT_LINE_HEIGHT);
                Ok(())
            }
            "li" => self.render_list_item(dom, id, ctx),
            "em" | "i" => {
                let style = self.style.clone().italicized();
                self.with_style(style, |r| r.render_children(dom, id, ctx))
            }
            "strong" | "b" => {
                let style = self.style.clone().bolded();
                self.with_style(style, |r| r.render_children(dom, id, ctx))
            }
            "u" => self.render_ruled(dom, id, UNDERLINE_OFFSET, ctx),
            "del" | "s" => self.render_ruled(dom, id, STRIKE_OFFSET, ctx),
            "a" => self.render_anchor(dom, id, ctx),
            "br" => {
                self.canvas.ln(DEFAULT_LINE_HEIGHT);
                Ok(())
            }
            "img" => images::render(self, dom, id, ctx),
            "table" => tables::render(self, dom, id),
            "hr" => {
                let (x, y) = (self.canvas.x(), self.canvas.y());
                self.canvas.line(x, y, x + PAGE_CONTENT_WIDTH, y);
                self.canvas.ln(BLOCK_TRAILING_SPACE);
                Ok(())
            }
            other => {
                log::trace!("skipping <{other}>");
                Ok(())
            }
        }
    }

    fn render_text(&mut self, dom: &Dom, id: NodeId, text: &str) {
        if dom.find_ancestor(id, "pre").is_some() {
            let text = text.replace('\t', "    ");
            self.canvas.write(DEFAULT_LINE_HEIGHT, &text);
            return;
        }

        let text = collapse_whitespace(text);
        if text.trim().is_empty() {
            return;
        }
        let text = if self.canvas.x() <= self.canvas.left_margin() {
            text.trim_start()
        } else {
            text.as_str()
        };
        self.canvas.write(DEFAULT_LINE_HEIGHT, text);
    }

    /// Start a new page if the cursor is lower than `distance` from the
    /// bottom edge.
    fn break_above(&mut self, distance: f64) {
        if self.canvas.y() > self.page_height() - distance {
            self.canvas.add_page();
        }
    }

    fn render_heading(
        &mut self,
        dom: &Dom,
        id: NodeId,
        level: u8,
        ctx: &RenderContext,
    ) -> Result<()> {
        if level == 1 {
            self.canvas.add_page();
        } else {
            self.break_above(HEADING_BREAK_DISTANCE);
        }

        let (space, size) = heading_metrics(level);
        self.canvas.ln(space);

        let title = collapse_whitespace(&dom.text_content(id)).trim().to_string();
        self.record_heading(title, level);

        let style = self.fonts.chapter(FontStyle::Bold, size);
        self.with_style(style, |r| r.render_children(dom, id, ctx))?;
        self.canvas.ln(2.0 * DEFAULT_LINE_HEIGHT);
        Ok(())
    }

    fn render_paragraph(&mut self, dom: &Dom, id: NodeId, ctx: &RenderContext) -> Result<()> {
        self.break_above(BLOCK_BREAK_DISTANCE);

        let mut style = self.fonts.body();
        if dom.find_ancestor(id, "blockquote").is_some() {
            style = style.italicized();
        }

        self.canvas.ln(PARAGRAPH_LEADING);
        self.with_style(style, |r| r.render_children(dom, id, ctx))?;
        self.canvas.ln(DEFAULT_LINE_HEIGHT);
        Ok(())
    }

    fn render_blockquote(&mut self, dom: &Dom, id: NodeId, ctx: &RenderContext) -> Result<()> {
        self.break_above(BLOCK_BREAK_DISTANCE);
        self.canvas.ln(DEFAULT_LINE_HEIGHT);

        let margin = self.canvas.left_margin() + BLOCKQUOTE_INDENT;
        let style = self.fonts.body().italicized();
        self.with_block_left(margin, |r| {
            r.with_style(style, |r| r.render_children(dom, id, ctx))
        })?;

        self.canvas.ln(BLOCK_TRAILING_SPACE);
        self.canvas.ln(DEFAULT_LINE_HEIGHT);
        Ok(())
    }

    fn render_pre(&mut self, dom: &Dom, id: NodeId, ctx: &RenderContext) -> Result<()> {
        self.break_above(BLOCK_BREAK_DISTANCE);
        self.canvas.ln(DEFAULT_LINE_HEIGHT);

        let style = self.fonts.code(CODE_FONT_SIZE);
        self.with_style(style, |r| r.render_children(dom, id, ctx))?;

        self.canvas.ln(BLOCK_TRAILING_SPACE);
        self.canvas.ln(DEFAULT_LINE_HEIGHT);
        Ok(())
    }

    fn render_list_item(&mut self, dom: &Dom, id: NodeId, ctx: &RenderContext) -> Result<()> {
        let indent = if dom.find_ancestor(id, "li").is_some() {
            2.0 * INDENT_WIDTH
        } else {
            INDENT_WIDTH
        };
        let margin = self.block_left + indent;

        let numbered = dom.parent(id).and_then(|p| dom.tag(p)) == Some("ol");
        let marker = if numbered {
            format!("{}. ", dom.preceding_element_siblings(id) + 1)
        } else {
            "\u{2022} ".to_string()
        };

        self.with_left_margin(margin, |r| {
            r.canvas.write(DEFAULT_LINE_HEIGHT, &marker);
            r.render_children(dom, id, ctx)
        })?;
        self.canvas.ln(DEFAULT_LINE_HEIGHT);
        Ok(())
    }

    /// Children, then a rule `offset` below the top of the line they started
    /// on, as wide as their text.
    fn render_ruled(
        &mut self,
        dom: &Dom,
        id: NodeId,
        offset: f64,
        ctx: &RenderContext,
    ) -> Result<()> {
        let (x, y) = (self.canvas.x(), self.canvas.y());
        self.render_children(dom, id, ctx)?;

        let width = self.canvas.string_width(&collapse_whitespace(&dom.text_content(id)));
        self.canvas.line(x, y + offset, x + width, y + offset);
        Ok(())
    }

    fn render_anchor(&mut self, dom: &Dom, id: NodeId, ctx: &RenderContext) -> Result<()> {
        let href = dom.attr(id, "href").unwrap_or_default().trim().to_string();
        if href.is_empty() {
            return self.render_children(dom, id, ctx);
        }

        self.with_text_colour(colours::BLUE, |r| {
            if !href.starts_with('#') {
                r.canvas.set_uri(Some(href));
            }
            let result = r.render_children(dom, id, ctx);
            r.canvas.set_uri(None);
            result
        })
    }
}
