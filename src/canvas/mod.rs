//! A cursor-based PDF drawing surface.
//!
//! The canvas keeps a write position in millimetres (origin at the top-left
//! corner of the page) and a current font and colours, and offers the handful
//! of primitives the book renderers need: flowing text that wraps at the right
//! margin, fixed-width cells, wrapped multi-line cells, rules, rectangles and
//! JPEG images. Pages break automatically when text or cells would run into
//! the bottom margin.
//!
//! Nothing is serialized until [`Canvas::to_pdf_bytes`]; until then every page
//! is a list of recorded [`Op`]s, which is also what the tests inspect.
//!
//! ## Links and bookmarks
//!
//! Internal links are created with [`Canvas::add_link`], pointed at a position
//! with [`Canvas::set_link`], and attached to a clickable area with
//! [`Canvas::link`]. While a URI is set with [`Canvas::set_uri`], every piece
//! of text produced by [`Canvas::write`] becomes a clickable web link.
//! Bookmarks build the document outline shown in a reader's sidebar.

pub mod fonts;
pub mod images;
mod writer;

use crate::layout::{colours, Align, Colour, FontStyle, PageGeometry, TextStyle, PT_PER_MM};
use crate::wrap::wrap_text;
use anyhow::Result;
use fonts::{encode_win_ansi, BuiltinFont};
use images::JpegImage;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

const EPSILON: f64 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RectStyle {
    Fill,
    Stroke,
    FillStroke,
}

/// A drawing operation recorded on a page. Coordinates are millimetres from
/// the top-left corner; text coordinates are the baseline origin.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Text {
        x: f64,
        y: f64,
        font: BuiltinFont,
        size_pt: f64,
        colour: Colour,
        text: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        colour: Colour,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        style: RectStyle,
        fill: Colour,
        stroke: Colour,
        line_width: f64,
    },
    Image {
        image: ImageId,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(usize);

#[derive(Clone, Debug, PartialEq)]
pub enum LinkTarget {
    Internal(LinkId),
    Uri(String),
}

/// A clickable rectangle on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkArea {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub target: LinkTarget,
}

/// Where an internal link lands: a zero-based page index and a y position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Destination {
    pub page: usize,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bookmark {
    pub title: String,
    pub level: u8,
    pub destination: Destination,
}

#[derive(Clone, Debug, Default)]
pub struct Page {
    pub ops: Vec<Op>,
    pub links: Vec<LinkArea>,
}

impl Page {
    /// Every piece of text on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// All text on the page joined with single spaces, whitespace collapsed.
    pub fn plain_text(&self) -> String {
        self.texts()
            .flat_map(str::split_whitespace)
            .collect::<Vec<&str>>()
            .join(" ")
    }

    pub fn rects(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter().filter(|op| matches!(op, Op::Rect { .. }))
    }

    pub fn is_blank(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Handle returned by [`Canvas::register_image`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisteredImage {
    pub id: ImageId,
    pub width_px: u32,
    pub height_px: u32,
}

/// Document-level metadata. Deliberately has no dates so output is reproducible.
#[derive(Clone, Debug, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub creator: Option<String>,
}

pub type FooterFn = Box<dyn Fn(&mut Canvas)>;

pub struct Canvas {
    geometry: PageGeometry,
    pages: Vec<Page>,
    closed: bool,

    x: f64,
    y: f64,
    left_margin: f64,
    right_margin: f64,
    top_margin: f64,
    break_margin: f64,
    cell_margin: f64,
    auto_page_break: bool,

    font: BuiltinFont,
    font_size_pt: f64,
    text_colour: Colour,
    fill_colour: Colour,
    draw_colour: Colour,
    line_width: f64,

    footer: Option<FooterFn>,
    in_footer: bool,

    images: Vec<JpegImage>,
    image_ids: HashMap<PathBuf, RegisteredImage>,
    links: Vec<Option<Destination>>,
    active_uri: Option<String>,
    bookmarks: Vec<Bookmark>,
    info: DocumentInfo,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("pages", &self.pages.len())
            .field("x", &self.x)
            .field("y", &self.y)
            .field("font", &self.font)
            .field("font_size_pt", &self.font_size_pt)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// An empty document. All margins equal the geometry margin; pages break
    /// once content reaches the bottom margin.
    pub fn new(geometry: PageGeometry) -> Canvas {
        Canvas {
            geometry,
            pages: Vec::new(),
            closed: false,
            x: geometry.margin,
            y: geometry.margin,
            left_margin: geometry.margin,
            right_margin: geometry.margin,
            top_margin: geometry.margin,
            break_margin: geometry.margin,
            cell_margin: 1.0,
            auto_page_break: true,
            font: BuiltinFont::HELVETICA,
            font_size_pt: 12.0,
            text_colour: colours::BLACK,
            fill_colour: colours::BLACK,
            draw_colour: colours::BLACK,
            line_width: 0.2,
            footer: None,
            in_footer: false,
            images: Vec::new(),
            image_ids: HashMap::new(),
            links: Vec::new(),
            active_uri: None,
            bookmarks: Vec::new(),
            info: DocumentInfo::default(),
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn set_info(&mut self, info: DocumentInfo) {
        self.info = info;
    }

    /// Called with the canvas positioned on a page just before that page is
    /// left, either for a new page or at the end of the document.
    pub fn set_footer(&mut self, footer: Option<FooterFn>) {
        self.footer = footer;
    }

    pub fn set_auto_page_break(&mut self, enabled: bool, margin: f64) {
        self.auto_page_break = enabled;
        self.break_margin = margin;
    }

    /// The y position past which content moves to the next page.
    pub fn page_break_trigger(&self) -> f64 {
        self.geometry.height - self.break_margin
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The current page number, starting at 1. Zero before the first page.
    pub fn page_no(&self) -> usize {
        self.pages.len()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn add_page(&mut self) {
        if !self.pages.is_empty() {
            self.close_page();
        }
        self.pages.push(Page::default());
        self.x = self.left_margin;
        self.y = self.top_margin;
    }

    fn close_page(&mut self) {
        if self.in_footer {
            return;
        }
        if let Some(footer) = self.footer.take() {
            let font = self.font;
            let size = self.font_size_pt;
            let text_colour = self.text_colour;
            let (x, y) = (self.x, self.y);
            let uri = self.active_uri.take();

            self.in_footer = true;
            footer(self);
            self.in_footer = false;

            self.font = font;
            self.font_size_pt = size;
            self.text_colour = text_colour;
            self.x = x;
            self.y = y;
            self.active_uri = uri;
            self.footer = Some(footer);
        }
    }

    /// Close the last page. Further drawing is not expected afterwards.
    pub fn finish(&mut self) {
        if !self.closed && !self.pages.is_empty() {
            self.close_page();
        }
        self.closed = true;
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Move to `y` and back to the left margin. A negative `y` is measured
    /// from the bottom of the page.
    pub fn set_y(&mut self, y: f64) {
        self.x = self.left_margin;
        self.y = if y < 0.0 { self.geometry.height + y } else { y };
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_y(y);
        self.x = x;
    }

    /// Line break: back to the left margin and `h` down.
    pub fn ln(&mut self, h: f64) {
        self.x = self.left_margin;
        self.y += h;
    }

    pub fn left_margin(&self) -> f64 {
        self.left_margin
    }

    pub fn set_left_margin(&mut self, margin: f64) {
        self.left_margin = margin;
        if self.x < margin {
            self.x = margin;
        }
    }

    /// Right edge of the writable area.
    pub fn right_edge(&self) -> f64 {
        self.geometry.width - self.right_margin
    }

    /// Select a font by family name. Families other than the built-in ones
    /// fall back to Helvetica.
    pub fn set_font(&mut self, family: &str, style: FontStyle, size_pt: f64) {
        self.font = match BuiltinFont::resolve(family, style) {
            Some(font) => font,
            None => {
                log::warn!("unknown font family '{family}', using Helvetica");
                BuiltinFont::new(fonts::FontFamily::Helvetica, style)
            }
        };
        self.font_size_pt = size_pt;
    }

    pub fn set_text_style(&mut self, style: &TextStyle) {
        self.set_font(&style.font_family, style.style, style.size_pt);
    }

    pub fn font(&self) -> BuiltinFont {
        self.font
    }

    pub fn font_size_pt(&self) -> f64 {
        self.font_size_pt
    }

    fn font_size_mm(&self) -> f64 {
        self.font_size_pt / PT_PER_MM
    }

    pub fn text_colour(&self) -> Colour {
        self.text_colour
    }

    pub fn set_text_colour(&mut self, colour: Colour) {
        self.text_colour = colour;
    }

    pub fn set_fill_colour(&mut self, colour: Colour) {
        self.fill_colour = colour;
    }

    pub fn set_draw_colour(&mut self, colour: Colour) {
        self.draw_colour = colour;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    /// Width of `text` in the current font, in millimetres.
    pub fn string_width(&self, text: &str) -> f64 {
        let units = self.font.text_width(&encode_win_ansi(text));
        units as f64 * self.font_size_pt / 1000.0 / PT_PER_MM
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn check_page_break(&mut self, h: f64) {
        if self.auto_page_break
            && !self.in_footer
            && !self.pages.is_empty()
            && self.y + h > self.page_break_trigger() + EPSILON
        {
            let x = self.x;
            self.add_page();
            self.x = x;
        }
    }

    fn baseline(&self, y: f64, h: f64) -> f64 {
        y + 0.5 * h + 0.3 * self.font_size_mm()
    }

    fn push_text(&mut self, x: f64, y: f64, text: &str) {
        let op = Op::Text {
            x,
            y,
            font: self.font,
            size_pt: self.font_size_pt,
            colour: self.text_colour,
            text: text.to_string(),
        };
        self.current_page().ops.push(op);
    }

    /// Flowing text from the current position. Lines wrap at the right margin
    /// and continue at the left margin `h` lower; `\n` forces a break. The
    /// cursor is left just after the last character.
    pub fn write(&mut self, h: f64, text: &str) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.ln(h);
            }
            self.write_segment(h, segment);
        }
    }

    fn write_segment(&mut self, h: f64, text: &str) {
        let right = self.right_edge();
        let mut line = String::new();
        let mut line_width = 0.0;

        for piece in text.split_inclusive(' ') {
            let word = piece.trim_end_matches(' ');
            let word_width = self.string_width(word);

            if self.x + line_width + word_width > right + EPSILON {
                if !line.is_empty() {
                    self.emit_run(h, &line, line_width);
                    line.clear();
                    line_width = 0.0;
                    self.ln(h);
                } else if self.x > self.left_margin + EPSILON {
                    self.ln(h);
                }

                // still too wide on an empty line: break inside the word
                let mut rest = word;
                while !rest.is_empty() && self.x + self.string_width(rest) > right + EPSILON {
                    let split = self.fitting_prefix(rest, right - self.x);
                    let (head, tail) = rest.split_at(split);
                    let width = self.string_width(head);
                    self.emit_run(h, head, width);
                    self.ln(h);
                    rest = tail;
                }
                line.push_str(rest);
                line.push_str(&piece[word.len()..]);
                line_width = self.string_width(&line);
                continue;
            }

            line.push_str(piece);
            line_width += self.string_width(piece);
        }

        if !line.is_empty() {
            self.emit_run(h, &line, line_width);
        }
    }

    /// Byte length of the longest prefix of `text` fitting in `width`, at
    /// least one character.
    fn fitting_prefix(&self, text: &str, width: f64) -> usize {
        let mut end = 0;
        for (idx, ch) in text.char_indices() {
            let next = idx + ch.len_utf8();
            if end > 0 && self.string_width(&text[..next]) > width + EPSILON {
                break;
            }
            end = next;
        }
        end
    }

    fn emit_run(&mut self, h: f64, text: &str, width: f64) {
        self.check_page_break(h);
        let (x, y) = (self.x, self.y);
        let baseline = self.baseline(y, h);
        self.push_text(x, baseline, text);
        if let Some(uri) = self.active_uri.clone() {
            self.current_page().links.push(LinkArea {
                x,
                y,
                w: width,
                h,
                target: LinkTarget::Uri(uri),
            });
        }
        self.x += width;
    }

    /// A single-line box of width `w` (zero means up to the right margin)
    /// holding `text` aligned within it. The cursor moves to the right of the
    /// box.
    pub fn cell(&mut self, w: f64, h: f64, text: &str, align: Align, fill: bool) {
        self.check_page_break(h);
        let w = if w <= 0.0 { self.right_edge() - self.x } else { w };
        let (x, y) = (self.x, self.y);

        if fill {
            self.push_rect(x, y, w, h, RectStyle::Fill);
        }

        if !text.is_empty() {
            let text_width = self.string_width(text);
            let dx = match align {
                Align::Left | Align::Justify => self.cell_margin,
                Align::Centre => (w - text_width) / 2.0,
                Align::Right => w - self.cell_margin - text_width,
            };
            let baseline = self.baseline(y, h);
            self.push_text(x + dx, baseline, text);
        }

        self.x = x + w;
    }

    /// Inner padding between a cell's edge and its text.
    pub fn cell_margin(&self) -> f64 {
        self.cell_margin
    }

    /// Text wrapped to fit inside cell margins of width `w`, one `h`-high cell
    /// per line, stacked from the current position. The cursor ends at the
    /// left margin below the last line.
    pub fn multi_cell(&mut self, w: f64, h: f64, text: &str, align: Align) {
        let w = if w <= 0.0 { self.right_edge() - self.x } else { w };
        let inner = (w - 2.0 * self.cell_margin).max(0.0);
        let lines = wrap_text(text, inner, |s| self.string_width(s));
        let x = self.x;

        if lines.is_empty() {
            self.y += h;
        }
        for line in lines {
            self.cell(w, h, &line, align, false);
            self.x = x;
            self.y += h;
        }
        self.x = self.left_margin;
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let op = Op::Line {
            x1,
            y1,
            x2,
            y2,
            width: self.line_width,
            colour: self.draw_colour,
        };
        self.current_page().ops.push(op);
    }

    fn push_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: RectStyle) {
        let op = Op::Rect {
            x,
            y,
            w,
            h,
            style,
            fill: self.fill_colour,
            stroke: self.draw_colour,
            line_width: self.line_width,
        };
        self.current_page().ops.push(op);
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: RectStyle) {
        self.push_rect(x, y, w, h, style);
    }

    /// Load a JPEG from disk, once per path.
    pub fn register_image(&mut self, path: &Path) -> Result<RegisteredImage> {
        if let Some(registered) = self.image_ids.get(path) {
            return Ok(*registered);
        }

        let image = JpegImage::new_from_disk(path)?;
        let registered = RegisteredImage {
            id: ImageId(self.images.len()),
            width_px: image.width_px,
            height_px: image.height_px,
        };
        log::debug!(
            "registered image {} ({}x{})",
            path.display(),
            image.width_px,
            image.height_px
        );
        self.images.push(image);
        self.image_ids.insert(path.to_path_buf(), registered);
        Ok(registered)
    }

    /// Place a registered image. A zero `h` keeps the aspect ratio.
    pub fn image(&mut self, image: &RegisteredImage, x: f64, y: f64, w: f64, h: f64) {
        let h = if h <= 0.0 {
            w * image.height_px as f64 / image.width_px as f64
        } else {
            h
        };
        self.current_page().ops.push(Op::Image {
            image: image.id,
            x,
            y,
            w,
            h,
        });
    }

    pub fn add_link(&mut self) -> LinkId {
        self.links.push(None);
        LinkId(self.links.len() - 1)
    }

    /// Point `link` at height `y` of the current page.
    pub fn set_link(&mut self, link: LinkId, y: f64) {
        let page = self.page_no().saturating_sub(1);
        if let Some(slot) = self.links.get_mut(link.0) {
            *slot = Some(Destination { page, y });
        }
    }

    pub fn link_destination(&self, link: LinkId) -> Option<Destination> {
        self.links.get(link.0).copied().flatten()
    }

    /// Make a rectangle on the current page clickable.
    pub fn link(&mut self, x: f64, y: f64, w: f64, h: f64, target: LinkTarget) {
        self.current_page().links.push(LinkArea { x, y, w, h, target });
    }

    /// While set, text produced by [`Canvas::write`] links to `uri`.
    pub fn set_uri(&mut self, uri: Option<String>) {
        self.active_uri = uri;
    }

    pub fn add_bookmark(&mut self, title: impl Into<String>, level: u8) {
        let destination = Destination {
            page: self.page_no().saturating_sub(1),
            y: self.y,
        };
        self.bookmarks.push(Bookmark {
            title: title.into(),
            level,
            destination,
        });
    }

    /// Close the document and serialize it.
    pub fn to_pdf_bytes(&mut self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            self.add_page();
        }
        self.finish();
        writer::write_document(self)
    }
}
