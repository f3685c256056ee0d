//! Serialization of a finished [`Canvas`] into PDF bytes with lopdf.
//!
//! Coordinates are flipped here: the canvas measures millimetres down from the
//! top of the page, PDF user space measures points up from the bottom.

use super::fonts::{encode_win_ansi, BuiltinFont};
use super::images::ColourSpace;
use super::{Bookmark, Canvas, Destination, LinkArea, LinkTarget, Op, Page, RectStyle};
use crate::layout::{Colour, PT_PER_MM};
use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;

const PRODUCER: &str = concat!("episode-book v", env!("CARGO_PKG_VERSION"));

pub(super) fn write_document(canvas: &Canvas) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.4");
    let scale = Scale {
        page_height: canvas.geometry.height,
    };

    let pages_id = doc.new_object_id();
    let resources_id = add_resources(&mut doc, canvas);

    let page_ids: Vec<ObjectId> = canvas.pages.iter().map(|_| doc.new_object_id()).collect();
    let media_box: Vec<Object> = vec![
        0i64.into(),
        0i64.into(),
        scale.pt(canvas.geometry.width).into(),
        scale.pt(canvas.geometry.height).into(),
    ];

    for (index, page) in canvas.pages.iter().enumerate() {
        let content = page_content(page, &scale);
        let encoded = content
            .encode()
            .with_context(|| format!("Failed to encode content of page {}", index + 1))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => resources_id,
        };

        let annots: Vec<Object> = page
            .links
            .iter()
            .filter_map(|link| link_annotation(canvas, link, &page_ids, &scale))
            .map(|annot| Object::Reference(doc.add_object(annot)))
            .collect();
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }

        doc.objects
            .insert(page_ids[index], Object::Dictionary(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(outline_id) = add_outline(&mut doc, &canvas.bookmarks, &page_ids, &scale) {
        catalog.set("Outlines", outline_id);
        catalog.set("PageMode", "UseOutlines");
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut info = dictionary! {
        "Producer" => text_string(PRODUCER),
    };
    if let Some(title) = &canvas.info.title {
        info.set("Title", text_string(title));
    }
    if let Some(creator) = &canvas.info.creator {
        info.set("Creator", text_string(creator));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .with_context(|| "Failed to serialize PDF document")?;
    Ok(bytes)
}

struct Scale {
    page_height: f64,
}

impl Scale {
    fn pt(&self, mm: f64) -> f32 {
        (mm * PT_PER_MM) as f32
    }

    /// A distance from the top of the page as a PDF y coordinate.
    fn y(&self, mm_from_top: f64) -> f32 {
        self.pt(self.page_height - mm_from_top)
    }
}

fn add_resources(doc: &mut Document, canvas: &Canvas) -> ObjectId {
    let mut used: BTreeMap<usize, BuiltinFont> = BTreeMap::new();
    for op in canvas.pages.iter().flat_map(|page| page.ops.iter()) {
        if let Op::Text { font, .. } = op {
            used.insert(font.index(), *font);
        }
    }

    let mut fonts = Dictionary::new();
    for font in used.values() {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }

    let mut xobjects = Dictionary::new();
    for (index, image) in canvas.images.iter().enumerate() {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width_px as i64,
            "Height" => image.height_px as i64,
            "ColorSpace" => image.colour_space.pdf_name(),
            "BitsPerComponent" => 8i64,
            "Filter" => "DCTDecode",
        };
        if image.colour_space == ColourSpace::Cmyk {
            // Adobe CMYK JPEGs store inverted components
            let decode: Vec<Object> = (0..4)
                .flat_map(|_| [Object::Integer(1), Object::Integer(0)])
                .collect();
            dict.set("Decode", decode);
        }
        let stream = Stream::new(dict, image.data.clone()).with_compression(false);
        let image_id = doc.add_object(stream);
        xobjects.set(image_name(index), image_id);
    }

    doc.add_object(dictionary! {
        "Font" => fonts,
        "XObject" => xobjects,
    })
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

fn colour_operands(colour: Colour) -> Vec<Object> {
    colour.components().iter().map(|c| Object::Real(*c)).collect()
}

fn page_content(page: &Page, scale: &Scale) -> Content {
    let mut operations = Vec::new();

    for op in page.ops.iter() {
        match op {
            Op::Text {
                x,
                y,
                font,
                size_pt,
                colour,
                text,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(font.resource_name().into_bytes()),
                        Object::Real(*size_pt as f32),
                    ],
                ));
                operations.push(Operation::new("rg", colour_operands(*colour)));
                operations.push(Operation::new(
                    "Td",
                    vec![scale.pt(*x).into(), scale.y(*y).into()],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            Op::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                colour,
            } => {
                operations.push(Operation::new("w", vec![scale.pt(*width).into()]));
                operations.push(Operation::new("RG", colour_operands(*colour)));
                operations.push(Operation::new(
                    "m",
                    vec![scale.pt(*x1).into(), scale.y(*y1).into()],
                ));
                operations.push(Operation::new(
                    "l",
                    vec![scale.pt(*x2).into(), scale.y(*y2).into()],
                ));
                operations.push(Operation::new("S", vec![]));
            }
            Op::Rect {
                x,
                y,
                w,
                h,
                style,
                fill,
                stroke,
                line_width,
            } => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new("w", vec![scale.pt(*line_width).into()]));
                operations.push(Operation::new("rg", colour_operands(*fill)));
                operations.push(Operation::new("RG", colour_operands(*stroke)));
                operations.push(Operation::new(
                    "re",
                    vec![
                        scale.pt(*x).into(),
                        scale.y(*y).into(),
                        scale.pt(*w).into(),
                        (-scale.pt(*h)).into(),
                    ],
                ));
                let paint = match style {
                    RectStyle::Fill => "f",
                    RectStyle::Stroke => "S",
                    RectStyle::FillStroke => "B",
                };
                operations.push(Operation::new(paint, vec![]));
                operations.push(Operation::new("Q", vec![]));
            }
            Op::Image { image, x, y, w, h } => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        scale.pt(*w).into(),
                        0i64.into(),
                        0i64.into(),
                        scale.pt(*h).into(),
                        scale.pt(*x).into(),
                        scale.y(*y + *h).into(),
                    ],
                ));
                operations.push(Operation::new(
                    "Do",
                    vec![Object::Name(image_name(image.0).into_bytes())],
                ));
                operations.push(Operation::new("Q", vec![]));
            }
        }
    }

    Content { operations }
}

fn destination(page_ids: &[ObjectId], destination: Destination, scale: &Scale) -> Option<Object> {
    let page_id = page_ids.get(destination.page)?;
    Some(Object::Array(vec![
        Object::Reference(*page_id),
        "XYZ".into(),
        Object::Null,
        scale.y(destination.y).into(),
        Object::Null,
    ]))
}

fn link_annotation(
    canvas: &Canvas,
    link: &LinkArea,
    page_ids: &[ObjectId],
    scale: &Scale,
) -> Option<Dictionary> {
    let rect: Vec<Object> = vec![
        scale.pt(link.x).into(),
        scale.y(link.y + link.h).into(),
        scale.pt(link.x + link.w).into(),
        scale.y(link.y).into(),
    ];
    let border: Vec<Object> = vec![0i64.into(), 0i64.into(), 0i64.into()];
    let mut annot = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect,
        "Border" => border,
    };

    match &link.target {
        LinkTarget::Internal(id) => {
            let dest = destination(page_ids, canvas.link_destination(*id)?, scale)?;
            annot.set("Dest", dest);
        }
        LinkTarget::Uri(uri) => {
            annot.set(
                "A",
                dictionary! {
                    "S" => "URI",
                    "URI" => Object::String(uri.as_bytes().to_vec(), StringFormat::Literal),
                },
            );
        }
    }
    Some(annot)
}

/// PDF text string: plain bytes for ASCII, UTF-16BE with a byte order mark otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn add_outline(
    doc: &mut Document,
    bookmarks: &[Bookmark],
    page_ids: &[ObjectId],
    scale: &Scale,
) -> Option<ObjectId> {
    if bookmarks.is_empty() {
        return None;
    }

    // nest each bookmark under the closest earlier one with a lower level
    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); bookmarks.len()];
    let mut open: Vec<usize> = Vec::new();
    for (index, bookmark) in bookmarks.iter().enumerate() {
        while let Some(&top) = open.last() {
            if bookmarks[top].level >= bookmark.level {
                open.pop();
            } else {
                break;
            }
        }
        match open.last() {
            Some(&parent) => children[parent].push(index),
            None => roots.push(index),
        }
        open.push(index);
    }

    let ids: Vec<ObjectId> = bookmarks.iter().map(|_| doc.new_object_id()).collect();
    let outline_id = doc.new_object_id();

    let tree = OutlineTree {
        bookmarks,
        children: &children,
        ids: &ids,
        page_ids,
        scale,
    };
    tree.insert_level(doc, &roots, outline_id);

    doc.objects.insert(
        outline_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => ids[roots[0]],
            "Last" => ids[roots[roots.len() - 1]],
            "Count" => bookmarks.len() as i64,
        }),
    );
    Some(outline_id)
}

struct OutlineTree<'a> {
    bookmarks: &'a [Bookmark],
    children: &'a [Vec<usize>],
    ids: &'a [ObjectId],
    page_ids: &'a [ObjectId],
    scale: &'a Scale,
}

impl OutlineTree<'_> {
    fn insert_level(&self, doc: &mut Document, items: &[usize], parent: ObjectId) {
        for (position, &index) in items.iter().enumerate() {
            let bookmark = &self.bookmarks[index];
            let mut dict = dictionary! {
                "Title" => text_string(&bookmark.title),
                "Parent" => parent,
            };
            if let Some(dest) = destination(self.page_ids, bookmark.destination, self.scale) {
                dict.set("Dest", dest);
            }
            if position > 0 {
                dict.set("Prev", self.ids[items[position - 1]]);
            }
            if position + 1 < items.len() {
                dict.set("Next", self.ids[items[position + 1]]);
            }

            let kids = &self.children[index];
            if !kids.is_empty() {
                dict.set("First", self.ids[kids[0]]);
                dict.set("Last", self.ids[kids[kids.len() - 1]]);
                // negative count: collapsed by default
                dict.set("Count", -(kids.len() as i64));
                self.insert_level(doc, kids, self.ids[index]);
            }

            doc.objects.insert(self.ids[index], Object::Dictionary(dict));
        }
    }
}
