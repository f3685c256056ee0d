//! Tables as a grid of fixed-width columns.
//!
//! The table spans a fixed width split evenly between its columns. Header
//! cells sit on a grey band; every data cell is outlined and its text wrapped
//! to the column width, the tallest cell setting the height of its row.

use super::elements::collapse_whitespace;
use super::Renderer;
use crate::canvas::RectStyle;
use crate::error::BookError;
use crate::html::{Dom, NodeId};
use crate::layout::{colours, Align, FontStyle, TABLE_FONT_SIZE, TABLE_LINE_HEIGHT, TABLE_WIDTH};
use crate::wrap::wrap_text;
use anyhow::Result;

/// Cell text pulled out of a `table` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Every header cell, from all header rows
    pub headers: Vec<String>,
    /// Data rows that have at least one cell
    pub rows: Vec<Vec<String>>,
}

fn row_elements(dom: &Dom, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for child in dom.child_elements(table) {
        match dom.tag(child) {
            Some("tr") => rows.push(child),
            Some("thead") | Some("tbody") | Some("tfoot") => rows.extend(
                dom.child_elements(child)
                    .filter(|&row| dom.tag(row) == Some("tr")),
            ),
            _ => {}
        }
    }
    rows
}

pub fn parse_table(dom: &Dom, table: NodeId) -> Result<Table> {
    let rows = row_elements(dom, table);
    if rows.is_empty() {
        return Err(BookError::InvalidTable("table has no rows".to_string()).into());
    }

    let mut parsed = Table::default();
    for row in rows {
        let mut cells = Vec::new();
        let mut is_header = false;
        for cell in dom.child_elements(row) {
            match dom.tag(cell) {
                Some("th") => is_header = true,
                Some("td") => {}
                _ => continue,
            }
            cells.push(collapse_whitespace(&dom.text_content(cell)).trim().to_string());
        }

        if is_header {
            parsed.headers.extend(cells);
        } else if !cells.is_empty() {
            parsed.rows.push(cells);
        }
    }
    Ok(parsed)
}

/// Number of columns: the header count, or failing that the width of the
/// first data row.
pub fn column_count(table: &Table) -> usize {
    if !table.headers.is_empty() {
        table.headers.len()
    } else {
        table.rows.first().map(Vec::len).unwrap_or(0)
    }
}

pub(super) fn render(renderer: &mut Renderer, dom: &Dom, id: NodeId) -> Result<()> {
    let table = parse_table(dom, id)?;
    let columns = column_count(&table);
    if columns == 0 {
        return Err(BookError::EmptyTable.into());
    }
    let col_width = TABLE_WIDTH / columns as f64;
    log::trace!(
        "table: {columns} column(s), {} row(s), {col_width:.1}mm wide",
        table.rows.len()
    );

    if !table.headers.is_empty() {
        let style = renderer.fonts.text(FontStyle::Bold, TABLE_FONT_SIZE);
        renderer.with_style(style, |r| render_header(r, &table.headers, col_width));
    }

    let style = renderer.fonts.text(FontStyle::Normal, TABLE_FONT_SIZE);
    renderer.with_style(style, |r| {
        for row in table.rows.iter() {
            render_row(r, row, col_width);
        }
    });
    Ok(())
}

fn render_header(renderer: &mut Renderer, headers: &[String], col_width: f64) {
    renderer.ensure_room(TABLE_LINE_HEIGHT);

    let canvas = &mut renderer.canvas;
    canvas.set_fill_colour(colours::TABLE_HEADER);
    let (x, y) = (canvas.x(), canvas.y());
    for (i, header) in headers.iter().enumerate() {
        let cell_x = x + i as f64 * col_width;
        canvas.rect(cell_x, y, col_width, TABLE_LINE_HEIGHT, RectStyle::Fill);
        canvas.set_xy(cell_x, y);
        canvas.cell(col_width, TABLE_LINE_HEIGHT, header, Align::Left, false);
    }
    canvas.ln(TABLE_LINE_HEIGHT);
}

fn render_row(renderer: &mut Renderer, row: &[String], col_width: f64) {
    // multi_cell wraps inside the cell margins, so measure the same width
    let text_width = col_width - 2.0 * renderer.canvas.cell_margin();
    let lines = row
        .iter()
        .map(|cell| wrap_text(cell, text_width, |s| renderer.canvas.string_width(s)).len())
        .max()
        .unwrap_or(0);
    let row_height = TABLE_LINE_HEIGHT.max(lines as f64 * TABLE_LINE_HEIGHT);
    renderer.ensure_room(row_height);

    let canvas = &mut renderer.canvas;
    let (x, y) = (canvas.x(), canvas.y());
    for (i, cell) in row.iter().enumerate() {
        let cell_x = x + i as f64 * col_width;
        canvas.rect(cell_x, y, col_width, row_height, RectStyle::Stroke);
        canvas.set_xy(cell_x, y);
        canvas.multi_cell(col_width, TABLE_LINE_HEIGHT, cell, Align::Left);
    }
    canvas.set_xy(x, y + row_height);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::canvas::Op;
    use crate::html::parse_html;

    fn table_of(html: &str) -> Result<Table> {
        let dom = parse_html(html);
        let table = dom.find_by_tag("table").expect("html has a table");
        parse_table(&dom, table)
    }

    fn rect_styles(renderer: &Renderer, page: usize) -> Vec<(RectStyle, f64, f64)> {
        renderer.canvas().pages()[page]
            .rects()
            .filter_map(|op| match op {
                Op::Rect { style, w, h, .. } => Some((*style, *w, *h)),
                _ => None,
            })
            .collect()
    }

    const GRID: &str = "<table><thead><tr><th>Name</th><th>Role</th></tr></thead>\
        <tbody><tr><td>Ada</td><td>Engineer</td></tr>\
        <tr><td>Grace</td><td>Admiral</td></tr>\
        <tr><td>Linus</td><td>Kernel</td></tr></tbody></table>";

    #[test]
    fn can_parse_headers_and_rows() {
        let table = table_of(
            "<table><thead><tr><th> A </th><th>B\n b</th></tr></thead>\
             <tbody><tr><td>1</td><td><em>2</em></td></tr><tr></tr></tbody></table>",
        )
        .expect("can parse");
        assert_eq!(table.headers, vec!["A", "B b"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
        assert_eq!(column_count(&table), 2);
    }

    #[test]
    fn can_count_columns_without_headers() {
        let table = table_of("<table><tr><td>1</td><td>2</td><td>3</td></tr><tr><td>4</td></tr></table>")
            .expect("can parse");
        assert!(table.headers.is_empty());
        assert_eq!(column_count(&table), 3);
    }

    #[test]
    fn can_reject_tables_without_rows() {
        let err = table_of("<table></table>").expect_err("no rows");
        assert!(matches!(
            err.downcast_ref::<BookError>(),
            Some(BookError::InvalidTable(_))
        ));
    }

    #[test]
    fn can_reject_tables_without_cells() {
        let fixture = Fixture::new();
        let mut renderer = renderer();
        let err = render_html(&mut renderer, &fixture, "<table><tr></tr></table>")
            .expect_err("no cells");
        assert!(matches!(
            err.downcast_ref::<BookError>(),
            Some(BookError::EmptyTable)
        ));
        assert_eq!(renderer.style(), &renderer.fonts.body());
    }

    #[test]
    fn can_draw_a_grid() {
        let fixture = Fixture::new();
        let mut renderer = renderer();
        render_html(&mut renderer, &fixture, GRID).expect("can render");

        let rects = rect_styles(&renderer, 0);
        assert_eq!(rects.len(), 2 * (3 + 1));
        for (style, w, _) in rects.iter() {
            assert_eq!(*w, 85.0);
            assert!(matches!(style, RectStyle::Fill | RectStyle::Stroke));
        }
        assert_eq!(
            rects.iter().filter(|(s, _, _)| *s == RectStyle::Fill).count(),
            2
        );

        let header_fill = renderer.canvas().pages()[0].rects().find_map(|op| match op {
            Op::Rect {
                style: RectStyle::Fill,
                fill,
                ..
            } => Some(*fill),
            _ => None,
        });
        assert_eq!(header_fill, Some(colours::TABLE_HEADER));

        let header = renderer.canvas().pages()[0]
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Text { text, font, size_pt, .. } if text == "Name" => {
                    Some((font.base_font(), *size_pt))
                }
                _ => None,
            });
        assert_eq!(header, Some(("Times-Bold", 10.0)));
    }

    #[test]
    fn can_grow_rows_for_wrapped_cells() {
        let fixture = Fixture::new();
        let mut renderer = renderer();
        let long = "word ".repeat(60);
        let html = format!("<table><tr><td>short</td><td>{long}</td></tr></table>");
        render_html(&mut renderer, &fixture, &html).expect("can render");

        let rects = rect_styles(&renderer, 0);
        assert_eq!(rects.len(), 2);
        let height = rects[0].2;
        assert!(height > TABLE_LINE_HEIGHT);
        assert_eq!((height / TABLE_LINE_HEIGHT).fract(), 0.0);
        assert_eq!(rects[0].2, rects[1].2);
    }

    #[test]
    fn can_keep_cell_text_inside_its_border() {
        let fixture = Fixture::new();
        let mut renderer = renderer();
        let long = "lengthy words ".repeat(40);
        let html = format!("<table><tr><td>{long}</td><td>x</td></tr></table>");
        render_html(&mut renderer, &fixture, &html).expect("can render");

        renderer
            .canvas
            .set_font("Times", FontStyle::Normal, TABLE_FONT_SIZE);
        let margin = renderer.canvas().cell_margin();
        let rects = rect_styles(&renderer, 0);
        let row_height = rects[0].2;

        let page = &renderer.canvas().pages()[0];
        let first_column: Vec<(f64, &str)> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { x, text, .. } if *x < 20.0 + 85.0 => Some((*x, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(first_column.len() as f64 * TABLE_LINE_HEIGHT, row_height);
        for (x, text) in first_column {
            let right = x + renderer.canvas().string_width(text);
            assert!(right <= 20.0 + 85.0 - margin + 1e-9, "{text} ends at {right}");
        }
    }

    #[test]
    fn can_break_rows_across_pages() {
        let fixture = Fixture::new();
        let mut renderer = renderer();
        renderer.canvas.add_page();
        renderer.canvas.set_y(260.0);
        let html = "<table><tr><th>A</th><th>B</th></tr>\
                    <tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr></table>";
        render_html(&mut renderer, &fixture, html).expect("can render");

        assert_eq!(renderer.canvas().page_no(), 2);
        assert_eq!(rect_styles(&renderer, 0).len(), 4);
        assert_eq!(rect_styles(&renderer, 1).len(), 2);
    }
}
