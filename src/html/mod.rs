//! HTML parsed into an arena tree.

pub mod dom;
mod sink;

pub use dom::{Dom, NodeData, NodeId};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use sink::DomSink;

/// Parse a complete HTML document. Parsing never fails; malformed markup is
/// repaired the way a browser would.
pub fn parse_html(html: &str) -> Dom {
    parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_fragments_into_a_body() {
        let dom = parse_html("<h1>Title</h1><p>Hello <em>there</em></p>");
        let body = dom.body().expect("body is always synthesized");
        let tags: Vec<&str> = dom
            .child_elements(body)
            .filter_map(|id| dom.tag(id))
            .collect();
        assert_eq!(tags, vec!["h1", "p"]);

        let p = dom.find_by_tag("p").expect("has a paragraph");
        assert_eq!(dom.text_content(p), "Hello there");
    }

    #[test]
    fn can_insert_table_sections() {
        let dom = parse_html("<table><tr><td>a</td></tr></table>");
        let tr = dom.find_by_tag("tr").expect("has a row");
        let section = dom.parent(tr).expect("row has a parent");
        assert_eq!(dom.tag(section), Some("tbody"));
        assert!(dom.find_ancestor(tr, "table").is_some());
    }

    #[test]
    fn can_parse_misnested_markup_while_the_tree_grows() {
        let html: String = (0..400)
            .map(|i| format!("<b><i>{i}<p>para {i}</b> tail</i></p><table><td>{i}</table>"))
            .collect();
        let dom = parse_html(&html);
        let body = dom.body().expect("has a body");

        fn count(dom: &Dom, id: NodeId, tag: &str) -> usize {
            let own = usize::from(dom.tag(id) == Some(tag));
            own + dom
                .children(id)
                .map(|child| count(dom, child, tag))
                .sum::<usize>()
        }
        assert_eq!(count(&dom, body, "table"), 400);
        assert_eq!(count(&dom, body, "td"), 400);

        let text = dom.text_content(body);
        assert!(text.contains("para 0"));
        assert!(text.contains("para 399"));
    }

    #[test]
    fn can_keep_pre_whitespace() {
        let dom = parse_html("<pre><code>fn main() {\n    run();\n}\n</code></pre>");
        let code = dom.find_by_tag("code").expect("has code");
        assert_eq!(dom.text_content(code), "fn main() {\n    run();\n}\n");
    }
}
